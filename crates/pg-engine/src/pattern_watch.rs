//! Pattern-change notification from the audio thread to a control thread.
//!
//! The scheduler recomputes the effective pattern while LFO drift moves the
//! oracle coordinates and publishes it through a lock-free SPSC ring when it
//! changes. The control side drains the ring and keeps the newest snapshot.

use core::fmt;

use pg_ir::{DrumPart, NUM_PARTS};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use crate::oracle::{fires, PatternOracle, MAX_PATTERN_LENGTH};

/// Snapshots buffered between two polls.
const QUEUE_CAPACITY: usize = 8;

/// Per-part hit masks for one (x, y) over the active pattern length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PatternSnapshot {
    /// Bit `s` of `masks[p]` is set when part `p` fires on step `s`.
    pub masks: [u32; NUM_PARTS],
    pub x: u8,
    pub y: u8,
    pub length: u8,
    /// Parts with at least one mapping, as a [`DrumPart::mask`] set.
    pub parts: u8,
}

impl PatternSnapshot {
    /// Evaluate the oracle's level function at every (step, part).
    ///
    /// Allocation-free; called from the audio thread.
    pub fn compute<O: PatternOracle + ?Sized>(
        oracle: &O,
        x: u8,
        y: u8,
        length: u8,
        parts: u8,
    ) -> Self {
        let length = length.min(MAX_PATTERN_LENGTH);
        let mut masks = [0u32; NUM_PARTS];
        for part in DrumPart::ALL {
            let threshold = oracle.density_threshold(part);
            for step in 0..length {
                if fires(oracle.level(step, part, x, y), threshold) {
                    masks[part.index()] |= 1 << step;
                }
            }
        }
        Self { masks, x, y, length, parts }
    }

    pub fn hits(&self, part: DrumPart, step: u8) -> bool {
        step < 32 && self.masks[part.index()] & (1 << step) != 0
    }

    pub fn has_part(&self, part: DrumPart) -> bool {
        self.parts & part.mask() != 0
    }

    /// True if any assigned part's mask differs.
    pub fn differs_from(&self, other: &PatternSnapshot) -> bool {
        DrumPart::ALL
            .into_iter()
            .filter(|&p| self.has_part(p))
            .any(|p| self.masks[p.index()] != other.masks[p.index()])
    }
}

impl fmt::Display for PatternSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pattern x={} y={} length={}", self.x, self.y, self.length)?;
        for part in DrumPart::ALL.into_iter().filter(|&p| self.has_part(p)) {
            write!(f, "\n  {part} ")?;
            for step in 0..self.length {
                if step > 0 && step % 4 == 0 {
                    f.write_str(" ")?;
                }
                f.write_str(if self.hits(part, step) { "x" } else { "." })?;
            }
        }
        Ok(())
    }
}

/// Create a connected publisher/reader pair.
pub fn channel() -> (PatternPublisher, PatternChanges) {
    let (producer, consumer) = HeapRb::<PatternSnapshot>::new(QUEUE_CAPACITY).split();
    (
        PatternPublisher { producer, last: None },
        PatternChanges { consumer },
    )
}

/// Audio-thread half: publishes a snapshot only when it changed.
pub struct PatternPublisher {
    producer: HeapProd<PatternSnapshot>,
    last: Option<PatternSnapshot>,
}

impl PatternPublisher {
    /// Record `snapshot` as already seen without publishing it.
    pub fn prime(&mut self, snapshot: PatternSnapshot) {
        self.last = Some(snapshot);
    }

    /// Publish if `snapshot` differs from the last published one.
    ///
    /// A full ring leaves the last-published state untouched so the change
    /// is offered again on the next call. Returns true when published.
    pub fn publish_if_changed(&mut self, snapshot: PatternSnapshot) -> bool {
        let changed = match &self.last {
            Some(last) => snapshot.differs_from(last),
            None => true,
        };
        if !changed {
            return false;
        }
        if self.producer.try_push(snapshot).is_err() {
            return false;
        }
        self.last = Some(snapshot);
        true
    }
}

impl fmt::Debug for PatternPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternPublisher").field("last", &self.last).finish()
    }
}

/// Control-thread half.
pub struct PatternChanges {
    consumer: HeapCons<PatternSnapshot>,
}

impl PatternChanges {
    /// Drain pending snapshots and return the newest, if any.
    pub fn poll(&mut self) -> Option<PatternSnapshot> {
        let mut latest = None;
        while let Some(snapshot) = self.consumer.try_pop() {
            latest = Some(snapshot);
        }
        latest
    }
}

impl fmt::Debug for PatternChanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternChanges").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedOracle;

    fn snapshot(masks: [u32; NUM_PARTS], parts: u8) -> PatternSnapshot {
        PatternSnapshot { masks, x: 0, y: 0, length: 32, parts }
    }

    #[test]
    fn compute_applies_density_threshold() {
        let mut oracle = ScriptedOracle::default();
        oracle.levels[DrumPart::Bd.index()][0] = 200;
        oracle.levels[DrumPart::Bd.index()][4] = 100;
        oracle.levels[DrumPart::Sd.index()][2] = 128;
        // Default density 128: threshold 127.
        let snap = PatternSnapshot::compute(&oracle, 10, 20, 8, 0b111);
        assert_eq!(snap.masks[DrumPart::Bd.index()], 0b1);
        assert_eq!(snap.masks[DrumPart::Sd.index()], 0b100);
        assert_eq!(snap.masks[DrumPart::Hh.index()], 0);
        assert_eq!((snap.x, snap.y, snap.length), (10, 20, 8));
    }

    #[test]
    fn compute_ignores_steps_past_length() {
        let mut oracle = ScriptedOracle::default();
        oracle.levels[DrumPart::Hh.index()][10] = 255;
        let snap = PatternSnapshot::compute(&oracle, 0, 0, 8, 0b111);
        assert_eq!(snap.masks[DrumPart::Hh.index()], 0);
    }

    #[test]
    fn unassigned_parts_do_not_count_as_changes() {
        let bd_only = DrumPart::Bd.mask();
        let a = snapshot([1, 0, 0], bd_only);
        let b = snapshot([1, 0xff, 0xff], bd_only);
        assert!(!b.differs_from(&a));
        let c = snapshot([3, 0, 0], bd_only);
        assert!(c.differs_from(&a));
    }

    #[test]
    fn publish_only_on_change() {
        let (mut publisher, mut changes) = channel();
        let a = snapshot([1, 2, 4], 0b111);
        assert!(publisher.publish_if_changed(a));
        assert!(!publisher.publish_if_changed(a));
        assert_eq!(changes.poll(), Some(a));
        assert_eq!(changes.poll(), None);
    }

    #[test]
    fn primed_snapshot_is_not_republished() {
        let (mut publisher, mut changes) = channel();
        let a = snapshot([1, 2, 4], 0b111);
        publisher.prime(a);
        assert!(!publisher.publish_if_changed(a));
        assert_eq!(changes.poll(), None);
    }

    #[test]
    fn poll_returns_newest() {
        let (mut publisher, mut changes) = channel();
        for bits in 1..=3u32 {
            publisher.publish_if_changed(snapshot([bits, 0, 0], 0b111));
        }
        assert_eq!(changes.poll().map(|s| s.masks[0]), Some(3));
    }

    #[test]
    fn full_ring_retries_later() {
        let (mut publisher, mut changes) = channel();
        for bits in 1..=QUEUE_CAPACITY as u32 {
            assert!(publisher.publish_if_changed(snapshot([bits, 0, 0], 0b111)));
        }
        let next = snapshot([0xabc, 0, 0], 0b111);
        assert!(!publisher.publish_if_changed(next));
        assert!(changes.poll().is_some());
        assert!(publisher.publish_if_changed(next));
        assert_eq!(changes.poll(), Some(next));
    }

    #[test]
    fn display_lists_assigned_parts_only() {
        let snap = PatternSnapshot {
            masks: [0b0001_0001, 0b0100, 0],
            x: 1,
            y: 2,
            length: 8,
            parts: DrumPart::Bd.mask() | DrumPart::Sd.mask(),
        };
        let text = format!("{snap}");
        assert_eq!(text, "pattern x=1 y=2 length=8\n  BD x... x...\n  SD ..x. ....");
    }
}
