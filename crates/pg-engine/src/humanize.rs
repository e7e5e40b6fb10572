//! Fixed-capacity queue of jittered triggers.
//!
//! Scanned once per audio frame while humanize is on. Delays are drawn from
//! a queue-local generator so the audio thread never shares random state with
//! the control thread.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::trigger::{Trigger, TriggerSink};

/// Pending-trigger slots.
pub const HUMANIZE_SLOTS: usize = 64;

const RNG_SEED: u64 = 0x5eed_d2c3_9a71_0b44;

#[derive(Clone, Copy, Debug, Default)]
struct PendingTrigger {
    trigger: Trigger,
    delay_frames: i64,
    active: bool,
}

/// Slot table of delayed triggers with a fire-immediately overflow policy.
#[derive(Clone, Debug)]
pub struct HumanizeQueue {
    slots: [PendingTrigger; HUMANIZE_SLOTS],
    pending: usize,
    rng: SmallRng,
}

impl HumanizeQueue {
    pub fn new() -> Self {
        Self::with_seed(RNG_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            slots: [PendingTrigger::default(); HUMANIZE_SLOTS],
            pending: 0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Delay `trigger` by a uniform draw from `[0, 2 * max_jitter_frames]`.
    ///
    /// Fires into `sink` right away when the table is full or the draw is
    /// zero. Returns the delay applied.
    pub fn schedule<S: TriggerSink + ?Sized>(
        &mut self,
        trigger: Trigger,
        max_jitter_frames: u32,
        sink: &mut S,
    ) -> u32 {
        let Some(slot) = self.slots.iter_mut().find(|s| !s.active) else {
            trigger.fire(sink);
            return 0;
        };
        let delay = self.rng.gen_range(0..=max_jitter_frames.saturating_mul(2));
        if delay == 0 {
            trigger.fire(sink);
            return 0;
        }
        *slot = PendingTrigger {
            trigger,
            delay_frames: delay as i64,
            active: true,
        };
        self.pending += 1;
        delay
    }

    /// Count down one frame and fire every trigger that came due.
    pub fn tick<S: TriggerSink + ?Sized>(&mut self, sink: &mut S) {
        if self.pending == 0 {
            return;
        }
        for slot in self.slots.iter_mut().filter(|s| s.active) {
            slot.delay_frames -= 1;
            if slot.delay_frames <= 0 {
                slot.active = false;
                self.pending -= 1;
                slot.trigger.fire(sink);
            }
        }
    }

    /// Triggers waiting to fire.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending == 0
    }

    /// Drop every pending trigger without firing it.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.active = false;
        }
        self.pending = 0;
    }
}

impl Default for HumanizeQueue {
    fn default() -> Self {
        Self::new()
    }
}
