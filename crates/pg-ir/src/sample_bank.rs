//! SampleBank: immutable-after-load store of samples keyed by MIDI note.

use alloc::vec::Vec;
use slotmap::SlotMap;

use crate::sample::Sample;

slotmap::new_key_type! {
    /// Key for referencing samples in the bank from a playing voice.
    pub struct SampleKey;
}

/// Number of addressable instrument ids (MIDI notes 0..=127).
pub const NOTE_COUNT: usize = 128;

/// Owns all sample data. Voices refer into it by [`SampleKey`].
#[derive(Clone, Debug)]
pub struct SampleBank {
    samples: SlotMap<SampleKey, Sample>,
    by_note: [Option<SampleKey>; NOTE_COUNT],
}

impl SampleBank {
    /// Create an empty bank.
    pub fn new() -> Self {
        Self {
            samples: SlotMap::with_key(),
            by_note: [None; NOTE_COUNT],
        }
    }

    /// Insert a sample under its note.
    ///
    /// Returns the sample that has no place in the bank afterwards: the one
    /// previously stored under the same note, or `sample` itself when its
    /// note is outside the MIDI range.
    pub fn insert(&mut self, sample: Sample) -> Option<Sample> {
        let note = sample.note as usize;
        if note >= NOTE_COUNT {
            return Some(sample);
        }
        let key = self.samples.insert(sample);
        let previous = self.by_note[note].replace(key)?;
        self.samples.remove(previous)
    }

    /// Look up the sample for an instrument id.
    pub fn lookup(&self, note: u8) -> Option<(SampleKey, &Sample)> {
        let key = (*self.by_note.get(note as usize)?)?;
        self.samples.get(key).map(|s| (key, s))
    }

    /// Get a sample by key.
    pub fn get(&self, key: SampleKey) -> Option<&Sample> {
        self.samples.get(key)
    }

    /// All loaded notes in ascending order.
    pub fn notes(&self) -> Vec<u8> {
        (0..NOTE_COUNT as u8)
            .filter(|&n| self.by_note[n as usize].is_some())
            .collect()
    }

    /// Number of loaded samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if no samples are loaded.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl Default for SampleBank {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn lookup_finds_inserted_note() {
        let mut bank = SampleBank::new();
        assert!(bank.insert(Sample::new("kick", 36, vec![1.0; 4])).is_none());
        let (key, sample) = bank.lookup(36).unwrap();
        assert_eq!(sample.len(), 4);
        assert_eq!(bank.get(key).unwrap().note, 36);
        assert!(bank.lookup(37).is_none());
    }

    #[test]
    fn duplicate_note_replaces_previous() {
        let mut bank = SampleBank::new();
        bank.insert(Sample::new("first", 40, vec![1.0; 4]));
        let replaced = bank.insert(Sample::new("second", 40, vec![1.0; 8])).unwrap();
        assert_eq!(replaced.name.as_str(), "first");
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.lookup(40).unwrap().1.len(), 8);
    }

    #[test]
    fn out_of_range_note_is_rejected() {
        let mut bank = SampleBank::new();
        let rejected = bank.insert(Sample::new("high", 200, vec![1.0])).unwrap();
        assert_eq!(rejected.note, 200);
        assert!(bank.is_empty());
        assert!(bank.lookup(200).is_none());
    }

    #[test]
    fn notes_are_sorted() {
        let mut bank = SampleBank::new();
        for note in [64, 12, 100] {
            bank.insert(Sample::new("s", note, vec![0.0]));
        }
        assert_eq!(bank.notes(), vec![12, 64, 100]);
    }
}
