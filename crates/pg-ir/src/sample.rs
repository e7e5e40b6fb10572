//! Sample data types.

use alloc::vec::Vec;
use arrayvec::ArrayString;

/// A decoded mono sample, resampled to the engine rate.
#[derive(Clone, Debug, Default)]
pub struct Sample {
    /// Sample name (usually the file name, truncated).
    pub name: ArrayString<32>,
    /// MIDI note this sample answers to.
    pub note: u8,
    /// Mono audio frames.
    pub data: Vec<f32>,
}

impl Sample {
    /// Create a sample from decoded frames.
    pub fn new(name: &str, note: u8, data: Vec<f32>) -> Self {
        let mut sample = Self {
            name: ArrayString::new(),
            note,
            data,
        };
        for c in name.chars() {
            if sample.name.try_push(c).is_err() {
                break;
            }
        }
        sample
    }

    /// Length of the sample in frames.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the sample has no frames.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
