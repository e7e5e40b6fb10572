//! Core data types for the pulsegrid sequencer.
//!
//! Samples, the sample bank that the voice engine reads from, and the
//! drum parts the pattern oracle triggers. Designed to be `no_std`
//! compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod drum_part;
mod sample;
mod sample_bank;

pub use drum_part::{DrumPart, NUM_PARTS};
pub use sample::Sample;
pub use sample_bank::{SampleBank, SampleKey, NOTE_COUNT};
