//! Session settings shared by live playback and offline rendering.

use std::path::PathBuf;

use pg_engine::{DEFAULT_BPM, MAX_PATTERN_LENGTH, MAX_VELOCITY_STEPS};

/// Everything needed to build a session, already validated by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Directory of note-named WAV samples.
    pub samples_dir: PathBuf,
    pub bpm: f32,
    /// Instruments to select.
    pub parts: usize,
    /// Length of each instrument's velocity pattern.
    pub velocity_steps: usize,
    /// Active pattern length in steps.
    pub pattern_length: u8,
    pub output_gain: f32,
    pub lfo: bool,
    pub humanize: f32,
    pub spread: f32,
    pub x: u8,
    pub y: u8,
    pub randomness: u8,
    /// Assignment seed; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            samples_dir: PathBuf::from("data"),
            bpm: DEFAULT_BPM,
            parts: 4,
            velocity_steps: MAX_VELOCITY_STEPS,
            pattern_length: MAX_PATTERN_LENGTH,
            output_gain: 1.0,
            lfo: false,
            humanize: 0.0,
            spread: 0.0,
            x: 128,
            y: 128,
            randomness: 0,
            seed: None,
        }
    }
}
