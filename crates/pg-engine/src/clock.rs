//! Pulse clock: converts audio frames into oracle pulses at a given tempo.

use crate::oracle::PULSES_PER_QUARTER_NOTE;

/// Tempo used when none is given.
pub const DEFAULT_BPM: f32 = 120.0;

/// Fastest accepted tempo.
pub const MAX_BPM: f32 = 300.0;

/// Frames between pulses: `sample_rate / (bpm * 24 / 60)`, at least 1.
pub fn frames_per_pulse(sample_rate: u32, bpm: f32) -> u32 {
    let pulses_per_second = bpm as f64 * PULSES_PER_QUARTER_NOTE as f64 / 60.0;
    if pulses_per_second <= 0.0 {
        return u32::MAX;
    }
    let frames = sample_rate as f64 / pulses_per_second;
    (frames as u32).max(1)
}

/// Frame accumulator that reports when a pulse is due.
#[derive(Clone, Debug)]
pub struct PulseClock {
    sample_rate: u32,
    bpm: f32,
    frames_per_pulse: u32,
    /// Frames elapsed since the last pulse. Signed so a lowered humanize
    /// offset can push the next pulse later.
    elapsed: i64,
}

impl PulseClock {
    pub fn new(sample_rate: u32, bpm: f32) -> Self {
        let mut clock = Self {
            sample_rate,
            bpm: DEFAULT_BPM,
            frames_per_pulse: 1,
            elapsed: 0,
        };
        clock.set_tempo(bpm);
        clock
    }

    /// Change tempo without disturbing the phase accumulator.
    ///
    /// Non-finite or non-positive values are ignored; values above
    /// [`MAX_BPM`] are clamped.
    pub fn set_tempo(&mut self, bpm: f32) {
        if !bpm.is_finite() || bpm <= 0.0 {
            return;
        }
        self.bpm = bpm.min(MAX_BPM);
        self.frames_per_pulse = frames_per_pulse(self.sample_rate, self.bpm);
    }

    pub fn tempo(&self) -> f32 {
        self.bpm
    }

    pub fn frames_per_pulse(&self) -> u32 {
        self.frames_per_pulse
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Count one frame. Returns true when a pulse falls on this frame.
    pub fn tick(&mut self) -> bool {
        self.elapsed += 1;
        if self.elapsed >= self.frames_per_pulse as i64 {
            self.elapsed -= self.frames_per_pulse as i64;
            true
        } else {
            false
        }
    }

    /// Shift the phase: positive values bring the next pulse earlier.
    pub fn nudge(&mut self, frames: i64) {
        self.elapsed += frames;
    }

    /// Frames counted towards the next pulse.
    pub fn elapsed(&self) -> i64 {
        self.elapsed
    }

    pub fn reset(&mut self) {
        self.elapsed = 0;
    }
}
