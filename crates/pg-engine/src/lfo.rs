//! Slow sine LFO used to drift oracle coordinates.

use core::f32::consts::TAU;

/// A sine oscillator whose phase is advanced in frames.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Lfo {
    /// Current phase in radians, kept in [0, 2π).
    pub phase: f32,
    /// Phase increment per frame, in radians.
    pub frequency: f32,
}

impl Lfo {
    /// An LFO completing one cycle every `period_seconds`.
    pub fn with_period(period_seconds: f32, sample_rate: u32, phase: f32) -> Self {
        let frames = period_seconds * sample_rate as f32;
        let frequency = if frames > 0.0 { TAU / frames } else { 0.0 };
        Self {
            phase: wrap_phase(phase),
            frequency,
        }
    }

    /// Advance by `frames` audio frames.
    pub fn advance(&mut self, frames: u32) {
        self.phase = wrap_phase(self.phase + self.frequency * frames as f32);
    }

    /// Map coordinate for the current phase: `127.5 + 127.5·sin(phase)`.
    pub fn coordinate(&self) -> u8 {
        let value = 127.5 + 127.5 * libm::sinf(self.phase);
        value.clamp(0.0, 255.0) as u8
    }
}

fn wrap_phase(phase: f32) -> f32 {
    let wrapped = libm::fmodf(phase, TAU);
    if wrapped < 0.0 {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Bounds for randomly chosen LFO periods.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LfoRange {
    pub min_seconds: f32,
    pub max_seconds: f32,
}

impl LfoRange {
    pub fn new(min_seconds: f32, max_seconds: f32) -> Self {
        let min_seconds = min_seconds.max(0.001);
        Self {
            min_seconds,
            max_seconds: max_seconds.max(min_seconds),
        }
    }
}

impl Default for LfoRange {
    fn default() -> Self {
        Self {
            min_seconds: 15.0,
            max_seconds: 45.0,
        }
    }
}
