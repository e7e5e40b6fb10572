//! The pattern oracle seam: a pulse-clocked, deterministic drum map.

use pg_ir::{DrumPart, NUM_PARTS};

/// Clock resolution of the oracle.
pub const PULSES_PER_QUARTER_NOTE: u32 = 24;

/// Pulses per pattern step.
pub const PULSES_PER_STEP: u32 = 3;

/// Longest pattern any oracle exposes.
pub const MAX_PATTERN_LENGTH: u8 = 32;

/// Mutable control inputs of the oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OracleSettings {
    /// Map coordinate X (0-255).
    pub x: u8,
    /// Map coordinate Y (0-255).
    pub y: u8,
    /// Amount of random perturbation (0-255).
    pub randomness: u8,
    /// Per-part fill density (0-255); a hit fires when `level > !density`.
    pub density: [u8; NUM_PARTS],
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            x: 128,
            y: 128,
            randomness: 0,
            density: [128; NUM_PARTS],
        }
    }
}

/// A deterministic trigger source advanced one pulse at a time.
///
/// Everything except the settings accessors is called from the audio
/// callback and must be allocation-free.
pub trait PatternOracle {
    /// Rewind to just before the first pulse of step 0.
    fn reset_clock(&mut self);

    /// Advance the clock by `pulses`.
    fn advance_clock(&mut self, pulses: u8);

    /// Step the clock is on.
    fn current_step(&self) -> u8;

    /// Jump to `step` (used to wrap shortened patterns).
    fn set_step(&mut self, step: u8);

    /// Parts firing on the current pulse, one bit per [`DrumPart`].
    fn trigger_bitmask(&self) -> u8;

    /// Count one pulse of gate time; closes the gate opened by a step.
    fn advance_gate_counter(&mut self);

    /// Level (0-255) of `part` at `step` for map coordinates (x, y).
    fn level(&self, step: u8, part: DrumPart, x: u8, y: u8) -> u8;

    /// Steps in one full pattern.
    fn native_length(&self) -> u8 {
        MAX_PATTERN_LENGTH
    }

    fn settings(&self) -> &OracleSettings;

    fn settings_mut(&mut self) -> &mut OracleSettings;

    /// Threshold a level must exceed for `part` to fire.
    fn density_threshold(&self, part: DrumPart) -> u8 {
        !self.settings().density[part.index()]
    }
}

/// The oracle's firing rule. Inverting the comparison inverts density.
pub fn fires(level: u8, threshold: u8) -> bool {
    level > threshold
}
