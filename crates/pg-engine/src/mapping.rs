//! Instrument mappings: which sample plays for which drum part, and how.

use core::f32::consts::TAU;
use core::fmt;

use arrayvec::ArrayVec;
use pg_ir::{DrumPart, NUM_PARTS, NOTE_COUNT};
use rand::Rng;

use crate::lfo::{Lfo, LfoRange};

/// At most one mapping per MIDI note.
pub const MAX_MAPPINGS: usize = NOTE_COUNT;

/// Longest velocity sequence.
pub const MAX_VELOCITY_STEPS: usize = 32;

/// Gain of a high velocity step.
pub const HIGH_VELOCITY: f32 = 1.0;

/// Gain of a low velocity step.
pub const LOW_VELOCITY: f32 = 0.1;

/// Binary accent sequence: `true` is a high step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VelocityPattern(ArrayVec<bool, MAX_VELOCITY_STEPS>);

impl VelocityPattern {
    /// Uniformly random pattern; the length is clamped to `1..=32`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, steps: usize) -> Self {
        let steps = steps.clamp(1, MAX_VELOCITY_STEPS);
        Self((0..steps).map(|_| rng.gen::<bool>()).collect())
    }

    /// Pattern from explicit steps. Extra steps are dropped; an empty slice
    /// becomes a single high step.
    pub fn from_steps(steps: &[bool]) -> Self {
        let mut pattern: ArrayVec<bool, MAX_VELOCITY_STEPS> =
            steps.iter().copied().take(MAX_VELOCITY_STEPS).collect();
        if pattern.is_empty() {
            pattern.push(true);
        }
        Self(pattern)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_high(&self, step: usize) -> bool {
        self.0.get(step).copied().unwrap_or(false)
    }

    pub fn steps(&self) -> &[bool] {
        &self.0
    }
}

impl fmt::Display for VelocityPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &high in &self.0 {
            f.write_str(if high { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// One selected instrument and its per-mapping sequencing state.
#[derive(Clone, Debug, PartialEq)]
pub struct InstrumentMapping {
    pub sample_id: u8,
    pub part: DrumPart,
    pub x: u8,
    pub y: u8,
    pub velocity_pattern: VelocityPattern,
    /// Cursor into `velocity_pattern`, always `< velocity_pattern.len()`.
    pub velocity_step: usize,
    pub pan: f32,
    pub lfo_x: Lfo,
    pub lfo_y: Lfo,
}

impl InstrumentMapping {
    pub fn new(sample_id: u8, part: DrumPart, velocity_pattern: VelocityPattern) -> Self {
        Self {
            sample_id,
            part,
            x: 128,
            y: 128,
            velocity_pattern,
            velocity_step: 0,
            pan: 0.0,
            lfo_x: Lfo::default(),
            lfo_y: Lfo::default(),
        }
    }

    /// Random part, coordinates, velocity pattern and LFO periods/phases.
    pub fn random<R: Rng + ?Sized>(
        rng: &mut R,
        sample_id: u8,
        velocity_steps: usize,
        lfo_range: LfoRange,
        sample_rate: u32,
    ) -> Self {
        let part = DrumPart::from_index(rng.gen_range(0..NUM_PARTS)).unwrap_or_default();
        let x = rng.gen();
        let y = rng.gen();
        let velocity_pattern = VelocityPattern::random(rng, velocity_steps);
        let lfo_x = random_lfo(rng, lfo_range, sample_rate);
        let lfo_y = random_lfo(rng, lfo_range, sample_rate);
        Self {
            sample_id,
            part,
            x,
            y,
            velocity_pattern,
            velocity_step: 0,
            pan: 0.0,
            lfo_x,
            lfo_y,
        }
    }

    /// Velocity at the cursor; moves the cursor on. Call once per firing.
    pub fn next_velocity(&mut self) -> f32 {
        let len = self.velocity_pattern.len().max(1);
        let high = self.velocity_pattern.is_high(self.velocity_step);
        self.velocity_step = (self.velocity_step + 1) % len;
        if high {
            HIGH_VELOCITY
        } else {
            LOW_VELOCITY
        }
    }

    /// Advance both LFOs and refresh the drifted coordinates.
    pub fn advance_lfo(&mut self, frames: u32) {
        self.lfo_x.advance(frames);
        self.lfo_y.advance(frames);
        self.x = self.lfo_x.coordinate();
        self.y = self.lfo_y.coordinate();
    }
}

fn random_lfo<R: Rng + ?Sized>(rng: &mut R, range: LfoRange, sample_rate: u32) -> Lfo {
    let period = if range.max_seconds > range.min_seconds {
        rng.gen_range(range.min_seconds..range.max_seconds)
    } else {
        range.min_seconds
    };
    let phase = rng.gen_range(0.0..TAU);
    Lfo::with_period(period, sample_rate, phase)
}

/// Pan positions spread evenly over `[-amount, amount]` for `count` mappings.
///
/// A single mapping always sits in the centre.
pub fn spread_pan(index: usize, count: usize, amount: f32) -> f32 {
    if count <= 1 {
        return 0.0;
    }
    let t = index as f32 / (count - 1) as f32;
    -amount + 2.0 * amount * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn velocity_cursor_wraps() {
        let pattern = VelocityPattern::from_steps(&[true, false, false]);
        let mut m = InstrumentMapping::new(36, DrumPart::Bd, pattern);
        let got: [f32; 4] = core::array::from_fn(|_| m.next_velocity());
        assert_eq!(got, [HIGH_VELOCITY, LOW_VELOCITY, LOW_VELOCITY, HIGH_VELOCITY]);
        assert_eq!(m.velocity_step, 1);
    }

    #[test]
    fn random_pattern_length_is_clamped() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(VelocityPattern::random(&mut rng, 0).len(), 1);
        assert_eq!(VelocityPattern::random(&mut rng, 100).len(), MAX_VELOCITY_STEPS);
        assert_eq!(VelocityPattern::random(&mut rng, 7).len(), 7);
    }

    #[test]
    fn empty_steps_become_single_high() {
        let pattern = VelocityPattern::from_steps(&[]);
        assert_eq!(pattern.steps(), &[true]);
    }

    #[test]
    fn pattern_displays_as_bits() {
        let pattern = VelocityPattern::from_steps(&[true, false, true, true]);
        assert_eq!(format!("{pattern}"), "1011");
    }

    #[test]
    fn random_mapping_lfo_within_range() {
        let mut rng = SmallRng::seed_from_u64(42);
        let range = LfoRange::default();
        for id in 0..20 {
            let m = InstrumentMapping::random(&mut rng, id, 16, range, 48000);
            assert_eq!(m.sample_id, id);
            assert_eq!(m.velocity_pattern.len(), 16);
            for lfo in [m.lfo_x, m.lfo_y] {
                let period = TAU / lfo.frequency / 48000.0;
                assert!(period >= 14.9 && period <= 45.1, "period {period}");
                assert!(lfo.phase >= 0.0 && lfo.phase < TAU);
            }
        }
    }

    #[test]
    fn spread_positions() {
        assert_eq!(spread_pan(0, 1, 1.0), 0.0);
        assert_eq!(spread_pan(0, 3, 0.5), -0.5);
        assert_eq!(spread_pan(1, 3, 0.5), 0.0);
        assert_eq!(spread_pan(2, 3, 0.5), 0.5);
    }

    #[test]
    fn advance_lfo_updates_coordinates() {
        let mut m = InstrumentMapping::new(1, DrumPart::Hh, VelocityPattern::from_steps(&[true]));
        m.lfo_x = Lfo { phase: 0.0, frequency: core::f32::consts::FRAC_PI_2 };
        m.lfo_y = Lfo { phase: 0.0, frequency: 0.0 };
        m.advance_lfo(1);
        assert_eq!(m.x, 255);
        assert_eq!(m.y, 127);
    }
}
