//! Voice: one in-flight playback of a sample.

use core::f32::consts::{FRAC_1_SQRT_2, FRAC_PI_4};
use pg_ir::SampleKey;

/// A single voice reading frames from a sample in the bank.
#[derive(Clone, Copy, Debug)]
pub struct Voice {
    /// Which sample this voice plays.
    pub sample_key: SampleKey,
    /// Sample length in frames, captured at trigger time.
    pub length: u32,
    /// Current playback position in frames.
    pub position: u32,
    /// Linear gain (velocity).
    pub gain: f32,
    /// Left channel gain from panning.
    pub pan_left: f32,
    /// Right channel gain from panning.
    pub pan_right: f32,
    /// Is the voice currently producing audio?
    pub active: bool,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            sample_key: SampleKey::default(),
            length: 0,
            position: 0,
            gain: 1.0,
            pan_left: FRAC_1_SQRT_2,
            pan_right: FRAC_1_SQRT_2,
            active: false,
        }
    }
}

impl Voice {
    /// Restart this slot on a new sample, discarding whatever it was playing.
    pub fn start(&mut self, sample_key: SampleKey, length: u32, gain: f32, pan: (f32, f32)) {
        self.sample_key = sample_key;
        self.length = length;
        self.position = 0;
        self.gain = gain;
        self.pan_left = pan.0;
        self.pan_right = pan.1;
        self.active = true;
    }

    /// Return the slot to its inactive state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Has the voice played through its sample?
    pub fn is_finished(&self) -> bool {
        self.position >= self.length
    }

    /// Frames that can still be read from `data`.
    fn available(&self, data: &[f32]) -> usize {
        let end = (self.length as usize).min(data.len());
        end.saturating_sub(self.position as usize)
    }

    /// Sum up to `output.len()` frames into a mono buffer.
    pub fn render_mono(&mut self, data: &[f32], output: &mut [f32]) {
        let n = output.len().min(self.available(data));
        if n > 0 {
            let start = self.position as usize;
            for (out, s) in output[..n].iter_mut().zip(&data[start..start + n]) {
                *out += s * self.gain;
            }
        }
        self.advance(n, data);
    }

    /// Sum up to `left.len()` frames into a stereo pair using the pan gains.
    pub fn render_stereo(&mut self, data: &[f32], left: &mut [f32], right: &mut [f32]) {
        let n = left.len().min(right.len()).min(self.available(data));
        if n > 0 {
            let start = self.position as usize;
            let gl = self.gain * self.pan_left;
            let gr = self.gain * self.pan_right;
            let src = &data[start..start + n];
            for ((l, r), s) in left[..n].iter_mut().zip(right[..n].iter_mut()).zip(src) {
                *l += s * gl;
                *r += s * gr;
            }
        }
        self.advance(n, data);
    }

    /// Move the play head and retire the voice at the end of its sample.
    fn advance(&mut self, frames: usize, data: &[f32]) {
        self.position += frames as u32;
        // A bank entry shorter than the captured length ends the voice early.
        if self.available(data) == 0 {
            self.position = self.length;
        }
        if self.is_finished() {
            self.active = false;
        }
    }
}

/// Equal-power pan law: `pan` in [-1, 1] maps to (left, right) gains with
/// `left² + right² = 1`. Out-of-range values are clamped, NaN is centre.
pub fn pan_gains(pan: f32) -> (f32, f32) {
    let pan = if pan.is_nan() { 0.0 } else { pan.clamp(-1.0, 1.0) };
    let theta = (pan + 1.0) * FRAC_PI_4;
    (libm::cosf(theta), libm::sinf(theta))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(length: u32, gain: f32, pan: f32) -> Voice {
        let mut v = Voice::default();
        v.start(SampleKey::default(), length, gain, pan_gains(pan));
        v
    }

    #[test]
    fn default_voice_is_inactive_and_centred() {
        let v = Voice::default();
        assert!(!v.active);
        assert_eq!(v.pan_left, v.pan_right);
    }

    #[test]
    fn pan_law_keeps_power_constant() {
        for i in 0..=40 {
            let p = -1.0 + i as f32 * 0.05;
            let (l, r) = pan_gains(p);
            assert!((l * l + r * r - 1.0).abs() < 1e-5, "pan {}: {} {}", p, l, r);
        }
    }

    #[test]
    fn pan_extremes_and_centre() {
        let (l, r) = pan_gains(-1.0);
        assert!((l - 1.0).abs() < 1e-6);
        assert!(r.abs() < 1e-6);

        let (l, r) = pan_gains(1.0);
        assert!(l.abs() < 1e-6);
        assert!((r - 1.0).abs() < 1e-6);

        let (l, r) = pan_gains(0.0);
        assert!((l - r).abs() < 1e-6);
        assert!((l - 0.70710678).abs() < 1e-5);
    }

    #[test]
    fn pan_out_of_range_is_clamped() {
        assert_eq!(pan_gains(-3.0), pan_gains(-1.0));
        assert_eq!(pan_gains(7.5), pan_gains(1.0));
        assert_eq!(pan_gains(f32::NAN), pan_gains(0.0));
    }

    #[test]
    fn render_mono_applies_gain_and_advances() {
        let data = [1.0, 0.5, -0.5, -1.0];
        let mut v = playing(4, 0.5, 0.0);
        let mut out = [0.0; 2];
        v.render_mono(&data, &mut out);
        assert_eq!(out, [0.5, 0.25]);
        assert_eq!(v.position, 2);
        assert!(v.active);
    }

    #[test]
    fn render_stops_mid_buffer() {
        let data = [1.0; 3];
        let mut v = playing(3, 1.0, 0.0);
        let mut out = [0.0; 8];
        v.render_mono(&data, &mut out);
        assert_eq!(&out[..3], &[1.0; 3]);
        assert!(out[3..].iter().all(|&s| s == 0.0));
        assert!(!v.active);
    }

    #[test]
    fn render_stops_exactly_at_boundary() {
        let data = [1.0; 4];
        let mut v = playing(4, 1.0, 0.0);
        let mut out = [0.0; 4];
        v.render_mono(&data, &mut out);
        assert!(!v.active);
        assert_eq!(v.position, 4);
    }

    #[test]
    fn render_stereo_hard_left() {
        let data = [1.0; 4];
        let mut v = playing(4, 1.0, -1.0);
        let mut left = [0.0; 4];
        let mut right = [0.0; 4];
        v.render_stereo(&data, &mut left, &mut right);
        assert!(left.iter().all(|&s| (s - 1.0).abs() < 1e-6));
        assert!(right.iter().all(|&s| s.abs() < 1e-6));
    }

    #[test]
    fn short_bank_entry_ends_voice() {
        let data = [1.0; 2];
        let mut v = playing(10, 1.0, 0.0);
        let mut out = [0.0; 4];
        v.render_mono(&data, &mut out);
        assert!(!v.active);
        assert_eq!(&out, &[1.0, 1.0, 0.0, 0.0]);
    }
}
