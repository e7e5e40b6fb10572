//! VoiceEngine: fixed voice pool with circular allocation and block mixing.

use alloc::sync::Arc;
use alloc::vec::Vec;
use pg_ir::SampleBank;

use crate::trigger::TriggerSink;
use crate::voice::{pan_gains, Voice};

/// Number of voices in the pool.
pub const MAX_VOICES: usize = 256;

/// Plays samples from a shared bank through a fixed pool of voices.
///
/// The pool is allocated once in [`VoiceEngine::new`]. [`trigger`] and the
/// mix functions only touch that pool and the bank, so they are safe to call
/// from the audio callback.
///
/// [`trigger`]: VoiceEngine::trigger
pub struct VoiceEngine {
    voices: Vec<Voice>,
    /// Next slot to hand out (circular; overwrites whatever is there).
    next_voice: usize,
    bank: Option<Arc<SampleBank>>,
    sample_rate: u32,
    active_voices: u32,
    total_triggers: u64,
}

impl VoiceEngine {
    /// Allocate the voice pool. The engine stays silent until [`init`](Self::init).
    pub fn new() -> Self {
        Self {
            voices: (0..MAX_VOICES).map(|_| Voice::default()).collect(),
            next_voice: 0,
            bank: None,
            sample_rate: 0,
            active_voices: 0,
            total_triggers: 0,
        }
    }

    /// Attach a sample bank and reset all voices and statistics.
    pub fn init(&mut self, bank: Arc<SampleBank>, sample_rate: u32) {
        self.bank = Some(bank);
        self.sample_rate = sample_rate;
        self.next_voice = 0;
        self.active_voices = 0;
        self.total_triggers = 0;
        for voice in &mut self.voices {
            voice.reset();
        }
    }

    /// Has a bank been attached?
    pub fn is_initialized(&self) -> bool {
        self.bank.is_some()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Start playing the sample for `instrument`.
    ///
    /// Unknown instruments and empty samples are ignored. The voice under the
    /// cursor is stolen if it is still playing.
    pub fn trigger(&mut self, instrument: u8, velocity: f32, pan: f32) {
        let Some(bank) = self.bank.as_deref() else {
            return;
        };
        let Some((key, sample)) = bank.lookup(instrument) else {
            return;
        };
        if sample.is_empty() {
            return;
        }

        let gain = if velocity.is_nan() { 0.0 } else { velocity.clamp(0.0, 1.0) };
        let voice = &mut self.voices[self.next_voice];
        let was_active = voice.active;
        voice.start(key, sample.len() as u32, gain, pan_gains(pan));

        if !was_active {
            self.active_voices += 1;
        }
        self.total_triggers += 1;
        self.next_voice = (self.next_voice + 1) % MAX_VOICES;
    }

    /// Render all voices into a mono buffer (overwrites `output`).
    pub fn mix(&mut self, output: &mut [f32]) {
        output.fill(0.0);
        if output.is_empty() {
            return;
        }
        let Some(bank) = self.bank.as_deref() else {
            return;
        };

        for voice in self.voices.iter_mut().filter(|v| v.active) {
            match bank.get(voice.sample_key) {
                Some(sample) => voice.render_mono(&sample.data, output),
                None => voice.reset(),
            }
        }
        self.active_voices = count_active(&self.voices);
    }

    /// Render all voices into a stereo pair (overwrites both buffers).
    ///
    /// Renders `min(left.len(), right.len())` frames.
    pub fn mix_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        left.fill(0.0);
        right.fill(0.0);
        let frames = left.len().min(right.len());
        if frames == 0 {
            return;
        }
        let Some(bank) = self.bank.as_deref() else {
            return;
        };

        let (left, right) = (&mut left[..frames], &mut right[..frames]);
        for voice in self.voices.iter_mut().filter(|v| v.active) {
            match bank.get(voice.sample_key) {
                Some(sample) => voice.render_stereo(&sample.data, left, right),
                None => voice.reset(),
            }
        }
        self.active_voices = count_active(&self.voices);
    }

    /// Voices still playing after the last mix (or triggered since).
    pub fn active_voice_count(&self) -> u32 {
        self.active_voices
    }

    /// Triggers accepted since [`init`](Self::init).
    pub fn total_trigger_count(&self) -> u64 {
        self.total_triggers
    }

    /// Inspect a voice slot.
    pub fn voice(&self, index: usize) -> Option<&Voice> {
        self.voices.get(index)
    }
}

impl core::fmt::Debug for VoiceEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VoiceEngine")
            .field("sample_rate", &self.sample_rate)
            .field("initialized", &self.bank.is_some())
            .field("active_voices", &self.active_voices)
            .field("total_triggers", &self.total_triggers)
            .finish_non_exhaustive()
    }
}

impl Default for VoiceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerSink for VoiceEngine {
    fn trigger(&mut self, sample_id: u8, velocity: f32, pan: f32) {
        VoiceEngine::trigger(self, sample_id, velocity, pan);
    }
}

/// Full scan of the pool; cost does not depend on how many voices play.
fn count_active(voices: &[Voice]) -> u32 {
    voices.iter().filter(|v| v.active).count() as u32
}
