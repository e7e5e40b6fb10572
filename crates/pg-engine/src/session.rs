//! A scheduler and voice engine bundled for the audio callback.

use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use alloc::sync::Arc;

use crate::oracle::PatternOracle;
use crate::scheduler::PatternScheduler;
use crate::voice_engine::VoiceEngine;

/// Everything the audio callback owns. Configure it, then move it into the
/// callback closure.
#[derive(Debug)]
pub struct Session<O> {
    pub scheduler: PatternScheduler<O>,
    pub engine: VoiceEngine,
    output_gain: f32,
    stats: Arc<SessionStats>,
}

impl<O: PatternOracle> Session<O> {
    pub fn new(scheduler: PatternScheduler<O>, engine: VoiceEngine) -> Self {
        Self {
            scheduler,
            engine,
            output_gain: 1.0,
            stats: Arc::new(SessionStats::default()),
        }
    }

    /// Global output gain, floored at 0.
    pub fn set_output_gain(&mut self, gain: f32) {
        self.output_gain = if gain.is_nan() { 0.0 } else { gain.max(0.0) };
    }

    pub fn output_gain(&self) -> f32 {
        self.output_gain
    }

    /// Counters readable from other threads while the session plays.
    pub fn stats(&self) -> Arc<SessionStats> {
        Arc::clone(&self.stats)
    }

    /// Render one stereo block: schedule, mix, apply gain.
    ///
    /// The block length is the shorter of the two slices.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        #[cfg(feature = "alloc_check")]
        assert_no_alloc::assert_no_alloc(|| self.render_block(left, right));
        #[cfg(not(feature = "alloc_check"))]
        self.render_block(left, right);
    }

    fn render_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        let frames = left.len().min(right.len());
        let (left, right) = (&mut left[..frames], &mut right[..frames]);
        self.scheduler.process(frames as u32, &mut self.engine);
        self.engine.mix_stereo(left, right);
        if self.output_gain != 1.0 {
            for s in left.iter_mut().chain(right.iter_mut()) {
                *s *= self.output_gain;
            }
        }
        self.stats.record(&self.engine, frames);
    }

    /// Render one mono block.
    pub fn render_mono(&mut self, output: &mut [f32]) {
        self.scheduler.process(output.len() as u32, &mut self.engine);
        self.engine.mix(output);
        if self.output_gain != 1.0 {
            for s in output.iter_mut() {
                *s *= self.output_gain;
            }
        }
        self.stats.record(&self.engine, output.len());
    }
}

/// Playback counters published by the audio thread.
#[derive(Debug, Default)]
pub struct SessionStats {
    active_voices: AtomicU32,
    total_triggers: AtomicU64,
    frames_rendered: AtomicU64,
}

impl SessionStats {
    pub fn record(&self, engine: &VoiceEngine, frames: usize) {
        self.active_voices
            .store(engine.active_voice_count(), Ordering::Relaxed);
        self.total_triggers
            .store(engine.total_trigger_count(), Ordering::Relaxed);
        self.frames_rendered
            .fetch_add(frames as u64, Ordering::Relaxed);
    }

    pub fn active_voices(&self) -> u32 {
        self.active_voices.load(Ordering::Relaxed)
    }

    pub fn total_triggers(&self) -> u64 {
        self.total_triggers.load(Ordering::Relaxed)
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered.load(Ordering::Relaxed)
    }
}
