//! Headless controller for the pulsegrid sequencer.
//!
//! Loads samples, builds a [`Session`] from a [`SessionConfig`], and either
//! plays it through the default audio device or renders it to WAV.

mod config;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use pg_audio::{AudioOutput, CpalOutput};
use pg_engine::{PatternChanges, PatternScheduler, Session, VoiceEngine};
use pg_ir::SampleBank;
use pg_oracle::MapOracle;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

pub use config::SessionConfig;
pub use pg_audio::AudioError;
pub use pg_engine::{PatternSnapshot, SessionStats};
pub use pg_formats::FormatError;

/// Frames rendered per block when rendering offline.
const RENDER_BLOCK: usize = 512;

/// Error type for controller operations.
#[derive(Debug, thiserror::Error)]
pub enum MasterError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds sessions and manages live playback.
pub struct Controller {
    config: SessionConfig,
    playback: Option<PlaybackHandle>,
}

struct PlaybackHandle {
    /// Keeps the stream alive; dropping it stops the callback.
    output: CpalOutput,
    changes: Option<PatternChanges>,
    stats: Arc<SessionStats>,
}

impl Controller {
    pub fn new(config: SessionConfig) -> Self {
        Self { config, playback: None }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Load the sample directory, resampled to `sample_rate`.
    pub fn load_bank(&self, sample_rate: u32) -> Result<Arc<SampleBank>, MasterError> {
        let report = pg_formats::load_sample_dir(&self.config.samples_dir, sample_rate)?;
        info!(
            notes = ?report.bank.notes(),
            failed = report.failed,
            "samples ready"
        );
        Ok(Arc::new(report.bank))
    }

    /// Build a configured session over `bank` at `sample_rate`.
    pub fn build_session(&self, bank: Arc<SampleBank>, sample_rate: u32) -> Session<MapOracle> {
        let cfg = &self.config;
        let mut rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut scheduler = PatternScheduler::new(MapOracle::new(), sample_rate, cfg.bpm);
        scheduler.set_pattern_x(cfg.x);
        scheduler.set_pattern_y(cfg.y);
        scheduler.set_randomness(cfg.randomness);
        scheduler.set_pattern_length(cfg.pattern_length);
        scheduler.assign_instruments(&mut rng, &bank.notes(), cfg.parts, cfg.velocity_steps);
        scheduler.set_spread(cfg.spread);
        scheduler.set_humanize(cfg.humanize);
        scheduler.set_lfo_enabled(cfg.lfo);

        let mut engine = VoiceEngine::new();
        engine.init(bank, sample_rate);

        let mut session = Session::new(scheduler, engine);
        session.set_output_gain(cfg.output_gain);
        info!(
            sample_rate,
            bpm = session.scheduler.tempo(),
            frames_per_pulse = session.scheduler.frames_per_pulse(),
            mappings = session.scheduler.mappings().len(),
            lfo = cfg.lfo,
            humanize = cfg.humanize,
            spread = cfg.spread,
            gain = session.output_gain(),
            "session built"
        );
        session
    }

    // --- Real-time playback ---

    /// Start live playback on the default device.
    ///
    /// Returns the pattern in effect at start; later changes arrive through
    /// [`poll_pattern`](Self::poll_pattern).
    pub fn play(&mut self) -> Result<PatternSnapshot, MasterError> {
        self.stop();

        let mut output = CpalOutput::new()?;
        let sample_rate = output.sample_rate();
        let bank = self.load_bank(sample_rate)?;
        let mut session = self.build_session(bank, sample_rate);

        let initial = session.scheduler.current_pattern();
        let changes = session.scheduler.take_pattern_changes();
        let stats = session.stats();
        output.play(session)?;
        info!(sample_rate, channels = output.channels(), "playback started");

        self.playback = Some(PlaybackHandle { output, changes, stats });
        Ok(initial)
    }

    pub fn stop(&mut self) {
        if let Some(mut pb) = self.playback.take() {
            if let Err(e) = pb.output.stop() {
                warn!(error = %e, "failed to pause audio stream");
            }
            debug!(frames = pb.stats.frames_rendered(), "playback stopped");
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    /// Newest pattern published since the last poll.
    pub fn poll_pattern(&mut self) -> Option<PatternSnapshot> {
        self.playback.as_mut()?.changes.as_mut()?.poll()
    }

    pub fn stats(&self) -> Option<Arc<SessionStats>> {
        self.playback.as_ref().map(|pb| Arc::clone(&pb.stats))
    }

    // --- Offline rendering ---

    /// Render `frames` stereo frames of a fresh session.
    pub fn render_frames(
        &self,
        bank: Arc<SampleBank>,
        sample_rate: u32,
        frames: usize,
    ) -> (Vec<f32>, Vec<f32>) {
        let mut session = self.build_session(bank, sample_rate);
        let mut left = vec![0.0f32; frames];
        let mut right = vec![0.0f32; frames];
        for (l, r) in left
            .chunks_mut(RENDER_BLOCK)
            .zip(right.chunks_mut(RENDER_BLOCK))
        {
            session.render(l, r);
        }
        let stats = session.stats();
        info!(
            frames,
            triggers = stats.total_triggers(),
            "render finished"
        );
        (left, right)
    }

    /// Render `seconds` of audio into a 16-bit stereo WAV at `path`.
    pub fn render_to_wav(
        &self,
        path: &Path,
        sample_rate: u32,
        seconds: u32,
    ) -> Result<usize, MasterError> {
        let bank = self.load_bank(sample_rate)?;
        let frames = sample_rate as usize * seconds as usize;
        let (left, right) = self.render_frames(bank, sample_rate, frames);

        let mut w = BufWriter::new(File::create(path)?);
        pg_formats::write_wav(&mut w, &left, &right, sample_rate)?;
        w.flush()?;
        info!(path = %path.display(), frames, "wrote WAV");
        Ok(frames)
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop();
    }
}
