//! CPAL-based audio output backend.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use pg_engine::{PatternOracle, Session};
use tracing::{info, warn};

use crate::traits::{AudioError, AudioOutput};

/// Largest block rendered in one go; longer device buffers are split.
pub const MAX_BLOCK_FRAMES: usize = 4096;

/// CPAL output that renders a [`Session`] inside the device callback.
pub struct CpalOutput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    running: Arc<AtomicBool>,
}

impl CpalOutput {
    /// Open the default output device with its default configuration.
    pub fn new() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let supported = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceInit(e.to_string()))?;
        if supported.sample_format() != SampleFormat::F32 {
            warn!(
                format = ?supported.sample_format(),
                "device prefers non-f32 samples, requesting f32"
            );
        }
        let config: StreamConfig = supported.into();

        info!(
            device = %device.name().unwrap_or_else(|_| "unknown".into()),
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            "audio device opened"
        );

        Ok(Self {
            device,
            config,
            stream: None,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Move `session` into the device callback and start the stream.
    ///
    /// The session must have been built for [`sample_rate`](AudioOutput::sample_rate).
    /// Dropping the output stops playback.
    pub fn play<O>(&mut self, mut session: Session<O>) -> Result<(), AudioError>
    where
        O: PatternOracle + Send + 'static,
    {
        let running = self.running.clone();
        let channels = self.config.channels.max(1) as usize;
        let mut left = vec![0.0f32; MAX_BLOCK_FRAMES];
        let mut right = vec![0.0f32; MAX_BLOCK_FRAMES];

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if !running.load(Ordering::Relaxed) {
                        data.fill(0.0);
                        return;
                    }
                    for chunk in data.chunks_mut(channels * MAX_BLOCK_FRAMES) {
                        let frames = chunk.len() / channels;
                        let (l, r) = (&mut left[..frames], &mut right[..frames]);
                        session.render(l, r);
                        write_interleaved(chunk, channels, l, r);
                    }
                },
                |err| warn!(error = %err, "audio stream error"),
                None,
            )
            .map_err(|e| AudioError::StreamCreate(e.to_string()))?;

        self.running.store(true, Ordering::Relaxed);
        stream.play().map_err(|e| AudioError::Playback(e.to_string()))?;
        self.stream = Some(stream);
        Ok(())
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }
}

/// Interleave a stereo pair into `out`: left and right on the first two
/// channels, silence on any others. A mono device gets the average.
pub(crate) fn write_interleaved(out: &mut [f32], channels: usize, left: &[f32], right: &[f32]) {
    for ((frame, &l), &r) in out.chunks_mut(channels).zip(left).zip(right) {
        if channels == 1 {
            frame[0] = (l + r) * 0.5;
            continue;
        }
        for (i, sample) in frame.iter_mut().enumerate() {
            *sample = match i {
                0 => l,
                1 => r,
                _ => 0.0,
            };
        }
    }
}

impl AudioOutput for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn start(&mut self) -> Result<(), AudioError> {
        self.running.store(true, Ordering::Relaxed);
        if let Some(ref stream) = self.stream {
            stream.play().map_err(|e| AudioError::Playback(e.to_string()))?;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.running.store(false, Ordering::Relaxed);
        if let Some(ref stream) = self.stream {
            stream.pause().map_err(|e| AudioError::Playback(e.to_string()))?;
        }
        Ok(())
    }
}
