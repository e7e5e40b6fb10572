//! Audio output trait and error types.

/// Error type for audio operations.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no audio output device available")]
    NoDevice,

    #[error("device init error: {0}")]
    DeviceInit(String),

    #[error("stream create error: {0}")]
    StreamCreate(String),

    #[error("playback error: {0}")]
    Playback(String),
}

/// A device that pulls audio from a running session.
pub trait AudioOutput {
    /// Device sample rate; sessions must be built for this rate.
    fn sample_rate(&self) -> u32;

    /// Resume a paused stream.
    fn start(&mut self) -> Result<(), AudioError>;

    /// Pause the stream; the callback outputs silence meanwhile.
    fn stop(&mut self) -> Result<(), AudioError>;
}
