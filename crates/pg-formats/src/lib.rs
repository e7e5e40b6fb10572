//! File formats for the pulsegrid sequencer.
//!
//! Decodes WAV samples to mono `f32`, resamples them to the output rate and
//! loads a directory of note-named samples into a [`SampleBank`]. Also
//! writes rendered stereo output back to WAV.
//!
//! [`SampleBank`]: pg_ir::SampleBank

mod resample;
mod sample_dir;
mod wav_format;

use std::path::PathBuf;

pub use resample::resample_linear;
pub use sample_dir::{load_sample_dir, parse_note, LoadReport};
pub use wav_format::{decode_wav, load_wav, write_wav, DecodedWav};

/// Error type for format parsing and sample loading.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("invalid WAV header: {0}")]
    InvalidHeader(&'static str),

    #[error("unexpected end of file")]
    UnexpectedEof,

    #[error("unsupported WAV encoding: {format:?}, {channels} channel(s), {bits} bits")]
    Unsupported {
        format: hound::SampleFormat,
        channels: u16,
        bits: u16,
    },

    #[error("WAV decode error: {0}")]
    Wav(hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no samples could be loaded from {}", .0.display())]
    NoSamples(PathBuf),
}

impl From<hound::Error> for FormatError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                FormatError::UnexpectedEof
            }
            hound::Error::IoError(e) => FormatError::Io(e),
            hound::Error::FormatError(msg) => FormatError::InvalidHeader(msg),
            other => FormatError::Wav(other),
        }
    }
}
