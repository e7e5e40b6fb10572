//! Loading a directory of note-named WAV samples.

use std::fs;
use std::path::{Path, PathBuf};

use pg_ir::{SampleBank, NOTE_COUNT};
use tracing::{debug, info, warn};

use crate::wav_format::load_wav;
use crate::FormatError;

/// Result of scanning a sample directory.
#[derive(Debug)]
pub struct LoadReport {
    pub bank: SampleBank,
    /// Files that produced a sample (duplicates included).
    pub loaded: usize,
    /// WAV files skipped for a bad name or failed decode.
    pub failed: usize,
}

/// MIDI note from a file name: the decimal field before the first `.`.
///
/// `"60.1.1.1.0.wav"` is note 60. Returns `None` outside `0..=127`.
pub fn parse_note(file_name: &str) -> Option<u8> {
    let (field, _) = file_name.split_once('.')?;
    let note: u32 = field.parse().ok()?;
    (note < NOTE_COUNT as u32).then_some(note as u8)
}

fn is_wav(name: &str) -> bool {
    name.len() >= 4 && name.as_bytes()[name.len() - 4..].eq_ignore_ascii_case(b".wav")
}

/// Load every `*.wav` in `dir` into a bank, resampled to `sample_rate`.
///
/// Hidden files and subdirectories are skipped. A second file for the same
/// note replaces the first. Fails when nothing could be loaded.
pub fn load_sample_dir(dir: &Path, sample_rate: u32) -> Result<LoadReport, FormatError> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|t| !t.is_dir()).unwrap_or(false))
        .map(|entry| entry.path())
        .collect();
    paths.sort();

    let mut report = LoadReport {
        bank: SampleBank::new(),
        loaded: 0,
        failed: 0,
    };

    for path in paths {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') || !is_wav(name) {
            continue;
        }
        let Some(note) = parse_note(name) else {
            warn!(file = %path.display(), "cannot read MIDI note from file name");
            report.failed += 1;
            continue;
        };

        let sample = fs::read(&path)
            .map_err(FormatError::from)
            .and_then(|bytes| load_wav(&bytes, name, note, sample_rate));
        match sample {
            Ok(sample) if sample.is_empty() => {
                warn!(file = %path.display(), "sample has no audio data");
                report.failed += 1;
            }
            Ok(sample) => {
                debug!(file = %path.display(), note, frames = sample.len(), "loaded sample");
                if report.bank.insert(sample).is_some() {
                    warn!(note, file = %path.display(), "duplicate note replaces earlier sample");
                }
                report.loaded += 1;
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "failed to load sample");
                report.failed += 1;
            }
        }
    }

    if report.bank.is_empty() {
        return Err(FormatError::NoSamples(dir.to_path_buf()));
    }
    info!(
        dir = %dir.display(),
        loaded = report.loaded,
        failed = report.failed,
        notes = report.bank.len(),
        "sample directory loaded"
    );
    Ok(report)
}
