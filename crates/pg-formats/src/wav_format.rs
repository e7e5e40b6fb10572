//! WAV encoding and decoding.

use std::io::{Cursor, Write};

use hound::{SampleFormat, WavReader};
use pg_ir::Sample;

use crate::resample::resample_linear;
use crate::FormatError;

const FORMAT_PCM: u16 = 1;

// --- Writing ---

/// Write a 16-bit stereo WAV from a pair of `f32` channels.
///
/// Samples are clipped to [-1, 1]. The frame count is the shorter channel.
pub fn write_wav(
    w: &mut impl Write,
    left: &[f32],
    right: &[f32],
    sample_rate: u32,
) -> std::io::Result<()> {
    let num_channels: u16 = 2;
    let bits_per_sample: u16 = 16;
    let block_align = num_channels * (bits_per_sample / 8);
    let frames = left.len().min(right.len());
    let data_size = frames as u32 * block_align as u32;

    write_riff_header(w, data_size)?;
    write_fmt_chunk(w, num_channels, sample_rate, block_align, bits_per_sample)?;
    write_data_chunk(w, &left[..frames], &right[..frames], data_size)
}

fn write_riff_header(w: &mut impl Write, data_size: u32) -> std::io::Result<()> {
    w.write_all(b"RIFF")?;
    w.write_all(&(36 + data_size).to_le_bytes())?;
    w.write_all(b"WAVE")
}

fn write_fmt_chunk(
    w: &mut impl Write,
    num_channels: u16,
    sample_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
) -> std::io::Result<()> {
    w.write_all(b"fmt ")?;
    w.write_all(&16u32.to_le_bytes())?;
    w.write_all(&FORMAT_PCM.to_le_bytes())?;
    w.write_all(&num_channels.to_le_bytes())?;
    w.write_all(&sample_rate.to_le_bytes())?;
    w.write_all(&(sample_rate * block_align as u32).to_le_bytes())?;
    w.write_all(&block_align.to_le_bytes())?;
    w.write_all(&bits_per_sample.to_le_bytes())
}

fn write_data_chunk(
    w: &mut impl Write,
    left: &[f32],
    right: &[f32],
    data_size: u32,
) -> std::io::Result<()> {
    w.write_all(b"data")?;
    w.write_all(&data_size.to_le_bytes())?;
    for (&l, &r) in left.iter().zip(right) {
        w.write_all(&to_i16(l).to_le_bytes())?;
        w.write_all(&to_i16(r).to_le_bytes())?;
    }
    Ok(())
}

fn to_i16(s: f32) -> i16 {
    (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

// --- Reading ---

/// A decoded WAV: mono samples at the file's own rate.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedWav {
    pub sample_rate: u32,
    /// Channel count of the file; stereo input has been averaged.
    pub channels: u16,
    pub data: Vec<f32>,
}

/// Decode a WAV file to mono `f32`.
///
/// Accepts integer PCM up to 32 bits and 32-bit float, mono or stereo.
pub fn decode_wav(data: &[u8]) -> Result<DecodedWav, FormatError> {
    let mut reader = WavReader::new(Cursor::new(data))?;
    let spec = reader.spec();

    let supported = match spec.sample_format {
        SampleFormat::Int => (1..=32).contains(&spec.bits_per_sample),
        SampleFormat::Float => spec.bits_per_sample == 32,
    };
    if !supported || !(1..=2).contains(&spec.channels) {
        return Err(FormatError::Unsupported {
            format: spec.sample_format,
            channels: spec.channels,
            bits: spec.bits_per_sample,
        });
    }

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let full_scale = (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<Result<_, _>>()?
        }
    };

    let data = match spec.channels {
        1 => samples,
        _ => samples
            .chunks_exact(2)
            .map(|pair| (pair[0] + pair[1]) * 0.5)
            .collect(),
    };
    Ok(DecodedWav {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        data,
    })
}

/// Decode a WAV file into a [`Sample`] for `note`, resampled to `target_rate`.
pub fn load_wav(
    data: &[u8],
    name: &str,
    note: u8,
    target_rate: u32,
) -> Result<Sample, FormatError> {
    let decoded = decode_wav(data)?;
    let samples = if decoded.sample_rate == target_rate {
        decoded.data
    } else {
        resample_linear(&decoded.data, decoded.sample_rate, target_rate)
    };
    Ok(Sample::new(name, note, samples))
}
