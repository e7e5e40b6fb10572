//! Linear-interpolation resampling.

/// Resample `input` from `input_rate` to `output_rate`.
///
/// The output holds `ceil(len * ratio)` samples. Positions between two
/// input samples are interpolated; the last input sample is held and
/// anything past it is silence. Empty input or a zero rate yields an empty
/// buffer.
pub fn resample_linear(input: &[f32], input_rate: u32, output_rate: u32) -> Vec<f32> {
    if input.is_empty() || input_rate == 0 || output_rate == 0 {
        return Vec::new();
    }
    let ratio = output_rate as f64 / input_rate as f64;
    let output_len = (input.len() as u64 * output_rate as u64).div_ceil(input_rate as u64) as usize;

    (0..output_len)
        .map(|i| {
            let pos = i as f64 / ratio;
            let index = pos as usize;
            let frac = pos - index as f64;
            match (input.get(index), input.get(index + 1)) {
                (Some(&a), Some(&b)) => (a as f64 * (1.0 - frac) + b as f64 * frac) as f32,
                (Some(&a), None) => a,
                _ => 0.0,
            }
        })
        .collect()
}
