//! Local peak extraction on an ACF sequence.

/// Indices `i` with `values[i-1] < values[i] > values[i+1]`.
///
/// Endpoints are never peaks, and plateaus do not count since both
/// comparisons are strict.
pub fn local_peaks(values: &[f64]) -> Vec<usize> {
    values
        .windows(3)
        .enumerate()
        .filter(|(_, w)| w[1] > w[0] && w[1] > w[2])
        .map(|(i, _)| i + 1)
        .collect()
}
