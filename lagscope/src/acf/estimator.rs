//! Sample autocorrelation estimator.
//!
//! Computes r(k) = c(k) / c(0) where
//! c(k) = (1/n) * sum_{t=k}^{n-1} (x_t - mean) * (x_{t-k} - mean).
//!
//! The FFT path zero-pads the centered series to avoid circular wrap-around,
//! so both paths agree to floating-point tolerance.

use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// How the autocovariance sums are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcfMethod {
    /// Convolution through a zero-padded FFT, O(n log n).
    #[default]
    Fft,
    /// Direct summation, O(n * nlags).
    Direct,
}

/// Highest lag analysed for a series of `n` observations.
pub fn lag_count(n: usize, max_lags: usize) -> usize {
    n.saturating_sub(1).min(max_lags)
}

/// Sample autocorrelation for lags `0..=nlags`.
pub fn autocorrelation(series: &[f64], nlags: usize, method: AcfMethod) -> AnalysisResult<Vec<f64>> {
    let n = series.len();
    if n < 2 {
        return Err(AnalysisError::InvalidArgument(format!(
            "series must contain at least 2 observations, got {}",
            n
        )));
    }
    if nlags >= n {
        return Err(AnalysisError::InvalidArgument(format!(
            "nlags ({}) must be less than the series length ({})",
            nlags, n
        )));
    }
    if let Some(pos) = series.iter().position(|x| !x.is_finite()) {
        return Err(AnalysisError::InvalidArgument(format!(
            "series contains a non-finite value at index {}",
            pos
        )));
    }
    if series.iter().all(|&x| x == series[0]) {
        return Err(AnalysisError::InvalidArgument(
            "series is constant, autocorrelation is undefined".to_string(),
        ));
    }

    let centered = center(series);

    let autocovariance = match method {
        AcfMethod::Fft => fft_autocovariance(&centered, nlags),
        AcfMethod::Direct => direct_autocovariance(&centered, nlags),
    };

    let variance = autocovariance[0];
    if !variance.is_finite() || variance <= 0.0 {
        return Err(AnalysisError::InvalidArgument(format!(
            "series variance is not positive ({})",
            variance
        )));
    }

    let mut values: Vec<f64> = autocovariance
        .iter()
        .map(|c| (c / variance).clamp(-1.0, 1.0))
        .collect();
    values[0] = 1.0;

    Ok(values)
}

/// Rescale by a power of two so the largest magnitude lies in (0.5, 1], then
/// subtract a two-pass mean.
///
/// The power-of-two factor is exact, so large offsets keep their fractional
/// detail and large magnitudes cannot overflow the sums of squares.
fn center(series: &[f64]) -> Vec<f64> {
    let n = series.len() as f64;
    let max_abs = series.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()));
    let exponent = if max_abs > 0.0 {
        (max_abs.log2().ceil() as i32).clamp(-1022, 1023)
    } else {
        0
    };
    let scale = 2.0_f64.powi(-exponent);
    let scaled: Vec<f64> = series.iter().map(|x| x * scale).collect();

    let rough = scaled.iter().sum::<f64>() / n;
    let correction = scaled.iter().map(|x| x - rough).sum::<f64>() / n;
    let mean = rough + correction;

    scaled.iter().map(|x| x - mean).collect()
}

fn direct_autocovariance(centered: &[f64], nlags: usize) -> Vec<f64> {
    let n = centered.len() as f64;
    (0..=nlags)
        .map(|lag| {
            centered[lag..]
                .iter()
                .zip(centered.iter())
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / n
        })
        .collect()
}

fn fft_autocovariance(centered: &[f64], nlags: usize) -> Vec<f64> {
    let n = centered.len();
    let padded_size = (2 * n).next_power_of_two();

    let mut buffer: Vec<Complex<f64>> = centered
        .iter()
        .map(|&x| Complex::new(x, 0.0))
        .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
        .take(padded_size)
        .collect();

    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(padded_size).process(&mut buffer);

    // Power spectrum
    for c in buffer.iter_mut() {
        *c = Complex::new(c.norm_sqr(), 0.0);
    }

    planner.plan_fft_inverse(padded_size).process(&mut buffer);

    // rustfft leaves the inverse unnormalized
    let scale = padded_size as f64 * n as f64;
    buffer[..=nlags].iter().map(|c| c.re / scale).collect()
}
