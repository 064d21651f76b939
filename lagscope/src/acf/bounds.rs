//! Per-lag confidence bounds for the sample ACF.
//!
//! Uses Bartlett's large-sample standard error:
//! - lag 0: zero width (the estimate is exactly 1)
//! - lag 1: se = sqrt(1 / n)
//! - lag k: se = sqrt((1 + 2 * sum_{j=1}^{k-1} r_j^2) / n)
//!
//! The half-width at each lag is z(1 - alpha/2) * se.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use super::estimator::{autocorrelation, AcfMethod, AnalysisError, AnalysisResult};

/// Significance level alpha, strictly inside (0, 1).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ConfidenceLevel(f64);

impl ConfidenceLevel {
    /// Lowest alpha offered by the interactive slider.
    pub const SLIDER_MIN: f64 = 0.01;
    /// Upper end of the slider range (exclusive).
    pub const SLIDER_MAX: f64 = 0.2;
    pub const SLIDER_STEP: f64 = 0.01;

    pub fn new(alpha: f64) -> AnalysisResult<Self> {
        if alpha.is_finite() && alpha > 0.0 && alpha < 1.0 {
            Ok(Self(alpha))
        } else {
            Err(AnalysisError::InvalidArgument(format!(
                "confidence level must lie strictly between 0 and 1, got {}",
                alpha
            )))
        }
    }

    pub fn alpha(&self) -> f64 {
        self.0
    }

    /// Interval coverage as a whole percentage, truncated (0.05 -> 95).
    pub fn confidence_pct(&self) -> u32 {
        ((1.0 - self.0) * 100.0 + 1e-9).floor() as u32
    }

    /// Two-sided critical value z(1 - alpha/2) of the standard normal.
    pub fn critical_value(&self) -> AnalysisResult<f64> {
        let normal =
            Normal::new(0.0, 1.0).map_err(|e| AnalysisError::Internal(e.to_string()))?;
        Ok(normal.inverse_cdf(1.0 - self.0 / 2.0))
    }

    /// Alpha values offered by the slider: 0.01, 0.02, ..., 0.19.
    pub fn slider_steps() -> Vec<ConfidenceLevel> {
        let steps = ((Self::SLIDER_MAX - Self::SLIDER_MIN) / Self::SLIDER_STEP).round() as usize;
        (0..steps)
            .map(|i| {
                let alpha = Self::SLIDER_MIN + i as f64 * Self::SLIDER_STEP;
                Self((alpha * 100.0).round() / 100.0)
            })
            .collect()
    }
}

impl Default for ConfidenceLevel {
    fn default() -> Self {
        Self(0.05)
    }
}

impl TryFrom<f64> for ConfidenceLevel {
    type Error = AnalysisError;

    fn try_from(alpha: f64) -> Result<Self, Self::Error> {
        Self::new(alpha)
    }
}

impl From<ConfidenceLevel> for f64 {
    fn from(level: ConfidenceLevel) -> Self {
        level.0
    }
}

/// ACF estimates with their per-lag confidence intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcfResult {
    pub values: Vec<f64>,
    pub lower_bound: Vec<f64>,
    pub upper_bound: Vec<f64>,
}

impl AcfResult {
    /// Estimate the ACF up to `nlags` and attach Bartlett bounds.
    pub fn compute(
        series: &[f64],
        nlags: usize,
        method: AcfMethod,
        level: ConfidenceLevel,
    ) -> AnalysisResult<Self> {
        let values = autocorrelation(series, nlags, method)?;
        Self::with_bartlett_bounds(values, series.len(), level)
    }

    /// Attach bounds to precomputed ACF values from `n_obs` observations.
    pub fn with_bartlett_bounds(
        values: Vec<f64>,
        n_obs: usize,
        level: ConfidenceLevel,
    ) -> AnalysisResult<Self> {
        if n_obs < 2 {
            return Err(AnalysisError::InvalidArgument(format!(
                "at least 2 observations are required, got {}",
                n_obs
            )));
        }

        let z = level.critical_value()?;
        let n = n_obs as f64;

        let mut lower_bound = Vec::with_capacity(values.len());
        let mut upper_bound = Vec::with_capacity(values.len());
        let mut sum_sq = 0.0;

        for (lag, &value) in values.iter().enumerate() {
            let half_width = if lag == 0 {
                0.0
            } else {
                let hw = z * ((1.0 + 2.0 * sum_sq) / n).sqrt();
                sum_sq += value * value;
                hw
            };
            lower_bound.push(value - half_width);
            upper_bound.push(value + half_width);
        }

        Ok(Self {
            values,
            lower_bound,
            upper_bound,
        })
    }

    /// Number of lags covered, including lag 0.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Highest lag index L.
    pub fn max_lag(&self) -> usize {
        self.values.len().saturating_sub(1)
    }

    /// Whether the interval at `lag` excludes zero; `None` past the last lag.
    pub fn excludes_zero(&self, lag: usize) -> Option<bool> {
        let lower = self.lower_bound.get(lag)?;
        let upper = self.upper_bound.get(lag)?;
        Some(*lower > 0.0 || *upper < 0.0)
    }

    /// All lags whose interval excludes zero, ascending.
    pub fn zero_exclusion(&self) -> Vec<usize> {
        (0..self.len())
            .filter(|&lag| self.excludes_zero(lag) == Some(true))
            .collect()
    }

    /// Interval half-width at `lag`; `None` past the last lag.
    pub fn half_width(&self, lag: usize) -> Option<f64> {
        Some(self.upper_bound.get(lag)? - self.values.get(lag)?)
    }
}
