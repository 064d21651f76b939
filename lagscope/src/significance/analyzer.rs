//! Lag significance analyzer.
//!
//! Combines the ACF, its Bartlett bounds and local peak extraction into a
//! partition of lags `0..=L` into significant and not-significant sets.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::peaks::local_peaks;
use crate::acf::{lag_count, AcfMethod, AcfResult, AnalysisError, AnalysisResult, ConfidenceLevel};

/// Analyzer limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Upper cap on the number of lags analysed.
    pub max_lags: usize,
    /// Leading lags reported whenever their interval excludes zero.
    pub head_window: usize,
    /// ACF evaluation strategy.
    pub method: AcfMethod,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_lags: 400,
            head_window: 10,
            method: AcfMethod::Fft,
        }
    }
}

/// Result of a significance analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LagAnalysis {
    pub confidence_level: ConfidenceLevel,
    pub n_obs: usize,
    pub acf: AcfResult,
    /// Strict local maxima of the ACF.
    pub peaks: Vec<usize>,
    /// Lags whose interval excludes zero.
    pub zero_exclusion: Vec<usize>,
    pub significant_lags: Vec<usize>,
    pub not_significant_lags: Vec<usize>,
}

impl LagAnalysis {
    /// Highest analysed lag L.
    pub fn max_lag(&self) -> usize {
        self.acf.max_lag()
    }

    pub fn is_significant(&self, lag: usize) -> bool {
        self.significant_lags.binary_search(&lag).is_ok()
    }

    /// Lower band offset `lower_bound - value` per lag.
    pub fn band_lower(&self) -> Vec<f64> {
        self.acf
            .lower_bound
            .iter()
            .zip(self.acf.values.iter())
            .map(|(lo, v)| lo - v)
            .collect()
    }

    /// Upper band offset `upper_bound - value` per lag.
    pub fn band_upper(&self) -> Vec<f64> {
        self.acf
            .upper_bound
            .iter()
            .zip(self.acf.values.iter())
            .map(|(hi, v)| hi - v)
            .collect()
    }

    /// `(lag, acf)` pairs for the significant lags.
    pub fn significant_values(&self) -> Vec<(usize, f64)> {
        self.significant_lags
            .iter()
            .map(|&lag| (lag, self.acf.values[lag]))
            .collect()
    }

    /// `(lag, acf)` pairs for the remaining lags.
    pub fn not_significant_values(&self) -> Vec<(usize, f64)> {
        self.not_significant_lags
            .iter()
            .map(|&lag| (lag, self.acf.values[lag]))
            .collect()
    }

    /// Vertical axis range that fits the ACF and its lower bounds.
    pub fn y_range(&self) -> (f64, f64) {
        let floor = self
            .acf
            .values
            .iter()
            .chain(self.acf.lower_bound.iter())
            .fold(-0.2_f64, |acc, &v| acc.min(v));
        (floor - 0.1, 1.1)
    }

    /// One-line description suitable for a chart title.
    pub fn summary(&self, label: &str) -> String {
        format!(
            "{}: statistically significant lags for a {}% confidence interval: {:?}",
            label,
            self.confidence_level.confidence_pct(),
            self.significant_lags
        )
    }
}

/// Classifies ACF lags as significant or not.
#[derive(Debug, Clone, Default)]
pub struct LagSignificanceAnalyzer {
    config: AnalyzerConfig,
}

impl LagSignificanceAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze `series` at significance level `alpha`.
    ///
    /// Fails with `InvalidArgument` when the series has fewer than 2
    /// observations, contains a non-finite value, or is constant (its ACF is
    /// undefined), and when `alpha` is not strictly between 0 and 1.
    pub fn analyze(&self, series: &[f64], alpha: f64) -> AnalysisResult<LagAnalysis> {
        let level = ConfidenceLevel::new(alpha)?;
        self.analyze_with_level(series, level)
    }

    pub fn analyze_with_level(
        &self,
        series: &[f64],
        level: ConfidenceLevel,
    ) -> AnalysisResult<LagAnalysis> {
        if series.len() < 2 {
            return Err(AnalysisError::InvalidArgument(format!(
                "series must contain at least 2 observations, got {}",
                series.len()
            )));
        }

        let nlags = lag_count(series.len(), self.config.max_lags);
        let acf = AcfResult::compute(series, nlags, self.config.method, level)?;

        let peaks = local_peaks(&acf.values);
        let zero_exclusion = acf.zero_exclusion();

        let excluded: BTreeSet<usize> = zero_exclusion.iter().copied().collect();
        let head: BTreeSet<usize> = (0..=nlags)
            .take(self.config.head_window)
            .filter(|lag| excluded.contains(lag))
            .collect();

        let significant: BTreeSet<usize> = peaks
            .iter()
            .copied()
            .filter(|lag| excluded.contains(lag))
            .chain(head)
            .collect();
        let not_significant: BTreeSet<usize> =
            (0..=nlags).filter(|lag| !significant.contains(lag)).collect();

        check_partition(&significant, &not_significant, nlags)?;

        debug!(
            n_obs = series.len(),
            nlags,
            alpha = level.alpha(),
            peaks = peaks.len(),
            significant = significant.len(),
            "Classified ACF lags"
        );

        Ok(LagAnalysis {
            confidence_level: level,
            n_obs: series.len(),
            acf,
            peaks,
            zero_exclusion,
            significant_lags: significant.into_iter().collect(),
            not_significant_lags: not_significant.into_iter().collect(),
        })
    }
}

/// Both sets must be disjoint and together cover `0..=nlags` exactly.
fn check_partition(
    significant: &BTreeSet<usize>,
    not_significant: &BTreeSet<usize>,
    nlags: usize,
) -> AnalysisResult<()> {
    if let Some(lag) = significant.intersection(not_significant).next() {
        warn!(lag, "Lag classified as both significant and not significant");
        return Err(AnalysisError::Internal(format!(
            "lag {} is both significant and not significant",
            lag
        )));
    }

    let covered = significant.len() + not_significant.len();
    let out_of_range = significant
        .iter()
        .chain(not_significant.iter())
        .any(|&lag| lag > nlags);
    if covered != nlags + 1 || out_of_range {
        warn!(covered, nlags, "Lag classification does not cover every lag");
        return Err(AnalysisError::Internal(format!(
            "classification covers {} lags, expected {}",
            covered,
            nlags + 1
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn alternating(n: usize) -> Vec<f64> {
        (0..n).map(|t| (t % 2) as f64).collect()
    }

    fn seasonal(n: usize, period: usize) -> Vec<f64> {
        let mut state: u64 = 7;
        (0..n)
            .map(|t| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let noise = (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5;
                (2.0 * std::f64::consts::PI * t as f64 / period as f64).sin() + 0.5 * noise
            })
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.max_lags, 400);
        assert_eq!(config.head_window, 10);
        assert_eq!(config.method, AcfMethod::Fft);
    }

    #[test]
    fn test_alternating_series() {
        let analyzer = LagSignificanceAnalyzer::default();
        let result = analyzer.analyze(&alternating(10), 0.05).unwrap();

        let expected = [1.0, -0.9, 0.8, -0.7, 0.6, -0.5, 0.4, -0.3, 0.2, -0.1];
        for (got, want) in result.acf.values.iter().zip(expected.iter()) {
            assert_relative_eq!(*got, *want, epsilon = 1e-12);
        }

        assert_eq!(result.peaks, vec![2, 4, 6, 8]);
        assert_eq!(result.zero_exclusion, vec![0, 1]);
        assert_eq!(result.significant_lags, vec![0, 1]);
        assert_eq!(result.not_significant_lags, (2..=9).collect::<Vec<_>>());
    }

    #[test]
    fn test_partition_covers_all_lags() {
        let analyzer = LagSignificanceAnalyzer::default();
        for n in [2, 3, 17, 120, 900] {
            let result = analyzer.analyze(&seasonal(n, 12), 0.05).unwrap();
            let nlags = (n - 1).min(400);
            assert_eq!(result.acf.len(), nlags + 1);
            assert_eq!(
                result.significant_lags.len() + result.not_significant_lags.len(),
                nlags + 1
            );
            for lag in &result.significant_lags {
                assert!(!result.not_significant_lags.contains(lag));
            }
        }
    }

    #[test]
    fn test_seasonal_peaks_are_significant() {
        let analyzer = LagSignificanceAnalyzer::default();
        let result = analyzer.analyze(&seasonal(240, 12), 0.05).unwrap();
        assert!(result.is_significant(0));
        assert!(result.is_significant(12));
        assert!(result.is_significant(24));
        // Troughs past the head window are never reported
        assert!(!result.is_significant(18));
    }

    #[test]
    fn test_significant_beyond_head_are_peaks() {
        let analyzer = LagSignificanceAnalyzer::default();
        let result = analyzer.analyze(&seasonal(500, 7), 0.1).unwrap();
        for &lag in result.significant_lags.iter().filter(|&&lag| lag >= 10) {
            assert!(result.peaks.contains(&lag));
            assert!(result.zero_exclusion.contains(&lag));
        }
    }

    #[test]
    fn test_head_window_is_configurable() {
        let analyzer = LagSignificanceAnalyzer::new(AnalyzerConfig {
            head_window: 1,
            ..AnalyzerConfig::default()
        });
        let result = analyzer.analyze(&alternating(10), 0.05).unwrap();
        // Lag 1 excludes zero but is neither a peak nor inside the head window
        assert_eq!(result.significant_lags, vec![0]);
    }

    #[test]
    fn test_max_lags_is_configurable() {
        let analyzer = LagSignificanceAnalyzer::new(AnalyzerConfig {
            max_lags: 24,
            ..AnalyzerConfig::default()
        });
        let result = analyzer.analyze(&seasonal(300, 12), 0.05).unwrap();
        assert_eq!(result.max_lag(), 24);
    }

    #[test]
    fn test_direct_and_fft_agree() {
        let series = seasonal(200, 9);
        let fft = LagSignificanceAnalyzer::default().analyze(&series, 0.05).unwrap();
        let direct = LagSignificanceAnalyzer::new(AnalyzerConfig {
            method: AcfMethod::Direct,
            ..AnalyzerConfig::default()
        })
        .analyze(&series, 0.05)
        .unwrap();

        for (a, b) in fft.acf.upper_bound.iter().zip(direct.acf.upper_bound.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-9);
        }
        assert_eq!(fft.peaks, direct.peaks);
    }

    #[test]
    fn test_idempotent() {
        let analyzer = LagSignificanceAnalyzer::default();
        let series = seasonal(150, 5);
        let first = analyzer.analyze(&series, 0.07).unwrap();
        let second = analyzer.analyze(&series, 0.07).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_exclusion_grows_with_alpha() {
        let analyzer = LagSignificanceAnalyzer::default();
        let series = seasonal(120, 12);
        let strict = analyzer.analyze(&series, 0.01).unwrap();
        let loose = analyzer.analyze(&series, 0.19).unwrap();

        assert!(loose.zero_exclusion.len() >= strict.zero_exclusion.len());
        for lag in &strict.zero_exclusion {
            assert!(loose.zero_exclusion.contains(lag));
        }
    }

    #[test]
    fn test_large_magnitude_series_keeps_invariants() {
        let analyzer = LagSignificanceAnalyzer::default();
        let result = analyzer
            .analyze(&[1e200, -1e200, 3e200, -2e200, 1e200], 0.05)
            .unwrap();
        for lag in 0..=result.max_lag() {
            let value = result.acf.values[lag];
            assert!((-1.0..=1.0).contains(&value));
            assert!(result.acf.lower_bound[lag] <= value);
            assert!(value <= result.acf.upper_bound[lag]);
        }
    }

    #[test]
    fn test_rejects_constant_series() {
        let analyzer = LagSignificanceAnalyzer::default();
        assert!(matches!(
            analyzer.analyze(&[3.0, 3.0, 3.0, 3.0], 0.05),
            Err(AnalysisError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_arguments() {
        let analyzer = LagSignificanceAnalyzer::default();
        assert!(matches!(
            analyzer.analyze(&[1.0], 0.05),
            Err(AnalysisError::InvalidArgument(_))
        ));
        assert!(matches!(
            analyzer.analyze(&[1.0, 2.0, 3.0], 0.0),
            Err(AnalysisError::InvalidArgument(_))
        ));
        assert!(matches!(
            analyzer.analyze(&[1.0, 2.0, 3.0], 1.0),
            Err(AnalysisError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_partition_check_detects_overlap() {
        let significant: BTreeSet<usize> = [0, 1].into_iter().collect();
        let not_significant: BTreeSet<usize> = [1, 2].into_iter().collect();
        assert!(matches!(
            check_partition(&significant, &not_significant, 2),
            Err(AnalysisError::Internal(_))
        ));
    }

    #[test]
    fn test_partition_check_detects_gap() {
        let significant: BTreeSet<usize> = [0].into_iter().collect();
        let not_significant: BTreeSet<usize> = [2].into_iter().collect();
        assert!(matches!(
            check_partition(&significant, &not_significant, 2),
            Err(AnalysisError::Internal(_))
        ));
    }

    #[test]
    fn test_band_and_markers() {
        let result = LagSignificanceAnalyzer::default()
            .analyze(&alternating(10), 0.05)
            .unwrap();

        let lower = result.band_lower();
        let upper = result.band_upper();
        assert_eq!(lower[0], 0.0);
        assert_eq!(upper[0], 0.0);
        for lag in 1..lower.len() {
            assert_relative_eq!(lower[lag], -upper[lag], epsilon = 1e-12);
            assert!(upper[lag] > 0.0);
        }

        assert_eq!(result.significant_values().len(), 2);
        assert_relative_eq!(result.significant_values()[1].1, -0.9, epsilon = 1e-12);
        assert_eq!(result.not_significant_values().len(), 8);

        let (lo, hi) = result.y_range();
        assert!(lo < -0.9 - 0.1);
        assert_eq!(hi, 1.1);
    }

    #[test]
    fn test_summary() {
        let result = LagSignificanceAnalyzer::default()
            .analyze(&alternating(10), 0.05)
            .unwrap();
        assert_eq!(
            result.summary("alternating"),
            "alternating: statistically significant lags for a 95% confidence interval: [0, 1]"
        );
    }
}
