//! Autocorrelation module.
//!
//! Provides the sample autocorrelation function and its per-lag confidence bounds:
//! - Biased sample ACF, by FFT or direct summation
//! - Bartlett standard errors under the large-sample normal approximation

pub mod bounds;
pub mod estimator;

pub use bounds::{AcfResult, ConfidenceLevel};
pub use estimator::{autocorrelation, lag_count, AcfMethod, AnalysisError, AnalysisResult};
