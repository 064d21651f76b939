pub mod acf;
pub mod config;
pub mod significance;
pub mod windows;

// Re-export commonly used types
pub use acf::{AcfMethod, AcfResult, AnalysisError, AnalysisResult, ConfidenceLevel};
pub use config::{AppConfig, ConfigError, DatasetCatalog};
pub use significance::{AnalyzerConfig, LagAnalysis, LagSignificanceAnalyzer};
pub use windows::{
    WindowCalculator, WindowConfig, WindowError, WindowInputs, WindowPlan, WindowResult, WindowRow,
};
