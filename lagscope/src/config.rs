//! Application configuration.
//!
//! Loaded from TOML; every section falls back to its defaults:
//!
//! ```toml
//! [analyzer]
//! max_lags = 400
//! head_window = 10
//! method = "fft"
//!
//! [windows]
//! max_forecast_length = 5
//! training_start = "2021-08-01"
//! training_end = "2021-08-10"
//!
//! [datasets]
//! AirPassengers = "#Passengers"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::significance::AnalyzerConfig;
use crate::windows::WindowConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Mapping from dataset id to the name of its target column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetCatalog(BTreeMap<String, String>);

impl Default for DatasetCatalog {
    fn default() -> Self {
        let entries = [
            ("SeoulBikeData", "Rented Bike Count"),
            ("daily-total-female-births", "Births"),
            ("southern_oscillation_evenly_spaced", "oscillation"),
            ("monthly_co2", "CO2"),
            ("monthly-sunspots", "Sunspots"),
            ("daily_bike_shares", "cnt"),
            ("AirPassengers", "#Passengers"),
            ("Alcohol_Sales", "S4248SM144NCEN"),
            ("yahoo_stock", "Adj Close"),
            ("Miles_Traveled", "TRFVOLUSM227NFWA"),
            ("DailyDelhiClimateTrain", "meantemp"),
            ("peyton_manning", "y"),
        ];
        Self(
            entries
                .iter()
                .map(|(id, column)| (id.to_string(), column.to_string()))
                .collect(),
        )
    }
}

impl DatasetCatalog {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add or replace a dataset.
    pub fn with_dataset(mut self, id: &str, target_column: &str) -> Self {
        self.0.insert(id.to_string(), target_column.to_string());
        self
    }

    /// Target column for a dataset id.
    pub fn target_column(&self, id: &str) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    /// Target column for a dataset id, failing on ids outside the catalog.
    pub fn resolve(&self, id: &str) -> ConfigResult<&str> {
        self.target_column(id)
            .ok_or_else(|| ConfigError::UnknownDataset(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(dataset id, target column)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(id, column)| (id.as_str(), column.as_str()))
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analyzer: AnalyzerConfig,
    pub windows: WindowConfig,
    pub datasets: DatasetCatalog,
}

impl AppConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.analyzer.max_lags == 0 {
            return Err(ConfigError::Invalid("analyzer.max_lags must be at least 1".into()));
        }
        if self.analyzer.head_window == 0 {
            return Err(ConfigError::Invalid(
                "analyzer.head_window must be at least 1".into(),
            ));
        }
        if self.windows.max_forecast_length == 0 {
            return Err(ConfigError::Invalid(
                "windows.max_forecast_length must be at least 1".into(),
            ));
        }
        if self.windows.training_start > self.windows.training_end {
            return Err(ConfigError::Invalid(format!(
                "windows.training_start ({}) is after windows.training_end ({})",
                self.windows.training_start, self.windows.training_end
            )));
        }
        Ok(())
    }
}
