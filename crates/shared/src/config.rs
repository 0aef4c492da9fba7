//! Application configuration management.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::AppResult;

/// Hourly labor rate applied when no deployment value is configured.
pub const DEFAULT_LABOR_RATE: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Budget import configuration.
    #[serde(default)]
    pub import: ImportSettings,
}

/// Budget import configuration.
///
/// Policy and layout are kept as plain names here; the core crate resolves
/// them and rejects unknown values.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportSettings {
    /// Labor cost per hour used by the formula engine.
    #[serde(default = "default_labor_rate")]
    pub labor_rate: Decimal,
    /// Whether precomputed sheet values win over formulas (`recompute` or `prefer_sheet`).
    #[serde(default = "default_formula_policy")]
    pub formula_policy: String,
    /// Column layout name (`generic`, `project_v1`, `project_v2`).
    #[serde(default = "default_layout")]
    pub layout: String,
    /// Custom field key to zero-based column mapping. When non-empty it
    /// replaces the named layout.
    #[serde(default)]
    pub columns: BTreeMap<String, usize>,
}

fn default_labor_rate() -> Decimal {
    DEFAULT_LABOR_RATE
}

fn default_formula_policy() -> String {
    "recompute".to_string()
}

fn default_layout() -> String {
    "generic".to_string()
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            labor_rate: default_labor_rate(),
            formula_policy: default_formula_policy(),
            layout: default_layout(),
            columns: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a source cannot be read or deserialized.
    pub fn load() -> AppResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("SITEBUDGET").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
