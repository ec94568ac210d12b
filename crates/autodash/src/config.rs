//! Configuration types for the analysis pipeline.
//!
//! All limits default to the values the dashboard has always used
//! (30 histogram bins, 5 distribution charts, 3 categorical charts, ...).
//! They can be tuned through [`DashboardConfig::builder()`] or loaded from
//! JSON; the planner always applies them as hard slices in column order.

use crate::error::DashboardError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for cleaning, profiling and chart planning.
///
/// # Example
///
/// ```rust,ignore
/// use autodash::DashboardConfig;
///
/// let config = DashboardConfig::builder()
///     .histogram_bins(20)
///     .max_categorical_charts(5)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Number of bins requested for every distribution histogram.
    /// Default: 30
    pub histogram_bins: usize,

    /// Maximum number of distribution charts (first N numeric columns).
    /// Default: 5
    pub max_distribution_charts: usize,

    /// Maximum number of series in the box plot (first N numeric columns).
    /// Default: 5
    pub max_boxplot_columns: usize,

    /// Maximum number of categorical bar charts (first N categorical columns).
    /// Default: 3
    pub max_categorical_charts: usize,

    /// Number of most frequent values shown per categorical bar chart.
    /// Default: 10
    pub categorical_top_k: usize,

    /// Maximum number of dimensions in the scatter matrix (first N numeric columns).
    /// Default: 4
    pub max_scatter_dimensions: usize,

    /// Number of most frequent values reported in the categorical profile.
    /// Default: 5
    pub profile_top_values: usize,

    /// Fill value for text columns that have no observed values at all.
    /// Default: "Unknown"
    pub missing_fill_label: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            histogram_bins: 30,
            max_distribution_charts: 5,
            max_boxplot_columns: 5,
            max_categorical_charts: 3,
            categorical_top_k: 10,
            max_scatter_dimensions: 4,
            profile_top_values: 5,
            missing_fill_label: "Unknown".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Create a new configuration builder.
    pub fn builder() -> DashboardConfigBuilder {
        DashboardConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let limits = [
            ("histogram_bins", self.histogram_bins),
            ("max_distribution_charts", self.max_distribution_charts),
            ("max_boxplot_columns", self.max_boxplot_columns),
            ("max_categorical_charts", self.max_categorical_charts),
            ("categorical_top_k", self.categorical_top_k),
            ("profile_top_values", self.profile_top_values),
        ];
        for (field, value) in limits {
            if value == 0 {
                return Err(ConfigValidationError::ZeroLimit {
                    field: field.to_string(),
                });
            }
        }

        // A scatter matrix needs at least one pair of axes.
        if self.max_scatter_dimensions < 2 {
            return Err(ConfigValidationError::InvalidScatterDimensions(
                self.max_scatter_dimensions,
            ));
        }

        if self.missing_fill_label.trim().is_empty() {
            return Err(ConfigValidationError::EmptyFillLabel);
        }

        Ok(())
    }

    /// Parse and validate a JSON configuration. Absent fields keep their
    /// defaults.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
            .map_err(|e| e.with_context(format!("Invalid config file {}", path.display())))
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid limit for '{field}': must be at least 1")]
    ZeroLimit { field: String },

    #[error("Invalid scatter matrix dimensions: {0} (must be at least 2)")]
    InvalidScatterDimensions(usize),

    #[error("Missing fill label must not be empty")]
    EmptyFillLabel,
}

impl From<ConfigValidationError> for DashboardError {
    fn from(err: ConfigValidationError) -> Self {
        DashboardError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`DashboardConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct DashboardConfigBuilder {
    histogram_bins: Option<usize>,
    max_distribution_charts: Option<usize>,
    max_boxplot_columns: Option<usize>,
    max_categorical_charts: Option<usize>,
    categorical_top_k: Option<usize>,
    max_scatter_dimensions: Option<usize>,
    profile_top_values: Option<usize>,
    missing_fill_label: Option<String>,
}

impl DashboardConfigBuilder {
    /// Start from an existing configuration instead of the defaults.
    ///
    /// Used by the CLI to apply flag overrides on top of a config file.
    pub fn from_config(config: DashboardConfig) -> Self {
        Self {
            histogram_bins: Some(config.histogram_bins),
            max_distribution_charts: Some(config.max_distribution_charts),
            max_boxplot_columns: Some(config.max_boxplot_columns),
            max_categorical_charts: Some(config.max_categorical_charts),
            categorical_top_k: Some(config.categorical_top_k),
            max_scatter_dimensions: Some(config.max_scatter_dimensions),
            profile_top_values: Some(config.profile_top_values),
            missing_fill_label: Some(config.missing_fill_label),
        }
    }

    /// Set the number of histogram bins.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set the maximum number of distribution charts.
    pub fn max_distribution_charts(mut self, max: usize) -> Self {
        self.max_distribution_charts = Some(max);
        self
    }

    /// Set the maximum number of box plot series.
    pub fn max_boxplot_columns(mut self, max: usize) -> Self {
        self.max_boxplot_columns = Some(max);
        self
    }

    /// Set the maximum number of categorical bar charts.
    pub fn max_categorical_charts(mut self, max: usize) -> Self {
        self.max_categorical_charts = Some(max);
        self
    }

    /// Set how many values each categorical bar chart shows.
    pub fn categorical_top_k(mut self, k: usize) -> Self {
        self.categorical_top_k = Some(k);
        self
    }

    /// Set the maximum number of scatter matrix dimensions.
    pub fn max_scatter_dimensions(mut self, max: usize) -> Self {
        self.max_scatter_dimensions = Some(max);
        self
    }

    /// Set how many frequent values the categorical profile reports.
    pub fn profile_top_values(mut self, k: usize) -> Self {
        self.profile_top_values = Some(k);
        self
    }

    /// Set the fill value for text columns without any observed value.
    pub fn missing_fill_label(mut self, label: impl Into<String>) -> Self {
        self.missing_fill_label = Some(label.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `DashboardConfig` or an error if validation fails.
    pub fn build(self) -> Result<DashboardConfig, ConfigValidationError> {
        let defaults = DashboardConfig::default();
        let config = DashboardConfig {
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
            max_distribution_charts: self
                .max_distribution_charts
                .unwrap_or(defaults.max_distribution_charts),
            max_boxplot_columns: self
                .max_boxplot_columns
                .unwrap_or(defaults.max_boxplot_columns),
            max_categorical_charts: self
                .max_categorical_charts
                .unwrap_or(defaults.max_categorical_charts),
            categorical_top_k: self.categorical_top_k.unwrap_or(defaults.categorical_top_k),
            max_scatter_dimensions: self
                .max_scatter_dimensions
                .unwrap_or(defaults.max_scatter_dimensions),
            profile_top_values: self
                .profile_top_values
                .unwrap_or(defaults.profile_top_values),
            missing_fill_label: self
                .missing_fill_label
                .unwrap_or(defaults.missing_fill_label),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.histogram_bins, 30);
        assert_eq!(config.max_distribution_charts, 5);
        assert_eq!(config.max_boxplot_columns, 5);
        assert_eq!(config.max_categorical_charts, 3);
        assert_eq!(config.categorical_top_k, 10);
        assert_eq!(config.max_scatter_dimensions, 4);
        assert_eq!(config.profile_top_values, 5);
        assert_eq!(config.missing_fill_label, "Unknown");
    }

    #[test]
    fn test_builder_defaults() {
        let config = DashboardConfig::builder().build().unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = DashboardConfig::builder()
            .histogram_bins(50)
            .max_distribution_charts(2)
            .max_categorical_charts(1)
            .categorical_top_k(3)
            .missing_fill_label("n/a")
            .build()
            .unwrap();

        assert_eq!(config.histogram_bins, 50);
        assert_eq!(config.max_distribution_charts, 2);
        assert_eq!(config.max_categorical_charts, 1);
        assert_eq!(config.categorical_top_k, 3);
        assert_eq!(config.missing_fill_label, "n/a");
        // Untouched fields keep their defaults
        assert_eq!(config.max_scatter_dimensions, 4);
    }

    #[test]
    fn test_validation_zero_limit() {
        let result = DashboardConfig::builder().histogram_bins(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::ZeroLimit { field } if field == "histogram_bins"
        ));
    }

    #[test]
    fn test_validation_scatter_dimensions() {
        let result = DashboardConfig::builder().max_scatter_dimensions(1).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidScatterDimensions(1)
        ));
    }

    #[test]
    fn test_validation_empty_label() {
        let result = DashboardConfig::builder().missing_fill_label("  ").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyFillLabel
        ));
    }

    #[test]
    fn test_from_config_keeps_values() {
        let base = DashboardConfig::builder().histogram_bins(12).build().unwrap();
        let config = DashboardConfigBuilder::from_config(base)
            .max_categorical_charts(6)
            .build()
            .unwrap();
        assert_eq!(config.histogram_bins, 12);
        assert_eq!(config.max_categorical_charts, 6);
    }

    #[test]
    fn test_config_from_partial_json() {
        // Missing fields fall back to defaults
        let json = r#"{ "histogram_bins": 40, "max_categorical_charts": 2 }"#;
        let config: DashboardConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.histogram_bins, 40);
        assert_eq!(config.max_categorical_charts, 2);
        assert_eq!(config.max_distribution_charts, 5);
        assert_eq!(config.missing_fill_label, "Unknown");
    }

    #[test]
    fn test_from_json_partial() {
        let config = DashboardConfig::from_json(r#"{"histogram_bins": 12}"#).unwrap();
        assert_eq!(config.histogram_bins, 12);
        assert_eq!(config.categorical_top_k, 10);
    }

    #[test]
    fn test_from_json_errors() {
        let err = DashboardConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, DashboardError::Json(_)));
        assert_eq!(err.error_code(), "JSON_ERROR");

        let err = DashboardConfig::from_json(r#"{"categorical_top_k": 0}"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"max_categorical_charts": 1}"#).unwrap();
        assert_eq!(
            DashboardConfig::from_file(&path).unwrap().max_categorical_charts,
            1
        );

        std::fs::write(&path, r#"{"histogram_bins": "many"}"#).unwrap();
        let err = DashboardConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
        assert_eq!(err.error_code(), "JSON_ERROR");

        let err = DashboardConfig::from_file(dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
