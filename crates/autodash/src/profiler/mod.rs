//! Data profiling module for dataset analysis.
//!
//! This module computes the statistical profile of a cleaned table:
//! - Dataset shape and memory estimate
//! - Column kinds and missing counts
//! - Describe-style numeric summaries
//! - Pearson correlations between numeric columns
//! - Frequency tables for categorical columns
//!
//! Every mapping in the [`Profile`] keeps the table's column order.

mod statistics;

pub(crate) use statistics::correlation_matrix;

use crate::config::DashboardConfig;
use crate::types::{CleanedTable, ColumnKind};
use crate::utils::{float_values, ranked_counts, string_values};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Pairwise correlations: row column → (other column → coefficient).
pub type CorrelationMatrix = IndexMap<String, IndexMap<String, f64>>;

/// Statistical and structural profile of a cleaned table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub dataset_info: DatasetInfo,
    pub column_types: IndexMap<String, ColumnKind>,
    pub missing_counts: IndexMap<String, usize>,
    pub numeric_summary: IndexMap<String, NumericSummary>,
    /// Present only when the table has at least two numeric columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlations: Option<CorrelationMatrix>,
    pub categorical_summary: IndexMap<String, CategoricalSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub rows: usize,
    pub columns: usize,
    pub memory_estimate_mb: f64,
}

/// Summary statistics of one numeric column.
///
/// Statistics are `None` when the column has no observed value. `std` is
/// also `None` when the deviation exceeds the `f64` range; every present
/// value is finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub q50: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Frequency summary of one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub distinct_count: usize,
    /// Most frequent values with their counts, ties in first-seen order.
    pub top_values: IndexMap<String, usize>,
    pub most_frequent: Option<String>,
}

impl Profile {
    /// Coefficient between two numeric columns, if a matrix was computed.
    pub fn correlation(&self, a: &str, b: &str) -> Option<f64> {
        self.correlations.as_ref()?.get(a)?.get(b).copied()
    }

    /// Off-diagonal pair with the largest absolute coefficient.
    pub fn strongest_correlation(&self) -> Option<(&str, &str, f64)> {
        let matrix = self.correlations.as_ref()?;
        let mut best: Option<(&str, &str, f64)> = None;

        for (i, (a, row)) in matrix.iter().enumerate() {
            for (b, r) in row.iter().skip(i + 1) {
                if best.is_none_or(|(_, _, current)| r.abs() > current.abs()) {
                    best = Some((a.as_str(), b.as_str(), *r));
                }
            }
        }
        best
    }
}

/// Data profiler for analyzing a cleaned table.
#[derive(Debug, Clone, Default)]
pub struct DataProfiler {
    config: DashboardConfig,
}

impl DataProfiler {
    pub fn new(config: DashboardConfig) -> Self {
        Self { config }
    }

    /// Profile a cleaned table.
    ///
    /// Never fails; a column whose values cannot be read is left out of the
    /// summaries with a warning.
    pub fn profile(&self, table: &CleanedTable) -> Profile {
        info!(
            rows = table.height(),
            columns = table.width(),
            "Profiling dataset"
        );

        let df = table.data();
        let dataset_info = DatasetInfo {
            rows: table.height(),
            columns: table.width(),
            memory_estimate_mb: df.estimated_size() as f64 / 1_048_576.0,
        };

        let missing_counts = df
            .get_columns()
            .iter()
            .map(|c| (c.name().to_string(), c.null_count()))
            .collect();

        let mut numeric_summary = IndexMap::new();
        let mut numeric_values = Vec::new();
        for name in table.columns_of_kind(ColumnKind::Numeric) {
            let values = table
                .series(name)
                .and_then(|s| float_values(s).map_err(Into::into));
            match values {
                Ok(values) => {
                    let observed: Vec<f64> = values.iter().flatten().copied().collect();
                    let summary = statistics::numeric_summary(&observed);
                    numeric_summary.insert(name.to_string(), summary);
                    numeric_values.push((name.to_string(), values));
                }
                Err(e) => warn!(column = %name, error = %e, "Skipping numeric summary"),
            }
        }

        let correlations = if numeric_values.len() >= 2 {
            debug!(columns = numeric_values.len(), "Computing correlation matrix");
            Some(correlation_matrix(&numeric_values))
        } else {
            None
        };

        let mut categorical_summary = IndexMap::new();
        for name in table.columns_of_kind(ColumnKind::Categorical) {
            let values = table
                .series(name)
                .and_then(|s| string_values(s).map_err(Into::into));
            match values {
                Ok(values) => {
                    let summary = self.categorical_summary(values.into_iter().flatten());
                    categorical_summary.insert(name.to_string(), summary);
                }
                Err(e) => warn!(column = %name, error = %e, "Skipping categorical summary"),
            }
        }

        info!(
            numeric = numeric_summary.len(),
            categorical = categorical_summary.len(),
            "Profiling complete"
        );

        Profile {
            dataset_info,
            column_types: table.kinds().clone(),
            missing_counts,
            numeric_summary,
            correlations,
            categorical_summary,
        }
    }

    fn categorical_summary(&self, values: impl IntoIterator<Item = String>) -> CategoricalSummary {
        let ranked = ranked_counts(values);
        CategoricalSummary {
            distinct_count: ranked.len(),
            most_frequent: ranked.first().map(|(value, _)| value.clone()),
            top_values: ranked
                .into_iter()
                .take(self.config.profile_top_values)
                .collect(),
        }
    }
}
