use crate::error::{DashboardError, Result};
use indexmap::IndexMap;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Semantic kind of a column, decided once by the cleaner.
///
/// Downstream stages dispatch on this tag only; they never re-inspect the
/// polars dtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Integer or floating point values (stored as Float64).
    Numeric,
    /// Text labels (stored as String).
    Categorical,
    /// Calendar instants (stored as millisecond Datetime).
    Temporal,
    /// Anything else (booleans, durations, nested values).
    Unknown,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::Temporal => "temporal",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Raw input
// ============================================================================

/// Unprocessed tabular input as handed over by the ingestion layer.
///
/// The pipeline never mutates a `RawTable`; the cleaner works on its own copy.
#[derive(Debug, Clone)]
pub struct RawTable {
    data: DataFrame,
}

impl RawTable {
    /// Build a raw table from named columns.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::UnsupportedInput`] when two columns share a
    /// name or when the columns have different lengths.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name().as_str()) {
                return Err(DashboardError::UnsupportedInput(format!(
                    "duplicate column name '{}'",
                    column.name()
                )));
            }
        }

        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(ragged) = columns.iter().find(|c| c.len() != expected) {
                return Err(DashboardError::UnsupportedInput(format!(
                    "column '{}' has {} values, expected {}",
                    ragged.name(),
                    ragged.len(),
                    expected
                )));
            }
        }

        let data = if columns.is_empty() {
            DataFrame::empty()
        } else {
            DataFrame::new(columns)?
        };
        Ok(Self { data })
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    pub fn width(&self) -> usize {
        self.data.width()
    }
}

impl From<DataFrame> for RawTable {
    fn from(data: DataFrame) -> Self {
        Self { data }
    }
}

impl From<CleanedTable> for RawTable {
    fn from(table: CleanedTable) -> Self {
        Self {
            data: table.into_data(),
        }
    }
}

// ============================================================================
// Cleaned table
// ============================================================================

/// Canonical table produced by the cleaner.
///
/// Invariants: no all-missing rows or columns, no duplicate rows, no missing
/// cells, and one fixed [`ColumnKind`] per column in table order.
#[derive(Debug, Clone)]
pub struct CleanedTable {
    data: DataFrame,
    kinds: IndexMap<String, ColumnKind>,
    summary: CleaningSummary,
}

impl CleanedTable {
    pub(crate) fn new(
        data: DataFrame,
        kinds: IndexMap<String, ColumnKind>,
        summary: CleaningSummary,
    ) -> Self {
        Self {
            data,
            kinds,
            summary,
        }
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn into_data(self) -> DataFrame {
        self.data
    }

    /// Column kinds in table order.
    pub fn kinds(&self) -> &IndexMap<String, ColumnKind> {
        &self.kinds
    }

    pub fn kind_of(&self, column: &str) -> Option<ColumnKind> {
        self.kinds.get(column).copied()
    }

    /// Names of all columns of the given kind, left to right.
    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<&str> {
        self.kinds
            .iter()
            .filter(|(_, k)| **k == kind)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Look up a column's values.
    pub fn series(&self, column: &str) -> Result<&Series> {
        self.data
            .column(column)
            .map(|c| c.as_materialized_series())
            .map_err(|_| DashboardError::ColumnNotFound(column.to_string()))
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    pub fn width(&self) -> usize {
        self.data.width()
    }

    pub fn is_empty(&self) -> bool {
        self.data.width() == 0
    }

    /// What the cleaner did to get here.
    pub fn summary(&self) -> &CleaningSummary {
        &self.summary
    }

    /// Upload-style overview of the cleaned table.
    pub fn overview(&self) -> TableOverview {
        let missing_values = self
            .data
            .get_columns()
            .iter()
            .map(|c| (c.name().to_string(), c.null_count()))
            .collect();

        TableOverview {
            rows: self.height(),
            columns: self.width(),
            column_names: self.kinds.keys().cloned().collect(),
            column_types: self.kinds.clone(),
            missing_values,
            numeric_columns: owned(self.columns_of_kind(ColumnKind::Numeric)),
            categorical_columns: owned(self.columns_of_kind(ColumnKind::Categorical)),
            temporal_columns: owned(self.columns_of_kind(ColumnKind::Temporal)),
        }
    }
}

fn owned(names: Vec<&str>) -> Vec<String> {
    names.into_iter().map(str::to_string).collect()
}

// ============================================================================
// Cleaning audit
// ============================================================================

/// Fill applied to one column during imputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationRecord {
    pub column: String,
    pub kind: ColumnKind,
    /// Strategy name: "median", "mode", "constant" or "fill_forward_backward".
    pub strategy: String,
    /// Rendered fill value (absent for forward/backward fill).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_value: Option<String>,
    pub values_filled: usize,
}

/// Audit trail of a cleaning run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    /// Rows dropped because every cell was missing.
    pub empty_rows_removed: usize,
    /// Columns dropped because every cell was missing.
    pub empty_columns_removed: Vec<String>,
    /// Exact duplicate rows dropped (including those only revealed by imputation).
    pub duplicates_removed: usize,
    /// Missing cells per column before any cleaning.
    pub missing_before: IndexMap<String, usize>,
    pub imputations: Vec<ImputationRecord>,
    /// Text columns promoted to temporal.
    pub promoted_columns: Vec<String>,
    /// Human-readable log of the actions taken.
    pub actions: Vec<String>,
}

impl CleaningSummary {
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    pub fn columns_removed(&self) -> usize {
        self.columns_before.saturating_sub(self.columns_after)
    }

    pub fn values_imputed(&self) -> usize {
        self.imputations.iter().map(|r| r.values_filled).sum()
    }

    /// Columns that had at least one missing cell before cleaning.
    pub fn columns_with_missing(&self) -> Vec<&str> {
        self.missing_before
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Shape and column-type overview returned on upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableOverview {
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub column_types: IndexMap<String, ColumnKind>,
    pub missing_values: IndexMap<String, usize>,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub temporal_columns: Vec<String>,
}
