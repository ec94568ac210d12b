//! Statistical imputation methods.
//!
//! Provides median, mode, temporal median and forward/backward fill.

use crate::types::{ColumnKind, ImputationRecord};
use crate::utils::{
    float_values, format_millis, median, millis_to_series, stable_mode, string_values,
    temporal_millis,
};
use anyhow::{Context, Result};
use polars::prelude::*;

/// Statistical imputation methods for filling missing values.
///
/// Every method leaves a column without missing values untouched and
/// returns `None` in that case.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill a numeric column with the median of its observed values.
    pub fn apply_numeric_median(
        df: &mut DataFrame,
        col_name: &str,
    ) -> Result<Option<ImputationRecord>> {
        let values = float_values(Self::series(df, col_name)?)?;
        let missing = values.iter().filter(|v| v.is_none()).count();
        if missing == 0 {
            return Ok(None);
        }

        let observed: Vec<f64> = values.iter().flatten().copied().collect();
        let Some(median_val) = median(&observed) else {
            return Ok(None);
        };

        let filled: Vec<f64> = values.into_iter().map(|v| v.unwrap_or(median_val)).collect();
        df.replace(col_name, Series::new(col_name.into(), filled))?;

        Ok(Some(ImputationRecord {
            column: col_name.to_string(),
            kind: ColumnKind::Numeric,
            strategy: "median".to_string(),
            fill_value: Some(median_val.to_string()),
            values_filled: missing,
        }))
    }

    /// Fill a text column with its most frequent value.
    ///
    /// Ties go to the value encountered first in row order. A column with no
    /// observed value at all is filled with `fallback_label`.
    pub fn apply_mode_imputation(
        df: &mut DataFrame,
        col_name: &str,
        fallback_label: &str,
    ) -> Result<Option<ImputationRecord>> {
        let values = string_values(Self::series(df, col_name)?)?;
        let missing = values.iter().filter(|v| v.is_none()).count();
        if missing == 0 {
            return Ok(None);
        }

        let (fill, strategy) = match stable_mode(values.iter().flatten().map(String::as_str)) {
            Some(mode) => (mode.to_string(), "mode"),
            None => (fallback_label.to_string(), "constant"),
        };

        let filled: Vec<&str> = values
            .iter()
            .map(|v| v.as_deref().unwrap_or(fill.as_str()))
            .collect();
        df.replace(col_name, Series::new(col_name.into(), filled))?;

        Ok(Some(ImputationRecord {
            column: col_name.to_string(),
            kind: ColumnKind::Categorical,
            strategy: strategy.to_string(),
            fill_value: Some(fill),
            values_filled: missing,
        }))
    }

    /// Fill a temporal column with the median instant of its observed values.
    pub fn apply_temporal_median(
        df: &mut DataFrame,
        col_name: &str,
    ) -> Result<Option<ImputationRecord>> {
        let millis = temporal_millis(Self::series(df, col_name)?)?;
        let missing = millis.iter().filter(|v| v.is_none()).count();
        if missing == 0 {
            return Ok(None);
        }

        let observed: Vec<f64> = millis.iter().flatten().map(|m| *m as f64).collect();
        let Some(median_val) = median(&observed) else {
            return Ok(None);
        };
        let median_ms = median_val.round() as i64;

        let filled: Vec<Option<i64>> = millis
            .into_iter()
            .map(|v| Some(v.unwrap_or(median_ms)))
            .collect();
        df.replace(col_name, millis_to_series(col_name.into(), filled)?)?;

        Ok(Some(ImputationRecord {
            column: col_name.to_string(),
            kind: ColumnKind::Temporal,
            strategy: "median".to_string(),
            fill_value: Some(format_millis(median_ms)),
            values_filled: missing,
        }))
    }

    /// Forward fill followed by backward fill, keeping the column's dtype.
    pub fn apply_forward_backward_fill(
        df: &mut DataFrame,
        col_name: &str,
    ) -> Result<Option<ImputationRecord>> {
        let series = Self::series(df, col_name)?;
        let missing = series.null_count();
        if missing == 0 {
            return Ok(None);
        }

        let filled = series.fill_null(FillNullStrategy::Forward(None))?;
        let filled = filled.fill_null(FillNullStrategy::Backward(None))?;
        df.replace(col_name, filled)?;

        Ok(Some(ImputationRecord {
            column: col_name.to_string(),
            kind: ColumnKind::Unknown,
            strategy: "fill_forward_backward".to_string(),
            fill_value: None,
            values_filled: missing,
        }))
    }

    fn series<'a>(df: &'a DataFrame, col_name: &str) -> Result<&'a Series> {
        let column = df
            .column(col_name)
            .with_context(|| format!("column '{}' not found", col_name))?;
        Ok(column.as_materialized_series())
    }
}
