//! Shared utilities for the analysis pipeline.
//!
//! This module contains the helpers used by more than one stage: mapping
//! polars dtypes onto [`ColumnKind`], extracting plain values out of a
//! `Series`, and the order-stable frequency and quantile computations the
//! cleaner, profiler and chart planner all rely on.

use crate::types::ColumnKind;
use chrono::DateTime;
use indexmap::IndexMap;
use polars::prelude::*;
use std::hash::Hash;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType holds calendar instants (date or datetime).
#[inline]
pub fn is_temporal_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

/// Check if a DataType holds text labels.
#[inline]
pub fn is_text_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Categorical(_, _))
}

/// Map a raw polars dtype onto the kind the cleaner starts from.
///
/// Text columns start out as [`ColumnKind::Categorical`]; the cleaner may
/// later promote them to [`ColumnKind::Temporal`].
pub fn kind_for_dtype(dtype: &DataType) -> ColumnKind {
    if is_numeric_dtype(dtype) {
        ColumnKind::Numeric
    } else if is_temporal_dtype(dtype) {
        ColumnKind::Temporal
    } else if is_text_dtype(dtype) {
        ColumnKind::Categorical
    } else {
        ColumnKind::Unknown
    }
}

/// The canonical storage dtype for temporal columns.
pub fn temporal_storage_dtype() -> DataType {
    DataType::Datetime(TimeUnit::Milliseconds, None)
}

// =============================================================================
// Value Extraction Utilities
// =============================================================================

/// Extract a numeric series as `f64` values.
///
/// NaN and infinities are reported as missing, so every present value is
/// finite.
pub fn float_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let casted = series.cast(&DataType::Float64)?;
    let values = casted
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect();
    Ok(values)
}

/// Extract the observed (non-missing) values of a numeric series.
pub fn observed_floats(series: &Series) -> PolarsResult<Vec<f64>> {
    Ok(float_values(series)?.into_iter().flatten().collect())
}

/// Extract a text series as owned strings.
pub fn string_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let casted = series.cast(&DataType::String)?;
    let values = casted
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

/// Extract a date/datetime series as milliseconds since the Unix epoch.
pub fn temporal_millis(series: &Series) -> PolarsResult<Vec<Option<i64>>> {
    match series.dtype() {
        DataType::Date => {
            let days = series.cast(&DataType::Int32)?;
            Ok(days
                .i32()?
                .into_iter()
                .map(|v| v.map(|d| i64::from(d) * 86_400_000))
                .collect())
        }
        DataType::Datetime(unit, _) => {
            let divisor = match unit {
                TimeUnit::Nanoseconds => 1_000_000,
                TimeUnit::Microseconds => 1_000,
                TimeUnit::Milliseconds => 1,
            };
            let raw = series.cast(&DataType::Int64)?;
            Ok(raw
                .i64()?
                .into_iter()
                .map(|v| v.map(|t| t.div_euclid(divisor)))
                .collect())
        }
        other => Err(PolarsError::InvalidOperation(
            format!("expected a temporal column, got {}", other).into(),
        )),
    }
}

/// Build a `Datetime(ms)` series from epoch milliseconds.
pub fn millis_to_series(name: PlSmallStr, millis: Vec<Option<i64>>) -> PolarsResult<Series> {
    Series::new(name, millis).cast(&temporal_storage_dtype())
}

/// Render epoch milliseconds as an ISO-8601 timestamp.
pub fn format_millis(millis: i64) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(dt) => dt.naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string(),
        None => millis.to_string(),
    }
}

// =============================================================================
// Frequency Utilities
// =============================================================================

/// Count occurrences, keeping keys in first-seen order.
pub fn first_seen_counts<T, I>(values: I) -> IndexMap<T, usize>
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut counts: IndexMap<T, usize> = IndexMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
}

/// Most frequent value; ties go to the value seen first in row order.
pub fn stable_mode<T, I>(values: I) -> Option<T>
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut best: Option<(T, usize)> = None;
    for (value, count) in first_seen_counts(values) {
        match &best {
            Some((_, best_count)) if count <= *best_count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}

/// Values ordered by descending count, ties in first-seen order.
pub fn ranked_counts<T, I>(values: I) -> Vec<(T, usize)>
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut ranked: Vec<(T, usize)> = first_seen_counts(values).into_iter().collect();
    // sort_by is stable, so equal counts keep insertion order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

// =============================================================================
// Order Statistics
// =============================================================================

/// Sort floats ascending (NaN-free input expected).
pub fn sorted_floats(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Quantile of an ascending slice with linear interpolation between order statistics.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    let (a, b) = (sorted[lower], sorted[upper]);
    let span = b - a;
    if span.is_finite() {
        Some(a + span * fraction)
    } else {
        // Endpoints of opposite sign near the f64 limits
        Some(a * (1.0 - fraction) + b * fraction)
    }
}

/// Median of unsorted values.
pub fn median(values: &[f64]) -> Option<f64> {
    quantile_sorted(&sorted_floats(values), 0.5)
}

// =============================================================================
// Tests
// =============================================================================
