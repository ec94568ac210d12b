//! Data cleaning module.
//!
//! This module turns a [`RawTable`] into a [`CleanedTable`]:
//! - Normalizing NaN and infinities to missing and columns to their canonical storage
//! - Dropping all-missing rows, then all-missing columns
//! - Removing duplicate rows (first occurrence kept)
//! - Imputing missing values per column kind
//! - Promoting fully parseable text columns to temporal
//!
//! Cleaning never fails. A step that errors leaves the table as it was and
//! logs a warning.

mod converters;

use crate::config::DashboardConfig;
use crate::imputers::impute_column;
use crate::types::{CleanedTable, CleaningSummary, ColumnKind, RawTable};
use crate::utils::{float_values, kind_for_dtype, millis_to_series, temporal_millis};
use anyhow::Result;
use converters::{Promotion, promote_to_temporal};
use indexmap::IndexMap;
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Data cleaner for automatic dataset cleaning operations.
#[derive(Debug, Clone, Default)]
pub struct DataCleaner {
    config: DashboardConfig,
}

impl DataCleaner {
    pub fn new(config: DashboardConfig) -> Self {
        Self { config }
    }

    /// Clean a raw table.
    ///
    /// The raw table is not modified. Steps, in order:
    /// 1. NaN and infinities become missing; columns get their canonical storage dtype
    /// 2. Rows where every cell is missing are dropped, then such columns
    /// 3. Exact duplicate rows are dropped, keeping the first occurrence
    /// 4. Missing cells are imputed according to the column kind
    /// 5. Text columns whose values all parse as dates become temporal
    /// 6. Rows that became duplicates through imputation are dropped
    pub fn clean(&self, raw: &RawTable) -> CleanedTable {
        info!(
            rows = raw.height(),
            columns = raw.width(),
            "Cleaning dataset"
        );

        let mut summary = CleaningSummary {
            rows_before: raw.height(),
            columns_before: raw.width(),
            ..Default::default()
        };

        let (mut df, mut kinds) = normalize_columns(raw.data());
        summary.missing_before = df
            .get_columns()
            .iter()
            .map(|c| (c.name().to_string(), c.null_count()))
            .collect();

        // 1. Drop all-missing rows, then all-missing columns
        let before_rows = df.height();
        df = keep_on_error(df, "drop empty rows", drop_empty_rows);
        summary.empty_rows_removed = before_rows - df.height();
        if summary.empty_rows_removed > 0 {
            summary.actions.push(format!(
                "Removed {} rows with no values",
                summary.empty_rows_removed
            ));
        }

        let empty_columns = empty_column_names(&df);
        if !empty_columns.is_empty() {
            df = keep_on_error(df, "drop empty columns", |df| {
                drop_columns(df, &empty_columns)
            });
            summary.actions.push(format!(
                "Removed {} columns with no values: {:?}",
                empty_columns.len(),
                empty_columns
            ));
            debug!(columns = ?empty_columns, "Dropped empty columns");
        }
        summary.empty_columns_removed = empty_columns;

        // 2. Remove duplicate rows
        let before_dedupe = df.height();
        df = keep_on_error(df, "remove duplicates", remove_duplicates);
        let duplicates_removed = before_dedupe - df.height();
        if duplicates_removed > 0 {
            let pct = (duplicates_removed as f64 / before_dedupe as f64) * 100.0;
            summary.actions.push(format!(
                "Removed {} duplicate rows ({:.1}%)",
                duplicates_removed, pct
            ));
            debug!("Removed {} duplicate rows", duplicates_removed);
        }
        summary.duplicates_removed = duplicates_removed;

        // 3. Impute missing values
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        for name in &names {
            let kind = kinds.get(name).copied().unwrap_or(ColumnKind::Unknown);
            match impute_column(&mut df, name, kind, &self.config.missing_fill_label) {
                Ok(Some(record)) => {
                    debug!(
                        column = %name,
                        strategy = %record.strategy,
                        filled = record.values_filled,
                        "Imputed missing values"
                    );
                    summary.actions.push(match &record.fill_value {
                        Some(fill) => format!(
                            "Filled {} missing values in '{}' with {}: {}",
                            record.values_filled, name, record.strategy, fill
                        ),
                        None => format!(
                            "Filled {} missing values in '{}' by forward/backward fill",
                            record.values_filled, name
                        ),
                    });
                    summary.imputations.push(record);
                }
                Ok(None) => {}
                Err(e) => warn!(column = %name, error = %e, "Imputation failed; column left as is"),
            }
        }

        // 4. Promote date-like text columns
        for name in &names {
            if kinds.get(name) != Some(&ColumnKind::Categorical) {
                continue;
            }
            match try_promote(&mut df, name) {
                Ok(true) => {
                    kinds.insert(name.clone(), ColumnKind::Temporal);
                    summary
                        .actions
                        .push(format!("Converted '{}' to datetime", name));
                    summary.promoted_columns.push(name.clone());
                }
                Ok(false) => {}
                Err(e) => warn!(column = %name, error = %e, "Date promotion failed"),
            }
        }

        // 5. Imputation can make rows identical
        let before_final = df.height();
        df = keep_on_error(df, "remove duplicates after imputation", remove_duplicates);
        let late_duplicates = before_final - df.height();
        if late_duplicates > 0 {
            summary.actions.push(format!(
                "Removed {} rows that became duplicates after imputation",
                late_duplicates
            ));
            summary.duplicates_removed += late_duplicates;
        }

        summary.rows_after = df.height();
        summary.columns_after = df.width();

        let kinds: IndexMap<String, ColumnKind> = df
            .get_columns()
            .iter()
            .map(|c| {
                let name = c.name().to_string();
                let kind = kinds
                    .get(&name)
                    .copied()
                    .unwrap_or_else(|| kind_for_dtype(c.dtype()));
                (name, kind)
            })
            .collect();

        info!(
            rows = summary.rows_after,
            columns = summary.columns_after,
            imputed = summary.values_imputed(),
            promoted = summary.promoted_columns.len(),
            "Cleaning complete"
        );

        CleanedTable::new(df, kinds, summary)
    }
}

/// Run a structural step, keeping the previous table if it fails.
fn keep_on_error<F>(df: DataFrame, step: &str, f: F) -> DataFrame
where
    F: FnOnce(&DataFrame) -> Result<DataFrame>,
{
    match f(&df) {
        Ok(result) => result,
        Err(e) => {
            warn!(step, error = %e, "Cleaning step failed; keeping previous table");
            df
        }
    }
}

/// Give every column its canonical storage and decide its initial kind.
fn normalize_columns(data: &DataFrame) -> (DataFrame, IndexMap<String, ColumnKind>) {
    let mut df = data.clone();
    let mut kinds = IndexMap::with_capacity(data.width());

    for column in data.get_columns() {
        let name = column.name().to_string();
        let series = column.as_materialized_series();
        let mut kind = kind_for_dtype(series.dtype());

        let normalized = match kind {
            ColumnKind::Numeric => float_values(series)
                .map(|values| Series::new(series.name().clone(), values)),
            ColumnKind::Categorical => series.cast(&DataType::String),
            ColumnKind::Temporal => temporal_millis(series)
                .and_then(|millis| millis_to_series(series.name().clone(), millis)),
            ColumnKind::Unknown => Ok(series.clone()),
        };

        match normalized {
            Ok(normalized) if kind != ColumnKind::Unknown => {
                if let Err(e) = df.replace(&name, normalized) {
                    warn!(column = %name, error = %e, "Could not normalize column");
                    kind = ColumnKind::Unknown;
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!(column = %name, error = %e, "Could not normalize column");
                kind = ColumnKind::Unknown;
            }
        }

        debug!(column = %name, kind = %kind, dtype = %series.dtype(), "Column kind");
        kinds.insert(name, kind);
    }

    (df, kinds)
}

fn drop_empty_rows(df: &DataFrame) -> Result<DataFrame> {
    if df.width() == 0 {
        return Ok(df.clone());
    }

    let mut keep = vec![false; df.height()];
    for column in df.get_columns() {
        let present = column.as_materialized_series().is_not_null();
        for (flag, is_present) in keep.iter_mut().zip(present.into_iter()) {
            if is_present.unwrap_or(false) {
                *flag = true;
            }
        }
    }

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    Ok(df.filter(&mask)?)
}

/// Columns with no observed value (every column of a zero-row table).
fn empty_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| c.null_count() == c.len())
        .map(|c| c.name().to_string())
        .collect()
}

fn drop_columns(df: &DataFrame, names: &[String]) -> Result<DataFrame> {
    if names.len() == df.width() {
        return Ok(DataFrame::empty());
    }
    let cols_ref: Vec<PlSmallStr> = names.iter().map(|s| s.as_str().into()).collect();
    Ok(df.drop_many(cols_ref))
}

fn remove_duplicates(df: &DataFrame) -> Result<DataFrame> {
    if df.width() == 0 || df.height() < 2 {
        return Ok(df.clone());
    }
    let unique = df
        .clone()
        .lazy()
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()?;
    Ok(unique)
}

/// Replace a text column by its parsed instants if every value parses.
fn try_promote(df: &mut DataFrame, name: &str) -> Result<bool> {
    let series = df.column(name)?.as_materialized_series().clone();
    match promote_to_temporal(&series)? {
        Promotion::Promoted(promoted) => {
            df.replace(name, promoted)?;
            debug!(column = %name, "Promoted text column to temporal");
            Ok(true)
        }
        Promotion::Retained { first_unparsed } => {
            debug!(
                column = %name,
                value = %first_unparsed,
                "Column kept as text; value is not a date"
            );
            Ok(false)
        }
    }
}
