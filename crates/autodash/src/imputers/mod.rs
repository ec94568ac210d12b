//! Imputation module for handling missing values.
//!
//! The strategy is chosen by the column's kind alone:
//! - Numeric: median of observed values
//! - Categorical: stable mode, or the configured label when nothing is observed
//! - Temporal: median instant
//! - Unknown: forward fill then backward fill

mod statistical;

pub use statistical::StatisticalImputer;

use crate::types::{ColumnKind, ImputationRecord};
use anyhow::Result;
use polars::prelude::DataFrame;

/// Fill the missing values of one column in place.
///
/// Returns the record of what was filled, or `None` when the column had no
/// missing values.
pub fn impute_column(
    df: &mut DataFrame,
    col_name: &str,
    kind: ColumnKind,
    fallback_label: &str,
) -> Result<Option<ImputationRecord>> {
    match kind {
        ColumnKind::Numeric => StatisticalImputer::apply_numeric_median(df, col_name),
        ColumnKind::Categorical => {
            StatisticalImputer::apply_mode_imputation(df, col_name, fallback_label)
        }
        ColumnKind::Temporal => StatisticalImputer::apply_temporal_median(df, col_name),
        ColumnKind::Unknown => StatisticalImputer::apply_forward_backward_fill(df, col_name),
    }
}
