//! Statistical functions for column profiling.

use super::{CorrelationMatrix, NumericSummary};
use crate::utils::{quantile_sorted, sorted_floats};
use indexmap::IndexMap;

/// Largest absolute value; 0.0 for an empty slice.
fn magnitude(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |max: f64, v| max.max(v.abs()))
}

/// Divide every value by the slice's magnitude so sums of squares stay finite.
fn rescaled(values: &[f64]) -> (f64, Vec<f64>) {
    let scale = magnitude(values);
    if scale == 0.0 || !scale.is_finite() {
        return (1.0, values.to_vec());
    }
    (scale, values.iter().map(|v| v / scale).collect())
}

/// Arithmetic mean; `None` for an empty slice or an unrepresentable result.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;

    let plain = values.iter().sum::<f64>() / n;
    if plain.is_finite() {
        return Some(plain);
    }

    let (scale, scaled) = rescaled(values);
    Some(scale * (scaled.iter().sum::<f64>() / n)).filter(|m| m.is_finite())
}

/// Sample standard deviation (n - 1 denominator); 0.0 for a single value.
///
/// `None` when the deviation itself exceeds the `f64` range.
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let n = values.len() as f64;

    if n <= 1.0 {
        return Some(0.0);
    }

    let plain = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();
    if plain.is_finite() {
        return Some(plain);
    }

    let (scale, scaled) = rescaled(values);
    let scaled_mean = scaled.iter().sum::<f64>() / n;
    let variance = scaled.iter().map(|v| (v - scaled_mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(scale * variance.sqrt()).filter(|s| s.is_finite())
}

/// Describe-style summary of the observed values of a numeric column.
pub(crate) fn numeric_summary(values: &[f64]) -> NumericSummary {
    let sorted = sorted_floats(values);
    NumericSummary {
        count: values.len(),
        mean: mean(values),
        std: sample_std(values),
        min: sorted.first().copied(),
        q25: quantile_sorted(&sorted, 0.25),
        q50: quantile_sorted(&sorted, 0.5),
        q75: quantile_sorted(&sorted, 0.75),
        max: sorted.last().copied(),
    }
}

/// Pearson correlation over the rows where both values are present.
///
/// Fewer than two complete pairs, a constant side or a non-finite input
/// yields 0.0.
pub(crate) fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();

    if pairs.len() < 2 {
        return 0.0;
    }

    // r is scale invariant; working on rescaled values keeps the sums finite
    let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
    let (_, xs) = rescaled(&xs);
    let (_, ys) = rescaled(&ys);

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(&ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return 0.0;
    }

    let r = sxy / (sxx.sqrt() * syy.sqrt());
    if r.is_finite() { r.clamp(-1.0, 1.0) } else { 0.0 }
}

/// Square correlation matrix in column order, diagonal fixed at 1.0.
pub(crate) fn correlation_matrix(columns: &[(String, Vec<Option<f64>>)]) -> CorrelationMatrix {
    let n = columns.len();
    let mut values = vec![vec![0.0; n]; n];

    for i in 0..n {
        values[i][i] = 1.0;
        for j in (i + 1)..n {
            let r = pearson(&columns[i].1, &columns[j].1);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    columns
        .iter()
        .zip(values)
        .map(|((name, _), row)| {
            let row: IndexMap<String, f64> = columns
                .iter()
                .map(|(other, _)| other.clone())
                .zip(row)
                .collect();
            (name.clone(), row)
        })
        .collect()
}
