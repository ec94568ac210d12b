//! Chart planning module.
//!
//! Inspects the column kinds of a cleaned table and decides which charts to
//! draw. Families are emitted in a fixed order and every per-family cap is a
//! plain slice of the columns in table order:
//!
//! 1. Distribution histograms (first N numeric columns)
//! 2. Correlation heatmap (needs two numeric columns)
//! 3. Box plot (first N numeric columns, needs one)
//! 4. Categorical bar charts (first N categorical columns)
//! 5. Scatter matrix (first N numeric columns, needs two)
//! 6. Time series (first temporal against first numeric column)

mod plot;

pub use plot::{Layout, Margin, Mark, NamedValues, PlotDefinition};

use crate::config::DashboardConfig;
use crate::profiler::correlation_matrix;
use crate::types::{CleanedTable, ColumnKind};
use crate::utils::{
    float_values, format_millis, observed_floats, ranked_counts, string_values, temporal_millis,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

const HISTOGRAM_COLOR: &str = "#1f77b4";
const HEATMAP_COLOR_SCALE: &str = "RdBu";

/// Chart family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Distribution,
    Correlation,
    Boxplot,
    Categorical,
    ScatterMatrix,
    Timeseries,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Distribution => "distribution",
            Self::Correlation => "correlation",
            Self::Boxplot => "boxplot",
            Self::Categorical => "categorical",
            Self::ScatterMatrix => "scatter_matrix",
            Self::Timeseries => "timeseries",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One planned chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub plot: PlotDefinition,
}

impl ChartSpec {
    fn new(kind: ChartKind, layout: Layout, mark: Mark) -> Self {
        Self {
            kind,
            title: layout.title.clone(),
            plot: PlotDefinition::new(layout, mark),
        }
    }
}

/// Decides which charts describe a cleaned table.
#[derive(Debug, Clone, Default)]
pub struct ChartPlanner {
    config: DashboardConfig,
}

impl ChartPlanner {
    pub fn new(config: DashboardConfig) -> Self {
        Self { config }
    }

    /// Plan the charts for a table. Never fails; a family whose data cannot
    /// be read is skipped with a warning.
    pub fn plan(&self, table: &CleanedTable) -> Vec<ChartSpec> {
        let numeric = table.columns_of_kind(ColumnKind::Numeric);
        let categorical = table.columns_of_kind(ColumnKind::Categorical);
        let temporal = table.columns_of_kind(ColumnKind::Temporal);

        info!(
            numeric = numeric.len(),
            categorical = categorical.len(),
            temporal = temporal.len(),
            "Planning charts"
        );

        let mut charts = Vec::new();

        for name in numeric.iter().take(self.config.max_distribution_charts) {
            self.push(&mut charts, ChartKind::Distribution, || {
                self.distribution(table, name)
            });
        }

        if numeric.len() >= 2 {
            self.push(&mut charts, ChartKind::Correlation, || {
                self.correlation(table, &numeric)
            });
        }

        if !numeric.is_empty() {
            let columns = &numeric[..numeric.len().min(self.config.max_boxplot_columns)];
            self.push(&mut charts, ChartKind::Boxplot, || self.boxplot(table, columns));
        }

        for name in categorical.iter().take(self.config.max_categorical_charts) {
            self.push(&mut charts, ChartKind::Categorical, || {
                self.categorical(table, name)
            });
        }

        if numeric.len() >= 2 {
            let columns = &numeric[..numeric.len().min(self.config.max_scatter_dimensions)];
            self.push(&mut charts, ChartKind::ScatterMatrix, || {
                self.scatter_matrix(table, columns)
            });
        }

        if let (Some(time_col), Some(value_col)) = (temporal.first(), numeric.first()) {
            self.push(&mut charts, ChartKind::Timeseries, || {
                self.timeseries(table, time_col, value_col)
            });
        }

        info!(charts = charts.len(), "Chart planning complete");
        charts
    }

    fn push<F>(&self, charts: &mut Vec<ChartSpec>, kind: ChartKind, build: F)
    where
        F: FnOnce() -> Result<ChartSpec>,
    {
        match build() {
            Ok(chart) => {
                debug!(kind = %kind, title = %chart.title, "Planned chart");
                charts.push(chart);
            }
            Err(e) => warn!(kind = %kind, error = %e, "Skipping chart"),
        }
    }

    fn distribution(&self, table: &CleanedTable, column: &str) -> Result<ChartSpec> {
        let values = observed(table, column)?;
        let layout =
            Layout::new(format!("Distribution of {}", column), 400, 300).without_legend();
        Ok(ChartSpec::new(
            ChartKind::Distribution,
            layout,
            Mark::Histogram {
                column: column.to_string(),
                values,
                nbins: self.config.histogram_bins,
                color: HISTOGRAM_COLOR.to_string(),
            },
        ))
    }

    fn correlation(&self, table: &CleanedTable, columns: &[&str]) -> Result<ChartSpec> {
        let mut values = Vec::with_capacity(columns.len());
        for name in columns {
            values.push((name.to_string(), float_values(table.series(name)?)?));
        }
        let matrix = correlation_matrix(&values);

        let labels: Vec<String> = matrix.keys().cloned().collect();
        let z = matrix
            .values()
            .map(|row| row.values().copied().collect())
            .collect();

        Ok(ChartSpec::new(
            ChartKind::Correlation,
            Layout::new("Correlation Heatmap", 500, 400),
            Mark::Heatmap {
                labels,
                z,
                color_scale: HEATMAP_COLOR_SCALE.to_string(),
                zmin: -1.0,
                zmax: 1.0,
            },
        ))
    }

    fn boxplot(&self, table: &CleanedTable, columns: &[&str]) -> Result<ChartSpec> {
        Ok(ChartSpec::new(
            ChartKind::Boxplot,
            Layout::new("Box Plots - Outlier Detection", 600, 400),
            Mark::Box {
                series: named_values(table, columns)?,
            },
        ))
    }

    fn categorical(&self, table: &CleanedTable, column: &str) -> Result<ChartSpec> {
        let values = string_values(table.series(column)?)?;
        let (categories, counts) = ranked_counts(values.into_iter().flatten())
            .into_iter()
            .take(self.config.categorical_top_k)
            .unzip();

        let layout = Layout::new(
            format!("Top {} Values in {}", self.config.categorical_top_k, column),
            400,
            300,
        )
        .without_legend()
        .with_axis_labels(column, "Count");

        Ok(ChartSpec::new(
            ChartKind::Categorical,
            layout,
            Mark::Bar {
                column: column.to_string(),
                categories,
                counts,
            },
        ))
    }

    fn scatter_matrix(&self, table: &CleanedTable, columns: &[&str]) -> Result<ChartSpec> {
        Ok(ChartSpec::new(
            ChartKind::ScatterMatrix,
            Layout::new("Scatter Plot Matrix", 800, 600),
            Mark::ScatterMatrix {
                dimensions: named_values(table, columns)?,
            },
        ))
    }

    fn timeseries(
        &self,
        table: &CleanedTable,
        time_col: &str,
        value_col: &str,
    ) -> Result<ChartSpec> {
        let times = temporal_millis(table.series(time_col)?)?;
        let values = float_values(table.series(value_col)?)?;

        let mut points: Vec<(i64, f64)> = times
            .into_iter()
            .zip(values)
            .filter_map(|(t, v)| Some((t?, v?)))
            .collect();
        // Stable: rows with equal timestamps keep table order
        points.sort_by_key(|(t, _)| *t);

        let (x, y) = points
            .into_iter()
            .map(|(t, v)| (format_millis(t), v))
            .unzip();

        let title = format!("Time Series: {} over {}", value_col, time_col);
        Ok(ChartSpec::new(
            ChartKind::Timeseries,
            Layout::new(title, 600, 400).with_axis_labels(time_col, value_col),
            Mark::Line {
                x_column: time_col.to_string(),
                y_column: value_col.to_string(),
                x,
                y,
            },
        ))
    }
}

fn observed(table: &CleanedTable, column: &str) -> Result<Vec<f64>> {
    Ok(observed_floats(table.series(column)?)?)
}

fn named_values(table: &CleanedTable, columns: &[&str]) -> Result<Vec<NamedValues>> {
    columns
        .iter()
        .map(|name| {
            Ok(NamedValues {
                name: name.to_string(),
                values: observed(table, name)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::DataCleaner;
    use crate::types::RawTable;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn plan(df: DataFrame) -> Vec<ChartSpec> {
        let table = DataCleaner::default().clean(&RawTable::from(df));
        ChartPlanner::default().plan(&table)
    }

    fn kinds(charts: &[ChartSpec]) -> Vec<ChartKind> {
        charts.iter().map(|c| c.kind).collect()
    }

    fn count(charts: &[ChartSpec], kind: ChartKind) -> usize {
        charts.iter().filter(|c| c.kind == kind).count()
    }

    #[test]
    fn test_scenario_plan() {
        let charts = plan(
            df![
                "sales" => [10.0, 20.0, f64::NAN, 40.0],
                "region" => [Some("N"), Some("S"), Some("N"), None],
                "date" => ["2023-01-01", "2023-01-02", "2023-01-03", "2023-01-04"],
            ]
            .unwrap(),
        );

        assert_eq!(
            kinds(&charts),
            vec![
                ChartKind::Distribution,
                ChartKind::Boxplot,
                ChartKind::Categorical,
                ChartKind::Timeseries,
            ]
        );
        assert_eq!(charts[0].title, "Distribution of sales");
        assert_eq!(charts[2].title, "Top 10 Values in region");
        assert_eq!(charts[3].title, "Time Series: sales over date");
    }

    #[test]
    fn test_single_numeric_column_gating() {
        let charts = plan(df!["v" => [1.0, 2.0, 3.0]].unwrap());

        assert_eq!(count(&charts, ChartKind::Correlation), 0);
        assert_eq!(count(&charts, ChartKind::ScatterMatrix), 0);
        assert_eq!(count(&charts, ChartKind::Timeseries), 0);
        assert_eq!(count(&charts, ChartKind::Boxplot), 1);
    }

    #[test]
    fn test_caps_are_first_n_slices() {
        let n = [1.0, 2.0, 3.0];
        let df = df![
            "n1" => n, "n2" => n, "n3" => n, "n4" => n, "n5" => n, "n6" => n, "n7" => n,
            "c1" => ["a", "b", "c"], "c2" => ["a", "b", "c"],
            "c3" => ["a", "b", "c"], "c4" => ["a", "b", "c"],
        ]
        .unwrap();

        let charts = plan(df);

        let distributions: Vec<&str> = charts
            .iter()
            .filter(|c| c.kind == ChartKind::Distribution)
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(
            distributions,
            vec![
                "Distribution of n1",
                "Distribution of n2",
                "Distribution of n3",
                "Distribution of n4",
                "Distribution of n5",
            ]
        );
        assert_eq!(count(&charts, ChartKind::Categorical), 3);

        let scatter = charts
            .iter()
            .find(|c| c.kind == ChartKind::ScatterMatrix)
            .unwrap();
        match &scatter.plot.mark {
            Mark::ScatterMatrix { dimensions } => {
                let names: Vec<&str> = dimensions.iter().map(|d| d.name.as_str()).collect();
                assert_eq!(names, vec!["n1", "n2", "n3", "n4"]);
            }
            other => panic!("unexpected mark {:?}", other),
        }

        let boxplot = charts.iter().find(|c| c.kind == ChartKind::Boxplot).unwrap();
        match &boxplot.plot.mark {
            Mark::Box { series } => assert_eq!(series.len(), 5),
            other => panic!("unexpected mark {:?}", other),
        }
    }

    #[test]
    fn test_family_order() {
        let charts = plan(
            df![
                "a" => [1.0, 2.0, 3.0],
                "b" => [3.0, 1.0, 2.0],
                "c" => ["x", "y", "x"],
            ]
            .unwrap(),
        );

        assert_eq!(
            kinds(&charts),
            vec![
                ChartKind::Distribution,
                ChartKind::Distribution,
                ChartKind::Correlation,
                ChartKind::Boxplot,
                ChartKind::Categorical,
                ChartKind::ScatterMatrix,
            ]
        );
    }

    #[test]
    fn test_heatmap_matrix() {
        let charts = plan(
            df![
                "a" => [1.0, 2.0, 3.0],
                "b" => [3.0, 1.0, 2.0],
            ]
            .unwrap(),
        );

        let heatmap = charts
            .iter()
            .find(|c| c.kind == ChartKind::Correlation)
            .unwrap();
        match &heatmap.plot.mark {
            Mark::Heatmap { labels, z, zmin, zmax, .. } => {
                assert_eq!(labels, &vec!["a".to_string(), "b".to_string()]);
                assert_eq!(z[0][0], 1.0);
                assert_eq!(z[1][1], 1.0);
                assert_eq!(z[0][1], z[1][0]);
                assert_eq!((*zmin, *zmax), (-1.0, 1.0));
            }
            other => panic!("unexpected mark {:?}", other),
        }
    }

    #[test]
    fn test_categorical_top_k_and_ties() {
        let charts = plan(
            df![
                "c" => ["b", "a", "b", "a", "c"],
                "id" => [1.0, 2.0, 3.0, 4.0, 5.0],
            ]
            .unwrap(),
        );

        let bar = charts
            .iter()
            .find(|c| c.kind == ChartKind::Categorical)
            .unwrap();
        match &bar.plot.mark {
            Mark::Bar { categories, counts, .. } => {
                assert_eq!(categories, &vec!["b", "a", "c"]);
                assert_eq!(counts, &vec![2, 2, 1]);
            }
            other => panic!("unexpected mark {:?}", other),
        }
        assert_eq!(bar.plot.layout.y_label.as_deref(), Some("Count"));
    }

    #[test]
    fn test_timeseries_sorted_by_time() {
        let charts = plan(
            df![
                "when" => ["2023-01-03", "2023-01-01", "2023-01-02"],
                "v" => [30.0, 10.0, 20.0],
            ]
            .unwrap(),
        );

        let line = charts
            .iter()
            .find(|c| c.kind == ChartKind::Timeseries)
            .unwrap();
        match &line.plot.mark {
            Mark::Line { x, y, .. } => {
                assert_eq!(
                    x,
                    &vec![
                        "2023-01-01T00:00:00",
                        "2023-01-02T00:00:00",
                        "2023-01-03T00:00:00",
                    ]
                );
                assert_eq!(y, &vec![10.0, 20.0, 30.0]);
            }
            other => panic!("unexpected mark {:?}", other),
        }
    }

    #[test]
    fn test_empty_table_has_no_charts() {
        let charts = plan(df!["a" => [Option::<f64>::None]].unwrap());
        assert!(charts.is_empty());
    }

    #[test]
    fn test_distribution_uses_configured_bins() {
        let config = DashboardConfig::builder().histogram_bins(12).build().unwrap();
        let raw = RawTable::from(df!["v" => [1.0, 2.0]].unwrap());
        let table = DataCleaner::default().clean(&raw);
        let charts = ChartPlanner::new(config).plan(&table);

        match &charts[0].plot.mark {
            Mark::Histogram { nbins, color, .. } => {
                assert_eq!(*nbins, 12);
                assert_eq!(color, "#1f77b4");
            }
            other => panic!("unexpected mark {:?}", other),
        }
    }

    #[test]
    fn test_chart_spec_json_round_trip() {
        let charts = plan(
            df![
                "sales" => [10.0, 20.0, 40.0],
                "region" => ["N", "S", "N"],
                "date" => ["2023-01-01", "2023-01-02", "2023-01-03"],
            ]
            .unwrap(),
        );

        let json = serde_json::to_string(&charts).unwrap();
        let back: Vec<ChartSpec> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, charts);
        assert!(json.contains("\"kind\":\"timeseries\""));
    }

    #[test]
    fn test_extreme_values_round_trip() {
        let charts = plan(
            df![
                "x" => [1e300, -1e300, 0.0],
                "y" => [1e300, -1e300, 0.0],
            ]
            .unwrap(),
        );

        let heatmap = charts
            .iter()
            .find(|c| c.kind == ChartKind::Correlation)
            .unwrap();
        let Mark::Heatmap { z, .. } = &heatmap.plot.mark else {
            panic!("expected a heatmap mark");
        };
        assert!(z.iter().flatten().all(|v| v.is_finite()));

        let json = serde_json::to_string(&charts).unwrap();
        assert!(!json.contains("null"));
        let back: Vec<ChartSpec> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, charts);
    }

    #[test]
    fn test_infinite_cells_never_reach_plots() {
        let charts = plan(df!["v" => [1.0, f64::INFINITY, 3.0, f64::NEG_INFINITY]].unwrap());

        let Mark::Histogram { values, .. } = &charts[0].plot.mark else {
            panic!("expected a histogram mark");
        };
        assert!(values.iter().all(|v| v.is_finite()));
        let json = serde_json::to_string(&charts).unwrap();
        assert!(serde_json::from_str::<Vec<ChartSpec>>(&json).is_ok());
    }
}

