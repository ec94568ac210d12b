use crate::charts::ChartSpec;
use crate::pipeline::DashboardResult;
use crate::profiler::Profile;
use crate::types::{CleanedTable, CleaningSummary, TableOverview};
use anyhow::{Context, Result};
use chrono::Local;
use indexmap::IndexMap;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// ============================================================================
// Report Types
// ============================================================================

/// Full dashboard report for CLI and library output.
///
/// Used for both JSON output (`--json`) and file writing (`--emit-report`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    // Metadata
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input file
    pub input_file: String,
    /// Path to the cleaned dataset (if written)
    pub cleaned_file: Option<String>,
    /// Total analysis time in milliseconds
    pub duration_ms: u64,

    /// Headline numbers of the run
    pub summary: ReportSummary,
    /// Upload-style overview of the cleaned table
    pub overview: TableOverview,
    /// What cleaning changed
    pub cleaning: CleaningSummary,
    pub profile: Profile,
    pub charts: Vec<ChartSpec>,

    /// Narrative text and the provider that wrote it
    pub insights: String,
    pub insight_source: String,
}

/// Headline numbers for the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub rows_before: usize,
    pub rows_after: usize,
    pub rows_removed: usize,
    /// Percentage of rows removed
    pub rows_removed_percent: f32,
    pub columns_before: usize,
    pub columns_after: usize,
    pub columns_removed: usize,
    pub values_imputed: usize,
    pub columns_promoted: usize,
    /// Number of planned charts per family, in planning order
    pub chart_counts: IndexMap<String, usize>,
}

impl ReportSummary {
    fn new(cleaning: &CleaningSummary, charts: &[ChartSpec]) -> Self {
        let mut chart_counts = IndexMap::new();
        for chart in charts {
            *chart_counts.entry(chart.kind.to_string()).or_insert(0) += 1;
        }

        let rows_removed_percent = if cleaning.rows_before == 0 {
            0.0
        } else {
            cleaning.rows_removed() as f32 / cleaning.rows_before as f32 * 100.0
        };

        Self {
            rows_before: cleaning.rows_before,
            rows_after: cleaning.rows_after,
            rows_removed: cleaning.rows_removed(),
            rows_removed_percent,
            columns_before: cleaning.columns_before,
            columns_after: cleaning.columns_after,
            columns_removed: cleaning.columns_removed(),
            values_imputed: cleaning.values_imputed(),
            columns_promoted: cleaning.promoted_columns.len(),
            chart_counts,
        }
    }
}

/// Writes reports and cleaned datasets to an output directory.
pub struct ReportGenerator {
    output_dir: PathBuf,
    output_name: Option<String>,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./outputs"),
            output_name: None,
        }
    }
}

impl ReportGenerator {
    /// Create a new ReportGenerator with custom output settings.
    ///
    /// `output_name` replaces the input file stem in every written file name.
    pub fn new(output_dir: PathBuf, output_name: Option<String>) -> Self {
        Self {
            output_dir,
            output_name,
        }
    }

    /// Build the report for one analysis run.
    pub fn build_report(
        input_file: &str,
        cleaned_file: Option<&str>,
        result: &DashboardResult,
    ) -> DashboardReport {
        let cleaning = result.cleaning_summary();

        DashboardReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.to_string(),
            cleaned_file: cleaned_file.map(String::from),
            duration_ms: result.duration_ms,
            summary: ReportSummary::new(cleaning, &result.charts),
            overview: result.overview.clone(),
            cleaning: cleaning.clone(),
            profile: result.profile.clone(),
            charts: result.charts.clone(),
            insights: result.insights.clone(),
            insight_source: result.insight_source.clone(),
        }
    }

    /// Write a report to `<stem>_report.json` in the output directory.
    pub fn write_report_to_file(&self, report: &DashboardReport, stem: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create output directory {}", self.output_dir.display())
        })?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", self.file_stem(stem)));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }

    /// Write the cleaned dataset to `<stem>_cleaned.csv` in the output directory.
    ///
    /// Temporal columns are written as ISO-8601 timestamps.
    pub fn write_cleaned_dataset(&self, table: &CleanedTable, stem: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create output directory {}", self.output_dir.display())
        })?;

        let output_path = self
            .output_dir
            .join(format!("{}_cleaned.csv", self.file_stem(stem)));
        let mut file = File::create(&output_path)?;

        let mut df = table.data().clone();
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .with_datetime_format(Some(DATETIME_FORMAT.to_string()))
            .finish(&mut df)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;

        info!(
            rows = df.height(),
            columns = df.width(),
            "Dataset saved: {}",
            output_path.display()
        );

        Ok(output_path)
    }

    fn file_stem<'a>(&'a self, stem: &'a str) -> &'a str {
        self.output_name.as_deref().unwrap_or(stem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Dashboard;
    use crate::types::RawTable;
    use tempfile::TempDir;

    fn analyzed() -> DashboardResult {
        let df = df![
            "sales" => [Some(10.0), Some(20.0), None, Some(40.0)],
            "region" => [Some("N"), Some("S"), Some("N"), None],
            "date" => ["2023-01-01", "2023-01-02", "2023-01-03", "2023-01-04"],
        ]
        .unwrap();
        Dashboard::builder()
            .build()
            .unwrap()
            .analyze(&RawTable::from(df))
            .unwrap()
    }

    #[test]
    fn test_build_report() {
        let result = analyzed();
        let report = ReportGenerator::build_report("data/sales.csv", None, &result);

        assert_eq!(report.input_file, "data/sales.csv");
        assert!(report.cleaned_file.is_none());
        assert_eq!(report.summary.rows_before, 4);
        assert_eq!(report.summary.rows_removed, 0);
        assert_eq!(report.summary.values_imputed, 2);
        assert_eq!(report.summary.columns_promoted, 1);
        let families: Vec<&str> = report.summary.chart_counts.keys().map(String::as_str).collect();
        assert_eq!(
            families,
            vec!["distribution", "boxplot", "categorical", "timeseries"]
        );
        assert_eq!(report.charts.len(), 4);
    }

    #[test]
    fn test_rows_removed_percent() {
        let df = df![
            "a" => [Some(1.0), Some(1.0), None, Some(2.0)],
            "b" => [Some("x"), Some("x"), None, Some("y")],
        ]
        .unwrap();
        let result = Dashboard::builder()
            .build()
            .unwrap()
            .analyze(&RawTable::from(df))
            .unwrap();

        let report = ReportGenerator::build_report("t.csv", None, &result);

        // One all-missing row and one duplicate
        assert_eq!(report.summary.rows_removed, 2);
        assert!((report.summary.rows_removed_percent - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = TempDir::new().unwrap();
        let generator = ReportGenerator::new(dir.path().to_path_buf(), None);
        let report = ReportGenerator::build_report("sales.csv", None, &analyzed());

        let path = generator.write_report_to_file(&report, "sales").unwrap();

        assert_eq!(path.file_name().unwrap(), "sales_report.json");
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["overview"]["rows"], 4);
        assert_eq!(json["charts"][0]["kind"], "distribution");
        assert_eq!(json["insight_source"], "basic");
    }

    #[test]
    fn test_write_cleaned_dataset() {
        let dir = TempDir::new().unwrap();
        let generator = ReportGenerator::new(dir.path().join("nested"), None);

        let path = generator
            .write_cleaned_dataset(&analyzed().cleaned, "sales")
            .unwrap();

        assert_eq!(path.file_name().unwrap(), "sales_cleaned.csv");
        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("sales,region,date"));
        assert!(lines.next().unwrap().ends_with(",N,2023-01-01T00:00:00"));
        assert_eq!(content.lines().count(), 5);
    }

    #[test]
    fn test_output_name_overrides_stem() {
        let dir = TempDir::new().unwrap();
        let generator =
            ReportGenerator::new(dir.path().to_path_buf(), Some("weekly".to_string()));
        let report = ReportGenerator::build_report("sales.csv", None, &analyzed());

        let path = generator.write_report_to_file(&report, "sales").unwrap();

        assert_eq!(path.file_name().unwrap(), "weekly_report.json");
    }
}
