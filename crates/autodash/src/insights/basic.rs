//! Deterministic fallback narrative.

use super::{InsightProvider, InsightRequest};
use anyhow::Result;
use std::fmt::Write;

/// Template-based insights that need no external service.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicInsights;

impl BasicInsights {
    pub fn new() -> Self {
        Self
    }

    /// Render the narrative. Infallible, so callers can use it as a fallback.
    pub fn render(&self, request: &InsightRequest<'_>) -> String {
        let profile = request.profile;
        let info = &profile.dataset_info;
        let missing = request.cleaning.columns_with_missing();

        let mut text = String::from("Basic analysis of your data:\n");
        // Writing to a String cannot fail
        let _ = writeln!(
            text,
            "- Dataset has {} rows and {} columns",
            info.rows, info.columns
        );
        let _ = writeln!(text, "- Numeric columns: {}", profile.numeric_summary.len());
        let _ = writeln!(
            text,
            "- Categorical columns: {}",
            profile.categorical_summary.len()
        );
        if missing.is_empty() {
            text.push_str("- No missing values detected\n");
        } else {
            let _ = writeln!(text, "- Missing values detected in: {}", missing.join(", "));
        }
        if let Some((a, b, r)) = profile.strongest_correlation() {
            let _ = writeln!(text, "- Strongest correlation: {} and {} (r = {:.2})", a, b, r);
        }
        let _ = write!(
            text,
            "- {} charts planned; explore the visualizations for detailed insights.",
            request.charts.len()
        );
        text
    }
}

impl InsightProvider for BasicInsights {
    fn generate(&self, request: &InsightRequest<'_>) -> Result<String> {
        Ok(self.render(request))
    }

    fn name(&self) -> &str {
        "basic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartPlanner;
    use crate::cleaner::DataCleaner;
    use crate::profiler::DataProfiler;
    use crate::types::RawTable;
    use polars::prelude::*;

    #[test]
    fn test_basic_insights_text() {
        let df = df![
            "sales" => [Some(10.0), Some(20.0), None, Some(40.0)],
            "cost" => [5.0, 11.0, 14.0, 19.0],
            "region" => [Some("N"), Some("S"), Some("N"), None],
        ]
        .unwrap();
        let table = DataCleaner::default().clean(&RawTable::from(df));
        let profile = DataProfiler::default().profile(&table);
        let charts = ChartPlanner::default().plan(&table);

        let text = BasicInsights::new().render(&InsightRequest {
            profile: &profile,
            charts: &charts,
            cleaning: table.summary(),
        });

        assert!(text.contains("- Dataset has 4 rows and 3 columns"));
        assert!(text.contains("- Numeric columns: 2"));
        assert!(text.contains("- Categorical columns: 1"));
        assert!(text.contains("- Missing values detected in: sales, region"));
        assert!(text.contains("Strongest correlation: sales and cost"));
        assert!(text.contains(&format!("- {} charts planned", charts.len())));
    }

    #[test]
    fn test_basic_insights_without_missing_values() {
        let df = df!["v" => [1.0, 2.0]].unwrap();
        let table = DataCleaner::default().clean(&RawTable::from(df));
        let profile = DataProfiler::default().profile(&table);

        let text = BasicInsights
            .generate(&InsightRequest {
                profile: &profile,
                charts: &[],
                cleaning: table.summary(),
            })
            .unwrap();

        assert!(text.contains("No missing values detected"));
        assert!(!text.contains("Strongest correlation"));
        assert_eq!(BasicInsights.name(), "basic");
    }
}
