//! Automatic Dashboard Library
//!
//! Deterministic cleaning, profiling and chart planning for tabular datasets,
//! built with Rust and Polars.
//!
//! # Overview
//!
//! Given a raw table, the library:
//!
//! - **Cleans** it: drops all-missing rows and columns and duplicate rows,
//!   imputes every remaining missing cell, promotes date-like text to temporal
//! - **Profiles** it: shape, describe-style numeric summaries, Pearson
//!   correlations, categorical frequency tables
//! - **Plans charts**: histograms, a correlation heatmap, box plots, top-K bar
//!   charts, a scatter matrix and time series, as declarative plot definitions
//! - **Narrates** it: through an injectable [`InsightProvider`], with a
//!   deterministic [`BasicInsights`] fallback
//!
//! Every stage is a pure function of its input: the raw table is never
//! modified and running the pipeline twice gives the same result.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use autodash::{Dashboard, RawTable};
//! use polars::prelude::*;
//!
//! let df = CsvReadOptions::default()
//!     .try_into_reader_with_file_path(Some("sales.csv".into()))?
//!     .finish()?;
//!
//! let result = Dashboard::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .analyze(&RawTable::from(df))?;
//!
//! println!("{} charts planned", result.charts.len());
//! println!("{}", result.insights);
//! ```
//!
//! # Individual stages
//!
//! The stages can also be run on their own with the default configuration:
//!
//! ```rust,ignore
//! let cleaned = autodash::clean(&raw);
//! let profile = autodash::profile(&cleaned);
//! let charts = autodash::plan_charts(&cleaned);
//! ```
//!
//! # Configuration
//!
//! Use [`DashboardConfig`] to tune chart caps and bins:
//!
//! ```rust,ignore
//! use autodash::DashboardConfig;
//!
//! let config = DashboardConfig::builder()
//!     .histogram_bins(20)          // Bins per distribution histogram
//!     .max_categorical_charts(5)   // First 5 categorical columns get a bar chart
//!     .categorical_top_k(8)        // Top 8 values per bar chart
//!     .build()?;
//! ```

pub mod charts;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod insights;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use charts::{ChartKind, ChartPlanner, ChartSpec, Layout, Mark, PlotDefinition};
pub use cleaner::DataCleaner;
pub use config::{ConfigValidationError, DashboardConfig, DashboardConfigBuilder};
pub use error::{DashboardError, Result, ResultExt};
pub use imputers::StatisticalImputer;
pub use insights::{BasicInsights, InsightProvider, InsightRequest};
pub use loader::{InputFormat, load_table};
pub use pipeline::{
    AnalysisStage, ClosureProgressReporter, Dashboard, DashboardBuilder, DashboardResult,
    ProgressReporter, ProgressUpdate,
};
pub use profiler::{
    CategoricalSummary, CorrelationMatrix, DataProfiler, DatasetInfo, NumericSummary, Profile,
};
pub use reporting::{DashboardReport, ReportGenerator, ReportSummary};
pub use types::{
    CleanedTable, CleaningSummary, ColumnKind, ImputationRecord, RawTable, TableOverview,
};

/// Clean a raw table with the default configuration.
pub fn clean(raw: &RawTable) -> CleanedTable {
    DataCleaner::default().clean(raw)
}

/// Profile a cleaned table with the default configuration.
pub fn profile(table: &CleanedTable) -> Profile {
    DataProfiler::default().profile(table)
}

/// Plan the dashboard charts for a cleaned table with the default configuration.
pub fn plan_charts(table: &CleanedTable) -> Vec<ChartSpec> {
    ChartPlanner::default().plan(table)
}
