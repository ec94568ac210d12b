//! Main analysis pipeline module.
//!
//! This module provides the [`Dashboard`] struct and its builder, which
//! orchestrate cleaning, profiling, chart planning and insight generation.

use crate::charts::{ChartPlanner, ChartSpec};
use crate::cleaner::DataCleaner;
use crate::config::{ConfigValidationError, DashboardConfig};
use crate::error::{DashboardError, Result};
use crate::insights::{BasicInsights, InsightProvider, InsightRequest};
use crate::pipeline::progress::{
    AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::profiler::{DataProfiler, Profile};
use crate::types::{CleanedTable, CleaningSummary, RawTable, TableOverview};
use serde::{Serialize, Serializer};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{error, info, warn};

/// The main analysis pipeline.
///
/// Use [`Dashboard::builder()`] to create a dashboard with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use autodash::{Dashboard, DashboardConfig};
/// use std::sync::Arc;
///
/// // With a narrative provider and progress reporting
/// let result = Dashboard::builder()
///     .insight_provider(Arc::new(MyLlmProvider::new(api_key)))
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .analyze(&raw)?;
///
/// // Deterministic narrative only
/// let result = Dashboard::builder()
///     .config(DashboardConfig::builder().histogram_bins(20).build()?)
///     .build()?
///     .analyze(&raw)?;
/// ```
pub struct Dashboard {
    config: DashboardConfig,
    insight_provider: Option<Arc<dyn InsightProvider>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cleaner: DataCleaner,
    profiler: DataProfiler,
    planner: ChartPlanner,
}

// Profiling and planning borrow the dashboard from scoped worker threads.
static_assertions::assert_impl_all!(Dashboard: Send, Sync);

/// Everything one analysis run produces.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardResult {
    /// Serialized as its cleaning summary.
    #[serde(rename = "cleaning", serialize_with = "serialize_cleaning")]
    pub cleaned: CleanedTable,
    pub overview: TableOverview,
    pub profile: Profile,
    pub charts: Vec<ChartSpec>,
    pub insights: String,
    /// Name of the provider whose narrative ended up in `insights`.
    pub insight_source: String,
    pub duration_ms: u64,
}

impl DashboardResult {
    /// The audit of what cleaning changed.
    pub fn cleaning_summary(&self) -> &CleaningSummary {
        self.cleaned.summary()
    }
}

fn serialize_cleaning<S: Serializer>(
    table: &CleanedTable,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    table.summary().serialize(serializer)
}

impl Dashboard {
    /// Create a new dashboard builder.
    pub fn builder() -> DashboardBuilder {
        DashboardBuilder::default()
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Run the full analysis over a raw table.
    ///
    /// The raw table is not modified. Cleaning, profiling and planning never
    /// fail on well-formed input; a failing insight provider degrades to
    /// [`BasicInsights`]. The only error left is a panicking worker thread,
    /// reported as [`DashboardError::Internal`].
    pub fn analyze(&self, raw: &RawTable) -> Result<DashboardResult> {
        match self.analyze_internal(raw) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Analysis completed successfully"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Analysis error: {}", e);
                Err(e)
            }
        }
    }

    /// Clean a raw table with this dashboard's configuration.
    pub fn clean(&self, raw: &RawTable) -> CleanedTable {
        self.cleaner.clean(raw)
    }

    /// Profile a cleaned table with this dashboard's configuration.
    pub fn profile(&self, table: &CleanedTable) -> Profile {
        self.profiler.profile(table)
    }

    /// Plan charts for a cleaned table with this dashboard's configuration.
    pub fn plan_charts(&self, table: &CleanedTable) -> Vec<ChartSpec> {
        self.planner.plan(table)
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn analyze_internal(&self, raw: &RawTable) -> Result<DashboardResult> {
        let start_time = Instant::now();

        info!(
            rows = raw.height(),
            columns = raw.width(),
            "Starting dashboard analysis"
        );
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Initializing,
            0.0,
            "Starting analysis...",
        ));

        // Step 1: Clean
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Cleaning,
            0.0,
            "Cleaning dataset...",
        ));
        let cleaned = self.cleaner.clean(raw);
        let overview = cleaned.overview();
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Cleaning,
            1.0,
            format!(
                "Cleaned dataset: {} rows, {} columns",
                cleaned.height(),
                cleaned.width()
            ),
        ));

        // Step 2: Profile and plan charts side by side; both only read the table
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Analyzing,
            0.0,
            "Profiling dataset and planning charts...",
        ));
        let (profile, charts) = thread::scope(|scope| {
            let profile = scope.spawn(|| self.profiler.profile(&cleaned));
            let charts = scope.spawn(|| self.planner.plan(&cleaned));

            let profile = profile.join().map_err(|_| panicked("profiling"))?;
            let charts = charts.join().map_err(|_| panicked("chart planning"))?;
            Ok::<_, DashboardError>((profile, charts))
        })?;
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Analyzing,
            1.0,
            format!("Profile ready, {} charts planned", charts.len()),
        ));

        // Step 3: Narrative
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Insights,
            0.0,
            "Generating insights...",
        ));
        let request = InsightRequest {
            profile: &profile,
            charts: &charts,
            cleaning: cleaned.summary(),
        };
        let (insights, insight_source) = self.generate_insights(&request);
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Insights,
            1.0,
            format!("Insights generated by '{}'", insight_source),
        ));

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            rows = cleaned.height(),
            charts = charts.len(),
            duration_ms,
            "Dashboard analysis complete"
        );

        Ok(DashboardResult {
            cleaned,
            overview,
            profile,
            charts,
            insights,
            insight_source,
            duration_ms,
        })
    }

    /// Ask the injected provider for a narrative, falling back to the basic one.
    fn generate_insights(&self, request: &InsightRequest<'_>) -> (String, String) {
        let fallback = BasicInsights::new();

        let Some(provider) = &self.insight_provider else {
            return (fallback.render(request), fallback.name().to_string());
        };

        match provider.generate(request) {
            Ok(text) if !text.trim().is_empty() => (text, provider.name().to_string()),
            Ok(_) => {
                warn!(
                    provider = provider.name(),
                    "Insight provider returned an empty narrative, using basic insights"
                );
                (fallback.render(request), fallback.name().to_string())
            }
            Err(e) => {
                warn!(
                    provider = provider.name(),
                    model = provider.model().unwrap_or("-"),
                    error = %e,
                    "Insight provider failed, using basic insights"
                );
                (fallback.render(request), fallback.name().to_string())
            }
        }
    }
}

fn panicked(stage: &str) -> DashboardError {
    DashboardError::Internal(format!("{} thread panicked", stage))
}

/// Builder for constructing a [`Dashboard`] with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use autodash::{Dashboard, DashboardConfig};
///
/// let dashboard = Dashboard::builder()
///     .config(DashboardConfig::default())
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?;
/// ```
#[derive(Default)]
pub struct DashboardBuilder {
    config: Option<DashboardConfig>,
    insight_provider: Option<Arc<dyn InsightProvider>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(DashboardBuilder: Send);

impl DashboardBuilder {
    /// Set the dashboard configuration.
    pub fn config(mut self, config: DashboardConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the provider that writes the narrative.
    ///
    /// Use `Arc` so one provider (and its client or credentials) can be
    /// shared across dashboards. Without a provider, or when it fails, the
    /// narrative comes from [`BasicInsights`].
    pub fn insight_provider(mut self, provider: Arc<dyn InsightProvider>) -> Self {
        self.insight_provider = Some(provider);
        self
    }

    /// Set a progress reporter for receiving updates during analysis.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use autodash::{ProgressReporter, ProgressUpdate};
    /// use std::sync::Arc;
    ///
    /// struct MyReporter;
    ///
    /// impl ProgressReporter for MyReporter {
    ///     fn report(&self, update: ProgressUpdate) {
    ///         println!("{}: {}", update.stage.display_name(), update.message);
    ///     }
    /// }
    ///
    /// let dashboard = Dashboard::builder()
    ///     .progress_reporter(Arc::new(MyReporter))
    ///     .build()?;
    /// ```
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// Convenience over [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the dashboard.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Dashboard, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Dashboard {
            cleaner: DataCleaner::new(config.clone()),
            profiler: DataProfiler::new(config.clone()),
            planner: ChartPlanner::new(config.clone()),
            config,
            insight_provider: self.insight_provider,
            progress_reporter: self.progress_reporter,
        })
    }
}
