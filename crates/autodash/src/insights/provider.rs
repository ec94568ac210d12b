//! Insight provider trait for abstracting narrative generation.

use crate::charts::ChartSpec;
use crate::profiler::Profile;
use crate::types::CleaningSummary;
use anyhow::Result;

/// Everything a provider may draw on to describe a dataset.
#[derive(Debug, Clone, Copy)]
pub struct InsightRequest<'a> {
    pub profile: &'a Profile,
    pub charts: &'a [ChartSpec],
    pub cleaning: &'a CleaningSummary,
}

/// Trait for providers that turn an analysis into free text.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a configured pipeline can be
/// shared across threads.
///
/// # Error Handling
///
/// Implementations should return meaningful errors via `anyhow::Result`.
/// The pipeline falls back to [`BasicInsights`](super::BasicInsights) if a
/// provider fails.
pub trait InsightProvider: Send + Sync {
    /// Produce the narrative for one analysis.
    fn generate(&self, request: &InsightRequest<'_>) -> Result<String>;

    /// Get the provider name for logging and debugging.
    fn name(&self) -> &str;

    /// Get the model being used by this provider.
    ///
    /// Returns `None` if the provider doesn't expose model information.
    fn model(&self) -> Option<&str> {
        None
    }
}
