//! Pipeline module.
//!
//! This module provides the dashboard analysis pipeline and its progress reporting.

mod builder;
pub mod progress;

pub use builder::{Dashboard, DashboardBuilder, DashboardResult};
pub use progress::{AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate};
