//! Report generation module.
//!
//! This module assembles the analysis report and writes it, together with
//! the cleaned dataset, to an output directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use autodash::reporting::ReportGenerator;
//!
//! let report = ReportGenerator::build_report("data/sales.csv", None, &result);
//!
//! // Print as JSON
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! // Or write to file
//! let generator = ReportGenerator::new(PathBuf::from("outputs"), None);
//! generator.write_report_to_file(&report, "sales")?;
//! generator.write_cleaned_dataset(&result.cleaned, "sales")?;
//! ```

mod generator;

pub use generator::{DashboardReport, ReportGenerator, ReportSummary};
