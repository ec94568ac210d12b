//! Narrative insights over a finished analysis.
//!
//! The narrative layer is a black box behind the [`InsightProvider`] trait.
//! Callers inject their own provider (an LLM client, a template engine, ...)
//! through the pipeline builder; [`BasicInsights`] is the deterministic
//! fallback used when none is configured or the injected one fails.
//!
//! # Example
//!
//! ```rust,ignore
//! use autodash::{Dashboard, insights::InsightProvider};
//! use std::sync::Arc;
//!
//! let dashboard = Dashboard::builder()
//!     .insight_provider(Arc::new(MyProvider::new(api_key)))
//!     .build()?;
//! ```

mod basic;
mod provider;

pub use basic::BasicInsights;
pub use provider::{InsightProvider, InsightRequest};
