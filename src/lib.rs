// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod model;
pub mod rules;

// Fetching: source trait, JobTech/aggregator providers, fallback gate
pub mod ingest;

// Classification pipeline
pub mod classify;
pub mod filter;
pub mod normalize;
pub mod relevance;

pub mod output;
pub mod pipeline;
pub mod samples;

// Ambient
pub mod logging;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::config::AppConfig;
pub use crate::ingest::types::{JobSource, RawPosting};
pub use crate::model::{Category, NormalizedJob, Source};
pub use crate::pipeline::{Pipeline, RunReport};
pub use crate::rules::RuleBook;
