// src/ingest/mod.rs
pub mod gate;
pub mod providers;
pub mod types;

use chrono::NaiveDateTime;
use metrics::counter;
use tracing::{info, warn};

use crate::config::Location;
use crate::ingest::gate::FallbackGate;
use crate::ingest::types::{JobSource, RawPosting};
use crate::model::Source;

/// What one (term, location) pair produced, and from where.
#[derive(Debug, Clone, Default)]
pub struct Fetched {
    pub source: Source,
    pub postings: Vec<RawPosting>,
}

/// Call `src`, converting any failure into zero results.
pub async fn fetch_from(src: &dyn JobSource, term: &str, location: &Location) -> Option<Vec<RawPosting>> {
    match src.search(term, location).await {
        Ok(v) => {
            counter!("jobs_fetched_total", "source" => src.kind().as_str()).increment(v.len() as u64);
            Some(v)
        }
        Err(e) => {
            warn!(provider = src.name(), term, location = %location.name, error = ?e, "fetch failed, treating as empty");
            counter!("jobs_fetch_errors_total", "source" => src.kind().as_str()).increment(1);
            None
        }
    }
}

/// Primary first; only when that yields nothing, the fallback, subject to
/// the cooldown gate. The gate is stamped only after a successful fallback
/// call. Never fails.
pub async fn fetch_pair(
    primary: &dyn JobSource,
    fallback: Option<&dyn JobSource>,
    gate: &FallbackGate,
    term: &str,
    location: &Location,
    now: NaiveDateTime,
) -> Fetched {
    let postings = fetch_from(primary, term, location).await.unwrap_or_default();
    if !postings.is_empty() {
        return Fetched {
            source: primary.kind(),
            postings,
        };
    }

    let Some(fb) = fallback.filter(|f| f.is_enabled()) else {
        return Fetched::default();
    };
    if !gate.is_open(now) {
        info!(term, location = %location.name, "fallback used within cooldown, skipping");
        counter!("fallback_gate_closed_total").increment(1);
        return Fetched::default();
    }

    match fetch_from(fb, term, location).await {
        Some(postings) => {
            gate.mark_used(now);
            Fetched {
                source: fb.kind(),
                postings,
            }
        }
        None => Fetched::default(),
    }
}
