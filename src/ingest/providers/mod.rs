// src/ingest/providers/mod.rs
pub mod indeed;
pub mod jobtech;

use anyhow::{Context, Result};
use std::time::Duration;

pub use indeed::IndeedSource;
pub use jobtech::JobTechSource;

/// Shared client settings for both sources.
pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("job-radar/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
        .context("building http client")
}
