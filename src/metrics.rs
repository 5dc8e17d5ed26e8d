// src/metrics.rs
//! Run counters. Recording is a no-op unless a recorder is installed; when
//! `run.metrics_file` is set, main installs the Prometheus recorder and the
//! rendering is written there at the end of the run.

use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::fs;
use std::path::Path;

/// One-time metrics registration (so series carry HELP lines).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("jobs_fetched_total", "Raw postings returned by a source.");
        describe_counter!(
            "jobs_fetch_errors_total",
            "Failed source calls, treated as zero results."
        );
        describe_counter!("jobs_consultant_total", "Postings dropped as consultant ads.");
        describe_counter!(
            "jobs_below_threshold_total",
            "Postings with no category at or above its threshold."
        );
        describe_counter!("jobs_duplicate_total", "Postings removed by id deduplication.");
        describe_counter!("jobs_accepted_total", "Postings written, per category.");
        describe_counter!(
            "fallback_gate_closed_total",
            "Fallback calls skipped because of the cooldown."
        );
        describe_gauge!("jobs_last_run_ts", "Unix ts when the last run finished.");
    });
}

pub struct Metrics {
    handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder for this process.
    pub fn install() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Textfile-collector style dump.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        fs::write(path, self.render())
            .with_context(|| format!("writing metrics to {}", path.display()))
    }
}
