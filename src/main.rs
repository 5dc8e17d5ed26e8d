//! job-radar: single-run entrypoint.
//! Loads configuration, sets up logging (console + file), runs one scrape and
//! writes the JSON artifacts. Exits non-zero when the configuration is broken
//! or the primary source cannot be reached.

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use job_radar::config;
use job_radar::ingest::providers::{IndeedSource, JobTechSource};
use job_radar::logging;
use job_radar::metrics::Metrics;
use job_radar::pipeline::Pipeline;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let cfg = config::load_default().context("loading configuration")?;
    let _guard = logging::init(&cfg.run.log_path())?;
    for notice in &cfg.notices {
        warn!(target: "config", "{notice}");
    }

    let metrics = match cfg.run.metrics_path() {
        Some(path) => Some((Metrics::install()?, path)),
        None => None,
    };

    let primary = JobTechSource::new(&cfg.primary, &cfg.run)?;
    let fallback = IndeedSource::from_env(&cfg.fallback, &cfg.run)?;
    let output_dir = cfg.run.output_dir.clone();
    let pipeline = Pipeline::new(cfg, Box::new(primary), Some(Box::new(fallback)))?;

    info!(output_dir = %output_dir.display(), "starting job scrape");
    let result = pipeline.run().await;

    if let Some((m, path)) = &metrics {
        if let Err(e) = m.write_to(path) {
            warn!(error = ?e, "could not write metrics file");
        }
    }

    match result {
        Ok(report) => {
            info!(
                fetched = report.fetched,
                accepted = report.outcome.partitioned.total(),
                files = report.written.len(),
                "job scrape completed"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = ?e, "job scrape failed");
            Err(e)
        }
    }
}
