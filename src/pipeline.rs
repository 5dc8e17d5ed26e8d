// src/pipeline.rs
//! One scrape run: probe → harvest (location × term) → normalize → classify →
//! score → accept → dedup → partition → write.

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use metrics::{counter, gauge};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::classify::classify;
use crate::config::AppConfig;
use crate::filter::{self, CategoryScore, Partitioned, Rejection};
use crate::ingest::{self, gate::FallbackGate, types::JobSource, types::RawPosting};
use crate::metrics::ensure_metrics_described;
use crate::model::{Category, NormalizedJob, Source};
use crate::normalize::normalize;
use crate::relevance;
use crate::rules::RuleBook;
use crate::{output, samples};

/// A raw posting with the context it was found in.
#[derive(Debug, Clone)]
pub struct Harvested {
    pub posting: RawPosting,
    pub source: Source,
    pub location: String,
}

/// Result of the in-memory stages.
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    pub partitioned: Partitioned,
    pub consultant: usize,
    pub below_threshold: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    /// Raw postings collected from the sources.
    pub fetched: usize,
    /// True when the output was built from sample postings.
    pub synthetic: bool,
    pub outcome: Outcome,
    pub written: Vec<PathBuf>,
}

pub struct Pipeline {
    cfg: AppConfig,
    rules: RuleBook,
    primary: Box<dyn JobSource>,
    fallback: Option<Box<dyn JobSource>>,
    gate: FallbackGate,
}

impl Pipeline {
    pub fn new(
        cfg: AppConfig,
        primary: Box<dyn JobSource>,
        fallback: Option<Box<dyn JobSource>>,
    ) -> Result<Self> {
        let rules = RuleBook::compile(&cfg).context("compiling keyword rules")?;
        let gate = FallbackGate::new(cfg.run.stamp_path(), cfg.run.fallback_cooldown_days);
        if let Some(fb) = &fallback {
            if !fb.is_enabled() {
                info!(provider = fb.name(), "fallback source disabled (no api key)");
            }
        }
        Ok(Self {
            cfg,
            rules,
            primary,
            fallback,
            gate,
        })
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    /// Full run. Fails only when the probe fails or artifacts cannot be
    /// written; per-pair fetch problems are absorbed.
    pub async fn run(&self) -> Result<RunReport> {
        ensure_metrics_described();

        let total = self
            .primary
            .probe()
            .await
            .with_context(|| format!("connectivity probe against {} failed", self.primary.name()))?;
        info!(provider = self.primary.name(), total, "primary source reachable");

        let mut harvested = self.harvest().await;
        let fetched = harvested.len();
        let mut synthetic = false;
        if harvested.is_empty() {
            if self.cfg.run.sample_fallback {
                warn!("no postings from any source, writing sample data");
                harvested = samples::sample_postings()
                    .into_iter()
                    .map(|posting| Harvested {
                        posting,
                        source: Source::Primary,
                        location: String::new(),
                    })
                    .collect();
                synthetic = true;
            } else {
                warn!("no postings from any source");
            }
        }

        let outcome = self.process(harvested, synthetic);

        let written = output::write_all(
            &self.cfg.run.output_dir,
            &outcome.partitioned,
            self.cfg.run.description_max_chars,
            Local::now().naive_local(),
        )?;
        gauge!("jobs_last_run_ts").set(Utc::now().timestamp() as f64);

        info!(
            fetched,
            synthetic,
            it = outcome.partitioned.jobs(Category::IT).len(),
            ai = outcome.partitioned.jobs(Category::AI).len(),
            rpa = outcome.partitioned.jobs(Category::RPA).len(),
            consultant = outcome.consultant,
            below_threshold = outcome.below_threshold,
            duplicates = outcome.duplicates,
            "run finished"
        );

        Ok(RunReport {
            fetched,
            synthetic,
            outcome,
            written,
        })
    }

    /// Query every (location, term) pair in order, one call at a time, with
    /// the configured delay between pairs.
    pub async fn harvest(&self) -> Vec<Harvested> {
        let terms = self.cfg.search_terms();
        let delay = Duration::from_millis(self.cfg.run.request_delay_ms);
        let mut out = Vec::new();
        let mut first = true;

        for loc in &self.cfg.locations {
            for term in &terms {
                if !first && !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                first = false;

                let fetched = ingest::fetch_pair(
                    self.primary.as_ref(),
                    self.fallback.as_deref(),
                    &self.gate,
                    term,
                    loc,
                    Local::now().naive_local(),
                )
                .await;
                debug!(term = %term, location = %loc.name, source = %fetched.source, count = fetched.postings.len(), "pair done");
                out.extend(fetched.postings.into_iter().map(|posting| Harvested {
                    posting,
                    source: fetched.source,
                    location: loc.name.clone(),
                }));
            }
        }
        out
    }

    /// Normalize, classify, score and filter. Pure apart from logs/metrics.
    pub fn process(&self, harvested: Vec<Harvested>, synthetic: bool) -> Outcome {
        let mut accepted = Vec::new();
        let mut consultant = 0usize;
        let mut below_threshold = 0usize;

        for h in harvested {
            let mut job = normalize(
                &h.posting,
                h.source,
                &h.location,
                &self.cfg.primary.ad_base_url,
            );
            job.synthetic = synthetic;
            classify(&mut job, &self.rules);
            let scores = self.score_all(&job);

            match filter::accept(job, &scores) {
                Ok(j) => accepted.push(j),
                Err(Rejection::Consultant) => consultant += 1,
                Err(Rejection::BelowThreshold) => below_threshold += 1,
            }
        }

        let (deduped, duplicates) = filter::dedup_first_wins(accepted);
        let partitioned = filter::partition(deduped);

        counter!("jobs_consultant_total").increment(consultant as u64);
        counter!("jobs_below_threshold_total").increment(below_threshold as u64);
        counter!("jobs_duplicate_total").increment(duplicates as u64);
        for c in Category::ALL {
            counter!("jobs_accepted_total", "category" => c.as_str())
                .increment(partitioned.jobs(c).len() as u64);
        }

        Outcome {
            partitioned,
            consultant,
            below_threshold,
            duplicates,
        }
    }

    /// Score for every configured category.
    pub fn score_all(&self, job: &NormalizedJob) -> Vec<CategoryScore> {
        self.rules
            .categories()
            .iter()
            .map(|r| CategoryScore {
                category: r.category,
                score: relevance::score(job, r, &self.rules.scoring).score,
                threshold: r.threshold,
            })
            .collect()
    }
}
