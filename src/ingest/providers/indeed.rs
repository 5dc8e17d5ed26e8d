// src/ingest/providers/indeed.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::config::{FallbackConfig, Location, RunConfig};
use crate::ingest::types::{decode_all, JobSource, RawPosting};
use crate::model::Source;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Body {
    Bare(Vec<Value>),
    Wrapped {
        #[serde(default)]
        jobs: Vec<Value>,
    },
}

/// Indeed aggregator behind RapidAPI. Disabled when no API key is set.
pub struct IndeedSource {
    client: reqwest::Client,
    url: String,
    host: String,
    api_key: Option<String>,
}

impl IndeedSource {
    pub fn new(cfg: &FallbackConfig, run: &RunConfig, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            client: super::http_client(run.http_timeout_secs)?,
            url: cfg.url.clone(),
            host: cfg.host.clone(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Read the key from the env var named in the config.
    pub fn from_env(cfg: &FallbackConfig, run: &RunConfig) -> Result<Self> {
        Self::new(cfg, run, std::env::var(&cfg.api_key_env).ok())
    }

    pub fn parse_body(body: &str) -> Result<Vec<RawPosting>> {
        let parsed: Body = serde_json::from_str(body).context("parsing aggregator response")?;
        let jobs = match parsed {
            Body::Bare(v) => v,
            Body::Wrapped { jobs } => jobs,
        };
        Ok(decode_all("indeed", jobs, RawPosting::flat))
    }
}

#[async_trait]
impl JobSource for IndeedSource {
    async fn search(&self, term: &str, location: &Location) -> Result<Vec<RawPosting>> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("aggregator api key not configured"))?;
        let body = self
            .client
            .get(&self.url)
            .header("X-RapidAPI-Key", key)
            .header("X-RapidAPI-Host", &self.host)
            .query(&[("search_term", term), ("location", location.name.as_str())])
            .send()
            .await
            .with_context(|| format!("aggregator GET {}", self.url))?
            .error_for_status()
            .context("aggregator http status")?
            .text()
            .await
            .context("aggregator .text()")?;
        let postings = Self::parse_body(&body)?;
        info!(
            provider = "indeed",
            term,
            location = %location.name,
            retrieved = postings.len(),
            "search done"
        );
        Ok(postings)
    }

    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    fn kind(&self) -> Source {
        Source::Fallback
    }

    fn name(&self) -> &'static str {
        "indeed"
    }
}
