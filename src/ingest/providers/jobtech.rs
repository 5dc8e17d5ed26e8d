// src/ingest/providers/jobtech.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::config::{Location, PrimaryConfig, RunConfig};
use crate::ingest::types::{decode_all, JobSource, RawPosting};
use crate::model::Source;

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total: Total,
    #[serde(default)]
    hits: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct Total {
    #[serde(default)]
    value: u64,
}

/// JobTech job-search API (Arbetsförmedlingen).
pub struct JobTechSource {
    client: reqwest::Client,
    url: String,
    limit: u32,
}

impl JobTechSource {
    pub fn new(cfg: &PrimaryConfig, run: &RunConfig) -> Result<Self> {
        Ok(Self {
            client: super::http_client(run.http_timeout_secs)?,
            url: cfg.url.clone(),
            limit: run.result_limit,
        })
    }

    /// Decode a search response body into (total, postings).
    pub fn parse_body(body: &str) -> Result<(u64, Vec<RawPosting>)> {
        let resp: SearchResponse =
            serde_json::from_str(body).context("parsing jobtech search response")?;
        let postings = decode_all("jobtech", resp.hits, RawPosting::jobtech);
        Ok((resp.total.value, postings))
    }

    async fn get(&self, query: &[(&str, String)]) -> Result<String> {
        let resp = self
            .client
            .get(&self.url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("jobtech GET {}", self.url))?
            .error_for_status()
            .context("jobtech http status")?;
        resp.text().await.context("jobtech .text()")
    }
}

#[async_trait]
impl JobSource for JobTechSource {
    async fn search(&self, term: &str, location: &Location) -> Result<Vec<RawPosting>> {
        let body = self
            .get(&[
                ("q", term.to_string()),
                ("municipality", location.municipality.clone()),
                ("limit", self.limit.to_string()),
                ("sort", "relevance".to_string()),
            ])
            .await?;
        let (total, postings) = Self::parse_body(&body)?;
        info!(
            provider = "jobtech",
            term,
            location = %location.name,
            total,
            retrieved = postings.len(),
            "search done"
        );
        Ok(postings)
    }

    async fn probe(&self) -> Result<u64> {
        let body = self.get(&[("limit", "5".to_string())]).await?;
        let (total, _) = Self::parse_body(&body)?;
        Ok(total)
    }

    fn kind(&self) -> Source {
        Source::Primary
    }

    fn name(&self) -> &'static str {
        "jobtech"
    }
}
