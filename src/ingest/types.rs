// src/ingest/types.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::config::Location;
use crate::model::Source;

/// One hit from the JobTech search API. Every field is kept as raw JSON since
/// the API mixes plain strings with nested objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobTechHit {
    pub id: Value,
    pub headline: Value,
    pub employer: Value,
    pub workplace_address: Value,
    pub description: Value,
    pub application_details: Value,
    pub webpage_url: Value,
    pub publication_date: Value,
    pub application_deadline: Value,
}

/// Flat job object as returned by the aggregator. The canonical output shape
/// is accepted as well, so written jobs can be read back in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatPosting {
    /// Already a `NormalizedJob`; text fields are taken as they are.
    pub canonical: bool,
    pub id: Value,
    pub title: Value,
    pub employer: Value,
    pub location: Value,
    pub description: Value,
    pub url: Value,
    pub published: Value,
    pub deadline: Value,
}

impl FlatPosting {
    /// First present, non-null key wins.
    fn pick(map: &Map<String, Value>, keys: &[&str]) -> Value {
        keys.iter()
            .filter_map(|k| map.get(*k))
            .find(|v| !v.is_null())
            .cloned()
            .unwrap_or(Value::Null)
    }

    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            canonical: map.contains_key("relevance_score"),
            id: Self::pick(map, &["id", "job_id", "jobkey"]),
            title: Self::pick(map, &["title", "job_title"]),
            employer: Self::pick(map, &["employer", "company_name", "company"]),
            location: Self::pick(map, &["location", "job_location"]),
            description: Self::pick(map, &["description", "job_description", "snippet"]),
            url: Self::pick(map, &["url", "job_url", "link"]),
            published: Self::pick(map, &["published", "posted_at", "date"]),
            deadline: Self::pick(map, &["deadline"]),
        }
    }
}

/// A posting in one of the two upstream shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPosting {
    JobTech(JobTechHit),
    Flat(FlatPosting),
}

impl RawPosting {
    pub fn jobtech(v: Value) -> Result<Self> {
        if !v.is_object() {
            return Err(anyhow!("jobtech hit is not an object"));
        }
        let hit: JobTechHit = serde_json::from_value(v).context("decoding jobtech hit")?;
        Ok(RawPosting::JobTech(hit))
    }

    pub fn flat(v: Value) -> Result<Self> {
        match v {
            Value::Object(map) => Ok(RawPosting::Flat(FlatPosting::from_map(&map))),
            _ => Err(anyhow!("job entry is not an object")),
        }
    }
}

/// Decode a list of postings, skipping (and logging) the ones that do not
/// decode. One bad entry never spoils the batch.
pub fn decode_all(
    provider: &str,
    values: Vec<Value>,
    decode: fn(Value) -> Result<RawPosting>,
) -> Vec<RawPosting> {
    let mut out = Vec::with_capacity(values.len());
    for (i, v) in values.into_iter().enumerate() {
        match decode(v) {
            Ok(p) => out.push(p),
            Err(e) => warn!(provider, index = i, error = %e, "skipping malformed posting"),
        }
    }
    out
}

/// A job search backend. Calls are issued one at a time by the pipeline.
#[async_trait::async_trait]
pub trait JobSource: Send + Sync {
    /// Postings for one search term in one location.
    async fn search(&self, term: &str, location: &Location) -> Result<Vec<RawPosting>>;

    /// Cheap reachability check; returns the total hit count when known.
    async fn probe(&self) -> Result<u64> {
        Ok(0)
    }

    /// Whether the source can be called at all (e.g. credentials present).
    fn is_enabled(&self) -> bool {
        true
    }

    fn kind(&self) -> Source;
    fn name(&self) -> &'static str;
}
