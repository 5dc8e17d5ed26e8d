// tests/common/mod.rs
// Shared helpers for integration tests: an in-memory JobSource and a config
// pointed at a temp dir with no request delay.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use job_radar::config::{AppConfig, Location};
use job_radar::{Category, JobSource, RawPosting, Source};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub struct MockSource {
    pub kind: Source,
    pub by_term: HashMap<String, Vec<Value>>,
    pub probe_ok: bool,
    pub fail_search: bool,
    pub enabled: bool,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl MockSource {
    pub fn new(kind: Source) -> Self {
        Self {
            kind,
            by_term: HashMap::new(),
            probe_ok: true,
            fail_search: false,
            enabled: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, term: &str, hits: Vec<Value>) -> Self {
        self.by_term.insert(term.to_string(), hits);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl JobSource for MockSource {
    async fn search(&self, term: &str, location: &Location) -> Result<Vec<RawPosting>> {
        self.calls
            .lock()
            .unwrap()
            .push((term.to_string(), location.name.clone()));
        if self.fail_search {
            return Err(anyhow!("mock transport error"));
        }
        let decode = match self.kind {
            Source::Primary => RawPosting::jobtech,
            Source::Fallback => RawPosting::flat,
        };
        self.by_term
            .get(term)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(decode)
            .collect()
    }

    async fn probe(&self) -> Result<u64> {
        if self.probe_ok {
            Ok(42)
        } else {
            Err(anyhow!("connection refused"))
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn kind(&self) -> Source {
        self.kind
    }

    fn name(&self) -> &'static str {
        match self.kind {
            Source::Primary => "mock-primary",
            Source::Fallback => "mock-fallback",
        }
    }
}

/// Embedded config, one location, one search term per category, no delay,
/// everything written under `dir`.
pub fn test_config(dir: &Path) -> AppConfig {
    let mut cfg = AppConfig::embedded().unwrap();
    cfg.run.output_dir = dir.to_path_buf();
    cfg.run.request_delay_ms = 0;
    cfg.run.sample_fallback = false;
    cfg.locations = vec![Location {
        name: "Göteborg".into(),
        municipality: "1480".into(),
    }];
    for cat in &mut cfg.categories {
        let term = match cat.name.parse::<Category>().unwrap() {
            Category::IT => "systemutvecklare",
            Category::AI => "machine learning",
            Category::RPA => "rpa",
        };
        cat.search_terms = vec![term.to_string()];
    }
    cfg
}

/// Lets a test keep a handle on a source the pipeline owns.
pub struct Shared(pub Arc<MockSource>);

#[async_trait]
impl JobSource for Shared {
    async fn search(&self, term: &str, location: &Location) -> Result<Vec<RawPosting>> {
        self.0.search(term, location).await
    }

    async fn probe(&self) -> Result<u64> {
        self.0.probe().await
    }

    fn is_enabled(&self) -> bool {
        self.0.is_enabled()
    }

    fn kind(&self) -> Source {
        self.0.kind()
    }

    fn name(&self) -> &'static str {
        self.0.name()
    }
}
