// src/config.rs
//! Runtime configuration: search locations, category rule sets, consultant and
//! meaningful-employer lists, source endpoints and run knobs.
//!
//! Resolution order:
//! 1) $JOBS_CONFIG_PATH (must exist)
//! 2) config/jobs.toml relative to the working directory
//! 3) the copy compiled into the binary

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::Category;

pub const DEFAULT_CONFIG_PATH: &str = "config/jobs.toml";
pub const ENV_CONFIG_PATH: &str = "JOBS_CONFIG_PATH";
pub const ENV_OUTPUT_DIR: &str = "JOBS_OUTPUT_DIR";
pub const ENV_THRESHOLD: &str = "JOBS_THRESHOLD";

/// Lower bound for how much of a description the consultant check scans.
pub const MIN_DESCRIPTION_SCAN: usize = 1000;

const EMBEDDED: &str = include_str!("../config/jobs.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub run: RunConfig,
    pub primary: PrimaryConfig,
    pub fallback: FallbackConfig,
    pub locations: Vec<Location>,
    pub scoring: ScoringConfig,
    pub categories: Vec<CategoryConfig>,
    #[serde(default)]
    pub consultant: ConsultantConfig,
    #[serde(default)]
    pub meaningful: MeaningfulConfig,
    /// Adjustments made while loading. Config is read before logging is up,
    /// so the caller logs these once a subscriber exists.
    #[serde(skip)]
    pub notices: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub output_dir: PathBuf,
    pub log_file: String,
    pub request_delay_ms: u64,
    pub http_timeout_secs: u64,
    pub result_limit: u32,
    pub description_max_chars: usize,
    pub sample_fallback: bool,
    pub fallback_stamp_file: String,
    pub fallback_cooldown_days: i64,
    pub metrics_file: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            log_file: "job_scraper.log".into(),
            request_delay_ms: 1000,
            http_timeout_secs: 20,
            result_limit: 100,
            description_max_chars: 500,
            sample_fallback: true,
            fallback_stamp_file: "last_rapidapi.txt".into(),
            fallback_cooldown_days: 7,
            metrics_file: None,
        }
    }
}

impl RunConfig {
    /// Resolve a run artifact name against the output directory. Absolute
    /// names are kept as they are.
    pub fn in_output(&self, name: &str) -> PathBuf {
        let p = Path::new(name);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.output_dir.join(p)
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.in_output(&self.log_file)
    }

    pub fn stamp_path(&self) -> PathBuf {
        self.in_output(&self.fallback_stamp_file)
    }

    pub fn metrics_path(&self) -> Option<PathBuf> {
        self.metrics_file.as_deref().map(|m| self.in_output(m))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrimaryConfig {
    pub url: String,
    pub ad_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FallbackConfig {
    pub url: String,
    pub host: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_api_key_env() -> String {
    "RAPIDAPI_KEY".into()
}

/// Named place plus the primary source's municipality code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Location {
    pub name: String,
    pub municipality: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Additive,
    Weighted,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default = "d_title_bonus")]
    pub title_bonus: f64,
    #[serde(default = "d_secondary_step")]
    pub secondary_step: f64,
    #[serde(default = "d_secondary_cap")]
    pub secondary_cap: f64,
    #[serde(default = "d_meaningful_bonus")]
    pub meaningful_bonus: f64,
    #[serde(default)]
    pub common_exclusions: Vec<String>,
    #[serde(default)]
    pub weights: SignalWeights,
}

fn d_title_bonus() -> f64 {
    0.5
}
fn d_secondary_step() -> f64 {
    0.1
}
fn d_secondary_cap() -> f64 {
    0.4
}
fn d_meaningful_bonus() -> f64 {
    0.1
}

/// Weights for the weighted strategy.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SignalWeights {
    pub title: f64,
    pub primary: f64,
    pub secondary: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            title: 0.5,
            primary: 0.35,
            secondary: 0.15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    #[serde(default = "d_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub search_terms: Vec<String>,
    #[serde(default)]
    pub title_patterns: Vec<String>,
    #[serde(default)]
    pub primary_keywords: Vec<String>,
    #[serde(default)]
    pub secondary_keywords: Vec<String>,
    #[serde(default)]
    pub exclusion_patterns: Vec<String>,
    #[serde(default)]
    pub protected_title_terms: Vec<String>,
    #[serde(default)]
    pub brand_bonus: f64,
}

fn d_threshold() -> f64 {
    0.6
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsultantConfig {
    pub keywords: Vec<String>,
    pub description_scan_chars: usize,
    pub firms: Vec<String>,
    pub phrases: Vec<String>,
}

impl Default for ConsultantConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            description_scan_chars: MIN_DESCRIPTION_SCAN,
            firms: Vec::new(),
            phrases: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MeaningfulConfig {
    pub employers: Vec<String>,
    pub patterns: Vec<String>,
}

impl AppConfig {
    /// Parse and validate a TOML document. No environment overrides.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: AppConfig = toml::from_str(s).context("parsing job configuration")?;
        cfg.sanitize()?;
        Ok(cfg)
    }

    /// The configuration compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(EMBEDDED)
    }

    /// Distinct search terms across all categories, first occurrence wins,
    /// compared case-insensitively.
    pub fn search_terms(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for cat in &self.categories {
            for t in &cat.search_terms {
                let t = t.trim();
                if t.is_empty() {
                    continue;
                }
                if seen.insert(t.to_lowercase()) {
                    out.push(t.to_string());
                }
            }
        }
        out
    }

    fn sanitize(&mut self) -> Result<()> {
        if self.locations.is_empty() {
            bail!("configuration lists no locations");
        }
        for loc in &self.locations {
            if loc.name.trim().is_empty() || loc.municipality.trim().is_empty() {
                bail!("location entries need both name and municipality");
            }
        }

        let mut seen = HashSet::new();
        for cat in &mut self.categories {
            let c: Category = cat
                .name
                .parse()
                .with_context(|| format!("category `{}`", cat.name))?;
            if !seen.insert(c) {
                bail!("category `{}` is configured twice", c);
            }
            if !cat.threshold.is_finite() {
                self.notices
                    .push(format!("category {c}: non-finite threshold, using {}", d_threshold()));
                cat.threshold = d_threshold();
            }
            if !(0.0..=1.0).contains(&cat.threshold) {
                let clamped = cat.threshold.clamp(0.0, 1.0);
                self.notices
                    .push(format!("category {c}: threshold {} clamped to {clamped}", cat.threshold));
                cat.threshold = clamped;
            }
        }
        if self.categories.is_empty() {
            bail!("configuration lists no categories");
        }

        if self.consultant.description_scan_chars < MIN_DESCRIPTION_SCAN {
            bail!(
                "consultant.description_scan_chars must be at least {}, got {}",
                MIN_DESCRIPTION_SCAN,
                self.consultant.description_scan_chars
            );
        }
        if self.run.fallback_cooldown_days < 0 {
            bail!("run.fallback_cooldown_days must not be negative");
        }
        Ok(())
    }

    /// Apply JOBS_OUTPUT_DIR and JOBS_THRESHOLD on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var(ENV_OUTPUT_DIR) {
            let dir = dir.trim();
            if !dir.is_empty() {
                self.run.output_dir = PathBuf::from(dir);
            }
        }
        if let Ok(raw) = std::env::var(ENV_THRESHOLD) {
            match parse_threshold_env(Some(raw.clone())) {
                Some(t) => {
                    for cat in &mut self.categories {
                        cat.threshold = t;
                    }
                }
                None => self
                    .notices
                    .push(format!("{ENV_THRESHOLD}={raw:?} is not a number, ignored")),
            }
        }
    }
}

// parse optional float env and clamp to <0.0..=1.0>
fn parse_threshold_env(raw: Option<String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
}

/// Load configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading job configuration from {}", path.display()))?;
    AppConfig::from_toml_str(&content).with_context(|| format!("in {}", path.display()))
}

/// Load configuration using env var + fallbacks, then apply env overrides.
pub fn load_default() -> Result<AppConfig> {
    let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if !pb.exists() {
            return Err(anyhow!(
                "{} points to non-existent path {}",
                ENV_CONFIG_PATH,
                pb.display()
            ));
        }
        load_from(&pb)?
    } else {
        let local = PathBuf::from(DEFAULT_CONFIG_PATH);
        if local.exists() {
            load_from(&local)?
        } else {
            AppConfig::embedded()?
        }
    };
    cfg.apply_env_overrides();
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    fn minimal(extra: &str) -> String {
        format!(
            r#"
[primary]
url = "http://primary.test/search"
ad_base_url = "http://primary.test/ads"

[fallback]
url = "http://fallback.test/jobs"
host = "fallback.test"

[[locations]]
name = "Göteborg"
municipality = "1480"

[scoring]

[[categories]]
name = "IT"
search_terms = ["systemutvecklare", "Systemutvecklare", "java"]

{extra}
"#
        )
    }

    #[test]
    fn embedded_config_parses_and_has_three_categories() {
        let cfg = AppConfig::embedded().unwrap();
        assert_eq!(cfg.categories.len(), 3);
        assert_eq!(cfg.locations.len(), 2);
        for c in Category::ALL {
            let cc = cfg
                .categories
                .iter()
                .find(|cc| cc.name.parse::<Category>().ok() == Some(c))
                .unwrap();
            assert!((cc.threshold - 0.6).abs() < 1e-9);
        }
        assert_eq!(cfg.scoring.strategy, Strategy::Additive);
        assert!(cfg.consultant.description_scan_chars >= MIN_DESCRIPTION_SCAN);
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let cfg = AppConfig::from_toml_str(&minimal("")).unwrap();
        assert_eq!(cfg.run.request_delay_ms, 1000);
        assert_eq!(cfg.run.fallback_cooldown_days, 7);
        assert_eq!(cfg.fallback.api_key_env, "RAPIDAPI_KEY");
        assert!((cfg.scoring.title_bonus - 0.5).abs() < 1e-9);
        assert_eq!(cfg.scoring.weights, SignalWeights::default());
    }

    #[test]
    fn search_terms_are_distinct_case_insensitively() {
        let cfg = AppConfig::from_toml_str(&minimal("")).unwrap();
        assert_eq!(cfg.search_terms(), vec!["systemutvecklare", "java"]);
    }

    #[test]
    fn rejects_unknown_and_duplicate_categories() {
        let unknown = minimal("[[categories]]\nname = \"DevOps\"\n");
        assert!(AppConfig::from_toml_str(&unknown).is_err());
        let dup = minimal("[[categories]]\nname = \"it\"\n");
        let err = AppConfig::from_toml_str(&dup).unwrap_err();
        assert!(format!("{err:#}").contains("twice"));
    }

    #[test]
    fn rejects_short_consultant_scan_window() {
        let s = minimal("[consultant]\ndescription_scan_chars = 200\n");
        assert!(AppConfig::from_toml_str(&s).is_err());
    }

    #[test]
    fn thresholds_are_clamped() {
        let s = minimal("").replace(
            "name = \"IT\"",
            "name = \"IT\"\nthreshold = 3.5",
        );
        let cfg = AppConfig::from_toml_str(&s).unwrap();
        assert_eq!(cfg.categories[0].threshold, 1.0);
        assert_eq!(cfg.notices.len(), 1);
        assert!(cfg.notices[0].contains("clamped"), "{:?}", cfg.notices);
    }

    #[test]
    fn non_finite_threshold_is_reported_not_logged() {
        let s = minimal("").replace("name = \"IT\"", "name = \"IT\"\nthreshold = nan");
        let cfg = AppConfig::from_toml_str(&s).unwrap();
        assert_eq!(cfg.categories[0].threshold, 0.6);
        assert_eq!(cfg.notices.len(), 1);
        assert!(cfg.notices[0].contains("non-finite"), "{:?}", cfg.notices);
    }

    #[test]
    fn embedded_config_loads_without_notices() {
        assert!(AppConfig::embedded().unwrap().notices.is_empty());
    }

    #[test]
    fn threshold_env_parse_clamps() {
        assert_eq!(parse_threshold_env(Some(" 0.7 ".into())), Some(0.7));
        assert_eq!(parse_threshold_env(Some("-2".into())), Some(0.0));
        assert_eq!(parse_threshold_env(Some("NaN".into())), None);
        assert_eq!(parse_threshold_env(Some("abc".into())), None);
        assert_eq!(parse_threshold_env(None), None);
    }

    #[test]
    fn run_paths_resolve_against_output_dir() {
        let run = RunConfig {
            output_dir: PathBuf::from("/srv/site"),
            metrics_file: Some("metrics.prom".into()),
            ..Default::default()
        };
        assert_eq!(run.stamp_path(), PathBuf::from("/srv/site/last_rapidapi.txt"));
        assert_eq!(run.log_path(), PathBuf::from("/srv/site/job_scraper.log"));
        assert_eq!(run.metrics_path(), Some(PathBuf::from("/srv/site/metrics.prom")));
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        // isolate CWD so the repo's config/ is not picked up
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_CONFIG_PATH);
        env::remove_var(ENV_OUTPUT_DIR);
        env::remove_var(ENV_THRESHOLD);

        // nothing on disk → embedded copy
        let cfg = load_default().unwrap();
        assert_eq!(cfg.categories.len(), 3);

        // env path wins, overrides apply on top
        let p = tmp.path().join("custom.toml");
        fs::write(&p, minimal("")).unwrap();
        env::set_var(ENV_CONFIG_PATH, p.display().to_string());
        env::set_var(ENV_OUTPUT_DIR, "site");
        env::set_var(ENV_THRESHOLD, "0.9");
        let cfg = load_default().unwrap();
        assert_eq!(cfg.categories.len(), 1);
        assert_eq!(cfg.run.output_dir, PathBuf::from("site"));
        assert!((cfg.categories[0].threshold - 0.9).abs() < 1e-9);
        assert!(cfg.notices.is_empty());

        // unparsable threshold is left alone and reported
        env::set_var(ENV_THRESHOLD, "abc");
        let cfg = load_default().unwrap();
        assert!((cfg.categories[0].threshold - 0.6).abs() < 1e-9);
        assert_eq!(cfg.notices.len(), 1);
        assert!(cfg.notices[0].contains(ENV_THRESHOLD));

        // missing env path is an error
        env::set_var(ENV_CONFIG_PATH, tmp.path().join("nope.toml").display().to_string());
        assert!(load_default().is_err());

        env::remove_var(ENV_CONFIG_PATH);
        env::remove_var(ENV_OUTPUT_DIR);
        env::remove_var(ENV_THRESHOLD);
        env::set_current_dir(&old).unwrap();
    }
}
