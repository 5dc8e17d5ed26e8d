// src/normalize.rs
//! Raw posting → `NormalizedJob`. Never fails: absent or oddly typed fields
//! become empty strings.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::ingest::types::{FlatPosting, JobTechHit, RawPosting};
use crate::model::{NormalizedJob, Source};

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
static RE_BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>|</p\s*>|</li\s*>").expect("break regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("ws regex"));
static RE_HSPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\S\n]+").expect("hspace regex"));
static RE_BLANKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("blank regex"));

/// Single-line text: decode entities, strip tags, fold whitespace, trim.
pub fn clean_inline(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);
    let stripped = RE_TAGS.replace_all(&decoded, " ");
    RE_WS.replace_all(&stripped, " ").trim().to_string()
}

/// Multi-line text: like `clean_inline` but keeps line breaks (at most one
/// blank line in a row).
pub fn clean_block(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s).replace("\r\n", "\n");
    let broken = RE_BREAKS.replace_all(&decoded, "\n");
    let stripped = RE_TAGS.replace_all(&broken, "");
    let lines: Vec<String> = stripped
        .split('\n')
        .map(|l| RE_HSPACE.replace_all(l, " ").trim().to_string())
        .collect();
    RE_BLANKS
        .replace_all(&lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}

/// Scalar JSON value as text. Strings are trimmed, numbers printed, anything
/// else is empty.
pub fn text_of(v: &Value) -> String {
    match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Plain value, or the first non-empty of `keys` when `v` is an object.
pub fn nested_text(v: &Value, keys: &[&str]) -> String {
    match v {
        Value::Object(map) => keys
            .iter()
            .filter_map(|k| map.get(*k))
            .map(text_of)
            .find(|s| !s.is_empty())
            .unwrap_or_default(),
        other => text_of(other),
    }
}

/// Dates to `YYYY-MM-DD` when recognizable; anything else kept trimmed.
pub fn normalize_date(raw: &str) -> String {
    let s = raw.trim();
    if s.is_empty() {
        return String::new();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.format("%Y-%m-%d").to_string();
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return dt.format("%Y-%m-%d").to_string();
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.format("%Y-%m-%d").to_string();
    }
    s.to_string()
}

/// Stable id for postings that arrive without one.
pub fn synthetic_id(title: &str, employer: &str, url: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(format!("{}|{}|{}", title, employer, url).as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(16);
    out.push_str("gen-");
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Normalize one raw posting. `search_location` fills in a missing location;
/// `ad_base_url` builds the ad link for JobTech hits without one.
pub fn normalize(
    raw: &RawPosting,
    source: Source,
    search_location: &str,
    ad_base_url: &str,
) -> NormalizedJob {
    let mut job = match raw {
        RawPosting::JobTech(hit) => from_jobtech(hit, ad_base_url),
        RawPosting::Flat(flat) => from_flat(flat),
    };
    job.source = source;
    if job.location.is_empty() {
        job.location = clean_inline(search_location);
    }
    if job.id.is_empty() {
        job.id = synthetic_id(&job.title, &job.employer, &job.url);
    }
    job
}

fn from_jobtech(hit: &JobTechHit, ad_base_url: &str) -> NormalizedJob {
    let id = text_of(&hit.id);
    let mut url = nested_text(&hit.application_details, &["url"]);
    if url.is_empty() {
        url = text_of(&hit.webpage_url);
    }
    if url.is_empty() && !id.is_empty() {
        url = format!("{}/{}", ad_base_url.trim_end_matches('/'), id);
    }
    NormalizedJob {
        id,
        title: clean_inline(&text_of(&hit.headline)),
        employer: clean_inline(&nested_text(&hit.employer, &["name"])),
        location: clean_inline(&nested_text(&hit.workplace_address, &["municipality", "city"])),
        description: clean_block(&nested_text(&hit.description, &["text", "text_formatted"])),
        url,
        published: normalize_date(&text_of(&hit.publication_date)),
        deadline: normalize_date(&text_of(&hit.application_deadline)),
        ..Default::default()
    }
}

fn from_flat(p: &FlatPosting) -> NormalizedJob {
    // Entity decoding is not idempotent (`&amp;amp;`), so cleaned text is
    // never cleaned twice.
    let inline: fn(&str) -> String = if p.canonical { str::to_string } else { clean_inline };
    let block: fn(&str) -> String = if p.canonical { str::to_string } else { clean_block };
    NormalizedJob {
        id: text_of(&p.id),
        title: inline(&text_of(&p.title)),
        employer: inline(&nested_text(&p.employer, &["name"])),
        location: inline(&nested_text(&p.location, &["municipality", "name", "city"])),
        description: block(&nested_text(&p.description, &["text"])),
        url: text_of(&p.url),
        published: normalize_date(&text_of(&p.published)),
        deadline: normalize_date(&text_of(&p.deadline)),
        ..Default::default()
    }
}
