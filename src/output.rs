// src/output.rs
//! JSON artifacts for the static site plus the `last_updated.txt` stamp.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::filter::Partitioned;
use crate::model::{Category, NormalizedJob};

pub const ALL_JOBS_FILE: &str = "all_jobs.json";
pub const LAST_UPDATED_FILE: &str = "last_updated.txt";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Cut `s` to `max` characters followed by `...`. Shorter text is unchanged.
pub fn truncate_description(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push_str("...");
    out
}

fn for_display(jobs: &[NormalizedJob], max_chars: usize) -> Vec<NormalizedJob> {
    jobs.iter()
        .cloned()
        .map(|mut j| {
            j.description = truncate_description(&j.description, max_chars);
            j
        })
        .collect()
}

/// Pretty JSON with non-ASCII kept literal.
pub fn save_jobs(path: &Path, jobs: &[NormalizedJob]) -> Result<()> {
    let body = serde_json::to_string_pretty(jobs).context("serializing jobs")?;
    fs::write(path, body).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), count = jobs.len(), "saved jobs");
    Ok(())
}

/// Write every artifact into `dir`, creating it if needed. Returns the paths
/// written, per-category files first.
pub fn write_all(
    dir: &Path,
    partitioned: &Partitioned,
    description_max_chars: usize,
    now: NaiveDateTime,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("creating output dir {}", dir.display()))?;
    let mut written = Vec::with_capacity(Category::ALL.len() + 2);

    for c in Category::ALL {
        let p = dir.join(c.output_file());
        save_jobs(&p, &for_display(partitioned.jobs(c), description_max_chars))?;
        written.push(p);
    }

    let all = dir.join(ALL_JOBS_FILE);
    save_jobs(&all, &for_display(&partitioned.all(), description_max_chars))?;
    written.push(all);

    let stamp = dir.join(LAST_UPDATED_FILE);
    fs::write(&stamp, now.format(TIMESTAMP_FORMAT).to_string())
        .with_context(|| format!("writing {}", stamp.display()))?;
    written.push(stamp);

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::partition;

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_description("kort", 500), "kort");
        let s = "å".repeat(600);
        let t = truncate_description(&s, 500);
        assert_eq!(t.chars().count(), 503);
        assert!(t.ends_with("..."));
        assert_eq!(truncate_description(&"x".repeat(500), 500).len(), 500);
    }

    #[test]
    fn writes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("site");
        let jobs = vec![
            NormalizedJob {
                id: "1".into(),
                employer: "Försvarsmakten".into(),
                description: "ö".repeat(700),
                category: Some(Category::IT),
                relevance_score: 0.6,
                ..Default::default()
            },
            NormalizedJob {
                id: "2".into(),
                category: Some(Category::RPA),
                relevance_score: 0.8,
                ..Default::default()
            },
        ];
        let now = NaiveDateTime::parse_from_str("2024-05-01 06:00:00", TIMESTAMP_FORMAT).unwrap();
        let written = write_all(&out, &partition(jobs), 500, now).unwrap();
        assert_eq!(written.len(), 5);

        let it = fs::read_to_string(out.join("it_jobs.json")).unwrap();
        assert!(it.contains("Försvarsmakten"));
        assert!(it.starts_with("[\n  {"));
        let parsed: Vec<NormalizedJob> = serde_json::from_str(&it).unwrap();
        assert_eq!(parsed[0].description.chars().count(), 503);

        let ai: Vec<NormalizedJob> =
            serde_json::from_str(&fs::read_to_string(out.join("ai_jobs.json")).unwrap()).unwrap();
        assert!(ai.is_empty());

        let all: Vec<NormalizedJob> =
            serde_json::from_str(&fs::read_to_string(out.join(ALL_JOBS_FILE)).unwrap()).unwrap();
        let ids: Vec<_> = all.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);

        assert_eq!(
            fs::read_to_string(out.join(LAST_UPDATED_FILE)).unwrap(),
            "2024-05-01 06:00:00"
        );
    }
}
