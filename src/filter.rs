// src/filter.rs
//! Category selection, id deduplication and per-category partitioning.

use std::collections::{BTreeMap, HashSet};

use crate::model::{Category, NormalizedJob};

/// Score of one job for one category, with that category's threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryScore {
    pub category: Category,
    pub score: f64,
    pub threshold: f64,
}

/// Highest-scoring category that meets its own threshold. Equal scores go to
/// the category declared first (IT, AI, RPA).
pub fn best_category(scores: &[CategoryScore]) -> Option<CategoryScore> {
    let mut ordered = scores.to_vec();
    ordered.sort_by_key(|s| s.category);

    let mut best: Option<CategoryScore> = None;
    for s in ordered {
        if s.score < s.threshold {
            continue;
        }
        match best {
            Some(b) if s.score <= b.score => {}
            _ => best = Some(s),
        }
    }
    best
}

/// Why a scored job did not make it into the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Consultant,
    BelowThreshold,
}

/// Decide one job: consultants are dropped regardless of score, otherwise the
/// best qualifying category is stamped onto the job.
pub fn accept(
    mut job: NormalizedJob,
    scores: &[CategoryScore],
) -> Result<NormalizedJob, Rejection> {
    if job.is_consultant {
        return Err(Rejection::Consultant);
    }
    match best_category(scores) {
        Some(best) => {
            job.category = Some(best.category);
            job.relevance_score = best.score;
            Ok(job)
        }
        None => Err(Rejection::BelowThreshold),
    }
}

/// Stable dedup on `id`; the first occurrence wins. Returns the survivors and
/// how many were dropped.
pub fn dedup_first_wins(jobs: Vec<NormalizedJob>) -> (Vec<NormalizedJob>, usize) {
    let mut seen = HashSet::new();
    let before = jobs.len();
    let kept: Vec<NormalizedJob> = jobs
        .into_iter()
        .filter(|j| seen.insert(j.id.clone()))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Accepted jobs split per category.
#[derive(Debug, Clone, Default)]
pub struct Partitioned {
    pub by_category: BTreeMap<Category, Vec<NormalizedJob>>,
}

impl Partitioned {
    pub fn jobs(&self, c: Category) -> &[NormalizedJob] {
        self.by_category.get(&c).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Combined list: IT, then AI, then RPA, each already score-sorted.
    pub fn all(&self) -> Vec<NormalizedJob> {
        Category::ALL
            .iter()
            .flat_map(|c| self.jobs(*c).iter().cloned())
            .collect()
    }

    pub fn total(&self) -> usize {
        self.by_category.values().map(Vec::len).sum()
    }
}

/// Group accepted jobs by category and sort each group by score descending.
/// The sort is stable, so equal scores keep arrival order.
pub fn partition(accepted: Vec<NormalizedJob>) -> Partitioned {
    let mut by_category: BTreeMap<Category, Vec<NormalizedJob>> =
        Category::ALL.iter().map(|c| (*c, Vec::new())).collect();
    for job in accepted {
        if let Some(c) = job.category {
            by_category.entry(c).or_default().push(job);
        }
    }
    for list in by_category.values_mut() {
        list.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    }
    Partitioned { by_category }
}
