// src/relevance.rs
//! Relevance scoring of one normalized job against one category's rule set.
//!
//! Two strategies share the same gates:
//! - exclusion patterns over title+description zero the score, unless a
//!   protected brand term sits in the title (category-aware carve-out);
//! - a title pattern (or protected brand in the title) is mandatory.
//!
//! `additive` then sums fixed bonuses, `weighted` blends three densities.

use tracing::debug;

use crate::config::{ScoringConfig, Strategy};
use crate::model::NormalizedJob;
use crate::rules::{CategoryRules, Term};

/// Result of relevance evaluation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Relevance {
    pub score: f64,
    pub matched: Vec<String>,
    pub reasons: Vec<String>,
}

pub(crate) fn truncate_vec<T: ToString>(v: &[T], max: usize) -> Vec<String> {
    v.iter().take(max).map(|x| x.to_string()).collect()
}

/// Clamp to [0,1] and round to 3 decimals. Non-finite input becomes 0.
pub fn finish_score(raw: f64) -> f64 {
    if !raw.is_finite() {
        return 0.0;
    }
    (raw.clamp(0.0, 1.0) * 1000.0).round() / 1000.0
}

/// Score `job` for the category described by `rules`.
pub fn score(job: &NormalizedJob, rules: &CategoryRules, scoring: &ScoringConfig) -> Relevance {
    let title = job.title.as_str();
    let text = format!("{} {}", job.title, job.description);
    let mut rel = Relevance::default();

    let protected = rules.protected_hit(title).map(str::to_string);

    if let Some(pat) = rules.exclusion_hit(&text) {
        match &protected {
            Some(brand) => rel.reasons.push(format!("exclusion_overridden:{}", brand)),
            None => {
                rel.reasons.push(format!("excluded:{}", pat));
                log_outcome(job, rules, &rel);
                return rel;
            }
        }
    }

    let title_hit = rules.title_matches(title) || protected.is_some();
    if !title_hit {
        rel.reasons.push("no_title_match".into());
        log_outcome(job, rules, &rel);
        return rel;
    }
    rel.matched.push("title".into());

    let raw = match scoring.strategy {
        Strategy::Additive => additive(job, &text, rules, scoring, &mut rel),
        Strategy::Weighted => weighted(job, rules, scoring, &mut rel),
    };
    rel.score = finish_score(raw);
    log_outcome(job, rules, &rel);
    rel
}

fn additive(
    job: &NormalizedJob,
    text: &str,
    rules: &CategoryRules,
    scoring: &ScoringConfig,
    rel: &mut Relevance,
) -> f64 {
    let mut s = scoring.title_bonus;

    let hits: Vec<&Term> = rules.secondary.iter().filter(|t| t.is_match(text)).collect();
    if !hits.is_empty() {
        rel.reasons.push(format!("secondary:{}", hits.len()));
        rel.matched
            .extend(hits.iter().map(|t| format!("secondary:{}", t.as_str())));
    }
    s += (hits.len() as f64 * scoring.secondary_step).min(scoring.secondary_cap);

    if job.is_meaningful {
        rel.reasons.push("meaningful".into());
        s += scoring.meaningful_bonus;
    }

    if rules.brand_bonus > 0.0 {
        if let Some(brand) = rules.protected.iter().find(|t| t.is_match(text)) {
            rel.reasons.push(format!("brand:{}", brand.as_str()));
            s += rules.brand_bonus;
        }
    }
    s
}

fn weighted(
    job: &NormalizedJob,
    rules: &CategoryRules,
    scoring: &ScoringConfig,
    rel: &mut Relevance,
) -> f64 {
    let w = scoring.weights;
    let primary = density(&rules.primary, job, 3.0, 1.0, "primary", rel);
    let secondary = density(&rules.secondary, job, 2.0, 0.5, "secondary", rel);
    rel.reasons.push(format!("primary_density:{:.3}", primary));
    rel.reasons.push(format!("secondary_density:{:.3}", secondary));
    w.title + w.primary * primary + w.secondary * secondary
}

/// Keyword density in [0,1]: a title hit is worth `in_title`, otherwise a
/// description hit is worth `in_desc`; normalized by half the list length.
fn density(
    terms: &[Term],
    job: &NormalizedJob,
    in_title: f64,
    in_desc: f64,
    label: &str,
    rel: &mut Relevance,
) -> f64 {
    if terms.is_empty() {
        return 0.0;
    }
    let mut points = 0.0;
    for t in terms {
        if t.is_match(&job.title) {
            points += in_title;
            rel.matched.push(format!("{}:{}", label, t.as_str()));
        } else if t.is_match(&job.description) {
            points += in_desc;
            rel.matched.push(format!("{}:{}", label, t.as_str()));
        }
    }
    (points / (terms.len() as f64 * 0.5)).min(1.0)
}

fn log_outcome(job: &NormalizedJob, rules: &CategoryRules, rel: &Relevance) {
    debug!(
        target: "relevance",
        id = %job.id,
        category = %rules.category,
        score = rel.score,
        threshold = rules.threshold,
        matched = ?truncate_vec(&rel.matched, 5),
        reasons = ?truncate_vec(&rel.reasons, 5)
    );
}
