// src/classify.rs
//! Boolean predicates over normalized text: consultant/staffing postings and
//! meaningful (public-sector, non-profit, research) employers.

use crate::model::NormalizedJob;
use crate::rules::{ConsultantRules, MeaningfulRules, RuleBook};

/// True for consultant or staffing postings. Each check only ever adds
/// reasons to say yes, so more consultant wording never flips the answer.
pub fn is_consultant(job: &NormalizedJob, rules: &ConsultantRules) -> bool {
    let head: String = job.description.chars().take(rules.scan_chars).collect();
    let haystack = format!("{} {} {}", job.title, job.employer, head).to_lowercase();
    if rules.keywords.iter().any(|k| haystack.contains(k.as_str())) {
        return true;
    }
    if rules.firms.iter().any(|f| f.is_match(&job.employer)) {
        return true;
    }
    rules.phrases.iter().any(|p| p.is_match(&job.description))
}

/// True when the employer is a known public-sector/non-profit organization or
/// the employer name or description matches a curated pattern.
pub fn is_meaningful(employer: &str, description: &str, rules: &MeaningfulRules) -> bool {
    let emp = employer.to_lowercase();
    if !emp.is_empty() && rules.employers.iter().any(|e| emp.contains(e.as_str())) {
        return true;
    }
    rules
        .patterns
        .iter()
        .any(|p| p.is_match(employer) || p.is_match(description))
}

/// Set both flags on `job`.
pub fn classify(job: &mut NormalizedJob, book: &RuleBook) {
    job.is_consultant = is_consultant(job, &book.consultant);
    job.is_meaningful = is_meaningful(&job.employer, &job.description, &book.meaningful);
}
