// src/model.rs
//! Canonical job record and the small enums around it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classification buckets. Declaration order is the tie-break order.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    IT,
    AI,
    RPA,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::IT, Category::AI, Category::RPA];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::IT => "IT",
            Category::AI => "AI",
            Category::RPA => "RPA",
        }
    }

    /// Per-category artifact name.
    pub fn output_file(&self) -> &'static str {
        match self {
            Category::IT => "it_jobs.json",
            Category::AI => "ai_jobs.json",
            Category::RPA => "rpa_jobs.json",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IT" => Ok(Category::IT),
            "AI" => Ok(Category::AI),
            "RPA" => Ok(Category::RPA),
            other => Err(anyhow::anyhow!("unknown category `{other}`")),
        }
    }
}

/// Which upstream produced a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    Primary,
    Fallback,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Primary => "primary",
            Source::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One posting in canonical shape. Plain strings only, so the serialized form
/// normalizes back into itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedJob {
    pub id: String,
    pub title: String,
    pub employer: String,
    pub location: String,
    pub description: String,
    pub url: String,
    pub published: String,
    pub deadline: String,
    pub source: Source,
    pub is_consultant: bool,
    pub is_meaningful: bool,
    pub category: Option<Category>,
    pub relevance_score: f64,
    /// Illustrative record substituted when no source returned anything.
    #[serde(default, skip_serializing_if = "is_false")]
    pub synthetic: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("rpa".parse::<Category>().unwrap(), Category::RPA);
        assert_eq!(" It ".parse::<Category>().unwrap(), Category::IT);
        assert!("devops".parse::<Category>().is_err());
    }

    #[test]
    fn declaration_order_is_it_ai_rpa() {
        let mut v = vec![Category::RPA, Category::IT, Category::AI];
        v.sort();
        assert_eq!(v, Category::ALL.to_vec());
    }

    #[test]
    fn serializes_with_literal_non_ascii_and_hides_synthetic_flag() {
        let job = NormalizedJob {
            id: "1".into(),
            employer: "Försvarsmakten".into(),
            category: Some(Category::IT),
            ..Default::default()
        };
        let s = serde_json::to_string(&job).unwrap();
        assert!(s.contains("Försvarsmakten"));
        assert!(s.contains(r#""category":"IT""#));
        assert!(s.contains(r#""source":"primary""#));
        assert!(!s.contains("synthetic"));
    }
}
