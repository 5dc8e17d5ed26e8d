// src/rules.rs
//! Compiled form of the keyword configuration. Everything is compiled once at
//! startup; a bad pattern is a configuration error, never a per-job failure.

use anyhow::{anyhow, Result};
use regex::{Regex, RegexBuilder};

use crate::config::{AppConfig, ConsultantConfig, MeaningfulConfig, ScoringConfig};
use crate::model::Category;

/// A plain keyword matched case-insensitively on word boundaries.
/// Letters, digits and `_` count as word characters; everything else
/// (space, `-`, `/`, punctuation, string edges) is a boundary.
#[derive(Debug, Clone)]
pub struct Term {
    raw: String,
    re: Regex,
}

impl Term {
    pub fn new(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(anyhow!("empty keyword"));
        }
        let pat = format!(
            r"(?:^|[^\p{{L}}\p{{N}}_]){}(?:[^\p{{L}}\p{{N}}_]|$)",
            regex::escape(raw)
        );
        let re = RegexBuilder::new(&pat)
            .case_insensitive(true)
            .build()
            .map_err(|e| anyhow!("keyword `{}` regex error: {}", raw, e))?;
        Ok(Self {
            raw: raw.to_string(),
            re,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.re.is_match(text)
    }
}

/// A configured regular expression, compiled case-insensitively.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    re: Regex,
}

impl Pattern {
    pub fn new(raw: &str) -> Result<Self> {
        let re = RegexBuilder::new(raw)
            .case_insensitive(true)
            .build()
            .map_err(|e| anyhow!("pattern `{}` regex error: {}", raw, e))?;
        Ok(Self {
            raw: raw.to_string(),
            re,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.re.is_match(text)
    }
}

fn terms(items: &[String], what: &str) -> Result<Vec<Term>> {
    items
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| Term::new(s).map_err(|e| anyhow!("{}: {}", what, e)))
        .collect::<Result<Vec<_>>>()
}

fn patterns(items: &[String], what: &str) -> Result<Vec<Pattern>> {
    items
        .iter()
        .map(|s| Pattern::new(s).map_err(|e| anyhow!("{}: {}", what, e)))
        .collect::<Result<Vec<_>>>()
}

fn lowered(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Rule set for one category.
#[derive(Debug, Clone)]
pub struct CategoryRules {
    pub category: Category,
    pub threshold: f64,
    pub search_terms: Vec<String>,
    pub title_patterns: Vec<Pattern>,
    pub primary: Vec<Term>,
    pub secondary: Vec<Term>,
    /// Shared exclusions followed by the category's own.
    pub exclusions: Vec<Pattern>,
    pub protected: Vec<Term>,
    pub brand_bonus: f64,
}

impl CategoryRules {
    /// First protected brand found in `title`.
    pub fn protected_hit(&self, title: &str) -> Option<&str> {
        self.protected
            .iter()
            .find(|t| t.is_match(title))
            .map(|t| t.as_str())
    }

    /// First exclusion matching `text`.
    pub fn exclusion_hit(&self, text: &str) -> Option<&str> {
        self.exclusions
            .iter()
            .find(|p| p.is_match(text))
            .map(|p| p.as_str())
    }

    pub fn title_matches(&self, title: &str) -> bool {
        self.title_patterns.iter().any(|p| p.is_match(title))
    }
}

#[derive(Debug, Clone)]
pub struct ConsultantRules {
    /// Lowercased substrings.
    pub keywords: Vec<String>,
    pub scan_chars: usize,
    pub firms: Vec<Term>,
    pub phrases: Vec<Pattern>,
}

impl ConsultantRules {
    fn compile(cfg: &ConsultantConfig) -> Result<Self> {
        Ok(Self {
            keywords: lowered(&cfg.keywords),
            scan_chars: cfg.description_scan_chars,
            firms: terms(&cfg.firms, "consultant firm")?,
            phrases: patterns(&cfg.phrases, "consultant phrase")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct MeaningfulRules {
    /// Lowercased substrings of employer names.
    pub employers: Vec<String>,
    pub patterns: Vec<Pattern>,
}

impl MeaningfulRules {
    fn compile(cfg: &MeaningfulConfig) -> Result<Self> {
        Ok(Self {
            employers: lowered(&cfg.employers),
            patterns: patterns(&cfg.patterns, "meaningful pattern")?,
        })
    }
}

/// All compiled rules for a run.
#[derive(Debug, Clone)]
pub struct RuleBook {
    pub scoring: ScoringConfig,
    /// Sorted by category declaration order.
    categories: Vec<CategoryRules>,
    pub consultant: ConsultantRules,
    pub meaningful: MeaningfulRules,
}

impl RuleBook {
    pub fn compile(cfg: &AppConfig) -> Result<Self> {
        let common = patterns(&cfg.scoring.common_exclusions, "common exclusion")?;

        let mut categories = cfg
            .categories
            .iter()
            .map(|cc| {
                let category: Category = cc.name.parse()?;
                let ctx = |kind: &str| format!("category {} {}", category, kind);
                let mut exclusions = common.clone();
                exclusions.extend(patterns(&cc.exclusion_patterns, &ctx("exclusion"))?);
                Ok(CategoryRules {
                    category,
                    threshold: cc.threshold,
                    search_terms: cc.search_terms.clone(),
                    title_patterns: patterns(&cc.title_patterns, &ctx("title pattern"))?,
                    primary: terms(&cc.primary_keywords, &ctx("primary keyword"))?,
                    secondary: terms(&cc.secondary_keywords, &ctx("secondary keyword"))?,
                    exclusions,
                    protected: terms(&cc.protected_title_terms, &ctx("protected term"))?,
                    brand_bonus: cc.brand_bonus,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        categories.sort_by_key(|c| c.category);

        Ok(Self {
            scoring: cfg.scoring.clone(),
            categories,
            consultant: ConsultantRules::compile(&cfg.consultant)?,
            meaningful: MeaningfulRules::compile(&cfg.meaningful)?,
        })
    }

    pub fn categories(&self) -> &[CategoryRules] {
        &self.categories
    }

    pub fn category(&self, c: Category) -> Option<&CategoryRules> {
        self.categories.iter().find(|r| r.category == c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_respects_word_boundaries() {
        let ai = Term::new("ai").unwrap();
        assert!(ai.is_match("Vi söker en AI-utvecklare"));
        assert!(ai.is_match("ai"));
        assert!(!ai.is_match("Email till chefen"));
        assert!(!ai.is_match("domain expert"));

        let sql = Term::new("sql").unwrap();
        assert!(sql.is_match("Java, SQL och Python"));
        assert!(!sql.is_match("postgresql"));
    }

    #[test]
    fn term_escapes_punctuation_and_handles_non_ascii() {
        let cs = Term::new("c#").unwrap();
        assert!(cs.is_match("erfarenhet av C# och .NET"));
        let net = Term::new(".net").unwrap();
        assert!(net.is_match("C# och .NET"));
        let cicd = Term::new("ci/cd").unwrap();
        assert!(cicd.is_match("bygger CI/CD-flöden"));
        let ml = Term::new("maskininlärning").unwrap();
        assert!(ml.is_match("Erfarenhet av MASKININLÄRNING krävs"));
        assert!(!ml.is_match("maskininlärningsexpert"));
    }

    #[test]
    fn empty_term_is_rejected() {
        assert!(Term::new("  ").is_err());
    }

    #[test]
    fn invalid_pattern_names_its_origin() {
        let mut cfg = AppConfig::embedded().unwrap();
        cfg.categories[1].title_patterns.push("(unclosed".into());
        let err = RuleBook::compile(&cfg).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("category AI title pattern"), "{msg}");
        assert!(msg.contains("(unclosed"), "{msg}");
    }

    #[test]
    fn categories_sorted_and_exclusions_layered() {
        let mut cfg = AppConfig::embedded().unwrap();
        cfg.categories.reverse();
        let book = RuleBook::compile(&cfg).unwrap();
        let order: Vec<_> = book.categories().iter().map(|c| c.category).collect();
        assert_eq!(order, Category::ALL.to_vec());

        let it = book.category(Category::IT).unwrap();
        let rpa = book.category(Category::RPA).unwrap();
        assert!(it.exclusions.len() < rpa.exclusions.len());
        assert_eq!(rpa.exclusion_hit("PLC-programmerare"), Some(r"\bplc\b"));
        assert_eq!(it.exclusion_hit("PLC-programmerare"), None);
        assert_eq!(rpa.protected_hit("RPA-utvecklare UiPath"), Some("uipath"));
    }
}
