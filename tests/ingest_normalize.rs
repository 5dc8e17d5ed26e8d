// tests/ingest_normalize.rs
use job_radar::normalize::{clean_block, clean_inline, normalize};
use job_radar::{RawPosting, Source};
use serde_json::json;

#[test]
fn empty_is_ok() {
    assert_eq!(clean_inline(""), "");
    assert_eq!(clean_block(""), "");
}

#[test]
fn strips_html_and_unescapes() {
    let s = "<p>Systemutvecklare&nbsp;<b>Java</b> &amp; SQL</p>";
    assert_eq!(clean_inline(s), "Systemutvecklare Java & SQL");
}

#[test]
fn folds_whitespace_and_nbsp() {
    let s = "A\u{00A0}\n\tB   C";
    assert_eq!(clean_inline(s), "A B C");
}

#[test]
fn long_descriptions_are_kept_whole() {
    let raw = RawPosting::jobtech(json!({
        "id": "9",
        "headline": "Utvecklare",
        "description": {"text": "x".repeat(5_000)}
    }))
    .unwrap();
    let j = normalize(&raw, Source::Primary, "Göteborg", "https://ads.test");
    assert_eq!(j.description.len(), 5_000);
}

#[test]
fn garbage_fields_normalize_to_empty_strings() {
    let raw = RawPosting::jobtech(json!({
        "id": null,
        "headline": ["not", "a", "string"],
        "employer": 17,
        "workplace_address": {"municipality": null},
        "description": {"html": "<p>no text key</p>"},
        "application_details": "n/a",
        "publication_date": {"nested": true}
    }))
    .unwrap();
    let j = normalize(&raw, Source::Primary, "Kungsbacka", "https://ads.test");
    assert_eq!(j.title, "");
    assert_eq!(j.employer, "17");
    assert_eq!(j.location, "Kungsbacka");
    assert_eq!(j.description, "");
    assert_eq!(j.url, "n/a");
    assert_eq!(j.published, "");
    assert!(j.id.starts_with("gen-"));
}
