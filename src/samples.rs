// src/samples.rs
//! Illustrative postings used when a run collects nothing at all, so the site
//! still has something to render. Every job built from these is flagged
//! `synthetic`.

use serde_json::json;

use crate::ingest::types::RawPosting;

pub fn sample_postings() -> Vec<RawPosting> {
    let hits = [
        json!({
            "id": "sample1",
            "headline": "IT-utvecklare",
            "employer": {"name": "Försvarsmakten"},
            "workplace_address": {"municipality": "Göteborg"},
            "publication_date": "2025-04-01T00:00:00Z",
            "application_deadline": "2025-05-01T00:00:00Z",
            "description": {"text": "Vi söker en IT-utvecklare till vårt team i Göteborg."}
        }),
        json!({
            "id": "sample2",
            "headline": "Systemutvecklare",
            "employer": {"name": "Polismyndigheten"},
            "workplace_address": {"municipality": "Göteborg"},
            "publication_date": "2025-04-05T00:00:00Z",
            "application_deadline": "2025-05-15T00:00:00Z",
            "description": {"text": "Polisen söker systemutvecklare för att arbeta med våra interna system."}
        }),
        json!({
            "id": "sample3",
            "headline": "IT-säkerhetsspecialist",
            "employer": {"name": "Göteborgs Stad"},
            "workplace_address": {"municipality": "Göteborg"},
            "publication_date": "2025-04-10T00:00:00Z",
            "application_deadline": "2025-05-10T00:00:00Z",
            "description": {"text": "Göteborgs Stad söker IT-säkerhetsspecialist för att stärka vår IT-säkerhet."}
        }),
    ];
    hits.into_iter()
        .filter_map(|v| RawPosting::jobtech(v).ok())
        .collect()
}
