//! Shared JSON schema helpers for machine-readable command output and build
//! artifacts.

use chrono::NaiveDate;
use guidepost_core::{ContentRecord, RouteScheme};
use serde::Serialize;

pub const SCHEMA_VERSION: &str = "2026-10-guidepost-v1";

/// Standard envelope for machine-consumable responses.
#[derive(Serialize)]
pub struct Envelope<T> {
    pub schema_version: &'static str,
    pub kind: &'static str,
    pub data: T,
}

pub fn envelope<T>(kind: &'static str, data: T) -> Envelope<T> {
    Envelope {
        schema_version: SCHEMA_VERSION,
        kind,
        data,
    }
}

/// One guide as shown in listings and related-guide lists.
#[derive(Debug, Clone, Serialize)]
pub struct GuideSummary {
    pub slug: String,
    pub route: String,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub date: String,
    pub updated: Option<String>,
}

impl GuideSummary {
    /// `base_url` is the normalized base (leading and trailing slash).
    pub fn from_record(
        record: &ContentRecord,
        subtree: &str,
        scheme: &RouteScheme,
        base_url: &str,
    ) -> Self {
        let route = scheme.route(&scheme.query_for(&record.slug));
        Self {
            slug: record.slug.join(),
            url: format!("{}{}/{}", base_url, subtree, route),
            route,
            title: record.metadata.title.clone(),
            summary: record.metadata.summary.clone(),
            tags: record
                .metadata
                .tags
                .display_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            date: format_date(record.metadata.date),
            updated: record.metadata.updated.map(format_date),
        }
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
