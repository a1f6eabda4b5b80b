//! Frontmatter parsing from markdown/MDX files.

use crate::models::{Metadata, Tag, TagSet};
use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Missing frontmatter block (expected a leading '---' fence)")]
    MissingFrontmatter,

    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid date in `{field}`: {value:?}")]
    InvalidDate { field: &'static str, value: String },

    #[error("Invalid tag {0:?} (tags must be scalars)")]
    InvalidTag(String),
}

static FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();

fn frontmatter_regex() -> &'static Regex {
    FRONTMATTER_REGEX.get_or_init(|| {
        Regex::new(r"(?s)\A\x{FEFF}?---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n(.*))?\z")
            .expect("frontmatter pattern compiles")
    })
}

/// Frontmatter exactly as written; every field optional so that missing
/// required fields are reported by name.
#[derive(Debug, Default, Deserialize)]
struct RawFrontmatter {
    #[serde(default)]
    title: Option<String>,

    #[serde(default)]
    summary: Option<String>,

    #[serde(default)]
    tags: Option<serde_yaml::Value>,

    #[serde(default)]
    date: Option<serde_yaml::Value>,

    #[serde(default)]
    updated: Option<serde_yaml::Value>,

    #[serde(default, rename = "authorTwitter", alias = "author_twitter")]
    author_twitter: Option<String>,

    #[serde(default, rename = "authorTwitter2", alias = "author_twitter2")]
    author_twitter2: Option<String>,

    #[serde(default, alias = "canonicalUrl", alias = "canonical_url")]
    canonical: Option<String>,
}

/// Split raw file text into the YAML block and the body.
///
/// Returns `None` when the text does not open with a `---` fence.
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let captures = frontmatter_regex().captures(content)?;
    let yaml = captures.get(1).map_or("", |m| m.as_str());
    let body = captures.get(2).map_or("", |m| m.as_str());
    Some((yaml, body))
}

/// Parse frontmatter from raw file text
///
/// Returns a tuple of (metadata, body). `title` and `date` are required.
///
/// # Example
///
/// ```
/// use guidepost_core::frontmatter::parse_document;
///
/// let content = "---\ntitle: Deploy an Edition\ndate: 2022-05-01\ntags: [edition]\n---\n# Hello\n";
///
/// let (metadata, body) = parse_document(content).unwrap();
/// assert_eq!(metadata.title, "Deploy an Edition");
/// assert!(metadata.tags.contains("edition"));
/// assert_eq!(body, "# Hello\n");
/// ```
pub fn parse_document(content: &str) -> Result<(Metadata, String), FrontmatterError> {
    let (yaml, body) = split_frontmatter(content).ok_or(FrontmatterError::MissingFrontmatter)?;

    let raw: RawFrontmatter = if yaml.trim().is_empty() {
        RawFrontmatter::default()
    } else {
        serde_yaml::from_str(yaml)?
    };

    Ok((into_metadata(raw)?, body.to_string()))
}

fn into_metadata(raw: RawFrontmatter) -> Result<Metadata, FrontmatterError> {
    let title = non_blank(raw.title).ok_or(FrontmatterError::MissingField("title"))?;

    let date = match raw.date {
        Some(value) if !value.is_null() => parse_date("date", &value)?,
        _ => return Err(FrontmatterError::MissingField("date")),
    };

    let updated = match raw.updated {
        Some(value) if !value.is_null() => Some(parse_date("updated", &value)?),
        _ => None,
    };

    let tags = parse_tags(raw.tags)?;

    // A lone second handle is promoted to primary.
    let author_handles = [raw.author_twitter, raw.author_twitter2]
        .into_iter()
        .filter_map(non_blank)
        .collect();

    Ok(Metadata {
        title,
        summary: raw.summary.map(|s| s.trim().to_string()).unwrap_or_default(),
        tags,
        date,
        updated,
        author_handles,
        canonical_url: non_blank(raw.canonical),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `tags` may be one scalar or a list of scalars; numbers and booleans are
/// kept as their YAML text.
fn parse_tags(value: Option<serde_yaml::Value>) -> Result<TagSet, FrontmatterError> {
    let items = match value {
        None | Some(serde_yaml::Value::Null) => Vec::new(),
        Some(serde_yaml::Value::Sequence(list)) => list,
        Some(scalar) => vec![scalar],
    };

    let mut tags = TagSet::new();
    for item in items {
        let text = match item {
            serde_yaml::Value::String(s) => s,
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            serde_yaml::Value::Null => continue,
            other => return Err(FrontmatterError::InvalidTag(format!("{other:?}"))),
        };
        tags.insert(Tag::new(text));
    }
    Ok(tags)
}

fn parse_date(
    field: &'static str,
    value: &serde_yaml::Value,
) -> Result<NaiveDate, FrontmatterError> {
    let text = match value {
        serde_yaml::Value::String(s) => s.trim().to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        other => {
            return Err(FrontmatterError::InvalidDate {
                field,
                value: format!("{other:?}"),
            })
        }
    };

    if let Ok(date) = NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(&text) {
        return Ok(timestamp.date_naive());
    }

    Err(FrontmatterError::InvalidDate { field, value: text })
}
