//! Content model structs for records, metadata, and tags.

use chrono::NaiveDate;
use guidepost_types::{SlugPath, Subtree};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A frontmatter tag: original casing for display, lower-cased key for matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub display: String,
    pub key: String,
}

impl Tag {
    pub fn new(display: impl Into<String>) -> Self {
        let display = display.into().trim().to_string();
        let key = normalize_tag(&display);
        Self { display, key }
    }

    pub fn matches(&self, tag: &str) -> bool {
        self.key == normalize_tag(tag)
    }
}

/// Normalized matching key for a tag string.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Set of tags in first-seen order, unique by normalized key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(Vec<Tag>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag; returns false if a tag with the same key is already present
    /// or the tag is blank.
    pub fn insert(&mut self, tag: Tag) -> bool {
        if tag.key.is_empty() || self.contains(&tag.key) {
            return false;
        }
        self.0.push(tag);
        true
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t.matches(tag))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Display strings in stored order
    pub fn display_names(&self) -> Vec<&str> {
        self.0.iter().map(|t| t.display.as_str()).collect()
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(Tag::new(tag));
        }
        set
    }
}

/// Typed frontmatter of a content file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,

    /// Defaults to empty when the frontmatter has no summary
    pub summary: String,

    pub tags: TagSet,

    pub date: NaiveDate,

    pub updated: Option<NaiveDate>,

    /// Zero to two author handles, primary first
    pub author_handles: Vec<String>,

    pub canonical_url: Option<String>,
}

impl Metadata {
    /// Last-modified date: `updated` when present, otherwise `date`.
    pub fn modified(&self) -> NaiveDate {
        self.updated.unwrap_or(self.date)
    }

    /// Canonical URL, or `fallback` when the frontmatter does not set one.
    pub fn canonical_or(&self, fallback: &str) -> String {
        self.canonical_url
            .clone()
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// One markdown/MDX source file after a successful parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Path components relative to the subtree root, extension stripped
    pub slug: SlugPath,

    /// Source file relative to the subtree root
    pub source_path: PathBuf,

    pub metadata: Metadata,

    /// Markdown body without frontmatter
    pub raw_body: String,
}

impl ContentRecord {
    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.metadata.tags.contains(tag)
    }
}

/// A file that could not become a record. Record-local: the file is left out
/// of its index and the build carries on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseFailure {
    pub subtree: Subtree,

    /// Source file relative to the subtree root
    pub path: PathBuf,

    pub reason: String,
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}: {}",
            self.subtree,
            self.path.display(),
            self.reason
        )
    }
}
