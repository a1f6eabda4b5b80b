//! Shared types for guidepost
//!
//! This crate provides the identifiers passed between the content pipeline
//! and the page assembler: subtree names, slug paths, route queries and
//! table-of-contents headings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of an independently indexed partition of the content tree
/// (e.g. `guides`, `learn-web3`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Subtree(pub String);

impl Subtree {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subtree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Subtree {
    fn from(name: &str) -> Self {
        Subtree(name.to_string())
    }
}

/// Ordered path components identifying a record within its subtree,
/// with the file extension already stripped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlugPath(Vec<String>);

impl SlugPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Copy of this path with the final segment replaced.
    pub fn with_last(&self, last: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        match segments.last_mut() {
            Some(slot) => *slot = last.into(),
            None => segments.push(last.into()),
        }
        Self(segments)
    }

    /// Slash-joined form, e.g. `nested/intro`.
    pub fn join(&self) -> String {
        self.0.join("/")
    }
}

impl fmt::Display for SlugPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join())
    }
}

/// A requested route: the primary slug path plus an optional tag hint that
/// was carried in a compound final segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlugQuery {
    pub primary: SlugPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl SlugQuery {
    pub fn plain(primary: SlugPath) -> Self {
        Self {
            primary,
            hint: None,
        }
    }

    pub fn with_hint(primary: SlugPath, hint: impl Into<String>) -> Self {
        Self {
            primary,
            hint: Some(hint.into()),
        }
    }

    /// Raw route segments, re-joining the hint onto the final segment with
    /// `delimiter`.
    pub fn route_segments(&self, delimiter: &str) -> Vec<String> {
        let mut segments = self.primary.segments().to_vec();
        if let (Some(hint), Some(last)) = (&self.hint, segments.last_mut()) {
            last.push_str(delimiter);
            last.push_str(hint);
        }
        segments
    }

    /// Slash-joined route, e.g. `what-is-an-nft,nft`.
    pub fn route(&self, delimiter: &str) -> String {
        self.route_segments(delimiter).join("/")
    }
}

/// One heading in a document's table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocHeading {
    /// Visible heading text
    pub text: String,
    /// Heading level, 1..=6
    pub depth: u8,
    /// Fragment identifier, unique within the document
    pub anchor: String,
}
