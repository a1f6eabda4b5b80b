//! In-memory guide indices, one per subtree, plus the portal-wide collection.
//!
//! Indices are built once per build and never mutated afterwards. Every query
//! preserves scanner order unless a [`SortOrder`] asks otherwise.

use crate::models::{normalize_tag, ContentRecord, ParseFailure, Tag};
use crate::resolver::{RouteScheme, SlugResolver};
use guidepost_types::{SlugPath, Subtree};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal build-time integrity violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("Duplicate slug '{slug}' in subtree '{subtree}': {first:?} and {second:?}")]
    DuplicateSlug {
        subtree: Subtree,
        slug: SlugPath,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Duplicate route '{route}' in subtree '{subtree}': {first:?} and {second:?}")]
    DuplicateRoute {
        subtree: Subtree,
        route: SlugPath,
        first: PathBuf,
        second: PathBuf,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("Unknown subtree: {0}")]
    UnknownSubtree(Subtree),
}

/// Ordering applied to query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Scanner order (lexicographic by source path)
    #[default]
    Scanner,
    /// Most recent `date` first; ties keep scanner order
    NewestFirst,
    /// Case-insensitive title; ties keep scanner order
    Title,
}

/// Filter/limit parameters for [`GuideIndex::query`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GuideQuery<'q> {
    pub tag: Option<&'q str>,
    pub exclude: Option<&'q SlugPath>,
    pub limit: Option<usize>,
    pub order: SortOrder,
}

impl<'q> GuideQuery<'q> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tagged(mut self, tag: &'q str) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn excluding(mut self, slug: &'q SlugPath) -> Self {
        self.exclude = Some(slug);
        self
    }

    /// Truncate after filtering and sorting
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sorted(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }
}

/// All records of one subtree, in scanner order.
#[derive(Debug, Clone)]
pub struct GuideIndex {
    subtree: Subtree,
    records: Vec<ContentRecord>,
}

impl GuideIndex {
    /// Build an index; a slug reported twice is an integrity error, never
    /// silently deduplicated.
    pub fn build(subtree: Subtree, records: Vec<ContentRecord>) -> Result<Self, IntegrityError> {
        let mut by_slug = HashMap::with_capacity(records.len());

        for (idx, record) in records.iter().enumerate() {
            if let Some(&existing) = by_slug.get(&record.slug) {
                let first: &ContentRecord = &records[existing];
                tracing::warn!("Duplicate slug: {}", record.slug);
                return Err(IntegrityError::DuplicateSlug {
                    subtree,
                    slug: record.slug.clone(),
                    first: first.source_path.clone(),
                    second: record.source_path.clone(),
                });
            }
            by_slug.insert(record.slug.clone(), idx);
        }

        tracing::debug!("Indexed {} records for {}", records.len(), subtree);

        Ok(Self {
            subtree,
            records,
        })
    }

    pub fn subtree(&self) -> &Subtree {
        &self.subtree
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every record in scanner order.
    pub fn all_records(&self) -> &[ContentRecord] {
        &self.records
    }

    /// Records carrying `tag` (case-normalized exact match), in scanner order.
    pub fn by_tag(&self, tag: &str) -> Vec<&ContentRecord> {
        self.query(GuideQuery::new().tagged(tag))
    }

    /// Filter, then sort, then truncate.
    pub fn query(&self, query: GuideQuery<'_>) -> Vec<&ContentRecord> {
        let tag_key = query.tag.map(normalize_tag);

        let mut matches: Vec<&ContentRecord> = self
            .records
            .iter()
            .filter(|r| match &tag_key {
                Some(key) => r.metadata.tags.iter().any(|t| &t.key == key),
                None => true,
            })
            .filter(|r| query.exclude != Some(&r.slug))
            .collect();

        match query.order {
            SortOrder::Scanner => {}
            SortOrder::NewestFirst => matches.sort_by(|a, b| b.metadata.date.cmp(&a.metadata.date)),
            SortOrder::Title => matches.sort_by_key(|r| r.metadata.title.to_lowercase()),
        }

        if let Some(limit) = query.limit {
            matches.truncate(limit);
        }

        matches
    }

    /// Distinct tags with their record counts, in first-seen order.
    pub fn tags(&self) -> Vec<(Tag, usize)> {
        let mut counts: Vec<(Tag, usize)> = Vec::new();
        for tag in self.records.iter().flat_map(|r| r.metadata.tags.iter()) {
            match counts.iter_mut().find(|(t, _)| t.key == tag.key) {
                Some((_, count)) => *count += 1,
                None => counts.push((tag.clone(), 1)),
            }
        }
        counts
    }
}

/// One configured subtree: its index and how its routes are shaped.
#[derive(Debug, Clone)]
pub struct SubtreeEntry {
    pub index: GuideIndex,
    pub scheme: RouteScheme,
}

/// Every subtree index for a build plus the record-local failures met while
/// building them.
#[derive(Debug, Clone, Default)]
pub struct PortalIndex {
    entries: Vec<SubtreeEntry>,
    failures: Vec<ParseFailure>,
}

impl PortalIndex {
    pub fn new(entries: Vec<SubtreeEntry>, failures: Vec<ParseFailure>) -> Self {
        Self { entries, failures }
    }

    pub fn subtrees(&self) -> impl Iterator<Item = &Subtree> {
        self.entries.iter().map(|e| e.index.subtree())
    }

    pub fn entries(&self) -> &[SubtreeEntry] {
        &self.entries
    }

    pub fn failures(&self) -> &[ParseFailure] {
        &self.failures
    }

    pub fn guide_index(&self, subtree: &Subtree) -> Result<&GuideIndex, IndexError> {
        self.entry(subtree).map(|e| &e.index)
    }

    pub fn all_records(&self, subtree: &Subtree) -> Result<&[ContentRecord], IndexError> {
        Ok(self.guide_index(subtree)?.all_records())
    }

    pub fn by_tag(&self, subtree: &Subtree, tag: &str) -> Result<Vec<&ContentRecord>, IndexError> {
        Ok(self.guide_index(subtree)?.by_tag(tag))
    }

    pub fn resolver(&self, subtree: &Subtree) -> Result<SlugResolver<'_>, IndexError> {
        let entry = self.entry(subtree)?;
        Ok(SlugResolver::new(&entry.index, entry.scheme.clone()))
    }

    /// Total number of indexed records across subtrees
    pub fn record_count(&self) -> usize {
        self.entries.iter().map(|e| e.index.len()).sum()
    }

    fn entry(&self, subtree: &Subtree) -> Result<&SubtreeEntry, IndexError> {
        self.entries
            .iter()
            .find(|e| e.index.subtree() == subtree)
            .ok_or_else(|| IndexError::UnknownSubtree(subtree.clone()))
    }
}
