//! Slug resolution: maps route segments to records and enumerates every
//! route of a subtree for static generation.
//!
//! A subtree with a [`RouteScheme::Qualified`] scheme encodes a tag hint in
//! the final segment (`what-is-an-nft,nft`). Only the part before the
//! delimiter locates the file; the hint is handed back to the caller.

use crate::index::{GuideIndex, GuideQuery, IntegrityError};
use crate::models::ContentRecord;
use guidepost_types::{SlugPath, SlugQuery, Subtree};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_HINT_DELIMITER: &str = ",";
pub const DEFAULT_RELATED_LIMIT: usize = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No content for route '{route}' in subtree '{subtree}'")]
    NotFound { subtree: Subtree, route: String },

    #[error("Malformed route '{route}' in subtree '{subtree}': {reason}")]
    MalformedRoute {
        subtree: Subtree,
        route: String,
        reason: String,
    },

    #[error("Route '{route}' in subtree '{subtree}' matches several files: {candidates:?}")]
    Ambiguous {
        subtree: Subtree,
        route: String,
        candidates: Vec<PathBuf>,
    },
}

/// How the routes of a subtree are shaped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RouteScheme {
    /// Route segments are the slug path as-is
    #[default]
    Plain,
    /// Final segment is `<slug><delimiter><tag hint>`
    Qualified { delimiter: String },
}

impl RouteScheme {
    pub fn qualified(delimiter: impl Into<String>) -> Self {
        RouteScheme::Qualified {
            delimiter: delimiter.into(),
        }
    }

    pub fn delimiter(&self) -> Option<&str> {
        match self {
            RouteScheme::Plain => None,
            RouteScheme::Qualified { delimiter } => Some(delimiter.as_str()),
        }
    }

    /// Split a record's slug into the query that addresses it.
    pub fn query_for(&self, slug: &SlugPath) -> SlugQuery {
        let (Some(delimiter), Some(last)) = (self.delimiter(), slug.last()) else {
            return SlugQuery::plain(slug.clone());
        };
        match last.split_once(delimiter) {
            Some((primary, hint)) => SlugQuery::with_hint(slug.with_last(primary), hint),
            None => SlugQuery::plain(slug.clone()),
        }
    }

    /// Render a query back into a slash-joined route string.
    pub fn route(&self, query: &SlugQuery) -> String {
        query.route(self.delimiter().unwrap_or(DEFAULT_HINT_DELIMITER))
    }
}

/// A resolved route: the record plus the hint carried by the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<'a> {
    pub record: &'a ContentRecord,
    pub hint: Option<String>,
}

/// Two-way mapping between routes and records of one subtree.
#[derive(Debug, Clone)]
pub struct SlugResolver<'a> {
    index: &'a GuideIndex,
    scheme: RouteScheme,
    routes: HashMap<SlugPath, Vec<usize>>,
}

impl<'a> SlugResolver<'a> {
    pub fn new(index: &'a GuideIndex, scheme: RouteScheme) -> Self {
        let mut routes: HashMap<SlugPath, Vec<usize>> = HashMap::new();
        for (idx, record) in index.all_records().iter().enumerate() {
            let key = scheme.query_for(&record.slug).primary;
            routes.entry(key).or_default().push(idx);
        }

        Self {
            index,
            scheme,
            routes,
        }
    }

    pub fn subtree(&self) -> &Subtree {
        self.index.subtree()
    }

    pub fn scheme(&self) -> &RouteScheme {
        &self.scheme
    }

    pub fn index(&self) -> &'a GuideIndex {
        self.index
    }

    /// One query per record, in scanner order.
    pub fn enumerate_all_paths(&self) -> Vec<SlugQuery> {
        self.index
            .all_records()
            .iter()
            .map(|record| self.scheme.query_for(&record.slug))
            .collect()
    }

    /// Parse raw route segments (as they appear in a URL) into a query.
    ///
    /// Empty segments from leading/trailing slashes are dropped. Under a
    /// qualified scheme the final segment must hold exactly a slug and a hint.
    pub fn parse_route<S: AsRef<str>>(&self, raw: &[S]) -> Result<SlugQuery, ResolveError> {
        let mut segments: Vec<&str> = raw
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty())
            .collect();
        let route = segments.join("/");

        let Some(last) = segments.pop() else {
            return Err(self.malformed(&route, "empty route".to_string()));
        };

        let Some(delimiter) = self.scheme.delimiter() else {
            segments.push(last);
            return Ok(SlugQuery::plain(SlugPath::new(segments)));
        };

        let parts: Vec<&str> = last.split(delimiter).collect();
        match parts.as_slice() {
            [primary, hint] if !primary.is_empty() && !hint.is_empty() => {
                segments.push(*primary);
                Ok(SlugQuery::with_hint(SlugPath::new(segments), *hint))
            }
            _ => Err(self.malformed(
                &route,
                format!(
                    "expected '<slug>{}<tag>' in final segment, found {} part(s)",
                    delimiter,
                    parts.len()
                ),
            )),
        }
    }

    /// Resolve a query to exactly one record.
    pub fn resolve(&self, query: &SlugQuery) -> Result<Resolved<'a>, ResolveError> {
        let route = self.scheme.route(query);

        if let Some(delimiter) = self.scheme.delimiter() {
            match query.hint.as_deref() {
                None => {
                    return Err(self.malformed(&route, "missing tag hint".to_string()));
                }
                Some(hint) if hint.is_empty() || hint.contains(delimiter) => {
                    return Err(self.malformed(&route, format!("invalid tag hint '{}'", hint)));
                }
                Some(_) => {}
            }
        }

        let records = self.index.all_records();
        match self.routes.get(&query.primary).map(Vec::as_slice) {
            None | Some([]) => Err(ResolveError::NotFound {
                subtree: self.subtree().clone(),
                route,
            }),
            Some([idx]) => Ok(Resolved {
                record: &records[*idx],
                hint: query.hint.clone(),
            }),
            Some(many) => Err(ResolveError::Ambiguous {
                subtree: self.subtree().clone(),
                route,
                candidates: many
                    .iter()
                    .map(|&i| records[i].source_path.clone())
                    .collect(),
            }),
        }
    }

    /// Parse and resolve raw route segments in one step.
    pub fn resolve_segments<S: AsRef<str>>(&self, raw: &[S]) -> Result<Resolved<'a>, ResolveError> {
        let query = self.parse_route(raw)?;
        self.resolve(&query)
    }

    /// Other records tagged with the resolved hint, in scanner order,
    /// excluding the resolved record itself.
    pub fn related(&self, resolved: &Resolved<'a>, limit: usize) -> Vec<&'a ContentRecord> {
        self.related_in(resolved, self.index, limit)
    }

    /// Records of `source` tagged with the resolved hint, in scanner order.
    ///
    /// The resolved record is only excluded when `source` is this resolver's
    /// own subtree; slugs of other subtrees never refer to it.
    pub fn related_in<'s>(
        &self,
        resolved: &Resolved<'a>,
        source: &'s GuideIndex,
        limit: usize,
    ) -> Vec<&'s ContentRecord> {
        let Some(hint) = resolved.hint.as_deref() else {
            return Vec::new();
        };
        let mut query = GuideQuery::new().tagged(hint).limit(limit);
        if source.subtree() == self.subtree() {
            query = query.excluding(&resolved.record.slug);
        }
        source.query(query)
    }

    /// Fail if two records collapse onto the same route.
    pub fn verify_routes(&self) -> Result<(), IntegrityError> {
        let records = self.index.all_records();
        for record in records {
            let key = self.scheme.query_for(&record.slug).primary;
            if let Some([first, second, ..]) = self.routes.get(&key).map(Vec::as_slice) {
                return Err(IntegrityError::DuplicateRoute {
                    subtree: self.subtree().clone(),
                    route: key,
                    first: records[*first].source_path.clone(),
                    second: records[*second].source_path.clone(),
                });
            }
        }
        Ok(())
    }

    fn malformed(&self, route: &str, reason: String) -> ResolveError {
        ResolveError::MalformedRoute {
            subtree: self.subtree().clone(),
            route: route.to_string(),
            reason,
        }
    }
}
