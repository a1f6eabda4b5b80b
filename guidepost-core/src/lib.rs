//! # guidepost-core
//!
//! Core library for guidepost documentation portals.
//!
//! This crate scans markdown/MDX content trees, parses their frontmatter into
//! typed records, indexes each configured subtree, extracts tables of
//! contents, and maps URL routes to records and back.

pub mod builder;
pub mod config;
pub mod frontmatter;
pub mod headings;
pub mod index;
pub mod models;
pub mod resolver;
pub mod scanner;
pub mod slug;

pub use builder::{BuildError, SiteBuilder};
pub use config::{Config, ConfigError, ListingConfig, SubtreeConfig};
pub use frontmatter::{parse_document, FrontmatterError};
pub use headings::{headings, table_of_contents, Headings};
pub use index::{
    GuideIndex, GuideQuery, IndexError, IntegrityError, PortalIndex, SortOrder, SubtreeEntry,
};
pub use models::{ContentRecord, Metadata, ParseFailure, Tag, TagSet};
pub use resolver::{
    ResolveError, Resolved, RouteScheme, SlugResolver, DEFAULT_HINT_DELIMITER,
    DEFAULT_RELATED_LIMIT,
};
pub use scanner::{ContentScanner, ScanError, ScannedFile};
pub use slug::slugify;

pub use guidepost_types::{SlugPath, SlugQuery, Subtree, TocHeading};
