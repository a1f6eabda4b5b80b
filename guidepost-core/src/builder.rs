//! Index building - orchestrates scanning, parsing, and indexing per subtree.

use crate::{
    config::{Config, SubtreeConfig},
    frontmatter::parse_document,
    index::{GuideIndex, IntegrityError, PortalIndex, SubtreeEntry},
    models::{ContentRecord, ParseFailure},
    resolver::SlugResolver,
    scanner::{ContentScanner, ScanError, ScannedFile},
    slug::slug_path_from_relative,
};
use guidepost_types::Subtree;
use rayon::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),

    #[error("Integrity check failed: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Builds the portal index for every configured subtree
pub struct SiteBuilder {
    config: Config,
}

impl SiteBuilder {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Scan, parse and index every subtree.
    ///
    /// Parse failures are record-local and collected on the returned index;
    /// scan and integrity failures abort the build.
    pub fn build(&self) -> Result<PortalIndex, BuildError> {
        let content_dir = self.content_root()?;
        let scanner = ContentScanner::new(&content_dir)
            .with_extensions(self.config.extensions.iter().cloned())
            .with_ignore_patterns(&self.config.ignore_patterns);

        let mut entries = Vec::with_capacity(self.config.subtrees.len());
        let mut failures = Vec::new();

        for subtree_config in &self.config.subtrees {
            let (entry, mut subtree_failures) = self.build_subtree(&scanner, subtree_config)?;
            failures.append(&mut subtree_failures);
            entries.push(entry);
        }

        let portal = PortalIndex::new(entries, failures);
        tracing::info!(
            "Built portal index with {} records across {} subtrees ({} parse failures)",
            portal.record_count(),
            portal.entries().len(),
            portal.failures().len()
        );

        Ok(portal)
    }

    fn content_root(&self) -> Result<PathBuf, BuildError> {
        let content_dir = self.config.content_dir();
        match fs::canonicalize(&content_dir) {
            Ok(path) => Ok(path),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(ScanError::RootMissing(content_dir).into())
            }
            Err(source) => Err(BuildError::Io {
                path: content_dir,
                source,
            }),
        }
    }

    fn build_subtree(
        &self,
        scanner: &ContentScanner,
        subtree_config: &SubtreeConfig,
    ) -> Result<(SubtreeEntry, Vec<ParseFailure>), BuildError> {
        let subtree = subtree_config.subtree();
        let files = scanner.scan(Some(&subtree))?;
        tracing::info!("Found {} content files in {}", files.len(), subtree);

        // Parse in parallel; collect keeps scanner order
        let parsed: Vec<Result<ContentRecord, ParseFailure>> = files
            .par_iter()
            .map(|file| parse_record(&subtree, file))
            .collect();

        let mut records = Vec::with_capacity(parsed.len());
        let mut failures = Vec::new();
        for result in parsed {
            match result {
                Ok(record) => records.push(record),
                Err(failure) => {
                    tracing::warn!("Skipping {}", failure);
                    failures.push(failure);
                }
            }
        }

        let index = GuideIndex::build(subtree, records)?;
        let scheme = subtree_config.scheme();
        SlugResolver::new(&index, scheme.clone()).verify_routes()?;

        Ok((SubtreeEntry { index, scheme }, failures))
    }
}

/// Read and parse a single content file into a record
fn parse_record(subtree: &Subtree, file: &ScannedFile) -> Result<ContentRecord, ParseFailure> {
    let failure = |reason: String| ParseFailure {
        subtree: subtree.clone(),
        path: file.relative.clone(),
        reason,
    };

    let content = fs::read_to_string(&file.absolute)
        .map_err(|e| failure(format!("unreadable: {}", e)))?;
    let (metadata, raw_body) = parse_document(&content).map_err(|e| failure(e.to_string()))?;
    let slug = slug_path_from_relative(&file.relative)
        .ok_or_else(|| failure("cannot derive a slug from this path".to_string()))?;

    tracing::debug!("Parsed {}/{}", subtree, slug);

    Ok(ContentRecord {
        slug,
        source_path: file.relative.clone(),
        metadata,
        raw_body,
    })
}
