//! Build command implementation.

use crate::assemble::{MarkdownCompiler, PageAssembler};
use crate::payload::{self, GuideSummary};
use anyhow::{bail, Context, Result};
use guidepost_core::{
    Config, GuideQuery, ListingConfig, PortalIndex, Subtree, SubtreeEntry, DEFAULT_RELATED_LIMIT,
};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const MANIFEST_FILE: &str = "routes.json";

#[derive(Serialize)]
struct RouteManifest {
    site: String,
    base_url: String,
    routes: Vec<ManifestEntry>,
    failed: Vec<FailedRoute>,
    #[serde(skip)]
    failed_listings: usize,
}

#[derive(Serialize)]
struct ManifestEntry {
    subtree: String,
    route: String,
    url: String,
    title: String,
    file: String,
}

#[derive(Serialize)]
struct FailedRoute {
    subtree: String,
    route: String,
    error: String,
}

#[derive(Serialize)]
struct ListingPage<'a> {
    name: &'a str,
    subtree: &'a str,
    tag: &'a str,
    guides: Vec<GuideSummary>,
}

/// Assemble every route of every subtree, then listings and the manifest
pub fn build_portal(config_path: &Path) -> Result<()> {
    let (config, portal) = super::load_portal(config_path)?;

    tracing::info!("Building portal: {}", config.site.title);

    let output_dir = config.output_dir();
    fs::create_dir_all(&output_dir).context("Failed to create output directory")?;

    let assembler = PageAssembler::new(&config, MarkdownCompiler::new());
    let mut manifest = RouteManifest {
        site: config.site.title.clone(),
        base_url: config.normalized_base_url(),
        routes: Vec::new(),
        failed: Vec::new(),
        failed_listings: 0,
    };
    // Output files relative to the output directory; no file is written twice
    let mut written: HashSet<PathBuf> = HashSet::from([PathBuf::from(MANIFEST_FILE)]);

    for entry in portal.entries() {
        write_subtree_pages(
            &config,
            &portal,
            entry,
            &assembler,
            &output_dir,
            &mut written,
            &mut manifest,
        )?;
    }

    for listing in &config.listings {
        let rel_path = listing_path(listing);
        if !written.insert(rel_path.clone()) {
            tracing::error!(
                "Listing {} would overwrite {:?}; rename the listing",
                listing.name,
                rel_path
            );
            manifest.failed_listings += 1;
            continue;
        }
        write_listing(&config, &portal, listing, &output_dir.join(&rel_path))?;
    }

    write_json(
        &output_dir.join(MANIFEST_FILE),
        &payload::envelope("routes.manifest", &manifest),
    )?;

    tracing::info!("✓ Built {} routes", manifest.routes.len());
    tracing::info!("✓ Output written to {:?}", output_dir);

    if !portal.failures().is_empty() {
        tracing::warn!(
            "{} content files were skipped; run `guidepost verify` for details",
            portal.failures().len()
        );
    }

    if !manifest.failed.is_empty() {
        bail!(
            "{} of {} routes failed to assemble",
            manifest.failed.len(),
            manifest.failed.len() + manifest.routes.len()
        );
    }

    if manifest.failed_listings > 0 {
        bail!(
            "{} listings collide with other output files",
            manifest.failed_listings
        );
    }

    Ok(())
}

fn write_subtree_pages(
    config: &Config,
    portal: &PortalIndex,
    entry: &SubtreeEntry,
    assembler: &PageAssembler<'_, MarkdownCompiler>,
    output_dir: &Path,
    written: &mut HashSet<PathBuf>,
    manifest: &mut RouteManifest,
) -> Result<()> {
    let subtree = entry.index.subtree();
    let resolver = portal.resolver(subtree)?;
    let subtree_config = config.subtree(subtree.as_str());
    let related_limit = subtree_config.map_or(DEFAULT_RELATED_LIMIT, |s| s.related_limit);
    let related_from =
        portal.resolver(&subtree_config.map_or_else(|| subtree.clone(), |s| s.related_subtree()))?;

    for query in resolver.enumerate_all_paths() {
        let route = resolver.scheme().route(&query);
        let page = match assembler.assemble(&resolver, &query, &related_from, related_limit) {
            Ok(page) => page,
            Err(err) => {
                tracing::error!("Failed to assemble {}/{}: {}", subtree, route, err);
                manifest.failed.push(FailedRoute {
                    subtree: subtree.to_string(),
                    route,
                    error: err.to_string(),
                });
                continue;
            }
        };

        let rel_path = PathBuf::from(subtree.as_str()).join(format!("{}.json", route));
        written.insert(rel_path.clone());
        write_json(&output_dir.join(&rel_path), &page)?;
        tracing::debug!("Assembled: {}/{}", subtree, route);

        manifest.routes.push(ManifestEntry {
            subtree: subtree.to_string(),
            url: page.url,
            title: page.title,
            file: rel_path.to_string_lossy().replace('\\', "/"),
            route,
        });
    }

    Ok(())
}

fn write_listing(
    config: &Config,
    portal: &PortalIndex,
    listing: &ListingConfig,
    path: &Path,
) -> Result<()> {
    let subtree = Subtree::new(listing.subtree.trim());
    let index = portal.guide_index(&subtree)?;
    let resolver = portal.resolver(&subtree)?;
    let base_url = config.normalized_base_url();

    let mut query = GuideQuery::new().tagged(&listing.tag).sorted(listing.sort);
    if let Some(limit) = listing.limit {
        query = query.limit(limit);
    }

    let guides: Vec<GuideSummary> = index
        .query(query)
        .into_iter()
        .map(|r| GuideSummary::from_record(r, subtree.as_str(), resolver.scheme(), &base_url))
        .collect();

    tracing::info!(
        "Generated listing {} with {} guides tagged '{}'",
        listing.name,
        guides.len(),
        listing.tag
    );

    let page = ListingPage {
        name: &listing.name,
        subtree: subtree.as_str(),
        tag: &listing.tag,
        guides,
    };
    write_json(path, &page)
}

fn listing_path(listing: &ListingConfig) -> PathBuf {
    PathBuf::from(format!("{}.json", listing.name.trim_matches('/')))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {:?}", parent))?;
    }
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {:?}", path))?;
    fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))
}
