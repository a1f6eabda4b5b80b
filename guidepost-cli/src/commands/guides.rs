//! List the guides of a subtree, optionally filtered by tag.

use crate::payload::{self, GuideSummary};
use anyhow::{Context, Result};
use guidepost_core::{GuideQuery, SortOrder, Subtree};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct GuideOptions {
    pub tag: Option<String>,
    pub limit: Option<usize>,
    pub sort: SortOrder,
    pub json: bool,
}

#[derive(Serialize)]
struct GuidesData {
    subtree: String,
    tag: Option<String>,
    total: usize,
    guides: Vec<GuideSummary>,
}

pub fn list_guides(config_path: &Path, subtree: &str, opts: GuideOptions) -> Result<()> {
    let (config, portal) = super::load_portal(config_path)?;
    let subtree = Subtree::new(subtree);
    let index = portal
        .guide_index(&subtree)
        .with_context(|| format!("Cannot list guides of '{}'", subtree))?;
    let resolver = portal.resolver(&subtree)?;
    let base_url = config.normalized_base_url();

    let mut query = GuideQuery::new().sorted(opts.sort);
    if let Some(tag) = opts.tag.as_deref() {
        query = query.tagged(tag);
    }
    if let Some(limit) = opts.limit {
        query = query.limit(limit);
    }

    let guides: Vec<GuideSummary> = index
        .query(query)
        .into_iter()
        .map(|record| {
            GuideSummary::from_record(record, subtree.as_str(), resolver.scheme(), &base_url)
        })
        .collect();

    if opts.json {
        let payload = payload::envelope(
            "guides.list",
            GuidesData {
                subtree: subtree.to_string(),
                tag: opts.tag.clone(),
                total: guides.len(),
                guides,
            },
        );
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if guides.is_empty() {
        match &opts.tag {
            Some(tag) => println!("No guides tagged '{}' in {}", tag, subtree),
            None => println!("No guides in {}", subtree),
        }
        return Ok(());
    }

    for guide in &guides {
        println!("{}  {}  ({})", guide.date, guide.title, guide.url);
        if !guide.tags.is_empty() {
            println!("    tags: {}", guide.tags.join(", "));
        }
    }

    Ok(())
}
