//! Resolve a single route to its guide.

use crate::assemble::{MarkdownCompiler, PageAssembler};
use crate::payload;
use anyhow::{Context, Result};
use guidepost_core::Subtree;
use std::path::Path;

pub fn resolve_route(config_path: &Path, subtree: &str, route: &str, json: bool) -> Result<()> {
    let (config, portal) = super::load_portal(config_path)?;
    let subtree_config = config
        .subtree(subtree)
        .with_context(|| format!("Subtree '{}' is not configured", subtree))?;
    let subtree = Subtree::new(subtree);
    let resolver = portal.resolver(&subtree)?;
    let related_from = portal.resolver(&subtree_config.related_subtree())?;

    let segments: Vec<&str> = route.split('/').collect();
    let query = resolver
        .parse_route(&segments)
        .with_context(|| format!("Cannot resolve '{}'", route))?;

    let assembler = PageAssembler::new(&config, MarkdownCompiler::new());
    let page = assembler
        .assemble(
            &resolver,
            &query,
            &related_from,
            subtree_config.related_limit,
        )
        .with_context(|| format!("Cannot resolve '{}'", route))?;

    if json {
        let payload = payload::envelope("route.page", &page);
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("{}", page.title);
    println!("  slug:      {}", page.slug);
    println!("  url:       {}", page.url);
    if page.canonical != page.url {
        println!("  canonical: {}", page.canonical);
    }
    println!("  published: {}", page.published);
    if let Some(updated) = &page.updated {
        println!("  updated:   {}", updated);
    }
    if !page.tags.is_empty() {
        println!("  tags:      {}", page.tags.join(", "));
    }
    if let Some(hint) = &page.hint {
        println!("  hint:      {}", hint);
    }
    if !page.related.is_empty() {
        println!("Related:");
        for guide in &page.related {
            println!("  - {} ({})", guide.title, guide.url);
        }
    }

    Ok(())
}
