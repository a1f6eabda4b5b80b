//! Enumerate the routes of a subtree.

use crate::payload;
use anyhow::{Context, Result};
use guidepost_core::Subtree;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct PathsData {
    subtree: String,
    routes: Vec<RouteEntry>,
}

#[derive(Serialize)]
struct RouteEntry {
    route: String,
    segments: Vec<String>,
    hint: Option<String>,
    source: String,
}

pub fn list_paths(config_path: &Path, subtree: &str, json: bool) -> Result<()> {
    let (_config, portal) = super::load_portal(config_path)?;
    let subtree = Subtree::new(subtree);
    let resolver = portal
        .resolver(&subtree)
        .with_context(|| format!("Cannot list routes of '{}'", subtree))?;

    let delimiter = resolver.scheme().delimiter().unwrap_or_default();
    let routes: Vec<RouteEntry> = resolver
        .enumerate_all_paths()
        .into_iter()
        .zip(portal.all_records(&subtree)?)
        .map(|(query, record)| RouteEntry {
            route: resolver.scheme().route(&query),
            segments: query.route_segments(delimiter),
            hint: query.hint,
            source: record.source_path.to_string_lossy().replace('\\', "/"),
        })
        .collect();

    if json {
        let payload = payload::envelope(
            "paths.list",
            PathsData {
                subtree: subtree.to_string(),
                routes,
            },
        );
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        for entry in &routes {
            println!("/{}/{}", subtree, entry.route);
        }
    }

    Ok(())
}
