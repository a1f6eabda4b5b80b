//! Print the table of contents of a single content file.

use crate::payload;
use anyhow::{Context, Result};
use guidepost_core::{frontmatter::split_frontmatter, table_of_contents, TocHeading};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Serialize)]
struct TocData {
    file: String,
    headings: Vec<TocHeading>,
}

pub fn show_toc(file: &Path, json: bool) -> Result<()> {
    let content =
        fs::read_to_string(file).with_context(|| format!("Failed to read {:?}", file))?;

    // Files without frontmatter are read as a bare body
    let body = split_frontmatter(&content).map_or(content.as_str(), |(_, body)| body);
    let headings = table_of_contents(body);

    if json {
        let payload = payload::envelope(
            "toc.headings",
            TocData {
                file: file.display().to_string(),
                headings,
            },
        );
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        for heading in &headings {
            let indent = "  ".repeat(usize::from(heading.depth.saturating_sub(1)));
            println!("{}{} (#{})", indent, heading.text, heading.anchor);
        }
    }

    Ok(())
}
