//! Slug generation and normalization.

use guidepost_types::SlugPath;
use regex::Regex;
use std::path::{Component, Path};
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

static HYPHEN_RUN: OnceLock<Regex> = OnceLock::new();

fn hyphen_run() -> &'static Regex {
    HYPHEN_RUN.get_or_init(|| Regex::new(r"-+").expect("hyphen pattern compiles"))
}

/// Convert a string to a URL-fragment-safe slug
///
/// Rules:
/// - Lowercase
/// - Replace whitespace and underscores with hyphens
/// - Remove everything that is not alphanumeric or a hyphen
/// - Collapse multiple hyphens
/// - Trim leading/trailing hyphens
///
/// # Examples
///
/// ```
/// use guidepost_core::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("Deploy an ERC-1155 Edition"), "deploy-an-erc-1155-edition");
/// assert_eq!(slugify("What's new?"), "whats-new");
/// ```
pub fn slugify(input: &str) -> String {
    let lowercased = input.to_lowercase();

    let cleaned = lowercased
        .graphemes(true)
        .filter_map(|g| {
            let c = g.chars().next()?;
            if c.is_whitespace() || c == '_' {
                Some("-")
            } else if c == '-' || c.is_alphanumeric() {
                Some(g)
            } else {
                None
            }
        })
        .collect::<String>();

    let collapsed = hyphen_run().replace_all(&cleaned, "-");
    collapsed.trim_matches('-').to_string()
}

/// Derive a slug path from a file path relative to its subtree root.
///
/// The final component loses its extension; directory components are kept
/// verbatim. Returns `None` for paths that have no usable components.
pub fn slug_path_from_relative(relative: &Path) -> Option<SlugPath> {
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => segments.push(part.to_str()?.to_string()),
            Component::CurDir => {}
            _ => return None,
        }
    }

    let last = segments.pop()?;
    let stem = Path::new(&last).file_stem()?.to_str()?.to_string();
    if stem.is_empty() {
        return None;
    }
    segments.push(stem);
    Some(SlugPath::new(segments))
}
