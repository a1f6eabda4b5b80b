//! Table-of-contents extraction from raw markdown bodies.
//!
//! Headings are recognized by their ATX line prefix (`#` markers followed by
//! whitespace). Lines inside fenced code blocks are never headings; a fence
//! left open at the end of the document simply runs to EOF.

use crate::slug::slugify;
use guidepost_types::TocHeading;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use std::collections::{HashMap, HashSet};
use std::str::Lines;

const MAX_DEPTH: usize = 6;
const FALLBACK_ANCHOR: &str = "section";

/// Lazy iterator over the headings of one document, in document order.
///
/// Cloning before the first `next()` gives an independent pass over the same
/// body; calling [`headings`] again does the same.
#[derive(Debug, Clone)]
pub struct Headings<'a> {
    lines: Lines<'a>,
    fence: Option<Fence>,
    seen: HashSet<String>,
    suffixes: HashMap<String, usize>,
}

/// Start extracting headings from `body`.
pub fn headings(body: &str) -> Headings<'_> {
    Headings {
        lines: body.lines(),
        fence: None,
        seen: HashSet::new(),
        suffixes: HashMap::new(),
    }
}

/// Collect the full table of contents of `body`.
///
/// ```
/// use guidepost_core::headings::table_of_contents;
///
/// let toc = table_of_contents("# Title\n\n```\n# not a heading\n```\n## Sub");
/// let texts: Vec<_> = toc.iter().map(|h| (h.text.as_str(), h.depth)).collect();
/// assert_eq!(texts, vec![("Title", 1), ("Sub", 2)]);
/// ```
pub fn table_of_contents(body: &str) -> Vec<TocHeading> {
    headings(body).collect()
}

impl Iterator for Headings<'_> {
    type Item = TocHeading;

    fn next(&mut self) -> Option<TocHeading> {
        while let Some(line) = self.lines.next() {
            if let Some(open) = &self.fence {
                if open.is_closed_by(line) {
                    self.fence = None;
                }
                continue;
            }

            if let Some(fence) = Fence::open(line) {
                self.fence = Some(fence);
                continue;
            }

            if let Some((depth, raw_text)) = parse_atx(line) {
                let text = visible_text(raw_text);
                let anchor = self.unique_anchor(&text);
                return Some(TocHeading {
                    text,
                    depth,
                    anchor,
                });
            }
        }
        None
    }
}

impl Headings<'_> {
    /// First use of an anchor stays bare; later ones get `-2`, `-3`, ...
    fn unique_anchor(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base = FALLBACK_ANCHOR.to_string();
        }

        if self.seen.insert(base.clone()) {
            return base;
        }

        let counter = self.suffixes.entry(base.clone()).or_insert(1);
        loop {
            *counter += 1;
            let candidate = format!("{}-{}", base, counter);
            if self.seen.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: u8,
    len: usize,
}

impl Fence {
    fn open(line: &str) -> Option<Self> {
        let line = strip_indent(line)?;
        let marker = *line.as_bytes().first()?;
        if marker != b'`' && marker != b'~' {
            return None;
        }
        let len = line.bytes().take_while(|b| *b == marker).count();
        if len < 3 {
            return None;
        }
        // A backtick fence's info string may not itself contain backticks.
        if marker == b'`' && line[len..].contains('`') {
            return None;
        }
        Some(Fence { marker, len })
    }

    fn is_closed_by(&self, line: &str) -> bool {
        let Some(line) = strip_indent(line) else {
            return false;
        };
        let len = line.bytes().take_while(|b| *b == self.marker).count();
        len >= self.len && line[len..].trim().is_empty()
    }
}

/// Up to three spaces of indentation; more makes an indented code block.
fn strip_indent(line: &str) -> Option<&str> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_atx(line: &str) -> Option<(u8, &str)> {
    let line = strip_indent(line)?;
    let markers = line.bytes().take_while(|b| *b == b'#').count();
    if markers == 0 {
        return None;
    }

    let rest = &line[markers..];
    if !rest.starts_with(|c: char| c.is_whitespace()) {
        return None;
    }

    let text = strip_closing_sequence(rest.trim());
    if text.is_empty() {
        return None;
    }

    Some((markers.min(MAX_DEPTH) as u8, text))
}

/// Drop an optional closing `#` run (`## Title ##`), but keep `C#`.
fn strip_closing_sequence(text: &str) -> &str {
    let without = text.trim_end_matches('#');
    if without.len() == text.len() {
        text
    } else if without.is_empty() {
        without
    } else if without.ends_with(|c: char| c.is_whitespace()) {
        without.trim_end()
    } else {
        text
    }
}

/// Visible text of inline heading markup: emphasis, links and code spans
/// are reduced to their text, inline HTML/JSX is dropped.
fn visible_text(raw: &str) -> String {
    let source = format!("# {}", raw);
    let mut text = String::new();
    let mut inside = false;

    for event in Parser::new(&source) {
        match event {
            Event::Start(Tag::Heading { .. }) => inside = true,
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) if inside => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak if inside => text.push(' '),
            _ => {}
        }
    }

    let text = text.trim();
    if text.is_empty() {
        raw.to_string()
    } else {
        text.to_string()
    }
}
