//! Page assembly: turns a resolved route into the JSON payload a portal page
//! is rendered from.

use crate::payload::{format_date, GuideSummary};
use guidepost_core::{
    table_of_contents, Config, ContentRecord, ResolveError, SlugQuery, SlugResolver, TocHeading,
};
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;
use std::ops::Range;

/// Compiles a markdown/MDX body into HTML.
///
/// `headings` is the document's table of contents; compilers should give
/// the matching HTML headings those anchors as ids.
pub trait DocumentCompiler {
    fn compile(&self, body: &str, headings: &[TocHeading]) -> String;
}

/// CommonMark compiler backed by pulldown-cmark
pub struct MarkdownCompiler {
    options: Options,
}

impl MarkdownCompiler {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        Self { options }
    }
}

impl Default for MarkdownCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentCompiler for MarkdownCompiler {
    fn compile(&self, body: &str, headings: &[TocHeading]) -> String {
        let events: Vec<(Event, Range<usize>)> =
            Parser::new_ext(body, self.options).into_offset_iter().collect();
        let events = attach_heading_ids(events, body, headings);
        let events = add_heading_anchors(events);

        let mut out = String::with_capacity(body.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }
}

/// Give each top-level ATX heading the anchor of the TOC entry with the same
/// text.
///
/// Setext headings and headings inside block quotes or list items are not
/// in the TOC and keep no id.
fn attach_heading_ids<'e>(
    events: Vec<(Event<'e>, Range<usize>)>,
    body: &str,
    headings: &[TocHeading],
) -> Vec<Event<'e>> {
    let mut pending = headings;
    let mut result = Vec::with_capacity(events.len());
    let mut open: Option<usize> = None;
    let mut text = String::new();

    for (event, range) in events {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                if is_atx_line(body, range.start) {
                    open = Some(result.len());
                }
                text.clear();
                result.push(event);
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(start) = open.take() {
                    // TOC entries the parser did not render as headings are skipped
                    if let Some(pos) = pending.iter().position(|h| h.text == text.trim()) {
                        let anchor = pending[pos].anchor.clone();
                        pending = &pending[pos + 1..];
                        if let Event::Start(Tag::Heading { id, .. }) = &mut result[start] {
                            if id.is_none() {
                                *id = Some(CowStr::from(anchor));
                            }
                        }
                    }
                }
                result.push(event);
            }
            Event::Text(ref t) | Event::Code(ref t) if open.is_some() => {
                text.push_str(t);
                result.push(event);
            }
            other => result.push(other),
        }
    }

    result
}

/// Whether the heading starting at byte `start` sits on a line the TOC scan
/// reads as a heading: at most 3 spaces, then `#`, with no container marker.
fn is_atx_line(body: &str, start: usize) -> bool {
    let line_start = body[..start].rfind('\n').map_or(0, |i| i + 1);
    if !body[line_start..start].bytes().all(|b| b == b' ') {
        return false;
    }
    let line = &body[line_start..];
    let trimmed = line.trim_start_matches(' ');
    line.len() - trimmed.len() <= 3 && trimmed.starts_with('#')
}

fn add_heading_anchors(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut result = Vec::with_capacity(events.len());
    let mut current_id: Option<String> = None;

    for event in events {
        match event {
            Event::Start(Tag::Heading { ref id, .. }) => {
                current_id = id.as_ref().map(|s| s.to_string());
                result.push(event);
            }
            Event::End(TagEnd::Heading(level)) => {
                if let Some(id) = current_id.take() {
                    let anchor = format!(
                        "<a class=\"heading-anchor\" href=\"#{}\" aria-label=\"Link to heading\">#</a>",
                        html_escape(&id)
                    );
                    result.push(Event::Html(CowStr::Boxed(anchor.into_boxed_str())));
                }
                result.push(Event::End(TagEnd::Heading(level)));
            }
            other => result.push(other),
        }
    }

    result
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[derive(Debug, Clone, Serialize)]
pub struct Breadcrumb {
    pub position: usize,
    pub name: String,
    pub item: String,
}

/// Everything a portal page needs for one route.
#[derive(Debug, Clone, Serialize)]
pub struct RoutePage {
    pub subtree: String,
    pub route: String,
    pub slug: String,
    pub url: String,
    pub canonical: String,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub hint: Option<String>,
    pub published: String,
    pub modified: String,
    pub updated: Option<String>,
    pub authors: Vec<String>,
    pub headings: Vec<TocHeading>,
    pub related: Vec<GuideSummary>,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub html: String,
}

/// Resolves routes and assembles their pages
pub struct PageAssembler<'c, C> {
    config: &'c Config,
    compiler: C,
}

impl<'c, C: DocumentCompiler> PageAssembler<'c, C> {
    pub fn new(config: &'c Config, compiler: C) -> Self {
        Self { config, compiler }
    }

    /// Resolve `query` and build its page, with up to `related_limit`
    /// related guides drawn from `related_from`'s subtree.
    pub fn assemble(
        &self,
        resolver: &SlugResolver<'_>,
        query: &SlugQuery,
        related_from: &SlugResolver<'_>,
        related_limit: usize,
    ) -> Result<RoutePage, ResolveError> {
        let resolved = resolver.resolve(query)?;
        let subtree = resolver.subtree().as_str();
        let scheme = resolver.scheme();
        let base_url = self.config.normalized_base_url();

        let related = resolver
            .related_in(&resolved, related_from.index(), related_limit)
            .into_iter()
            .map(|r| {
                GuideSummary::from_record(
                    r,
                    related_from.subtree().as_str(),
                    related_from.scheme(),
                    &base_url,
                )
            })
            .collect();

        Ok(self.page(subtree, &scheme.route(query), resolved.record, resolved.hint, related))
    }

    fn page(
        &self,
        subtree: &str,
        route: &str,
        record: &ContentRecord,
        hint: Option<String>,
        related: Vec<GuideSummary>,
    ) -> RoutePage {
        let metadata = &record.metadata;
        let headings = table_of_contents(&record.raw_body);
        let html = self.compiler.compile(&record.raw_body, &headings);
        let url = self.config.absolute_url(&format!("{}/{}", subtree, route));

        let breadcrumbs = vec![
            Breadcrumb {
                position: 1,
                name: self.config.site.title.clone(),
                item: self.config.absolute_url(""),
            },
            Breadcrumb {
                position: 2,
                name: subtree.to_string(),
                item: self.config.absolute_url(subtree),
            },
            Breadcrumb {
                position: 3,
                name: metadata.title.clone(),
                item: url.clone(),
            },
        ];

        RoutePage {
            subtree: subtree.to_string(),
            route: route.to_string(),
            slug: record.slug.join(),
            canonical: metadata.canonical_or(&url),
            url,
            title: metadata.title.clone(),
            summary: metadata.summary.clone(),
            tags: metadata
                .tags
                .display_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            hint,
            published: format_date(metadata.date),
            modified: format_date(metadata.modified()),
            updated: metadata.updated.map(format_date),
            authors: metadata.author_handles.clone(),
            headings,
            related,
            breadcrumbs,
            html,
        }
    }
}
