//! Verify content health and emit diagnostics.

use crate::payload;
use anyhow::Result;
use guidepost_core::{ParseFailure, ResolveError};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct VerificationSummary<'a> {
    subtrees: Vec<SubtreeSummary>,
    records: usize,
    errors: usize,
    warnings: usize,
    diagnostics: Vec<Diagnostic<'a>>,
}

#[derive(Serialize)]
struct SubtreeSummary {
    name: String,
    records: usize,
    routes: usize,
    tags: usize,
}

#[derive(Serialize, PartialEq, Eq, Debug, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum Severity {
    Error,
    Warning,
}

#[derive(Serialize)]
struct Diagnostic<'a> {
    code: &'static str,
    severity: Severity,
    subtree: &'a str,
    source_path: Option<String>,
    message: String,
}

impl<'a> Diagnostic<'a> {
    fn from_failure(failure: &'a ParseFailure) -> Self {
        Self {
            code: "frontmatter.invalid",
            severity: Severity::Error,
            subtree: failure.subtree.as_str(),
            source_path: Some(failure.path.to_string_lossy().replace('\\', "/")),
            message: failure.reason.clone(),
        }
    }
}

/// Build every index without writing output and surface diagnostics.
///
/// Routes that enumerate but cannot be served (e.g. a file without a tag
/// hint in a qualified subtree) are reported as warnings.
pub fn verify_portal(config_path: &Path, json: bool) -> Result<()> {
    let (_config, portal) = super::load_portal(config_path)?;

    let mut diagnostics: Vec<Diagnostic> = portal
        .failures()
        .iter()
        .map(Diagnostic::from_failure)
        .collect();
    let mut subtrees = Vec::new();

    for entry in portal.entries() {
        let subtree = entry.index.subtree();
        let resolver = portal.resolver(subtree)?;
        let paths = resolver.enumerate_all_paths();

        for (query, record) in paths.iter().zip(entry.index.all_records()) {
            if let Err(err) = resolver.resolve(query) {
                let code = match err {
                    ResolveError::NotFound { .. } => "route.not_found",
                    ResolveError::MalformedRoute { .. } => "route.malformed",
                    ResolveError::Ambiguous { .. } => "route.ambiguous",
                };
                diagnostics.push(Diagnostic {
                    code,
                    severity: Severity::Warning,
                    subtree: subtree.as_str(),
                    source_path: Some(record.source_path.to_string_lossy().replace('\\', "/")),
                    message: err.to_string(),
                });
            }
        }

        subtrees.push(SubtreeSummary {
            name: subtree.to_string(),
            records: entry.index.len(),
            routes: paths.len(),
            tags: entry.index.tags().len(),
        });
    }

    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warnings = diagnostics.len() - errors;

    let summary = VerificationSummary {
        subtrees,
        records: portal.record_count(),
        errors,
        warnings,
        diagnostics,
    };

    if json {
        let payload = payload::envelope("verify.summary", &summary);
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!(
            "Verification complete: {} records, {} errors, {} warnings",
            summary.records, errors, warnings
        );
        for subtree in &summary.subtrees {
            println!(
                "  {}: {} records, {} routes, {} tags",
                subtree.name, subtree.records, subtree.routes, subtree.tags
            );
        }
        for diag in &summary.diagnostics {
            let source = diag
                .source_path
                .as_deref()
                .map(|s| format!(" ({}/{})", diag.subtree, s))
                .unwrap_or_default();
            println!(
                "- {:?} {}{}: {}",
                diag.severity, diag.code, source, diag.message
            );
        }
    }

    Ok(())
}
