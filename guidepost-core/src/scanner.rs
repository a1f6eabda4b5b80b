//! Content discovery: walks the content tree and lists markdown/MDX files.

use guidepost_types::Subtree;
use regex::Regex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

pub const DEFAULT_EXTENSIONS: &[&str] = &["md", "mdx"];

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Content directory not found: {0:?}")]
    RootMissing(PathBuf),

    #[error("Permission denied: {0:?}")]
    PermissionDenied(PathBuf),

    #[error("Symlink cycle: {path:?} loops back to {ancestor:?}")]
    SymlinkCycle { path: PathBuf, ancestor: PathBuf },

    #[error("Failed to walk {path:?}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// A discovered content file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Path relative to the scanned directory (the subtree root)
    pub relative: PathBuf,
    pub absolute: PathBuf,
}

/// Walks a content root and reports content files in stable order.
#[derive(Debug, Clone)]
pub struct ContentScanner {
    root: PathBuf,
    extensions: Vec<String>,
    ignore_patterns: Vec<Regex>,
}

impl ContentScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            ignore_patterns: Vec::new(),
        }
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_string())
            .collect();
        self
    }

    /// Regexes matched against the `/`-separated relative path; invalid
    /// patterns are logged and skipped.
    pub fn with_ignore_patterns(mut self, patterns: &[String]) -> Self {
        self.ignore_patterns = compile_ignore_patterns(patterns);
        self
    }

    /// List content files under `subtree` (or the whole root), sorted by
    /// relative path.
    pub fn scan(&self, subtree: Option<&Subtree>) -> Result<Vec<ScannedFile>, ScanError> {
        let dir = match subtree {
            Some(subtree) => self.root.join(subtree.as_str()),
            None => self.root.clone(),
        };

        if !dir.is_dir() {
            return Err(ScanError::RootMissing(dir));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&dir)
            .follow_links(true)
            .sort_by_file_name()
            .min_depth(1)
        {
            let entry = entry.map_err(|err| classify_walk_error(&dir, err))?;
            if !entry.file_type().is_file() || !self.has_content_extension(entry.path()) {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&dir)
                .unwrap_or(entry.path())
                .to_path_buf();
            let rel_str = relative.to_string_lossy().replace('\\', "/");
            if should_ignore(&rel_str, &self.ignore_patterns) {
                tracing::debug!("Ignoring {} due to ignore_patterns", rel_str);
                continue;
            }

            files.push(ScannedFile {
                relative,
                absolute: entry.path().to_path_buf(),
            });
        }

        files.sort_by(|a, b| a.relative.cmp(&b.relative));

        tracing::debug!("Scanned {:?}: {} content files", dir, files.len());
        Ok(files)
    }

    fn has_content_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

fn classify_walk_error(dir: &Path, err: walkdir::Error) -> ScanError {
    if let Some(ancestor) = err.loop_ancestor() {
        return ScanError::SymlinkCycle {
            path: err.path().unwrap_or(dir).to_path_buf(),
            ancestor: ancestor.to_path_buf(),
        };
    }

    if err.io_error().map(|e| e.kind()) == Some(ErrorKind::PermissionDenied) {
        return ScanError::PermissionDenied(err.path().unwrap_or(dir).to_path_buf());
    }

    ScanError::Walk {
        path: err.path().unwrap_or(dir).to_path_buf(),
        source: err,
    }
}

fn compile_ignore_patterns(patterns: &[String]) -> Vec<Regex> {
    let mut compiled = Vec::new();
    for pat in patterns {
        match Regex::new(pat) {
            Ok(re) => compiled.push(re),
            Err(err) => tracing::warn!("Invalid ignore pattern '{}': {}", pat, err),
        }
    }
    compiled
}

fn should_ignore(path: &str, ignores: &[Regex]) -> bool {
    ignores.iter().any(|re| re.is_match(path))
}
