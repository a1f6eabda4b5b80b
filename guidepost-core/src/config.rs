//! Configuration parsing and management.

use crate::index::SortOrder;
use crate::resolver::{RouteScheme, DEFAULT_RELATED_LIMIT};
use crate::scanner::DEFAULT_EXTENSIONS;
use guidepost_types::Subtree;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration struct matching the guidepost.yml schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub paths: PathsConfig,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    pub subtrees: Vec<SubtreeConfig>,

    #[serde(default)]
    pub listings: Vec<ListingConfig>,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_base_url() -> String {
    String::from("/")
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub title: String,

    /// Absolute site URL used for canonical fallbacks
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub content: PathBuf,
    pub output: PathBuf,
}

/// One independently indexed subtree of the content directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtreeConfig {
    pub name: String,

    /// Delimiter of the compound final route segment; absent for plain routes
    #[serde(default)]
    pub hint_delimiter: Option<String>,

    #[serde(default = "default_related_limit")]
    pub related_limit: usize,

    /// Subtree related guides are drawn from; defaults to this subtree
    #[serde(default)]
    pub related_subtree: Option<String>,
}

fn default_related_limit() -> usize {
    DEFAULT_RELATED_LIMIT
}

impl SubtreeConfig {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hint_delimiter: None,
            related_limit: DEFAULT_RELATED_LIMIT,
            related_subtree: None,
        }
    }

    pub fn subtree(&self) -> Subtree {
        Subtree::new(self.name.clone())
    }

    pub fn related_subtree(&self) -> Subtree {
        match &self.related_subtree {
            Some(name) => Subtree::new(name.trim()),
            None => self.subtree(),
        }
    }

    pub fn scheme(&self) -> RouteScheme {
        match &self.hint_delimiter {
            Some(delimiter) => RouteScheme::qualified(delimiter.clone()),
            None => RouteScheme::Plain,
        }
    }
}

/// A tag-filtered listing page (e.g. all `edition` guides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Output name, e.g. `guides/edition`
    pub name: String,
    pub subtree: String,
    pub tag: String,

    #[serde(default)]
    pub limit: Option<usize>,

    #[serde(default)]
    pub sort: SortOrder,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&contents)?;

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration for a content directory with the given plain subtrees
    pub fn for_content_dir(content: impl Into<PathBuf>, subtrees: &[&str]) -> Self {
        Self {
            site: SiteConfig {
                title: "guidepost".into(),
                url: "http://localhost".into(),
            },
            paths: PathsConfig {
                content: content.into(),
                output: PathBuf::from("dist"),
            },
            base_url: default_base_url(),
            subtrees: subtrees.iter().map(|s| SubtreeConfig::plain(*s)).collect(),
            listings: Vec::new(),
            extensions: default_extensions(),
            ignore_patterns: Vec::new(),
            config_path: None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subtrees.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one subtree must be configured".into(),
            ));
        }

        let mut names = HashSet::new();
        for subtree in &self.subtrees {
            let name = subtree.name.trim();
            if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
                return Err(ConfigError::Invalid(format!(
                    "invalid subtree name '{}'",
                    subtree.name
                )));
            }
            if !names.insert(name) {
                return Err(ConfigError::Invalid(format!(
                    "subtree '{}' is configured twice",
                    subtree.name
                )));
            }
            if let Some(delimiter) = &subtree.hint_delimiter {
                if delimiter.is_empty() || delimiter.contains('/') {
                    return Err(ConfigError::Invalid(format!(
                        "subtree '{}' has an invalid hint delimiter '{}'",
                        subtree.name, delimiter
                    )));
                }
            }
        }

        for subtree in &self.subtrees {
            if let Some(related) = &subtree.related_subtree {
                if !names.contains(related.trim()) {
                    return Err(ConfigError::Invalid(format!(
                        "subtree '{}' draws related guides from unknown subtree '{}'",
                        subtree.name, related
                    )));
                }
            }
        }

        for listing in &self.listings {
            if !names.contains(listing.subtree.trim()) {
                return Err(ConfigError::Invalid(format!(
                    "listing '{}' refers to unknown subtree '{}'",
                    listing.name, listing.subtree
                )));
            }
        }

        if self.extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one content extension must be configured".into(),
            ));
        }

        Ok(())
    }

    pub fn subtree(&self, name: &str) -> Option<&SubtreeConfig> {
        self.subtrees.iter().find(|s| s.name == name)
    }

    /// Get the content directory, resolved relative to config file
    pub fn content_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.content)
    }

    /// Get the output directory, resolved relative to config file
    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.output)
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(parent) = self.config_path.as_ref().and_then(|p| p.parent()) {
            parent.join(path)
        } else {
            path.to_path_buf()
        }
    }

    /// Normalized base URL with leading and trailing slash ("/foo/" or "/")
    pub fn normalized_base_url(&self) -> String {
        normalize_base_url(&self.base_url)
    }

    /// Absolute URL of a site-relative route, e.g. `https://portal.example.com/guides/a`
    pub fn absolute_url(&self, route: &str) -> String {
        format!(
            "{}{}{}",
            self.site.url.trim_end_matches('/'),
            self.normalized_base_url(),
            route.trim_start_matches('/')
        )
    }
}

/// Ensure base URLs have a leading and trailing slash
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "/".to_string();
    }

    let mut s = String::from("/");
    for part in trimmed.split('/').filter(|p| !p.is_empty()) {
        s.push_str(part);
        s.push('/');
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
site:
  title: "Portal"
  url: "https://portal.example.com/"
paths:
  content: "content"
  output: "dist"
subtrees:
  - name: guides
  - name: learn-web3
    hint_delimiter: ","
    related_limit: 5
listings:
  - name: guides/edition
    subtree: guides
    tag: edition
  - name: guides/latest
    subtree: guides
    tag: marketplace
    limit: 3
    sort: newest-first
"#;

    #[test]
    fn test_parse_sample() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.base_url, "/");
        assert_eq!(config.extensions, vec!["md", "mdx"]);
        assert_eq!(config.subtrees.len(), 2);

        let guides = config.subtree("guides").unwrap();
        assert_eq!(guides.scheme(), RouteScheme::Plain);
        assert_eq!(guides.related_limit, DEFAULT_RELATED_LIMIT);

        let learn = config.subtree("learn-web3").unwrap();
        assert_eq!(learn.scheme(), RouteScheme::qualified(","));
        assert_eq!(learn.related_limit, 5);

        assert_eq!(config.listings[0].sort, SortOrder::Scanner);
        assert_eq!(config.listings[1].sort, SortOrder::NewestFirst);
        assert_eq!(config.listings[1].limit, Some(3));
    }

    #[test]
    fn test_paths_resolve_relative_to_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guidepost.yml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.content_dir(), dir.path().join("content"));
        assert_eq!(config.output_dir(), dir.path().join("dist"));
    }

    #[test]
    fn test_validation_errors() {
        let no_subtrees = SAMPLE.replace(
            "  - name: guides\n  - name: learn-web3\n    hint_delimiter: \",\"\n    related_limit: 5\n",
            "",
        );
        assert!(Config::from_yaml(&no_subtrees).is_err());

        let duplicate = SAMPLE.replace("name: learn-web3", "name: guides");
        assert!(matches!(
            Config::from_yaml(&duplicate),
            Err(ConfigError::Invalid(_))
        ));

        let bad_listing = SAMPLE.replace(
            "subtree: guides\n    tag: edition",
            "subtree: blog\n    tag: edition",
        );
        assert!(matches!(
            Config::from_yaml(&bad_listing),
            Err(ConfigError::Invalid(_))
        ));

        let bad_delimiter = SAMPLE.replace("hint_delimiter: \",\"", "hint_delimiter: \"/\"");
        assert!(matches!(
            Config::from_yaml(&bad_delimiter),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_related_subtree_defaults_to_self() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        let learn = config.subtree("learn-web3").unwrap();
        assert_eq!(learn.related_subtree(), Subtree::from("learn-web3"));

        let drawn = SAMPLE.replace(
            "related_limit: 5",
            "related_limit: 5\n    related_subtree: guides",
        );
        let config = Config::from_yaml(&drawn).unwrap();
        let learn = config.subtree("learn-web3").unwrap();
        assert_eq!(learn.related_subtree(), Subtree::from("guides"));

        let unknown = SAMPLE.replace(
            "related_limit: 5",
            "related_limit: 5\n    related_subtree: blog",
        );
        assert!(matches!(
            Config::from_yaml(&unknown),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url(""), "/");
        assert_eq!(normalize_base_url("/"), "/");
        assert_eq!(normalize_base_url("docs"), "/docs/");
        assert_eq!(normalize_base_url("//docs//v2/"), "/docs/v2/");
    }

    #[test]
    fn test_absolute_url() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(
            config.absolute_url("/guides/a"),
            "https://portal.example.com/guides/a"
        );
    }
}
