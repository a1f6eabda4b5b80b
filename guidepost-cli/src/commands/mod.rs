//! CLI command implementations.

pub mod build;
pub mod guides;
pub mod init;
pub mod paths;
pub mod resolve;
pub mod toc;
pub mod verify;

pub use build::build_portal;
pub use guides::{list_guides, GuideOptions};
pub use init::init_project;
pub use paths::list_paths;
pub use resolve::resolve_route;
pub use toc::show_toc;
pub use verify::verify_portal;

use anyhow::{Context, Result};
use guidepost_core::{Config, PortalIndex, SiteBuilder};
use std::path::Path;

/// Load the config and build the portal index from it.
pub fn load_portal(config_path: &Path) -> Result<(Config, PortalIndex)> {
    tracing::debug!("Loading config from {:?}", config_path);
    let config = Config::from_file(config_path)
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;

    let portal = SiteBuilder::new(config.clone())
        .build()
        .context("Failed to build portal index")?;

    Ok((config, portal))
}
