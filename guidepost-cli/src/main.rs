//! # guidepost CLI
//!
//! Command-line interface for guidepost documentation portals.

mod assemble;
mod commands;
mod payload;

use clap::{Parser, Subcommand, ValueEnum};
use guidepost_core::SortOrder;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "guidepost")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "guidepost.yml", env = "GUIDEPOST_CONFIG")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new guidepost project
    Init {
        /// Target directory (defaults to current directory)
        path: Option<PathBuf>,
    },

    /// Assemble every route, listing and the route manifest as JSON
    Build,

    /// Enumerate the route paths of a subtree
    Paths {
        /// Subtree name (e.g. guides)
        subtree: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List the guides of a subtree
    Guides {
        /// Subtree name (e.g. guides)
        subtree: String,

        /// Only guides carrying this tag
        #[arg(long)]
        tag: Option<String>,

        /// Maximum number of guides
        #[arg(long)]
        limit: Option<usize>,

        /// Result ordering
        #[arg(long, value_enum, default_value_t = SortArg::Scanner)]
        sort: SortArg,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the table of contents of a content file
    Toc {
        /// Markdown/MDX file
        file: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Resolve a route to its guide
    Resolve {
        /// Subtree name (e.g. learn-web3)
        subtree: String,

        /// Route below the subtree, e.g. `what-is-an-nft,nft`
        route: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Verify content health and emit diagnostics
    Verify {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Copy, Clone, ValueEnum)]
pub enum SortArg {
    Scanner,
    Newest,
    Title,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Scanner => SortOrder::Scanner,
            SortArg::Newest => SortOrder::NewestFirst,
            SortArg::Title => SortOrder::Title,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init { path } => commands::init_project(path.as_deref()),
        Commands::Build => commands::build_portal(&cli.config),
        Commands::Paths { subtree, json } => commands::list_paths(&cli.config, &subtree, json),
        Commands::Guides {
            subtree,
            tag,
            limit,
            sort,
            json,
        } => {
            let opts = commands::GuideOptions {
                tag,
                limit,
                sort: sort.into(),
                json,
            };
            commands::list_guides(&cli.config, &subtree, opts)
        }
        Commands::Toc { file, json } => commands::show_toc(&file, json),
        Commands::Resolve {
            subtree,
            route,
            json,
        } => commands::resolve_route(&cli.config, &subtree, &route, json),
        Commands::Verify { json } => commands::verify_portal(&cli.config, json),
    }
}
