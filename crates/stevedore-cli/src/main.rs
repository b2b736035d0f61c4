//! # stevedore-cli
//!
//! Command line surface for the stevedore provisioning tools. Parses the
//! command, sets up logging, and dispatches to the command handlers; all the
//! actual resolution work lives in the library crates.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use tracing::info;

mod commands;
mod output;

use commands::CommandContext;

/// Resolve artifact graphs into ordered launch lists
#[derive(Parser)]
#[command(
    name = "stevedore",
    version,
    about = "Resolve artifact graphs into ordered launch lists"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a plan into a launch list
    Resolve {
        /// Plan file
        #[arg(default_value = "plan.toml")]
        plan: Utf8PathBuf,
        /// Repository root, overriding the plan
        #[arg(long)]
        repository: Option<Utf8PathBuf>,
        /// Write the list to a file instead of stdout
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
        /// Fail on version conflicts
        #[arg(long)]
        strict: bool,
    },
    /// Print the materialized dependency trees
    Tree {
        /// Plan file
        #[arg(default_value = "plan.toml")]
        plan: Utf8PathBuf,
        /// Repository root, overriding the plan
        #[arg(long)]
        repository: Option<Utf8PathBuf>,
    },
    /// Export the resolved graph in DOT format
    Graph {
        /// Plan file
        #[arg(default_value = "plan.toml")]
        plan: Utf8PathBuf,
        /// Repository root, overriding the plan
        #[arg(long)]
        repository: Option<Utf8PathBuf>,
        /// Write the graph to a file instead of stdout
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
    },
    /// Validate the plan and every descriptor in the repository
    Check {
        /// Plan file
        #[arg(default_value = "plan.toml")]
        plan: Utf8PathBuf,
        /// Repository root, overriding the plan
        #[arg(long)]
        repository: Option<Utf8PathBuf>,
    },
    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    info!("starting stevedore v{}", env!("CARGO_PKG_VERSION"));

    let ctx = CommandContext::new();
    if let Err(error) = commands::dispatch_command(cli.command, &ctx) {
        ctx.output.error(&error.to_string());
        if let Some(suggestion) = error.suggestion() {
            ctx.output.info(suggestion);
        }
        std::process::exit(1);
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "stevedore={level},stevedore_core={level},stevedore_registry={level},stevedore_resolver={level}",
        ))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
