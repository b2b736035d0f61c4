//! Command implementations and dispatch logic.
//!
//! Each command is a function taking its arguments and the shared context.
//! The helpers here load plans, open repositories and assemble the root
//! specifications shared by every resolving command.

use camino::Utf8PathBuf;
use tracing::info;

use stevedore_config::PlanToml;
use stevedore_core::error::{StevedoreError, StevedoreResult};
use stevedore_registry::{FileSource, MetadataSource};
use stevedore_resolver::{DependencyForest, RootSpec, TreeBuilder};

use crate::output::OutputHandler;
use crate::Commands;

pub mod check;
pub mod graph;
pub mod resolve;
pub mod tree;

#[cfg(test)]
mod tests;

/// Shared context for all commands
pub struct CommandContext {
    pub output: OutputHandler,
}

impl CommandContext {
    /// Create a new command context
    pub fn new() -> Self {
        Self {
            output: OutputHandler::new(),
        }
    }
}

/// Dispatch a command to its handler
pub fn dispatch_command(command: Commands, ctx: &CommandContext) -> StevedoreResult<()> {
    match command {
        Commands::Resolve {
            plan,
            repository,
            output,
            strict,
        } => {
            info!(plan = %plan, "resolving launch list");
            resolve::execute(plan, repository, output, strict, ctx)
        },
        Commands::Tree { plan, repository } => {
            info!(plan = %plan, "printing dependency trees");
            tree::execute(plan, repository, ctx)
        },
        Commands::Graph {
            plan,
            repository,
            output,
        } => {
            info!(plan = %plan, "exporting resolved graph");
            graph::execute(plan, repository, output, ctx)
        },
        Commands::Check { plan, repository } => {
            info!(plan = %plan, "checking plan and repository");
            check::execute(plan, repository, ctx)
        },
        Commands::Version => {
            show_version(ctx);
            Ok(())
        },
    }
}

fn show_version(ctx: &CommandContext) {
    ctx.output.info(&format!(
        "stevedore v{} ({}-{})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::ARCH,
        std::env::consts::OS
    ));
}

/// Load and validate a plan file
pub fn load_plan(path: &Utf8PathBuf) -> StevedoreResult<PlanToml> {
    let plan = PlanToml::load(path)?;
    plan.validate()?;
    Ok(plan)
}

/// Open the descriptor repository: command line flag first, then the plan,
/// then the default under the home directory.
pub fn open_repository(
    plan: &PlanToml,
    flag: Option<Utf8PathBuf>,
) -> StevedoreResult<FileSource> {
    let root = flag
        .or_else(|| plan.plan.repository.clone().map(Utf8PathBuf::from))
        .or_else(default_repository)
        .ok_or_else(|| StevedoreError::PlanValidation {
            field: "plan.repository".to_string(),
            reason: "no repository configured and no home directory found".to_string(),
        })?;
    FileSource::open(root)
}

fn default_repository() -> Option<Utf8PathBuf> {
    let home = dirs::home_dir()?;
    let path = Utf8PathBuf::from_path_buf(home).ok()?;
    Some(path.join(".stevedore").join("repository"))
}

/// Assemble the root specifications: one per plan artifact, each carrying
/// the management table fetched from the repository overlaid with the plan's
/// own overrides, plus the plan-wide exclusions.
pub fn assemble_roots(
    plan: &PlanToml,
    source: &dyn MetadataSource,
) -> StevedoreResult<Vec<RootSpec>> {
    let overrides = plan.managed()?;
    let excluded = plan.excluded_keys();

    let mut roots = Vec::new();
    for artifact in plan.root_artifacts()? {
        let coordinate = artifact
            .coordinate()
            .ok_or_else(|| StevedoreError::Inconsistent {
                detail: format!("root artifact {} has no version", artifact),
            })?;
        let mut managed = source.dependency_management(&coordinate)?;
        managed.merge(overrides.clone());

        let mut spec = RootSpec::new(artifact).with_managed(managed);
        for key in &excluded {
            spec = spec.exclude(key.clone());
        }
        roots.push(spec);
    }
    Ok(roots)
}

/// Expand the plan's roots into a forest
pub fn build_forest(
    plan: &PlanToml,
    source: &FileSource,
    strict: bool,
) -> StevedoreResult<DependencyForest> {
    let roots = assemble_roots(plan, source)?;
    TreeBuilder::new(source)
        .strict_conflicts(strict || plan.plan.strict_conflicts)
        .build(&roots)
}
