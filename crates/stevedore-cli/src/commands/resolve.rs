//! Resolve a plan into an ordered launch list.

use std::fs;

use camino::Utf8PathBuf;
use tracing::info;

use stevedore_core::error::{StevedoreError, StevedoreResult};
use stevedore_core::types::ScopeFilter;
use stevedore_resolver::{build_index, launch_order, LaunchOptions};

use super::CommandContext;

pub fn execute(
    plan_path: Utf8PathBuf,
    repository: Option<Utf8PathBuf>,
    output_path: Option<Utf8PathBuf>,
    strict: bool,
    ctx: &CommandContext,
) -> StevedoreResult<()> {
    let plan = super::load_plan(&plan_path)?;
    let source = super::open_repository(&plan, repository)?;
    let forest = super::build_forest(&plan, &source, strict)?;

    let filter = ScopeFilter::default();
    let index = build_index(&forest, &filter)?;
    let directives = plan.start_directives();
    let options = LaunchOptions {
        directives: &directives,
        strict_conflicts: strict || plan.plan.strict_conflicts,
    };
    let descriptors = launch_order(&forest, &index, &source, &filter, &options)?;

    info!(
        included = forest.included_count(),
        omitted = forest.omitted_count(),
        launched = descriptors.len(),
        "launch list resolved"
    );

    let mut listing = String::new();
    for descriptor in &descriptors {
        listing.push_str(&descriptor.render(&plan.plan.scheme));
        listing.push('\n');
    }

    match output_path {
        Some(path) => {
            fs::write(&path, listing)
                .map_err(|e| StevedoreError::io(format!("failed to write {}", path), e))?;
            ctx.output.success(&format!(
                "wrote {} launch entries to {} ({} artifacts resolved, {} omitted nodes)",
                descriptors.len(),
                path,
                forest.included_count(),
                forest.omitted_count()
            ));
        },
        None => {
            // The launch list itself is the contract; keep stdout clean
            print!("{}", listing);
        },
    }
    Ok(())
}
