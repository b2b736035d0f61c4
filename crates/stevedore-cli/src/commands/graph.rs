//! Export the resolved graph in DOT format.

use std::fs;

use camino::Utf8PathBuf;

use stevedore_core::error::{StevedoreError, StevedoreResult};
use stevedore_core::types::ScopeFilter;
use stevedore_resolver::{build_index, ResolvedGraph};

use super::CommandContext;

pub fn execute(
    plan_path: Utf8PathBuf,
    repository: Option<Utf8PathBuf>,
    output_path: Option<Utf8PathBuf>,
    ctx: &CommandContext,
) -> StevedoreResult<()> {
    let plan = super::load_plan(&plan_path)?;
    let source = super::open_repository(&plan, repository)?;
    let forest = super::build_forest(&plan, &source, false)?;

    let filter = ScopeFilter::default();
    let index = build_index(&forest, &filter)?;
    let graph = ResolvedGraph::from_forest(&forest, &index)?;
    let dot = graph.to_dot();

    match output_path {
        Some(path) => {
            fs::write(&path, dot)
                .map_err(|e| StevedoreError::io(format!("failed to write {}", path), e))?;
            ctx.output.success(&format!(
                "wrote {} artifacts and {} edges to {}",
                graph.artifact_count(),
                graph.dependency_count(),
                path
            ));
        },
        None => print!("{}", dot),
    }
    Ok(())
}
