//! Print the materialized dependency trees.

use camino::Utf8PathBuf;

use stevedore_core::error::StevedoreResult;

use super::CommandContext;

pub fn execute(
    plan_path: Utf8PathBuf,
    repository: Option<Utf8PathBuf>,
    ctx: &CommandContext,
) -> StevedoreResult<()> {
    let plan = super::load_plan(&plan_path)?;
    let source = super::open_repository(&plan, repository)?;
    let forest = super::build_forest(&plan, &source, false)?;

    print!("{}", forest.render());
    ctx.output.info(&format!(
        "{} nodes, {} included, {} omitted",
        forest.len(),
        forest.included_count(),
        forest.omitted_count()
    ));
    Ok(())
}
