//! Validate the plan file and every descriptor in the repository.

use camino::Utf8PathBuf;

use stevedore_core::error::{StevedoreError, StevedoreResult};
use stevedore_registry::FileSource;

use super::CommandContext;

pub fn execute(
    plan_path: Utf8PathBuf,
    repository: Option<Utf8PathBuf>,
    ctx: &CommandContext,
) -> StevedoreResult<()> {
    let plan = super::load_plan(&plan_path)?;
    ctx.output
        .success(&format!("plan {} is valid", plan_path));

    let source = super::open_repository(&plan, repository)?;
    let paths = source.walk()?;

    let mut invalid = 0;
    for path in &paths {
        if let Err(error) = FileSource::parse_file(path) {
            invalid += 1;
            ctx.output.error(&error.to_string());
        }
    }

    if invalid > 0 {
        return Err(StevedoreError::PlanValidation {
            field: "repository".to_string(),
            reason: format!("{} of {} descriptors failed to parse", invalid, paths.len()),
        });
    }
    ctx.output.success(&format!(
        "{} descriptors in {} are valid",
        paths.len(),
        source.root()
    ));
    Ok(())
}
