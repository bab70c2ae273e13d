//! C6: the Apply Pipeline (§4.5, `ApplyChanges`).

use tracing::debug;

use crate::driver::{Plan, StatementExecutor};
use crate::error::ApplyError;

/// Executes every statement in `plan` in sequence via `executor`. On the first failure, returns
/// an [`ApplyError`] recording how many statements succeeded before it (P5) and wrapping the
/// executor's error, annotated with that statement's comment when present.
pub fn apply_changes(executor: &mut dyn StatementExecutor, plan: &Plan) -> crate::Result<()> {
    for (index, statement) in plan.statements.iter().enumerate() {
        debug!(statement_index = index, cmd = %statement.cmd, "applying statement");
        if let Err(source) = executor.execute(statement) {
            return Err(ApplyError {
                applied: index,
                statement_comment: statement.comment.clone(),
                source,
            }
            .into());
        }
    }
    debug!(applied = plan.statements.len(), "apply pipeline completed");
    Ok(())
}
