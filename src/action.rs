use crate::console::Console;
use crate::error::Result;
use crate::exec::CommandRunner;
use std::path::Path;

/// Collaborators handed to an action for one call.
pub struct StepContext<'a> {
    pub console: &'a mut dyn Console,
    pub runner: &'a mut dyn CommandRunner,
}

/// One step of a tutorial.
///
/// The master calls [`Action::on_before`] ahead of every attempt, then
/// [`Action::execute`]. A `true` verdict is followed by
/// [`Action::on_after_success`] and the chain advances; `false` is followed by
/// [`Action::on_after_failure`] with the number of earlier failed attempts,
/// and the same action runs again.
pub trait Action {
    /// Called by the master at registration with the run's scratch root.
    fn bind(&mut self, _scratch_root: &Path) {}

    fn on_before(&mut self, _ctx: &mut StepContext<'_>) {}

    fn on_after_success(&mut self, _ctx: &mut StepContext<'_>) {}

    /// `attempt` is zero for the first failure of this action.
    fn on_after_failure(&mut self, _ctx: &mut StepContext<'_>, _attempt: usize) {}

    /// Perform the step and return the verdict.
    ///
    /// An `Err` aborts the whole run.
    fn execute(&mut self, ctx: &mut StepContext<'_>) -> Result<bool>;

    /// Short human-readable description used in logs and summaries.
    fn summary(&self) -> String {
        "custom action".to_string()
    }
}
