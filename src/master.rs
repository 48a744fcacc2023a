//! The tutorial chain and the state machine that drives it.
use crate::action::{Action, StepContext};
use crate::console::Console;
use crate::error::Result;
use crate::exec::{CommandRunner, SystemRunner};
use crate::sandbox::Sandbox;
use std::fmt;
use std::path::{Path, PathBuf};

/// Called once when the last action succeeds.
pub type CompletionHook = Box<dyn FnMut(&mut dyn Console)>;

/// Construction options for a [`TutorialMaster`].
pub struct MasterOptions {
    /// Name prefix for the scratch directory.
    pub scratch_prefix: Option<String>,
    /// Directory whose contents seed the scratch directory.
    pub template_dir: Option<PathBuf>,
    pub on_complete: CompletionHook,
}

impl Default for MasterOptions {
    fn default() -> Self {
        Self {
            scratch_prefix: None,
            template_dir: None,
            on_complete: Box::new(standard_completion),
        }
    }
}

impl MasterOptions {
    /// Replace the completion hook with one that prints `message`.
    pub fn completion_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.on_complete = Box::new(move |console: &mut dyn Console| {
            for line in message.lines() {
                console.print_line(line);
            }
        });
        self
    }
}

impl fmt::Debug for MasterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterOptions")
            .field("scratch_prefix", &self.scratch_prefix)
            .field("template_dir", &self.template_dir)
            .finish_non_exhaustive()
    }
}

pub fn standard_completion(console: &mut dyn Console) {
    console.print_line("Congratulations! You have completed the tutorial.");
    console.print_line("Goodbye.");
}

/// Outcome of a completed run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Failed attempts before each step succeeded, in chain order.
    pub failed_attempts: Vec<usize>,
}

impl RunReport {
    pub fn total_failures(&self) -> usize {
        self.failed_attempts.iter().sum()
    }
}

/// Owns the chain of actions and the scratch directory they run in.
pub struct TutorialMaster {
    actions: Vec<Box<dyn Action>>,
    on_complete: CompletionHook,
    runner: Box<dyn CommandRunner>,
    sandbox: Sandbox,
}

impl TutorialMaster {
    /// Create the master and its scratch directory.
    pub fn new(options: MasterOptions) -> Result<Self> {
        let MasterOptions {
            scratch_prefix,
            template_dir,
            on_complete,
        } = options;
        let sandbox = Sandbox::create(scratch_prefix.as_deref(), template_dir.as_deref())?;
        Ok(Self {
            actions: Vec::new(),
            on_complete,
            runner: Box::new(SystemRunner),
            sandbox,
        })
    }

    /// Swap the process runner used by every action.
    pub fn with_runner(mut self, runner: impl CommandRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    pub fn scratch_root(&self) -> &Path {
        self.sandbox.root()
    }

    /// Append `action` to the end of the chain.
    pub fn add_action(&mut self, action: impl Action + 'static) {
        let mut action: Box<dyn Action> = Box::new(action);
        action.bind(self.sandbox.root());
        tracing::debug!(
            step = self.actions.len(),
            summary = %action.summary(),
            "action registered"
        );
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn summaries(&self) -> Vec<String> {
        self.actions.iter().map(|action| action.summary()).collect()
    }

    /// Drive the chain to the end.
    ///
    /// A failed attempt repeats the same action with the attempt count
    /// raised by one; there is no retry limit. Any error aborts the run
    /// where it stands and the completion hook does not fire.
    pub fn start(&mut self, console: &mut dyn Console) -> Result<RunReport> {
        let Self {
            actions,
            on_complete,
            runner,
            ..
        } = self;
        let mut ctx = StepContext {
            console,
            runner: runner.as_mut(),
        };
        let mut report = RunReport {
            failed_attempts: vec![0; actions.len()],
        };

        let mut step = 0;
        let mut attempt = 0;
        while let Some(action) = actions.get_mut(step) {
            action.on_before(&mut ctx);
            if action.execute(&mut ctx)? {
                action.on_after_success(&mut ctx);
                tracing::info!(step, failures = attempt, "step complete");
                report.failed_attempts[step] = attempt;
                attempt = 0;
                step += 1;
            } else {
                action.on_after_failure(&mut ctx, attempt);
                tracing::debug!(step, attempt, "step failed");
                attempt += 1;
            }
        }

        tracing::info!(
            steps = report.failed_attempts.len(),
            failures = report.total_failures(),
            "tutorial complete"
        );
        on_complete(&mut *ctx.console);
        Ok(report)
    }

    /// Tear down the scratch directory.
    pub fn finish(self) -> Result<()> {
        self.sandbox.close()
    }
}

impl fmt::Debug for TutorialMaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TutorialMaster")
            .field("actions", &self.actions.len())
            .field("sandbox", &self.sandbox)
            .finish_non_exhaustive()
    }
}
