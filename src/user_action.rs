//! The standard tutorial step: prompt, read an answer, judge it and
//! optionally run a command in the scratch directory.
use crate::action::{Action, StepContext};
use crate::error::{Result, TutorError};
use crate::exec::CommandLine;
use crate::sandbox;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_PROMPT: &str = "$ ";

/// How an answer is judged.
pub enum AnswerTest {
    /// Equal to this text once both sides are trimmed.
    Exact(String),
    Predicate(Box<dyn Fn(&str) -> bool>),
}

impl AnswerTest {
    pub fn predicate(test: impl Fn(&str) -> bool + 'static) -> Self {
        AnswerTest::Predicate(Box::new(test))
    }

    pub fn matches(&self, input: &str) -> bool {
        match self {
            AnswerTest::Exact(expected) => input.trim() == expected.trim(),
            AnswerTest::Predicate(test) => test(input),
        }
    }
}

impl fmt::Debug for AnswerTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerTest::Exact(expected) => f.debug_tuple("Exact").field(expected).finish(),
            AnswerTest::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<&str> for AnswerTest {
    fn from(expected: &str) -> Self {
        AnswerTest::Exact(expected.to_string())
    }
}

impl From<String> for AnswerTest {
    fn from(expected: String) -> Self {
        AnswerTest::Exact(expected)
    }
}

/// What, if anything, runs after the answer is read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExecutePolicy {
    #[default]
    Never,
    /// Run the user's own input, split into words without a shell.
    UserInput,
    /// Run this fixed argv.
    Argv(Vec<String>),
    /// Run this fixed string through `sh -c`.
    Shell(String),
}

#[derive(Debug)]
pub struct UserAction {
    test: AnswerTest,
    intro: Option<String>,
    onfail: Option<String>,
    postaction: Option<String>,
    hints: BTreeMap<usize, String>,
    prompt: String,
    execute: ExecutePolicy,
    execute_dir: PathBuf,
    scratch_root: Option<PathBuf>,
}

impl UserAction {
    pub fn builder(test: impl Into<AnswerTest>) -> UserActionBuilder {
        UserActionBuilder::new(test.into())
    }

    /// Hint for the failure numbered `attempt`: the one with the greatest
    /// threshold not above it.
    pub fn hint_for(&self, attempt: usize) -> Option<&str> {
        self.hints
            .range(..=attempt)
            .next_back()
            .map(|(_, text)| text.as_str())
    }

    fn command_for(&self, answer: &str) -> Result<Option<CommandLine>> {
        let command = match &self.execute {
            ExecutePolicy::Never => None,
            ExecutePolicy::UserInput => Some(CommandLine::parse_argv(answer)?),
            ExecutePolicy::Argv(argv) => Some(CommandLine::Argv(argv.clone())),
            ExecutePolicy::Shell(script) => Some(CommandLine::Shell(script.clone())),
        };
        Ok(command)
    }
}

impl Action for UserAction {
    /// The first root sticks; later binds are ignored.
    fn bind(&mut self, scratch_root: &Path) {
        if let Some(bound) = &self.scratch_root {
            tracing::warn!(
                bound = %bound.display(),
                ignored = %scratch_root.display(),
                "action already bound to a scratch root"
            );
            return;
        }
        self.scratch_root = Some(scratch_root.to_path_buf());
    }

    fn on_before(&mut self, ctx: &mut StepContext<'_>) {
        ctx.console.print_line("");
        if let Some(intro) = &self.intro {
            ctx.console.print_line(intro);
        }
    }

    fn on_after_success(&mut self, ctx: &mut StepContext<'_>) {
        if let Some(postaction) = &self.postaction {
            ctx.console.print_line(postaction);
        }
    }

    fn on_after_failure(&mut self, ctx: &mut StepContext<'_>, attempt: usize) {
        if let Some(onfail) = &self.onfail {
            ctx.console.print_line(onfail);
        }
        if let Some(hint) = self.hint_for(attempt) {
            ctx.console.print_line(hint);
        }
    }

    fn execute(&mut self, ctx: &mut StepContext<'_>) -> Result<bool> {
        let answer = ctx.console.read_line(&self.prompt)?;
        let verdict = self.test.matches(&answer);
        tracing::debug!(verdict, "answer checked");

        let root = self
            .scratch_root
            .as_deref()
            .ok_or(TutorError::MasterNotBound)?;
        let dir = root.join(&self.execute_dir);

        if let Some(command) = self.command_for(&answer)? {
            let dir = sandbox::check_exec_dir(root, &dir)?;
            sandbox::check_command(root, &dir, &command)?;
            tracing::info!(
                command = %command.display(),
                shell = command.uses_shell(),
                dir = %dir.display(),
                "running step command"
            );
            ctx.runner.run(&command, &dir)?;
        }
        Ok(verdict)
    }

    fn summary(&self) -> String {
        let test = match &self.test {
            AnswerTest::Exact(expected) => format!("expects {expected:?}"),
            AnswerTest::Predicate(_) => "custom check".to_string(),
        };
        let execute = match &self.execute {
            ExecutePolicy::Never => String::new(),
            ExecutePolicy::UserInput => ", runs the answer".to_string(),
            ExecutePolicy::Argv(argv) => {
                format!(", runs `{}`", CommandLine::Argv(argv.clone()).display())
            }
            ExecutePolicy::Shell(script) => format!(", runs `{script}` via sh"),
        };
        format!("{test}{execute}")
    }
}

/// Builder that validates a [`UserAction`] before it can join a chain.
#[derive(Debug)]
pub struct UserActionBuilder {
    test: AnswerTest,
    intro: Option<String>,
    onfail: Option<String>,
    postaction: Option<String>,
    hints: BTreeMap<usize, String>,
    prompt: String,
    execute: ExecutePolicy,
    execute_dir: PathBuf,
}

impl UserActionBuilder {
    fn new(test: AnswerTest) -> Self {
        Self {
            test,
            intro: None,
            onfail: None,
            postaction: None,
            hints: BTreeMap::new(),
            prompt: DEFAULT_PROMPT.to_string(),
            execute: ExecutePolicy::Never,
            execute_dir: PathBuf::from("."),
        }
    }

    pub fn intro(mut self, text: impl Into<String>) -> Self {
        self.intro = Some(text.into());
        self
    }

    pub fn onfail(mut self, text: impl Into<String>) -> Self {
        self.onfail = Some(text.into());
        self
    }

    pub fn postaction(mut self, text: impl Into<String>) -> Self {
        self.postaction = Some(text.into());
        self
    }

    /// Show `text` from failure number `threshold` onwards.
    pub fn hint(mut self, threshold: usize, text: impl Into<String>) -> Self {
        self.hints.insert(threshold, text.into());
        self
    }

    pub fn hints<I, S>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = (usize, S)>,
        S: Into<String>,
    {
        self.hints
            .extend(hints.into_iter().map(|(key, text)| (key, text.into())));
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn execute(mut self, policy: ExecutePolicy) -> Self {
        self.execute = policy;
        self
    }

    /// Working directory for commands, relative to the scratch root.
    pub fn execute_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.execute_dir = dir.into();
        self
    }

    pub fn build(self) -> Result<UserAction> {
        if self.prompt.contains(['\n', '\r']) {
            return Err(TutorError::config("prompt", "must be a single line"));
        }
        if self.execute_dir.is_absolute() {
            return Err(TutorError::config(
                "execute_dir",
                format!(
                    "must be relative to the scratch directory, got {}",
                    self.execute_dir.display()
                ),
            ));
        }
        match &self.execute {
            ExecutePolicy::Argv(argv) if argv.is_empty() => {
                return Err(TutorError::config("execute", "command list is empty"));
            }
            ExecutePolicy::Shell(script) if script.trim().is_empty() => {
                return Err(TutorError::config("execute", "shell command is blank"));
            }
            _ => {}
        }
        Ok(UserAction {
            test: self.test,
            intro: self.intro,
            onfail: self.onfail,
            postaction: self.postaction,
            hints: self.hints,
            prompt: self.prompt,
            execute: self.execute,
            execute_dir: self.execute_dir,
            scratch_root: None,
        })
    }
}
