//! Process execution for tutorial steps.
use crate::error::{Result, TutorError};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// A command ready to run inside the scratch directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandLine {
    /// Program plus arguments, spawned directly.
    Argv(Vec<String>),
    /// A string handed to `sh -c`.
    Shell(String),
}

impl CommandLine {
    /// Split raw input the way a shell would, without interpreting it.
    pub fn parse_argv(input: &str) -> Result<Self> {
        let argv = shell_words::split(input).map_err(|err| TutorError::Execution {
            command: input.to_string(),
            reason: format!("cannot parse command line: {err}"),
        })?;
        Ok(CommandLine::Argv(argv))
    }

    pub fn uses_shell(&self) -> bool {
        matches!(self, CommandLine::Shell(_))
    }

    /// Render for logs and error messages.
    pub fn display(&self) -> String {
        match self {
            CommandLine::Argv(argv) => argv
                .iter()
                .map(String::as_str)
                .map(shell_quote)
                .collect::<Vec<_>>()
                .join(" "),
            CommandLine::Shell(script) => script.clone(),
        }
    }
}

pub trait CommandRunner {
    /// Run `command` to completion in `dir`.
    ///
    /// A spawn failure or a non-zero exit is an [`TutorError::Execution`].
    fn run(&mut self, command: &CommandLine, dir: &Path) -> Result<()>;
}

/// Runs commands as real child processes with inherited stdio.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, command: &CommandLine, dir: &Path) -> Result<()> {
        let mut cmd = match command {
            CommandLine::Argv(argv) => {
                let (program, args) = argv.split_first().ok_or_else(|| TutorError::Execution {
                    command: String::new(),
                    reason: "empty command".to_string(),
                })?;
                let mut cmd = Command::new(program);
                cmd.args(args);
                cmd
            }
            CommandLine::Shell(script) => {
                let mut cmd = Command::new("sh");
                cmd.arg("-c").arg(script);
                cmd
            }
        };
        cmd.current_dir(dir);

        let rendered = command.display();
        let status = cmd.status().map_err(|err| TutorError::Execution {
            command: rendered.clone(),
            reason: format!("spawn failed: {err}"),
        })?;
        tracing::info!(
            command = %rendered,
            dir = %dir.display(),
            status = %exit_status_string(&status),
            "command finished"
        );
        if !status.success() {
            return Err(TutorError::Execution {
                command: rendered,
                reason: format!("exited with status {}", exit_status_string(&status)),
            });
        }
        Ok(())
    }
}

/// Records commands instead of running them.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    pub calls: Vec<(CommandLine, PathBuf)>,
    pub fail_with: Option<String>,
}

impl RecordingRunner {
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            calls: Vec::new(),
            fail_with: Some(reason.into()),
        }
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, command: &CommandLine, dir: &Path) -> Result<()> {
        self.calls.push((command.clone(), dir.to_path_buf()));
        match &self.fail_with {
            Some(reason) => Err(TutorError::Execution {
                command: command.display(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn exit_status_string(status: &ExitStatus) -> String {
    if let Some(code) = status.code() {
        format!("{code}")
    } else {
        "terminated by signal".to_string()
    }
}

fn shell_quote(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }
    let safe = arg.chars().all(|ch| {
        matches!(
            ch,
            'a'..='z'
                | 'A'..='Z'
                | '0'..='9'
                | '_'
                | '-'
                | '.'
                | '/'
                | ':'
                | '@'
                | '+'
                | '='
        )
    });
    if safe {
        return arg.to_string();
    }
    let escaped = arg.replace('\'', "'\"'\"'");
    format!("'{escaped}'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_argv_strips_quotes_without_interpreting() {
        let command = CommandLine::parse_argv(r#"grep "two words" notes.txt; rm"#).unwrap();
        assert_eq!(
            command,
            CommandLine::Argv(vec![
                "grep".to_string(),
                "two words".to_string(),
                "notes.txt;".to_string(),
                "rm".to_string(),
            ])
        );
        assert!(!command.uses_shell());
    }

    #[test]
    fn parse_argv_rejects_unbalanced_quotes() {
        let err = CommandLine::parse_argv("echo 'oops").unwrap_err();
        assert!(matches!(err, TutorError::Execution { .. }));
    }

    #[test]
    fn display_quotes_only_when_needed() {
        let command = CommandLine::Argv(vec![
            "echo".to_string(),
            "it's".to_string(),
            String::new(),
            "a/b".to_string(),
        ]);
        assert_eq!(command.display(), r#"echo 'it'"'"'s' '' a/b"#);
        assert_eq!(CommandLine::Shell("ls | wc".into()).display(), "ls | wc");
    }

    #[test]
    fn system_runner_reports_non_zero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = SystemRunner;
        let ok = runner.run(&CommandLine::Shell("exit 0".into()), dir.path());
        if ok.is_err() {
            // no usable `sh` on this host
            return;
        }
        let err = runner
            .run(&CommandLine::Shell("exit 3".into()), dir.path())
            .unwrap_err();
        match err {
            TutorError::Execution { reason, .. } => assert!(reason.contains('3'), "{reason}"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn system_runner_rejects_empty_argv() {
        let dir = tempfile::tempdir().unwrap();
        let err = SystemRunner
            .run(&CommandLine::Argv(Vec::new()), dir.path())
            .unwrap_err();
        assert!(matches!(err, TutorError::Execution { .. }));
    }

    #[test]
    fn system_runner_reports_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = SystemRunner
            .run(
                &CommandLine::Argv(vec!["definitely-not-a-real-program-xyz".into()]),
                dir.path(),
            )
            .unwrap_err();
        match err {
            TutorError::Execution { reason, .. } => assert!(reason.starts_with("spawn failed")),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
