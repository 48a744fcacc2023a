//! Line-oriented terminal collaborators.
//!
//! The engine never touches stdin/stdout directly; it reads and prints whole
//! lines through [`Console`] so runs can be scripted in tests.
use crate::error::{Result, TutorError};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

pub trait Console {
    /// Show `prompt` and block until one line of input arrives.
    ///
    /// The returned text has its trailing newline removed.
    fn read_line(&mut self, prompt: &str) -> Result<String>;

    fn print_line(&mut self, text: &str);
}

/// Console bound to the process stdin and stdout.
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(prompt.as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(|err| TutorError::io("write prompt", err))?;
        drop(stdout);

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|err| TutorError::io("read input line", err))?;
        if read == 0 {
            return Err(TutorError::InputClosed);
        }
        Ok(strip_newline(line))
    }

    fn print_line(&mut self, text: &str) {
        println!("{text}");
    }
}

fn strip_newline(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

/// In-memory console fed from a fixed list of answers.
///
/// Every printed line and every prompt shown is recorded so callers can
/// assert on the transcript afterwards.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    output: Vec<String>,
    prompts: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            output: Vec::new(),
            prompts: Vec::new(),
        }
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn remaining_inputs(&self) -> usize {
        self.inputs.len()
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.inputs.pop_front().ok_or(TutorError::InputClosed)
    }

    fn print_line(&mut self, text: &str) {
        self.output.push(text.to_string());
    }
}
