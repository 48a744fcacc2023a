//! Tutorial definitions stored as JSON.
//!
//! A script names the tutorial, optionally a template directory to seed the
//! scratch directory from, and the ordered steps:
//!
//! ```json
//! {
//!   "name": "files",
//!   "template_dir": "lesson",
//!   "steps": [
//!     { "expect": "ls", "intro": "List the files.", "execute": true,
//!       "hints": { "0": "The command is two letters." } }
//!   ]
//! }
//! ```
use crate::error::{Result, TutorError};
use crate::master::{MasterOptions, TutorialMaster};
use crate::user_action::{AnswerTest, ExecutePolicy, UserAction};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const USER_KIND: &str = "user";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TutorialScript {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub scratch_prefix: Option<String>,
    /// Resolved against the script's directory.
    #[serde(default)]
    pub template_dir: Option<PathBuf>,
    #[serde(default)]
    pub completion_message: Option<String>,
    pub steps: Vec<StepSpec>,
    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepSpec {
    #[serde(default)]
    pub kind: Option<String>,
    /// Literal answer, compared after trimming.
    #[serde(default)]
    pub expect: Option<String>,
    /// Regular expression the trimmed answer must match in full.
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub intro: Option<String>,
    #[serde(default)]
    pub onfail: Option<String>,
    #[serde(default)]
    pub postaction: Option<String>,
    #[serde(default)]
    pub hints: BTreeMap<String, Value>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub execute: Value,
    #[serde(default)]
    pub execute_dir: Option<String>,
}

pub fn load_script(path: &Path) -> Result<TutorialScript> {
    let text = fs::read_to_string(path)
        .map_err(|err| TutorError::io(format!("read script {}", path.display()), err))?;
    let mut script = parse_script(&text)
        .map_err(|err| with_context(err, &path.display().to_string()))?;
    script.base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    tracing::debug!(
        path = %path.display(),
        name = %script.name,
        steps = script.steps.len(),
        "script loaded"
    );
    Ok(script)
}

pub fn parse_script(text: &str) -> Result<TutorialScript> {
    let script: TutorialScript =
        serde_json::from_str(text).map_err(|err| TutorError::config("script", err.to_string()))?;
    Ok(script)
}

fn with_context(err: TutorError, source: &str) -> TutorError {
    match err {
        TutorError::Configuration { field, reason } => TutorError::Configuration {
            field,
            reason: format!("{reason} (in {source})"),
        },
        other => other,
    }
}

impl TutorialScript {
    /// Options for the master, with `template_dir` made absolute.
    pub fn master_options(&self) -> MasterOptions {
        let options = MasterOptions {
            scratch_prefix: self.scratch_prefix.clone(),
            template_dir: self
                .template_dir
                .as_ref()
                .map(|dir| self.base_dir.join(dir)),
            ..MasterOptions::default()
        };
        match &self.completion_message {
            Some(message) => options.completion_message(message.clone()),
            None => options,
        }
    }

    /// Validate every step and build the actions in order.
    pub fn actions(&self) -> Result<Vec<UserAction>> {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, step)| step.to_action(index))
            .collect()
    }

    /// Build a ready-to-start master; nothing is created on disk unless
    /// every step is valid.
    pub fn build_master(&self, options: MasterOptions) -> Result<TutorialMaster> {
        let actions = self.actions()?;
        let mut master = TutorialMaster::new(options)?;
        for action in actions {
            master.add_action(action);
        }
        Ok(master)
    }
}

impl StepSpec {
    fn to_action(&self, index: usize) -> Result<UserAction> {
        let field = |name: &str| format!("steps[{index}].{name}");

        let kind = self.kind.as_deref().unwrap_or(USER_KIND);
        if kind != USER_KIND {
            return Err(TutorError::TypeConstraint(kind.to_string()));
        }

        let test = match (&self.expect, &self.pattern) {
            (Some(expected), None) => AnswerTest::Exact(expected.clone()),
            (None, Some(pattern)) => {
                let regex = Regex::new(&format!("^(?:{pattern})$"))
                    .map_err(|err| TutorError::config(field("pattern"), err.to_string()))?;
                AnswerTest::predicate(move |input| regex.is_match(input.trim()))
            }
            (Some(_), Some(_)) => {
                return Err(TutorError::config(
                    field("expect"),
                    "give either expect or pattern, not both",
                ))
            }
            (None, None) => {
                return Err(TutorError::config(
                    field("expect"),
                    "one of expect or pattern is required",
                ))
            }
        };

        let hints =
            parse_hints(&self.hints).map_err(|reason| TutorError::config(field("hints"), reason))?;
        let execute = parse_execute(&self.execute)
            .map_err(|reason| TutorError::config(field("execute"), reason))?;
        let mut builder = UserAction::builder(test).hints(hints).execute(execute);
        if let Some(intro) = &self.intro {
            builder = builder.intro(intro.clone());
        }
        if let Some(onfail) = &self.onfail {
            builder = builder.onfail(onfail.clone());
        }
        if let Some(postaction) = &self.postaction {
            builder = builder.postaction(postaction.clone());
        }
        if let Some(prompt) = &self.prompt {
            builder = builder.prompt(prompt.clone());
        }
        if let Some(dir) = &self.execute_dir {
            builder = builder.execute_dir(dir);
        }
        builder.build().map_err(|err| match err {
            TutorError::Configuration { field: name, reason } => {
                TutorError::config(field(&name), reason)
            }
            other => other,
        })
    }
}

fn parse_hints(
    raw: &BTreeMap<String, Value>,
) -> std::result::Result<BTreeMap<usize, String>, String> {
    let mut hints = BTreeMap::new();
    for (key, value) in raw {
        let threshold = key
            .trim()
            .parse::<usize>()
            .map_err(|_| format!("key {key:?} is not a non-negative integer"))?;
        let text = value
            .as_str()
            .ok_or_else(|| format!("hint for {key} must be a string, got {value}"))?;
        if hints.insert(threshold, text.to_string()).is_some() {
            return Err(format!("more than one hint for threshold {threshold}"));
        }
    }
    Ok(hints)
}

fn parse_execute(raw: &Value) -> std::result::Result<ExecutePolicy, String> {
    match raw {
        Value::Null | Value::Bool(false) => Ok(ExecutePolicy::Never),
        Value::Bool(true) => Ok(ExecutePolicy::UserInput),
        Value::String(script) => Ok(ExecutePolicy::Shell(script.clone())),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| format!("command list entries must be strings, got {item}"))
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(ExecutePolicy::Argv),
        other => Err(format!(
            "must be a boolean, a list of strings or a string, got {other}"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, StepContext};
    use crate::console::ScriptedConsole;
    use crate::exec::RecordingRunner;

    fn config_field(text: &str) -> String {
        let script = parse_script(text).unwrap();
        match script.actions().unwrap_err() {
            TutorError::Configuration { field, .. } => field,
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn parses_full_step() {
        let script = parse_script(
            r#"{
                "name": "files",
                "description": "Look around",
                "steps": [
                    {
                        "expect": "ls",
                        "intro": "List the files.",
                        "onfail": "Not quite.",
                        "postaction": "Nice.",
                        "hints": { "0": "Two letters.", "2": "Type ls" },
                        "prompt": "> ",
                        "execute": true,
                        "execute_dir": "."
                    },
                    { "pattern": "cat (notes|todo)\\.txt", "execute": ["cat", "notes.txt"] },
                    { "expect": "done", "execute": "echo done > log.txt" }
                ]
            }"#,
        )
        .unwrap();
        let actions = script.actions().unwrap();
        assert_eq!(actions.len(), 3);
        assert_eq!(actions[0].hint_for(1), Some("Two letters."));
        assert_eq!(actions[0].hint_for(2), Some("Type ls"));
        assert_eq!(actions[1].summary(), "custom check, runs `cat notes.txt`");
        assert_eq!(
            actions[2].summary(),
            "expects \"done\", runs `echo done > log.txt` via sh"
        );
    }

    #[test]
    fn pattern_matches_whole_trimmed_answer() {
        let script = parse_script(
            r#"{ "name": "p", "steps": [ { "pattern": "ls( -l)?" } ] }"#,
        )
        .unwrap();
        let mut action = script.actions().unwrap().remove(0);
        let root = tempfile::tempdir().unwrap();
        action.bind(root.path());
        let mut runner = RecordingRunner::default();
        let mut verdicts = Vec::new();
        for input in ["ls", "  ls -l ", "ls -la", "cd; ls"] {
            let mut console = ScriptedConsole::new([input]);
            let mut ctx = StepContext {
                console: &mut console,
                runner: &mut runner,
            };
            verdicts.push(action.execute(&mut ctx).unwrap());
        }
        assert_eq!(verdicts, [true, true, false, false]);
    }

    #[test]
    fn non_string_hint_is_a_configuration_error() {
        let field = config_field(
            r#"{ "name": "h", "steps": [ { "expect": "x", "hints": { "0": 5 } } ] }"#,
        );
        assert_eq!(field, "steps[0].hints");
    }

    #[test]
    fn negative_hint_key_is_a_configuration_error() {
        let field = config_field(
            r#"{ "name": "h", "steps": [ { "expect": "x" }, { "expect": "y", "hints": { "-1": "no" } } ] }"#,
        );
        assert_eq!(field, "steps[1].hints");
    }

    #[test]
    fn duplicate_hint_thresholds_are_rejected() {
        assert_eq!(
            config_field(
                r#"{"name": "h", "steps": [{"expect": "x", "hints": {"0": "a", "00": "b"}}]}"#
            ),
            "steps[0].hints"
        );
        assert_eq!(
            config_field(
                r#"{"name": "h", "steps": [{"expect": "x", "hints": {"1": "a", "+1": "b"}}]}"#
            ),
            "steps[0].hints"
        );
    }

    #[test]
    fn bad_execute_values_are_rejected() {
        assert_eq!(
            config_field(r#"{ "name": "e", "steps": [ { "expect": "x", "execute": 3 } ] }"#),
            "steps[0].execute"
        );
        assert_eq!(
            config_field(
                r#"{ "name": "e", "steps": [ { "expect": "x", "execute": ["ls", 1] } ] }"#
            ),
            "steps[0].execute"
        );
        assert_eq!(
            config_field(r#"{ "name": "e", "steps": [ { "expect": "x", "execute": [] } ] }"#),
            "steps[0].execute"
        );
    }

    #[test]
    fn test_field_must_be_unambiguous() {
        assert_eq!(
            config_field(r#"{ "name": "t", "steps": [ { "intro": "hi" } ] }"#),
            "steps[0].expect"
        );
        assert_eq!(
            config_field(
                r#"{ "name": "t", "steps": [ { "expect": "a", "pattern": "a" } ] }"#
            ),
            "steps[0].expect"
        );
        assert_eq!(
            config_field(r#"{ "name": "t", "steps": [ { "pattern": "(" } ] }"#),
            "steps[0].pattern"
        );
    }

    #[test]
    fn builder_errors_carry_step_path() {
        assert_eq!(
            config_field(
                r#"{ "name": "d", "steps": [ { "expect": "x", "execute_dir": "/etc" } ] }"#
            ),
            "steps[0].execute_dir"
        );
    }

    #[test]
    fn unknown_kind_is_a_type_constraint_error() {
        let script = parse_script(
            r#"{ "name": "k", "steps": [ { "kind": "quiz", "expect": "x" } ] }"#,
        )
        .unwrap();
        let err = script.actions().unwrap_err();
        assert!(matches!(err, TutorError::TypeConstraint(kind) if kind == "quiz"));
    }

    #[test]
    fn wrong_json_types_are_configuration_errors() {
        let err = parse_script(r#"{ "name": "w", "steps": [ { "expect": "x", "intro": 1 } ] }"#)
            .unwrap_err();
        assert!(matches!(err, TutorError::Configuration { .. }));
        let err = parse_script(r#"{ "name": "w", "steps": [], "extra": true }"#).unwrap_err();
        assert!(matches!(err, TutorError::Configuration { .. }));
    }

    #[test]
    fn load_resolves_template_relative_to_script() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("lesson")).unwrap();
        fs::write(dir.path().join("lesson/notes.txt"), "notes").unwrap();
        let script_path = dir.path().join("files.json");
        fs::write(
            &script_path,
            r#"{ "name": "files", "template_dir": "lesson", "scratch_prefix": "files-",
                 "completion_message": "Finished.", "steps": [ { "expect": "ok" } ] }"#,
        )
        .unwrap();

        let script = load_script(&script_path).unwrap();
        let options = script.master_options();
        assert_eq!(options.template_dir, Some(dir.path().join("lesson")));

        let mut master = script.build_master(options).unwrap();
        assert!(master.scratch_root().join("notes.txt").is_file());
        let mut console = ScriptedConsole::new(["ok"]);
        master.start(&mut console).unwrap();
        assert_eq!(console.output().last().map(String::as_str), Some("Finished."));
        master.finish().unwrap();
    }
}
