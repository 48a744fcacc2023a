//! Built-in tutorials shipped with the binary.
use crate::error::{Result, TutorError};
use crate::master::{MasterOptions, TutorialMaster};
use crate::user_action::{AnswerTest, ExecutePolicy, UserAction};
use std::fs;
use std::path::Path;

const DEFAULT_FAIL: &str = "Nope, that's not right";

/// Name and one-line description of every demo.
pub const DEMOS: &[(&str, &str)] = &[
    (
        "conversation",
        "Type three phrases back; nothing is executed",
    ),
    (
        "shell",
        "Run a few shell commands inside a scratch directory",
    ),
];

pub fn build_demo(name: &str) -> Result<TutorialMaster> {
    match name {
        "conversation" => conversation(),
        "shell" => shell(),
        other => Err(TutorError::config(
            "demo",
            format!(
                "unknown demo '{other}' (available: {})",
                DEMOS
                    .iter()
                    .map(|(name, _)| *name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        )),
    }
}

fn conversation() -> Result<TutorialMaster> {
    let mut master = TutorialMaster::new(MasterOptions {
        scratch_prefix: Some("tutor-conversation-".to_string()),
        ..MasterOptions::default()
    })?;
    for phrase in ["Hello world!", "I am hungry.", "Goodbye world!"] {
        master.add_action(
            UserAction::builder(phrase)
                .intro(format!("Say \"{phrase}\""))
                .onfail(DEFAULT_FAIL)
                .build()?,
        );
    }
    Ok(master)
}

fn shell() -> Result<TutorialMaster> {
    let mut master = TutorialMaster::new(MasterOptions {
        scratch_prefix: Some("tutor-shell-".to_string()),
        ..MasterOptions::default()
    })?;
    seed_shell_lesson(master.scratch_root())?;

    master.add_action(
        UserAction::builder("ls")
            .intro("You are in a fresh scratch directory. List its contents with ls.")
            .onfail(DEFAULT_FAIL)
            .hint(1, "The command is two letters long.")
            .execute(ExecutePolicy::UserInput)
            .build()?,
    );
    master.add_action(
        UserAction::builder(AnswerTest::predicate(|input| {
            let words: Vec<&str> = input.split_whitespace().collect();
            words.first() == Some(&"cat") && words.contains(&"notes.txt")
        }))
        .intro("Print notes.txt with cat.")
        .onfail(DEFAULT_FAIL)
        .hints([
            (0, "Use cat followed by a file name."),
            (2, "Type: cat notes.txt"),
        ])
        .execute(ExecutePolicy::UserInput)
        .build()?,
    );
    master.add_action(
        UserAction::builder("mkdir practice")
            .intro("Make a directory called practice.")
            .onfail(DEFAULT_FAIL)
            .hint(1, "Type: mkdir practice")
            .postaction("Directories keep related files together.")
            .execute(ExecutePolicy::UserInput)
            .build()?,
    );
    master.add_action(
        UserAction::builder("touch hello.txt")
            .intro("The working directory is now practice. Create an empty file hello.txt.")
            .onfail(DEFAULT_FAIL)
            .hint(0, "touch creates empty files.")
            .execute(ExecutePolicy::UserInput)
            .execute_dir("practice")
            .build()?,
    );
    master.add_action(
        UserAction::builder(AnswerTest::predicate(|input| {
            matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
        }))
        .intro("Here is everything you made. Ready to finish? (yes/no)")
        .prompt("> ")
        .execute(ExecutePolicy::Argv(vec![
            "ls".to_string(),
            "-R".to_string(),
            ".".to_string(),
        ]))
        .build()?,
    );
    Ok(master)
}

fn seed_shell_lesson(root: &Path) -> Result<()> {
    let files = [
        (
            "notes.txt",
            "Shell commands read and write files in the current directory.\n",
        ),
        (
            "todo.txt",
            "1. list files\n2. read notes\n3. make a directory\n",
        ),
    ];
    for (name, text) in files {
        let path = root.join(name);
        fs::write(&path, text)
            .map_err(|err| TutorError::io(format!("write {}", path.display()), err))?;
    }
    Ok(())
}
