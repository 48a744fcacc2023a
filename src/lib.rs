//! Line-oriented interactive tutorials.
//!
//! A [`TutorialMaster`] owns an ordered chain of [`Action`]s and a scratch
//! directory. Each action prompts for an answer, judges it and may run a
//! command confined to the scratch directory; wrong answers repeat the step
//! with escalating hints until the chain is done.
pub mod action;
pub mod console;
pub mod demos;
pub mod error;
pub mod exec;
pub mod master;
pub mod sandbox;
pub mod script;
pub mod user_action;

pub use action::{Action, StepContext};
pub use console::{Console, ScriptedConsole, StdConsole};
pub use error::{Result, TutorError};
pub use exec::{CommandLine, CommandRunner, RecordingRunner, SystemRunner};
pub use master::{MasterOptions, RunReport, TutorialMaster};
pub use sandbox::Sandbox;
pub use script::{load_script, TutorialScript};
pub use user_action::{AnswerTest, ExecutePolicy, UserAction, UserActionBuilder};
