//! CLI argument parsing for the tutorial runner.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "tutor",
    version,
    about = "Interactive, line-oriented tutorials with a sandboxed scratch directory",
    after_help = "Examples:\n  tutor demo\n  tutor demo shell\n  \
                  tutor check lessons/files.json\n  \
                  tutor run lessons/files.json --template lessons/files",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Log engine decisions to stderr (RUST_LOG overrides)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Run(RunArgs),
    Check(CheckArgs),
    Demo(DemoArgs),
}

/// Run command inputs for a tutorial script.
#[derive(Parser, Debug)]
#[command(about = "Run a tutorial script")]
pub struct RunArgs {
    /// Path to the tutorial script (JSON)
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Seed the scratch directory from this directory instead of the script's template_dir
    #[arg(long, value_name = "DIR")]
    pub template: Option<PathBuf>,

    /// Name prefix for the scratch directory
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,
}

/// Check command inputs for validating a script without running it.
#[derive(Parser, Debug)]
#[command(about = "Validate a tutorial script and summarize its steps")]
pub struct CheckArgs {
    /// Path to the tutorial script (JSON)
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,
}

#[derive(Parser, Debug)]
#[command(about = "Run a built-in demo, or list them when no name is given")]
pub struct DemoArgs {
    /// Demo to run
    #[arg(value_name = "NAME")]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        RootArgs::command().debug_assert();
    }

    #[test]
    fn run_accepts_overrides() {
        let args = RootArgs::try_parse_from([
            "tutor",
            "run",
            "lesson.json",
            "--template",
            "seed",
            "--prefix",
            "lesson-",
            "--verbose",
        ])
        .unwrap();
        assert!(args.verbose);
        match args.command {
            Command::Run(run) => {
                assert_eq!(run.script, PathBuf::from("lesson.json"));
                assert_eq!(run.template, Some(PathBuf::from("seed")));
                assert_eq!(run.prefix.as_deref(), Some("lesson-"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn demo_name_is_optional() {
        let args = RootArgs::try_parse_from(["tutor", "demo"]).unwrap();
        assert!(matches!(args.command, Command::Demo(DemoArgs { name: None })));
    }
}
