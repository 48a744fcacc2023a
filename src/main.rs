use anyhow::{Context, Result};
use clap::Parser;
use tutor::demos::{build_demo, DEMOS};
use tutor::{load_script, Action, StdConsole, TutorialMaster};

mod cli;
use cli::{CheckArgs, Command, DemoArgs, RootArgs, RunArgs};

fn main() -> Result<()> {
    let args = RootArgs::parse();

    let default_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match args.command {
        Command::Run(args) => cmd_run(args),
        Command::Check(args) => cmd_check(args),
        Command::Demo(args) => cmd_demo(args),
    }
}

fn cmd_run(args: RunArgs) -> Result<()> {
    let script = load_script(&args.script)?;
    let mut options = script.master_options();
    if let Some(template) = args.template {
        options.template_dir = Some(template);
    }
    if let Some(prefix) = args.prefix {
        options.scratch_prefix = Some(prefix);
    }
    let master = script
        .build_master(options)
        .with_context(|| format!("prepare tutorial {}", script.name))?;
    run_master(master)
}

fn cmd_check(args: CheckArgs) -> Result<()> {
    let script = load_script(&args.script)?;
    let actions = script
        .actions()
        .with_context(|| format!("validate {}", args.script.display()))?;
    println!("{}: {} step(s)", script.name, actions.len());
    if let Some(description) = &script.description {
        println!("{description}");
    }
    for (index, action) in actions.iter().enumerate() {
        println!("  {}. {}", index + 1, action.summary());
    }
    Ok(())
}

fn cmd_demo(args: DemoArgs) -> Result<()> {
    let Some(name) = args.name else {
        println!("Available demos:");
        for (name, description) in DEMOS {
            println!("  {name:<14} {description}");
        }
        return Ok(());
    };
    let master = build_demo(&name).with_context(|| format!("prepare demo {name}"))?;
    run_master(master)
}

fn run_master(mut master: TutorialMaster) -> Result<()> {
    let outcome = master.start(&mut StdConsole);
    let root = master.scratch_root().to_path_buf();
    let cleanup = master.finish();
    let report = outcome.context("tutorial aborted")?;
    cleanup.with_context(|| format!("remove scratch directory {}", root.display()))?;
    tracing::debug!(failures = report.total_failures(), "run finished");
    Ok(())
}
