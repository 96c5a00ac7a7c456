//! Bashquest - learn the shell one puzzle at a time
//!
//! CLI entry point: one learner command per invocation.

use std::fs;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::info;

use bashquest::challenge::{Catalog, ChallengeView};
use bashquest::cli::{Cli, Command};
use bashquest::config::{Config, log_file};
use bashquest::engine::{Engine, EnginePaths, ListEntry, Outcome};

fn setup_logging(verbose: bool) -> Result<()> {
    // Logs go to a file; stdout belongs to the learner
    let log_path = log_file();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let registry = config.load_registry(&Catalog::builtin())?;
    let secret = config.load_secret()?;

    info!(
        "Bashquest loaded config: {} challenges, workspace={}",
        registry.len(),
        config.workspace.display()
    );

    let paths = EnginePaths {
        default_workspace: config.workspace.clone(),
        pointer: config.pointer_path(),
    };
    let mut engine = Engine::new(registry, &secret, paths);
    if let Some(workspace) = cli.workspace {
        engine = engine.with_workspace(workspace);
    }

    let outcome = match cli.command {
        Command::Start { path } => engine.start(path.as_deref()),
        Command::Goto { target } => engine.goto(&target),
        Command::Submit { answer } => engine.submit(answer.as_deref()),
        Command::List => engine.list(),
        Command::Challenge => engine.current(),
        Command::Done => engine.done(),
    }?;

    print_outcome(&outcome);

    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Started { workspace, view } => {
            println!("Workspace: {}", workspace.display().to_string().cyan());
            println!();
            print_view(view);
        }
        Outcome::Jumped { view } | Outcome::Current { view } => print_view(view),
        Outcome::Advanced { passed, next } => {
            println!("{} {}", "Correct!".green().bold(), format!("({})", passed).dimmed());
            println!();
            print_view(next);
        }
        Outcome::Completed { passed } => {
            println!("{} {}", "Correct!".green().bold(), format!("({})", passed).dimmed());
            println!();
            println!("{}", "All challenges completed. Well done!".green().bold());
        }
        Outcome::AllCompleted => println!("{}", "All challenges completed.".green()),
        Outcome::WrongAnswer => println!("{}", "Wrong answer, try again.".red()),
        Outcome::AnswerRequired { id } => {
            println!("{}", format!("Challenge {} needs a flag.", id).yellow());
            println!("Usage: bashquest submit <FLAG>");
        }
        Outcome::InvalidTarget { target } => println!("{}", format!("Invalid challenge: {}", target).red()),
        Outcome::NoActiveWorkspace => {
            println!("{}", "No active workspace.".yellow());
            println!("Run `bashquest start` to begin.");
        }
        Outcome::Listing { entries } => entries.iter().for_each(print_entry),
        Outcome::Cancelled { workspace } => match workspace {
            Some(path) => println!("Removed {}. Quest cancelled.", path.display()),
            None => println!("Nothing to clean up."),
        },
    }
}

fn print_view(view: &ChallengeView) {
    let heading = format!("Challenge {}: {}", view.number, view.title);
    println!("{}", heading.bold());
    println!("{}", "-".repeat(heading.len()));
    for line in &view.lines {
        println!("{}", line);
    }
}

fn print_entry(entry: &ListEntry) {
    let marker = if entry.current { ">" } else { " " };
    let check = if entry.passed { "x".green().to_string() } else { " ".to_string() };
    let line = format!("{} [{}] {:>2}. {} ({})", marker, check, entry.number, entry.title, entry.id);
    if entry.current {
        println!("{}", line.bold());
    } else {
        println!("{}", line);
    }
}
