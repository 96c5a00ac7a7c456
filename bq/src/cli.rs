//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bashquest - learn the shell one puzzle at a time
#[derive(Parser)]
#[command(
    name = "bashquest",
    about = "Learn the command line by solving filesystem puzzles",
    version = env!("CARGO_PKG_VERSION"),
    after_help = format!("Logs are written to: {}", crate::config::log_file().display())
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Workspace for this invocation
    #[arg(short, long, global = true, help = "Workspace directory (overrides the active one)")]
    pub workspace: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reset the workspace and begin at the first challenge
    Start {
        /// Workspace directory (created if missing)
        path: Option<PathBuf>,
    },

    /// Jump to a challenge by number or id
    Goto {
        /// 1-based number or challenge id
        target: String,
    },

    /// Check the current challenge
    Submit {
        /// Flag, for challenges that ask for one
        answer: Option<String>,
    },

    /// List all challenges
    List,

    /// Show the current challenge again
    #[command(alias = "current")]
    Challenge,

    /// Remove the workspace and forget progress
    Done,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_command() {
        assert!(Cli::try_parse_from(["bashquest"]).is_err());
    }

    #[test]
    fn test_cli_parse_start() {
        let cli = Cli::parse_from(["bashquest", "start"]);
        assert!(matches!(cli.command, Command::Start { path: None }));

        let cli = Cli::parse_from(["bashquest", "start", "/tmp/quest"]);
        if let Command::Start { path } = cli.command {
            assert_eq!(path, Some(PathBuf::from("/tmp/quest")));
        } else {
            panic!("Expected Start command");
        }
    }

    #[test]
    fn test_cli_parse_goto() {
        let cli = Cli::parse_from(["bashquest", "goto", "3"]);
        assert!(matches!(cli.command, Command::Goto { ref target } if target == "3"));
    }

    #[test]
    fn test_cli_parse_submit() {
        let cli = Cli::parse_from(["bashquest", "submit"]);
        assert!(matches!(cli.command, Command::Submit { answer: None }));

        let cli = Cli::parse_from(["bashquest", "submit", "penguin"]);
        assert!(matches!(cli.command, Command::Submit { answer: Some(ref a) } if a == "penguin"));
    }

    #[test]
    fn test_cli_current_alias() {
        let cli = Cli::parse_from(["bashquest", "current"]);
        assert!(matches!(cli.command, Command::Challenge));
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from(["bashquest", "list", "-c", "/path/to/config.yml", "-w", "/tmp/ws", "-v"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.yml")));
        assert_eq!(cli.workspace, Some(PathBuf::from("/tmp/ws")));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::List));
    }

    #[test]
    fn test_help_names_log_file() {
        use clap::CommandFactory;

        let help = Cli::command().render_long_help().to_string();
        let expected = crate::config::log_file().display().to_string();
        assert!(help.contains(&expected));
    }
}
