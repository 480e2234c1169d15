//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "issue-herald")]
#[command(about = "Announce newly labelled GitHub issues to a Telegram channel", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to run (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to a YAML config file (defaults to ./issue-herald.yaml)
    #[arg(short, long, global = true, env = "HERALD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

impl Cli {
    /// The selected command, `run` when none was given.
    pub fn selected_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run)
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Poll forever, serving the liveness endpoint (default)
    Run,

    /// Run exactly one poll cycle and print its report
    Once,

    /// Create the database and its table if missing
    Init,

    /// Show the most recently announced issues
    List {
        /// Maximum number of records to display
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_run() {
        let cli = Cli::try_parse_from(["issue-herald"]).unwrap();
        assert_eq!(cli.selected_command(), Commands::Run);
        assert!(!cli.json);
    }

    #[test]
    fn test_list_with_limit_and_global_flags() {
        let cli = Cli::try_parse_from([
            "issue-herald",
            "list",
            "--limit",
            "5",
            "--json",
            "--config",
            "/etc/herald.yaml",
        ])
        .unwrap();
        assert_eq!(cli.selected_command(), Commands::List { limit: 5 });
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/herald.yaml")));
    }

    #[test]
    fn test_unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["issue-herald", "announce"]).is_err());
    }
}
