//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// bakenplanner - LLM-assisted horse racing bet planner
#[derive(Parser)]
#[command(
    name = "bp",
    about = "Plan horse racing bets with an LLM from your prediction marks",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Directory holding race CSV files (overrides config)
    #[arg(short = 'd', long = "data-dir", global = true, help = "Directory holding race CSV files")]
    pub data_dir: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List available races
    Races,

    /// Show the entrants of a race
    Show {
        /// Race number from `races`, race id, or label
        race: String,
    },

    /// Start an interactive planning session (default)
    Plan {
        /// Race to open right away
        race: Option<String>,

        /// Initial strategy (high-payout, hit-rate, beginner, advanced, balanced)
        #[arg(short, long)]
        strategy: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_races() {
        let cli = Cli::try_parse_from(["bp", "races"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Races)));
        assert!(cli.data_dir.is_none());
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["bp", "show", "1", "--data-dir", "/tmp/races", "-l", "debug"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/races")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Some(Command::Show { race }) => assert_eq!(race, "1"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_plan_with_strategy() {
        let cli = Cli::try_parse_from(["bp", "plan", "2024_天皇賞(秋)", "--strategy", "beginner"]).unwrap();
        match cli.command {
            Some(Command::Plan { race, strategy }) => {
                assert_eq!(race.as_deref(), Some("2024_天皇賞(秋)"));
                assert_eq!(strategy.as_deref(), Some("beginner"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["bp"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_show_requires_race() {
        assert!(Cli::try_parse_from(["bp", "show"]).is_err());
    }
}
