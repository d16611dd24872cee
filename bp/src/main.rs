//! bakenplanner - LLM-assisted horse racing bet planner
//!
//! CLI entry point for listing races, inspecting entrants, and planning bets.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{debug, info};

use bakenplanner::catalog::RaceCatalog;
use bakenplanner::cli::{Cli, Command};
use bakenplanner::config::Config;
use bakenplanner::domain::Strategy;
use bakenplanner::repl::{self, format_board};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bakenplanner")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("bakenplanner.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(dir) = cli.data_dir {
        debug!(dir = %dir.display(), "main: data dir overridden from CLI");
        config.catalog.data_dir = dir;
    }

    info!(model = %config.llm.model, data_dir = %config.catalog.data_dir.display(), "bakenplanner loaded config");
    let catalog = RaceCatalog::new(&config.catalog.data_dir);

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Races) => cmd_races(&catalog),
        Some(Command::Show { race }) => cmd_show(&catalog, &race).await,
        Some(Command::Plan { race, strategy }) => cmd_plan(&config, catalog, race, strategy.as_deref()).await,
        None => {
            debug!("main: no command specified, launching REPL");
            cmd_plan(&config, catalog, None, None).await
        }
    }
}

/// List races in the data directory
fn cmd_races(catalog: &RaceCatalog) -> Result<()> {
    debug!("cmd_races: called");
    let races = catalog.list_races()?;
    for (i, race) in races.iter().enumerate() {
        println!("{:>3}. {}", i + 1, race.label);
    }
    Ok(())
}

/// Print the entrant table of one race
async fn cmd_show(catalog: &RaceCatalog, query: &str) -> Result<()> {
    debug!(%query, "cmd_show: called");
    let descriptor = catalog.find(query)?;
    let race = catalog
        .load(&descriptor)
        .await
        .context(format!("Failed to load {}", descriptor.path.display()))?;

    println!("{} ({} entrants)", race.descriptor.label, race.entrants.len());
    let board = bakenplanner::board::MarkedBoard::initialize(&race.entrants);
    for line in format_board(&race, &board) {
        println!("{}", line);
    }
    Ok(())
}

/// Start the interactive planning REPL
async fn cmd_plan(config: &Config, catalog: RaceCatalog, race: Option<String>, strategy: Option<&str>) -> Result<()> {
    debug!(?race, ?strategy, "cmd_plan: called");
    let strategy = strategy
        .map(|s| s.parse::<Strategy>().map_err(|e| eyre::eyre!(e)))
        .transpose()?;
    repl::run_interactive(config, catalog, race, strategy).await
}
