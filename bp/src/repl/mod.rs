//! Interactive REPL for bakenplanner
//!
//! Drives one [`PlanningSession`] from the terminal: pick a race, put marks on
//! entrants, ask for bets, then ask for an allocation.

mod session;

pub use session::{ReplSession, format_board, format_summary, gateway_hint, parse_budget, parse_mark_pairs};

use eyre::{Context, Result};
use tracing::debug;

use crate::catalog::RaceCatalog;
use crate::config::Config;
use crate::domain::Strategy;
use crate::llm::create_client;
use crate::planning::{PlanningSession, SessionConfig};
use crate::prompts::{PromptComposer, PromptLoader};

/// Run the interactive REPL
///
/// This is the entry point for `bp plan` and for `bp` with no subcommand.
pub async fn run_interactive(
    config: &Config,
    catalog: RaceCatalog,
    initial_race: Option<String>,
    strategy: Option<Strategy>,
) -> Result<()> {
    debug!(?initial_race, ?strategy, "run_interactive: called");

    // Validate API key early
    config.validate()?;
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;

    let workdir = std::env::current_dir()?;
    let composer = PromptComposer::new(PromptLoader::new(&workdir));

    let mut planning = PlanningSession::new(llm, composer, SessionConfig::from_config(config));
    if let Some(strategy) = strategy {
        planning.set_strategy(strategy);
    }

    let mut session = ReplSession::new(planning, catalog, config.planning.default_budget);
    session.run(initial_race).await
}
