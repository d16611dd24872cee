//! REPL session management

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, info};

use crate::board::MarkedBoard;
use crate::catalog::RaceCatalog;
use crate::domain::{Mark, Race, Strategy};
use crate::planning::{PlanningError, PlanningSession, Stage};
use crate::prompts::STAKE_UNIT;

/// Interactive REPL session
pub struct ReplSession {
    planning: PlanningSession,
    catalog: RaceCatalog,
    default_budget: i64,
}

impl ReplSession {
    /// Create a new REPL session
    pub fn new(planning: PlanningSession, catalog: RaceCatalog, default_budget: i64) -> Self {
        Self {
            planning,
            catalog,
            default_budget,
        }
    }

    /// Run the REPL main loop
    pub async fn run(&mut self, initial_race: Option<String>) -> Result<()> {
        self.print_welcome();

        match initial_race {
            Some(query) => self.select_race(&query).await,
            None => self.print_races(),
        }

        // Create readline editor for proper line editing
        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input).await {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    } else {
                        println!("Type {} for available commands", "/help".yellow());
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C - just show new prompt
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "bakenplanner".bright_cyan().bold());
        println!("Race data: {}", self.catalog.dir().display());
        println!("Strategy: {}", self.planning.strategy());
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    /// Handle slash commands
    async fn handle_slash_command(&mut self, input: &str) -> SlashResult {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts.first().copied().unwrap_or("");
        let args = &parts[1.min(parts.len())..];
        debug!(%cmd, ?args, "handle_slash_command: called");

        match cmd {
            "/help" | "/h" => self.print_help(),
            "/quit" | "/q" | "/exit" => return SlashResult::Quit,
            "/races" => self.print_races(),
            "/race" | "/r" => match args.first() {
                Some(_) => self.select_race(&args.join(" ")).await,
                None => self.print_races(),
            },
            "/board" | "/b" => self.print_board(),
            "/mark" | "/m" => self.mark(args),
            "/clear" | "/c" => {
                self.planning.clear_marks();
                println!("{}", "Marks cleared.".dimmed());
            }
            "/strategy" | "/s" => self.strategy(args),
            "/bets" => self.request_bets().await,
            "/budget" => self.request_allocation(args).await,
            "/status" => self.print_status(),
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
            }
        }
        SlashResult::Continue
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:22} List races in the data directory", "/races".yellow());
        println!("  {:22} Select a race by number, id or label", "/race <race>".yellow());
        println!("  {:22} Show entrants and their marks", "/board".yellow());
        println!("  {:22} Mark entrants, e.g. /mark 1 ◎ 5 ◯ 7 △", "/mark <n> <mark>...".yellow());
        println!("  {:22} Reset every mark", "/clear".yellow());
        println!("  {:22} Show or set the strategy", "/strategy [name]".yellow());
        println!("  {:22} Ask for bet combinations", "/bets".yellow());
        println!("  {:22} Allocate a budget over the bets", "/budget <yen>".yellow());
        println!("  {:22} Show the current plan", "/status".yellow());
        println!("  {:22} Exit the REPL", "/quit".yellow());
        println!();
        println!(
            "Marks: {} (use {} or {} to unmark)",
            Mark::ALL.iter().map(|m| m.symbol()).collect::<Vec<_>>().join(" "),
            "-".yellow(),
            "無印".yellow()
        );
        println!();
    }

    fn print_races(&self) {
        match self.catalog.list_races() {
            Ok(races) => {
                println!("{}", "Races:".bright_cyan());
                let active = self.planning.race().map(|r| r.id().to_string());
                for (i, race) in races.iter().enumerate() {
                    let marker = if active.as_deref() == Some(race.id.as_str()) { "*" } else { " " };
                    println!("{} {:>3}. {}", marker.bright_green(), i + 1, race.label);
                }
            }
            Err(e) => println!("{} {}", "!".yellow(), e),
        }
    }

    async fn select_race(&mut self, query: &str) {
        let loaded = match self.catalog.find(query) {
            Ok(descriptor) => self.catalog.load(&descriptor).await,
            Err(e) => Err(e),
        };
        match loaded {
            Ok(race) => {
                let label = race.descriptor.label.clone();
                let title = race_title(&race);
                if self.planning.select_race(race) {
                    info!(race = %label, "REPL switched race");
                    println!("{} {}", "Race:".bright_cyan(), title.bold());
                } else {
                    println!("{}", "Race already selected; marks and results kept.".dimmed());
                }
                self.print_board();
            }
            Err(e) => println!("{} {}", "Error:".red(), e),
        }
    }

    fn print_board(&self) {
        let Some(race) = self.planning.race() else {
            println!("{} {}", "!".yellow(), PlanningError::NoRaceSelected);
            return;
        };
        for line in format_board(race, self.planning.board()) {
            println!("{}", line);
        }
        self.print_summary();
    }

    fn print_summary(&self) {
        match format_summary(&self.planning.summary()) {
            Some(summary) => println!("{} {}", "Marks:".bright_cyan(), summary),
            None => println!(
                "{}",
                "No marks yet. Put at least one mark before asking for bets.".dimmed()
            ),
        }
    }

    fn mark(&mut self, args: &[&str]) {
        let pairs = match parse_mark_pairs(args) {
            Ok(pairs) => pairs,
            Err(e) => {
                println!("{} {}", "!".yellow(), e);
                println!("Usage: {}", "/mark <number> <mark> [<number> <mark>...]".yellow());
                return;
            }
        };
        if let Err(e) = self.planning.set_marks(&pairs) {
            print_planning_error(&e);
            return;
        }
        self.print_summary();
        self.print_stale_warning();
    }

    fn strategy(&mut self, args: &[&str]) {
        if args.is_empty() {
            for strategy in Strategy::ALL {
                let marker = if strategy == self.planning.strategy() { "*" } else { " " };
                println!("{} {:14} {}", marker.bright_green(), strategy.key().yellow(), strategy.label());
            }
            return;
        }
        match args.join(" ").parse::<Strategy>() {
            Ok(strategy) => {
                self.planning.set_strategy(strategy);
                println!("{} {}", "Strategy:".bright_cyan(), strategy);
            }
            Err(e) => println!("{} {}", "!".yellow(), e),
        }
    }

    async fn request_bets(&mut self) {
        println!("{}", "Asking for bet combinations...".dimmed());
        match self.planning.request_bets().await {
            Ok(proposal) => {
                println!();
                println!("{}", "Bet proposal".bright_cyan().bold());
                println!("{}", proposal);
                println!(
                    "Use {} to allocate a budget (e.g. /budget {})",
                    "/budget <yen>".yellow(),
                    self.default_budget
                );
            }
            Err(e) => print_planning_error(&e),
        }
    }

    async fn request_allocation(&mut self, args: &[&str]) {
        let budget = match args.first() {
            Some(arg) => match parse_budget(arg) {
                Ok(budget) => budget,
                Err(e) => {
                    println!("{} {}", "!".yellow(), e);
                    return;
                }
            },
            None => self.default_budget,
        };

        self.print_stale_warning();
        println!("{}", format!("Allocating {}円...", budget).dimmed());
        match self.planning.request_allocation(budget).await {
            Ok(allocation) => {
                println!();
                println!("{}", allocation);
            }
            Err(e) => print_planning_error(&e),
        }
    }

    fn print_status(&self) {
        let race = self.planning.race().map(race_title).unwrap_or_else(|| "(none)".to_string());
        println!("{} {}", "Race:".bright_cyan(), race);
        println!("{} {}", "Strategy:".bright_cyan(), self.planning.strategy());
        println!("{} {}", "Stage:".bright_cyan(), self.planning.stage());
        self.print_summary();

        if let Some(proposal) = self.planning.bet_proposal() {
            println!();
            println!("{}", "Bet proposal".bright_cyan().bold());
            println!("{}", proposal);
            self.print_stale_warning();
        }
        if let Some(allocation) = self.planning.allocation() {
            println!();
            println!("{}", allocation);
        }
    }

    fn print_stale_warning(&self) {
        if self.planning.proposal_is_stale() && self.planning.stage() != Stage::Idle {
            println!(
                "{} Marks changed since the last proposal; run {} to refresh it.",
                "!".yellow(),
                "/bets".yellow()
            );
        }
    }
}

fn print_planning_error(err: &PlanningError) {
    if err.is_guidance() {
        println!("{} {}", "!".yellow(), err);
        return;
    }
    println!("{} {}", "Error:".red(), err);
    if let Some(hint) = gateway_hint(err) {
        println!("{}", hint.dimmed());
    }
}

/// What the user can do after a failed LLM call; `None` for other errors
pub fn gateway_hint(err: &PlanningError) -> Option<String> {
    if !err.is_gateway() {
        return None;
    }
    let hint = match (err.is_retryable(), err.retry_after()) {
        (true, Some(wait)) => format!("Previous results are kept. Try again in {}s.", wait.as_secs()),
        (true, None) => "Previous results are kept. Try again when ready.".to_string(),
        (false, _) => "Previous results are kept. Check the llm settings (model, api-key-env, base-url) before retrying."
            .to_string(),
    };
    Some(hint)
}

/// `天皇賞(秋) (2024: 天皇賞(秋))` style header for the active race
fn race_title(race: &Race) -> String {
    let descriptor = &race.descriptor;
    if descriptor.race_name() == descriptor.id {
        descriptor.label.clone()
    } else {
        format!("{} ({})", descriptor.race_name(), descriptor.label)
    }
}

/// Parse `/mark` arguments: alternating entrant numbers and marks
pub fn parse_mark_pairs(args: &[&str]) -> Result<Vec<(u32, Mark)>, String> {
    if args.is_empty() || args.len() % 2 != 0 {
        return Err("Expected pairs of <number> <mark>".to_string());
    }
    args.chunks(2)
        .map(|pair| {
            let number = pair[0]
                .parse::<u32>()
                .map_err(|_| format!("Not an entrant number: '{}'", pair[0]))?;
            let mark = pair[1].parse::<Mark>()?;
            Ok((number, mark))
        })
        .collect()
}

/// Parse a budget such as `1000`, `1,000` or `1000円`
///
/// Only checks that the text is a number; the 100-yen rule is enforced when
/// the allocation prompt is composed.
pub fn parse_budget(arg: &str) -> Result<i64, String> {
    let cleaned: String = arg
        .trim()
        .trim_end_matches('円')
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    cleaned
        .parse::<i64>()
        .map_err(|_| format!("Not a budget: '{}' (use yen in multiples of {})", arg, STAKE_UNIT))
}

/// Entrant table lines for the active race
pub fn format_board(race: &Race, board: &MarkedBoard) -> Vec<String> {
    let mut lines = Vec::with_capacity(race.entrants.len() + 1);
    lines.push(format!("{:<4} {:>3}  {:<18} {:>8} {:>6}", "Mark", "No", "Name", "Odds", "Rank"));
    for entrant in &race.entrants {
        let mark = board.mark_of(entrant.number).unwrap_or_default();
        let symbol = if mark.is_marked() { mark.symbol() } else { "-" };
        lines.push(format!(
            "{:<4} {:>3}  {:<18} {:>8} {:>6}",
            symbol,
            entrant.number,
            entrant.name,
            entrant.odds_display(),
            format!("{}番人気", entrant.popularity_rank)
        ));
    }
    lines
}

/// One-line mark summary, `None` when nothing is marked
pub fn format_summary(summary: &[(Mark, Vec<String>)]) -> Option<String> {
    if summary.is_empty() {
        return None;
    }
    Some(
        summary
            .iter()
            .map(|(mark, labels)| format!("{} {}", mark.symbol(), labels.join(", ")))
            .collect::<Vec<_>>()
            .join("  "),
    )
}

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Quit,
}
