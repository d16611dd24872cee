//! Bet proposal and allocation prompt construction

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::PromptLoader;
use crate::domain::{Entrant, Mark, Strategy};

/// Smallest stake, in yen; every amount is a multiple of this
pub const STAKE_UNIT: i64 = 100;

/// Prompt construction errors
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("No entrant is marked; mark at least one horse before asking for bets")]
    NoMarkedEntrants,

    #[error("Invalid budget {0}円: must be positive and a multiple of 100円")]
    InvalidBudget(i64),

    #[error("Template error: {0}")]
    Template(String),
}

/// Request texts for the bet proposal stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetPrompt {
    pub system_text: String,
    pub user_text: String,

    /// Per-entrant context block, one line per marked entrant
    pub context: String,

    /// `number:{n}, odds:{x.x}倍` lines carried verbatim into the allocation stage
    pub odds_context: String,
}

/// Request texts for the allocation stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationPrompt {
    pub system_text: String,
    pub user_text: String,
}

#[derive(Serialize)]
struct BetTemplateContext<'a> {
    context: &'a str,
    strategy: &'a str,
}

#[derive(Serialize)]
struct AllocationTemplateContext<'a> {
    budget: i64,
    stake_unit: i64,
    proposal: &'a str,
    odds_context: &'a str,
}

/// `◎ : ドウデュース (number:1, odds:2.8倍, 1番人気)`
pub fn entrant_context_line(entrant: &Entrant, mark: Mark) -> String {
    format!(
        "{} : {} (number:{}, odds:{}, {}番人気)",
        mark,
        entrant.name,
        entrant.number,
        entrant.odds_display(),
        entrant.popularity_rank
    )
}

/// `number:1, odds:2.8倍`
pub fn odds_context_line(entrant: &Entrant) -> String {
    format!("number:{}, odds:{}", entrant.number, entrant.odds_display())
}

/// Budget must be positive and a whole number of stake units
pub fn validate_budget(budget: i64) -> Result<(), PromptError> {
    if budget <= 0 || budget % STAKE_UNIT != 0 {
        debug!(budget, "validate_budget: rejected");
        return Err(PromptError::InvalidBudget(budget));
    }
    Ok(())
}

/// Builds both LLM requests from board state
#[derive(Default)]
pub struct PromptComposer {
    loader: PromptLoader,
}

impl PromptComposer {
    pub fn new(loader: PromptLoader) -> Self {
        Self { loader }
    }

    /// Compose the bet proposal request
    ///
    /// `marked` holds the marked entrants in dataset order; the caller filters
    /// out unmarked ones. Output is deterministic for the same inputs.
    pub fn compose_bet_prompt(&self, marked: &[(&Entrant, Mark)], strategy: Strategy) -> Result<BetPrompt, PromptError> {
        debug!(marked = marked.len(), %strategy, "compose_bet_prompt: called");
        if marked.is_empty() {
            return Err(PromptError::NoMarkedEntrants);
        }

        let mut context = String::new();
        let mut odds_context = String::new();
        for (entrant, mark) in marked {
            context.push_str(&entrant_context_line(entrant, *mark));
            context.push('\n');
            odds_context.push_str(&odds_context_line(entrant));
            odds_context.push('\n');
        }

        let user_text = self.loader.render(
            "bets",
            &BetTemplateContext {
                context: &context,
                strategy: strategy.label(),
            },
        )?;

        Ok(BetPrompt {
            system_text: self.system_text()?,
            user_text,
            context,
            odds_context,
        })
    }

    /// Compose the allocation request from the stored proposal
    pub fn compose_allocation_prompt(
        &self,
        budget: i64,
        proposal: &str,
        odds_context: &str,
    ) -> Result<AllocationPrompt, PromptError> {
        debug!(budget, proposal_len = proposal.len(), "compose_allocation_prompt: called");
        validate_budget(budget)?;

        let user_text = self.loader.render(
            "allocation",
            &AllocationTemplateContext {
                budget,
                stake_unit: STAKE_UNIT,
                proposal,
                odds_context,
            },
        )?;

        Ok(AllocationPrompt {
            system_text: self.system_text()?,
            user_text,
        })
    }

    fn system_text(&self) -> Result<String, PromptError> {
        self.loader.render("system", &())
    }
}
