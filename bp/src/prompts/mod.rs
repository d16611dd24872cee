//! Prompt composition
//!
//! Builds the two request bodies of a planning cycle: the bet proposal and
//! the budget allocation. Rule text lives in Handlebars `.pmt` templates.
//!
//! Template loading chain:
//! 1. `.bakenplanner/prompts/{name}.pmt` (user override)
//! 2. `prompts/{name}.pmt` (working-directory default)
//! 3. Embedded fallback compiled into the binary

mod composer;
pub mod embedded;
mod loader;

pub use composer::{
    AllocationPrompt, BetPrompt, PromptComposer, PromptError, STAKE_UNIT, entrant_context_line, odds_context_line,
    validate_budget,
};
pub use loader::PromptLoader;
