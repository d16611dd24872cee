//! bakenplanner - LLM-assisted betting planner for a single horse race
//!
//! A user loads one race dataset, puts prediction marks on entrants, picks a
//! strategy, and asks an LLM for bet combinations. Once a proposal exists the
//! user can ask for a stake allocation over a budget in 100-yen units.
//!
//! # Modules
//!
//! - [`domain`] - Entrants, marks, strategies and races
//! - [`catalog`] - Race dataset discovery and CSV loading
//! - [`board`] - Marks assigned to the entrants of the active race
//! - [`prompts`] - Prompt templates and composition
//! - [`llm`] - LLM client trait and OpenAI implementation
//! - [`planning`] - The planning session state machine
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface
//! - [`repl`] - Interactive terminal session

pub mod board;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod llm;
pub mod planning;
pub mod prompts;
pub mod repl;

// Re-export commonly used types
pub use board::{BoardError, MarkedBoard};
pub use catalog::{CatalogError, RaceCatalog, load_race};
pub use config::{CatalogConfig, Config, LlmConfig, PlanningConfig};
pub use domain::{Entrant, Mark, Race, RaceDescriptor, Strategy};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, OpenAIClient, create_client};
pub use planning::{PlanningError, PlanningSession, SessionConfig, Stage};
pub use prompts::{PromptComposer, PromptError, PromptLoader, STAKE_UNIT};
