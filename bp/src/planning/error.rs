//! Planning error types

use std::time::Duration;

use thiserror::Error;

use super::Stage;
use crate::board::BoardError;
use crate::llm::LlmError;
use crate::prompts::PromptError;

/// Errors surfaced by [`PlanningSession`](super::PlanningSession) operations
#[derive(Debug, Error)]
pub enum PlanningError {
    #[error("No race selected")]
    NoRaceSelected,

    #[error("Cannot {action} while {stage}")]
    InvalidStage { action: &'static str, stage: Stage },

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("LLM request failed: {0}")]
    Gateway(LlmError),

    #[error("LLM request timed out after {0:?}")]
    GatewayTimeout(Duration),
}

impl From<LlmError> for PlanningError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Timeout(after) => PlanningError::GatewayTimeout(after),
            other => PlanningError::Gateway(other),
        }
    }
}

impl PlanningError {
    /// User-input condition: show the message and let the user fix their input
    pub fn is_guidance(&self) -> bool {
        matches!(
            self,
            PlanningError::NoRaceSelected
                | PlanningError::Prompt(PromptError::NoMarkedEntrants)
                | PlanningError::Prompt(PromptError::InvalidBudget(_))
        )
    }

    /// The LLM call failed; prior results are untouched and a manual retry is possible
    pub fn is_gateway(&self) -> bool {
        matches!(self, PlanningError::Gateway(_) | PlanningError::GatewayTimeout(_))
    }

    /// Asking the LLM again may succeed without changing settings
    pub fn is_retryable(&self) -> bool {
        match self {
            PlanningError::GatewayTimeout(_) => true,
            PlanningError::Gateway(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Wait requested by the provider before asking again
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            PlanningError::Gateway(err) => err.retry_after(),
            _ => None,
        }
    }
}
