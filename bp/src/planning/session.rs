//! PlanningSession - bet proposal and allocation state machine

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::PlanningError;
use crate::board::{BoardError, MarkedBoard};
use crate::config::Config;
use crate::domain::{Mark, Race, Strategy};
use crate::llm::{CompletionRequest, LlmClient, LlmError, StopReason};
use crate::prompts::{PromptComposer, PromptError};

/// Configuration for a planning session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Temperature for the bet proposal call
    pub bet_temperature: f32,

    /// Temperature for the allocation call
    pub allocation_temperature: f32,

    /// Max tokens requested per call
    pub max_tokens: u32,

    /// Strategy selected when the session starts
    pub default_strategy: Strategy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bet_temperature: 0.7,
            allocation_temperature: 0.5,
            max_tokens: 4096,
            default_strategy: Strategy::Balanced,
        }
    }
}

impl SessionConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            bet_temperature: config.planning.bet_temperature,
            allocation_temperature: config.planning.allocation_temperature,
            max_tokens: config.llm.max_tokens,
            default_strategy: config.planning.default_strategy,
        }
    }
}

/// Where the session is in the planning cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Nothing proposed yet
    Idle,
    /// Bet proposal call in flight
    BetsRequested,
    /// Bet proposal stored
    BetsReady,
    /// Allocation call in flight
    AllocationRequested,
    /// Allocation stored for the current budget
    AllocationReady,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::BetsRequested => write!(f, "waiting for the bet proposal"),
            Self::BetsReady => write!(f, "bets ready"),
            Self::AllocationRequested => write!(f, "waiting for the allocation"),
            Self::AllocationReady => write!(f, "allocation ready"),
        }
    }
}

/// One user's planning session over the active race
pub struct PlanningSession {
    /// LLM gateway
    llm: Arc<dyn LlmClient>,

    /// Builds both requests
    composer: PromptComposer,

    /// Configuration
    config: SessionConfig,

    /// Active race, if any
    race: Option<Race>,

    /// Marks for the active race
    board: MarkedBoard,

    /// Strategy used for the next proposal
    strategy: Strategy,

    stage: Stage,
    bet_proposal: Option<String>,
    allocation: Option<String>,
    budget: Option<i64>,

    /// Odds lines produced alongside the current proposal
    odds_context: String,

    /// Marks changed after the current proposal was produced
    proposal_stale: bool,
}

impl PlanningSession {
    /// Create a new planning session with no race selected
    pub fn new(llm: Arc<dyn LlmClient>, composer: PromptComposer, config: SessionConfig) -> Self {
        let strategy = config.default_strategy;
        Self {
            llm,
            composer,
            config,
            race: None,
            board: MarkedBoard::default(),
            strategy,
            stage: Stage::Idle,
            bet_proposal: None,
            allocation: None,
            budget: None,
            odds_context: String::new(),
            proposal_stale: false,
        }
    }

    /// Make `race` the active dataset
    ///
    /// A different race resets the session to `Idle` with an all-None board.
    /// Re-selecting the active race keeps everything. Returns whether a reset
    /// happened.
    pub fn select_race(&mut self, race: Race) -> bool {
        debug!(race = %race.id(), "PlanningSession::select_race: called");
        if self.race.as_ref().is_some_and(|active| active.id() == race.id()) {
            debug!("PlanningSession::select_race: same race, keeping state");
            return false;
        }

        info!(race = %race.descriptor.label, entrants = race.entrants.len(), "Race selected");
        self.board = MarkedBoard::initialize(&race.entrants);
        self.race = Some(race);
        self.stage = Stage::Idle;
        self.bet_proposal = None;
        self.allocation = None;
        self.budget = None;
        self.odds_context.clear();
        self.proposal_stale = false;
        true
    }

    /// Assign a mark to one entrant of the active race
    pub fn set_mark(&mut self, number: u32, mark: Mark) -> Result<(), PlanningError> {
        debug!(number, ?mark, "PlanningSession::set_mark: called");
        if self.race.is_none() {
            return Err(PlanningError::NoRaceSelected);
        }
        let previous = self.board.mark_of(number);
        self.board.set_mark(number, mark)?;
        if self.bet_proposal.is_some() && previous != Some(mark) {
            debug!("PlanningSession::set_mark: proposal is now stale");
            self.proposal_stale = true;
        }
        Ok(())
    }

    /// Assign several marks at once
    ///
    /// Every number is checked against the active race first, so an unknown
    /// entrant leaves the board untouched.
    pub fn set_marks(&mut self, marks: &[(u32, Mark)]) -> Result<(), PlanningError> {
        debug!(count = marks.len(), "PlanningSession::set_marks: called");
        let race = self.race.as_ref().ok_or(PlanningError::NoRaceSelected)?;
        if let Some(&(number, _)) = marks.iter().find(|(number, _)| race.entrant(*number).is_none()) {
            debug!(number, "PlanningSession::set_marks: unknown entrant, nothing applied");
            return Err(BoardError::UnknownEntrant(number).into());
        }
        for &(number, mark) in marks {
            self.set_mark(number, mark)?;
        }
        Ok(())
    }

    /// Reset every mark of the active race to None
    pub fn clear_marks(&mut self) {
        debug!("PlanningSession::clear_marks: called");
        if self.board.has_any_mark() && self.bet_proposal.is_some() {
            self.proposal_stale = true;
        }
        self.board.clear();
    }

    pub fn set_strategy(&mut self, strategy: Strategy) {
        debug!(%strategy, "PlanningSession::set_strategy: called");
        self.strategy = strategy;
    }

    /// Ask the LLM for bet combinations matching the current marks
    ///
    /// Fails without touching state when no race is active or nothing is
    /// marked. On gateway failure the previous stage and proposal are kept.
    pub async fn request_bets(&mut self) -> Result<&str, PlanningError> {
        debug!(stage = %self.stage, strategy = %self.strategy, "PlanningSession::request_bets: called");
        let race = self.race.as_ref().ok_or(PlanningError::NoRaceSelected)?;
        if !self.board.has_any_mark() {
            debug!("PlanningSession::request_bets: no marks");
            return Err(PromptError::NoMarkedEntrants.into());
        }

        let marked = self.board.marked_entrants(&race.entrants);
        let prompt = self.composer.compose_bet_prompt(&marked, self.strategy)?;
        let request = CompletionRequest::single(prompt.system_text, prompt.user_text, self.config.bet_temperature)
            .with_max_tokens(self.config.max_tokens);

        let prior = self.stage;
        self.stage = Stage::BetsRequested;
        match self.complete(request).await {
            Ok(text) => {
                info!(len = text.len(), "Bet proposal received");
                self.odds_context = prompt.odds_context;
                self.allocation = None;
                self.budget = None;
                self.proposal_stale = false;
                self.stage = Stage::BetsReady;
                Ok(self.bet_proposal.insert(text).as_str())
            }
            Err(e) => {
                warn!(error = %e, "Bet proposal failed");
                self.stage = prior;
                Err(e)
            }
        }
    }

    /// Ask the LLM to spread `budget` yen over the stored proposal
    ///
    /// Allowed once a proposal exists; asking again with another budget
    /// replaces the previous allocation. On gateway failure the previous
    /// allocation is kept.
    pub async fn request_allocation(&mut self, budget: i64) -> Result<&str, PlanningError> {
        debug!(stage = %self.stage, budget, "PlanningSession::request_allocation: called");
        let proposal = match (self.stage, self.bet_proposal.as_deref()) {
            (Stage::BetsReady | Stage::AllocationReady, Some(proposal)) => proposal,
            (stage, _) => {
                return Err(PlanningError::InvalidStage {
                    action: "request an allocation",
                    stage,
                });
            }
        };

        let prompt = self
            .composer
            .compose_allocation_prompt(budget, proposal, &self.odds_context)?;
        let request = CompletionRequest::single(prompt.system_text, prompt.user_text, self.config.allocation_temperature)
            .with_max_tokens(self.config.max_tokens);

        let prior = self.stage;
        self.stage = Stage::AllocationRequested;
        match self.complete(request).await {
            Ok(text) => {
                info!(budget, len = text.len(), "Allocation received");
                self.budget = Some(budget);
                self.stage = Stage::AllocationReady;
                Ok(self.allocation.insert(text).as_str())
            }
            Err(e) => {
                warn!(error = %e, budget, "Allocation failed");
                self.stage = prior;
                Err(e)
            }
        }
    }

    /// One gateway round trip; the full text or an error
    async fn complete(&self, request: CompletionRequest) -> Result<String, PlanningError> {
        let response = self.llm.complete(request).await?;
        if response.stop_reason == StopReason::MaxTokens {
            warn!("LLM response hit the token limit and may be truncated");
        }
        match response.content {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(LlmError::InvalidResponse("LLM returned an empty response".to_string()).into()),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn race(&self) -> Option<&Race> {
        self.race.as_ref()
    }

    pub fn board(&self) -> &MarkedBoard {
        &self.board
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn bet_proposal(&self) -> Option<&str> {
        self.bet_proposal.as_deref()
    }

    pub fn allocation(&self) -> Option<&str> {
        self.allocation.as_deref()
    }

    pub fn budget(&self) -> Option<i64> {
        self.budget
    }

    pub fn odds_context(&self) -> &str {
        &self.odds_context
    }

    pub fn has_any_mark(&self) -> bool {
        self.board.has_any_mark()
    }

    /// Marks were edited after the stored proposal was produced
    pub fn proposal_is_stale(&self) -> bool {
        self.proposal_stale
    }

    /// Marked entrants grouped by mark in ◎ ◯ ▲ △ order
    pub fn summary(&self) -> Vec<(Mark, Vec<String>)> {
        self.race
            .as_ref()
            .map(|race| self.board.summarize(&race.entrants))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Entrant, RaceDescriptor};
    use crate::llm::client::mock::{MockLlmClient, MockReply};

    const PROPOSAL: &str = "券種ごとの買い目：\n- 馬連: 1-2\n";
    const ALLOCATION: &str = "#### 資金配分提案 (総予算: 1000円)\n- 馬連: 1-2（1000円）\n";

    fn race(id: &str) -> Race {
        Race::new(
            RaceDescriptor::from_path(format!("data/{id}.csv")),
            vec![
                Entrant::new(1, "A", 2.0, 1),
                Entrant::new(2, "B", 5.5, 2),
                Entrant::new(3, "C", 10.0, 3),
            ],
        )
    }

    fn session(mock: Arc<MockLlmClient>) -> PlanningSession {
        let mut session = PlanningSession::new(mock, PromptComposer::default(), SessionConfig::default());
        session.select_race(race("2024_test"));
        session
    }

    fn mark_two(session: &mut PlanningSession) {
        session.set_mark(1, Mark::Honor).unwrap();
        session.set_mark(2, Mark::Circle).unwrap();
    }

    #[tokio::test]
    async fn test_request_bets_without_marks_stays_idle() {
        let mock = Arc::new(MockLlmClient::with_texts(&[PROPOSAL]));
        let mut session = session(mock.clone());

        let err = session.request_bets().await.unwrap_err();
        assert!(matches!(err, PlanningError::Prompt(PromptError::NoMarkedEntrants)));
        assert!(err.is_guidance());
        assert_eq!(session.stage(), Stage::Idle);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_request_bets_without_race() {
        let mock = Arc::new(MockLlmClient::with_texts(&[PROPOSAL]));
        let mut session = PlanningSession::new(mock, PromptComposer::default(), SessionConfig::default());
        assert!(matches!(session.request_bets().await, Err(PlanningError::NoRaceSelected)));
        assert!(matches!(session.set_mark(1, Mark::Honor), Err(PlanningError::NoRaceSelected)));
    }

    #[tokio::test]
    async fn test_full_cycle() {
        let mock = Arc::new(MockLlmClient::with_texts(&[PROPOSAL, ALLOCATION]));
        let mut session = session(mock.clone());
        mark_two(&mut session);

        assert_eq!(session.request_bets().await.unwrap(), PROPOSAL);
        assert_eq!(session.stage(), Stage::BetsReady);
        assert_eq!(session.odds_context(), "number:1, odds:2.0倍\nnumber:2, odds:5.5倍\n");

        assert_eq!(session.request_allocation(1000).await.unwrap(), ALLOCATION);
        assert_eq!(session.stage(), Stage::AllocationReady);
        assert_eq!(session.budget(), Some(1000));

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].temperature, Some(0.7));
        assert_eq!(requests[1].temperature, Some(0.5));
        let allocation_user = &requests[1].messages[0].content;
        assert!(allocation_user.contains(PROPOSAL));
        assert!(allocation_user.contains("number:1, odds:2.0倍\nnumber:2, odds:5.5倍\n"));
    }

    #[tokio::test]
    async fn test_bet_failure_keeps_previous_state() {
        let mock = Arc::new(MockLlmClient::new(vec![MockReply::ApiError(500, "down".to_string())]));
        let mut session = session(mock);
        mark_two(&mut session);

        let err = session.request_bets().await.unwrap_err();
        assert!(err.is_gateway());
        assert_eq!(session.stage(), Stage::Idle);
        assert!(session.bet_proposal().is_none());
        assert!(session.odds_context().is_empty());
    }

    #[tokio::test]
    async fn test_bet_retry_after_failure_replaces_not_duplicates() {
        let mock = Arc::new(MockLlmClient::new(vec![
            MockReply::Text(PROPOSAL.to_string()),
            MockReply::Timeout,
            MockReply::Text("- 単勝: 1\n".to_string()),
        ]));
        let mut session = session(mock);
        mark_two(&mut session);

        session.request_bets().await.unwrap();
        let err = session.request_bets().await.unwrap_err();
        assert!(matches!(err, PlanningError::GatewayTimeout(_)));
        assert_eq!(session.stage(), Stage::BetsReady);
        assert_eq!(session.bet_proposal(), Some(PROPOSAL));

        session.request_bets().await.unwrap();
        assert_eq!(session.bet_proposal(), Some("- 単勝: 1\n"));
        assert_eq!(session.odds_context(), "number:1, odds:2.0倍\nnumber:2, odds:5.5倍\n");
    }

    #[tokio::test]
    async fn test_empty_response_is_a_gateway_failure() {
        let mock = Arc::new(MockLlmClient::new(vec![MockReply::Empty]));
        let mut session = session(mock);
        mark_two(&mut session);

        let err = session.request_bets().await.unwrap_err();
        assert!(matches!(err, PlanningError::Gateway(LlmError::InvalidResponse(_))));
        assert_eq!(session.stage(), Stage::Idle);
    }

    #[tokio::test]
    async fn test_allocation_requires_proposal() {
        let mock = Arc::new(MockLlmClient::with_texts(&[ALLOCATION]));
        let mut session = session(mock.clone());

        let err = session.request_allocation(1000).await.unwrap_err();
        assert!(matches!(err, PlanningError::InvalidStage { stage: Stage::Idle, .. }));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_allocation_invalid_budget_changes_nothing() {
        let mock = Arc::new(MockLlmClient::with_texts(&[PROPOSAL]));
        let mut session = session(mock.clone());
        mark_two(&mut session);
        session.request_bets().await.unwrap();

        for bad in [0, 150, -100] {
            let err = session.request_allocation(bad).await.unwrap_err();
            assert!(matches!(err, PlanningError::Prompt(PromptError::InvalidBudget(_))));
        }
        assert_eq!(session.stage(), Stage::BetsReady);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_allocation_failure_keeps_prior_allocation() {
        let mock = Arc::new(MockLlmClient::new(vec![
            MockReply::Text(PROPOSAL.to_string()),
            MockReply::Text(ALLOCATION.to_string()),
            MockReply::ApiError(503, "busy".to_string()),
            MockReply::Text("#### 資金配分提案 (総予算: 2000円)\n".to_string()),
        ]));
        let mut session = session(mock);
        mark_two(&mut session);
        session.request_bets().await.unwrap();
        session.request_allocation(1000).await.unwrap();

        assert!(session.request_allocation(2000).await.is_err());
        assert_eq!(session.stage(), Stage::AllocationReady);
        assert_eq!(session.allocation(), Some(ALLOCATION));
        assert_eq!(session.budget(), Some(1000));

        session.request_allocation(2000).await.unwrap();
        assert_eq!(session.budget(), Some(2000));
        assert!(session.allocation().unwrap().contains("2000円"));
    }

    #[tokio::test]
    async fn test_new_proposal_clears_old_allocation() {
        let mock = Arc::new(MockLlmClient::with_texts(&[PROPOSAL, ALLOCATION, PROPOSAL]));
        let mut session = session(mock);
        mark_two(&mut session);
        session.request_bets().await.unwrap();
        session.request_allocation(1000).await.unwrap();

        session.request_bets().await.unwrap();
        assert_eq!(session.stage(), Stage::BetsReady);
        assert!(session.allocation().is_none());
        assert!(session.budget().is_none());
    }

    #[tokio::test]
    async fn test_changing_race_resets_everything() {
        let mock = Arc::new(MockLlmClient::with_texts(&[PROPOSAL, ALLOCATION]));
        let mut session = session(mock);
        mark_two(&mut session);
        session.request_bets().await.unwrap();
        session.request_allocation(1000).await.unwrap();
        assert_eq!(session.stage(), Stage::AllocationReady);

        assert!(session.select_race(race("2024_other")));
        assert_eq!(session.stage(), Stage::Idle);
        assert!(session.bet_proposal().is_none());
        assert!(session.allocation().is_none());
        assert!(session.budget().is_none());
        assert!(session.odds_context().is_empty());
        assert!(!session.has_any_mark());
        assert_eq!(session.board().len(), 3);
    }

    #[tokio::test]
    async fn test_reselecting_same_race_keeps_state() {
        let mock = Arc::new(MockLlmClient::with_texts(&[PROPOSAL]));
        let mut session = session(mock);
        mark_two(&mut session);
        session.request_bets().await.unwrap();

        assert!(!session.select_race(race("2024_test")));
        assert_eq!(session.stage(), Stage::BetsReady);
        assert!(session.has_any_mark());
    }

    #[tokio::test]
    async fn test_mark_edit_after_proposal_marks_it_stale() {
        let mock = Arc::new(MockLlmClient::with_texts(&[PROPOSAL, PROPOSAL]));
        let mut session = session(mock);
        mark_two(&mut session);
        session.request_bets().await.unwrap();
        assert!(!session.proposal_is_stale());

        session.set_mark(1, Mark::Honor).unwrap();
        assert!(!session.proposal_is_stale());

        session.set_mark(3, Mark::Triangle).unwrap();
        assert!(session.proposal_is_stale());
        assert_eq!(session.bet_proposal(), Some(PROPOSAL));

        session.request_bets().await.unwrap();
        assert!(!session.proposal_is_stale());
    }

    #[tokio::test]
    async fn test_unknown_entrant_surfaced() {
        let mock = Arc::new(MockLlmClient::with_texts(&[]));
        let mut session = session(mock);
        assert!(matches!(
            session.set_mark(42, Mark::Honor),
            Err(PlanningError::Board(BoardError::UnknownEntrant(42)))
        ));
    }

    #[test]
    fn test_set_marks_is_all_or_nothing() {
        let mock = Arc::new(MockLlmClient::with_texts(&[]));
        let mut session = session(mock);

        let err = session.set_marks(&[(1, Mark::Honor), (99, Mark::Circle)]).unwrap_err();
        assert!(matches!(
            err,
            PlanningError::Board(BoardError::UnknownEntrant(99))
        ));
        assert_eq!(session.board().mark_of(1), Some(Mark::None));
        assert!(!session.has_any_mark());

        session.set_marks(&[(1, Mark::Honor), (3, Mark::Circle)]).unwrap();
        assert_eq!(session.board().mark_of(1), Some(Mark::Honor));
        assert_eq!(session.board().mark_of(3), Some(Mark::Circle));
    }

    #[test]
    fn test_summary_and_strategy() {
        let mock = Arc::new(MockLlmClient::with_texts(&[]));
        let mut session = session(mock);
        assert_eq!(session.strategy(), Strategy::Balanced);
        session.set_strategy(Strategy::Beginner);
        assert_eq!(session.strategy(), Strategy::Beginner);

        session.set_mark(3, Mark::Honor).unwrap();
        session.set_mark(1, Mark::Honor).unwrap();
        assert_eq!(
            session.summary(),
            vec![(Mark::Honor, vec!["(1)A".to_string(), "(3)C".to_string()])]
        );

        session.clear_marks();
        assert!(session.summary().is_empty());
    }
}
