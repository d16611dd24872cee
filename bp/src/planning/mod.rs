//! Planning module - the two-stage betting plan workflow
//!
//! ```text
//! Idle ──request_bets──▶ BetsRequested ──ok──▶ BetsReady
//!  ▲                          │ err (restore)      │ request_allocation
//!  │                          ▼                    ▼
//!  │                      (prior stage)     AllocationRequested ──ok──▶ AllocationReady
//!  │                                               │ err (restore)        │
//!  └──────────── select_race (different race) ◀────┴──────────────────────┘
//! ```
//!
//! The session owns the board of the active race and the texts each LLM call
//! produced. Changing race is the only thing that wipes them.

mod error;
mod session;

pub use error::PlanningError;
pub use session::{PlanningSession, SessionConfig, Stage};
