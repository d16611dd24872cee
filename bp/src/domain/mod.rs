//! Domain types for bakenplanner
//!
//! Value types shared by every other module: the entrants of a race, the
//! marks a user assigns to them, and the betting strategy that shapes the
//! proposal prompt. Entrants are immutable once a race has been loaded.

mod entrant;
mod mark;
mod race;
mod strategy;

pub use entrant::Entrant;
pub use mark::Mark;
pub use race::{Race, RaceDescriptor};
pub use strategy::Strategy;
