//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Persona shared by both stages
pub const SYSTEM: &str = include_str!("../../prompts/system.pmt");

/// Bet proposal rules
pub const BETS: &str = include_str!("../../prompts/bets.pmt");

/// Budget allocation instructions
pub const ALLOCATION: &str = include_str!("../../prompts/allocation.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "system" => Some(SYSTEM),
        "bets" => Some(BETS),
        "allocation" => Some(ALLOCATION),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
