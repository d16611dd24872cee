//! Race entrant record

use serde::{Deserialize, Serialize};

/// One competing horse in a race
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entrant {
    /// Horse number, unique within a race
    pub number: u32,

    /// Horse name
    pub name: String,

    /// Win odds (e.g. 3.5 means 3.5倍)
    pub win_odds: f64,

    /// Popularity rank (1 = favourite)
    pub popularity_rank: u32,
}

impl Entrant {
    pub fn new(number: u32, name: impl Into<String>, win_odds: f64, popularity_rank: u32) -> Self {
        Self {
            number,
            name: name.into(),
            win_odds,
            popularity_rank,
        }
    }

    /// Display form used in mark summaries: `(3)ドウデュース`
    pub fn label(&self) -> String {
        format!("({}){}", self.number, self.name)
    }

    /// Win odds with exactly one decimal place: `3` -> `3.0倍`
    pub fn odds_display(&self) -> String {
        format!("{:.1}倍", self.win_odds)
    }
}
