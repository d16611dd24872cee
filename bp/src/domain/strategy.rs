//! Betting strategies offered to the proposal stage

use serde::{Deserialize, Serialize};

/// Risk profile the bettor wants the proposal to follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    HighPayout,
    HitRateFocus,
    Beginner,
    Advanced,
    #[default]
    Balanced,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::HighPayout,
        Strategy::HitRateFocus,
        Strategy::Beginner,
        Strategy::Advanced,
        Strategy::Balanced,
    ];

    /// Label embedded in prompts
    pub fn label(&self) -> &'static str {
        match self {
            Self::HighPayout => "高配当狙い",
            Self::HitRateFocus => "的中率重視",
            Self::Beginner => "初心者向け",
            Self::Advanced => "上級者向け",
            Self::Balanced => "バランス重視",
        }
    }

    /// Short name accepted on the command line
    pub fn key(&self) -> &'static str {
        match self {
            Self::HighPayout => "high-payout",
            Self::HitRateFocus => "hit-rate",
            Self::Beginner => "beginner",
            Self::Advanced => "advanced",
            Self::Balanced => "balanced",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.label() == s || strategy.key().eq_ignore_ascii_case(s))
            .or(match s.to_lowercase().as_str() {
                "hit-rate-focus" => Some(Self::HitRateFocus),
                _ => None,
            })
            .ok_or_else(|| format!("Unknown strategy: {}", s))
    }
}
