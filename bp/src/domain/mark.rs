//! Rating marks a bettor assigns to entrants

use serde::{Deserialize, Serialize};
use tracing::debug;

/// User-assigned confidence mark
///
/// Any number of entrants may share a mark, including Honor. Nothing in the
/// crate enforces a single ◎.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mark {
    /// ◎ - top pick
    Honor,
    /// ◯ - second pick
    Circle,
    /// ▲ - dark horse
    Triangle,
    /// △ - outside chance
    OpenTriangle,
    /// 無印
    #[default]
    None,
}

impl Mark {
    /// Marks that count as "marked", in summary priority order
    pub const PRIORITY: [Mark; 4] = [Mark::Honor, Mark::Circle, Mark::Triangle, Mark::OpenTriangle];

    /// Every selectable value, in the order a picker presents them
    pub const ALL: [Mark; 5] = [Mark::Honor, Mark::Circle, Mark::Triangle, Mark::OpenTriangle, Mark::None];

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Honor => "◎",
            Self::Circle => "◯",
            Self::Triangle => "▲",
            Self::OpenTriangle => "△",
            Self::None => "無印",
        }
    }

    pub fn is_marked(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl std::str::FromStr for Mark {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "Mark::from_str: called");
        match s.trim().to_lowercase().as_str() {
            "◎" | "honor" | "honour" => Ok(Self::Honor),
            "◯" | "○" | "circle" => Ok(Self::Circle),
            "▲" | "triangle" => Ok(Self::Triangle),
            "△" | "open-triangle" | "opentriangle" => Ok(Self::OpenTriangle),
            "無印" | "none" | "-" | "x" => Ok(Self::None),
            _ => Err(format!("Unknown mark: {} (use ◎ ◯ ▲ △ 無印)", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_none() {
        assert_eq!(Mark::default(), Mark::None);
        assert!(!Mark::default().is_marked());
    }

    #[test]
    fn test_parse_symbols_and_names() {
        assert_eq!("◎".parse::<Mark>().unwrap(), Mark::Honor);
        assert_eq!("○".parse::<Mark>().unwrap(), Mark::Circle);
        assert_eq!("◯".parse::<Mark>().unwrap(), Mark::Circle);
        assert_eq!("Triangle".parse::<Mark>().unwrap(), Mark::Triangle);
        assert_eq!("open-triangle".parse::<Mark>().unwrap(), Mark::OpenTriangle);
        assert_eq!("無印".parse::<Mark>().unwrap(), Mark::None);
        assert!("☆".parse::<Mark>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for mark in Mark::ALL {
            assert_eq!(mark.to_string().parse::<Mark>().unwrap(), mark);
        }
    }

    #[test]
    fn test_priority_excludes_none() {
        assert!(Mark::PRIORITY.iter().all(|m| m.is_marked()));
        assert_eq!(Mark::PRIORITY[0], Mark::Honor);
    }
}
