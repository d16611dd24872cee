//! Entrant board
//!
//! Holds the mark assigned to every entrant of the active race. The board is
//! co-indexed with the race's entrants: its domain is exactly the set of
//! entrant numbers, in dataset order.

use thiserror::Error;
use tracing::debug;

use crate::domain::{Entrant, Mark};

/// Board errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("Unknown entrant number: {0}")]
    UnknownEntrant(u32),
}

/// Mark assignment for every entrant of one race
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkedBoard {
    /// (entrant number, mark) in dataset order
    entries: Vec<(u32, Mark)>,
}

impl MarkedBoard {
    /// Board with every entrant unmarked
    pub fn initialize(entrants: &[Entrant]) -> Self {
        debug!(count = entrants.len(), "MarkedBoard::initialize: called");
        Self {
            entries: entrants.iter().map(|e| (e.number, Mark::None)).collect(),
        }
    }

    /// Assign a mark to one entrant
    pub fn set_mark(&mut self, number: u32, mark: Mark) -> Result<(), BoardError> {
        debug!(number, ?mark, "MarkedBoard::set_mark: called");
        let entry = self
            .entries
            .iter_mut()
            .find(|(n, _)| *n == number)
            .ok_or(BoardError::UnknownEntrant(number))?;
        entry.1 = mark;
        Ok(())
    }

    /// Builder-style variant of [`set_mark`](Self::set_mark)
    pub fn with_mark(mut self, number: u32, mark: Mark) -> Result<Self, BoardError> {
        self.set_mark(number, mark)?;
        Ok(self)
    }

    pub fn mark_of(&self, number: u32) -> Option<Mark> {
        self.entries.iter().find(|(n, _)| *n == number).map(|(_, m)| *m)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, Mark)> + '_ {
        self.entries.iter().copied()
    }

    /// Reset every entrant to unmarked
    pub fn clear(&mut self) {
        debug!("MarkedBoard::clear: called");
        for entry in &mut self.entries {
            entry.1 = Mark::None;
        }
    }

    /// True iff at least one entrant holds a mark other than None
    pub fn has_any_mark(&self) -> bool {
        self.entries.iter().any(|(_, m)| m.is_marked())
    }

    /// Marked entrants in dataset order, unmarked ones skipped
    pub fn marked_entrants<'a>(&self, entrants: &'a [Entrant]) -> Vec<(&'a Entrant, Mark)> {
        entrants
            .iter()
            .filter_map(|e| match self.mark_of(e.number) {
                Some(mark) if mark.is_marked() => Some((e, mark)),
                _ => None,
            })
            .collect()
    }

    /// Group marked entrants by mark, in fixed priority order ◎ ◯ ▲ △
    ///
    /// Marks nobody holds are omitted. Display strings are `(number)name`.
    pub fn summarize(&self, entrants: &[Entrant]) -> Vec<(Mark, Vec<String>)> {
        debug!("MarkedBoard::summarize: called");
        let marked = self.marked_entrants(entrants);
        Mark::PRIORITY
            .iter()
            .filter_map(|&mark| {
                let labels: Vec<String> = marked
                    .iter()
                    .filter(|(_, m)| *m == mark)
                    .map(|(e, _)| e.label())
                    .collect();
                if labels.is_empty() { None } else { Some((mark, labels)) }
            })
            .collect()
    }
}
