//! Catalog error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while discovering or loading race datasets
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("No race CSV files found in {}", .0.display())]
    Empty(PathBuf),

    #[error("Dataset is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Invalid row at line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },

    #[error("Race not found: {0}")]
    UnknownRace(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv_async::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl CatalogError {
    /// Names of the missing columns, if this is a scan error
    pub fn missing_columns(&self) -> Option<&[String]> {
        match self {
            CatalogError::MissingColumns(cols) => Some(cols),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_lists_every_column() {
        let err = CatalogError::MissingColumns(vec!["winOdds".to_string(), "popularityRank".to_string()]);
        assert_eq!(
            err.to_string(),
            "Dataset is missing required column(s): winOdds, popularityRank"
        );
        assert_eq!(err.missing_columns().map(|c| c.len()), Some(2));
    }

    #[test]
    fn test_empty_message_names_directory() {
        let err = CatalogError::Empty(PathBuf::from("data"));
        assert!(err.to_string().contains("data"));
        assert!(err.missing_columns().is_none());
    }
}
