//! CSV dataset loader

use std::collections::HashSet;
use std::path::Path;

use csv_async::{AsyncReaderBuilder, StringRecord, Trim};
use futures::StreamExt;
use tokio::io::{AsyncRead, BufReader};
use tracing::debug;

use super::CatalogError;
use crate::domain::Entrant;

/// Required columns, each with the header names accepted for it
///
/// The first name is canonical and is the one reported when missing.
pub const REQUIRED_COLUMNS: [(&str, &[&str]); 4] = [
    ("number", &["number", "馬番"]),
    ("name", &["name", "馬名"]),
    ("winOdds", &["winOdds", "オッズ"]),
    ("popularityRank", &["popularityRank", "人気"]),
];

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    number: usize,
    name: usize,
    win_odds: usize,
    popularity_rank: usize,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self, CatalogError> {
        debug!(?headers, "ColumnMap::from_headers: called");
        let position = |aliases: &[&str]| -> Option<usize> {
            headers
                .iter()
                .position(|h| aliases.contains(&h.trim_start_matches('\u{feff}').trim()))
        };

        let found: Vec<Option<usize>> = REQUIRED_COLUMNS.iter().map(|(_, aliases)| position(*aliases)).collect();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .zip(&found)
            .filter(|(_, pos)| pos.is_none())
            .map(|((canonical, _), _)| canonical.to_string())
            .collect();

        match found.as_slice() {
            [Some(number), Some(name), Some(win_odds), Some(popularity_rank)] => Ok(Self {
                number: *number,
                name: *name,
                win_odds: *win_odds,
                popularity_rank: *popularity_rank,
            }),
            _ => {
                debug!(?missing, "ColumnMap::from_headers: missing columns");
                Err(CatalogError::MissingColumns(missing))
            }
        }
    }

    fn parse(&self, record: &StringRecord, line: u64) -> Result<Entrant, CatalogError> {
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();
        let invalid = |reason: String| CatalogError::InvalidRow { line, reason };

        let number: u32 = field(self.number)
            .parse()
            .map_err(|_| invalid(format!("number '{}' is not a positive integer", field(self.number))))?;
        if number == 0 {
            return Err(invalid("number must be positive".to_string()));
        }

        let name = field(self.name);
        if name.is_empty() {
            return Err(invalid("name is empty".to_string()));
        }

        let win_odds: f64 = field(self.win_odds)
            .parse()
            .map_err(|_| invalid(format!("winOdds '{}' is not a number", field(self.win_odds))))?;
        if !(win_odds.is_finite() && win_odds > 0.0) {
            return Err(invalid(format!("winOdds must be positive, got {}", win_odds)));
        }

        let popularity_rank: u32 = field(self.popularity_rank).parse().map_err(|_| {
            invalid(format!(
                "popularityRank '{}' is not a positive integer",
                field(self.popularity_rank)
            ))
        })?;
        if popularity_rank == 0 {
            return Err(invalid("popularityRank must be positive".to_string()));
        }

        Ok(Entrant::new(number, name, win_odds, popularity_rank))
    }
}

/// Load the entrants of one race from a CSV file
pub async fn load_race(path: impl AsRef<Path>) -> Result<Vec<Entrant>, CatalogError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "load_race: called");
    let file = tokio::fs::File::open(path).await?;
    read_entrants(file).await
}

/// Parse entrants from any CSV byte source
pub(crate) async fn read_entrants<R>(reader: R) -> Result<Vec<Entrant>, CatalogError>
where
    R: AsyncRead + Unpin + Send,
{
    let buf = BufReader::new(reader);
    let mut csv_reader = AsyncReaderBuilder::new().trim(Trim::All).create_reader(buf);
    let columns = ColumnMap::from_headers(csv_reader.headers().await?)?;

    let mut entrants = Vec::new();
    let mut seen = HashSet::new();
    let mut records = csv_reader.records();
    while let Some(record) = records.next().await {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.iter().all(|f| f.trim().is_empty()) {
            debug!(line, "read_entrants: skipping blank row");
            continue;
        }
        let entrant = columns.parse(&record, line)?;
        if !seen.insert(entrant.number) {
            return Err(CatalogError::InvalidRow {
                line,
                reason: format!("duplicate number {}", entrant.number),
            });
        }
        entrants.push(entrant);
    }

    debug!(count = entrants.len(), "read_entrants: parsed");
    Ok(entrants)
}
