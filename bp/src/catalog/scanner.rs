//! Dataset discovery

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::{CatalogError, load_race};
use crate::domain::{Race, RaceDescriptor};

/// Directory of race datasets, one CSV file per race
#[derive(Debug, Clone)]
pub struct RaceCatalog {
    dir: PathBuf,
}

impl RaceCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List the races available in the catalog directory
    ///
    /// Creates the directory when it does not exist yet, then fails with
    /// [`CatalogError::Empty`] so the user knows where to drop CSV files.
    pub fn list_races(&self) -> Result<Vec<RaceDescriptor>, CatalogError> {
        debug!(dir = %self.dir.display(), "RaceCatalog::list_races: called");
        if !self.dir.is_dir() {
            fs::create_dir_all(&self.dir)?;
            warn!(
                "Created race directory {}; put race CSV files there",
                self.dir.display()
            );
            return Err(CatalogError::Empty(self.dir.clone()));
        }

        // The directory is user input; only the file part is a pattern
        let pattern = PathBuf::from(glob::Pattern::escape(&self.dir.to_string_lossy())).join("*.csv");
        let mut paths: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())?
            .filter_map(|entry| match entry {
                Ok(path) if path.is_file() => Some(path),
                Ok(_) => None,
                Err(e) => {
                    warn!("Skipping unreadable catalog entry: {}", e);
                    None
                }
            })
            .collect();
        paths.sort();

        if paths.is_empty() {
            debug!("RaceCatalog::list_races: no csv files");
            return Err(CatalogError::Empty(self.dir.clone()));
        }

        let races: Vec<RaceDescriptor> = paths.into_iter().map(RaceDescriptor::from_path).collect();
        info!(count = races.len(), dir = %self.dir.display(), "Discovered races");
        Ok(races)
    }

    /// Resolve a race by 1-based index, file stem, or display label
    pub fn find(&self, query: &str) -> Result<RaceDescriptor, CatalogError> {
        debug!(%query, "RaceCatalog::find: called");
        let races = self.list_races()?;
        let query = query.trim();

        if let Ok(index) = query.parse::<usize>()
            && index >= 1
            && index <= races.len()
        {
            debug!(index, "RaceCatalog::find: matched by index");
            return Ok(races[index - 1].clone());
        }

        races
            .into_iter()
            .find(|race| race.id == query || race.label == query)
            .ok_or_else(|| CatalogError::UnknownRace(query.to_string()))
    }

    /// Load a race and its entrants
    pub async fn load(&self, descriptor: &RaceDescriptor) -> Result<Race, CatalogError> {
        debug!(race = %descriptor.id, "RaceCatalog::load: called");
        let entrants = load_race(&descriptor.path).await?;
        info!(race = %descriptor.label, entrants = entrants.len(), "Loaded race");
        Ok(Race::new(descriptor.clone(), entrants))
    }
}
