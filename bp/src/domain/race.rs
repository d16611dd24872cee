//! Race datasets

use std::path::PathBuf;

use super::Entrant;

/// A race dataset discovered in the catalog directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceDescriptor {
    /// File stem, e.g. `2024_天皇賞(秋)`
    pub id: String,

    /// Display label, e.g. `2024: 天皇賞(秋)`
    pub label: String,

    /// Where the dataset lives
    pub path: PathBuf,
}

impl RaceDescriptor {
    /// Build a descriptor from a dataset path using the `{year}_{raceName}` convention
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let label = id.replace('_', ": ");
        Self { id, label, path }
    }

    /// Race name without the year prefix
    pub fn race_name(&self) -> &str {
        self.id.split_once('_').map(|(_, name)| name).unwrap_or(&self.id)
    }
}

/// A loaded race: its descriptor plus the entrants in dataset order
#[derive(Debug, Clone)]
pub struct Race {
    pub descriptor: RaceDescriptor,
    pub entrants: Vec<Entrant>,
}

impl Race {
    pub fn new(descriptor: RaceDescriptor, entrants: Vec<Entrant>) -> Self {
        Self { descriptor, entrants }
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn entrant(&self, number: u32) -> Option<&Entrant> {
        self.entrants.iter().find(|e| e.number == number)
    }
}
