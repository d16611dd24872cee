//! Race catalog
//!
//! Discovers race datasets in a directory and loads a chosen dataset into
//! validated [`Entrant`](crate::domain::Entrant) records.
//!
//! ```text
//! data/
//! ├── 2024_天皇賞(秋).csv   -> "2024: 天皇賞(秋)"
//! └── 2024_有馬記念.csv     -> "2024: 有馬記念"
//! ```

mod error;
mod loader;
mod scanner;

pub use error::CatalogError;
pub use loader::{REQUIRED_COLUMNS, load_race};
pub use scanner::RaceCatalog;
