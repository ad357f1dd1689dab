//! Star and constellation catalogue for sky charts.
//!
//! This crate owns the static celestial data a chart is drawn from: a list of
//! star records (position, magnitude, colour index, optional names) and the
//! constellation stick figures expressed as polylines in equatorial
//! coordinates. Data comes from a [`data::CatalogSource`] and is cached by a
//! [`Catalog`] so the underlying parse happens once per process.
//!
//! # Example
//!
//! ```rust
//! use starfield::{Catalog, data::EmbeddedSource};
//!
//! let catalog = Catalog::new(EmbeddedSource);
//! let stars = catalog.load_stars().unwrap();
//! let sirius = stars.iter().find(|s| s.name.as_deref() == Some("Sirius")).unwrap();
//! assert!(sirius.magnitude < 0.0);
//! ```

use thiserror::Error;

pub mod catalog;
pub mod catalogs;
pub mod color;
pub mod constellations;
pub mod data;

pub use catalog::Catalog;
pub use catalogs::{ConstellationLine, StarCatalog, StarRecord};
pub use color::{color_for_index, Rgb};
pub use constellations::name_for_abbreviation;

/// Errors raised while loading catalogue data.
///
/// Every variant means the catalogue is unavailable; callers treat it as
/// fatal for the request that needed it.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The backing data was found but is not usable
    #[error("Catalogue '{source_name}' unavailable: {reason}")]
    Unavailable { source_name: String, reason: String },

    /// The backing data is not valid JSON for the expected schema
    #[error("Catalogue parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backing file could not be read
    #[error("Catalogue I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An embedded or on-disk asset is missing
    #[error("Catalogue asset not found: {0}")]
    MissingAsset(String),
}

/// Result type for catalogue operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
