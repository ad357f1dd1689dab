//! Sky chart composition and rendering.
//!
//! Takes a [`ChartConfig`] (where, when, how big, which theme) and produces a
//! [`VectorDocument`]: an ordered stack of SVG layers showing the sky above
//! the observer, ready to be written out or rasterised.
//!
//! The pipeline is driven by [`ChartRenderer`]:
//!
//! 1. validate the request and resolve the observer's coordinates
//! 2. load the star and constellation catalogue (once per renderer)
//! 3. compute every sky object set concurrently into one [`compose::SkyData`]
//! 4. build the layers in a fixed order and assemble the document
//!
//! # Example
//!
//! ```rust
//! use skychart::{ChartConfig, ChartRenderer, NoProgress};
//!
//! let mut config = ChartConfig::default();
//! config.location = Some("48.8566,2.3522".to_string());
//! config.timestamp = Some("2025-01-15T23:00:00Z".to_string());
//!
//! let renderer = ChartRenderer::embedded();
//! let document = renderer.render(&config, &NoProgress).unwrap();
//! assert!(document.to_svg().starts_with("<svg"));
//! ```

use thiserror::Error;

pub mod compose;
pub mod config;
pub mod document;
pub mod layers;
pub mod location;
pub mod progress;
pub mod projection;
pub mod raster;
pub mod theme;

pub use compose::{render_chart, ChartRenderer, SkyData};
pub use config::{CelestialObjects, ChartConfig, PosterSize, ResolvedChart, StarColorMode};
pub use document::{ChartLayer, ChartMetadata, LayerKind, VectorDocument};
pub use location::{Coordinates, LocationResolver, MapUrlResolver};
pub use progress::{CallbackProgress, NoProgress, ProgressEvent, ProgressSink, ProgressStage};
pub use projection::{
    build_canvas_config, polar_project, poster_padding, project, stereographic_project,
    CanvasConfig, ProjectedPoint, ProjectionMode,
};
pub use raster::OutputFormat;
pub use theme::{Color, Theme};

/// A request rejected before any computation started.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("No timestamp given")]
    MissingTimestamp,

    #[error("Invalid timestamp '{0}': expected ISO-8601, e.g. 2025-01-15T23:00:00Z")]
    InvalidTimestamp(String),

    #[error("Latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("Canvas dimensions leave no room for the sky disc")]
    InvalidDimensions,

    #[error("Caption fraction {0} outside [0, 0.5)")]
    InvalidCaptionFraction(f64),

    #[error("Magnitude limit {0} is not a finite number")]
    InvalidMagnitudeLimit(f64),

    #[error("Ecliptic sample count {0} outside [2, 3600]")]
    InvalidEclipticPoints(usize),
}

/// Errors that fail a whole chart render.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Invalid chart request: {0}")]
    Validation(#[from] ValidationError),

    #[error("No coordinates given and the location reference could not be resolved")]
    MissingCoordinates,

    #[error(transparent)]
    CatalogueUnavailable(#[from] starfield::CatalogError),

    #[error("Ephemeris failure: {0}")]
    Ephemeris(#[from] ephemeris::EphemerisError),

    /// An internal invariant was violated while drawing
    #[error("Chart composition failed: {0}")]
    Composition(String),

    #[error("Theme error: {0}")]
    Theme(String),

    /// A configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for chart operations.
pub type Result<T> = std::result::Result<T, ChartError>;
