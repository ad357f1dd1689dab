//! Sidereal time, coordinate transforms and solar-system ephemerides.
//!
//! This crate turns catalogue coordinates and an instant in time into what an
//! observer actually sees: altitude and azimuth for stars, the Sun, the Moon
//! and the seven classical planets, plus the ecliptic and the zodiac band.
//!
//! The building blocks are:
//! - [`time`]: Julian day and sidereal time
//! - [`coordinates`]: equatorial, ecliptic and horizontal frames
//! - [`bodies`]: the [`EphemerisProvider`] seam and the built-in
//!   [`AnalyticEphemeris`] (Keplerian planets, truncated lunar theory)
//! - [`sky`]: [`SkyView`], which bundles time, observer and provider and
//!   answers the per-chart questions
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use ephemeris::{AnalyticEphemeris, Observer, SkyView};
//!
//! let time = Utc.with_ymd_and_hms(2025, 1, 15, 23, 0, 0).unwrap();
//! let paris = Observer::new(48.8566, 2.3522);
//! let view = SkyView::new(time, paris, &AnalyticEphemeris);
//! let moon = view.moon_data().unwrap();
//! assert!((0.0..=1.0).contains(&moon.illumination));
//! ```

use thiserror::Error;

pub mod bodies;
pub mod coordinates;
pub mod sky;
pub mod time;

pub use bodies::{AnalyticEphemeris, Body, BodyPosition, EphemerisProvider, MoonPhase};
pub use coordinates::{
    ecliptic_to_equatorial, horizontal_from_sidereal, mean_obliquity, precess_from_j2000,
    precession_matrix, to_horizontal, EquatorialPosition, HorizontalPosition, Observer,
    OBLIQUITY_J2000,
};
pub use sky::{
    constellation_lines, ecliptic_path, moon_data, planet_positions, sun_position,
    visible_stars, zodiac_positions, HorizontalConstellation, MoonData, SkyView, VisiblePlanet,
    VisibleStar, ZodiacSign,
};

/// Errors raised while computing a body's position or brightness.
///
/// These are per-object failures; chart code decides whether a given body is
/// essential or can be dropped.
#[derive(Debug, Error)]
pub enum EphemerisError {
    /// The photometric model has no answer for this geometry
    #[error("Apparent magnitude unavailable for {body}")]
    MagnitudeUnavailable { body: Body },

    /// The computed position is not a finite number
    #[error("Non-finite position computed for {body}")]
    NonFinite { body: Body },

    /// The model does not cover this body
    #[error("Body not supported by this model: {0}")]
    UnsupportedBody(Body),
}

/// Result type for ephemeris operations.
pub type Result<T> = std::result::Result<T, EphemerisError>;
