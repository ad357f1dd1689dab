//! Solar-system bodies and the ephemeris provider seam.
//!
//! [`EphemerisProvider`] is what chart code talks to. [`AnalyticEphemeris`]
//! implements it with closed-form models that need no data files: Keplerian
//! mean elements for the planets and the Sun, and a truncated lunar theory
//! for the Moon.

mod kepler;
mod lunar;

use std::fmt;

use nalgebra::Vector3;

use crate::coordinates::{angular_separation, EquatorialPosition};
use crate::time::normalize_degrees;
use crate::{EphemerisError, Result};

pub use lunar::{illuminated_fraction, moon_magnitude, phase_angle, MoonPhase};

/// Kilometres per astronomical unit
pub const KM_PER_AU: f64 = 149_597_870.7;

/// Bodies the chart knows how to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

impl Body {
    /// The seven classical non-Earth planets, innermost first
    pub const PLANETS: [Body; 7] = [
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
    ];

    /// English display name
    pub fn name(&self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
        }
    }

    /// Astronomical symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Body::Sun => "☉",
            Body::Moon => "☾",
            Body::Mercury => "☿",
            Body::Venus => "♀",
            Body::Mars => "♂",
            Body::Jupiter => "♃",
            Body::Saturn => "♄",
            Body::Uranus => "♅",
            Body::Neptune => "♆",
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Geocentric position of a body at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPosition {
    /// Equatorial coordinates referred to the J2000 equator
    pub equatorial: EquatorialPosition,
    /// Geocentric ecliptic longitude in degrees (J2000 ecliptic)
    pub ecliptic_longitude: f64,
    /// Distance from the Earth's centre in AU
    pub distance_au: f64,
}

impl BodyPosition {
    pub fn distance_km(&self) -> f64 {
        self.distance_au * KM_PER_AU
    }

    /// Build from a geocentric ecliptic J2000 vector in AU
    pub(crate) fn from_ecliptic_vector(body: Body, v: Vector3<f64>) -> Result<Self> {
        let distance_au = v.norm();
        let ecliptic_longitude = normalize_degrees(v.y.atan2(v.x).to_degrees());
        let equatorial = kepler::ecliptic_vector_to_equatorial(&v);
        Self::from_parts(body, equatorial, ecliptic_longitude, distance_au)
    }

    /// Assemble a position, rejecting anything non-finite
    pub(crate) fn from_parts(
        body: Body,
        equatorial: EquatorialPosition,
        ecliptic_longitude: f64,
        distance_au: f64,
    ) -> Result<Self> {
        let position = Self {
            equatorial,
            ecliptic_longitude,
            distance_au,
        };
        if position.is_finite() {
            Ok(position)
        } else {
            Err(EphemerisError::NonFinite { body })
        }
    }

    fn is_finite(&self) -> bool {
        self.equatorial.is_finite()
            && self.ecliptic_longitude.is_finite()
            && self.distance_au.is_finite()
            && self.distance_au > 0.0
    }
}

/// Source of positions and brightnesses for solar-system bodies.
///
/// Implementations must be pure: the same `(body, jd)` always gives the same
/// answer, and calls may run concurrently.
pub trait EphemerisProvider: Send + Sync {
    /// Geocentric position of `body` at Julian day `jd`
    fn position(&self, body: Body, jd: f64) -> Result<BodyPosition>;

    /// Apparent visual magnitude of `body` at Julian day `jd`
    fn apparent_magnitude(&self, body: Body, jd: f64) -> Result<f64>;
}

/// Closed-form ephemeris accurate to a fraction of a degree.
///
/// Planetary elements are fitted for 1800-2050; outside that span positions
/// degrade slowly rather than failing.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticEphemeris;

impl EphemerisProvider for AnalyticEphemeris {
    fn position(&self, body: Body, jd: f64) -> Result<BodyPosition> {
        let earth = kepler::heliocentric_position(Body::Sun, jd)?;
        match body {
            Body::Sun => BodyPosition::from_ecliptic_vector(body, -earth),
            Body::Moon => lunar::moon_position(jd),
            planet => {
                let helio = kepler::heliocentric_position(planet, jd)?;
                BodyPosition::from_ecliptic_vector(body, helio - earth)
            }
        }
    }

    fn apparent_magnitude(&self, body: Body, jd: f64) -> Result<f64> {
        match body {
            Body::Sun => {
                let sun = self.position(Body::Sun, jd)?;
                Ok(-26.74 + 5.0 * sun.distance_au.log10())
            }
            Body::Moon => {
                let sun = self.position(Body::Sun, jd)?;
                let moon = self.position(Body::Moon, jd)?;
                // Sun-Moon-Earth angle from the elongation
                let phase_angle = 180.0 - angular_separation(sun.equatorial, moon.equatorial);
                moon_magnitude(phase_angle).ok_or(EphemerisError::MagnitudeUnavailable { body })
            }
            planet => {
                let earth = kepler::heliocentric_position(Body::Sun, jd)?;
                let helio = kepler::heliocentric_position(planet, jd)?;
                kepler::planet_magnitude(planet, &helio, &(helio - earth))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::J2000_JD;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_symbols_and_names() {
        assert_eq!(Body::Jupiter.symbol(), "♃");
        assert_eq!(Body::Neptune.to_string(), "Neptune");
        assert_eq!(Body::PLANETS.len(), 7);
        assert!(!Body::PLANETS.contains(&Body::Moon));
    }

    #[test]
    fn test_sun_at_j2000() {
        // Apparent solar longitude on 2000-01-01 12:00 is about 280.4 degrees
        let sun = AnalyticEphemeris.position(Body::Sun, J2000_JD).unwrap();
        assert_abs_diff_eq!(sun.ecliptic_longitude, 280.4, epsilon = 0.5);
        assert_abs_diff_eq!(sun.distance_au, 0.983, epsilon = 0.005);
        assert_abs_diff_eq!(sun.equatorial.dec, -23.0, epsilon = 0.3);
    }

    #[test]
    fn test_all_bodies_finite_across_centuries() {
        // 1700 to 2300, well outside the element fit
        for step in 0..=12 {
            let jd = 2_341_973.0 + step as f64 * 18_262.5;
            for body in Body::PLANETS
                .iter()
                .chain([Body::Sun, Body::Moon].iter())
            {
                let pos = AnalyticEphemeris.position(*body, jd).unwrap();
                assert!((0.0..360.0).contains(&pos.equatorial.ra), "{body} ra");
                assert!((-90.0..=90.0).contains(&pos.equatorial.dec), "{body} dec");
            }
        }
    }

    #[test]
    fn test_planet_magnitudes_plausible() {
        let jd = 2_460_691.5; // 2025-01-16
        let venus = AnalyticEphemeris
            .apparent_magnitude(Body::Venus, jd)
            .unwrap();
        assert!((-5.0..-3.5).contains(&venus), "Venus {venus}");

        let neptune = AnalyticEphemeris
            .apparent_magnitude(Body::Neptune, jd)
            .unwrap();
        assert!((7.5..8.2).contains(&neptune), "Neptune {neptune}");
    }

    #[test]
    fn test_moon_magnitude_near_full() {
        // Full moon on 2025-02-12 13:53 UTC
        let mag = AnalyticEphemeris
            .apparent_magnitude(Body::Moon, 2_460_719.08)
            .unwrap();
        assert!((-13.0..-12.0).contains(&mag), "Moon {mag}");
    }
}
