//! What an observer sees at one instant.
//!
//! [`SkyView`] precomputes the Julian day, local sidereal time and the
//! J2000-to-date precession once and then answers every per-chart question
//! against them. Each method is a pure
//! function of the view, so they can run concurrently on a shared reference.
//!
//! The free functions at the bottom of the module are shorthands that build
//! a view over [`AnalyticEphemeris`].

use chrono::{DateTime, Utc};
use log::{debug, warn};
use nalgebra::Rotation3;
use starfield::{ConstellationLine, StarRecord};

use crate::bodies::{
    illuminated_fraction, phase_angle, AnalyticEphemeris, Body, EphemerisProvider, MoonPhase,
};
use crate::coordinates::{
    ecliptic_to_equatorial, from_unit_vector, horizontal_from_sidereal, precession_matrix,
    to_unit_vector, EquatorialPosition, HorizontalPosition, Observer, OBLIQUITY_J2000,
};
use crate::time::{julian_day, local_sidereal_time_degrees};
use crate::{EphemerisError, Result};

/// Faintest magnitude drawn unless configured otherwise
pub const DEFAULT_MAX_MAGNITUDE: f64 = 6.5;

/// Ecliptic samples per full circle unless configured otherwise
pub const DEFAULT_ECLIPTIC_POINTS: usize = 72;

/// Equatorial radius of the Earth in km
const EARTH_RADIUS_KM: f64 = 6_378.14;

/// The zodiac signs in ecliptic order: (name, glyph, constellation)
const ZODIAC: [(&str, &str, &str); 12] = [
    ("Aries", "♈", "Ari"),
    ("Taurus", "♉", "Tau"),
    ("Gemini", "♊", "Gem"),
    ("Cancer", "♋", "Cnc"),
    ("Leo", "♌", "Leo"),
    ("Virgo", "♍", "Vir"),
    ("Libra", "♎", "Lib"),
    ("Scorpio", "♏", "Sco"),
    ("Sagittarius", "♐", "Sgr"),
    ("Capricorn", "♑", "Cap"),
    ("Aquarius", "♒", "Aqr"),
    ("Pisces", "♓", "Psc"),
];

/// A catalogue star above the horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleStar {
    pub id: u64,
    pub name: Option<String>,
    pub constellation: Option<String>,
    pub magnitude: f64,
    pub b_v: f64,
    pub position: HorizontalPosition,
}

/// A planet's place in the sky; may be below the horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct VisiblePlanet {
    pub body: Body,
    /// Apparent magnitude, 0 when the photometric model failed
    pub magnitude: f64,
    /// Geocentric J2000 coordinates as the provider returned them
    pub equatorial: EquatorialPosition,
    pub position: HorizontalPosition,
}

impl VisiblePlanet {
    pub fn name(&self) -> &'static str {
        self.body.name()
    }

    pub fn symbol(&self) -> &'static str {
        self.body.symbol()
    }
}

/// The Moon's topocentric place and phase.
#[derive(Debug, Clone, PartialEq)]
pub struct MoonData {
    pub position: HorizontalPosition,
    /// Elongation from the Sun in [0, 360): 0 new, 180 full
    pub phase_angle: f64,
    /// Illuminated fraction of the disc in [0, 1]
    pub illumination: f64,
    pub phase: MoonPhase,
    pub magnitude: f64,
}

impl MoonData {
    /// Between new and full
    pub fn is_waxing(&self) -> bool {
        self.phase_angle < 180.0
    }
}

/// A constellation figure in horizontal coordinates.
///
/// Only segments with at least one vertex above the horizon are kept, but
/// every vertex of a kept segment is present so figures do not break up as
/// they rise and set.
#[derive(Debug, Clone, PartialEq)]
pub struct HorizontalConstellation {
    pub id: String,
    pub segments: Vec<Vec<HorizontalPosition>>,
}

impl HorizontalConstellation {
    /// Vertices strictly above the horizon
    pub fn visible_vertices(&self) -> impl Iterator<Item = &HorizontalPosition> {
        self.segments
            .iter()
            .flatten()
            .filter(|p| p.is_above_horizon())
    }
}

/// One zodiac sign, placed at the centre of its 30 degree ecliptic span.
#[derive(Debug, Clone, PartialEq)]
pub struct ZodiacSign {
    pub name: &'static str,
    pub symbol: &'static str,
    /// IAU abbreviation of the constellation the sign is named after
    pub constellation: &'static str,
    pub ecliptic_longitude: f64,
    pub position: HorizontalPosition,
    /// Above the horizon
    pub visible: bool,
}

/// Time, observer and ephemeris for one chart.
pub struct SkyView<'a, P: EphemerisProvider + ?Sized> {
    time: DateTime<Utc>,
    observer: Observer,
    provider: &'a P,
    jd: f64,
    lst: f64,
    precession: Rotation3<f64>,
}

impl<'a, P: EphemerisProvider + ?Sized> SkyView<'a, P> {
    /// Create a view; sidereal time is computed here once
    pub fn new(time: DateTime<Utc>, observer: Observer, provider: &'a P) -> Self {
        let jd = julian_day(time);
        let lst = local_sidereal_time_degrees(jd, observer.longitude);
        debug!(
            "Sky view at {} for ({:.4}, {:.4}): JD {:.5}, LST {:.3} deg",
            time, observer.latitude, observer.longitude, jd, lst
        );
        Self {
            time,
            observer,
            provider,
            jd,
            lst,
            precession: precession_matrix(jd),
        }
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn observer(&self) -> Observer {
        self.observer
    }

    pub fn julian_day(&self) -> f64 {
        self.jd
    }

    /// Local sidereal time in degrees
    pub fn local_sidereal_time(&self) -> f64 {
        self.lst
    }

    /// Precess a J2000 position to the mean equinox of this view's date
    pub fn of_date(&self, pos: EquatorialPosition) -> EquatorialPosition {
        from_unit_vector(&(self.precession * to_unit_vector(pos)))
    }

    /// Horizontal position of a J2000 equatorial point
    pub fn horizontal(&self, ra: f64, dec: f64) -> HorizontalPosition {
        let pos = self.of_date(EquatorialPosition::new(ra, dec));
        self.horizontal_of_date(pos.ra, pos.dec)
    }

    /// Horizontal position of a point already referred to the equinox of date
    pub fn horizontal_of_date(&self, ra: f64, dec: f64) -> HorizontalPosition {
        horizontal_from_sidereal(ra, dec, self.lst, self.observer.latitude)
    }

    /// Stars no fainter than `max_magnitude` that are strictly above the
    /// horizon, in catalogue order
    pub fn visible_stars(&self, stars: &[StarRecord], max_magnitude: f64) -> Vec<VisibleStar> {
        let visible: Vec<VisibleStar> = stars
            .iter()
            .filter(|s| s.magnitude <= max_magnitude)
            .filter_map(|s| {
                let position = self.horizontal(s.ra, s.dec);
                position.is_above_horizon().then(|| VisibleStar {
                    id: s.id,
                    name: s.name.clone(),
                    constellation: s.constellation.clone(),
                    magnitude: s.magnitude,
                    b_v: s.b_v,
                    position,
                })
            })
            .collect();
        debug!(
            "{} of {} stars visible at magnitude <= {}",
            visible.len(),
            stars.len(),
            max_magnitude
        );
        visible
    }

    /// All seven planets, above or below the horizon.
    ///
    /// A planet whose position cannot be computed is left out; one whose
    /// magnitude cannot be computed gets magnitude 0.
    pub fn planet_positions(&self) -> Vec<VisiblePlanet> {
        Body::PLANETS
            .iter()
            .filter_map(|&body| {
                let pos = match self.provider.position(body, self.jd) {
                    Ok(pos) => pos,
                    Err(e) => {
                        warn!("Skipping {body}: {e}");
                        return None;
                    }
                };
                let magnitude = self
                    .provider
                    .apparent_magnitude(body, self.jd)
                    .unwrap_or_else(|e| {
                        warn!("{e}; using magnitude 0");
                        0.0
                    });
                Some(VisiblePlanet {
                    body,
                    magnitude,
                    equatorial: pos.equatorial,
                    position: self.horizontal(pos.equatorial.ra, pos.equatorial.dec),
                })
            })
            .collect()
    }

    /// Topocentric Moon position with phase and brightness
    pub fn moon_data(&self) -> Result<MoonData> {
        let moon = self.provider.position(Body::Moon, self.jd)?;
        let sun = self.provider.position(Body::Sun, self.jd)?;

        let geocentric = self.horizontal(moon.equatorial.ra, moon.equatorial.dec);
        // Diurnal parallax lowers the Moon by up to a degree
        let parallax = (EARTH_RADIUS_KM / moon.distance_km()).asin().to_degrees();
        let altitude = geocentric.altitude - parallax * geocentric.altitude.to_radians().cos();
        if !altitude.is_finite() {
            return Err(EphemerisError::NonFinite { body: Body::Moon });
        }

        let phase = phase_angle(moon.ecliptic_longitude, sun.ecliptic_longitude);
        let magnitude = self
            .provider
            .apparent_magnitude(Body::Moon, self.jd)
            .unwrap_or_else(|e| {
                warn!("{e}; using magnitude 0");
                0.0
            });

        Ok(MoonData {
            position: HorizontalPosition::new(altitude, geocentric.azimuth),
            phase_angle: phase,
            illumination: illuminated_fraction(phase),
            phase: MoonPhase::from_phase_angle(phase),
            magnitude,
        })
    }

    /// Horizontal position of the Sun
    pub fn sun_position(&self) -> Result<HorizontalPosition> {
        let sun = self.provider.position(Body::Sun, self.jd)?;
        Ok(self.horizontal(sun.equatorial.ra, sun.equatorial.dec))
    }

    /// Constellation figures with at least one vertex above the horizon
    pub fn constellation_lines(&self, lines: &[ConstellationLine]) -> Vec<HorizontalConstellation> {
        lines
            .iter()
            .filter_map(|line| {
                let segments: Vec<Vec<HorizontalPosition>> = line
                    .segments
                    .iter()
                    .map(|segment| {
                        segment
                            .iter()
                            .map(|&(ra, dec)| self.horizontal(ra, dec))
                            .collect::<Vec<_>>()
                    })
                    .filter(|segment| segment.iter().any(HorizontalPosition::is_above_horizon))
                    .collect();
                (!segments.is_empty()).then(|| HorizontalConstellation {
                    id: line.id.clone(),
                    segments,
                })
            })
            .collect()
    }

    /// All twelve zodiac signs with a visibility flag
    pub fn zodiac_positions(&self) -> Vec<ZodiacSign> {
        ZODIAC
            .iter()
            .enumerate()
            .map(|(i, &(name, symbol, constellation))| {
                let ecliptic_longitude = i as f64 * 30.0 + 15.0;
                let eq = ecliptic_to_equatorial(ecliptic_longitude, 0.0, OBLIQUITY_J2000);
                let position = self.horizontal(eq.ra, eq.dec);
                ZodiacSign {
                    name,
                    symbol,
                    constellation,
                    ecliptic_longitude,
                    position,
                    visible: position.is_above_horizon(),
                }
            })
            .collect()
    }

    /// The ecliptic sampled at `num_points` even longitude steps, without
    /// any horizon filtering
    pub fn ecliptic_path(&self, num_points: usize) -> Vec<HorizontalPosition> {
        (0..num_points)
            .map(|i| {
                let longitude = i as f64 * 360.0 / num_points as f64;
                let eq = ecliptic_to_equatorial(longitude, 0.0, OBLIQUITY_J2000);
                self.horizontal(eq.ra, eq.dec)
            })
            .collect()
    }
}

/// Stars visible from `observer` at `time` using the analytic ephemeris
pub fn visible_stars(
    stars: &[StarRecord],
    time: DateTime<Utc>,
    observer: Observer,
    max_magnitude: f64,
) -> Vec<VisibleStar> {
    SkyView::new(time, observer, &AnalyticEphemeris).visible_stars(stars, max_magnitude)
}

/// Planet positions using the analytic ephemeris
pub fn planet_positions(time: DateTime<Utc>, observer: Observer) -> Vec<VisiblePlanet> {
    SkyView::new(time, observer, &AnalyticEphemeris).planet_positions()
}

/// Moon position and phase using the analytic ephemeris
pub fn moon_data(time: DateTime<Utc>, observer: Observer) -> Result<MoonData> {
    SkyView::new(time, observer, &AnalyticEphemeris).moon_data()
}

/// Sun position using the analytic ephemeris
pub fn sun_position(time: DateTime<Utc>, observer: Observer) -> Result<HorizontalPosition> {
    SkyView::new(time, observer, &AnalyticEphemeris).sun_position()
}

/// Constellation figures in horizontal coordinates
pub fn constellation_lines(
    lines: &[ConstellationLine],
    time: DateTime<Utc>,
    observer: Observer,
) -> Vec<HorizontalConstellation> {
    SkyView::new(time, observer, &AnalyticEphemeris).constellation_lines(lines)
}

/// Zodiac signs in horizontal coordinates
pub fn zodiac_positions(time: DateTime<Utc>, observer: Observer) -> Vec<ZodiacSign> {
    SkyView::new(time, observer, &AnalyticEphemeris).zodiac_positions()
}

/// The ecliptic in horizontal coordinates
pub fn ecliptic_path(
    time: DateTime<Utc>,
    observer: Observer,
    num_points: usize,
) -> Vec<HorizontalPosition> {
    SkyView::new(time, observer, &AnalyticEphemeris).ecliptic_path(num_points)
}
