//! Truncated lunar theory, phase and brightness.
//!
//! The largest periodic terms of the ELP-2000/82 series as tabulated by
//! Meeus give the Moon's geocentric position to about a quarter of a degree,
//! which is far below the size of the disc drawn on a chart.

use nalgebra::{Rotation3, Vector3};

use super::{Body, BodyPosition, KM_PER_AU};
use crate::coordinates::{from_unit_vector, mean_obliquity, precession_matrix};
use crate::time::{centuries_since_j2000, normalize_degrees};
use crate::Result;

/// Longitude terms: (coefficient in degrees, D, M, M', F)
const LONGITUDE_TERMS: [(f64, f64, f64, f64, f64); 13] = [
    (6.288_774, 0.0, 0.0, 1.0, 0.0),
    (1.274_027, 2.0, 0.0, -1.0, 0.0),
    (0.658_314, 2.0, 0.0, 0.0, 0.0),
    (0.213_618, 0.0, 0.0, 2.0, 0.0),
    (-0.185_116, 0.0, 1.0, 0.0, 0.0),
    (-0.114_332, 0.0, 0.0, 0.0, 2.0),
    (0.058_793, 2.0, 0.0, -2.0, 0.0),
    (0.057_066, 2.0, -1.0, -1.0, 0.0),
    (0.053_322, 2.0, 0.0, 1.0, 0.0),
    (0.045_758, 2.0, -1.0, 0.0, 0.0),
    (-0.040_923, 0.0, 1.0, -1.0, 0.0),
    (-0.034_720, 1.0, 0.0, 0.0, 0.0),
    (-0.030_383, 0.0, 1.0, 1.0, 0.0),
];

/// Latitude terms: (coefficient in degrees, D, M, M', F)
const LATITUDE_TERMS: [(f64, f64, f64, f64, f64); 6] = [
    (5.128_122, 0.0, 0.0, 0.0, 1.0),
    (0.280_602, 0.0, 0.0, 1.0, 1.0),
    (0.277_693, 0.0, 0.0, 1.0, -1.0),
    (0.173_237, 2.0, 0.0, 0.0, -1.0),
    (0.055_413, 2.0, 0.0, -1.0, 1.0),
    (0.046_271, 2.0, 0.0, -1.0, -1.0),
];

/// Distance terms: (coefficient in km, D, M, M', F), cosine arguments
const DISTANCE_TERMS: [(f64, f64, f64, f64, f64); 4] = [
    (-20_905.355, 0.0, 0.0, 1.0, 0.0),
    (-3_699.111, 2.0, 0.0, -1.0, 0.0),
    (-2_955.968, 2.0, 0.0, 0.0, 0.0),
    (-569.925, 0.0, 0.0, 2.0, 0.0),
];

/// Mean lunar distance in km
const MEAN_DISTANCE_KM: f64 = 385_000.56;

/// General precession in longitude per Julian century, in degrees
const PRECESSION_PER_CENTURY: f64 = 1.396_971_2;

fn series(terms: &[(f64, f64, f64, f64, f64)], args: [f64; 4], f: fn(f64) -> f64) -> f64 {
    terms
        .iter()
        .map(|&(coef, d, m, mp, ff)| {
            let angle = d * args[0] + m * args[1] + mp * args[2] + ff * args[3];
            coef * f(angle.to_radians())
        })
        .sum()
}

/// Geocentric Moon position.
///
/// The series gives longitude and latitude on the ecliptic of date. They are
/// turned into equatorial coordinates of date with the obliquity of date and
/// rotated back to J2000 with the inverse precession, so the result is in
/// the same frame as every other provider position.
pub(super) fn moon_position(jd: f64) -> Result<BodyPosition> {
    let t = centuries_since_j2000(jd);

    let mean_longitude = 218.316_447_7 + 481_267.881_234_21 * t;
    let elongation = 297.850_192_1 + 445_267.111_403_4 * t;
    let sun_anomaly = 357.529_109_2 + 35_999.050_290_9 * t;
    let moon_anomaly = 134.963_396_4 + 477_198.867_505_5 * t;
    let latitude_argument = 93.272_095_0 + 483_202.017_523_3 * t;

    let args = [elongation, sun_anomaly, moon_anomaly, latitude_argument];
    let longitude_of_date =
        normalize_degrees(mean_longitude + series(&LONGITUDE_TERMS, args, f64::sin));
    let latitude = series(&LATITUDE_TERMS, args, f64::sin);
    let distance_km = MEAN_DISTANCE_KM + series(&DISTANCE_TERMS, args, f64::cos);

    let (lambda, beta) = (longitude_of_date.to_radians(), latitude.to_radians());
    let ecliptic_of_date = Vector3::new(
        beta.cos() * lambda.cos(),
        beta.cos() * lambda.sin(),
        beta.sin(),
    );
    let obliquity = mean_obliquity(jd).to_radians();
    let equatorial_of_date =
        Rotation3::from_axis_angle(&Vector3::x_axis(), obliquity) * ecliptic_of_date;
    let equatorial = from_unit_vector(&(precession_matrix(jd).transpose() * equatorial_of_date));

    // Phase is measured against the Sun's J2000 longitude
    let longitude = normalize_degrees(longitude_of_date - PRECESSION_PER_CENTURY * t);

    BodyPosition::from_parts(Body::Moon, equatorial, longitude, distance_km / KM_PER_AU)
}

/// Phase angle in degrees from the geocentric ecliptic longitudes of Moon
/// and Sun: 0 is new, 90 first quarter, 180 full, 270 last quarter
pub fn phase_angle(moon_longitude: f64, sun_longitude: f64) -> f64 {
    normalize_degrees(moon_longitude - sun_longitude)
}

/// Illuminated fraction of the disc for a phase angle in degrees
pub fn illuminated_fraction(phase_angle: f64) -> f64 {
    ((1.0 - phase_angle.to_radians().cos()) / 2.0).clamp(0.0, 1.0)
}

/// Apparent magnitude of the Moon for a Sun-Moon-Earth angle in degrees.
///
/// Returns `None` for a non-finite angle.
pub fn moon_magnitude(phase_angle: f64) -> Option<f64> {
    if !phase_angle.is_finite() {
        return None;
    }
    let i = phase_angle.abs();
    Some(-12.73 + 0.026 * i + 4.0e-9 * i.powi(4))
}

/// The eight named lunar phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoonPhase {
    New,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    Full,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    /// Named phase for a phase angle; each name covers a 45 degree sector
    /// centred on its nominal angle
    pub fn from_phase_angle(phase_angle: f64) -> Self {
        const ORDER: [MoonPhase; 8] = [
            MoonPhase::New,
            MoonPhase::WaxingCrescent,
            MoonPhase::FirstQuarter,
            MoonPhase::WaxingGibbous,
            MoonPhase::Full,
            MoonPhase::WaningGibbous,
            MoonPhase::LastQuarter,
            MoonPhase::WaningCrescent,
        ];
        let sector = ((normalize_degrees(phase_angle) + 22.5) / 45.0).floor() as usize % 8;
        ORDER[sector]
    }

    pub fn name(&self) -> &'static str {
        match self {
            MoonPhase::New => "New Moon",
            MoonPhase::WaxingCrescent => "Waxing Crescent",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::WaxingGibbous => "Waxing Gibbous",
            MoonPhase::Full => "Full Moon",
            MoonPhase::WaningGibbous => "Waning Gibbous",
            MoonPhase::LastQuarter => "Last Quarter",
            MoonPhase::WaningCrescent => "Waning Crescent",
        }
    }
}

impl std::fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
