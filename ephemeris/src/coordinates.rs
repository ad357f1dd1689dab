//! Celestial coordinate frames and the transforms between them.
//!
//! All angles are in degrees at the API boundary. Azimuth is measured from
//! north through east (clockwise on a sky map seen from below).
//!
//! Catalogue and ephemeris coordinates are referred to the J2000 equator and
//! equinox, while sidereal time is measured from the equinox of date. Every
//! J2000 position is precessed to the date before its hour angle is taken.

use chrono::{DateTime, Utc};
use nalgebra::{Rotation3, Vector3};

use crate::time::{
    centuries_since_j2000, julian_day, local_sidereal_time_degrees, normalize_degrees,
};

/// Mean obliquity of the ecliptic at J2000.0 in degrees
pub const OBLIQUITY_J2000: f64 = 23.4393;

const ARCSEC_PER_DEGREE: f64 = 3_600.0;

/// Observer location on Earth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    /// Geodetic latitude in degrees, north positive
    pub latitude: f64,
    /// Longitude in degrees, east positive
    pub longitude: f64,
}

impl Observer {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Right ascension and declination in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquatorialPosition {
    /// Right ascension in [0, 360)
    pub ra: f64,
    /// Declination in [-90, 90]
    pub dec: f64,
}

impl EquatorialPosition {
    pub fn new(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }

    pub fn is_finite(&self) -> bool {
        self.ra.is_finite() && self.dec.is_finite()
    }
}

/// Altitude and azimuth for one observer at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalPosition {
    /// Degrees above the horizon; negative below it
    pub altitude: f64,
    /// Degrees from north through east, in [0, 360)
    pub azimuth: f64,
}

impl HorizontalPosition {
    pub fn new(altitude: f64, azimuth: f64) -> Self {
        Self { altitude, azimuth }
    }

    /// Strictly above the horizon; an object exactly on it is not visible
    pub fn is_above_horizon(&self) -> bool {
        self.altitude > 0.0
    }
}

/// Unit vector pointing at an equatorial position
pub fn to_unit_vector(pos: EquatorialPosition) -> Vector3<f64> {
    let (ra, dec) = (pos.ra.to_radians(), pos.dec.to_radians());
    Vector3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin())
}

/// Equatorial position of a (not necessarily unit) direction vector
pub fn from_unit_vector(v: &Vector3<f64>) -> EquatorialPosition {
    let r = v.norm();
    let ra = normalize_degrees(v.y.atan2(v.x).to_degrees());
    let dec = (v.z / r).clamp(-1.0, 1.0).asin().to_degrees();
    EquatorialPosition::new(ra, dec)
}

/// Mean obliquity of the ecliptic of date in degrees
pub fn mean_obliquity(jd: f64) -> f64 {
    let t = centuries_since_j2000(jd);
    OBLIQUITY_J2000 - (46.815 * t + 0.000_59 * t * t - 0.001_813 * t * t * t) / ARCSEC_PER_DEGREE
}

/// Rotation taking J2000 equatorial vectors to the mean equator and equinox
/// of date, from the IAU 1976 angles ζ, z and θ.
///
/// The transpose takes vectors of date back to J2000.
pub fn precession_matrix(jd: f64) -> Rotation3<f64> {
    let t = centuries_since_j2000(jd);
    let (t2, t3) = (t * t, t * t * t);
    let zeta = (2306.2181 * t + 0.30188 * t2 + 0.017998 * t3) / ARCSEC_PER_DEGREE;
    let z = (2306.2181 * t + 1.09468 * t2 + 0.018203 * t3) / ARCSEC_PER_DEGREE;
    let theta = (2004.3109 * t - 0.42665 * t2 - 0.041833 * t3) / ARCSEC_PER_DEGREE;

    Rotation3::from_axis_angle(&Vector3::z_axis(), z.to_radians())
        * Rotation3::from_axis_angle(&Vector3::y_axis(), -theta.to_radians())
        * Rotation3::from_axis_angle(&Vector3::z_axis(), zeta.to_radians())
}

/// Precess a J2000 position to the mean equinox of `jd`
pub fn precess_from_j2000(pos: EquatorialPosition, jd: f64) -> EquatorialPosition {
    from_unit_vector(&(precession_matrix(jd) * to_unit_vector(pos)))
}

/// Convert equatorial coordinates of date to horizontal given local
/// sidereal time.
///
/// # Arguments
/// * `ra` - Right ascension in degrees
/// * `dec` - Declination in degrees
/// * `lst` - Local sidereal time in degrees
/// * `latitude` - Observer latitude in degrees
pub fn horizontal_from_sidereal(ra: f64, dec: f64, lst: f64, latitude: f64) -> HorizontalPosition {
    let hour_angle = (lst - ra).to_radians();
    let dec = dec.to_radians();
    let lat = latitude.to_radians();

    let sin_alt = lat.sin() * dec.sin() + lat.cos() * dec.cos() * hour_angle.cos();
    let altitude = sin_alt.clamp(-1.0, 1.0).asin();

    let y = -dec.cos() * hour_angle.sin();
    let x = dec.sin() * lat.cos() - dec.cos() * lat.sin() * hour_angle.cos();
    let azimuth = normalize_degrees(y.atan2(x).to_degrees());

    HorizontalPosition::new(altitude.to_degrees(), azimuth)
}

/// Convert J2000 equatorial coordinates to horizontal for an observer and
/// instant, precessing them to the date first.
///
/// # Arguments
/// * `ra` - J2000 right ascension in degrees
/// * `dec` - J2000 declination in degrees
/// * `time` - Observation instant
/// * `latitude` - Observer latitude in degrees
/// * `longitude` - Observer longitude in degrees, east positive
pub fn to_horizontal(
    ra: f64,
    dec: f64,
    time: DateTime<Utc>,
    latitude: f64,
    longitude: f64,
) -> HorizontalPosition {
    let jd = julian_day(time);
    let lst = local_sidereal_time_degrees(jd, longitude);
    let of_date = precess_from_j2000(EquatorialPosition::new(ra, dec), jd);
    horizontal_from_sidereal(of_date.ra, of_date.dec, lst, latitude)
}

/// Convert ecliptic longitude/latitude to equatorial for a given obliquity
pub fn ecliptic_to_equatorial(
    longitude: f64,
    latitude: f64,
    obliquity: f64,
) -> EquatorialPosition {
    let lambda = longitude.to_radians();
    let beta = latitude.to_radians();
    let eps = obliquity.to_radians();

    let ra = (lambda.sin() * eps.cos() - beta.tan() * eps.sin()).atan2(lambda.cos());
    let dec = (beta.sin() * eps.cos() + beta.cos() * eps.sin() * lambda.sin())
        .clamp(-1.0, 1.0)
        .asin();

    EquatorialPosition::new(normalize_degrees(ra.to_degrees()), dec.to_degrees())
}

/// Great-circle separation between two equatorial positions in degrees
pub fn angular_separation(a: EquatorialPosition, b: EquatorialPosition) -> f64 {
    let (ra1, dec1) = (a.ra.to_radians(), a.dec.to_radians());
    let (ra2, dec2) = (b.ra.to_radians(), b.dec.to_radians());
    let cos_sep = dec1.sin() * dec2.sin() + dec1.cos() * dec2.cos() * (ra1 - ra2).cos();
    cos_sep.clamp(-1.0, 1.0).acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;
    use rstest::rstest;

    #[test]
    fn test_zenith_and_pole() {
        // A star on the meridian at declination == latitude is overhead
        let pos = horizontal_from_sidereal(100.0, 40.0, 100.0, 40.0);
        assert_abs_diff_eq!(pos.altitude, 90.0, epsilon = 1e-9);

        // The celestial pole sits at altitude == latitude, due north
        let pole = horizontal_from_sidereal(0.0, 90.0, 123.0, 52.0);
        assert_abs_diff_eq!(pole.altitude, 52.0, epsilon = 1e-9);
        assert!(pole.azimuth < 1e-6 || pole.azimuth > 360.0 - 1e-6);
    }

    #[rstest]
    #[case(-90.0, 90.0)] // rising in the east
    #[case(90.0, 270.0)] // setting in the west
    fn test_equator_star_on_horizon(#[case] hour_angle: f64, #[case] expected_az: f64) {
        // Seen from the equator, an equatorial star six hours from the
        // meridian sits on the horizon
        let lst = 200.0;
        let pos = horizontal_from_sidereal(lst - hour_angle, 0.0, lst, 0.0);
        assert_abs_diff_eq!(pos.altitude, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pos.azimuth, expected_az, epsilon = 1e-9);
    }

    #[test]
    fn test_mizar_from_california() {
        // Mizar (J2000) from 37N 122W on 2024-03-08 07:56 UTC against a
        // planetarium reference. What is left after precession is nutation
        // and aberration, well under an arc-minute.
        let time = Utc.with_ymd_and_hms(2024, 3, 8, 7, 56, 0).unwrap();
        let ra = (13.0 + 23.0 / 60.0 + 55.5 / 3600.0) * 15.0;
        let dec = 54.0 + 55.0 / 60.0 + 31.3 / 3600.0;

        let pos = to_horizontal(ra, dec, time, 37.0, -122.0);
        let arcmin = 1.0 / 60.0;
        assert_abs_diff_eq!(pos.altitude, 58.870_6, epsilon = arcmin);
        assert_abs_diff_eq!(pos.azimuth, 42.993_5, epsilon = arcmin);
    }

    #[test]
    fn test_precession_matches_meeus_example() {
        // Meeus, Astronomical Algorithms, example 21.b: theta Persei to
        // 2028 November 13.19 TD
        let jd = 2_462_088.69;
        let pos = precess_from_j2000(EquatorialPosition::new(41.054_063, 49.227_750), jd);
        assert_abs_diff_eq!(pos.ra, 41.547_214, epsilon = 1e-5);
        assert_abs_diff_eq!(pos.dec, 49.348_483, epsilon = 1e-5);
    }

    #[test]
    fn test_precession_is_identity_at_j2000() {
        let pos = EquatorialPosition::new(123.4, -56.7);
        let same = precess_from_j2000(pos, crate::time::J2000_JD);
        assert_abs_diff_eq!(same.ra, pos.ra, epsilon = 1e-9);
        assert_abs_diff_eq!(same.dec, pos.dec, epsilon = 1e-9);
    }

    #[test]
    fn test_polaris_far_from_pole_in_1200() {
        // Polaris was about five degrees from the pole in the 13th century,
        // so from 45N it swung between roughly 40 and 50 degrees altitude
        let (ra, dec) = (37.954_56, 89.264_11);
        let start = Utc.with_ymd_and_hms(1200, 3, 1, 0, 0, 0).unwrap();
        let of_date = precess_from_j2000(EquatorialPosition::new(ra, dec), julian_day(start));
        assert_abs_diff_eq!(of_date.dec, 84.91, epsilon = 0.05);

        let altitudes: Vec<f64> = (0..=24)
            .map(|h| {
                let time = start + chrono::Duration::hours(h);
                to_horizontal(ra, dec, time, 45.0, 0.0).altitude
            })
            .collect();
        let lowest = altitudes.iter().cloned().fold(f64::INFINITY, f64::min);
        let highest = altitudes.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(lowest < 40.5, "lowest {lowest}");
        assert!(highest > 49.5, "highest {highest}");
    }

    #[test]
    fn test_mean_obliquity_decreases() {
        let j2000 = crate::time::J2000_JD;
        assert_abs_diff_eq!(mean_obliquity(j2000), OBLIQUITY_J2000, epsilon = 1e-9);
        assert!(mean_obliquity(j2000 + 36_525.0) < OBLIQUITY_J2000);
    }

    #[test]
    fn test_azimuth_range_over_sky() {
        for ra in (0..360).step_by(15) {
            for dec in (-85..=85).step_by(17) {
                let pos = horizontal_from_sidereal(ra as f64, dec as f64, 77.0, -33.0);
                assert!((0.0..360.0).contains(&pos.azimuth));
                assert!((-90.0..=90.0).contains(&pos.altitude));
            }
        }
    }

    #[rstest]
    #[case(0.0, 0.0, 0.0)]
    #[case(90.0, 90.0, OBLIQUITY_J2000)]
    #[case(180.0, 180.0, 0.0)]
    #[case(270.0, 270.0, -OBLIQUITY_J2000)]
    fn test_ecliptic_cardinal_points(
        #[case] longitude: f64,
        #[case] ra: f64,
        #[case] dec: f64,
    ) {
        let eq = ecliptic_to_equatorial(longitude, 0.0, OBLIQUITY_J2000);
        assert_abs_diff_eq!(eq.ra, ra, epsilon = 1e-9);
        assert_abs_diff_eq!(eq.dec, dec, epsilon = 1e-9);
    }

    #[test]
    fn test_angular_separation() {
        let a = EquatorialPosition::new(10.0, 0.0);
        let b = EquatorialPosition::new(40.0, 0.0);
        assert_abs_diff_eq!(angular_separation(a, b), 30.0, epsilon = 1e-9);
        let pole = EquatorialPosition::new(0.0, 90.0);
        assert_abs_diff_eq!(angular_separation(a, pole), 90.0, epsilon = 1e-9);
    }
}
