//! Keplerian planetary positions and magnitudes.
//!
//! Mean orbital elements and their rates per Julian century are the JPL
//! approximate elements for 1800-2050 AD, referred to the J2000 ecliptic and
//! equinox. Magnitudes follow Müller's phase-angle laws.

use nalgebra::{Rotation3, Vector3};

use super::Body;
use crate::coordinates::{EquatorialPosition, OBLIQUITY_J2000};
use crate::time::{centuries_since_j2000, normalize_degrees};
use crate::{EphemerisError, Result};

/// Mean elements at J2000 and their rates per century.
///
/// Order is semi-major axis (AU), eccentricity, inclination, mean longitude,
/// longitude of perihelion and longitude of ascending node (degrees).
struct OrbitalElements {
    base: [f64; 6],
    rate: [f64; 6],
}

const MERCURY: OrbitalElements = OrbitalElements {
    base: [0.387_099_27, 0.205_635_93, 7.004_979_02, 252.250_323_50, 77.457_796_28, 48.330_765_93],
    rate: [0.000_000_37, 0.000_019_06, -0.005_947_49, 149_472.674_111_75, 0.160_476_89, -0.125_340_81],
};

const VENUS: OrbitalElements = OrbitalElements {
    base: [0.723_335_66, 0.006_776_72, 3.394_676_05, 181.979_099_50, 131.602_467_18, 76.679_842_55],
    rate: [0.000_003_90, -0.000_041_07, -0.000_788_90, 58_517.815_387_29, 0.002_683_29, -0.277_694_18],
};

/// Earth-Moon barycentre
const EARTH: OrbitalElements = OrbitalElements {
    base: [1.000_002_61, 0.016_711_23, -0.000_015_31, 100.464_571_66, 102.937_681_93, 0.0],
    rate: [0.000_005_62, -0.000_043_92, -0.012_946_68, 35_999.372_449_81, 0.323_273_64, 0.0],
};

const MARS: OrbitalElements = OrbitalElements {
    base: [1.523_710_34, 0.093_394_10, 1.849_691_42, -4.553_432_05, -23.943_629_59, 49.559_538_91],
    rate: [0.000_018_47, 0.000_078_82, -0.008_131_31, 19_140.302_684_99, 0.444_410_88, -0.292_573_43],
};

const JUPITER: OrbitalElements = OrbitalElements {
    base: [5.202_887_00, 0.048_386_24, 1.304_396_95, 34.396_440_51, 14.728_479_83, 100.473_909_09],
    rate: [-0.000_116_07, -0.000_132_53, -0.001_837_14, 3_034.746_127_75, 0.212_526_68, 0.204_691_06],
};

const SATURN: OrbitalElements = OrbitalElements {
    base: [9.536_675_94, 0.053_861_79, 2.485_991_87, 49.954_244_23, 92.598_878_31, 113.662_424_48],
    rate: [-0.001_250_60, -0.000_509_91, 0.001_936_09, 1_222.493_622_01, -0.418_972_16, -0.288_677_94],
};

const URANUS: OrbitalElements = OrbitalElements {
    base: [19.189_164_64, 0.047_257_44, 0.772_637_83, 313.238_104_51, 170.954_276_30, 74.016_925_03],
    rate: [-0.001_961_76, -0.000_043_97, -0.002_429_39, 428.482_027_85, 0.408_052_81, 0.042_405_89],
};

const NEPTUNE: OrbitalElements = OrbitalElements {
    base: [30.069_922_76, 0.008_590_48, 1.770_043_47, -55.120_029_69, 44.964_762_27, 131.784_225_74],
    rate: [0.000_262_91, 0.000_051_05, 0.000_353_72, 218.459_453_25, -0.322_414_64, -0.005_086_64],
};

/// Elements for a body; `Body::Sun` stands for the Earth's orbit
fn elements(body: Body) -> Result<&'static OrbitalElements> {
    match body {
        Body::Sun => Ok(&EARTH),
        Body::Mercury => Ok(&MERCURY),
        Body::Venus => Ok(&VENUS),
        Body::Mars => Ok(&MARS),
        Body::Jupiter => Ok(&JUPITER),
        Body::Saturn => Ok(&SATURN),
        Body::Uranus => Ok(&URANUS),
        Body::Neptune => Ok(&NEPTUNE),
        Body::Moon => Err(EphemerisError::UnsupportedBody(body)),
    }
}

/// Solve Kepler's equation `M = E - e sin E` for E (radians)
fn eccentric_anomaly(mean_anomaly: f64, e: f64) -> f64 {
    let mut ecc = mean_anomaly + e * mean_anomaly.sin();
    for _ in 0..15 {
        let delta = (ecc - e * ecc.sin() - mean_anomaly) / (1.0 - e * ecc.cos());
        ecc -= delta;
        if delta.abs() < 1e-12 {
            break;
        }
    }
    ecc
}

/// Heliocentric ecliptic J2000 position in AU.
///
/// Passing `Body::Sun` gives the Earth's heliocentric position.
pub(super) fn heliocentric_position(body: Body, jd: f64) -> Result<Vector3<f64>> {
    let el = elements(body)?;
    let t = centuries_since_j2000(jd);
    let at = |i: usize| el.base[i] + el.rate[i] * t;

    let a = at(0);
    let e = at(1).clamp(0.0, 0.99);
    let inclination = at(2).to_radians();
    let mean_longitude = at(3);
    let perihelion = at(4);
    let node = at(5);

    let argument_of_perihelion = (perihelion - node).to_radians();
    let mut mean_anomaly = normalize_degrees(mean_longitude - perihelion);
    if mean_anomaly > 180.0 {
        mean_anomaly -= 360.0;
    }

    let ecc = eccentric_anomaly(mean_anomaly.to_radians(), e);
    let in_plane = Vector3::new(
        a * (ecc.cos() - e),
        a * (1.0 - e * e).sqrt() * ecc.sin(),
        0.0,
    );

    let orientation = Rotation3::from_axis_angle(&Vector3::z_axis(), node.to_radians())
        * Rotation3::from_axis_angle(&Vector3::x_axis(), inclination)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), argument_of_perihelion);

    Ok(orientation * in_plane)
}

/// Rotate an ecliptic J2000 vector onto the equator and return RA/Dec
pub(super) fn ecliptic_vector_to_equatorial(v: &Vector3<f64>) -> EquatorialPosition {
    let to_equator =
        Rotation3::from_axis_angle(&Vector3::x_axis(), OBLIQUITY_J2000.to_radians());
    let eq = to_equator * *v;
    let r = eq.norm();
    let ra = normalize_degrees(eq.y.atan2(eq.x).to_degrees());
    let dec = (eq.z / r).clamp(-1.0, 1.0).asin().to_degrees();
    EquatorialPosition::new(ra, dec)
}

/// Apparent magnitude of a planet from its heliocentric and geocentric vectors
pub(super) fn planet_magnitude(
    body: Body,
    heliocentric: &Vector3<f64>,
    geocentric: &Vector3<f64>,
) -> Result<f64> {
    let r = heliocentric.norm();
    let delta = geocentric.norm();
    let unavailable = || EphemerisError::MagnitudeUnavailable { body };

    // Sun-planet-Earth angle; the vectors from the planet to each are
    // -heliocentric and -geocentric
    let cos_i = heliocentric.dot(geocentric) / (r * delta);
    if !cos_i.is_finite() || !(-1.0..=1.0).contains(&cos_i) {
        return Err(unavailable());
    }
    let i = cos_i.acos().to_degrees();
    let distance_term = 5.0 * (r * delta).log10();

    let magnitude = match body {
        Body::Mercury => -0.42 + distance_term + 0.0380 * i - 0.000_273 * i * i + 0.000_002 * i.powi(3),
        Body::Venus => -4.40 + distance_term + 0.0009 * i + 0.000_239 * i * i - 0.000_000_65 * i.powi(3),
        Body::Mars => -1.52 + distance_term + 0.016 * i,
        Body::Jupiter => -9.40 + distance_term + 0.005 * i,
        Body::Saturn => -8.88 + distance_term + 0.044 * i,
        Body::Uranus => -7.19 + distance_term,
        Body::Neptune => -6.87 + distance_term,
        Body::Sun | Body::Moon => return Err(EphemerisError::UnsupportedBody(body)),
    };

    if magnitude.is_finite() {
        Ok(magnitude)
    } else {
        Err(unavailable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::J2000_JD;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_kepler_solution_satisfies_equation() {
        for &(m, e) in &[(0.3, 0.0167), (2.5, 0.2056), (-1.0, 0.0934), (3.1, 0.9)] {
            let ecc = eccentric_anomaly(m, e);
            assert_abs_diff_eq!(ecc - e * ecc.sin(), m, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_earth_distance_range() {
        for day in (0..366).step_by(10) {
            let earth = heliocentric_position(Body::Sun, J2000_JD + day as f64).unwrap();
            let r = earth.norm();
            assert!((0.982..1.018).contains(&r), "r = {r}");
            assert!(earth.z.abs() < 1e-3);
        }
    }

    #[test]
    fn test_semi_major_axes() {
        let jupiter = heliocentric_position(Body::Jupiter, J2000_JD).unwrap();
        assert!((4.9..5.5).contains(&jupiter.norm()));
        let neptune = heliocentric_position(Body::Neptune, J2000_JD).unwrap();
        assert!((29.7..30.4).contains(&neptune.norm()));
    }

    #[test]
    fn test_moon_has_no_elements() {
        assert!(matches!(
            heliocentric_position(Body::Moon, J2000_JD),
            Err(EphemerisError::UnsupportedBody(Body::Moon))
        ));
    }

    #[test]
    fn test_magnitude_rejects_degenerate_geometry() {
        let zero = Vector3::zeros();
        let helio = Vector3::new(1.5, 0.0, 0.0);
        assert!(matches!(
            planet_magnitude(Body::Mars, &helio, &zero),
            Err(EphemerisError::MagnitudeUnavailable { body: Body::Mars })
        ));
    }
}
