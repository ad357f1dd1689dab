//! Julian day and sidereal time.

use chrono::{DateTime, Utc};

/// Julian day of the J2000.0 epoch (2000-01-01 12:00 TT)
pub const J2000_JD: f64 = 2_451_545.0;
/// Julian day of the Unix epoch
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Reduce an angle in degrees to [0, 360)
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Julian day for a UTC instant.
///
/// The difference between UTC and TT (about a minute) is ignored; it is well
/// below what a printed chart can show.
pub fn julian_day(time: DateTime<Utc>) -> f64 {
    let millis = time.timestamp_millis() as f64;
    UNIX_EPOCH_JD + millis / (1000.0 * SECONDS_PER_DAY)
}

/// Julian centuries elapsed since J2000.0
pub fn centuries_since_j2000(jd: f64) -> f64 {
    (jd - J2000_JD) / DAYS_PER_JULIAN_CENTURY
}

/// Greenwich mean sidereal time in degrees, in [0, 360).
///
/// IAU 1982 expression in terms of the Julian day.
pub fn gmst_degrees(jd: f64) -> f64 {
    let d = jd - J2000_JD;
    let t = d / DAYS_PER_JULIAN_CENTURY;
    normalize_degrees(
        280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t - t * t * t / 38_710_000.0,
    )
}

/// Local mean sidereal time in degrees for an east-positive longitude
pub fn local_sidereal_time_degrees(jd: f64, longitude: f64) -> f64 {
    normalize_degrees(gmst_degrees(jd) + longitude)
}
