//! Star colours from B-V colour index.
//!
//! The B-V index is first converted to an effective temperature with
//! Ballesteros' formula, then the temperature is mapped to sRGB with the
//! common two-branch blackbody fit (one branch above 6600 K, one below).

use serde::{Deserialize, Serialize};
use std::fmt;

/// 8-bit sRGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Format as `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse `#rrggbb` or `rrggbb`
    pub fn from_hex(text: &str) -> Option<Self> {
        let hex = text.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Effective temperature in Kelvin for a B-V colour index.
///
/// The index is clamped to [-0.4, 2.0], the range the formula is fitted
/// over; outside it the denominators approach zero.
pub fn bv_to_temperature(bv: f64) -> f64 {
    let bv = if bv.is_finite() {
        bv.clamp(-0.4, 2.0)
    } else {
        0.0
    };
    4600.0 * (1.0 / (0.92 * bv + 1.7) + 1.0 / (0.92 * bv + 0.62))
}

fn clamp_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

/// sRGB colour of a blackbody at `kelvin`
pub fn temperature_to_rgb(kelvin: f64) -> Rgb {
    let t = kelvin / 100.0;

    let (red, green) = if t <= 66.0 {
        (255.0, 99.470_802_586_1 * t.ln() - 161.119_568_166_1)
    } else {
        (
            329.698_727_446 * (t - 60.0).powf(-0.133_204_759_2),
            288.122_169_528_3 * (t - 60.0).powf(-0.075_514_849_2),
        )
    };

    let blue = if t >= 66.0 {
        255.0
    } else if t <= 19.0 {
        0.0
    } else {
        138.517_731_223_1 * (t - 10.0).ln() - 305.044_792_730_7
    };

    Rgb::new(
        clamp_channel(red),
        clamp_channel(green),
        clamp_channel(blue),
    )
}

/// Display colour for a star with the given B-V colour index
pub fn color_for_index(bv: f64) -> Rgb {
    temperature_to_rgb(bv_to_temperature(bv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_sun_temperature() {
        // The Sun has B-V of about 0.65 and an effective temperature near 5800K
        let t = bv_to_temperature(0.65);
        assert_relative_eq!(t, 5800.0, max_relative = 0.05);
    }

    #[rstest]
    #[case(-0.3)]
    #[case(0.0)]
    #[case(0.65)]
    #[case(1.5)]
    #[case(5.0)]
    #[case(-3.0)]
    #[case(f64::NAN)]
    fn test_channels_always_valid(#[case] bv: f64) {
        // Conversion never panics and always yields a colour
        let rgb = color_for_index(bv);
        assert!(rgb.r > 0 || rgb.g > 0 || rgb.b > 0);
    }

    #[test]
    fn test_blue_and_red_stars() {
        let hot = color_for_index(-0.3);
        assert!(hot.b >= hot.r);

        let cool = color_for_index(1.8);
        assert!(cool.r > cool.b);
        assert_eq!(cool.r, 255);
    }

    #[test]
    fn test_temperature_monotonic_in_index() {
        assert!(bv_to_temperature(-0.2) > bv_to_temperature(0.5));
        assert!(bv_to_temperature(0.5) > bv_to_temperature(1.5));
    }

    #[test]
    fn test_hex_roundtrip() {
        let c = Rgb::new(18, 52, 255);
        assert_eq!(c.to_hex(), "#1234ff");
        assert_eq!(Rgb::from_hex("#1234ff"), Some(c));
        assert_eq!(Rgb::from_hex("nope"), None);
    }
}
