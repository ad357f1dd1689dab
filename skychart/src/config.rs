//! Chart request configuration and validation.
//!
//! [`ChartConfig`] is what a caller writes (JSON or CLI flags); every field
//! has a default except the timestamp and the location. [`ChartConfig::resolve`]
//! checks it and produces a [`ResolvedChart`] with concrete coordinates, time,
//! canvas and theme, or fails before any sky computation starts.

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use clap::ValueEnum;
use ephemeris::sky::{DEFAULT_ECLIPTIC_POINTS, DEFAULT_MAX_MAGNITUDE};
use ephemeris::Observer;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::location::{format_coordinates, LocationResolver};
use crate::projection::{poster_padding, CanvasConfig, ProjectionMode};
use crate::theme::{Theme, DEFAULT_THEME};
use crate::{ChartError, Result, ValidationError};

/// Print resolution used when a size is given in centimetres
pub const DEFAULT_DPI: f64 = 300.0;

/// Share of the poster height given to the caption band
pub const DEFAULT_CAPTION_FRACTION: f64 = 0.15;

/// Accepted sample counts for the ecliptic polyline
const ECLIPTIC_POINT_RANGE: std::ops::RangeInclusive<usize> = 2..=3600;

/// Years the analytic ephemeris is trusted over
const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1000..=3000;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// How star colours are chosen.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum StarColorMode {
    /// Colour from the B-V index via blackbody temperature
    #[default]
    Realistic,
    /// Same mapping as realistic
    Temperature,
    /// Three brightness tiers from the theme palette
    Monochrome,
}

impl fmt::Display for StarColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StarColorMode::Realistic => write!(f, "realistic"),
            StarColorMode::Temperature => write!(f, "temperature"),
            StarColorMode::Monochrome => write!(f, "monochrome"),
        }
    }
}

/// Which object categories are computed and drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CelestialObjects {
    pub stars: bool,
    pub planets: bool,
    pub moon: bool,
    pub constellations: bool,
    pub zodiac: bool,
}

impl Default for CelestialObjects {
    fn default() -> Self {
        Self {
            stars: true,
            planets: true,
            moon: true,
            constellations: true,
            zodiac: true,
        }
    }
}

impl CelestialObjects {
    pub fn none() -> Self {
        Self {
            stars: false,
            planets: false,
            moon: false,
            constellations: false,
            zodiac: false,
        }
    }

    /// Parse a comma-separated list such as `"stars,moon"`
    pub fn from_list(list: &str) -> std::result::Result<Self, String> {
        let mut objects = Self::none();
        for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match item.to_ascii_lowercase().as_str() {
                "stars" => objects.stars = true,
                "planets" => objects.planets = true,
                "moon" => objects.moon = true,
                "constellations" => objects.constellations = true,
                "zodiac" => objects.zodiac = true,
                "all" => objects = Self::default(),
                other => return Err(format!("Unknown object category '{other}'")),
            }
        }
        Ok(objects)
    }
}

/// Poster size in device pixels or physical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PosterSize {
    Pixels {
        width: u32,
        height: u32,
    },
    Physical {
        width_cm: f64,
        height_cm: f64,
        #[serde(default = "default_dpi")]
        dpi: f64,
    },
}

fn default_dpi() -> f64 {
    DEFAULT_DPI
}

impl Default for PosterSize {
    /// 30 x 40 cm at print resolution
    fn default() -> Self {
        PosterSize::Physical {
            width_cm: 30.0,
            height_cm: 40.0,
            dpi: DEFAULT_DPI,
        }
    }
}

impl PosterSize {
    /// Width and height in pixels
    pub fn pixels(&self) -> (f64, f64) {
        match *self {
            PosterSize::Pixels { width, height } => (width as f64, height as f64),
            PosterSize::Physical {
                width_cm,
                height_cm,
                dpi,
            } => (
                (width_cm / 2.54 * dpi).round(),
                (height_cm / 2.54 * dpi).round(),
            ),
        }
    }
}

/// A chart request as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// `"lat,lon"` or a map-share URL; used when latitude/longitude are absent
    pub location: Option<String>,
    /// ISO-8601 instant; naive values are taken as UTC
    pub timestamp: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub size: PosterSize,
    pub caption_fraction: f64,
    /// Margin around the sky disc in pixels; scales with the poster when unset
    pub padding: Option<f64>,
    pub projection: ProjectionMode,
    pub objects: CelestialObjects,
    pub star_colors: StarColorMode,
    pub theme: String,
    pub max_magnitude: f64,
    pub show_grid: bool,
    /// Draw below-horizon zodiac signs dimmed on the horizon
    pub show_all_zodiac: bool,
    pub ecliptic_points: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            location: None,
            timestamp: None,
            title: None,
            subtitle: None,
            size: PosterSize::default(),
            caption_fraction: DEFAULT_CAPTION_FRACTION,
            padding: None,
            projection: ProjectionMode::default(),
            objects: CelestialObjects::default(),
            star_colors: StarColorMode::default(),
            theme: DEFAULT_THEME.to_string(),
            max_magnitude: DEFAULT_MAX_MAGNITUDE,
            show_grid: true,
            show_all_zodiac: false,
            ecliptic_points: DEFAULT_ECLIPTIC_POINTS,
        }
    }
}

/// A validated request with everything the renderer needs.
#[derive(Debug, Clone)]
pub struct ResolvedChart {
    pub observer: Observer,
    pub time: DateTime<Utc>,
    pub canvas: CanvasConfig,
    pub theme: Theme,
    pub title: String,
    pub subtitle: Option<String>,
    pub projection: ProjectionMode,
    pub objects: CelestialObjects,
    pub star_colors: StarColorMode,
    pub max_magnitude: f64,
    pub show_grid: bool,
    pub show_all_zodiac: bool,
    pub ecliptic_points: usize,
}

impl ResolvedChart {
    /// Caption form of the observer's coordinates
    pub fn coordinates_label(&self) -> String {
        format_coordinates(self.observer.latitude, self.observer.longitude)
    }
}

impl ChartConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ChartError::Config(e.to_string()))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| ChartError::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| ChartError::Config(format!("{}: {e}", path.display())))
    }

    /// Latitude and longitude, from explicit fields or the location reference
    pub fn coordinates(&self, resolver: &dyn LocationResolver) -> Result<(f64, f64)> {
        if let (Some(lat), Some(lon)) = (self.latitude, self.longitude) {
            return Ok((lat, lon));
        }
        self.location
            .as_deref()
            .and_then(|reference| resolver.resolve(reference))
            .map(|c| (c.latitude, c.longitude))
            .ok_or(ChartError::MissingCoordinates)
    }

    /// Validate the request and fill in everything derived from it.
    ///
    /// `custom_themes` are searched before the built-in ones.
    pub fn resolve(
        &self,
        resolver: &dyn LocationResolver,
        custom_themes: &[Theme],
    ) -> Result<ResolvedChart> {
        let text = self
            .timestamp
            .as_deref()
            .ok_or(ValidationError::MissingTimestamp)?;
        let time = parse_timestamp(text)?;

        let (latitude, longitude) = self.coordinates(resolver)?;
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::LatitudeOutOfRange(latitude).into());
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::LongitudeOutOfRange(longitude).into());
        }

        if !(0.0..0.5).contains(&self.caption_fraction) {
            return Err(ValidationError::InvalidCaptionFraction(self.caption_fraction).into());
        }
        if !self.max_magnitude.is_finite() {
            return Err(ValidationError::InvalidMagnitudeLimit(self.max_magnitude).into());
        }
        if !ECLIPTIC_POINT_RANGE.contains(&self.ecliptic_points) {
            return Err(ValidationError::InvalidEclipticPoints(self.ecliptic_points).into());
        }

        let (width, height) = self.size.pixels();
        let padding = self
            .padding
            .unwrap_or_else(|| poster_padding(width, height));
        let canvas =
            CanvasConfig::with_padding(width, height, height * self.caption_fraction, padding)?;

        debug!(
            "Resolved chart: ({latitude}, {longitude}) at {time}, {width}x{height} px, radius {:.1}",
            canvas.radius
        );

        Ok(ResolvedChart {
            observer: Observer::new(latitude, longitude),
            time,
            canvas,
            theme: Theme::resolve_with(&self.theme, custom_themes),
            title: self
                .title
                .clone()
                .unwrap_or_else(|| "The Night Sky".to_string()),
            subtitle: self.subtitle.clone(),
            projection: self.projection,
            objects: self.objects,
            star_colors: self.star_colors,
            max_magnitude: self.max_magnitude,
            show_grid: self.show_grid,
            show_all_zodiac: self.show_all_zodiac,
            ecliptic_points: self.ecliptic_points,
        })
    }
}

/// Parse an ISO-8601 instant; values without an offset are UTC
pub fn parse_timestamp(text: &str) -> std::result::Result<DateTime<Utc>, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::MissingTimestamp);
    }

    let parsed = DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|naive| naive.and_utc())
        })
        .ok_or_else(|| ValidationError::InvalidTimestamp(text.to_string()))?;

    if !SUPPORTED_YEARS.contains(&parsed.year()) {
        return Err(ValidationError::InvalidTimestamp(text.to_string()));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::MapUrlResolver;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;
    use rstest::rstest;

    fn paris() -> ChartConfig {
        ChartConfig {
            latitude: Some(48.8566),
            longitude: Some(2.3522),
            timestamp: Some("2025-01-15T23:00:00Z".into()),
            ..Default::default()
        }
    }

    #[rstest]
    #[case("2025-01-15T23:00:00Z")]
    #[case("2025-01-16T00:00:00+01:00")]
    #[case("2025-01-15T23:00:00")]
    #[case("2025-01-15T23:00")]
    #[case("2025-01-15 23:00:00.000")]
    fn test_timestamp_forms(#[case] text: &str) {
        let expected = Utc.with_ymd_and_hms(2025, 1, 15, 23, 0, 0).unwrap();
        assert_eq!(parse_timestamp(text).unwrap(), expected);
    }

    #[rstest]
    #[case("yesterday")]
    #[case("2025-13-01T00:00:00Z")]
    #[case("0500-01-01T00:00:00Z")]
    fn test_bad_timestamps(#[case] text: &str) {
        assert!(matches!(
            parse_timestamp(text),
            Err(ValidationError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_resolve_defaults() {
        let chart = paris().resolve(&MapUrlResolver, &[]).unwrap();
        assert_eq!(chart.theme.name, DEFAULT_THEME);
        assert_eq!(chart.title, "The Night Sky");
        assert_eq!(chart.coordinates_label(), "48.8566° N / 2.3522° E");
        // 30 x 40 cm at 300 dpi
        assert_abs_diff_eq!(chart.canvas.width, 3543.0);
        assert_abs_diff_eq!(chart.canvas.height, 4724.0);
        assert_abs_diff_eq!(chart.canvas.caption_height, 4724.0 * 0.15);
    }

    #[test]
    fn test_location_reference_used_when_no_explicit_coordinates() {
        let config = ChartConfig {
            latitude: None,
            longitude: None,
            location: Some("https://www.google.com/maps/@-33.9249,18.4241,12z".into()),
            ..paris()
        };
        let chart = config.resolve(&MapUrlResolver, &[]).unwrap();
        assert_abs_diff_eq!(chart.observer.latitude, -33.9249);
    }

    #[test]
    fn test_missing_inputs() {
        let no_time = ChartConfig {
            timestamp: None,
            ..paris()
        };
        assert!(matches!(
            no_time.resolve(&MapUrlResolver, &[]),
            Err(ChartError::Validation(ValidationError::MissingTimestamp))
        ));

        let nowhere = ChartConfig {
            latitude: None,
            location: Some("somewhere nice".into()),
            ..paris()
        };
        assert!(matches!(
            nowhere.resolve(&MapUrlResolver, &[]),
            Err(ChartError::MissingCoordinates)
        ));
    }

    #[rstest]
    #[case(91.0, 0.0)]
    #[case(-90.5, 0.0)]
    #[case(0.0, 180.1)]
    #[case(f64::NAN, 0.0)]
    fn test_coordinates_out_of_range(#[case] lat: f64, #[case] lon: f64) {
        let config = ChartConfig {
            latitude: Some(lat),
            longitude: Some(lon),
            ..paris()
        };
        assert!(matches!(
            config.resolve(&MapUrlResolver, &[]),
            Err(ChartError::Validation(
                ValidationError::LatitudeOutOfRange(_) | ValidationError::LongitudeOutOfRange(_)
            ))
        ));
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, false)]
    #[case(2, true)]
    #[case(3600, true)]
    #[case(3601, false)]
    #[case(usize::MAX, false)]
    fn test_ecliptic_point_bounds(#[case] points: usize, #[case] accepted: bool) {
        let config = ChartConfig {
            ecliptic_points: points,
            ..paris()
        };
        match config.resolve(&MapUrlResolver, &[]) {
            Ok(chart) => {
                assert!(accepted, "{points} should be rejected");
                assert_eq!(chart.ecliptic_points, points);
            }
            Err(e) => {
                assert!(!accepted, "{points} should be accepted: {e}");
                assert!(matches!(
                    e,
                    ChartError::Validation(ValidationError::InvalidEclipticPoints(n)) if n == points
                ));
            }
        }
    }

    #[test]
    fn test_invalid_caption_and_size() {
        let config = ChartConfig {
            caption_fraction: 0.6,
            ..paris()
        };
        assert!(matches!(
            config.resolve(&MapUrlResolver, &[]),
            Err(ChartError::Validation(ValidationError::InvalidCaptionFraction(_)))
        ));

        let tiny = ChartConfig {
            size: PosterSize::Pixels {
                width: 50,
                height: 50,
            },
            ..paris()
        };
        assert!(matches!(
            tiny.resolve(&MapUrlResolver, &[]),
            Err(ChartError::Validation(ValidationError::InvalidDimensions))
        ));
    }

    #[test]
    fn test_json_config() {
        let config = ChartConfig::from_json_str(
            r#"{
                "location": "48.8566,2.3522",
                "timestamp": "2025-01-15T23:00:00Z",
                "size": {"width": 1200, "height": 1600},
                "projection": "polar",
                "star_colors": "monochrome",
                "objects": {"zodiac": false},
                "theme": "sepia"
            }"#,
        )
        .unwrap();
        assert_eq!(config.size.pixels(), (1200.0, 1600.0));
        assert_eq!(config.projection, ProjectionMode::Polar);
        assert_eq!(config.star_colors, StarColorMode::Monochrome);
        assert!(config.objects.stars && !config.objects.zodiac);
        assert_abs_diff_eq!(config.max_magnitude, DEFAULT_MAX_MAGNITUDE);

        let physical: PosterSize =
            serde_json::from_str(r#"{"width_cm": 21.0, "height_cm": 29.7}"#).unwrap();
        assert_eq!(physical.pixels(), (2480.0, 3508.0));
    }

    #[test]
    fn test_object_list() {
        let objects = CelestialObjects::from_list("stars, moon").unwrap();
        assert!(objects.stars && objects.moon && !objects.planets);
        assert_eq!(CelestialObjects::from_list("all").unwrap(), CelestialObjects::default());
        assert!(CelestialObjects::from_list("comets").is_err());
    }
}
