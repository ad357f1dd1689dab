//! Turning location references into coordinates.
//!
//! A chart request may name its place as a plain `"lat,lon"` pair or as a
//! map-share URL. [`LocationResolver`] is the seam for anything smarter (a
//! geocoder, a gazetteer); [`MapUrlResolver`] handles the formats that carry
//! coordinates inline.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// A resolved place on Earth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    /// Camera elevation in metres when the reference carried one
    pub elevation_m: Option<f64>,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation_m: None,
        }
    }
}

/// Resolves a free-form location reference.
///
/// Returning `None` means "not understood"; range checking is left to the
/// caller.
pub trait LocationResolver: Send + Sync {
    fn resolve(&self, reference: &str) -> Option<Coordinates>;
}

static PLAIN_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*$").expect("valid regex")
});
static AT_ELEVATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(-?\d+\.\d+),(-?\d+\.\d+),(\d+)m").expect("valid regex"));
static AT_ZOOM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(-?\d+\.\d+),(-?\d+\.\d+),(\d+\.?\d*)z").expect("valid regex"));
static DATA_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"3d(-?\d+\.\d+)!4d(-?\d+\.\d+)").expect("valid regex"));

/// Extracts coordinates from `"lat,lon"` strings and map-share URLs.
///
/// URL forms are tried in this order: `@lat,lon,NNNm`, `@lat,lon,NNz`, the
/// `ll=` and `q=` query parameters, then a `!3dlat!4dlon` data segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapUrlResolver;

impl LocationResolver for MapUrlResolver {
    fn resolve(&self, reference: &str) -> Option<Coordinates> {
        let found = parse_pair(reference).or_else(|| parse_map_url(reference));
        match found {
            Some(c) => debug!(
                "Resolved '{}' to ({}, {})",
                reference, c.latitude, c.longitude
            ),
            None => debug!("Could not resolve location '{reference}'"),
        }
        found
    }
}

fn parse_pair(text: &str) -> Option<Coordinates> {
    let caps = PLAIN_PAIR.captures(text)?;
    Some(Coordinates::new(caps[1].parse().ok()?, caps[2].parse().ok()?))
}

fn captured_pair(re: &Regex, text: &str) -> Option<(Coordinates, Option<f64>)> {
    let caps = re.captures(text)?;
    let coords = Coordinates::new(caps[1].parse().ok()?, caps[2].parse().ok()?);
    let third = caps.get(3).and_then(|m| m.as_str().parse().ok());
    Some((coords, third))
}

fn query_pair(url: &Url, key: &str) -> Option<Coordinates> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .and_then(|(_, v)| parse_pair(&v))
}

/// Coordinates embedded in a map-share URL
pub fn parse_map_url(text: &str) -> Option<Coordinates> {
    if let Some((mut coords, elevation)) = captured_pair(&AT_ELEVATION, text) {
        coords.elevation_m = elevation;
        return Some(coords);
    }
    if let Some((coords, _zoom)) = captured_pair(&AT_ZOOM, text) {
        return Some(coords);
    }
    if let Ok(url) = Url::parse(text.trim()) {
        if let Some(coords) = query_pair(&url, "ll").or_else(|| query_pair(&url, "q")) {
            return Some(coords);
        }
    }
    captured_pair(&DATA_SEGMENT, text).map(|(coords, _)| coords)
}

/// Caption form of a coordinate pair, e.g. `48.8566° N / 2.3522° E`
pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
    let ns = if latitude >= 0.0 { 'N' } else { 'S' };
    let ew = if longitude >= 0.0 { 'E' } else { 'W' };
    format!(
        "{:.4}° {} / {:.4}° {}",
        latitude.abs(),
        ns,
        longitude.abs(),
        ew
    )
}
