//! Parsers for the geoJSON-style star and constellation dataset.
//!
//! Star positions are stored as `Point` features whose coordinates are
//! `[ra, dec]` with right ascension in -180..180 degrees. Names live in a
//! separate map keyed by the feature id. Constellation figures are
//! `MultiLineString` features keyed by their IAU abbreviation.

use std::collections::{HashMap, HashSet};

use serde::de::IgnoredAny;
use serde::Deserialize;

use super::{ConstellationLine, StarRecord};
use crate::{CatalogError, Result};

// Most catalogue stars without a measured colour are faint main-sequence
// stars; 1.4 is a reasonable guess for those
const DEFAULT_BV: f64 = 1.4;

#[derive(Debug, Deserialize)]
struct FeatureCollection<G, P> {
    features: Vec<Feature<G, P>>,
}

#[derive(Debug, Deserialize)]
struct Feature<G, P> {
    id: serde_json::Value,
    #[serde(default = "Option::default")]
    properties: Option<P>,
    geometry: G,
}

#[derive(Debug, Deserialize)]
struct StarProperties {
    mag: f64,
    #[serde(default)]
    bv: Option<ColorIndex>,
}

/// The dataset stores B-V both as numbers and as strings ("" when unknown)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ColorIndex {
    Number(f64),
    Text(String),
}

impl ColorIndex {
    fn value(&self) -> Option<f64> {
        match self {
            ColorIndex::Number(v) => Some(*v),
            ColorIndex::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    coordinates: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct MultiLineGeometry {
    coordinates: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Default, Deserialize)]
struct StarName {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    bayer: Option<String>,
    #[serde(default)]
    c: Option<String>,
}

/// Normalise a dataset longitude (-180..180) to right ascension in [0, 360)
fn normalize_ra(ra: f64) -> f64 {
    let ra = ra.rem_euclid(360.0);
    if ra >= 360.0 {
        0.0
    } else {
        ra
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn feature_id(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Parse the star feature collection and merge in the optional name table.
pub(crate) fn parse_stars(
    source_name: &str,
    stars_json: &str,
    names_json: Option<&str>,
) -> Result<Vec<StarRecord>> {
    let collection: FeatureCollection<PointGeometry, StarProperties> =
        serde_json::from_str(stars_json)?;
    let names: HashMap<String, StarName> = match names_json {
        Some(text) => serde_json::from_str(text)?,
        None => HashMap::new(),
    };

    let unavailable = |reason: String| CatalogError::Unavailable {
        source_name: source_name.to_string(),
        reason,
    };

    let mut seen = HashSet::with_capacity(collection.features.len());
    let mut stars = Vec::with_capacity(collection.features.len());

    for feature in collection.features {
        let id = feature_id(&feature.id)
            .ok_or_else(|| unavailable(format!("star feature has invalid id {}", feature.id)))?;
        if !seen.insert(id) {
            return Err(unavailable(format!("duplicate star id {id}")));
        }

        let [ra, dec] = feature.geometry.coordinates;
        if !ra.is_finite() || !dec.is_finite() || !(-90.0..=90.0).contains(&dec) {
            return Err(unavailable(format!("star {id} has invalid coordinates")));
        }

        let properties = feature
            .properties
            .ok_or_else(|| unavailable(format!("star {id} has no properties")))?;

        let b_v = properties
            .bv
            .as_ref()
            .and_then(ColorIndex::value)
            .unwrap_or(DEFAULT_BV);

        let name = names.get(&id.to_string());

        stars.push(StarRecord {
            id,
            ra: normalize_ra(ra),
            dec,
            magnitude: properties.mag,
            b_v,
            name: name.and_then(|n| non_empty(n.name.clone())),
            bayer: name.and_then(|n| non_empty(n.bayer.clone())),
            constellation: name.and_then(|n| non_empty(n.c.clone())),
        });
    }

    Ok(stars)
}

/// Parse the constellation line feature collection.
pub(crate) fn parse_constellation_lines(
    source_name: &str,
    lines_json: &str,
) -> Result<Vec<ConstellationLine>> {
    let collection: FeatureCollection<MultiLineGeometry, IgnoredAny> =
        serde_json::from_str(lines_json)?;

    collection
        .features
        .into_iter()
        .map(|feature| {
            let id = match &feature.id {
                serde_json::Value::String(s) => s.clone(),
                other => {
                    return Err(CatalogError::Unavailable {
                        source_name: source_name.to_string(),
                        reason: format!("constellation feature has invalid id {other}"),
                    })
                }
            };

            let segments = feature
                .geometry
                .coordinates
                .into_iter()
                .map(|segment| {
                    segment
                        .into_iter()
                        .map(|[ra, dec]| (normalize_ra(ra), dec))
                        .collect::<Vec<_>>()
                })
                .filter(|segment| !segment.is_empty())
                .collect();

            Ok(ConstellationLine { id, segments })
        })
        .collect()
}
