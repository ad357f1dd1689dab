//! Star catalogs module
//!
//! Record types for stars and constellation figures, plus the parsers for the
//! geoJSON-style dataset they are loaded from.

pub(crate) mod geojson;

use serde::{Deserialize, Serialize};

/// A single catalogue star.
///
/// Coordinates are J2000 equatorial in degrees, with right ascension in
/// [0, 360) and declination in [-90, 90].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarRecord {
    /// Catalogue identifier, unique within one catalogue
    pub id: u64,
    /// Right ascension in degrees
    pub ra: f64,
    /// Declination in degrees
    pub dec: f64,
    /// Apparent visual magnitude (lower is brighter)
    pub magnitude: f64,
    /// B-V colour index
    pub b_v: f64,
    /// Proper name such as "Sirius"
    pub name: Option<String>,
    /// Bayer designation such as "α"
    pub bayer: Option<String>,
    /// IAU constellation abbreviation such as "CMa"
    pub constellation: Option<String>,
}

impl StarRecord {
    /// Create an unnamed star record
    pub fn new(id: u64, ra: f64, dec: f64, magnitude: f64, b_v: f64) -> Self {
        Self {
            id,
            ra,
            dec,
            magnitude,
            b_v,
            name: None,
            bayer: None,
            constellation: None,
        }
    }

    /// Attach a proper name and constellation
    pub fn with_name(mut self, name: &str, constellation: &str) -> Self {
        self.name = Some(name.to_string());
        self.constellation = Some(constellation.to_string());
        self
    }
}

/// One constellation stick figure.
///
/// A figure is made of one or more disjoint polylines; each vertex is an
/// `(ra, dec)` pair in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstellationLine {
    /// Three-letter IAU abbreviation
    pub id: String,
    /// Ordered polylines of `(ra, dec)` vertices
    pub segments: Vec<Vec<(f64, f64)>>,
}

impl ConstellationLine {
    /// Total number of vertices over all segments
    pub fn vertex_count(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }
}

/// Generic trait for all star catalogs
pub trait StarCatalog {
    /// Star entry type for this catalog
    type Star;

    /// Get a star by its catalogue identifier
    fn get_star(&self, id: u64) -> Option<&Self::Star>;

    /// Get all stars in the catalog
    fn stars(&self) -> impl Iterator<Item = &Self::Star>;

    /// Get the number of stars in the catalog
    fn len(&self) -> usize;

    /// Check if the catalog is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Filter stars based on a predicate
    fn filter<F>(&self, predicate: F) -> Vec<&Self::Star>
    where
        F: Fn(&Self::Star) -> bool;
}

impl StarCatalog for [StarRecord] {
    type Star = StarRecord;

    fn get_star(&self, id: u64) -> Option<&StarRecord> {
        self.iter().find(|s| s.id == id)
    }

    fn stars(&self) -> impl Iterator<Item = &StarRecord> {
        self.iter()
    }

    fn len(&self) -> usize {
        <[StarRecord]>::len(self)
    }

    fn filter<F>(&self, predicate: F) -> Vec<&StarRecord>
    where
        F: Fn(&StarRecord) -> bool,
    {
        self.iter().filter(|s| predicate(s)).collect()
    }
}

/// Return the `n` brightest stars, brightest first
pub fn brightest(stars: &[StarRecord], n: usize) -> Vec<&StarRecord> {
    let mut sorted: Vec<&StarRecord> = stars.iter().collect();
    sorted.sort_by(|a, b| a.magnitude.total_cmp(&b.magnitude));
    sorted.truncate(n);
    sorted
}
