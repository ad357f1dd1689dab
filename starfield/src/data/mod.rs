//! Data module for locating and reading catalogue datasets
//!
//! A [`CatalogSource`] turns some backing store into parsed star and
//! constellation records. Two sources ship with the crate: the dataset
//! compiled into the binary and a directory on disk holding files of the
//! same layout.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use rust_embed::RustEmbed;

use crate::catalogs::geojson::{parse_constellation_lines, parse_stars};
use crate::catalogs::{ConstellationLine, StarRecord};
use crate::{CatalogError, Result};

/// Star positions, magnitudes and colour indices.
///
/// The embedded copy holds the naked-eye bright stars down to about
/// magnitude 5; a fuller catalogue can be served from a [`DirectorySource`].
pub const STARS_FILE: &str = "stars.bright.json";
/// Proper names, Bayer designations and constellation membership
pub const STAR_NAMES_FILE: &str = "starnames.json";
/// Constellation stick figures
pub const CONSTELLATION_LINES_FILE: &str = "constellations.lines.json";

/// Backing store for catalogue data.
///
/// Implementations perform the actual read and parse on every call;
/// caching is the job of [`crate::Catalog`].
pub trait CatalogSource: Send + Sync {
    /// Human-readable name used in error messages and logs
    fn name(&self) -> Cow<'_, str>;

    /// Read and parse all star records
    fn load_stars(&self) -> Result<Vec<StarRecord>>;

    /// Read and parse all constellation figures
    fn load_constellation_lines(&self) -> Result<Vec<ConstellationLine>>;
}

/// Dataset compiled into the binary.
#[derive(RustEmbed)]
#[folder = "data/"]
struct CatalogAssets;

fn embedded_text(file: &str) -> Result<String> {
    let asset = CatalogAssets::get(file).ok_or_else(|| CatalogError::MissingAsset(file.into()))?;
    String::from_utf8(asset.data.into_owned()).map_err(|e| CatalogError::Unavailable {
        source_name: "embedded".to_string(),
        reason: format!("{file} is not valid UTF-8: {e}"),
    })
}

/// Catalogue source backed by the embedded bright-star dataset.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSource;

impl CatalogSource for EmbeddedSource {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed("embedded")
    }

    fn load_stars(&self) -> Result<Vec<StarRecord>> {
        let stars = embedded_text(STARS_FILE)?;
        let names = embedded_text(STAR_NAMES_FILE)?;
        parse_stars("embedded", &stars, Some(&names))
    }

    fn load_constellation_lines(&self) -> Result<Vec<ConstellationLine>> {
        let lines = embedded_text(CONSTELLATION_LINES_FILE)?;
        parse_constellation_lines("embedded", &lines)
    }
}

/// Catalogue source reading the dataset files from a directory.
///
/// The star names file is optional; the other two are required.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Create a source rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the dataset is read from
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, file: &str) -> Result<String> {
        let path = self.root.join(file);
        if !path.exists() {
            return Err(CatalogError::MissingAsset(path.display().to_string()));
        }
        Ok(std::fs::read_to_string(path)?)
    }
}

impl CatalogSource for DirectorySource {
    fn name(&self) -> Cow<'_, str> {
        Cow::Owned(self.root.display().to_string())
    }

    fn load_stars(&self) -> Result<Vec<StarRecord>> {
        let stars = self.read(STARS_FILE)?;
        let names = match self.read(STAR_NAMES_FILE) {
            Ok(text) => Some(text),
            Err(CatalogError::MissingAsset(_)) => None,
            Err(e) => return Err(e),
        };
        parse_stars(&self.name(), &stars, names.as_deref())
    }

    fn load_constellation_lines(&self) -> Result<Vec<ConstellationLine>> {
        let lines = self.read(CONSTELLATION_LINES_FILE)?;
        parse_constellation_lines(&self.name(), &lines)
    }
}
