//! Rasterisation of composed charts and writing them to disk.
//!
//! Text is shaped with the system fonts, loaded once per process.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use clap::ValueEnum;
use log::{debug, info};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tiny_skia::{Pixmap, Transform};
use usvg::{fontdb, Options, Tree};

use crate::document::VectorDocument;
use crate::{ChartError, Result};

/// Font used when a family named in the markup is not installed
const FALLBACK_FONT_FAMILY: &str = "DejaVu Sans";

static FONT_DATABASE: Lazy<Arc<fontdb::Database>> = Lazy::new(|| {
    let mut fontdb = fontdb::Database::new();
    fontdb.load_system_fonts();
    debug!("Loaded {} system font faces", fontdb.len());
    Arc::new(fontdb)
});

/// Output encoding for a finished chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Scalable vector markup
    #[default]
    Svg,
    /// Raster image at the poster's pixel size
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }

    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "svg" => Some(OutputFormat::Svg),
            "png" => Some(OutputFormat::Png),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

fn svg_options() -> Options<'static> {
    Options {
        fontdb: FONT_DATABASE.clone(),
        font_family: FALLBACK_FONT_FAMILY.to_string(),
        text_rendering: usvg::TextRendering::GeometricPrecision,
        shape_rendering: usvg::ShapeRendering::GeometricPrecision,
        ..Default::default()
    }
}

/// Parse SVG markup into a render tree
pub fn parse_svg(svg: &str) -> Result<Tree> {
    Tree::from_str(svg, &svg_options())
        .map_err(|e| ChartError::Composition(format!("failed to parse chart markup: {e}")))
}

/// Rasterise a document at its own pixel size
pub fn rasterize(document: &VectorDocument) -> Result<Pixmap> {
    let width = document.width.round() as u32;
    let height = document.height.round() as u32;
    rasterize_svg(&document.to_svg(), width, height)
}

/// Rasterise SVG markup into a `width` x `height` pixmap, scaling to fit
pub fn rasterize_svg(svg: &str, width: u32, height: u32) -> Result<Pixmap> {
    let tree = parse_svg(svg)?;
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        ChartError::Composition(format!("cannot allocate a {width}x{height} pixmap"))
    })?;

    let size = tree.size();
    let scale = (width as f32 / size.width()).min(height as f32 / size.height());
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());
    Ok(pixmap)
}

/// Encode a document as PNG bytes
pub fn render_png(document: &VectorDocument) -> Result<Vec<u8>> {
    rasterize(document)?
        .encode_png()
        .map_err(|e| ChartError::Composition(format!("PNG encoding failed: {e}")))
}

/// Write a document to `path` in the given format.
///
/// The bytes go to a temporary file in the target directory which is then
/// renamed over `path`, so a failed write never leaves a truncated chart.
pub fn write_document(document: &VectorDocument, path: &Path, format: OutputFormat) -> Result<()> {
    let bytes = match format {
        OutputFormat::Svg => document.to_svg().into_bytes(),
        OutputFormat::Png => render_png(document)?,
    };
    let write_error = |e: std::io::Error| {
        ChartError::Composition(format!("failed to write {}: {e}", path.display()))
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(write_error)?;
    file.write_all(&bytes).map_err(write_error)?;
    file.persist(path).map_err(|e| write_error(e.error))?;
    info!(
        "Wrote {} ({} bytes) to {}",
        format.extension().to_uppercase(),
        bytes.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::tempdir;

    const SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10" viewBox="0 0 20 10"><rect x="0" y="0" width="20" height="10" fill="#ff0000"/></svg>"##;

    #[rstest]
    #[case("chart.svg", Some(OutputFormat::Svg))]
    #[case("chart.PNG", Some(OutputFormat::Png))]
    #[case("chart.pdf", None)]
    #[case("chart", None)]
    fn test_format_from_path(#[case] path: &str, #[case] expected: Option<OutputFormat>) {
        assert_eq!(OutputFormat::from_path(Path::new(path)), expected);
    }

    #[test]
    fn test_rasterize_scales_to_target() {
        let pixmap = rasterize_svg(SQUARE, 40, 20).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (40, 20));
        let corner = pixmap.pixel(39, 19).unwrap();
        assert_eq!((corner.red(), corner.green(), corner.alpha()), (255, 0, 255));
    }

    #[test]
    fn test_bad_markup_is_composition_error() {
        assert!(matches!(
            parse_svg("<svg"),
            Err(ChartError::Composition(_))
        ));
    }

    #[test]
    fn test_zero_sized_pixmap_rejected() {
        assert!(rasterize_svg(SQUARE, 0, 10).is_err());
    }

    #[test]
    fn test_write_png_has_signature() {
        let chart = crate::layers::test_support::paris_chart();
        let document = crate::ChartRenderer::embedded()
            .render_resolved(&chart, &crate::NoProgress)
            .unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("paris.png");
        write_document(&document, &path, OutputFormat::Png).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_write_replaces_existing_file_and_leaves_no_temporaries() {
        let chart = crate::layers::test_support::paris_chart();
        let document = crate::ChartRenderer::embedded()
            .render_resolved(&chart, &crate::NoProgress)
            .unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("paris.svg");
        std::fs::write(&path, "stale").unwrap();

        write_document(&document, &path, OutputFormat::Svg).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), document.to_svg());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_into_missing_directory_fails_cleanly() {
        let chart = crate::layers::test_support::paris_chart();
        let document = crate::ChartRenderer::embedded()
            .render_resolved(&chart, &crate::NoProgress)
            .unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("paris.svg");

        let result = write_document(&document, &path, OutputFormat::Svg);
        assert!(matches!(result, Err(ChartError::Composition(_))));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
