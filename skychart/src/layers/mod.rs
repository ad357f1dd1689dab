//! Layer builders.
//!
//! Each submodule turns one slice of [`crate::compose::SkyData`] into a
//! [`ChartLayer`] of SVG markup. Builders never reorder or look at each
//! other's output; the renderer calls them in [`LayerKind::ORDER`].
//!
//! Sizes are expressed in units of the horizon radius so a chart looks the
//! same at screen and at print resolution.

pub mod background;
pub mod caption;
pub mod constellations;
pub mod ecliptic;
pub mod grid;
pub mod moon;
pub mod planets;
pub mod stars;
pub mod zodiac;

use std::fmt::Write as _;

use ephemeris::HorizontalPosition;

use crate::config::ResolvedChart;
use crate::document::{ChartLayer, LayerKind};
use crate::projection::{CanvasConfig, ProjectedPoint};
use crate::theme::Theme;
use crate::{ChartError, Result};

/// Font stack used for every label
pub const FONT_FAMILY: &str = "DejaVu Sans, Helvetica, Arial, sans-serif";

/// Clip path covering the sky disc, declared in the defs layer
pub const SKY_CLIP: &str = "sky-clip";

/// Radius at which one layout unit is one pixel
const REFERENCE_RADIUS: f64 = 400.0;

/// Shared state for the layer builders of one chart.
pub struct LayerContext<'a> {
    pub chart: &'a ResolvedChart,
}

impl<'a> LayerContext<'a> {
    pub fn new(chart: &'a ResolvedChart) -> Self {
        Self { chart }
    }

    pub fn canvas(&self) -> &CanvasConfig {
        &self.chart.canvas
    }

    pub fn theme(&self) -> &Theme {
        &self.chart.theme
    }

    /// One layout unit in pixels
    pub fn unit(&self) -> f64 {
        self.chart.canvas.radius / REFERENCE_RADIUS
    }

    /// Project a position; `None` below the horizon.
    ///
    /// A non-finite result is an error rather than something to draw.
    pub fn project(&self, pos: &HorizontalPosition) -> Result<Option<ProjectedPoint>> {
        self.chart
            .projection
            .project(pos.altitude, pos.azimuth, &self.chart.canvas)
            .map(checked)
            .transpose()
    }

    /// Project ignoring the horizon, for paths clipped to the sky disc
    pub fn project_unclipped(&self, pos: &HorizontalPosition) -> Result<ProjectedPoint> {
        checked(
            self.chart
                .projection
                .project_unclipped(pos.altitude, pos.azimuth, &self.chart.canvas),
        )
    }

    /// Start a layer whose content is clipped to the sky disc
    pub fn clipped_layer(&self, kind: LayerKind) -> ChartLayer {
        let mut layer = ChartLayer::new(kind);
        layer.push(&format!(r#"<g clip-path="url(#{SKY_CLIP})">"#));
        layer
    }
}

/// Close a layer opened with [`LayerContext::clipped_layer`]
pub fn close_clipped(mut layer: ChartLayer) -> ChartLayer {
    layer.push("</g>");
    layer
}

fn checked(point: ProjectedPoint) -> Result<ProjectedPoint> {
    if point.is_finite() {
        Ok(point)
    } else {
        Err(ChartError::Composition(format!(
            "projection produced non-finite point ({}, {})",
            point.x, point.y
        )))
    }
}

/// SVG path data through `points`, closed with `Z` when `close` is set
pub fn path_data(points: &[ProjectedPoint], close: bool) -> String {
    let mut d = String::with_capacity(points.len() * 20);
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{}{:.2} {:.2} ", cmd, p.x, p.y);
    }
    if close && !points.is_empty() {
        d.push('Z');
    }
    d.trim_end().to_string()
}

/// Mean of a set of points
pub fn centroid(points: &[ProjectedPoint]) -> Option<ProjectedPoint> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(ProjectedPoint::new(sx / n, sy / n))
}


#[cfg(test)]
mod tests {
    use super::test_support::paris_chart;
    use super::*;

    #[test]
    fn test_path_data() {
        let pts = [ProjectedPoint::new(1.0, 2.0), ProjectedPoint::new(3.5, 4.25)];
        assert_eq!(path_data(&pts, false), "M1.00 2.00 L3.50 4.25");
        assert_eq!(path_data(&pts, true), "M1.00 2.00 L3.50 4.25 Z");
        assert_eq!(path_data(&[], true), "");
    }

    #[test]
    fn test_centroid() {
        let pts = [ProjectedPoint::new(0.0, 0.0), ProjectedPoint::new(4.0, 2.0)];
        assert_eq!(centroid(&pts), Some(ProjectedPoint::new(2.0, 1.0)));
        assert_eq!(centroid(&[]), None);
    }

    #[test]
    fn test_non_finite_projection_is_an_error() {
        let chart = paris_chart();
        let ctx = LayerContext::new(&chart);
        let bad = HorizontalPosition::new(f64::NAN, 10.0);
        assert!(matches!(ctx.project(&bad), Err(ChartError::Composition(_))));
        assert!(ctx.project(&HorizontalPosition::new(-5.0, 10.0)).unwrap().is_none());
        assert!(ctx.project(&HorizontalPosition::new(45.0, 10.0)).unwrap().is_some());
    }
}
