//! Canvas layout and sky-to-plane projections.
//!
//! The sky hemisphere is drawn as a disc: the zenith at the centre, the
//! horizon on the rim, north up and azimuth increasing clockwise. Points
//! below the horizon are not drawable and project to `None`.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Margin between the canvas edge and the horizon circle, in pixels
pub const DEFAULT_PADDING: f64 = 40.0;

/// Share of the shorter poster side kept as margin on large posters, enough
/// for the cardinal labels outside the horizon ring
pub const PADDING_FRACTION: f64 = 0.035;

/// Lowest altitude the unclipped projection follows before clamping
const UNCLIPPED_MIN_ALTITUDE: f64 = -60.0;

/// Pixel layout of one chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
    /// Height of the caption band reserved at the bottom
    pub caption_height: f64,
    pub padding: f64,
    pub center_x: f64,
    pub center_y: f64,
    /// Radius of the horizon circle
    pub radius: f64,
}

impl CanvasConfig {
    /// Lay out a canvas with an explicit padding.
    ///
    /// Fails when the result would not leave a positive-radius disc above
    /// the caption band.
    pub fn with_padding(
        width: f64,
        height: f64,
        caption_height: f64,
        padding: f64,
    ) -> Result<Self, ValidationError> {
        let usable_height = height - caption_height - 2.0 * padding;
        let usable_width = width - 2.0 * padding;
        let radius = usable_width.min(usable_height) / 2.0;

        let finite = [width, height, caption_height, padding, radius]
            .iter()
            .all(|v| v.is_finite());
        if !finite || radius <= 0.0 || caption_height < 0.0 || padding < 0.0 {
            return Err(ValidationError::InvalidDimensions);
        }

        Ok(Self {
            width,
            height,
            caption_height,
            padding,
            center_x: width / 2.0,
            center_y: padding + usable_height / 2.0,
            radius,
        })
    }

    /// Top edge of the caption band
    pub fn caption_top(&self) -> f64 {
        self.height - self.caption_height
    }

    pub fn center(&self) -> ProjectedPoint {
        ProjectedPoint::new(self.center_x, self.center_y)
    }
}

/// Lay out a canvas with the default padding
pub fn build_canvas_config(
    width: f64,
    height: f64,
    caption_height: f64,
) -> Result<CanvasConfig, ValidationError> {
    CanvasConfig::with_padding(width, height, caption_height, DEFAULT_PADDING)
}

/// Padding for a poster of the given size: [`DEFAULT_PADDING`] on small
/// canvases, growing with the poster so the cardinal labels, which scale
/// with the disc, stay on the canvas
pub fn poster_padding(width: f64, height: f64) -> f64 {
    DEFAULT_PADDING.max(PADDING_FRACTION * width.min(height))
}

/// A point in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

impl ProjectedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &ProjectedPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// How altitude maps to distance from the centre.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMode {
    /// Conformal azimuthal projection; shapes near the zenith are preserved
    #[default]
    Stereographic,
    /// Equidistant in altitude; 45 degrees sits halfway to the rim
    Polar,
}

impl fmt::Display for ProjectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionMode::Stereographic => write!(f, "stereographic"),
            ProjectionMode::Polar => write!(f, "polar"),
        }
    }
}

impl ProjectionMode {
    /// Distance from the centre as a fraction of the radius: 0 at the
    /// zenith, 1 on the horizon
    pub fn radial_fraction(&self, altitude: f64) -> f64 {
        if altitude >= 90.0 {
            return 0.0;
        }
        match self {
            ProjectionMode::Stereographic => {
                let alt = altitude.to_radians();
                alt.cos() / (1.0 + alt.sin())
            }
            ProjectionMode::Polar => (90.0 - altitude) / 90.0,
        }
    }

    /// Project a horizontal position; `None` below the horizon
    pub fn project(
        &self,
        altitude: f64,
        azimuth: f64,
        canvas: &CanvasConfig,
    ) -> Option<ProjectedPoint> {
        if altitude < 0.0 {
            return None;
        }
        Some(self.place(self.radial_fraction(altitude), azimuth, canvas))
    }

    /// Project without the horizon cut.
    ///
    /// Used for paths that are clipped graphically at the horizon circle.
    /// Altitudes below -60 degrees are clamped so the stereographic radius
    /// stays bounded.
    pub fn project_unclipped(
        &self,
        altitude: f64,
        azimuth: f64,
        canvas: &CanvasConfig,
    ) -> ProjectedPoint {
        let altitude = altitude.max(UNCLIPPED_MIN_ALTITUDE);
        self.place(self.radial_fraction(altitude), azimuth, canvas)
    }

    fn place(&self, fraction: f64, azimuth: f64, canvas: &CanvasConfig) -> ProjectedPoint {
        if fraction == 0.0 {
            return canvas.center();
        }
        let r = fraction * canvas.radius;
        let az = azimuth.to_radians();
        ProjectedPoint::new(canvas.center_x + r * az.sin(), canvas.center_y - r * az.cos())
    }
}

/// Stereographic projection; `None` below the horizon
pub fn stereographic_project(
    altitude: f64,
    azimuth: f64,
    canvas: &CanvasConfig,
) -> Option<ProjectedPoint> {
    ProjectionMode::Stereographic.project(altitude, azimuth, canvas)
}

/// Polar equidistant projection; `None` below the horizon
pub fn polar_project(altitude: f64, azimuth: f64, canvas: &CanvasConfig) -> Option<ProjectedPoint> {
    ProjectionMode::Polar.project(altitude, azimuth, canvas)
}

/// Project with the given mode
pub fn project(
    altitude: f64,
    azimuth: f64,
    canvas: &CanvasConfig,
    mode: ProjectionMode,
) -> Option<ProjectedPoint> {
    mode.project(altitude, azimuth, canvas)
}
