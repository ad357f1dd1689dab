//! Stars, sized and coloured by magnitude.
//!
//! Stars are drawn dimmest first so bright stars sit on top where discs
//! overlap. Stars brighter than magnitude 2 get a glow and, when they have a
//! proper name, a label.

use ephemeris::VisibleStar;
use starfield::color_for_index;

use super::{LayerContext, FONT_FAMILY};
use crate::config::StarColorMode;
use crate::document::{escape_xml, ChartLayer, LayerKind};
use crate::theme::{Color, Theme};
use crate::Result;

/// Magnitude below which a star glows and is labelled
pub const BRIGHT_STAR_MAGNITUDE: f64 = 2.0;

/// Smallest disc as a fraction of the horizon radius
const MIN_RADIUS_FRACTION: f64 = 0.0012;
/// Disc of a magnitude 0 star as a fraction of the horizon radius
const MAX_RADIUS_FRACTION: f64 = 0.009;

/// Disc radius in pixels: `max(minR, maxR * 10^(-0.15 m))`
pub fn star_radius(magnitude: f64, horizon_radius: f64) -> f64 {
    let min_r = horizon_radius * MIN_RADIUS_FRACTION;
    let max_r = horizon_radius * MAX_RADIUS_FRACTION;
    min_r.max(max_r * 10f64.powf(-0.15 * magnitude))
}

/// Fill colour for a star under the given colour mode
pub fn star_color(star: &VisibleStar, mode: StarColorMode, theme: &Theme) -> Color {
    match mode {
        StarColorMode::Realistic | StarColorMode::Temperature => color_for_index(star.b_v).into(),
        StarColorMode::Monochrome => {
            if star.magnitude < 0.0 {
                theme.star_bright
            } else if star.magnitude < 2.0 {
                theme.star_mid
            } else {
                theme.star_dim
            }
        }
    }
}

pub fn stars(ctx: &LayerContext, stars: &[VisibleStar]) -> Result<ChartLayer> {
    let c = ctx.canvas();
    let u = ctx.unit();
    let mut layer = ChartLayer::new(LayerKind::Stars);

    let mut ordered: Vec<&VisibleStar> = stars.iter().collect();
    ordered.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));

    let mut labels = String::new();
    for star in ordered {
        let Some(p) = ctx.project(&star.position)? else {
            continue;
        };
        let r = star_radius(star.magnitude, c.radius);
        let fill = star_color(star, ctx.chart.star_colors, ctx.theme());
        let bright = star.magnitude < BRIGHT_STAR_MAGNITUDE;
        let glow = if bright {
            r#" filter="url(#star-glow)""#
        } else {
            ""
        };
        layer.push(&format!(
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}"{}/>"#,
            p.x, p.y, r, fill, glow
        ));

        if let (true, Some(name)) = (bright, star.name.as_deref()) {
            labels.push_str(&format!(
                r#"<text x="{:.2}" y="{:.2}">{}</text>"#,
                p.x + r + 3.0 * u,
                p.y - r - 1.0 * u,
                escape_xml(name)
            ));
        }
    }

    if !labels.is_empty() {
        layer.push(&format!(
            r#"<g fill="{}" fill-opacity="0.9" font-family="{}" font-size="{:.2}">"#,
            ctx.theme().text,
            FONT_FAMILY,
            11.0 * u
        ));
        layer.push(&labels);
        layer.push("</g>");
    }
    Ok(layer)
}
