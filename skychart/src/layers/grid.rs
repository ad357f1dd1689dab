//! Alt-azimuth grid and the horizon ring.

use super::{LayerContext, FONT_FAMILY};
use crate::document::{ChartLayer, LayerKind};
use crate::Result;
use ephemeris::HorizontalPosition;

/// Altitude ring spacing in degrees
const RING_STEP: usize = 15;
/// Azimuth spoke spacing in degrees
const SPOKE_STEP: usize = 30;

const CARDINALS: [(&str, f64); 4] = [("N", 0.0), ("E", 90.0), ("S", 180.0), ("W", 270.0)];

/// Rings every 15 degrees of altitude, spokes every 30 degrees of azimuth,
/// and cardinal labels just outside the horizon
pub fn grid(ctx: &LayerContext) -> Result<ChartLayer> {
    let c = ctx.canvas();
    let t = ctx.theme();
    let u = ctx.unit();
    let mut layer = ChartLayer::new(LayerKind::Grid);

    layer.push(&format!(
        r#"<g fill="none" stroke="{}" stroke-width="{:.2}" stroke-opacity="0.6">"#,
        t.grid,
        0.8 * u
    ));
    for alt in (RING_STEP..90).step_by(RING_STEP) {
        let r = ctx.chart.projection.radial_fraction(alt as f64) * c.radius;
        layer.push(&format!(
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}"/>"#,
            c.center_x, c.center_y, r
        ));
    }
    for az in (0..360).step_by(SPOKE_STEP) {
        let rim = ctx
            .project(&HorizontalPosition::new(0.0, az as f64))?
            .unwrap_or_else(|| c.center());
        layer.push(&format!(
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}"/>"#,
            c.center_x, c.center_y, rim.x, rim.y
        ));
    }
    layer.push("</g>");

    let font_size = 16.0 * u;
    // Half a glyph either side of the label anchor
    let reach = 0.5 * font_size;
    let margins = [
        c.center_y - c.radius,
        c.width - c.center_x - c.radius,
        c.caption_top() - c.center_y - c.radius,
        c.center_x - c.radius,
    ];
    layer.push(&format!(
        r#"<g fill="{}" font-family="{}" font-size="{:.2}" text-anchor="middle">"#,
        t.text, FONT_FAMILY, font_size
    ));
    for ((label, az), margin) in CARDINALS.into_iter().zip(margins) {
        let a = az.to_radians();
        // One glyph outside the ring, pulled in when the margin is tighter
        let r = c.radius + font_size.min(margin - reach);
        let x = c.center_x + r * a.sin();
        // Centre the glyph vertically on the ring
        let y = c.center_y - r * a.cos() + 0.35 * font_size;
        layer.push(&format!(
            r#"<text x="{:.2}" y="{:.2}">{}</text>"#,
            x, y, label
        ));
    }
    layer.push("</g>");

    Ok(layer)
}

/// A single ring on the horizon
pub fn horizon(ctx: &LayerContext) -> ChartLayer {
    let c = ctx.canvas();
    let mut layer = ChartLayer::new(LayerKind::Horizon);
    layer.push(&format!(
        r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="none" stroke="{}" stroke-width="{:.2}"/>"#,
        c.center_x,
        c.center_y,
        c.radius,
        ctx.theme().horizon,
        2.0 * ctx.unit()
    ));
    layer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartConfig;
    use crate::layers::test_support::paris_chart;
    use crate::location::MapUrlResolver;
    use rstest::rstest;

    #[test]
    fn test_grid_counts() {
        let chart = paris_chart();
        let layer = grid(&LayerContext::new(&chart)).unwrap();
        assert_eq!(layer.markup.matches("<circle").count(), 5);
        assert_eq!(layer.markup.matches("<line").count(), 12);
        for label in [">N<", ">E<", ">S<", ">W<"] {
            assert!(layer.markup.contains(label));
        }
    }

    fn label_anchors(markup: &str) -> Vec<(f64, f64)> {
        markup
            .split("<text ")
            .skip(1)
            .map(|tag| {
                let attr = |name: &str| -> f64 {
                    let start = tag.find(&format!(r#"{name}=""#)).unwrap() + name.len() + 2;
                    let end = start + tag[start..].find('"').unwrap();
                    tag[start..end].parse().unwrap()
                };
                (attr("x"), attr("y"))
            })
            .collect()
    }

    #[rstest]
    #[case(None)]
    #[case(Some(10.0))]
    fn test_cardinal_labels_fit_default_poster(#[case] padding: Option<f64>) {
        let config = ChartConfig {
            latitude: Some(48.8566),
            longitude: Some(2.3522),
            timestamp: Some("2025-01-15T23:00:00Z".into()),
            padding,
            ..Default::default()
        };
        assert_eq!(config.size.pixels(), (3543.0, 4724.0));
        let chart = config.resolve(&MapUrlResolver, &[]).unwrap();
        let ctx = LayerContext::new(&chart);
        let layer = grid(&ctx).unwrap();

        let c = chart.canvas;
        // A capital is roughly 0.7 em wide and tall
        let half_glyph = 0.35 * 16.0 * ctx.unit();
        let anchors = label_anchors(&layer.markup);
        assert_eq!(anchors.len(), 4);
        for (x, y) in anchors {
            assert!(x - half_glyph >= 0.0 && x + half_glyph <= c.width, "x {x} off canvas");
            assert!(y - 2.0 * half_glyph >= 0.0 && y <= c.caption_top(), "y {y} off canvas");
        }
    }

    #[test]
    fn test_horizon_ring_matches_canvas() {
        let chart = paris_chart();
        let layer = horizon(&LayerContext::new(&chart));
        assert!(layer
            .markup
            .contains(&format!(r#"r="{:.2}""#, chart.canvas.radius)));
    }
}
