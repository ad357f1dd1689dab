//! Poster background and shared SVG definitions.

use super::{LayerContext, SKY_CLIP};
use crate::document::{ChartLayer, LayerKind};

/// Poster gradient and the sky disc
pub fn background(ctx: &LayerContext) -> ChartLayer {
    let c = ctx.canvas();
    let t = ctx.theme();
    let mut layer = ChartLayer::new(LayerKind::Background);

    layer.push(&format!(
        concat!(
            r#"<defs>"#,
            r#"<linearGradient id="poster-gradient" x1="0" y1="0" x2="0" y2="1">"#,
            r#"<stop offset="0" stop-color="{top}"/><stop offset="1" stop-color="{bottom}"/>"#,
            r#"</linearGradient>"#,
            r#"<radialGradient id="sky-gradient" cx="0.5" cy="0.5" r="0.5">"#,
            r#"<stop offset="0" stop-color="{center}"/><stop offset="1" stop-color="{edge}"/>"#,
            r#"</radialGradient>"#,
            r#"</defs>"#,
        ),
        top = t.gradient_top,
        bottom = t.gradient_bottom,
        center = t.sky_center,
        edge = t.sky_edge,
    ));
    layer.push(&format!(
        r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
        c.width, c.height, t.background
    ));
    layer.push(&format!(
        r#"<rect x="0" y="0" width="{}" height="{}" fill="url(#poster-gradient)"/>"#,
        c.width, c.height
    ));
    layer.push(&format!(
        r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="url(#sky-gradient)"/>"#,
        c.center_x, c.center_y, c.radius
    ));
    layer
}

fn glow_filter(id: &str, std_dev: f64) -> String {
    format!(
        concat!(
            r#"<filter id="{}" x="-200%" y="-200%" width="500%" height="500%">"#,
            r#"<feGaussianBlur in="SourceGraphic" stdDeviation="{:.2}" result="blur"/>"#,
            r#"<feMerge><feMergeNode in="blur"/><feMergeNode in="SourceGraphic"/></feMerge>"#,
            r#"</filter>"#,
        ),
        id, std_dev
    )
}

/// Glow filters and the sky clip path; draws nothing itself
pub fn defs(ctx: &LayerContext) -> ChartLayer {
    let c = ctx.canvas();
    let u = ctx.unit();
    let mut layer = ChartLayer::new(LayerKind::Defs);

    layer.push("<defs>");
    layer.push(&glow_filter("star-glow", 1.5 * u));
    layer.push(&glow_filter("planet-glow", 2.5 * u));
    layer.push(&glow_filter("moon-glow", 6.0 * u));
    layer.push(&format!(
        r#"<clipPath id="{}"><circle cx="{:.2}" cy="{:.2}" r="{:.2}"/></clipPath>"#,
        SKY_CLIP, c.center_x, c.center_y, c.radius
    ));
    layer.push("</defs>");
    layer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::test_support::paris_chart;

    #[test]
    fn test_background_uses_theme() {
        let chart = paris_chart();
        let layer = background(&LayerContext::new(&chart));
        assert!(layer.markup.contains(&chart.theme.sky_center.to_hex()));
        assert!(layer.markup.contains("url(#sky-gradient)"));
    }

    #[test]
    fn test_defs_declare_filters_and_clip() {
        let chart = paris_chart();
        let layer = defs(&LayerContext::new(&chart));
        for id in ["star-glow", "planet-glow", "moon-glow", SKY_CLIP] {
            assert!(layer.markup.contains(&format!(r#"id="{id}""#)), "{id}");
        }
    }
}
