//! Constellation stick figures and their names.

use ephemeris::HorizontalConstellation;
use starfield::name_for_abbreviation;

use super::{centroid, close_clipped, path_data, LayerContext, FONT_FAMILY};
use crate::document::{escape_xml, ChartLayer, LayerKind};
use crate::Result;

/// Every kept segment, including the parts below the horizon, clipped to
/// the sky disc
pub fn lines(ctx: &LayerContext, figures: &[HorizontalConstellation]) -> Result<ChartLayer> {
    let mut layer = ctx.clipped_layer(LayerKind::ConstellationLines);
    layer.push(&format!(
        r#"<g fill="none" stroke="{}" stroke-width="{:.2}" stroke-opacity="0.7" stroke-linecap="round" stroke-linejoin="round">"#,
        ctx.theme().constellation_line,
        1.2 * ctx.unit()
    ));
    for figure in figures {
        for segment in figure.segments.iter().filter(|s| s.len() >= 2) {
            let points = segment
                .iter()
                .map(|p| ctx.project_unclipped(p))
                .collect::<Result<Vec<_>>>()?;
            layer.push(&format!(
                r#"<path data-constellation="{}" d="{}"/>"#,
                escape_xml(&figure.id),
                path_data(&points, false)
            ));
        }
    }
    layer.push("</g>");
    Ok(close_clipped(layer))
}

/// One name per figure at the mean of its visible vertices
pub fn labels(ctx: &LayerContext, figures: &[HorizontalConstellation]) -> Result<ChartLayer> {
    let mut layer = ChartLayer::new(LayerKind::ConstellationLabels);
    let font_size = 10.0 * ctx.unit();
    layer.push(&format!(
        r#"<g fill="{}" fill-opacity="0.85" font-family="{}" font-size="{:.2}" letter-spacing="{:.2}" text-anchor="middle">"#,
        ctx.theme().constellation_label,
        FONT_FAMILY,
        font_size,
        0.15 * font_size
    ));
    for figure in figures {
        let mut visible = Vec::new();
        for vertex in figure.visible_vertices() {
            if let Some(p) = ctx.project(vertex)? {
                visible.push(p);
            }
        }
        let Some(anchor) = centroid(&visible) else {
            continue;
        };
        layer.push(&format!(
            r#"<text x="{:.2}" y="{:.2}">{}</text>"#,
            anchor.x,
            anchor.y,
            escape_xml(&name_for_abbreviation(&figure.id).to_uppercase())
        ));
    }
    layer.push("</g>");
    Ok(layer)
}
