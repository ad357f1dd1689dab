//! Caption band: title, subtitle, date and coordinates.

use chrono::{DateTime, Utc};

use super::{LayerContext, FONT_FAMILY};
use crate::document::{escape_xml, ChartLayer, LayerKind};

/// Caption form of an instant, e.g. `15 January 2025 · 23:00 UTC`
pub fn format_datetime(time: &DateTime<Utc>) -> String {
    time.format("%-d %B %Y · %H:%M UTC").to_string()
}

/// Opaque band at the bottom of the poster with the chart's text
pub fn caption(ctx: &LayerContext) -> ChartLayer {
    let c = ctx.canvas();
    let t = ctx.theme();
    let chart = ctx.chart;
    let mut layer = ChartLayer::new(LayerKind::Caption);
    if c.caption_height <= 0.0 {
        return layer;
    }

    let top = c.caption_top();
    let h = c.caption_height;
    let at = |fraction: f64| top + fraction * h;

    layer.push(&format!(
        r#"<rect x="0" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"/>"#,
        top, c.width, h, t.caption_background
    ));
    layer.push(&format!(
        r#"<g fill="{}" font-family="{}" text-anchor="middle">"#,
        t.text, FONT_FAMILY
    ));

    let title_size = 0.2 * h;
    layer.push(&format!(
        r#"<text x="{:.2}" y="{:.2}" font-size="{:.2}" font-weight="bold" letter-spacing="{:.2}">{}</text>"#,
        c.center_x,
        at(0.34),
        title_size,
        0.3 * title_size,
        escape_xml(&chart.title.to_uppercase())
    ));
    if let Some(subtitle) = &chart.subtitle {
        layer.push(&format!(
            r#"<text x="{:.2}" y="{:.2}" font-size="{:.2}">{}</text>"#,
            c.center_x,
            at(0.5),
            0.09 * h,
            escape_xml(&subtitle.to_uppercase())
        ));
    }
    layer.push(&format!(
        r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{:.2}"/>"#,
        c.width * 0.4,
        at(0.6),
        c.width * 0.6,
        at(0.6),
        t.text,
        (0.008 * h).max(1.0)
    ));
    layer.push(&format!(
        r#"<text x="{:.2}" y="{:.2}" font-size="{:.2}">{}</text>"#,
        c.center_x,
        at(0.74),
        0.08 * h,
        escape_xml(&format_datetime(&chart.time))
    ));
    layer.push(&format!(
        r#"<text x="{:.2}" y="{:.2}" font-size="{:.2}" fill-opacity="0.7">{}</text>"#,
        c.center_x,
        at(0.87),
        0.07 * h,
        escape_xml(&chart.coordinates_label())
    ));
    layer.push("</g>");
    layer
}
