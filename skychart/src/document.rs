//! The composed chart: ordered layers plus metadata.

use std::fmt;
use std::fmt::Write as _;

use serde::Serialize;

/// The semantic layers of a chart, in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum LayerKind {
    Background,
    Defs,
    Grid,
    Ecliptic,
    ConstellationLines,
    ConstellationLabels,
    Stars,
    Planets,
    Moon,
    Zodiac,
    Horizon,
    Caption,
}

impl LayerKind {
    /// Every layer in the order it is drawn
    pub const ORDER: [LayerKind; 12] = [
        LayerKind::Background,
        LayerKind::Defs,
        LayerKind::Grid,
        LayerKind::Ecliptic,
        LayerKind::ConstellationLines,
        LayerKind::ConstellationLabels,
        LayerKind::Stars,
        LayerKind::Planets,
        LayerKind::Moon,
        LayerKind::Zodiac,
        LayerKind::Horizon,
        LayerKind::Caption,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::Background => "background",
            LayerKind::Defs => "defs",
            LayerKind::Grid => "grid",
            LayerKind::Ecliptic => "ecliptic",
            LayerKind::ConstellationLines => "constellation-lines",
            LayerKind::ConstellationLabels => "constellation-labels",
            LayerKind::Stars => "stars",
            LayerKind::Planets => "planets",
            LayerKind::Moon => "moon",
            LayerKind::Zodiac => "zodiac",
            LayerKind::Horizon => "horizon",
            LayerKind::Caption => "caption",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One layer's SVG markup.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayer {
    pub kind: LayerKind,
    pub markup: String,
}

impl ChartLayer {
    pub fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            markup: String::new(),
        }
    }

    pub fn push(&mut self, markup: &str) {
        self.markup.push_str(markup);
    }

    pub fn is_empty(&self) -> bool {
        self.markup.is_empty()
    }
}

/// Facts about the sky the chart was drawn from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartMetadata {
    pub timestamp: String,
    pub latitude: f64,
    pub longitude: f64,
    pub julian_day: f64,
    pub sun_altitude: f64,
    /// Sun more than 12 degrees below the horizon
    pub is_night: bool,
    pub star_count: usize,
    pub planet_count: usize,
    pub constellation_count: usize,
    pub moon_phase: Option<String>,
    pub moon_illumination: Option<f64>,
    pub theme: String,
}

/// A finished chart.
#[derive(Debug, Clone)]
pub struct VectorDocument {
    pub width: f64,
    pub height: f64,
    pub layers: Vec<ChartLayer>,
    pub metadata: ChartMetadata,
}

impl VectorDocument {
    pub fn layer(&self, kind: LayerKind) -> Option<&ChartLayer> {
        self.layers.iter().find(|l| l.kind == kind)
    }

    pub fn layer_kinds(&self) -> Vec<LayerKind> {
        self.layers.iter().map(|l| l.kind).collect()
    }

    /// Serialise as a standalone SVG document
    pub fn to_svg(&self) -> String {
        let body_len: usize = self.layers.iter().map(|l| l.markup.len() + 32).sum();
        let mut svg = String::with_capacity(body_len + 256);
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        for layer in &self.layers {
            let _ = write!(svg, r#"<g id="layer-{}">"#, layer.kind);
            svg.push_str(&layer.markup);
            svg.push_str("</g>");
        }
        svg.push_str("</svg>");
        svg
    }
}

/// Escape text for use in SVG character data or attribute values
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> ChartMetadata {
        ChartMetadata {
            timestamp: "2025-01-15T23:00:00Z".into(),
            latitude: 0.0,
            longitude: 0.0,
            julian_day: 2_460_691.458,
            sun_altitude: -40.0,
            is_night: true,
            star_count: 0,
            planet_count: 0,
            constellation_count: 0,
            moon_phase: None,
            moon_illumination: None,
            theme: "midnight".into(),
        }
    }

    #[test]
    fn test_to_svg_wraps_layers_in_order() {
        let mut stars = ChartLayer::new(LayerKind::Stars);
        stars.push(r#"<circle cx="1" cy="2" r="3"/>"#);
        let doc = VectorDocument {
            width: 100.0,
            height: 200.0,
            layers: vec![ChartLayer::new(LayerKind::Background), stars],
            metadata: metadata(),
        };
        let svg = doc.to_svg();
        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="200""#));
        let bg = svg.find(r#"id="layer-background""#).unwrap();
        let st = svg.find(r#"id="layer-stars""#).unwrap();
        assert!(bg < st);
        assert!(svg.ends_with("</g></svg>"));
        assert!(doc.layer(LayerKind::Moon).is_none());
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape_xml("Tom & \"Jerry\" <3"), "Tom &amp; &quot;Jerry&quot; &lt;3");
    }

    #[test]
    fn test_layer_order_is_sorted() {
        let mut sorted = LayerKind::ORDER;
        sorted.sort();
        assert_eq!(sorted, LayerKind::ORDER);
    }
}
