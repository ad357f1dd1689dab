//! Planets above the horizon, each with a glow and a symbol-and-name label.

use ephemeris::VisiblePlanet;

use super::{LayerContext, FONT_FAMILY};
use crate::document::{ChartLayer, LayerKind};
use crate::Result;

/// Disc radius in layout units: brighter planets are larger
fn planet_radius(magnitude: f64) -> f64 {
    (3.5 - 0.4 * magnitude).clamp(2.5, 6.0)
}

pub fn planets(ctx: &LayerContext, planets: &[VisiblePlanet]) -> Result<(ChartLayer, usize)> {
    let u = ctx.unit();
    let t = ctx.theme();
    let mut layer = ChartLayer::new(LayerKind::Planets);
    let mut drawn = 0;

    for planet in planets.iter().filter(|p| p.position.altitude > 0.0) {
        let Some(p) = ctx.project(&planet.position)? else {
            continue;
        };
        let r = planet_radius(planet.magnitude) * u;
        layer.push(&format!(
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" filter="url(#planet-glow)"/>"#,
            p.x, p.y, r, t.planet
        ));
        layer.push(&format!(
            r#"<text x="{:.2}" y="{:.2}" fill="{}" font-family="{}" font-size="{:.2}">{} {}</text>"#,
            p.x + r + 4.0 * u,
            p.y + 4.0 * u,
            t.planet,
            FONT_FAMILY,
            12.0 * u,
            planet.symbol(),
            planet.name()
        ));
        drawn += 1;
    }
    Ok((layer, drawn))
}
