//! Zodiac glyphs along the ecliptic.

use ephemeris::{HorizontalPosition, ZodiacSign};

use super::{LayerContext, FONT_FAMILY};
use crate::document::{ChartLayer, LayerKind};
use crate::Result;

/// Opacity of signs drawn while below the horizon
const BELOW_HORIZON_OPACITY: f64 = 0.35;

/// Glyphs for visible signs. With `show_all`, signs below the horizon are
/// drawn dimmed on the horizon at their azimuth.
pub fn zodiac(ctx: &LayerContext, signs: &[ZodiacSign], show_all: bool) -> Result<ChartLayer> {
    let u = ctx.unit();
    let mut layer = ChartLayer::new(LayerKind::Zodiac);
    layer.push(&format!(
        r#"<g fill="{}" font-family="{}" font-size="{:.2}" text-anchor="middle">"#,
        ctx.theme().zodiac,
        FONT_FAMILY,
        18.0 * u
    ));

    for sign in signs {
        let (position, opacity) = if sign.visible {
            (sign.position, 0.9)
        } else if show_all {
            (
                HorizontalPosition::new(0.0, sign.position.azimuth),
                BELOW_HORIZON_OPACITY,
            )
        } else {
            continue;
        };
        let Some(p) = ctx.project(&position)? else {
            continue;
        };
        layer.push(&format!(
            r#"<text x="{:.2}" y="{:.2}" fill-opacity="{}"><title>{}</title>{}</text>"#,
            p.x,
            p.y + 6.0 * u,
            opacity,
            sign.name,
            sign.symbol
        ));
    }
    layer.push("</g>");
    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::test_support::paris_chart;

    fn sign(name: &'static str, symbol: &'static str, altitude: f64) -> ZodiacSign {
        ZodiacSign {
            name,
            symbol,
            constellation: "Tst",
            ecliptic_longitude: 15.0,
            position: HorizontalPosition::new(altitude, 120.0),
            visible: altitude > 0.0,
        }
    }

    #[test]
    fn test_hidden_signs_only_with_show_all() {
        let chart = paris_chart();
        let ctx = LayerContext::new(&chart);
        let signs = [sign("Aries", "♈", 25.0), sign("Libra", "♎", -25.0)];

        let visible_only = zodiac(&ctx, &signs, false).unwrap();
        assert!(visible_only.markup.contains("♈"));
        assert!(!visible_only.markup.contains("♎"));

        let all = zodiac(&ctx, &signs, true).unwrap();
        assert!(all.markup.contains("♎"));
        assert!(all.markup.contains(r#"fill-opacity="0.35""#));
    }
}
