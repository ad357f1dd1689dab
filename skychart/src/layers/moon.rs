//! The Moon: glow, dark disc, lit part and phase label.
//!
//! The lit part is bounded by a semicircular limb and a semi-elliptical
//! terminator with horizontal radius `r |2k - 1|`, where `k` is the
//! illuminated fraction. While waxing the lit limb is on the right; while
//! waning, on the left. Near full (phase 175-185 degrees) the whole disc is
//! lit.

use ephemeris::MoonData;

use super::{LayerContext, FONT_FAMILY};
use crate::document::{ChartLayer, LayerKind};
use crate::projection::ProjectedPoint;
use crate::Result;

/// Moon radius as a fraction of the horizon radius
const MOON_RADIUS_FRACTION: f64 = 0.04;

/// Phase angles drawn as a fully lit disc
const FULL_MOON_RANGE: std::ops::RangeInclusive<f64> = 175.0..=185.0;

/// Below this illuminated fraction nothing lit is drawn
const MIN_LIT_FRACTION: f64 = 0.01;

/// SVG path of the lit part, or `None` when the Moon is effectively new
pub fn lit_path(center: ProjectedPoint, r: f64, phase_angle: f64) -> Option<String> {
    if FULL_MOON_RANGE.contains(&phase_angle) {
        return Some(format!(
            "M{:.2} {:.2} A{r:.2} {r:.2} 0 1 1 {:.2} {:.2} A{r:.2} {r:.2} 0 1 1 {:.2} {:.2} Z",
            center.x,
            center.y - r,
            center.x,
            center.y + r,
            center.x,
            center.y - r,
            r = r
        ));
    }

    let k = (1.0 - phase_angle.to_radians().cos()) / 2.0;
    if k < MIN_LIT_FRACTION {
        return None;
    }

    let waxing = phase_angle < 180.0;
    let crescent = k < 0.5;
    let rx = r * (2.0 * k - 1.0).abs();

    // Limb from top to bottom on the lit side, terminator back to the top.
    // Sweep 1 is clockwise on screen.
    let limb_sweep = if waxing { 1 } else { 0 };
    let terminator_sweep = match (waxing, crescent) {
        (true, true) | (false, false) => 0,
        (true, false) | (false, true) => 1,
    };

    Some(format!(
        "M{cx:.2} {top:.2} A{r:.2} {r:.2} 0 0 {limb_sweep} {cx:.2} {bottom:.2} A{rx:.2} {r:.2} 0 0 {terminator_sweep} {cx:.2} {top:.2} Z",
        cx = center.x,
        top = center.y - r,
        bottom = center.y + r,
        r = r,
        rx = rx,
        limb_sweep = limb_sweep,
        terminator_sweep = terminator_sweep,
    ))
}

/// Draw the Moon when it is above the horizon; otherwise an empty layer
pub fn moon(ctx: &LayerContext, moon: Option<&MoonData>) -> Result<ChartLayer> {
    let mut layer = ChartLayer::new(LayerKind::Moon);
    let Some(moon) = moon.filter(|m| m.position.altitude > 0.0) else {
        return Ok(layer);
    };
    let Some(center) = ctx.project(&moon.position)? else {
        return Ok(layer);
    };

    let t = ctx.theme();
    let u = ctx.unit();
    let r = ctx.canvas().radius * MOON_RADIUS_FRACTION;

    layer.push(&format!(
        r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" fill-opacity="0.35" filter="url(#moon-glow)"/>"#,
        center.x,
        center.y,
        r * 1.15,
        t.moon_light
    ));
    layer.push(&format!(
        r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}"/>"#,
        center.x, center.y, r, t.moon_dark
    ));
    if let Some(d) = lit_path(center, r, moon.phase_angle) {
        layer.push(&format!(r#"<path d="{}" fill="{}"/>"#, d, t.moon_light));
    }
    layer.push(&format!(
        r#"<text x="{:.2}" y="{:.2}" fill="{}" font-family="{}" font-size="{:.2}" text-anchor="middle">{}</text>"#,
        center.x,
        center.y + r + 14.0 * u,
        t.text,
        FONT_FAMILY,
        11.0 * u,
        moon.phase.name()
    ));
    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::test_support::paris_chart;
    use ephemeris::{HorizontalPosition, MoonPhase};
    use rstest::rstest;

    const C: ProjectedPoint = ProjectedPoint { x: 100.0, y: 100.0 };

    fn arc_flags(path: &str) -> Vec<(String, String)> {
        // (rx, sweep) for each arc command
        path.split('A')
            .skip(1)
            .map(|arc| {
                let parts: Vec<&str> = arc.split_whitespace().collect();
                (parts[0].to_string(), parts[4].to_string())
            })
            .collect()
    }

    #[test]
    fn test_new_moon_has_no_lit_part() {
        assert!(lit_path(C, 10.0, 0.0).is_none());
        assert!(lit_path(C, 10.0, 359.0).is_none());
    }

    #[rstest]
    #[case(175.0)]
    #[case(180.0)]
    #[case(185.0)]
    fn test_full_moon_is_a_circle(#[case] phase: f64) {
        let d = lit_path(C, 10.0, phase).unwrap();
        let arcs = arc_flags(&d);
        assert_eq!(arcs.len(), 2);
        assert!(arcs.iter().all(|(rx, _)| rx == "10.00"));
    }

    #[rstest]
    #[case(90.0, "1")]
    #[case(270.0, "0")]
    fn test_quarters_are_half_discs(#[case] phase: f64, #[case] limb_sweep: &str) {
        let arcs = arc_flags(&lit_path(C, 10.0, phase).unwrap());
        assert_eq!(arcs[0].1, limb_sweep);
        // A zero-radius terminator is the straight diameter
        assert_eq!(arcs[1].0, "0.00");
    }

    #[rstest]
    #[case(45.0, "1", "0")] // waxing crescent
    #[case(135.0, "1", "1")] // waxing gibbous
    #[case(225.0, "0", "0")] // waning gibbous
    #[case(315.0, "0", "1")] // waning crescent
    fn test_sweeps_mirror_between_waxing_and_waning(
        #[case] phase: f64,
        #[case] limb: &str,
        #[case] terminator: &str,
    ) {
        let arcs = arc_flags(&lit_path(C, 10.0, phase).unwrap());
        assert_eq!(arcs[0].1, limb);
        assert_eq!(arcs[1].1, terminator);
        // |2k - 1| = |cos(phase)|
        let rx: f64 = arcs[1].0.parse().unwrap();
        assert!((rx - 10.0 * phase.to_radians().cos().abs()).abs() < 0.01);
    }

    fn moon_at(altitude: f64, phase_angle: f64) -> MoonData {
        MoonData {
            position: HorizontalPosition::new(altitude, 140.0),
            phase_angle,
            illumination: (1.0 - phase_angle.to_radians().cos()) / 2.0,
            phase: MoonPhase::from_phase_angle(phase_angle),
            magnitude: -10.0,
        }
    }

    #[test]
    fn test_moon_layer() {
        let chart = paris_chart();
        let ctx = LayerContext::new(&chart);

        let up = moon(&ctx, Some(&moon_at(30.0, 130.0))).unwrap();
        assert!(up.markup.contains("moon-glow"));
        assert!(up.markup.contains("<path"));
        assert!(up.markup.contains(">Waxing Gibbous<"));

        let down = moon(&ctx, Some(&moon_at(-3.0, 130.0))).unwrap();
        assert!(down.is_empty());
        assert!(moon(&ctx, None).unwrap().is_empty());

        let new = moon(&ctx, Some(&moon_at(30.0, 2.0))).unwrap();
        assert!(!new.markup.contains("<path"));
        assert!(new.markup.contains(">New Moon<"));
    }
}
