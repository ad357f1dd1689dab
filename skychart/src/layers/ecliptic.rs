//! The ecliptic as a dashed great circle.
//!
//! Every sample is drawn, above the horizon or not; the sky clip hides the
//! part below the horizon.

use ephemeris::HorizontalPosition;

use super::{close_clipped, path_data, LayerContext};
use crate::document::{ChartLayer, LayerKind};
use crate::Result;

pub fn ecliptic(ctx: &LayerContext, path: &[HorizontalPosition]) -> Result<ChartLayer> {
    let mut layer = ctx.clipped_layer(LayerKind::Ecliptic);
    if path.len() >= 2 {
        let points = path
            .iter()
            .map(|p| ctx.project_unclipped(p))
            .collect::<Result<Vec<_>>>()?;
        let u = ctx.unit();
        layer.push(&format!(
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="{:.2}" stroke-dasharray="{:.2} {:.2}" stroke-opacity="0.8"/>"#,
            path_data(&points, true),
            ctx.theme().ecliptic,
            1.2 * u,
            6.0 * u,
            4.0 * u
        ));
    }
    Ok(close_clipped(layer))
}
