//! Chart rendering pipeline.
//!
//! One render walks `resolve -> load catalogue -> compute -> build layers ->
//! assemble`. Any error aborts the whole render; there is no partial
//! document. The sky computations are independent and run concurrently, but
//! their results are gathered into one [`SkyData`] before any layer is
//! built, so layer order never depends on which computation finished first.

use std::sync::Arc;

use ephemeris::{
    AnalyticEphemeris, EphemerisProvider, HorizontalConstellation, HorizontalPosition, MoonData,
    SkyView, VisiblePlanet, VisibleStar, ZodiacSign,
};
use log::{debug, info};
use once_cell::sync::Lazy;
use starfield::data::{CatalogSource, EmbeddedSource};
use starfield::{Catalog, ConstellationLine, StarRecord};

use crate::config::{ChartConfig, ResolvedChart};
use crate::document::{ChartLayer, ChartMetadata, LayerKind, VectorDocument};
use crate::layers::{
    background, caption, constellations, ecliptic, grid, moon, planets, stars, zodiac,
    LayerContext,
};
use crate::location::{LocationResolver, MapUrlResolver};
use crate::progress::{NoProgress, ProgressSink, ProgressStage};
use crate::theme::Theme;
use crate::{ChartError, Result};

/// Sun altitude below which the sky counts as dark, in degrees
const NIGHT_SUN_ALTITUDE: f64 = -12.0;

/// Everything computed about the sky for one chart.
///
/// Categories switched off in the request are empty rather than computed
/// and discarded.
#[derive(Debug, Clone)]
pub struct SkyData {
    /// Julian Day of the chart instant
    pub julian_day: f64,
    pub stars: Vec<VisibleStar>,
    pub planets: Vec<VisiblePlanet>,
    pub moon: Option<MoonData>,
    pub constellations: Vec<HorizontalConstellation>,
    pub zodiac: Vec<ZodiacSign>,
    pub sun: HorizontalPosition,
    pub ecliptic: Vec<HorizontalPosition>,
}

impl SkyData {
    /// Run every requested computation for `chart` against `view`
    pub fn compute<P: EphemerisProvider + ?Sized>(
        view: &SkyView<'_, P>,
        chart: &ResolvedChart,
        star_records: &[StarRecord],
        lines: &[ConstellationLine],
    ) -> Result<SkyData> {
        let objects = chart.objects;

        let ((stars, planets), ((moon, sun), (constellations, (zodiac, ecliptic)))) = rayon::join(
            || {
                rayon::join(
                    || {
                        if objects.stars {
                            view.visible_stars(star_records, chart.max_magnitude)
                        } else {
                            Vec::new()
                        }
                    },
                    || {
                        if objects.planets {
                            view.planet_positions()
                        } else {
                            Vec::new()
                        }
                    },
                )
            },
            || {
                rayon::join(
                    || {
                        rayon::join(
                            || objects.moon.then(|| view.moon_data()).transpose(),
                            || view.sun_position(),
                        )
                    },
                    || {
                        rayon::join(
                            || {
                                if objects.constellations {
                                    view.constellation_lines(lines)
                                } else {
                                    Vec::new()
                                }
                            },
                            || {
                                rayon::join(
                                    || {
                                        if objects.zodiac {
                                            view.zodiac_positions()
                                        } else {
                                            Vec::new()
                                        }
                                    },
                                    || view.ecliptic_path(chart.ecliptic_points),
                                )
                            },
                        )
                    },
                )
            },
        );

        // The Sun and the Moon are essential; their failures fail the chart
        let sky = SkyData {
            julian_day: view.julian_day(),
            stars,
            planets,
            moon: moon?,
            constellations,
            zodiac,
            sun: sun?,
            ecliptic,
        };
        debug!(
            "Sky data: {} stars, {} planets, moon {}, {} constellations, {} zodiac signs, {} ecliptic points",
            sky.stars.len(),
            sky.planets.len(),
            if sky.moon.is_some() { "computed" } else { "skipped" },
            sky.constellations.len(),
            sky.zodiac.len(),
            sky.ecliptic.len()
        );
        Ok(sky)
    }
}

/// Draw every layer in [`LayerKind::ORDER`].
///
/// Returns the layers and the number of planets actually drawn.
pub fn build_layers(chart: &ResolvedChart, sky: &SkyData) -> Result<(Vec<ChartLayer>, usize)> {
    let ctx = LayerContext::new(chart);

    let grid_layer = if chart.show_grid {
        grid::grid(&ctx)?
    } else {
        ChartLayer::new(LayerKind::Grid)
    };
    let (planet_layer, planet_count) = planets::planets(&ctx, &sky.planets)?;

    let layers = vec![
        background::background(&ctx),
        background::defs(&ctx),
        grid_layer,
        ecliptic::ecliptic(&ctx, &sky.ecliptic)?,
        constellations::lines(&ctx, &sky.constellations)?,
        constellations::labels(&ctx, &sky.constellations)?,
        stars::stars(&ctx, &sky.stars)?,
        planet_layer,
        moon::moon(&ctx, sky.moon.as_ref())?,
        zodiac::zodiac(&ctx, &sky.zodiac, chart.show_all_zodiac)?,
        grid::horizon(&ctx),
        caption::caption(&ctx),
    ];

    let kinds: Vec<LayerKind> = layers.iter().map(|l| l.kind).collect();
    if kinds != LayerKind::ORDER {
        return Err(ChartError::Composition(format!(
            "layers built out of order: {kinds:?}"
        )));
    }
    Ok((layers, planet_count))
}

/// Renders charts from requests.
///
/// Owns the catalogue (loaded on first render and reused afterwards), the
/// ephemeris provider, the location resolver and any custom themes.
pub struct ChartRenderer<S: CatalogSource, P: EphemerisProvider = AnalyticEphemeris> {
    catalog: Catalog<S>,
    ephemeris: P,
    resolver: Box<dyn LocationResolver>,
    themes: Vec<Theme>,
}

impl ChartRenderer<EmbeddedSource> {
    /// Renderer over the embedded catalogue and the analytic ephemeris
    pub fn embedded() -> Self {
        Self::new(Catalog::new(EmbeddedSource), AnalyticEphemeris)
    }
}

impl<S: CatalogSource, P: EphemerisProvider> ChartRenderer<S, P> {
    pub fn new(catalog: Catalog<S>, ephemeris: P) -> Self {
        Self {
            catalog,
            ephemeris,
            resolver: Box::new(MapUrlResolver),
            themes: Vec::new(),
        }
    }

    /// Replace the location resolver
    pub fn with_resolver(mut self, resolver: impl LocationResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Themes searched before the built-in ones
    pub fn with_themes(mut self, themes: Vec<Theme>) -> Self {
        self.themes = themes;
        self
    }

    pub fn catalog(&self) -> &Catalog<S> {
        &self.catalog
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    /// Validate a request against this renderer's resolver and themes
    pub fn resolve(&self, config: &ChartConfig) -> Result<ResolvedChart> {
        config.resolve(self.resolver.as_ref(), &self.themes)
    }

    /// Compute the sky for an already resolved chart
    pub fn compute(&self, chart: &ResolvedChart) -> Result<SkyData> {
        let star_records = if chart.objects.stars {
            self.catalog.load_stars()?
        } else {
            Arc::default()
        };
        let lines = if chart.objects.constellations {
            self.catalog.load_constellation_lines()?
        } else {
            Arc::default()
        };

        let view = SkyView::new(chart.time, chart.observer, &self.ephemeris);
        SkyData::compute(&view, chart, &star_records, &lines)
    }

    /// Render a chart, reporting each stage to `progress`
    pub fn render(
        &self,
        config: &ChartConfig,
        progress: &dyn ProgressSink,
    ) -> Result<VectorDocument> {
        progress.report(ProgressStage::ResolvingCoordinates.into());
        let chart = self.resolve(config)?;
        self.render_resolved(&chart, progress)
    }

    /// Render a chart that has already been validated
    pub fn render_resolved(
        &self,
        chart: &ResolvedChart,
        progress: &dyn ProgressSink,
    ) -> Result<VectorDocument> {
        progress.report(ProgressStage::LoadingCatalogue.into());
        if chart.objects.stars {
            self.catalog.load_stars()?;
        }
        if chart.objects.constellations {
            self.catalog.load_constellation_lines()?;
        }

        progress.report(ProgressStage::ComputingPositions.into());
        let sky = self.compute(chart)?;

        progress.report(ProgressStage::ComposingLayers.into());
        let (layers, planet_count) = build_layers(chart, &sky)?;

        progress.report(ProgressStage::Assembling.into());
        let metadata = ChartMetadata {
            timestamp: chart.time.to_rfc3339(),
            latitude: chart.observer.latitude,
            longitude: chart.observer.longitude,
            julian_day: sky.julian_day,
            sun_altitude: sky.sun.altitude,
            is_night: sky.sun.altitude < NIGHT_SUN_ALTITUDE,
            star_count: sky.stars.len(),
            planet_count,
            constellation_count: sky.constellations.len(),
            moon_phase: sky.moon.as_ref().map(|m| m.phase.name().to_string()),
            moon_illumination: sky.moon.as_ref().map(|m| m.illumination),
            theme: chart.theme.name.clone(),
        };
        let document = VectorDocument {
            width: chart.canvas.width,
            height: chart.canvas.height,
            layers,
            metadata,
        };

        info!(
            "Rendered {}x{} chart for ({:.4}, {:.4}) at {}: {} stars, {} planets, sun at {:.1} deg",
            document.width,
            document.height,
            chart.observer.latitude,
            chart.observer.longitude,
            chart.time,
            document.metadata.star_count,
            planet_count,
            sky.sun.altitude
        );
        progress.report(ProgressStage::Done.into());
        Ok(document)
    }
}

static DEFAULT_RENDERER: Lazy<ChartRenderer<EmbeddedSource>> = Lazy::new(ChartRenderer::embedded);

/// Render with the embedded catalogue and analytic ephemeris, no progress
pub fn render_chart(config: &ChartConfig) -> Result<VectorDocument> {
    DEFAULT_RENDERER.render(config, &NoProgress)
}
