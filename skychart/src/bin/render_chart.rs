//! Render a star chart poster for a place and time.
//!
//! # Usage
//!
//! ```bash
//! # Paris, tonight's sky as SVG
//! cargo run --release --bin render_chart -- --lat 48.8566 --lon 2.3522 \
//!     --time 2025-01-15T23:00:00Z --title "Paris"
//!
//! # From a map-share link, as a 30 x 40 cm PNG in the aurora theme
//! cargo run --release --bin render_chart -- \
//!     --location "https://www.google.com/maps/@51.5074,-0.1278,12z" \
//!     --time "2025-06-21 22:30" --theme aurora --format png
//!
//! # Start from a JSON config and override the projection
//! cargo run --release --bin render_chart -- --config chart.json --projection polar
//!
//! # List the available themes
//! cargo run --release --bin render_chart -- --list-themes
//! ```
//!
//! Without `--output`, the file is named `{slug}_{theme}_{YYYYmmdd_HHMMSS}.{ext}`
//! in the current directory.

use std::path::PathBuf;
use std::thread;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use skychart::raster::write_document;
use skychart::theme::load_theme_dir;
use skychart::{
    CelestialObjects, ChartConfig, ChartRenderer, OutputFormat, PosterSize, ProgressEvent,
    ProjectionMode, StarColorMode, Theme,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Render a star chart poster", long_about = None)]
struct Args {
    /// JSON chart config; other flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Place as "lat,lon" or a map-share URL
    #[arg(short, long)]
    location: Option<String>,

    /// Latitude in degrees, north positive
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    lat: Option<f64>,

    /// Longitude in degrees, east positive
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lon: Option<f64>,

    /// Instant to chart, ISO-8601 (naive times are UTC)
    #[arg(short, long)]
    time: Option<String>,

    /// Poster title
    #[arg(long)]
    title: Option<String>,

    /// Line under the title
    #[arg(long)]
    subtitle: Option<String>,

    /// Theme name, built-in or from --theme-dir
    #[arg(long)]
    theme: Option<String>,

    /// Directory of additional *.json themes
    #[arg(long)]
    theme_dir: Option<PathBuf>,

    /// Sky projection
    #[arg(long, value_enum)]
    projection: Option<ProjectionMode>,

    /// How stars are coloured
    #[arg(long, value_enum)]
    star_colors: Option<StarColorMode>,

    /// Comma-separated objects to draw: stars, planets, moon, constellations, zodiac or all
    #[arg(long, value_parser = CelestialObjects::from_list)]
    objects: Option<CelestialObjects>,

    /// Width in pixels
    #[arg(long, requires = "height", conflicts_with_all = ["width_cm", "height_cm"])]
    width: Option<u32>,

    /// Height in pixels
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Width in centimetres
    #[arg(long, requires = "height_cm")]
    width_cm: Option<f64>,

    /// Height in centimetres
    #[arg(long, requires = "width_cm")]
    height_cm: Option<f64>,

    /// Print resolution for centimetre sizes
    #[arg(long, default_value_t = 300.0)]
    dpi: f64,

    /// Faintest star magnitude to draw
    #[arg(long, allow_hyphen_values = true)]
    max_magnitude: Option<f64>,

    /// Hide the altitude/azimuth grid
    #[arg(long)]
    no_grid: bool,

    /// Draw zodiac signs below the horizon, dimmed
    #[arg(long)]
    show_all_zodiac: bool,

    /// Output encoding; defaults to the --output extension, else SVG
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the available themes and exit
    #[arg(long)]
    list_themes: bool,
}

impl Args {
    /// Layer the flags over the config file (or the defaults)
    fn chart_config(&self) -> Result<ChartConfig> {
        let mut config = match &self.config {
            Some(path) => ChartConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ChartConfig::default(),
        };

        if let Some(location) = &self.location {
            config.location = Some(location.clone());
            config.latitude = None;
            config.longitude = None;
        }
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            config.latitude = Some(lat);
            config.longitude = Some(lon);
        }
        if self.time.is_some() {
            config.timestamp = self.time.clone();
        }
        if self.title.is_some() {
            config.title = self.title.clone();
        }
        if self.subtitle.is_some() {
            config.subtitle = self.subtitle.clone();
        }
        if let Some(theme) = &self.theme {
            config.theme = theme.clone();
        }
        if let Some(projection) = self.projection {
            config.projection = projection;
        }
        if let Some(mode) = self.star_colors {
            config.star_colors = mode;
        }
        if let Some(objects) = self.objects {
            config.objects = objects;
        }
        if let (Some(width), Some(height)) = (self.width, self.height) {
            config.size = PosterSize::Pixels { width, height };
        }
        if let (Some(width_cm), Some(height_cm)) = (self.width_cm, self.height_cm) {
            config.size = PosterSize::Physical {
                width_cm,
                height_cm,
                dpi: self.dpi,
            };
        }
        if let Some(max_magnitude) = self.max_magnitude {
            config.max_magnitude = max_magnitude;
        }
        if self.no_grid {
            config.show_grid = false;
        }
        if self.show_all_zodiac {
            config.show_all_zodiac = true;
        }
        Ok(config)
    }
}

/// Lowercase, filesystem-safe form of a place name
fn slug(text: &str) -> String {
    let mapped: String = text
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    let parts: Vec<&str> = mapped.split('_').filter(|s| !s.is_empty()).collect();
    if parts.is_empty() {
        "sky".to_string()
    } else {
        parts.join("_")
    }
}

fn default_output(config: &ChartConfig, theme: &str, format: OutputFormat) -> PathBuf {
    let name = config.title.as_deref().unwrap_or("sky");
    PathBuf::from(format!(
        "{}_{}_{}.{}",
        slug(name),
        slug(theme),
        Local::now().format("%Y%m%d_%H%M%S"),
        format.extension()
    ))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let custom_themes = match &args.theme_dir {
        Some(dir) => load_theme_dir(dir)
            .with_context(|| format!("Failed to load themes from {}", dir.display()))?,
        None => Vec::new(),
    };

    if args.list_themes {
        for theme in custom_themes.iter().chain(Theme::builtin_themes()) {
            println!("{:<12} {}", theme.name, theme.description);
        }
        return Ok(());
    }

    let config = args.chart_config()?;
    if config.timestamp.is_none() {
        bail!("No time given: pass --time or set \"timestamp\" in the config");
    }

    let format = args
        .format
        .or_else(|| args.output.as_deref().and_then(OutputFormat::from_path))
        .unwrap_or_default();

    let renderer = ChartRenderer::embedded().with_themes(custom_themes);
    let chart = renderer.resolve(&config).context("Invalid chart request")?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&config, &chart.theme.name, format));

    let (tx, rx) = crossbeam_channel::unbounded::<ProgressEvent>();
    let document = thread::scope(|scope| {
        scope.spawn(move || {
            for event in rx {
                println!("[{:>3.0}%] {}", event.percent, event.message);
            }
        });
        let result = renderer.render_resolved(&chart, &tx);
        drop(tx);
        result
    })
    .context("Failed to render chart")?;

    write_document(&document, &output, format)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let meta = &document.metadata;
    println!(
        "{} stars, {} planets{}; sun at {:.1}° ({})",
        meta.star_count,
        meta.planet_count,
        meta.moon_phase
            .as_ref()
            .map(|p| format!(", moon {p}"))
            .unwrap_or_default(),
        meta.sun_altitude,
        if meta.is_night { "night" } else { "twilight or day" }
    );
    println!("Saved {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(slug("New York City"), "new_york_city");
        assert_eq!(slug("  São Paulo, BR "), "são_paulo_br");
        assert_eq!(slug("!!"), "sky");
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "render_chart",
            "--lat",
            "-33.9",
            "--lon",
            "18.4",
            "--time",
            "2025-03-01T20:00:00Z",
            "--width",
            "800",
            "--height",
            "1000",
            "--objects",
            "stars,moon",
            "--projection",
            "polar",
            "--no-grid",
        ]);
        let config = args.chart_config().unwrap();
        assert_eq!(config.latitude, Some(-33.9));
        assert_eq!(config.size, PosterSize::Pixels { width: 800, height: 1000 });
        assert!(config.objects.moon && !config.objects.planets);
        assert_eq!(config.projection, ProjectionMode::Polar);
        assert!(!config.show_grid);
    }

    #[test]
    fn test_unknown_object_rejected() {
        let result = Args::try_parse_from(["render_chart", "--objects", "comets"]);
        assert!(result.is_err());
    }
}
