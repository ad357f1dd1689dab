//! End-to-end chart renders against the embedded catalogue

use std::sync::Mutex;

use skychart::{
    CallbackProgress, CelestialObjects, ChartConfig, ChartError, ChartRenderer, LayerKind,
    NoProgress, PosterSize, ProgressEvent, ProgressStage, ProjectionMode, StarColorMode,
    ValidationError, VectorDocument,
};

fn paris_config() -> ChartConfig {
    ChartConfig {
        location: Some("48.8566,2.3522".to_string()),
        timestamp: Some("2025-01-15T23:00:00Z".to_string()),
        title: Some("Paris".to_string()),
        size: PosterSize::Pixels {
            width: 1200,
            height: 1600,
        },
        ..Default::default()
    }
}

fn render(config: &ChartConfig) -> VectorDocument {
    let _ = env_logger::builder().is_test(true).try_init();
    ChartRenderer::embedded()
        .render(config, &NoProgress)
        .expect("chart renders")
}

#[test]
fn test_paris_winter_chart() {
    let document = render(&paris_config());

    let kinds: Vec<_> = document.layers.iter().map(|l| l.kind).collect();
    assert_eq!(kinds, LayerKind::ORDER);
    assert_eq!((document.width, document.height), (1200.0, 1600.0));

    let meta = &document.metadata;
    assert!(meta.star_count > 50, "only {} stars", meta.star_count);
    assert!(meta.is_night, "sun at {}", meta.sun_altitude);
    assert!(meta.moon_phase.is_some());
    assert_eq!(meta.theme, "midnight");

    let stars = document.layer(LayerKind::Stars).unwrap();
    assert!(stars.markup.contains("Sirius"));
    let caption = document.layer(LayerKind::Caption).unwrap();
    assert!(caption.markup.contains("PARIS"));
    assert!(caption.markup.contains("48.8566° N / 2.3522° E"));

    let svg = document.to_svg();
    let tree = skychart::raster::parse_svg(&svg).expect("composed SVG parses");
    assert_eq!(tree.size().width(), 1200.0);

    let path = test_helpers::write_artifact("paris_winter_chart.svg", svg.as_bytes()).unwrap();
    assert!(path.exists());
}

#[test]
fn test_render_chart_free_function_matches_renderer() {
    let config = paris_config();
    let a = skychart::render_chart(&config).unwrap();
    let b = render(&config);
    assert_eq!(a.to_svg(), b.to_svg());
}

#[test]
fn test_polar_projection_and_monochrome() {
    let mut config = paris_config();
    config.projection = ProjectionMode::Polar;
    config.star_colors = StarColorMode::Monochrome;
    config.theme = "blueprint".to_string();
    let document = render(&config);
    assert_eq!(document.metadata.theme, "blueprint");
    assert!(skychart::raster::parse_svg(&document.to_svg()).is_ok());
}

#[test]
fn test_object_selection_empties_layers() {
    let mut config = paris_config();
    config.objects = CelestialObjects {
        stars: true,
        ..CelestialObjects::none()
    };
    let document = render(&config);
    for kind in [
        LayerKind::ConstellationLines,
        LayerKind::ConstellationLabels,
        LayerKind::Planets,
        LayerKind::Moon,
    ] {
        assert!(
            document.layer(kind).unwrap().is_empty(),
            "{kind} should be empty"
        );
    }
    assert_eq!(document.metadata.planet_count, 0);
    assert!(document.metadata.moon_phase.is_none());
}

#[test]
fn test_southern_hemisphere_from_map_url() {
    let mut config = paris_config();
    config.location = Some("https://www.google.com/maps/@-33.9249,18.4241,12z".to_string());
    let document = render(&config);
    assert!((document.metadata.latitude + 33.9249).abs() < 1e-9);
    assert!(document
        .layer(LayerKind::Caption)
        .unwrap()
        .markup
        .contains("33.9249° S / 18.4241° E"));
}

#[test]
fn test_missing_timestamp_fails_before_any_work() {
    let mut config = paris_config();
    config.timestamp = None;

    let events = Mutex::new(Vec::new());
    let sink = CallbackProgress(|e: ProgressEvent| events.lock().unwrap().push(e.stage));
    let result = ChartRenderer::embedded().render(&config, &sink);

    assert!(matches!(
        result,
        Err(ChartError::Validation(ValidationError::MissingTimestamp))
    ));
    assert_eq!(
        *events.lock().unwrap(),
        vec![ProgressStage::ResolvingCoordinates]
    );
}

#[test]
fn test_unresolvable_location() {
    let mut config = paris_config();
    config.location = Some("somewhere nice".to_string());
    let result = ChartRenderer::embedded().render(&config, &NoProgress);
    assert!(matches!(result, Err(ChartError::MissingCoordinates)));
}

#[test]
fn test_progress_stages_in_order_over_channel() {
    let (tx, rx) = crossbeam_channel::unbounded();
    ChartRenderer::embedded()
        .render(&paris_config(), &tx)
        .unwrap();
    drop(tx);

    let events: Vec<ProgressEvent> = rx.iter().collect();
    let stages: Vec<_> = events.iter().map(|e| e.stage).collect();
    assert_eq!(
        stages,
        vec![
            ProgressStage::ResolvingCoordinates,
            ProgressStage::LoadingCatalogue,
            ProgressStage::ComputingPositions,
            ProgressStage::ComposingLayers,
            ProgressStage::Assembling,
            ProgressStage::Done,
        ]
    );
    assert!(events.windows(2).all(|w| w[0].percent < w[1].percent));
    assert_eq!(events.last().unwrap().percent, 100.0);
}

#[test]
fn test_config_file_round_trip_through_renderer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chart.json");
    std::fs::write(
        &path,
        r#"{
            "latitude": 40.7128,
            "longitude": -74.006,
            "timestamp": "2025-07-04T03:00",
            "size": {"width_cm": 21.0, "height_cm": 29.7, "dpi": 72},
            "theme": "ocean",
            "show_grid": false
        }"#,
    )
    .unwrap();

    let config = ChartConfig::from_json_file(&path).unwrap();
    let document = render(&config);
    assert_eq!((document.width, document.height), (595.0, 842.0));
    assert!(document.layer(LayerKind::Grid).unwrap().is_empty());
    assert_eq!(document.metadata.theme, "ocean");
}
