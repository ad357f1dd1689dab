use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ephemeris::{AnalyticEphemeris, Observer, SkyView};
use starfield::data::EmbeddedSource;
use starfield::Catalog;

fn bench_visible_stars(c: &mut Criterion) {
    let catalog = Catalog::new(EmbeddedSource);
    let stars = match catalog.load_stars() {
        Ok(stars) => stars,
        Err(e) => panic!("embedded catalogue failed to load: {e}"),
    };
    let time = Utc.with_ymd_and_hms(2025, 1, 15, 23, 0, 0).unwrap();
    let view = SkyView::new(time, Observer::new(48.8566, 2.3522), &AnalyticEphemeris);

    c.bench_function("visible_stars_full_catalogue", |b| {
        b.iter(|| view.visible_stars(black_box(&stars), black_box(6.5)))
    });

    c.bench_function("planet_positions", |b| b.iter(|| view.planet_positions()));
}

criterion_group!(benches, bench_visible_stars);
criterion_main!(benches);
