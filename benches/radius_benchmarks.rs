use criterion::{Criterion, black_box, criterion_group, criterion_main};
use geoset::{DistanceUnit, GeoEntry, GeoSet, Point, RadiusOptions};

fn seeded_entries(count: usize) -> Vec<GeoEntry> {
    // Deterministic spread over Europe-ish longitudes and latitudes
    let mut state: u64 = 0x9e3779b97f4a7c15;
    (0..count)
        .map(|i| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let lon = -10.0 + (state % 4000) as f64 * 0.01;
            let lat = 35.0 + ((state >> 16) % 2000) as f64 * 0.01;
            GeoEntry::new(format!("place:{i}"), lon, lat)
        })
        .collect()
}

fn benchmark_registration(c: &mut Criterion) {
    let mut group = c.benchmark_group("registration");

    group.bench_function("add_single", |b| {
        let mut geo = GeoSet::memory();
        let mut counter = 0u64;
        b.iter(|| {
            let member = format!("bench:{counter}");
            counter += 1;
            let lon = -10.0 + (counter % 1000) as f64 * 0.01;
            geo.add("bench", &[GeoEntry::new(black_box(&member), lon, 45.0)])
                .unwrap()
        })
    });

    group.bench_function("add_batch_100", |b| {
        let mut geo = GeoSet::memory();
        let entries = seeded_entries(100);
        b.iter(|| geo.add(black_box("bench"), black_box(&entries)).unwrap())
    });

    group.finish();
}

fn benchmark_radius_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("radius_queries");

    let mut geo = GeoSet::memory();
    geo.add("bench", &seeded_entries(10_000)).unwrap();
    let center = Point::new(5.0, 45.0);

    group.bench_function("radius_50km", |b| {
        b.iter(|| {
            geo.search_radius(
                black_box("bench"),
                black_box(center),
                50.0,
                DistanceUnit::Kilometers,
                &RadiusOptions::new(),
            )
            .unwrap()
        })
    });

    group.bench_function("radius_50km_sorted_count_10", |b| {
        let opts = RadiusOptions::new().ascending().count(10);
        b.iter(|| {
            geo.search_radius(
                black_box("bench"),
                black_box(center),
                50.0,
                DistanceUnit::Kilometers,
                &opts,
            )
            .unwrap()
        })
    });

    group.bench_function("radius_1000km", |b| {
        b.iter(|| {
            geo.search_radius(
                black_box("bench"),
                black_box(center),
                1000.0,
                DistanceUnit::Kilometers,
                &RadiusOptions::new(),
            )
            .unwrap()
        })
    });

    group.finish();
}

fn benchmark_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance");

    let mut geo = GeoSet::memory();
    geo.add(
        "sicily",
        &[
            GeoEntry::new("Palermo", 13.361389, 38.115556),
            GeoEntry::new("Catania", 15.087269, 37.502669),
        ],
    )
    .unwrap();

    group.bench_function("dist_between_members", |b| {
        b.iter(|| {
            geo.dist(
                black_box("sicily"),
                black_box("Palermo"),
                black_box("Catania"),
                DistanceUnit::Meters,
            )
            .unwrap()
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_registration,
    benchmark_radius_queries,
    benchmark_distance
);
criterion_main!(benches);
