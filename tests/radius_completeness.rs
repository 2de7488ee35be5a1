//! Statistical validation of radius queries against an independent
//! distance oracle: no registered point inside the circle may be missed,
//! and nothing meaningfully outside it may be returned.

use geoset::{DistanceUnit, GeoEntry, GeoSet, Point, RadiusOptions, haversine};
use std::collections::BTreeSet;

/// Deterministic xorshift generator so failures reproduce exactly.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

const POINTS_PER_SCENARIO: usize = 2000;

/// Search areas that historically triggered planner boundary conditions:
/// high latitudes, a center near the meridian, and a continent-sized
/// radius.
const SCENARIOS: &[(u64, f64, f64, f64)] = &[
    // (seed, radius_km, center_lon, center_lat)
    (1482225976969, 7083.0, 81.634948934258375, 30.561509253718668),
    (441574, 143.0, 59.235461856813856, 66.269555127373678),
    (160645, 187.0, -101.88575239939883, 49.061997951502917),
    (342880, 145.0, 163.03472387745728, 64.012747720821181),
    (1546032440391, 16751.0, -1.8175081637769495, 20.665668878082954),
    (939895, 151.0, 59.149620271823181, 65.204186651485145),
];

fn random_point(rng: &mut XorShift64) -> Point {
    let lon = -180.0 + rng.next_f64() * 360.0;
    let lat = -70.0 + rng.next_f64() * 140.0;
    Point::new(lon, lat)
}

#[test]
fn test_radius_completeness_and_soundness() {
    for &(seed, radius_km, center_lon, center_lat) in SCENARIOS {
        let mut rng = XorShift64::new(seed);
        let center = Point::new(center_lon, center_lat);
        let radius_m = radius_km * 1000.0;

        let mut geo = GeoSet::memory();
        let mut points = Vec::with_capacity(POINTS_PER_SCENARIO);
        let mut entries = Vec::with_capacity(POINTS_PER_SCENARIO);
        for i in 0..POINTS_PER_SCENARIO {
            let point = random_point(&mut rng);
            entries.push(GeoEntry::new(
                format!("place:{i}"),
                point.x(),
                point.y(),
            ));
            points.push(point);
        }
        geo.add("cloud", &entries).unwrap();

        let returned: BTreeSet<String> = geo
            .search_radius(
                "cloud",
                center,
                radius_km,
                DistanceUnit::Kilometers,
                &RadiusOptions::new(),
            )
            .unwrap()
            .into_iter()
            .map(|m| String::from_utf8_lossy(&m.member).into_owned())
            .collect();

        let mut inside = 0;
        for (i, point) in points.iter().enumerate() {
            let name = format!("place:{i}");
            let true_dist = haversine(center, *point);

            // Completeness: clearly-inside points must always be returned.
            // A sliver around the radius is left to quantization rounding.
            if true_dist < radius_m * 0.999 {
                inside += 1;
                assert!(
                    returned.contains(&name),
                    "seed {seed}: {name} at {true_dist:.1}m missing from {radius_m:.0}m query"
                );
            }

            // Soundness: returned points may not lie meaningfully outside.
            if returned.contains(&name) {
                assert!(
                    true_dist <= radius_m * 1.001,
                    "seed {seed}: {name} at {true_dist:.1}m wrongly inside {radius_m:.0}m query"
                );
            }
        }

        // Sanity: the scenarios are only meaningful if they actually catch
        // points.
        assert!(inside > 0, "seed {seed}: degenerate scenario");
    }
}

#[test]
fn test_repeat_query_is_deterministic() {
    let mut rng = XorShift64::new(0xfeed);
    let mut geo = GeoSet::memory();
    let entries: Vec<GeoEntry> = (0..500)
        .map(|i| {
            let p = random_point(&mut rng);
            GeoEntry::new(format!("p{i}"), p.x(), p.y())
        })
        .collect();
    geo.add("cloud", &entries).unwrap();

    let run = |geo: &mut GeoSet| {
        geo.search_radius(
            "cloud",
            Point::new(12.0, 42.0),
            1500.0,
            DistanceUnit::Kilometers,
            &RadiusOptions::new().ascending().with_dist(),
        )
        .unwrap()
    };

    let first = run(&mut geo);
    let second = run(&mut geo);
    assert_eq!(first, second);
    assert!(!first.is_empty());
}
