//! Radius scan execution.
//!
//! The executor turns a planner's score intervals into ordered range scans
//! against the store, decodes every candidate back to a coordinate, filters
//! by exact great-circle distance and applies the requested output shaping.

use crate::distance::haversine;
use crate::error::Result;
use crate::geohash;
use crate::planner::{self, RadiusPlan};
use crate::store::SortedSetStore;
use crate::types::{Config, SortOrder};
use bytes::Bytes;
use geo::Point;
use rustc_hash::FxHashSet;

/// One candidate that survived the distance filter.
#[derive(Debug, Clone)]
pub(crate) struct RawMatch {
    pub member: Bytes,
    pub score: u64,
    pub point: Point,
    pub dist_m: f64,
}

/// Collect all members of `container` within `radius_m` of `center`.
///
/// Members reached through more than one interval (overlap is possible when
/// the planner's block wraps) are reported once, at their first encounter.
pub(crate) fn collect_in_radius<S: SortedSetStore + ?Sized>(
    store: &S,
    container: &[u8],
    center: Point,
    radius_m: f64,
    config: &Config,
) -> Result<Vec<RawMatch>> {
    let small_container = match config.full_scan_threshold {
        Some(threshold) => store.card(container)? <= threshold,
        None => false,
    };
    let plan = if small_container {
        log::debug!("small container, scanning the full score range");
        RadiusPlan::full_scan()
    } else {
        planner::plan(center, radius_m)?
    };

    let mut seen: FxHashSet<Bytes> = FxHashSet::default();
    let mut matches = Vec::new();
    for range in &plan.ranges {
        for candidate in store.range_scan(container, range.min, range.max)? {
            if !seen.insert(candidate.member.clone()) {
                continue;
            }
            let point = geohash::decode(candidate.score);
            let dist_m = haversine(center, point);
            if dist_m <= radius_m {
                matches.push(RawMatch {
                    member: candidate.member,
                    score: candidate.score,
                    point,
                    dist_m,
                });
            }
        }
    }
    Ok(matches)
}

/// Order and truncate matches.
///
/// Sorting is stable, so members at equal distance keep their scan order;
/// with no sort requested, truncation itself happens in scan order.
pub(crate) fn shape(mut matches: Vec<RawMatch>, sort: SortOrder, count: Option<usize>) -> Vec<RawMatch> {
    match sort {
        SortOrder::Unsorted => {}
        SortOrder::Ascending => matches.sort_by(|a, b| a.dist_m.total_cmp(&b.dist_m)),
        SortOrder::Descending => matches.sort_by(|a, b| b.dist_m.total_cmp(&a.dist_m)),
    }
    if let Some(count) = count {
        matches.truncate(count);
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, ScoredMember};

    fn raw(member: &str, dist_m: f64) -> RawMatch {
        RawMatch {
            member: Bytes::copy_from_slice(member.as_bytes()),
            score: 0,
            point: Point::new(0.0, 0.0),
            dist_m,
        }
    }

    #[test]
    fn test_shape_sorts_by_distance() {
        let matches = vec![raw("far", 300.0), raw("near", 10.0), raw("mid", 50.0)];

        let asc = shape(matches.clone(), SortOrder::Ascending, None);
        let names: Vec<_> = asc.iter().map(|m| m.member.clone()).collect();
        assert_eq!(names, vec!["near", "mid", "far"]);

        let desc = shape(matches, SortOrder::Descending, None);
        let names: Vec<_> = desc.iter().map(|m| m.member.clone()).collect();
        assert_eq!(names, vec!["far", "mid", "near"]);
    }

    #[test]
    fn test_shape_truncates_in_scan_order_when_unsorted() {
        let matches = vec![raw("first", 300.0), raw("second", 10.0), raw("third", 50.0)];
        let shaped = shape(matches, SortOrder::Unsorted, Some(2));
        let names: Vec<_> = shaped.iter().map(|m| m.member.clone()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_shape_ties_keep_scan_order() {
        let matches = vec![raw("a", 10.0), raw("b", 10.0), raw("c", 10.0)];
        let shaped = shape(matches, SortOrder::Ascending, Some(2));
        let names: Vec<_> = shaped.iter().map(|m| m.member.clone()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_collect_filters_by_exact_distance() {
        let mut store = MemoryStore::new();
        let center = Point::new(13.361389, 38.115556);
        let near = Point::new(13.3614, 38.1156);
        let far = Point::new(15.087269, 37.502669);

        store
            .insert(
                b"places",
                &[
                    ScoredMember::new("near", geohash::encode(near).unwrap()),
                    ScoredMember::new("far", geohash::encode(far).unwrap()),
                ],
            )
            .unwrap();

        let matches =
            collect_in_radius(&store, b"places", center, 1000.0, &Config::default()).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].member.as_ref(), b"near");
        assert!(matches[0].dist_m < 1000.0);
    }

    #[test]
    fn test_collect_with_full_scan_threshold() {
        let mut store = MemoryStore::new();
        let center = Point::new(0.0, 0.0);
        store
            .insert(
                b"places",
                &[ScoredMember::new(
                    "origin",
                    geohash::encode(center).unwrap(),
                )],
            )
            .unwrap();

        let config = Config::default().with_full_scan_threshold(16);
        let matches = collect_in_radius(&store, b"places", center, 100.0, &config).unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_collect_missing_container_is_empty() {
        let store = MemoryStore::new();
        let matches = collect_in_radius(
            &store,
            b"nothing",
            Point::new(0.0, 0.0),
            1000.0,
            &Config::default(),
        )
        .unwrap();
        assert!(matches.is_empty());
    }
}
