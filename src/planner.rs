//! Radius query planning.
//!
//! A circular search region cannot be answered by a single score range: the
//! interleaved encoding splits adjacent space at every cell boundary. The
//! planner instead picks the coarsest step at which a 3×3 block of cells is
//! guaranteed to contain the circle, then turns that block into a small set
//! of merged score intervals for the executor to scan.

use crate::distance::{EARTH_RADIUS_M, haversine};
use crate::error::Result;
use crate::geohash::{self, CellId, STEP_MAX};
use geo::Point;
use smallvec::SmallVec;

/// Upper bound of the projected coordinate space, in meters; one step-1 cell
/// spans half of it per axis.
const MERCATOR_MAX: f64 = 20037726.37;

/// A half-open interval `[min, max)` of the 52-bit score space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreRange {
    pub min: u64,
    pub max: u64,
}

/// The scan plan for one circular query: at most nine merged score
/// intervals, all at the same quantization step.
#[derive(Debug, Clone)]
pub struct RadiusPlan {
    pub step: u8,
    pub ranges: SmallVec<[ScoreRange; 9]>,
}

impl RadiusPlan {
    /// A single interval covering the entire score space.
    pub fn full_scan() -> Self {
        let mut ranges = SmallVec::new();
        ranges.push(ScoreRange {
            min: 0,
            max: 1u64 << 52,
        });
        RadiusPlan { step: 0, ranges }
    }
}

/// Choose the coarsest step at which a 3×3 cell block still covers a circle
/// of `radius_m` centered at latitude `lat`.
///
/// Starting from the finest grid, each halving of precision doubles the cell
/// edge; coarsen until the edge reaches the radius. Cells shrink along the
/// parallel towards the poles, so high latitudes get one or two extra levels
/// of coarsening. Clamped to `[1, STEP_MAX]`; a radius in the
/// half-circumference range degenerates to step 1, where the merged block is
/// effectively a full-range scan.
pub fn estimate_step(radius_m: f64, lat: f64) -> u8 {
    if radius_m == 0.0 {
        return STEP_MAX;
    }
    let mut step: i32 = 1;
    let mut r = radius_m;
    while r < MERCATOR_MAX {
        r *= 2.0;
        step += 1;
    }
    step -= 2;
    if !(-66.0..=66.0).contains(&lat) {
        step -= 1;
        if !(-80.0..=80.0).contains(&lat) {
            step -= 1;
        }
    }
    step.clamp(1, STEP_MAX as i32) as u8
}

/// Degree-space bounding box of the circle: (min_lon, min_lat, max_lon,
/// max_lat). The longitude delta widens with latitude.
fn bounding_box(center: Point, radius_m: f64) -> (f64, f64, f64, f64) {
    let lon = center.x();
    let lat = center.y();
    let lat_delta = (radius_m / EARTH_RADIUS_M).to_degrees();
    let lon_delta = (radius_m / EARTH_RADIUS_M / lat.to_radians().cos()).to_degrees();
    (
        lon - lon_delta,
        lat - lat_delta,
        lon + lon_delta,
        lat + lat_delta,
    )
}

/// Plan the interval scans for a circle.
///
/// The center must already be validated against the supported coordinate
/// ranges.
pub fn plan(center: Point, radius_m: f64) -> Result<RadiusPlan> {
    let (min_lon, min_lat, max_lon, max_lat) = bounding_box(center, radius_m);
    let mut step = estimate_step(radius_m, center.y());

    let mut cell = geohash::encode_step(center, step)?;
    let mut nbrs = geohash::neighbors(cell);
    let mut area = geohash::cell_bounds(cell);

    // The estimate is a heuristic: when the circle presses against an edge
    // of the center cell, the neighbor on that side may not reach far
    // enough. One level coarser always does.
    let mut underestimated = false;
    if let Some(north) = nbrs.north {
        let bounds = geohash::cell_bounds(north);
        let reach = haversine(center, Point::new(center.x(), bounds.max_lat));
        underestimated |= reach < radius_m;
    }
    if let Some(south) = nbrs.south {
        let bounds = geohash::cell_bounds(south);
        let reach = haversine(center, Point::new(center.x(), bounds.min_lat));
        underestimated |= reach < radius_m;
    }
    if let Some(east) = nbrs.east {
        let bounds = geohash::cell_bounds(east);
        let reach = haversine(center, Point::new(bounds.max_lon, center.y()));
        underestimated |= reach < radius_m;
    }
    if let Some(west) = nbrs.west {
        let bounds = geohash::cell_bounds(west);
        let reach = haversine(center, Point::new(bounds.min_lon, center.y()));
        underestimated |= reach < radius_m;
    }
    if underestimated && step > 1 {
        step -= 1;
        cell = geohash::encode_step(center, step)?;
        nbrs = geohash::neighbors(cell);
        area = geohash::cell_bounds(cell);
    }

    // Neighbors on a side where the center cell already covers the whole
    // bounding box contribute nothing; drop them. Skipped at step 1, where
    // the grid is too coarse for the bounds comparison to be meaningful.
    if step >= 2 {
        if area.min_lat < min_lat {
            nbrs.south = None;
            nbrs.south_east = None;
            nbrs.south_west = None;
        }
        if area.max_lat > max_lat {
            nbrs.north = None;
            nbrs.north_east = None;
            nbrs.north_west = None;
        }
        if area.min_lon < min_lon {
            nbrs.west = None;
            nbrs.south_west = None;
            nbrs.north_west = None;
        }
        if area.max_lon > max_lon {
            nbrs.east = None;
            nbrs.south_east = None;
            nbrs.north_east = None;
        }
    }

    let mut ranges: SmallVec<[ScoreRange; 9]> = SmallVec::new();
    ranges.push(score_range(cell));
    for neighbor in nbrs.iter() {
        ranges.push(score_range(neighbor));
    }

    // Adjacent cells often produce contiguous intervals (and at very coarse
    // steps the wrap makes some neighbors alias); merging keeps every score
    // from being scanned twice.
    ranges.sort_unstable_by_key(|r| r.min);
    let mut merged: SmallVec<[ScoreRange; 9]> = SmallVec::new();
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.min <= last.max => {
                last.max = last.max.max(range.max);
            }
            _ => merged.push(range),
        }
    }

    log::debug!(
        "planned {} interval(s) at step {} for radius {:.1}m",
        merged.len(),
        step,
        radius_m
    );

    Ok(RadiusPlan {
        step,
        ranges: merged,
    })
}

fn score_range(cell: CellId) -> ScoreRange {
    ScoreRange {
        min: geohash::align52(cell),
        max: geohash::align52(CellId {
            bits: cell.bits + 1,
            step: cell.step,
        }),
    }
}
