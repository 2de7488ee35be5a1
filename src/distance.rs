//! Great-circle distance math.
//!
//! All query filtering and distance reporting goes through [`haversine`],
//! which uses a fixed spherical Earth radius so that distances stay
//! consistent with the cell-edge estimates used by the query planner.

use geo::Point;

/// Spherical Earth radius in meters shared by the distance and planning math.
pub const EARTH_RADIUS_M: f64 = 6372797.560856;

/// Great-circle distance in meters between two points, half-angle haversine
/// form.
///
/// The half-angle form stays numerically stable for very small separations,
/// where the law-of-cosines variant loses precision.
///
/// # Examples
///
/// ```rust
/// use geo::Point;
/// use geoset::distance::haversine;
///
/// let palermo = Point::new(13.361389, 38.115556);
/// let catania = Point::new(15.087269, 37.502669);
/// let d = haversine(palermo, catania);
/// assert!(d > 166_000.0 && d < 167_000.0);
/// ```
pub fn haversine(a: Point, b: Point) -> f64 {
    let lon1 = a.x().to_radians();
    let lat1 = a.y().to_radians();
    let lon2 = b.x().to_radians();
    let lat2 = b.y().to_radians();

    let u = ((lat2 - lat1) / 2.0).sin();
    let v = ((lon2 - lon1) / 2.0).sin();
    2.0 * EARTH_RADIUS_M * (u * u + lat1.cos() * lat2.cos() * v * v).sqrt().asin()
}
