//! Interleaved-bit geohash codec.
//!
//! Coordinates are quantized to 26 bits per axis over the supported
//! longitude/latitude ranges and interleaved into a single 52-bit integer
//! (latitude on even bits, longitude on odd bits). The resulting value is
//! sortable: all finer cells nested inside a coarser cell occupy one
//! contiguous range of the score space, which is what lets a radius query be
//! answered with a handful of ordered range scans.
//!
//! The encoding is not distance-preserving across cell boundaries; callers
//! that need spatial completeness must expand to the neighboring cells via
//! [`neighbors`].

use crate::error::{GeoSetError, Result};
use geo::Point;

/// Finest quantization: bits per axis.
pub const STEP_MAX: u8 = 26;

pub const LONGITUDE_MIN: f64 = -180.0;
pub const LONGITUDE_MAX: f64 = 180.0;

/// The usable latitude band. Quantizing over the Web-Mercator band instead
/// of the full [-90, 90] range spends the available bits where the cells
/// stay usefully square.
pub const LATITUDE_MIN: f64 = -85.05112878;
pub const LATITUDE_MAX: f64 = 85.05112878;

const BASE32_ALPHABET: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Latitude occupies the even interleaved bits, longitude the odd ones.
const EVEN_BITS: u64 = 0x5555555555555555;
const ODD_BITS: u64 = 0xaaaaaaaaaaaaaaaa;

/// A grid cell: `step` bits per axis, interleaved into `bits`.
///
/// At `step == STEP_MAX` the cell is one addressable storage cell and
/// `bits` is the member's score; at coarser steps it covers a contiguous
/// score interval (see [`align52`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellId {
    pub bits: u64,
    pub step: u8,
}

/// Geographic bounds of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl CellBounds {
    /// Center of the cell; this is what [`decode`] reports for a score.
    pub fn center(&self) -> Point {
        Point::new(
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }
}

/// The up-to-eight cells surrounding a cell at the same step.
///
/// Longitude wraps across the ±180° meridian, so the east/west neighbors
/// always exist. Latitude does not wrap: rows beyond the supported band are
/// reported as `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Neighbors {
    pub north: Option<CellId>,
    pub east: Option<CellId>,
    pub south: Option<CellId>,
    pub west: Option<CellId>,
    pub north_east: Option<CellId>,
    pub south_east: Option<CellId>,
    pub south_west: Option<CellId>,
    pub north_west: Option<CellId>,
}

impl Neighbors {
    /// Iterate the neighbors that exist.
    pub fn iter(&self) -> impl Iterator<Item = CellId> + '_ {
        [
            self.north,
            self.north_east,
            self.east,
            self.south_east,
            self.south,
            self.south_west,
            self.west,
            self.north_west,
        ]
        .into_iter()
        .flatten()
    }
}

/// Check that a point lies inside the encodable coordinate ranges.
pub fn validate_coordinates(point: &Point) -> Result<()> {
    let (lon, lat) = (point.x(), point.y());
    if !(LONGITUDE_MIN..=LONGITUDE_MAX).contains(&lon)
        || !(LATITUDE_MIN..=LATITUDE_MAX).contains(&lat)
        || !lon.is_finite()
        || !lat.is_finite()
    {
        return Err(GeoSetError::InvalidCoordinates {
            longitude: lon,
            latitude: lat,
        });
    }
    Ok(())
}

/// Encode a point as a 52-bit score at the finest quantization.
///
/// Fails with [`GeoSetError::InvalidCoordinates`] when the point falls
/// outside the supported ranges.
pub fn encode(point: Point) -> Result<u64> {
    Ok(encode_step(point, STEP_MAX)?.bits)
}

/// Encode a point at an arbitrary step in `[1, STEP_MAX]`.
pub fn encode_step(point: Point, step: u8) -> Result<CellId> {
    debug_assert!((1..=STEP_MAX).contains(&step));
    validate_coordinates(&point)?;
    let bits = quantize(
        point.x(),
        point.y(),
        LONGITUDE_MIN,
        LONGITUDE_MAX,
        LATITUDE_MIN,
        LATITUDE_MAX,
        step,
    );
    Ok(CellId { bits, step })
}

/// Decode a 52-bit score back to a coordinate.
///
/// The result is the center of the storage cell, not the originally encoded
/// position; the two differ by at most the cell half-width (centimeters at
/// this precision).
pub fn decode(bits: u64) -> Point {
    cell_bounds(CellId {
        bits,
        step: STEP_MAX,
    })
    .center()
}

/// Geographic bounds of a cell at any step.
pub fn cell_bounds(cell: CellId) -> CellBounds {
    dequantize(
        cell.bits,
        cell.step,
        LONGITUDE_MIN,
        LONGITUDE_MAX,
        LATITUDE_MIN,
        LATITUDE_MAX,
    )
}

/// The eight cells surrounding `cell` at the same step.
pub fn neighbors(cell: CellId) -> Neighbors {
    let (ilat, _) = deinterleave64(cell.bits);
    let top_row = (1u32 << cell.step) - 1;

    let east = move_longitude(cell, 1);
    let west = move_longitude(cell, -1);

    let mut out = Neighbors {
        east: Some(east),
        west: Some(west),
        ..Default::default()
    };
    if ilat < top_row {
        let north = move_latitude(cell, 1);
        out.north = Some(north);
        out.north_east = Some(move_longitude(north, 1));
        out.north_west = Some(move_longitude(north, -1));
    }
    if ilat > 0 {
        let south = move_latitude(cell, -1);
        out.south = Some(south);
        out.south_east = Some(move_longitude(south, 1));
        out.south_west = Some(move_longitude(south, -1));
    }
    out
}

/// Left-align a cell id into the 52-bit score space.
///
/// A cell at step `s` covers the half-open score interval
/// `[align52(cell), align52(cell with bits + 1))`: the interleaving keeps
/// every finer cell nested inside it contiguous in score order.
pub fn align52(cell: CellId) -> u64 {
    cell.bits << (52 - cell.step as u32 * 2)
}

/// Encode a 52-bit score as an 11-character base32 fingerprint.
///
/// The value is padded to 55 bits (score in the high bits) so the string
/// length comes out even; [`from_base32`] recovers the exact score.
pub fn to_base32(bits: u64) -> String {
    debug_assert!(bits < (1u64 << 52));
    let padded = bits << 3;
    let mut out = String::with_capacity(11);
    for i in 0..11 {
        let idx = ((padded >> (55 - 5 * (i + 1))) & 0x1f) as usize;
        out.push(BASE32_ALPHABET[idx] as char);
    }
    out
}

/// Parse an 11-character base32 fingerprint back to its 52-bit score.
pub fn from_base32(encoded: &str) -> Result<u64> {
    if encoded.len() != 11 {
        return Err(GeoSetError::InvalidArgument(format!(
            "fingerprint must be 11 characters, got {}",
            encoded.len()
        )));
    }
    let mut padded: u64 = 0;
    for &b in encoded.as_bytes() {
        let idx = BASE32_ALPHABET
            .iter()
            .position(|&a| a == b)
            .ok_or_else(|| {
                GeoSetError::InvalidArgument(format!(
                    "invalid fingerprint character: {:?}",
                    b as char
                ))
            })?;
        padded = (padded << 5) | idx as u64;
    }
    Ok(padded >> 3)
}

/// Standard-compatible geohash string for a position.
///
/// Interchange strings quantize latitude over the full [-90, 90] range, so
/// the position is re-encoded before emission. Eleven characters hold 55
/// bits but only 52 are available; the trailing character degenerates to
/// zero padding.
pub fn standard_fingerprint(point: Point) -> String {
    let bits = quantize(point.x(), point.y(), -180.0, 180.0, -90.0, 90.0, STEP_MAX);
    let mut out = String::with_capacity(11);
    for i in 0..10 {
        let idx = ((bits >> (52 - 5 * (i + 1))) & 0x1f) as usize;
        out.push(BASE32_ALPHABET[idx] as char);
    }
    out.push('0');
    out
}

fn quantize(
    lon: f64,
    lat: f64,
    lon_min: f64,
    lon_max: f64,
    lat_min: f64,
    lat_max: f64,
    step: u8,
) -> u64 {
    let scale = (1u64 << step) as f64;
    let lat_offset = (lat - lat_min) / (lat_max - lat_min);
    let lon_offset = (lon - lon_min) / (lon_max - lon_min);

    // A coordinate exactly on the upper bound lands in the last cell
    // instead of a row of its own.
    let cap = (1u64 << step) - 1;
    let ilat = ((lat_offset * scale) as u64).min(cap) as u32;
    let ilon = ((lon_offset * scale) as u64).min(cap) as u32;
    interleave64(ilat, ilon)
}

fn dequantize(
    bits: u64,
    step: u8,
    lon_min: f64,
    lon_max: f64,
    lat_min: f64,
    lat_max: f64,
) -> CellBounds {
    let (ilat, ilon) = deinterleave64(bits);
    let scale = (1u64 << step) as f64;
    let lat_span = lat_max - lat_min;
    let lon_span = lon_max - lon_min;
    CellBounds {
        min_lon: lon_min + (ilon as f64 / scale) * lon_span,
        max_lon: lon_min + ((ilon as f64 + 1.0) / scale) * lon_span,
        min_lat: lat_min + (ilat as f64 / scale) * lat_span,
        max_lat: lat_min + ((ilat as f64 + 1.0) / scale) * lat_span,
    }
}

/// Spread the low 32 bits of each input over the even and odd bit
/// positions of a 64-bit word (Morton order, magic-mask form).
fn interleave64(xlo: u32, ylo: u32) -> u64 {
    const B: [u64; 5] = [
        0x5555555555555555,
        0x3333333333333333,
        0x0f0f0f0f0f0f0f0f,
        0x00ff00ff00ff00ff,
        0x0000ffff0000ffff,
    ];
    const S: [u32; 5] = [1, 2, 4, 8, 16];

    let mut x = xlo as u64;
    let mut y = ylo as u64;

    x = (x | (x << S[4])) & B[4];
    x = (x | (x << S[3])) & B[3];
    x = (x | (x << S[2])) & B[2];
    x = (x | (x << S[1])) & B[1];
    x = (x | (x << S[0])) & B[0];

    y = (y | (y << S[4])) & B[4];
    y = (y | (y << S[3])) & B[3];
    y = (y | (y << S[2])) & B[2];
    y = (y | (y << S[1])) & B[1];
    y = (y | (y << S[0])) & B[0];

    x | (y << 1)
}

/// Inverse of [`interleave64`]: squash the even bits into the first value
/// and the odd bits into the second.
fn deinterleave64(interleaved: u64) -> (u32, u32) {
    const B: [u64; 6] = [
        0x5555555555555555,
        0x3333333333333333,
        0x0f0f0f0f0f0f0f0f,
        0x00ff00ff00ff00ff,
        0x0000ffff0000ffff,
        0x00000000ffffffff,
    ];
    const S: [u32; 6] = [0, 1, 2, 4, 8, 16];

    let mut x = interleaved;
    let mut y = interleaved >> 1;

    x = (x | (x >> S[0])) & B[0];
    x = (x | (x >> S[1])) & B[1];
    x = (x | (x >> S[2])) & B[2];
    x = (x | (x >> S[3])) & B[3];
    x = (x | (x >> S[4])) & B[4];
    x = (x | (x >> S[5])) & B[5];

    y = (y | (y >> S[0])) & B[0];
    y = (y | (y >> S[1])) & B[1];
    y = (y | (y >> S[2])) & B[2];
    y = (y | (y >> S[3])) & B[3];
    y = (y | (y >> S[4])) & B[4];
    y = (y | (y >> S[5])) & B[5];

    (x as u32, y as u32)
}

fn move_longitude(cell: CellId, d: i8) -> CellId {
    let field = cell.step as u32 * 2;
    let mut x = cell.bits & ODD_BITS;
    let y = cell.bits & EVEN_BITS;

    // Filling the unused (latitude) positions makes the carry propagate
    // across them; the final mask drops the overflow, which is exactly the
    // modulo-360 longitude wrap.
    let zz = EVEN_BITS >> (64 - field);
    if d > 0 {
        x = x.wrapping_add(zz + 1);
    } else {
        x |= zz;
        x = x.wrapping_sub(zz + 1);
    }
    x &= ODD_BITS >> (64 - field);
    CellId {
        bits: x | y,
        step: cell.step,
    }
}

fn move_latitude(cell: CellId, d: i8) -> CellId {
    let field = cell.step as u32 * 2;
    let x = cell.bits & ODD_BITS;
    let mut y = cell.bits & EVEN_BITS;

    let zz = ODD_BITS >> (64 - field);
    if d > 0 {
        y = y.wrapping_add(zz + 1);
    } else {
        y |= zz;
        y = y.wrapping_sub(zz + 1);
    }
    y &= EVEN_BITS >> (64 - field);
    CellId {
        bits: x | y,
        step: cell.step,
    }
}
