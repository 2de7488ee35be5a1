//! Core types and configuration for geoset.
//!
//! This module provides the value types exchanged with callers (entries,
//! query options, matches) and the serializable crate configuration.

use crate::error::{GeoSetError, Result};
use bytes::Bytes;
use geo::Point;
use serde::de::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Distance unit accepted by distance and radius queries.
///
/// Conversions use fixed multiplicative factors against meters, the unit all
/// internal math is carried out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    #[default]
    Meters,
    Kilometers,
    Miles,
    Feet,
}

impl DistanceUnit {
    /// Meters per one unit.
    pub const fn factor(self) -> f64 {
        match self {
            DistanceUnit::Meters => 1.0,
            DistanceUnit::Kilometers => 1000.0,
            DistanceUnit::Miles => 1609.34,
            DistanceUnit::Feet => 0.3048,
        }
    }

    /// Convert a value expressed in this unit to meters.
    pub fn to_meters(self, value: f64) -> f64 {
        value * self.factor()
    }

    /// Convert a value expressed in meters to this unit.
    pub fn from_meters(self, meters: f64) -> f64 {
        meters / self.factor()
    }

    /// Short unit symbol ("m", "km", "mi", "ft").
    pub const fn symbol(self) -> &'static str {
        match self {
            DistanceUnit::Meters => "m",
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "mi",
            DistanceUnit::Feet => "ft",
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for DistanceUnit {
    type Err = GeoSetError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "m" => Ok(DistanceUnit::Meters),
            "km" => Ok(DistanceUnit::Kilometers),
            "mi" => Ok(DistanceUnit::Miles),
            "ft" => Ok(DistanceUnit::Feet),
            other => Err(GeoSetError::InvalidArgument(format!(
                "unsupported distance unit: {other:?} (expected m, km, mi or ft)"
            ))),
        }
    }
}

/// Ordering applied to radius query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Results come back in scan order.
    #[default]
    Unsorted,
    /// Nearest first.
    Ascending,
    /// Farthest first.
    Descending,
}

/// A named point to register in a container.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoEntry {
    /// Member key, unique within its container.
    pub member: Bytes,
    /// Position, x = longitude and y = latitude in degrees.
    pub point: Point,
}

impl GeoEntry {
    /// Create an entry from a member key and a longitude/latitude pair.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use geoset::GeoEntry;
    ///
    /// let palermo = GeoEntry::new("Palermo", 13.361389, 38.115556);
    /// assert_eq!(palermo.point.x(), 13.361389);
    /// ```
    pub fn new(member: impl AsRef<[u8]>, longitude: f64, latitude: f64) -> Self {
        Self {
            member: Bytes::copy_from_slice(member.as_ref()),
            point: Point::new(longitude, latitude),
        }
    }
}

/// Options shaping the output of a radius query.
///
/// By default results are unsorted, unlimited and carry only the member key.
/// The `with_*` decorations attach the computed distance, the decoded
/// coordinate or the raw cell id to each match. A store destination is
/// mutually exclusive with the decorations.
#[derive(Debug, Clone, Default)]
pub struct RadiusOptions {
    /// Ordering by distance from the search center.
    pub sort: SortOrder,
    /// Maximum number of results; ties at the cut keep scan order.
    pub count: Option<usize>,
    /// Attach the decoded coordinate to each match.
    pub with_coord: bool,
    /// Attach the distance (in the query's unit) to each match.
    pub with_dist: bool,
    /// Attach the raw 52-bit cell id to each match.
    pub with_hash: bool,
    /// Materialize the result set into this container, replacing it.
    pub store_key: Option<Bytes>,
}

impl RadiusOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort results nearest first.
    pub fn ascending(mut self) -> Self {
        self.sort = SortOrder::Ascending;
        self
    }

    /// Sort results farthest first.
    pub fn descending(mut self) -> Self {
        self.sort = SortOrder::Descending;
        self
    }

    /// Truncate the result set to `count` entries.
    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Attach decoded coordinates to each match.
    pub fn with_coord(mut self) -> Self {
        self.with_coord = true;
        self
    }

    /// Attach distances, in the query's unit, to each match.
    pub fn with_dist(mut self) -> Self {
        self.with_dist = true;
        self
    }

    /// Attach raw 52-bit cell ids to each match.
    pub fn with_hash(mut self) -> Self {
        self.with_hash = true;
        self
    }

    /// Write the matched members (with their original scores) into
    /// `destination`, atomically replacing its previous contents.
    pub fn store_into(mut self, destination: impl AsRef<[u8]>) -> Self {
        self.store_key = Some(Bytes::copy_from_slice(destination.as_ref()));
        self
    }

    pub(crate) fn decorates(&self) -> bool {
        self.with_coord || self.with_dist || self.with_hash
    }
}

/// One member matched by a radius query.
///
/// The optional fields are populated according to the `with_*` flags of the
/// originating [`RadiusOptions`].
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusMatch {
    /// Member key.
    pub member: Bytes,
    /// Distance from the search center, in the query's unit.
    pub distance: Option<f64>,
    /// Decoded coordinate (cell center) of the member.
    pub point: Option<Point>,
    /// Raw 52-bit cell id of the member.
    pub hash: Option<u64>,
}

/// Crate configuration.
///
/// Designed to be easily serializable and loadable from JSON or TOML while
/// keeping complexity minimal.
///
/// # Example
///
/// ```rust
/// use geoset::Config;
///
/// let json = r#"{
///     "max_count": 512,
///     "full_scan_threshold": 64
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.max_count, Some(512));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upper bound applied to radius query result counts (None = unlimited).
    #[serde(default)]
    pub max_count: Option<usize>,

    /// Containers at or below this cardinality are answered with a single
    /// full-range scan instead of planned interval scans (None = always plan).
    #[serde(default)]
    pub full_scan_threshold: Option<usize>,
}

impl Config {
    /// Cap the number of results a radius query may return.
    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = Some(max_count);
        self
    }

    /// Answer queries over containers of at most `threshold` members with a
    /// single full-range scan.
    pub fn with_full_scan_threshold(mut self, threshold: usize) -> Self {
        self.full_scan_threshold = Some(threshold);
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_count == Some(0) {
            return Err("max_count must be greater than zero".to_string());
        }
        Ok(())
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as a pretty-printed JSON string.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from a TOML string (requires the `toml` feature).
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as a TOML string (requires the `toml` feature).
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
