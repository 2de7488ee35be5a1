//! Embedded geospatial index over ordered sorted-set storage.
//!
//! Registered points are encoded into 52-bit interleaved geohash scores and
//! stored as members of ordered collections; circular-radius queries are
//! answered with a bounded set of score-range scans plus an exact
//! great-circle distance filter, so results contain no false positives and
//! miss no registered point.
//!
//! ```rust
//! use geoset::{GeoEntry, GeoSet, DistanceUnit, RadiusOptions};
//!
//! let mut geo = GeoSet::memory();
//! geo.add(
//!     "sicily",
//!     &[
//!         GeoEntry::new("Palermo", 13.361389, 38.115556),
//!         GeoEntry::new("Catania", 15.087269, 37.502669),
//!     ],
//! )?;
//!
//! let nearby = geo.search_radius_by_member(
//!     "sicily",
//!     "Palermo",
//!     200.0,
//!     DistanceUnit::Kilometers,
//!     &RadiusOptions::new().ascending().with_dist(),
//! )?;
//! assert_eq!(nearby.len(), 2);
//! # Ok::<(), geoset::GeoSetError>(())
//! ```

pub mod builder;
pub mod distance;
pub mod error;
pub mod geohash;
pub mod planner;
mod search;
pub mod set;
pub mod store;
pub mod types;

#[cfg(feature = "sync")]
pub mod sync;

pub use builder::GeoSetBuilder;
pub use error::{GeoSetError, Result};
pub use set::GeoSet;

#[cfg(feature = "sync")]
pub use sync::SyncGeoSet;

pub use geo::Point;

pub use distance::{EARTH_RADIUS_M, haversine};
pub use planner::{RadiusPlan, ScoreRange};
pub use store::{MemoryStore, ScoredMember, SortedSetStore};
pub use types::{Config, DistanceUnit, GeoEntry, RadiusMatch, RadiusOptions, SortOrder};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{GeoSet, GeoSetBuilder, GeoSetError, Result};

    #[cfg(feature = "sync")]
    pub use crate::SyncGeoSet;

    pub use geo::Point;

    pub use crate::{Config, DistanceUnit, GeoEntry, RadiusMatch, RadiusOptions, SortOrder};

    pub use crate::{MemoryStore, ScoredMember, SortedSetStore};

    pub use crate::haversine;
}
