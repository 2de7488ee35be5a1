//! Thread-safe wrapper for concurrent index access.
//!
//! This module provides `SyncGeoSet`, a clonable wrapper around [`GeoSet`]
//! backed by `Arc<RwLock<_>>` for safe shared access from multiple threads.
//!
//! Enable the `sync` feature to use this module:
//!
//! ```toml
//! [dependencies]
//! geoset = { version = "0.1", features = ["sync"] }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use geoset::{GeoEntry, SyncGeoSet};
//! use std::thread;
//!
//! let geo = SyncGeoSet::memory();
//! let writer = geo.clone();
//!
//! let handle = thread::spawn(move || {
//!     writer
//!         .add("cities", &[GeoEntry::new("nyc", -74.0060, 40.7128)])
//!         .unwrap();
//! });
//! handle.join().unwrap();
//!
//! assert!(geo.position("cities", "nyc").unwrap().is_some());
//! ```

use crate::error::Result;
use crate::set::GeoSet;
use crate::store::{MemoryStore, SortedSetStore};
use crate::types::{Config, DistanceUnit, GeoEntry, RadiusMatch, RadiusOptions};
use geo::Point;
use parking_lot::RwLock;
use std::sync::Arc;

/// Thread-safe wrapper around [`GeoSet`].
///
/// Read operations take a shared lock; registrations and radius queries
/// take an exclusive one (a radius query may materialize into a store
/// destination). Cloning shares the underlying index.
pub struct SyncGeoSet<S: SortedSetStore = MemoryStore> {
    inner: Arc<RwLock<GeoSet<S>>>,
}

impl<S: SortedSetStore> Clone for SyncGeoSet<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl SyncGeoSet<MemoryStore> {
    /// Create a shared in-memory index with default configuration.
    pub fn memory() -> Self {
        Self::from_set(GeoSet::memory())
    }

    /// Create a shared in-memory index with custom configuration.
    pub fn memory_with_config(config: Config) -> Result<Self> {
        Ok(Self::from_set(GeoSet::memory_with_config(config)?))
    }
}

impl<S: SortedSetStore> SyncGeoSet<S> {
    /// Wrap an existing index for shared access.
    pub fn from_set(set: GeoSet<S>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(set)),
        }
    }

    /// Register points in a container; see [`GeoSet::add`].
    pub fn add(&self, container: impl AsRef<[u8]>, entries: &[GeoEntry]) -> Result<usize> {
        self.inner.write().add(container, entries)
    }

    /// Position of one member; see [`GeoSet::position`].
    pub fn position(
        &self,
        container: impl AsRef<[u8]>,
        member: impl AsRef<[u8]>,
    ) -> Result<Option<Point>> {
        self.inner.read().position(container, member)
    }

    /// Positions of several members; see [`GeoSet::positions`].
    pub fn positions(
        &self,
        container: impl AsRef<[u8]>,
        members: &[impl AsRef<[u8]>],
    ) -> Result<Vec<Option<Point>>> {
        self.inner.read().positions(container, members)
    }

    /// Distance between two members; see [`GeoSet::dist`].
    pub fn dist(
        &self,
        container: impl AsRef<[u8]>,
        first: impl AsRef<[u8]>,
        second: impl AsRef<[u8]>,
        unit: DistanceUnit,
    ) -> Result<Option<f64>> {
        self.inner.read().dist(container, first, second, unit)
    }

    /// Fingerprints of several members; see [`GeoSet::hash`].
    pub fn hash(
        &self,
        container: impl AsRef<[u8]>,
        members: &[impl AsRef<[u8]>],
    ) -> Result<Vec<Option<String>>> {
        self.inner.read().hash(container, members)
    }

    /// Radius query from a coordinate center; see [`GeoSet::search_radius`].
    pub fn search_radius(
        &self,
        container: impl AsRef<[u8]>,
        center: Point,
        radius: f64,
        unit: DistanceUnit,
        opts: &RadiusOptions,
    ) -> Result<Vec<RadiusMatch>> {
        self.inner
            .write()
            .search_radius(container, center, radius, unit, opts)
    }

    /// Radius query centered on a member; see
    /// [`GeoSet::search_radius_by_member`].
    pub fn search_radius_by_member(
        &self,
        container: impl AsRef<[u8]>,
        member: impl AsRef<[u8]>,
        radius: f64,
        unit: DistanceUnit,
        opts: &RadiusOptions,
    ) -> Result<Vec<RadiusMatch>> {
        self.inner
            .write()
            .search_radius_by_member(container, member, radius, unit, opts)
    }

    /// Number of members in a container; see [`GeoSet::card`].
    pub fn card(&self, container: impl AsRef<[u8]>) -> Result<usize> {
        self.inner.read().card(container)
    }

    /// Remove a member; see [`GeoSet::remove`].
    pub fn remove(
        &self,
        container: impl AsRef<[u8]>,
        member: impl AsRef<[u8]>,
    ) -> Result<bool> {
        self.inner.write().remove(container, member)
    }

    /// The active configuration.
    pub fn config(&self) -> Config {
        self.inner.read().config().clone()
    }

    /// Acquire a read lock for several operations under one guard.
    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, GeoSet<S>> {
        self.inner.read()
    }

    /// Acquire a write lock for several operations under one guard.
    pub fn write(&self) -> parking_lot::RwLockWriteGuard<'_, GeoSet<S>> {
        self.inner.write()
    }
}

const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SyncGeoSet>();
};
