//! The geospatial index facade.
//!
//! `GeoSet` composes the codec, the radius planner, the distance math and
//! the scan executor over a sorted-set storage backend. Every operation is a
//! single synchronous store write or a bounded number of read scans; the
//! type adds no concurrency of its own (see the `sync` feature for a shared
//! wrapper).

use crate::builder::GeoSetBuilder;
use crate::distance::haversine;
use crate::error::{GeoSetError, Result};
use crate::geohash;
use crate::search;
use crate::store::{MemoryStore, ScoredMember, SortedSetStore};
use crate::types::{Config, DistanceUnit, GeoEntry, RadiusMatch, RadiusOptions};
use geo::Point;

/// A geospatial index over named containers of registered points.
///
/// Each container is an ordered collection in the backing store; members are
/// unique within their container and re-registration overwrites coordinates.
/// Radius queries decompose the circle into at most nine score-range scans
/// and filter candidates by exact great-circle distance, so they return no
/// false positives and miss no registered point.
///
/// # Examples
///
/// ```rust
/// use geoset::{GeoEntry, GeoSet, DistanceUnit, RadiusOptions};
///
/// let mut geo = GeoSet::memory();
/// geo.add(
///     "sicily",
///     &[
///         GeoEntry::new("Palermo", 13.361389, 38.115556),
///         GeoEntry::new("Catania", 15.087269, 37.502669),
///     ],
/// )?;
///
/// let km = geo
///     .dist("sicily", "Palermo", "Catania", DistanceUnit::Kilometers)?
///     .unwrap();
/// assert!(km > 166.2 && km < 166.3);
///
/// let nearby = geo.search_radius_by_member(
///     "sicily",
///     "Palermo",
///     200.0,
///     DistanceUnit::Kilometers,
///     &RadiusOptions::new().ascending(),
/// )?;
/// assert_eq!(nearby.len(), 2);
/// # Ok::<(), geoset::GeoSetError>(())
/// ```
pub struct GeoSet<S: SortedSetStore = MemoryStore> {
    store: S,
    config: Config,
}

impl GeoSet<MemoryStore> {
    /// Create an index over the in-memory backend with default
    /// configuration.
    pub fn memory() -> Self {
        Self {
            store: MemoryStore::new(),
            config: Config::default(),
        }
    }

    /// Create an in-memory index with custom configuration.
    pub fn memory_with_config(config: Config) -> Result<Self> {
        config.validate().map_err(GeoSetError::Config)?;
        Ok(Self {
            store: MemoryStore::new(),
            config,
        })
    }

    /// Create a builder for advanced configuration.
    pub fn builder() -> GeoSetBuilder {
        GeoSetBuilder::new()
    }
}

impl<S: SortedSetStore> GeoSet<S> {
    /// Create an index over an arbitrary storage backend.
    pub fn with_store(store: S, config: Config) -> Result<Self> {
        config.validate().map_err(GeoSetError::Config)?;
        Ok(Self { store, config })
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared access to the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Exclusive access to the backing store.
    ///
    /// Deletion of members and containers is the store's own primitive;
    /// this is the escape hatch for it.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consume the index, returning the backing store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Register points in a container, returning how many members were
    /// newly created (updates of existing members do not count).
    ///
    /// All coordinates are validated before anything is written: an invalid
    /// entry rejects the whole call with [`GeoSetError::InvalidCoordinates`]
    /// and leaves the container untouched. The validated batch is applied as
    /// one store write.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use geoset::{GeoEntry, GeoSet};
    ///
    /// let mut geo = GeoSet::memory();
    /// let created = geo.add("cities", &[GeoEntry::new("nyc", -74.0060, 40.7128)])?;
    /// assert_eq!(created, 1);
    ///
    /// // Same member again: coordinates update, nothing new is created
    /// let created = geo.add("cities", &[GeoEntry::new("nyc", -73.99, 40.73)])?;
    /// assert_eq!(created, 0);
    /// # Ok::<(), geoset::GeoSetError>(())
    /// ```
    pub fn add(&mut self, container: impl AsRef<[u8]>, entries: &[GeoEntry]) -> Result<usize> {
        let mut scored = Vec::with_capacity(entries.len());
        for entry in entries {
            scored.push(ScoredMember {
                member: entry.member.clone(),
                score: geohash::encode(entry.point)?,
            });
        }
        if scored.is_empty() {
            return Ok(0);
        }
        self.store.insert(container.as_ref(), &scored)
    }

    /// The registered position of one member, decoded from its stored
    /// score. `None` when the member or the container is absent.
    pub fn position(
        &self,
        container: impl AsRef<[u8]>,
        member: impl AsRef<[u8]>,
    ) -> Result<Option<Point>> {
        Ok(self
            .store
            .score(container.as_ref(), member.as_ref())?
            .map(geohash::decode))
    }

    /// Positions for several members at once, with a `None` marker per
    /// missing member.
    ///
    /// Decoded positions deviate from the registered coordinates by at most
    /// the storage cell half-width (centimeters).
    pub fn positions(
        &self,
        container: impl AsRef<[u8]>,
        members: &[impl AsRef<[u8]>],
    ) -> Result<Vec<Option<Point>>> {
        let container = container.as_ref();
        members
            .iter()
            .map(|member| {
                Ok(self
                    .store
                    .score(container, member.as_ref())?
                    .map(geohash::decode))
            })
            .collect()
    }

    /// Great-circle distance between two registered members, in `unit`.
    ///
    /// Returns `None` when either member (or the whole container) is
    /// missing rather than failing the call.
    pub fn dist(
        &self,
        container: impl AsRef<[u8]>,
        first: impl AsRef<[u8]>,
        second: impl AsRef<[u8]>,
        unit: DistanceUnit,
    ) -> Result<Option<f64>> {
        let container = container.as_ref();
        let a = self.store.score(container, first.as_ref())?;
        let b = self.store.score(container, second.as_ref())?;
        match (a, b) {
            (Some(a), Some(b)) => {
                let meters = haversine(geohash::decode(a), geohash::decode(b));
                Ok(Some(unit.from_meters(meters)))
            }
            _ => Ok(None),
        }
    }

    /// Standard-compatible 11-character fingerprints for several members,
    /// with a `None` marker per missing member.
    pub fn hash(
        &self,
        container: impl AsRef<[u8]>,
        members: &[impl AsRef<[u8]>],
    ) -> Result<Vec<Option<String>>> {
        let container = container.as_ref();
        members
            .iter()
            .map(|member| {
                Ok(self
                    .store
                    .score(container, member.as_ref())?
                    .map(|score| geohash::standard_fingerprint(geohash::decode(score))))
            })
            .collect()
    }

    /// All members within `radius` of a coordinate center.
    ///
    /// `radius` is expressed in `unit`, as are the distances attached to the
    /// results when `with_dist` is requested. A missing container yields an
    /// empty result. With a store destination in `opts`, the matched set
    /// atomically replaces the destination container (and the matches are
    /// still returned).
    ///
    /// # Errors
    ///
    /// - [`GeoSetError::InvalidCoordinates`] for an out-of-range center.
    /// - [`GeoSetError::InvalidArgument`] for a non-finite or negative
    ///   radius, or a zero count.
    /// - [`GeoSetError::UnsupportedOptionCombination`] when a store
    ///   destination is combined with per-result decorations.
    pub fn search_radius(
        &mut self,
        container: impl AsRef<[u8]>,
        center: Point,
        radius: f64,
        unit: DistanceUnit,
        opts: &RadiusOptions,
    ) -> Result<Vec<RadiusMatch>> {
        geohash::validate_coordinates(&center)?;
        validate_query(radius, opts)?;
        self.search_radius_inner(container.as_ref(), center, radius, unit, opts)
    }

    /// Like [`search_radius`](Self::search_radius), with the center taken
    /// from a registered member's stored position.
    ///
    /// Fails with [`GeoSetError::NoSuchMember`] when the member is absent —
    /// without it there is no center to search from.
    pub fn search_radius_by_member(
        &mut self,
        container: impl AsRef<[u8]>,
        member: impl AsRef<[u8]>,
        radius: f64,
        unit: DistanceUnit,
        opts: &RadiusOptions,
    ) -> Result<Vec<RadiusMatch>> {
        validate_query(radius, opts)?;
        let container = container.as_ref();
        let member = member.as_ref();
        let score = self
            .store
            .score(container, member)?
            .ok_or_else(|| GeoSetError::NoSuchMember(String::from_utf8_lossy(member).into_owned()))?;
        let center = geohash::decode(score);
        self.search_radius_inner(container, center, radius, unit, opts)
    }

    /// Executes an already-validated radius query.
    fn search_radius_inner(
        &mut self,
        container: &[u8],
        center: Point,
        radius: f64,
        unit: DistanceUnit,
        opts: &RadiusOptions,
    ) -> Result<Vec<RadiusMatch>> {
        let radius_m = unit.to_meters(radius);
        let raw = search::collect_in_radius(&self.store, container, center, radius_m, &self.config)?;
        let count = match (opts.count, self.config.max_count) {
            (Some(n), Some(cap)) => Some(n.min(cap)),
            (Some(n), None) => Some(n),
            (None, cap) => cap,
        };
        let shaped = search::shape(raw, opts.sort, count);

        if let Some(destination) = &opts.store_key {
            let entries = shaped
                .iter()
                .map(|m| ScoredMember {
                    member: m.member.clone(),
                    score: m.score,
                })
                .collect();
            self.store.replace_all(destination, entries)?;
        }

        Ok(shaped
            .into_iter()
            .map(|m| RadiusMatch {
                member: m.member,
                distance: opts.with_dist.then(|| unit.from_meters(m.dist_m)),
                point: opts.with_coord.then_some(m.point),
                hash: opts.with_hash.then_some(m.score),
            })
            .collect())
    }

    /// Number of members registered in a container (0 when absent).
    pub fn card(&self, container: impl AsRef<[u8]>) -> Result<usize> {
        self.store.card(container.as_ref())
    }

    /// Remove a member from a container via the store's deletion primitive.
    pub fn remove(
        &mut self,
        container: impl AsRef<[u8]>,
        member: impl AsRef<[u8]>,
    ) -> Result<bool> {
        self.store.remove(container.as_ref(), member.as_ref())
    }
}

impl Default for GeoSet<MemoryStore> {
    fn default() -> Self {
        Self::memory()
    }
}

/// Argument checks shared by both radius entry points; all of them fire
/// before the store is consulted.
fn validate_query(radius: f64, opts: &RadiusOptions) -> Result<()> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(GeoSetError::InvalidArgument(format!(
            "radius must be a non-negative finite number, got {radius}"
        )));
    }
    if opts.count == Some(0) {
        return Err(GeoSetError::InvalidArgument(
            "count must be greater than zero".to_string(),
        ));
    }
    if opts.store_key.is_some() && opts.decorates() {
        return Err(GeoSetError::UnsupportedOptionCombination(
            "a store destination cannot be combined with per-result decorations",
        ));
    }
    Ok(())
}
