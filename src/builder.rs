//! Builder for index construction.
//!
//! The builder validates configuration up front and picks the storage
//! backend, defaulting to the in-memory one.

use crate::error::{GeoSetError, Result};
use crate::set::GeoSet;
use crate::store::{MemoryStore, SortedSetStore};
use crate::types::Config;

/// Builder for [`GeoSet`] construction with custom configuration.
#[derive(Debug, Default)]
pub struct GeoSetBuilder {
    config: Config,
}

impl GeoSetBuilder {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Cap the number of results a radius query may return.
    pub fn max_count(mut self, max_count: usize) -> Self {
        self.config.max_count = Some(max_count);
        self
    }

    /// Answer queries over containers of at most `threshold` members with a
    /// single full-range scan.
    pub fn full_scan_threshold(mut self, threshold: usize) -> Self {
        self.config.full_scan_threshold = Some(threshold);
        self
    }

    /// Build an index over the in-memory backend.
    pub fn build(self) -> Result<GeoSet<MemoryStore>> {
        self.build_with_store(MemoryStore::new())
    }

    /// Build an index over a caller-provided storage backend.
    pub fn build_with_store<S: SortedSetStore>(self, store: S) -> Result<GeoSet<S>> {
        self.config.validate().map_err(GeoSetError::Config)?;
        GeoSet::with_store(store, self.config)
    }
}
