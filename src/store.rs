//! Ordered sorted-set storage abstraction.
//!
//! The index core never assumes a concrete storage engine; it consumes the
//! ordered collection through the [`SortedSetStore`] trait, which models the
//! few capabilities the queries need: scored insertion, member score lookup,
//! ordered range scans, deletion and an atomic whole-container replace.
//! [`MemoryStore`] is the in-process reference backend.

use crate::error::Result;
use bytes::Bytes;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// One member of an ordered collection together with its sortable score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredMember {
    pub member: Bytes,
    pub score: u64,
}

impl ScoredMember {
    pub fn new(member: impl AsRef<[u8]>, score: u64) -> Self {
        Self {
            member: Bytes::copy_from_slice(member.as_ref()),
            score,
        }
    }
}

/// Capability interface over an ordered key-value (sorted-set) store.
///
/// Containers hold unique members, each carrying a totally ordered numeric
/// score. Implementations must keep `range_scan` results ordered by
/// `(score, member)`.
pub trait SortedSetStore: Send + Sync {
    /// Insert or update `entries` in one logical write.
    ///
    /// Returns the number of members that did not previously exist;
    /// re-inserting an existing member replaces its score without counting.
    fn insert(&mut self, container: &[u8], entries: &[ScoredMember]) -> Result<usize>;

    /// Look up a member's score.
    fn score(&self, container: &[u8], member: &[u8]) -> Result<Option<u64>>;

    /// All members with scores in the half-open interval `[min, max)`,
    /// ordered by score.
    fn range_scan(&self, container: &[u8], min: u64, max: u64) -> Result<Vec<ScoredMember>>;

    /// Remove a member; returns whether it existed.
    fn remove(&mut self, container: &[u8], member: &[u8]) -> Result<bool>;

    /// Atomically replace the whole container with `entries`.
    ///
    /// Readers observe either the previous contents or the new ones, never a
    /// mix. An empty `entries` removes the container.
    fn replace_all(&mut self, container: &[u8], entries: Vec<ScoredMember>) -> Result<()>;

    /// Number of members in the container (0 when absent).
    fn card(&self, container: &[u8]) -> Result<usize>;
}

#[derive(Debug, Default)]
struct ContainerSet {
    /// Scan index ordered by (score, member).
    by_score: BTreeSet<(u64, Bytes)>,
    /// Point lookup from member to its current score.
    by_member: FxHashMap<Bytes, u64>,
}

impl ContainerSet {
    fn insert(&mut self, member: Bytes, score: u64) -> bool {
        match self.by_member.insert(member.clone(), score) {
            Some(old) if old == score => false,
            Some(old) => {
                self.by_score.remove(&(old, member.clone()));
                self.by_score.insert((score, member));
                false
            }
            None => {
                self.by_score.insert((score, member));
                true
            }
        }
    }

    fn remove(&mut self, member: &[u8]) -> bool {
        if let Some(score) = self.by_member.remove(member) {
            self.by_score.remove(&(score, Bytes::copy_from_slice(member)));
            true
        } else {
            false
        }
    }
}

/// In-memory sorted-set backend.
///
/// Each container pairs a `BTreeSet` ordered by `(score, member)` for range
/// scans with a hash map for member lookups, mirroring the two access paths
/// the queries take.
#[derive(Debug, Default)]
pub struct MemoryStore {
    containers: FxHashMap<Bytes, ContainerSet>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all non-empty containers.
    pub fn container_keys(&self) -> Vec<Bytes> {
        self.containers.keys().cloned().collect()
    }

    /// All members of a container ordered by score, mainly for inspection
    /// and tests.
    pub fn members(&self, container: &[u8]) -> Vec<ScoredMember> {
        match self.containers.get(container) {
            Some(set) => set
                .by_score
                .iter()
                .map(|(score, member)| ScoredMember {
                    member: member.clone(),
                    score: *score,
                })
                .collect(),
            None => Vec::new(),
        }
    }
}

impl SortedSetStore for MemoryStore {
    fn insert(&mut self, container: &[u8], entries: &[ScoredMember]) -> Result<usize> {
        if entries.is_empty() {
            return Ok(0);
        }
        let set = self
            .containers
            .entry(Bytes::copy_from_slice(container))
            .or_default();
        let mut created = 0;
        for entry in entries {
            if set.insert(entry.member.clone(), entry.score) {
                created += 1;
            }
        }
        Ok(created)
    }

    fn score(&self, container: &[u8], member: &[u8]) -> Result<Option<u64>> {
        Ok(self
            .containers
            .get(container)
            .and_then(|set| set.by_member.get(member).copied()))
    }

    fn range_scan(&self, container: &[u8], min: u64, max: u64) -> Result<Vec<ScoredMember>> {
        let Some(set) = self.containers.get(container) else {
            return Ok(Vec::new());
        };
        if min >= max {
            return Ok(Vec::new());
        }
        let lower = (min, Bytes::new());
        let upper = (max, Bytes::new());
        Ok(set
            .by_score
            .range(lower..upper)
            .map(|(score, member)| ScoredMember {
                member: member.clone(),
                score: *score,
            })
            .collect())
    }

    fn remove(&mut self, container: &[u8], member: &[u8]) -> Result<bool> {
        let Some(set) = self.containers.get_mut(container) else {
            return Ok(false);
        };
        let removed = set.remove(member);
        if removed && set.by_member.is_empty() {
            self.containers.remove(container);
        }
        Ok(removed)
    }

    fn replace_all(&mut self, container: &[u8], entries: Vec<ScoredMember>) -> Result<()> {
        if entries.is_empty() {
            self.containers.remove(container);
            return Ok(());
        }
        let mut set = ContainerSet::default();
        for entry in entries {
            set.insert(entry.member, entry.score);
        }
        // Single map assignment: readers never see a partially built set.
        self.containers
            .insert(Bytes::copy_from_slice(container), set);
        Ok(())
    }

    fn card(&self, container: &[u8]) -> Result<usize> {
        Ok(self
            .containers
            .get(container)
            .map_or(0, |set| set.by_member.len()))
    }
}
