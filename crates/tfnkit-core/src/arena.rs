//! Region allocator scoped to an engine or a transaction
//!
//! An [`Arena`] hands out storage for field names, values and cache keys and
//! releases everything it handed out in one step. Storage itself is reference
//! counted, so a handle that outlives a release stays memory-safe; what the
//! arena tracks is the byte budget and the *generation* the storage belongs to.
//!
//! Every arena carries an [`ArenaId`]. [`Arena::release`] moves the arena to a
//! fresh id, so anything stamped with the old id is no longer owned by it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::error::{Error, Result};
use crate::field::Field;

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one arena generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaId(u64);

impl ArenaId {
    fn next() -> Self {
        Self(NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ArenaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "arena#{}", self.0)
    }
}

/// Byte-budgeted region allocator with bulk release
#[derive(Debug)]
pub struct Arena {
    id: AtomicU64,
    used: AtomicUsize,
    limit: Option<usize>,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    /// Create an arena without a byte budget
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create an arena that fails allocations once `limit` bytes are in use
    pub fn with_limit(limit: usize) -> Self {
        Self::build(Some(limit))
    }

    fn build(limit: Option<usize>) -> Self {
        Self {
            id: AtomicU64::new(ArenaId::next().0),
            used: AtomicUsize::new(0),
            limit,
        }
    }

    /// Current generation of this arena
    pub fn id(&self) -> ArenaId {
        ArenaId(self.id.load(Ordering::Relaxed))
    }

    /// Bytes handed out since creation or the last release
    pub fn used(&self) -> usize {
        self.used.load(Ordering::Relaxed)
    }

    /// Byte budget, if any
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Bytes still available, or `None` when unbounded
    pub fn available(&self) -> Option<usize> {
        self.limit.map(|limit| limit.saturating_sub(self.used()))
    }

    /// Allocate `size` zeroed bytes.
    pub fn alloc(&self, size: usize) -> Result<Vec<u8>> {
        self.charge(size)?;
        Ok(vec![0; size])
    }

    /// Duplicate a string into this arena.
    pub fn strdup(&self, s: &str) -> Result<Arc<str>> {
        self.charge(s.len())?;
        Ok(Arc::from(s))
    }

    /// Duplicate a byte slice into this arena.
    pub fn memdup(&self, src: &[u8]) -> Result<Arc<[u8]>> {
        self.charge(src.len())?;
        Ok(Arc::from(src))
    }

    /// Whether `field` was produced in the current generation of this arena.
    pub fn owns(&self, field: &Field) -> bool {
        field.origin() == self.id()
    }

    /// Release everything allocated so far.
    ///
    /// The byte count drops to zero and the arena moves to a new generation.
    pub fn release(&self) {
        let old = self.id();
        let freed = self.used.swap(0, Ordering::Relaxed);
        self.id.store(ArenaId::next().0, Ordering::Relaxed);
        tracing::trace!(arena = %old, bytes = freed, "arena released");
    }

    /// Account for `bytes` more bytes, failing if the budget would be exceeded.
    pub(crate) fn charge(&self, bytes: usize) -> Result<()> {
        let limit = self.limit.unwrap_or(usize::MAX);
        self.used
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |used| {
                used.checked_add(bytes).filter(|total| *total <= limit)
            })
            .map(|_| ())
            .map_err(|used| Error::Alloc {
                requested: bytes,
                available: limit.saturating_sub(used),
            })
    }

    /// Hand `bytes` back to the budget (a superseded buffer segment).
    pub(crate) fn reclaim(&self, bytes: usize) {
        let _ = self
            .used
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |used| {
                Some(used.saturating_sub(bytes))
            });
    }
}
