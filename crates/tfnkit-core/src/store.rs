//! Per-transaction field store
//!
//! The store is where extracted fields live for the duration of one request
//! and where derived fields are cached. Only the small contract the
//! transformation code needs is expressed as the [`DataStore`] trait;
//! [`Transaction`] is the in-memory implementation the engine hands out.

use std::collections::HashMap;
use std::sync::Arc;

use crate::arena::Arena;
use crate::error::Result;
use crate::field::{Field, FieldRef};

/// Key-value store of fields backed by a single arena
pub trait DataStore {
    /// Arena that owns everything stored here
    fn arena(&self) -> &Arena;

    /// Look up a field by exact key
    fn get(&self, key: &str) -> Option<FieldRef>;

    /// Store `field` under `key`, replacing any previous entry
    fn set(&mut self, key: &str, field: FieldRef) -> Result<()>;
}

/// Field store for one logical transaction
#[derive(Debug, Default)]
pub struct Transaction {
    arena: Arena,
    fields: HashMap<Arc<str>, FieldRef>,
}

impl Transaction {
    /// Create a transaction with an unbounded arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transaction that allocates from `arena`
    pub fn with_arena(arena: Arena) -> Self {
        Self {
            arena,
            fields: HashMap::new(),
        }
    }

    /// Add a string field under its own name
    pub fn add_nulstr(&mut self, name: &str, value: &str) -> Result<FieldRef> {
        let field = Field::nulstr(&self.arena, name, value)?;
        self.set(name, field.clone())?;
        Ok(field)
    }

    /// Add a byte-string field under its own name
    pub fn add_bytestr(&mut self, name: &str, value: &[u8]) -> Result<FieldRef> {
        let field = Field::bytestr(&self.arena, name, value)?;
        self.set(name, field.clone())?;
        Ok(field)
    }

    /// Add a signed integer field under its own name
    pub fn add_num(&mut self, name: &str, value: i64) -> Result<FieldRef> {
        let field = Field::num(&self.arena, name, value)?;
        self.set(name, field.clone())?;
        Ok(field)
    }

    /// Add an existing field under its own name
    pub fn add(&mut self, field: FieldRef) -> Result<()> {
        let name = field.name().to_string();
        self.set(&name, field)
    }

    /// Whether a field is stored under `key`
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Stored keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.fields.keys().map(|k| k.as_ref()).collect();
        keys.sort_unstable();
        keys
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the transaction holds no entries
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Drop every entry and release the arena.
    ///
    /// Handles obtained earlier remain valid but are no longer owned by the
    /// arena and can no longer be reached through this store.
    pub fn release(&mut self) {
        tracing::debug!(entries = self.fields.len(), "releasing transaction");
        self.fields.clear();
        self.arena.release();
    }
}

impl DataStore for Transaction {
    fn arena(&self) -> &Arena {
        &self.arena
    }

    fn get(&self, key: &str) -> Option<FieldRef> {
        self.fields.get(key).cloned()
    }

    fn set(&mut self, key: &str, field: FieldRef) -> Result<()> {
        let key = self.arena.strdup(key)?;
        self.fields.insert(key, field);
        Ok(())
    }
}
