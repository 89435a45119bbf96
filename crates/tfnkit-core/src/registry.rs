//! Transform registry
//!
//! Transforms are registered once, by name, while the engine is being set up.
//! After that the registry is only read, so lookups from many transactions
//! need no locking. Registration takes `&mut self`, which keeps it on the
//! single initialization path.
//!
//! # Writing a transform
//!
//! A [`Transform`] must follow a few rules:
//!
//! - Do not log; the caller decides what to report.
//! - Handle every input type deterministically, returning
//!   [`Error::TypeMismatch`] for types it does not support.
//! - Return the input handle unchanged when there is nothing to do.
//! - Build any new field from the arena passed in, never from another one.
//!
//! ```rust,ignore
//! registry.register_fn("upper", false, |arena: &Arena, input: &FieldRef| {
//!     let s = input.as_str().ok_or_else(|| /* ... */)?;
//!     input.with_str(arena, &s.to_uppercase())
//! })?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::arena::Arena;
use crate::error::{Error, Result};
use crate::field::FieldRef;

/// A named, pluggable conversion from one field to another
pub trait Transform: Send + Sync {
    /// Convert `input`, allocating any new field from `arena`
    fn execute(&self, arena: &Arena, input: &FieldRef) -> Result<FieldRef>;
}

impl<F> Transform for F
where
    F: Fn(&Arena, &FieldRef) -> Result<FieldRef> + Send + Sync,
{
    fn execute(&self, arena: &Arena, input: &FieldRef) -> Result<FieldRef> {
        self(arena, input)
    }
}

/// Registered transform
#[derive(Clone)]
pub struct TransformDescriptor {
    name: Arc<str>,
    handles_whole_list: bool,
    transform: Arc<dyn Transform>,
}

impl TransformDescriptor {
    /// Transform name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether list values are passed to the transform in aggregate
    pub fn handles_whole_list(&self) -> bool {
        self.handles_whole_list
    }

    pub(crate) fn transform(&self) -> &dyn Transform {
        self.transform.as_ref()
    }
}

impl std::fmt::Debug for TransformDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformDescriptor")
            .field("name", &self.name)
            .field("handles_whole_list", &self.handles_whole_list)
            .finish_non_exhaustive()
    }
}

/// Name → descriptor mapping
#[derive(Debug, Default)]
pub struct TransformRegistry {
    arena: Arena,
    transforms: HashMap<Arc<str>, Arc<TransformDescriptor>>,
}

impl TransformRegistry {
    /// Create an empty registry with an unbounded arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry whose names are allocated from `arena`
    pub fn with_arena(arena: Arena) -> Self {
        Self {
            arena,
            transforms: HashMap::new(),
        }
    }

    /// Register a transform under `name`.
    ///
    /// Fails with [`Error::AlreadyExists`] if the name is taken (the existing
    /// entry is left as it was) and with [`Error::Alloc`] if the name cannot
    /// be duplicated into the registry arena.
    pub fn register<T>(&mut self, name: &str, handles_whole_list: bool, transform: T) -> Result<()>
    where
        T: Transform + 'static,
    {
        self.register_shared(name, handles_whole_list, Arc::new(transform))
    }

    /// Register a closure or function as a transform.
    pub fn register_fn<F>(&mut self, name: &str, handles_whole_list: bool, f: F) -> Result<()>
    where
        F: Fn(&Arena, &FieldRef) -> Result<FieldRef> + Send + Sync + 'static,
    {
        self.register(name, handles_whole_list, f)
    }

    /// Register a transform that is shared with other owners.
    pub fn register_shared(
        &mut self,
        name: &str,
        handles_whole_list: bool,
        transform: Arc<dyn Transform>,
    ) -> Result<()> {
        if self.transforms.contains_key(name) {
            return Err(Error::AlreadyExists {
                name: name.to_string(),
            });
        }

        let name = self.arena.strdup(name)?;
        let descriptor = Arc::new(TransformDescriptor {
            name: name.clone(),
            handles_whole_list,
            transform,
        });
        tracing::debug!(transform = %name, handles_whole_list, "registered transform");
        self.transforms.insert(name, descriptor);
        Ok(())
    }

    /// Look up a transform by exact, case-sensitive name.
    ///
    /// `name` may be a slice of a larger buffer; nothing is copied.
    pub fn lookup(&self, name: &str) -> Result<Arc<TransformDescriptor>> {
        self.transforms
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_found(name))
    }

    /// Whether a transform named `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    /// Registered descriptors, sorted by name
    pub fn descriptors(&self) -> Vec<Arc<TransformDescriptor>> {
        let mut all: Vec<_> = self.transforms.values().cloned().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        all
    }

    /// Number of registered transforms
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Whether no transforms are registered
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Arena holding descriptor names
    pub fn arena(&self) -> &Arena {
        &self.arena
    }
}
