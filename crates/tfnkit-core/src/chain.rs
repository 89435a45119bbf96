//! Transform chains and memoized lookups
//!
//! A chain is written as comma-separated transform names, e.g.
//! `"lowercase,compressWhitespace"`, and applied left to right. The result of
//! applying a chain to a field is cached in the transaction's store under a
//! [`CacheKey`] of the form `<field>.t(<chain>)`, so asking for the same field
//! and the same chain text twice runs the transforms once.
//!
//! The cache key is the exact chain text: `"a,b"` and `"b,a"` are different
//! chains with different entries.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::executor::apply_transform;
use crate::field::FieldRef;
use crate::registry::{TransformDescriptor, TransformRegistry};
use crate::store::DataStore;

const KEY_OPEN: &str = ".t(";
const KEY_CLOSE: char = ')';

/// What to do when a chain step cannot be resolved or fails
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChainPolicy {
    /// Leave the current value as it is and continue with the next step
    #[default]
    Skip,
    /// Abort the lookup with the step's error; nothing is cached
    Fail,
}

/// Canonical store key of a transformed field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build `<base>.t(<chain>)`.
    pub fn new(base: &str, chain: &str) -> Self {
        let mut key = String::with_capacity(base.len() + chain.len() + KEY_OPEN.len() + 1);
        key.push_str(base);
        key.push_str(KEY_OPEN);
        key.push_str(chain);
        key.push(KEY_CLOSE);
        Self(key)
    }

    /// Key text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key text is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One token of a parsed chain
#[derive(Debug, Clone)]
pub struct ChainStep<'a> {
    /// Token text, borrowed from the chain string
    pub name: &'a str,
    /// Resolved transform, if the name is registered
    pub descriptor: Option<Arc<TransformDescriptor>>,
}

/// Split `chain` on commas and resolve each token.
///
/// Empty tokens (`""`, `"a,"`, `"a,,b"`) are kept; they never resolve.
pub fn parse_chain<'a>(registry: &TransformRegistry, chain: &'a str) -> Vec<ChainStep<'a>> {
    chain
        .split(',')
        .map(|name| ChainStep {
            name,
            descriptor: registry.lookup(name).ok(),
        })
        .collect()
}

/// A chain step that did not contribute to the result
#[derive(Debug)]
pub struct SkippedStep {
    /// Transform name as written in the chain
    pub name: String,
    /// Why the step was skipped
    pub error: Error,
}

/// Outcome of a chain lookup, with per-step diagnostics
#[derive(Debug)]
pub struct ChainReport {
    /// Resulting field
    pub field: FieldRef,
    /// Cache key used, if a chain was requested
    pub key: Option<CacheKey>,
    /// Whether the result came from the cache
    pub cache_hit: bool,
    /// Transforms that ran successfully, in order
    pub applied: Vec<String>,
    /// Transforms that were skipped, in order
    pub skipped: Vec<SkippedStep>,
}

impl ChainReport {
    fn plain(field: FieldRef) -> Self {
        Self {
            field,
            key: None,
            cache_hit: false,
            applied: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Fetch `name` from `store`, transformed by `chain`.
///
/// With no chain this is a plain lookup. Otherwise the cached result under
/// `<name>.t(<chain>)` is returned if present; if not, the base field is
/// fetched, checked to be a string or byte string, run through every step of
/// the chain, tagged with the chain text, cached, and returned.
///
/// Only setup failures (missing base field, ineligible type, allocation,
/// store errors) fail the call under [`ChainPolicy::Skip`]. Unknown or
/// failing steps are listed in [`ChainReport::skipped`].
pub fn get_with_transform<S>(
    registry: &TransformRegistry,
    policy: ChainPolicy,
    store: &mut S,
    name: &str,
    chain: Option<&str>,
) -> Result<ChainReport>
where
    S: DataStore + ?Sized,
{
    let Some(chain) = chain else {
        let field = store.get(name).ok_or_else(|| Error::not_found(name))?;
        return Ok(ChainReport::plain(field));
    };

    let key = CacheKey::new(name, chain);
    if let Some(field) = store.get(key.as_str()) {
        tracing::trace!(key = %key, "transform cache hit");
        return Ok(ChainReport {
            field,
            key: Some(key),
            cache_hit: true,
            applied: Vec::new(),
            skipped: Vec::new(),
        });
    }
    tracing::trace!(key = %key, "transform cache miss");

    let base = store.get(name).ok_or_else(|| Error::not_found(name))?;
    base.require_string_like()?;

    let tagged = base.copy_tagged(store.arena(), key.as_str(), chain)?;
    let mut current = tagged.clone();
    let mut applied = Vec::new();
    let mut skipped = Vec::new();

    for step in parse_chain(registry, chain) {
        let outcome = match &step.descriptor {
            Some(descriptor) => apply_transform(descriptor, store.arena(), &current),
            None => Err(Error::not_found(step.name)),
        };

        match outcome {
            Ok(output) => {
                current = output;
                applied.push(step.name.to_string());
            }
            Err(error) => match policy {
                ChainPolicy::Skip => {
                    tracing::debug!(key = %key, step = step.name, %error, "skipping chain step");
                    skipped.push(SkippedStep {
                        name: step.name.to_string(),
                        error,
                    });
                }
                ChainPolicy::Fail => return Err(error),
            },
        }
    }

    let field = if current.name() == key.as_str() && current.tfn() == Some(chain) {
        current
    } else {
        current.copy_tagged(store.arena(), key.as_str(), chain)?
    };
    store.set(key.as_str(), field.clone())?;

    Ok(ChainReport {
        field,
        key: Some(key),
        cache_hit: false,
        applied,
        skipped,
    })
}
