//! tfnkit Core Library
//!
//! This crate provides the field transformation layer of an inspection
//! engine:
//! - A registry of named, pluggable transforms
//! - Single-step and chained transform application
//! - Memoization of chain results in the per-transaction field store
//! - Arena-scoped field ownership with bulk release
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Registry   │────▶│    Chain    │────▶│ Transaction │
//! │ (by name)   │     │ (a,b,c,...) │     │   (cache)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use tfnkit_core::{Engine, EngineConfig};
//!
//! let engine = Engine::new(EngineConfig::from_yaml("builtins: [all]")?)?;
//! let mut tx = engine.transaction();
//! tx.add_nulstr("ARGS", "  SELECT   *  ")?;
//! let field = engine.get_with_transform(&mut tx, "ARGS", Some("lowercase,compressWhitespace,trim"))?;
//! assert_eq!(field.as_str(), Some("select *"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arena;
pub mod buffer;
pub mod builtins;
pub mod chain;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod field;
pub mod registry;
pub mod store;

pub use arena::{Arena, ArenaId};
pub use buffer::ArenaBuffer;
pub use chain::{CacheKey, ChainPolicy, ChainReport, SkippedStep};
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{Error, Result};
pub use field::{Field, FieldRef, FieldType, FieldValue};
pub use registry::{Transform, TransformDescriptor, TransformRegistry};
pub use store::{DataStore, Transaction};
