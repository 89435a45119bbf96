//! Engine instance
//!
//! The [`Engine`] owns the transform registry and configuration. Transforms
//! are registered while the engine is exclusively owned (`&mut Engine`);
//! afterwards it is shared read-only, typically behind an `Arc`, and every
//! request gets its own [`Transaction`].

use std::path::Path;
use std::sync::Arc;

use crate::arena::Arena;
use crate::builtins;
use crate::chain::{self, ChainReport};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::executor;
use crate::field::FieldRef;
use crate::registry::{Transform, TransformDescriptor, TransformRegistry};
use crate::store::{DataStore, Transaction};

/// Transformation engine
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    registry: TransformRegistry,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            registry: TransformRegistry::new(),
        }
    }
}

impl Engine {
    /// Create an engine and register the builtins named in `config`
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let arena = match config.registry_arena_limit {
            Some(limit) => Arena::with_limit(limit),
            None => Arena::new(),
        };
        let mut registry = TransformRegistry::with_arena(arena);
        for name in config.builtin_names() {
            builtins::register(&mut registry, name)?;
        }
        tracing::debug!(transforms = registry.len(), "engine created");

        Ok(Self { config, registry })
    }

    /// Load `tfnkit.yaml` from a directory or file and create an engine
    pub fn from_config<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(EngineConfig::load(path)?)
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Transform registry
    pub fn registry(&self) -> &TransformRegistry {
        &self.registry
    }

    /// Register a transform; see [`TransformRegistry::register`].
    pub fn register_transform<T>(
        &mut self,
        name: &str,
        handles_whole_list: bool,
        transform: T,
    ) -> Result<()>
    where
        T: Transform + 'static,
    {
        self.registry.register(name, handles_whole_list, transform)
    }

    /// Register a closure or function as a transform.
    pub fn register_transform_fn<F>(
        &mut self,
        name: &str,
        handles_whole_list: bool,
        f: F,
    ) -> Result<()>
    where
        F: Fn(&Arena, &FieldRef) -> Result<FieldRef> + Send + Sync + 'static,
    {
        self.registry.register_fn(name, handles_whole_list, f)
    }

    /// Look up a transform by name.
    pub fn lookup_transform(&self, name: &str) -> Result<Arc<TransformDescriptor>> {
        self.registry.lookup(name)
    }

    /// Apply one already-resolved transform.
    pub fn apply_transform(
        &self,
        descriptor: &TransformDescriptor,
        arena: &Arena,
        input: &FieldRef,
    ) -> Result<FieldRef> {
        executor::apply_transform(descriptor, arena, input)
    }

    /// Fetch `name` from `store`, transformed by the comma-separated `chain`.
    ///
    /// Results are cached in `store`; see [`chain::get_with_transform`].
    pub fn get_with_transform<S>(
        &self,
        store: &mut S,
        name: &str,
        chain: Option<&str>,
    ) -> Result<FieldRef>
    where
        S: DataStore + ?Sized,
    {
        self.get_with_transform_report(store, name, chain)
            .map(|report| report.field)
    }

    /// Like [`Engine::get_with_transform`], also reporting which steps ran,
    /// which were skipped, and whether the cache answered.
    pub fn get_with_transform_report<S>(
        &self,
        store: &mut S,
        name: &str,
        chain: Option<&str>,
    ) -> Result<ChainReport>
    where
        S: DataStore + ?Sized,
    {
        chain::get_with_transform(
            &self.registry,
            self.config.chain.on_step_error,
            store,
            name,
            chain,
        )
    }

    /// Start a transaction whose arena uses the configured byte budget
    pub fn transaction(&self) -> Transaction {
        let arena = match self.config.transaction_arena_limit {
            Some(limit) => Arena::with_limit(limit),
            None => Arena::new(),
        };
        Transaction::with_arena(arena)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainPolicy;
    use crate::error::Error;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_engine_is_shareable() {
        assert_send_sync::<Engine>();
    }

    #[test]
    fn test_new_registers_configured_builtins() {
        let config = EngineConfig::from_yaml("builtins: [lowercase, trim]").unwrap();
        let engine = Engine::new(config).unwrap();
        assert_eq!(engine.registry().len(), 2);
        assert!(engine.lookup_transform("trim").is_ok());
        assert!(engine.lookup_transform("uppercase").is_err());
    }

    #[test]
    fn test_registry_limit_applies_to_builtins() {
        let config = EngineConfig {
            registry_arena_limit: Some(4),
            builtins: vec!["lowercase".to_string()],
            ..Default::default()
        };
        let err = Engine::new(config).unwrap_err();
        assert!(matches!(err, Error::Alloc { .. }));
    }

    #[test]
    fn test_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yaml");
        std::fs::write(&path, "builtins: [trim]\n").unwrap();

        let engine = Engine::from_config(&path).unwrap();
        assert_eq!(engine.config().builtins, vec!["trim"]);
        assert!(engine.registry().contains("trim"));
    }

    #[test]
    fn test_transaction_uses_configured_limit() {
        let config = EngineConfig {
            transaction_arena_limit: Some(128),
            ..Default::default()
        };
        let engine = Engine::new(config).unwrap();
        let tx = engine.transaction();
        assert_eq!(tx.arena().limit(), Some(128));
    }

    #[test]
    fn test_configured_fail_policy() {
        let mut config = EngineConfig::from_yaml("builtins: [all]").unwrap();
        config.chain.on_step_error = ChainPolicy::Fail;
        let engine = Engine::new(config).unwrap();

        let mut tx = engine.transaction();
        tx.add_nulstr("x", " A ").unwrap();
        let err = engine
            .get_with_transform(&mut tx, "x", Some("trim,bogus"))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_apply_transform_single_step() {
        let engine = Engine::new(EngineConfig::from_yaml("builtins: [uppercase]").unwrap()).unwrap();
        let mut tx = engine.transaction();
        let input = tx.add_nulstr("x", "abc").unwrap();
        let upper = engine.lookup_transform("uppercase").unwrap();
        let out = engine.apply_transform(&upper, tx.arena(), &input).unwrap();
        assert_eq!(out.as_str(), Some("ABC"));
    }
}
