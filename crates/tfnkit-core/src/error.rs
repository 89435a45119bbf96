//! Error types for tfnkit-core

use thiserror::Error;

/// Result type alias for tfnkit-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tfnkit-core
#[derive(Error, Debug)]
pub enum Error {
    /// Arena exhausted or allocation primitive failed
    #[error("allocation of {requested} bytes failed ({available} bytes available)")]
    Alloc {
        /// Bytes requested
        requested: usize,
        /// Bytes left in the arena at the time of the request
        available: usize,
    },

    /// A transform with the same name is already registered
    #[error("transform '{name}' already exists")]
    AlreadyExists {
        /// Name of the duplicate transform
        name: String,
    },

    /// Missing field or unresolvable transform name
    #[error("'{name}' not found")]
    NotFound {
        /// Name that failed to resolve
        name: String,
    },

    /// Field type is not eligible for the requested operation
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Description of the accepted type(s)
        expected: String,
        /// Type that was actually supplied
        actual: String,
    },

    /// Opaque failure reported by a transform
    #[error("transform '{transform}' failed: {message}")]
    Unexpected {
        /// Name of the transform
        transform: String,
        /// Description of the error
        message: String,
    },

    /// Invalid argument to a buffer or arena operation
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of what's invalid
        message: String,
    },

    /// Configuration file could not be found
    #[error("configuration file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched
        path: String,
    },

    /// Failed to parse YAML configuration
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Invalid configuration value
    #[error("invalid configuration: {message}")]
    ConfigInvalid {
        /// Description of what's invalid
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub(crate) fn type_mismatch(expected: impl Into<String>, actual: impl ToString) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.to_string(),
        }
    }

    /// Whether a caller may treat this error as "no value" and carry on.
    ///
    /// Missing fields, unknown transforms and ineligible types are
    /// recoverable; allocation failures, duplicate registrations and
    /// transform failures are not.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::TypeMismatch { .. })
    }
}
