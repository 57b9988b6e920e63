//! Error types for the schema comparison pipeline.
//!
//! Every error kind here is fatal: the walk aborts immediately and the error
//! propagates to the top-level caller unchanged, preserving the deepest
//! diagnostic message. Nothing is retried.

use std::path::PathBuf;

/// Errors that can occur while diffing schemas.
#[derive(Debug, thiserror::Error)]
pub enum DriftError {
    /// An instance is unreachable or authentication failed.
    #[error("Cannot connect to {instance}: {source}")]
    Connectivity {
        /// Display form of the unreachable instance.
        instance: String,
        /// The underlying failure.
        #[source]
        source: Box<DriftError>,
    },

    /// Filesystem SQL could not be materialized into the temporary schema.
    #[error("Cannot populate temporary schema '{schema}': {source}")]
    Population {
        /// Name of the temporary schema.
        schema: String,
        /// The underlying failure.
        #[source]
        source: Box<DriftError>,
    },

    /// A live or temporary schema could not be fetched.
    #[error("Cannot introspect schema '{schema}': {source}")]
    Introspection {
        /// Name of the schema being introspected.
        schema: String,
        /// The underlying database error.
        #[source]
        source: sqlx::Error,
    },

    /// The temporary schema disappeared between population and introspection.
    #[error("Temporary schema '{0}' vanished before it could be introspected")]
    MissingShadowSchema(String),

    /// A leaf directory has no host configured anywhere up its chain.
    #[error("No host configured for {dir}")]
    NoHost {
        /// Display form of the leaf directory.
        dir: String,
    },

    /// A host address token was blank.
    #[error("Cannot parse blank host address")]
    BlankHostAddress,

    /// A host address token could not be parsed.
    #[error("Invalid host address '{0}'")]
    InvalidHostAddress(String),

    /// A per-directory config file could not be parsed.
    #[error("Invalid config file '{path}': {message}")]
    Config {
        /// Path to the offending config file.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// An operation was attempted against invalid state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error (directory enumeration, SQL file reads, output stream).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for schema comparison operations.
pub type Result<T> = std::result::Result<T, DriftError>;
