//! Schema document errors.
//!
//! A schema document that cannot be read or does not describe a
//! well-formed set of property specs aborts the run. These are never
//! collected as diagnostics.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors while loading or selecting attribute schemas.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// YAML parsing failed.
    #[error("failed to parse schema YAML at {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// JSON parsing failed.
    #[error("failed to parse schema JSON at {path}: {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A schema file was not found.
    #[error("schema file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The document parsed but its property specs are inconsistent.
    #[error("malformed schema '{schema}' at {property}: {reason}")]
    Malformed {
        schema: String,
        /// Dotted path to the offending property spec.
        property: String,
        reason: String,
    },

    /// An enabled schema name is not registered.
    #[error("attribute schema '{name}' is enabled but not registered (registered: {available})")]
    UnknownSchema { name: String, available: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
