//! # Error Types — Fatal Conditions
//!
//! Only conditions outside the schema model's control are errors in the
//! Rust sense: an unreadable input file, a malformed configuration or
//! record document, an unknown keyword where a closed set is required.
//! Every model violation (unresolved type, duplicate field number, enum
//! overflow, ...) is a [`Diagnostic`](crate::diagnostic::Diagnostic)
//! instead, collected rather than propagated.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level fatal error for the Lumos toolchain.
#[derive(Error, Debug)]
pub enum LumosError {
    /// A keyword outside a closed set (primitive, storage type).
    #[error("unknown {kind} '{value}'")]
    UnknownKeyword {
        /// Which closed set was consulted.
        kind: &'static str,
        /// The offending keyword.
        value: String,
    },

    /// A required input file could not be read.
    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration document is malformed or inconsistent.
    #[error("invalid configuration{}: {reason}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    InvalidConfig {
        /// Source file, when loaded from disk.
        path: Option<PathBuf>,
        /// What is wrong with it.
        reason: String,
    },

    /// A naming-convention or constraint pattern failed to compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// YAML (de)serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for fatal-error-returning operations.
pub type LumosResult<T> = Result<T, LumosError>;
