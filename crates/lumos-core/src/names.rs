//! # Namespaces and Qualified Names
//!
//! Newtype wrappers for the two kinds of identifiers the validator keys
//! its tables by. A `Namespace` is derived from a file path; a
//! `QualifiedName` is a namespace plus a simple name and is globally
//! unique across a validation run.
//!
//! ## Derivation
//!
//! ```text
//! common/geometry.msg   ->  common::geometry
//! common/geometry       ->  common::geometry      (import path form)
//! common::geometry + Vector3  ->  common::geometry::Vector3
//! ```
//!
//! The same function maps file paths and import strings, so an import
//! statement always names the namespace of the file it resolves to.

use std::fmt;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

/// Separator between namespace segments and between a namespace and a name.
pub const QUALIFIER_SEPARATOR: &str = "::";

/// File extension of IDL source files, without the leading dot.
pub const SOURCE_EXTENSION: &str = "msg";

/// Namespace derived deterministically from a file path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    /// Wrap an already-formed namespace string (`a::b`).
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Derive the namespace for a source file or an import path.
    ///
    /// Drops a trailing `.msg` extension, skips root, prefix and `.`
    /// components, and joins the remaining segments with `::`.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let stripped = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext == SOURCE_EXTENSION => path.with_extension(""),
            _ => path.to_path_buf(),
        };

        let segments: Vec<String> = stripped
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        Self(segments.join(QUALIFIER_SEPARATOR))
    }

    /// Derive the namespace an import statement refers to.
    ///
    /// Repeated slashes are collapsed before derivation, so `a//b` and
    /// `a/b` name the same namespace.
    pub fn from_import(import: &str) -> Self {
        let normalized: Vec<&str> = import.split('/').filter(|s| !s.is_empty()).collect();
        Self::from_path(normalized.join("/"))
    }

    /// Qualify a simple name with this namespace.
    pub fn qualify(&self, name: &str) -> QualifiedName {
        if self.0.is_empty() {
            QualifiedName(name.to_string())
        } else {
            QualifiedName(format!("{}{QUALIFIER_SEPARATOR}{name}", self.0))
        }
    }

    /// The namespace as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the namespace of a file at the search root with no segments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully-qualified type name: `namespace::Name`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualifiedName(String);

impl QualifiedName {
    /// Wrap a string that is already qualified.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The qualified name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything before the last `::`, or `None` for an unqualified name.
    pub fn namespace(&self) -> Option<Namespace> {
        self.0
            .rsplit_once(QUALIFIER_SEPARATOR)
            .map(|(ns, _)| Namespace::new(ns))
    }

    /// The final segment.
    pub fn simple_name(&self) -> &str {
        self.0
            .rsplit_once(QUALIFIER_SEPARATOR)
            .map_or(self.0.as_str(), |(_, name)| name)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// True if a raw type reference carries a namespace qualifier.
pub fn is_qualified(reference: &str) -> bool {
    reference.contains(QUALIFIER_SEPARATOR)
}
