//! # lumos-core — Foundational Types for the Lumos IDL Toolchain
//!
//! Defines the records the parsing front end produces, the closed
//! taxonomies the validator checks against, and the diagnostic and
//! configuration types every later crate shares. Every other crate in the
//! workspace depends on `lumos-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtypes for identifiers.** `Namespace` and `QualifiedName` are
//!    distinct types, and the path-to-namespace function lives in exactly
//!    one place so file records and import statements can never disagree.
//!
//! 2. **Closed taxonomies.** `Primitive` and `StorageType` are enums with
//!    exhaustive matches; storage bounds are `i128` so every integer kind
//!    shares one comparison domain.
//!
//! 3. **Diagnostics are values.** Model violations are collected, never
//!    returned as `Err`. Only conditions outside the model's control
//!    (unreadable files, malformed documents) are a [`LumosError`].
//!
//! 4. **Ordered attribute trees.** `AttributeValue` is a tagged union over
//!    `IndexMap`, so schema checking is structural and output is stable.
//!
//! ## Crate Policy
//!
//! - Leaf of the workspace DAG.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.
//! - All record types derive `Serialize`/`Deserialize`.

pub mod attribute;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod model;
pub mod names;
pub mod primitive;
pub mod report;

// Re-export primary types for ergonomic imports.
pub use attribute::{merge_attributes, AttributeMap, AttributeValue};
pub use config::{AttributePolicy, NamingPolicy, NumberingPolicy, ValidationConfig};
pub use diagnostic::{Diagnostic, DiagnosticCollector, DiagnosticKind, Severity};
pub use error::{LumosError, LumosResult};
pub use model::{
    AliasDefinition, CollectionKind, CollectionShape, Dimension, EnumMember, FieldDefinition,
    FileUnit, Import, TypeDefinition, TypeKind,
};
pub use names::{is_qualified, Namespace, QualifiedName, QUALIFIER_SEPARATOR, SOURCE_EXTENSION};
pub use primitive::{Primitive, StorageType, PRIMITIVE_COUNT, STORAGE_TYPE_COUNT};
pub use report::Report;
