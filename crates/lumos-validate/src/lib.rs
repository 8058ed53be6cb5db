//! # lumos-validate — Semantic Validation for the Lumos IDL
//!
//! Turns a set of parsed [`FileUnit`](lumos_core::FileUnit) records into a
//! resolved symbol table and a sorted diagnostic report.
//!
//! ## Modules
//!
//! - [`symbols`]: qualified-name registry of types and aliases.
//! - [`resolve`]: read-only resolution of raw type references.
//! - [`imports`]: import path to file mapping over search directories.
//! - [`graph`]: file dependency graph: cycles, ordering, reachability.
//! - [`fields`], [`enums`], [`collections`]: per-type structural rules.
//! - [`pipeline`]: the phase driver and its [`ValidationResult`].
//!
//! ## Usage
//!
//! ```no_run
//! use lumos_core::{FileUnit, ValidationConfig};
//! use lumos_validate::{registry_for, Validator};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ValidationConfig::default();
//! let registry = registry_for(&config)?;
//! let validator = Validator::new(&config, &registry)?;
//! let result = validator.validate(&[FileUnit::new("common/geometry.msg")]);
//! print!("{}", result.report().render());
//! # Ok(())
//! # }
//! ```

pub mod collections;
pub mod enums;
pub mod error;
pub mod fields;
pub mod graph;
pub mod imports;
pub mod pipeline;
pub mod resolve;
pub mod symbols;

pub use collections::CollectionValidator;
pub use enums::{assign_values, EnumValidator};
pub use error::ValidateError;
pub use fields::FieldValidator;
pub use graph::{CycleError, DependencyGraph};
pub use imports::{normalize_import, ImportMiss, ImportResolver};
pub use pipeline::{registry_for, ValidationResult, Validator};
pub use resolve::{Resolved, TypeResolver};
pub use symbols::{AliasEntry, Symbol, SymbolStatistics, SymbolTable, TypeEntry};
