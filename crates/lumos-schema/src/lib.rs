//! # lumos-schema — Attribute Schemas
//!
//! Attached metadata on types and fields is interpreted only by attribute
//! schemas explicitly enabled for a run. This crate owns everything about
//! that interpretation:
//!
//! - [`spec`]: schema documents and recursive [`PropertySpec`]s, checked
//!   for internal consistency at load time.
//! - [`check`]: worklist-based checking of one value against one spec.
//! - [`registry`]: an owned [`SchemaRegistry`], empty or seeded with the
//!   bundled `can_bus` and `validation` schemas.
//! - [`dispatch`]: first-match routing of attribute keys to enabled
//!   schemas, with the unknown-key policy.
//!
//! ## Crate Policy
//!
//! - Depends only on `lumos-core` internally.
//! - A malformed schema document is a [`SchemaError`]; a nonconforming
//!   attribute value is a diagnostic.

pub mod check;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod spec;

pub use check::{check_value, Violation, ViolationKind};
pub use dispatch::{AttributeSite, AttributeValidator};
pub use error::SchemaError;
pub use registry::SchemaRegistry;
pub use spec::{
    Attachment, AttributeSchema, Constraints, Pattern, PropertyKinds, PropertySpec, PropertyType,
};
