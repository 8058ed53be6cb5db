//! Fatal errors of a validation run.
//!
//! Raised before any file is inspected: an invalid naming pattern, an
//! unloadable or unregistered attribute schema. Once a run starts, every
//! finding is a diagnostic.

use thiserror::Error;

use lumos_core::LumosError;
use lumos_schema::SchemaError;

#[derive(Debug, Error)]
pub enum ValidateError {
    #[error(transparent)]
    Core(#[from] LumosError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
