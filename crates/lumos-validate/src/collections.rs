//! # Collection Validator
//!
//! Shape rules for sized container fields:
//!
//! | Kind | Dimensions |
//! |------|------------|
//! | array | exactly one: positive fixed size, positive maximum, or unbounded |
//! | matrix | exactly two, each positive or unbounded |
//! | tensor | one or more, each positive or unbounded |
//!
//! Every zero or negative size, and every missing or surplus dimension,
//! is one `CollectionInvalidDimension` error.

use std::path::Path;

use lumos_core::{
    CollectionKind, CollectionShape, Diagnostic, DiagnosticCollector, DiagnosticKind, Dimension,
    FieldDefinition, TypeDefinition,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionValidator;

impl CollectionValidator {
    pub fn new() -> Self {
        Self
    }

    /// Check every collection field of `def`.
    pub fn validate(&self, file: &Path, def: &TypeDefinition, out: &mut DiagnosticCollector) {
        for field in &def.fields {
            if let Some(shape) = &field.collection {
                for problem in shape_problems(shape) {
                    out.push(
                        Diagnostic::new(
                            DiagnosticKind::CollectionInvalidDimension,
                            file,
                            format!("{} field '{}' of '{}': {problem}", shape.kind, field.name, def.name),
                        )
                        .at(field.line, field.column),
                    );
                }
            }
        }
    }

    /// Problems with one field's shape, empty when valid.
    pub fn check_field(&self, field: &FieldDefinition) -> Vec<String> {
        field
            .collection
            .as_ref()
            .map(shape_problems)
            .unwrap_or_default()
    }
}

fn shape_problems(shape: &CollectionShape) -> Vec<String> {
    let dims = &shape.dimensions;
    let mut problems = Vec::new();

    match shape.kind {
        CollectionKind::Array if dims.len() != 1 => problems.push(format!(
            "an array takes exactly one dimension, found {}",
            dims.len()
        )),
        CollectionKind::Matrix if dims.len() != 2 => problems.push(format!(
            "a matrix takes exactly two dimensions, found {}",
            dims.len()
        )),
        CollectionKind::Tensor if dims.is_empty() => {
            problems.push("a tensor takes at least one dimension".to_string())
        }
        _ => {}
    }

    for (i, dim) in dims.iter().enumerate() {
        let size = match dim {
            Dimension::Fixed(n) | Dimension::Max(n) => *n,
            Dimension::Unbounded => continue,
        };
        if size <= 0 {
            problems.push(format!(
                "dimension {} is {dim}; sizes must be positive",
                i + 1
            ));
        }
    }
    problems
}
