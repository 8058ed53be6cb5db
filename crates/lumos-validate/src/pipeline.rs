//! # Validation Pipeline
//!
//! Runs every phase over one set of file records and packages the outcome.
//!
//! ## Phases
//!
//! 1. **Registration**: every type and alias enters the symbol table.
//! 2. **Dependencies**: imports are resolved, the file graph is built and
//!    checked for cycles; the processing order is computed when acyclic.
//! 3. **Resolution**: every field type and alias target is resolved.
//! 4. **Structure**: field, enum and collection rules per registered type.
//! 5. **Attributes**: type, field and enum attribute trees are dispatched
//!    to the enabled schemas.
//!
//! Each phase visits every file before the next begins, and no phase
//! short-circuits on errors from an earlier one. Structural and attribute
//! checks run on types whose field references did not resolve.

use std::path::{Path, PathBuf};

use lumos_core::{
    Diagnostic, DiagnosticCollector, FileUnit, Report, TypeDefinition, TypeKind, ValidationConfig,
};
use lumos_schema::{Attachment, AttributeSite, AttributeValidator, SchemaRegistry};

use crate::collections::CollectionValidator;
use crate::enums::EnumValidator;
use crate::error::ValidateError;
use crate::fields::FieldValidator;
use crate::graph::DependencyGraph;
use crate::imports::ImportResolver;
use crate::resolve::TypeResolver;
use crate::symbols::SymbolTable;

// ---------------------------------------------------------------------------
// Validation Result
// ---------------------------------------------------------------------------

/// Outcome of one run.
#[derive(Debug)]
pub struct ValidationResult {
    report: Report,
    symbols: SymbolTable,
    graph: DependencyGraph,
    order: Option<Vec<PathBuf>>,
}

impl ValidationResult {
    /// True iff no error-level diagnostic was produced.
    pub fn is_success(&self) -> bool {
        self.report.is_success()
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Error diagnostics, sorted by file then line.
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.report.errors().collect()
    }

    /// Warning diagnostics, sorted by file then line.
    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.report.warnings().collect()
    }

    /// The populated symbol table, for downstream generators.
    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn dependency_graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Files in dependency order; `None` when the imports form a cycle.
    pub fn processing_order(&self) -> Option<&[PathBuf]> {
        self.order.as_deref()
    }

    pub fn into_parts(self) -> (Report, SymbolTable) {
        (self.report, self.symbols)
    }
}

// ---------------------------------------------------------------------------
// Registry construction
// ---------------------------------------------------------------------------

/// The bundled schemas plus every custom schema file named in `config`,
/// loaded in order. A later document replaces an earlier one of the same
/// name.
pub fn registry_for(config: &ValidationConfig) -> Result<SchemaRegistry, ValidateError> {
    let mut registry = SchemaRegistry::with_builtin()?;
    for path in &config.attributes.custom_schemas {
        registry.load_file(path)?;
    }
    Ok(registry)
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Validation engine configured for one run.
#[derive(Debug)]
pub struct Validator<'r> {
    resolver: ImportResolver,
    fields: FieldValidator,
    enums: EnumValidator,
    collections: CollectionValidator,
    attributes: AttributeValidator<'r>,
}

impl<'r> Validator<'r> {
    /// Prepare every phase. Fails on an invalid naming pattern or an
    /// enabled schema missing from `registry`.
    pub fn new(config: &ValidationConfig, registry: &'r SchemaRegistry) -> Result<Self, ValidateError> {
        Ok(Self {
            resolver: ImportResolver::new(config.search_paths.clone()),
            fields: FieldValidator::new(&config.numbering, &config.naming)?,
            enums: EnumValidator::new(),
            collections: CollectionValidator::new(),
            attributes: AttributeValidator::new(registry, &config.attributes)?,
        })
    }

    pub fn import_resolver(&self) -> &ImportResolver {
        &self.resolver
    }

    /// Validate `files` as one schema set.
    pub fn validate(&self, files: &[FileUnit]) -> ValidationResult {
        let mut out = DiagnosticCollector::new();
        tracing::debug!(files = files.len(), "validation started");

        let symbols = SymbolTable::build(files, &mut out);

        let graph = DependencyGraph::build(files, &self.resolver, &mut out);
        let order = if graph.check_cycles(&mut out) == 0 {
            graph.topological_order().ok()
        } else {
            None
        };
        tracing::debug!(diagnostics = out.len(), "dependency phase done");

        let resolver = TypeResolver::new(&symbols);
        for unit in files {
            resolver.check_file(unit, &mut out);
        }
        tracing::debug!(diagnostics = out.len(), "resolution phase done");

        for unit in files {
            for def in registered(&symbols, unit) {
                self.check_structure(&unit.path, def, &mut out);
            }
        }
        tracing::debug!(diagnostics = out.len(), "structural phase done");

        if !self.attributes.is_disabled() {
            for unit in files {
                for def in registered(&symbols, unit) {
                    self.check_attributes(&unit.path, def, &mut out);
                }
            }
        }

        let report = Report::from_collector(out);
        tracing::info!(
            errors = report.error_count(),
            warnings = report.warning_count(),
            "validation finished"
        );

        ValidationResult {
            report,
            symbols,
            graph,
            order,
        }
    }

    fn check_structure(&self, file: &Path, def: &TypeDefinition, out: &mut DiagnosticCollector) {
        self.fields.validate(file, def, out);
        match def.kind {
            TypeKind::Enum => self.enums.validate(file, def, out),
            TypeKind::Struct | TypeKind::Interface => self.collections.validate(file, def, out),
        }
    }

    fn check_attributes(&self, file: &Path, def: &TypeDefinition, out: &mut DiagnosticCollector) {
        let attachment = match def.kind {
            TypeKind::Enum => Attachment::Enum,
            TypeKind::Struct | TypeKind::Interface => Attachment::Struct,
        };
        self.attributes.validate(
            AttributeSite {
                file,
                line: def.line,
                attachment,
                owner: &def.name,
            },
            &def.attributes,
            out,
        );

        for field in &def.fields {
            self.attributes.validate(
                AttributeSite {
                    file,
                    line: field.line,
                    attachment: Attachment::Field,
                    owner: &field.name,
                },
                &field.all_attributes(),
                out,
            );
        }
    }
}

/// Definitions of `unit` that won registration.
fn registered<'a>(
    symbols: &'a SymbolTable,
    unit: &'a FileUnit,
) -> impl Iterator<Item = &'a TypeDefinition> + 'a {
    unit.types
        .iter()
        .enumerate()
        .filter(move |(index, _)| symbols.is_registered(unit, *index))
        .map(|(_, def)| def)
}
