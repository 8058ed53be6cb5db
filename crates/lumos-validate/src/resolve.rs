//! # Type Resolver
//!
//! Resolves a raw type reference in the context of the file it appears in.
//! Lookup order:
//!
//! 1. a primitive keyword;
//! 2. a qualified reference (`a::b::T`), after rewriting a leading
//!    namespace alias, looked up directly;
//! 3. an unqualified reference, tried as a type in the file's own
//!    namespace, then in each imported namespace, then in each `using`
//!    namespace; failing that, as an alias in the same namespaces.
//!
//! An alias resolves to its target, which must be a primitive. Resolution
//! never mutates the table.

use std::fmt;

use lumos_core::{
    is_qualified, Diagnostic, DiagnosticCollector, DiagnosticKind, FileUnit, Namespace, Primitive,
    QualifiedName, QUALIFIER_SEPARATOR,
};

use crate::symbols::{AliasEntry, Symbol, SymbolTable};

/// What a type reference resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Primitive(Primitive),
    Type(QualifiedName),
    /// An alias and the primitive it stands for.
    Alias {
        alias: QualifiedName,
        target: Primitive,
    },
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Type(name) => write!(f, "{name}"),
            Self::Alias { alias, target } => write!(f, "{alias} (= {target})"),
        }
    }
}

/// Read-only resolution queries over a frozen symbol table.
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'t> {
    table: &'t SymbolTable,
}

impl<'t> TypeResolver<'t> {
    pub fn new(table: &'t SymbolTable) -> Self {
        Self { table }
    }

    /// Resolve `reference` as written in `unit`.
    pub fn resolve(&self, reference: &str, unit: &FileUnit) -> Option<Resolved> {
        let reference = reference.trim();
        if let Some(p) = Primitive::from_keyword(reference) {
            return Some(Resolved::Primitive(p));
        }

        if is_qualified(reference) {
            let name = expand_namespace_alias(reference, unit);
            return match self.table.lookup(&name)? {
                Symbol::Type(t) => Some(Resolved::Type(t.qualified_name.clone())),
                Symbol::Alias(a) => resolve_alias(a),
            };
        }

        let scopes = search_scopes(unit);
        scopes
            .iter()
            .find_map(|ns| {
                self.table
                    .get_type(&ns.qualify(reference))
                    .map(|t| Resolved::Type(t.qualified_name.clone()))
            })
            .or_else(|| {
                scopes
                    .iter()
                    .find_map(|ns| self.table.get_alias(&ns.qualify(reference)))
                    .and_then(resolve_alias)
            })
    }

    /// Report every unresolvable field type and alias target.
    pub fn check_file(&self, unit: &FileUnit, out: &mut DiagnosticCollector) {
        for (index, def) in unit.types.iter().enumerate() {
            if !self.table.is_registered(unit, index) {
                continue;
            }
            for field in &def.fields {
                if self.resolve(&field.type_ref, unit).is_none() {
                    out.push(
                        Diagnostic::new(
                            DiagnosticKind::TypeNotFound,
                            &unit.path,
                            format!(
                                "type '{}' not found (field '{}' of '{}')",
                                field.type_ref, field.name, def.name
                            ),
                        )
                        .at(field.line, field.column),
                    );
                }
            }
        }

        for alias in &unit.aliases {
            if Primitive::from_keyword(alias.target.trim()).is_none() {
                out.push(
                    Diagnostic::new(
                        DiagnosticKind::TypeNotFound,
                        &unit.path,
                        format!(
                            "alias '{}' targets '{}', which is not a primitive type",
                            alias.name, alias.target
                        ),
                    )
                    .at_line(alias.line),
                );
            }
        }
    }
}

fn resolve_alias(entry: &AliasEntry) -> Option<Resolved> {
    Primitive::from_keyword(entry.definition.target.trim()).map(|target| Resolved::Alias {
        alias: entry.qualified_name.clone(),
        target,
    })
}

/// Rewrite `alias::Rest` to `target::Rest` when `alias` is a namespace
/// alias declared in `unit`.
fn expand_namespace_alias(reference: &str, unit: &FileUnit) -> QualifiedName {
    if let Some((head, rest)) = reference.split_once(QUALIFIER_SEPARATOR) {
        if let Some(target) = unit.namespace_aliases.get(head) {
            return Namespace::new(target.as_str()).qualify(rest);
        }
    }
    QualifiedName::new(reference)
}

/// Own namespace, imported namespaces, then `using` namespaces.
fn search_scopes(unit: &FileUnit) -> Vec<Namespace> {
    let mut scopes = vec![unit.namespace()];
    scopes.extend(unit.imports.iter().map(|i| i.namespace()));
    scopes.extend(unit.using_namespaces.iter().map(|u| Namespace::new(u.as_str())));
    scopes
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumos_core::{AliasDefinition, FieldDefinition, TypeDefinition};

    fn geometry() -> FileUnit {
        FileUnit::new("common/geometry.msg")
            .with_type(TypeDefinition::structure("Vector3"))
            .with_alias(AliasDefinition::new("Meters", "float64"))
    }

    fn table(units: &[FileUnit]) -> SymbolTable {
        SymbolTable::build(units, &mut DiagnosticCollector::new())
    }

    #[test]
    fn primitive_resolves_without_table() {
        let t = table(&[]);
        let r = TypeResolver::new(&t);
        let unit = FileUnit::new("a.msg");
        assert_eq!(
            r.resolve("uint16", &unit),
            Some(Resolved::Primitive(Primitive::Uint16))
        );
    }

    #[test]
    fn local_type_resolves() {
        let t = table(&[geometry()]);
        let r = TypeResolver::new(&t);
        assert_eq!(
            r.resolve("Vector3", &geometry()),
            Some(Resolved::Type(QualifiedName::new("common::geometry::Vector3")))
        );
    }

    #[test]
    fn imported_type_resolves() {
        let user = FileUnit::new("robot/pose.msg").with_import("common/geometry", 1);
        let t = table(&[geometry(), user.clone()]);
        let r = TypeResolver::new(&t);
        assert_eq!(
            r.resolve("Vector3", &user),
            Some(Resolved::Type(QualifiedName::new("common::geometry::Vector3")))
        );
    }

    #[test]
    fn unimported_type_does_not_resolve() {
        let user = FileUnit::new("robot/pose.msg");
        let t = table(&[geometry(), user.clone()]);
        let r = TypeResolver::new(&t);
        assert_eq!(r.resolve("Vector3", &user), None);
    }

    #[test]
    fn qualified_reference_resolves_directly() {
        let user = FileUnit::new("robot/pose.msg");
        let t = table(&[geometry(), user.clone()]);
        let r = TypeResolver::new(&t);
        assert!(r.resolve("common::geometry::Vector3", &user).is_some());
        assert!(r.resolve("common::Vector3", &user).is_none());
    }

    #[test]
    fn using_namespace_and_namespace_alias() {
        let user = FileUnit::new("robot/pose.msg")
            .with_using("common::geometry")
            .with_namespace_alias("geo", "common::geometry");
        let t = table(&[geometry(), user.clone()]);
        let r = TypeResolver::new(&t);
        assert!(r.resolve("Vector3", &user).is_some());
        assert_eq!(
            r.resolve("geo::Vector3", &user),
            Some(Resolved::Type(QualifiedName::new("common::geometry::Vector3")))
        );
    }

    #[test]
    fn alias_resolves_to_primitive() {
        let t = table(&[geometry()]);
        let r = TypeResolver::new(&t);
        assert_eq!(
            r.resolve("Meters", &geometry()),
            Some(Resolved::Alias {
                alias: QualifiedName::new("common::geometry::Meters"),
                target: Primitive::Float64
            })
        );
    }

    #[test]
    fn own_type_shadows_imported_type() {
        let local = FileUnit::new("robot/pose.msg")
            .with_import("common/geometry", 1)
            .with_type(TypeDefinition::structure("Vector3"));
        let t = table(&[geometry(), local.clone()]);
        let r = TypeResolver::new(&t);
        assert_eq!(
            r.resolve("Vector3", &local),
            Some(Resolved::Type(QualifiedName::new("robot::pose::Vector3")))
        );
    }

    #[test]
    fn check_file_reports_unresolved_fields_and_bad_aliases() {
        let unit = FileUnit::new("robot/pose.msg")
            .with_type(
                TypeDefinition::structure("Pose")
                    .with_field(FieldDefinition::new("position", "Vector3").at_line(2))
                    .with_field(FieldDefinition::new("stamp", "uint64").at_line(3)),
            )
            .with_alias(AliasDefinition::new("Position", "Vector3").at_line(5));
        let t = table(&[unit.clone()]);
        let mut out = DiagnosticCollector::new();
        TypeResolver::new(&t).check_file(&unit, &mut out);

        let diags: Vec<_> = out.iter().collect();
        assert_eq!(diags.len(), 2);
        assert!(diags.iter().all(|d| d.kind == DiagnosticKind::TypeNotFound));
        assert_eq!(diags[0].line, 2);
        assert!(diags[0].message.contains("'Vector3'"));
        assert!(diags[0].message.contains("'position'"));
        assert_eq!(diags[1].line, 5);
    }
}
