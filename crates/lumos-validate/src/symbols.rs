//! # Symbol Table
//!
//! Registry of every type and alias defined in a run, keyed by qualified
//! name. Built in one pass over the file records before any other phase
//! runs, then only read.
//!
//! Insertion is first-wins: a later definition whose qualified name is
//! already taken (by a type or an alias) is reported as
//! `DuplicateTypeName` and not registered.

use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use lumos_core::{
    AliasDefinition, Diagnostic, DiagnosticCollector, DiagnosticKind, FileUnit, Namespace,
    QualifiedName, TypeDefinition,
};

/// A registered type.
#[derive(Debug, Clone, Serialize)]
pub struct TypeEntry {
    pub qualified_name: QualifiedName,
    pub namespace: Namespace,
    pub file: PathBuf,
    /// Position of the definition within its file's `types`.
    pub index: usize,
    pub definition: TypeDefinition,
}

/// A registered alias.
#[derive(Debug, Clone, Serialize)]
pub struct AliasEntry {
    pub qualified_name: QualifiedName,
    pub namespace: Namespace,
    pub file: PathBuf,
    pub definition: AliasDefinition,
}

/// Result of a qualified-name lookup.
#[derive(Debug, Clone, Copy)]
pub enum Symbol<'t> {
    Type(&'t TypeEntry),
    Alias(&'t AliasEntry),
}

impl Symbol<'_> {
    pub fn qualified_name(&self) -> &QualifiedName {
        match self {
            Symbol::Type(t) => &t.qualified_name,
            Symbol::Alias(a) => &a.qualified_name,
        }
    }

    pub fn file(&self) -> &Path {
        match self {
            Symbol::Type(t) => &t.file,
            Symbol::Alias(a) => &a.file,
        }
    }
}

/// Counts reported by [`SymbolTable::statistics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SymbolStatistics {
    pub types: usize,
    pub aliases: usize,
    pub files: usize,
    pub namespaces: usize,
}

/// Every type and alias of a run, by qualified name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SymbolTable {
    types: IndexMap<QualifiedName, TypeEntry>,
    aliases: IndexMap<QualifiedName, AliasEntry>,
    files: IndexMap<PathBuf, Namespace>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every file of a run.
    pub fn build(files: &[FileUnit], out: &mut DiagnosticCollector) -> Self {
        let mut table = Self::new();
        for unit in files {
            table.register_file(unit, out);
        }
        tracing::info!(
            types = table.types.len(),
            aliases = table.aliases.len(),
            files = table.files.len(),
            "symbol table built"
        );
        table
    }

    /// Register one file's types, then its aliases.
    pub fn register_file(&mut self, unit: &FileUnit, out: &mut DiagnosticCollector) {
        let namespace = unit.namespace();
        self.files
            .entry(unit.path.clone())
            .or_insert_with(|| namespace.clone());

        for (index, def) in unit.types.iter().enumerate() {
            let qualified_name = def.qualified_name(&namespace);
            if let Some(existing) = self.lookup(&qualified_name) {
                out.push(duplicate(&qualified_name, existing.file(), &unit.path, def.line));
                continue;
            }
            tracing::debug!(name = %qualified_name, kind = %def.kind, "type registered");
            self.types.insert(
                qualified_name.clone(),
                TypeEntry {
                    qualified_name,
                    namespace: namespace.clone(),
                    file: unit.path.clone(),
                    index,
                    definition: def.clone(),
                },
            );
        }

        for alias in &unit.aliases {
            let qualified_name = namespace.qualify(&alias.name);
            if let Some(existing) = self.lookup(&qualified_name) {
                out.push(duplicate(&qualified_name, existing.file(), &unit.path, alias.line));
                continue;
            }
            self.aliases.insert(
                qualified_name.clone(),
                AliasEntry {
                    qualified_name,
                    namespace: namespace.clone(),
                    file: unit.path.clone(),
                    definition: alias.clone(),
                },
            );
        }
    }

    /// Exact lookup by qualified name.
    pub fn lookup(&self, name: &QualifiedName) -> Option<Symbol<'_>> {
        self.types
            .get(name)
            .map(Symbol::Type)
            .or_else(|| self.aliases.get(name).map(Symbol::Alias))
    }

    pub fn get_type(&self, name: &QualifiedName) -> Option<&TypeEntry> {
        self.types.get(name)
    }

    pub fn get_alias(&self, name: &QualifiedName) -> Option<&AliasEntry> {
        self.aliases.get(name)
    }

    /// Whether `unit.types[index]` is the definition that won registration.
    pub fn is_registered(&self, unit: &FileUnit, index: usize) -> bool {
        let Some(def) = unit.types.get(index) else {
            return false;
        };
        self.types
            .get(&def.qualified_name(&unit.namespace()))
            .is_some_and(|t| t.file == unit.path && t.index == index)
    }

    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.types.contains_key(name) || self.aliases.contains_key(name)
    }

    /// Registered types, in registration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeEntry> {
        self.types.values()
    }

    pub fn aliases(&self) -> impl Iterator<Item = &AliasEntry> {
        self.aliases.values()
    }

    pub fn types_in_namespace<'a>(
        &'a self,
        namespace: &'a Namespace,
    ) -> impl Iterator<Item = &'a TypeEntry> + 'a {
        self.types.values().filter(move |t| &t.namespace == namespace)
    }

    pub fn types_in_file<'a>(&'a self, file: &'a Path) -> impl Iterator<Item = &'a TypeEntry> + 'a {
        self.types.values().filter(move |t| t.file == file)
    }

    /// Distinct namespaces that define at least one type or alias.
    pub fn namespaces(&self) -> IndexSet<&Namespace> {
        self.types
            .values()
            .map(|t| &t.namespace)
            .chain(self.aliases.values().map(|a| &a.namespace))
            .collect()
    }

    pub fn statistics(&self) -> SymbolStatistics {
        SymbolStatistics {
            types: self.types.len(),
            aliases: self.aliases.len(),
            files: self.files.len(),
            namespaces: self.namespaces().len(),
        }
    }
}

fn duplicate(name: &QualifiedName, first: &Path, file: &Path, line: u32) -> Diagnostic {
    Diagnostic::new(
        DiagnosticKind::DuplicateTypeName,
        file,
        format!(
            "'{name}' is already defined in {}",
            first.display()
        ),
    )
    .at_line(line)
}
