//! # Enum Validator
//!
//! Storage type, membership, value assignment and range rules for one enum.
//!
//! Value assignment: an explicit value is used as written; an omitted value
//! is the previous effective value plus one; an omitted first value is 0.
//! Names and values are unique independently. Every effective value must
//! lie in the storage type's bound. The range check is skipped when the
//! storage keyword itself is invalid.

use std::path::Path;

use indexmap::IndexMap;

use lumos_core::{
    Diagnostic, DiagnosticCollector, DiagnosticKind, EnumMember, StorageType, TypeDefinition,
};

/// Effective value of each member, in declaration order.
pub fn assign_values(members: &[EnumMember]) -> Vec<i128> {
    let mut next = 0i128;
    members
        .iter()
        .map(|m| {
            let value = m.value.unwrap_or(next);
            next = value.saturating_add(1);
            value
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnumValidator;

impl EnumValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, file: &Path, def: &TypeDefinition, out: &mut DiagnosticCollector) {
        let storage = match def.storage_type() {
            Ok(storage) => Some(storage),
            Err(_) => {
                let allowed: Vec<&str> = StorageType::all().iter().map(|s| s.as_str()).collect();
                out.push(
                    Diagnostic::new(
                        DiagnosticKind::EnumInvalidStorageType,
                        file,
                        format!(
                            "enum '{}' has invalid storage type '{}'; expected one of {}",
                            def.name,
                            def.storage.as_deref().unwrap_or_default(),
                            allowed.join(", ")
                        ),
                    )
                    .at(def.line, def.column),
                );
                None
            }
        };

        if def.members.is_empty() {
            out.push(
                Diagnostic::new(
                    DiagnosticKind::EnumNoMembers,
                    file,
                    format!("enum '{}' must have at least one member", def.name),
                )
                .at(def.line, def.column),
            );
            return;
        }

        let values = assign_values(&def.members);
        self.check_names(file, def, out);
        self.check_values(file, def, &values, out);
        if let Some(storage) = storage {
            self.check_ranges(file, def, storage, &values, out);
        }
    }

    fn check_names(&self, file: &Path, def: &TypeDefinition, out: &mut DiagnosticCollector) {
        let mut by_name: IndexMap<&str, Vec<&EnumMember>> = IndexMap::new();
        for member in &def.members {
            by_name.entry(member.name.as_str()).or_default().push(member);
        }
        for (name, members) in &by_name {
            for repeat in members.iter().skip(1) {
                out.push(
                    Diagnostic::new(
                        DiagnosticKind::EnumDuplicateName,
                        file,
                        format!("member '{name}' appears more than once in enum '{}'", def.name),
                    )
                    .at_line(repeat.line),
                );
            }
        }
    }

    fn check_values(
        &self,
        file: &Path,
        def: &TypeDefinition,
        values: &[i128],
        out: &mut DiagnosticCollector,
    ) {
        let mut by_value: IndexMap<i128, Vec<&EnumMember>> = IndexMap::new();
        for (member, value) in def.members.iter().zip(values) {
            by_value.entry(*value).or_default().push(member);
        }
        for (value, members) in &by_value {
            if let [_, second, ..] = members.as_slice() {
                let names: Vec<String> = members.iter().map(|m| format!("'{}'", m.name)).collect();
                out.push(
                    Diagnostic::new(
                        DiagnosticKind::EnumDuplicateValue,
                        file,
                        format!(
                            "value {value} is shared by members {} of enum '{}'",
                            names.join(", "),
                            def.name
                        ),
                    )
                    .at_line(second.line),
                );
            }
        }
    }

    fn check_ranges(
        &self,
        file: &Path,
        def: &TypeDefinition,
        storage: StorageType,
        values: &[i128],
        out: &mut DiagnosticCollector,
    ) {
        for (member, value) in def.members.iter().zip(values) {
            if storage.contains(*value) {
                continue;
            }
            out.push(
                Diagnostic::new(
                    DiagnosticKind::EnumValueOutOfRange,
                    file,
                    format!(
                        "member '{}' of enum '{}' has value {value}, outside the {storage} range [{}, {}]",
                        member.name,
                        def.name,
                        storage.min(),
                        storage.max()
                    ),
                )
                .at_line(member.line),
            );
        }
    }
}
