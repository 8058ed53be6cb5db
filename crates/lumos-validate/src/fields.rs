//! # Field Validator
//!
//! Per-type rules for field numbers and names.
//!
//! Numbering is all-or-nothing: a type whose fields are partly numbered
//! gets one `FieldNumberMissing` per unnumbered field and no further
//! numbering checks. A fully numbered type is checked for duplicates, for
//! the configured range, and (as a warning) for gaps between consecutive
//! numbers. Negative numbers take part in gap detection only when the
//! policy allows them.
//!
//! Naming: duplicate field names are errors. When the naming policy is
//! enforced, type and field names that do not match their patterns are
//! `NamingConvention` warnings. Patterns match from the start of the name.

use std::collections::BTreeSet;
use std::path::Path;

use indexmap::IndexMap;
use regex::Regex;

use lumos_core::{
    Diagnostic, DiagnosticCollector, DiagnosticKind, FieldDefinition, LumosError, NamingPolicy,
    NumberingPolicy, TypeDefinition,
};

/// Compiled naming patterns.
#[derive(Debug, Clone)]
struct NamingRules {
    type_name: Regex,
    field_name: Regex,
}

fn compile(pattern: &str) -> Result<Regex, LumosError> {
    Regex::new(pattern).map_err(|e| LumosError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Matches at the start of `name`, like an unanchored prefix match.
fn matches_from_start(pattern: &Regex, name: &str) -> bool {
    pattern.find(name).is_some_and(|m| m.start() == 0)
}

/// Field numbering and naming checks for one type at a time.
#[derive(Debug, Clone)]
pub struct FieldValidator {
    numbering: NumberingPolicy,
    naming: Option<NamingRules>,
}

impl FieldValidator {
    /// Fails if the naming policy is enforced and a pattern does not compile.
    pub fn new(numbering: &NumberingPolicy, naming: &NamingPolicy) -> Result<Self, LumosError> {
        let naming = if naming.enforce {
            Some(NamingRules {
                type_name: compile(&naming.type_name_pattern)?,
                field_name: compile(&naming.field_name_pattern)?,
            })
        } else {
            None
        };
        Ok(Self {
            numbering: numbering.clone(),
            naming,
        })
    }

    /// Run every rule against `def`.
    pub fn validate(&self, file: &Path, def: &TypeDefinition, out: &mut DiagnosticCollector) {
        self.check_type_name(file, def, out);
        if def.kind.has_fields() {
            self.check_numbering(file, def, out);
            self.check_field_names(file, def, out);
        }
    }

    fn check_type_name(&self, file: &Path, def: &TypeDefinition, out: &mut DiagnosticCollector) {
        let Some(rules) = &self.naming else {
            return;
        };
        if !matches_from_start(&rules.type_name, &def.name) {
            out.push(
                Diagnostic::new(
                    DiagnosticKind::NamingConvention,
                    file,
                    format!(
                        "{} name '{}' does not match pattern '{}'",
                        def.kind,
                        def.name,
                        rules.type_name.as_str()
                    ),
                )
                .at(def.line, def.column),
            );
        }
    }

    pub fn check_numbering(&self, file: &Path, def: &TypeDefinition, out: &mut DiagnosticCollector) {
        let (numbered, unnumbered): (Vec<&FieldDefinition>, Vec<&FieldDefinition>) =
            def.fields.iter().partition(|f| f.number.is_some());

        if numbered.is_empty() {
            return;
        }
        if !unnumbered.is_empty() {
            for field in unnumbered {
                out.push(
                    Diagnostic::new(
                        DiagnosticKind::FieldNumberMissing,
                        file,
                        format!(
                            "field '{}' of '{}' has no number; when any field is numbered, all must be",
                            field.name, def.name
                        ),
                    )
                    .at(field.line, field.column),
                );
            }
            return;
        }

        let mut by_number: IndexMap<i64, Vec<&FieldDefinition>> = IndexMap::new();
        for field in &numbered {
            if let Some(n) = field.number {
                by_number.entry(n).or_default().push(field);
            }
        }

        for (number, fields) in &by_number {
            if let [_, second, ..] = fields.as_slice() {
                let names: Vec<String> = fields.iter().map(|f| format!("'{}'", f.name)).collect();
                out.push(
                    Diagnostic::new(
                        DiagnosticKind::FieldNumberDuplicate,
                        file,
                        format!(
                            "field number {number} is used more than once in '{}': {}",
                            def.name,
                            names.join(", ")
                        ),
                    )
                    .at(second.line, second.column),
                );
            }
        }

        let (min, max) = (self.numbering.min_field_number(), self.numbering.max_field_number);
        for field in &numbered {
            let Some(n) = field.number else { continue };
            let reason = if n < 0 && !self.numbering.allow_negative {
                format!("field '{}' has negative number {n}; negative field numbers are not allowed", field.name)
            } else if n < min || n > max {
                format!(
                    "field '{}' has number {n}, outside the allowed range [{min}, {max}]",
                    field.name
                )
            } else {
                continue;
            };
            out.push(
                Diagnostic::new(DiagnosticKind::FieldNumberOutOfRange, file, reason)
                    .at(field.line, field.column),
            );
        }

        if self.numbering.warn_on_gap {
            self.check_gaps(file, def, by_number.keys().copied(), out);
        }
    }

    fn check_gaps(
        &self,
        file: &Path,
        def: &TypeDefinition,
        numbers: impl Iterator<Item = i64>,
        out: &mut DiagnosticCollector,
    ) {
        let sorted: Vec<i64> = numbers
            .filter(|n| self.numbering.allow_negative || *n >= 0)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        for pair in sorted.windows(2) {
            let (current, next) = (i128::from(pair[0]), i128::from(pair[1]));
            if next - current <= 1 {
                continue;
            }
            let missing = if next - current == 2 {
                (current + 1).to_string()
            } else {
                format!("{}..{}", current + 1, next - 1)
            };
            out.push(
                Diagnostic::new(
                    DiagnosticKind::FieldNumberGap,
                    file,
                    format!(
                        "field numbers of '{}' jump from {current} to {next} (missing {missing})",
                        def.name
                    ),
                )
                .at(def.line, def.column),
            );
        }
    }

    pub fn check_field_names(&self, file: &Path, def: &TypeDefinition, out: &mut DiagnosticCollector) {
        let mut by_name: IndexMap<&str, Vec<&FieldDefinition>> = IndexMap::new();
        for field in &def.fields {
            by_name.entry(field.name.as_str()).or_default().push(field);
        }
        for (name, fields) in &by_name {
            for repeat in fields.iter().skip(1) {
                out.push(
                    Diagnostic::new(
                        DiagnosticKind::FieldNameDuplicate,
                        file,
                        format!("field name '{name}' appears more than once in '{}'", def.name),
                    )
                    .at(repeat.line, repeat.column),
                );
            }
        }

        let Some(rules) = &self.naming else {
            return;
        };
        for field in &def.fields {
            if !matches_from_start(&rules.field_name, &field.name) {
                out.push(
                    Diagnostic::new(
                        DiagnosticKind::NamingConvention,
                        file,
                        format!(
                            "field name '{}' does not match pattern '{}'",
                            field.name,
                            rules.field_name.as_str()
                        ),
                    )
                    .at(field.line, field.column),
                );
            }
        }
    }
}
