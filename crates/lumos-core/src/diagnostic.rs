//! # Diagnostics
//!
//! Every model violation the validator finds becomes a [`Diagnostic`]
//! appended to a [`DiagnosticCollector`]. Phases never short-circuit: the
//! collector accumulates across the whole run and is sorted once, by file
//! path then source line, when the run finishes. The sort is stable, so
//! diagnostics at the same location keep their emission order.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Error or warning. Only errors affect the overall outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind tag of a diagnostic.
///
/// | Kind | Default severity | Raised by |
/// |------|------------------|-----------|
/// | TypeNotFound | error | type resolver |
/// | DuplicateTypeName | error | symbol table |
/// | ImportNotFound | error | import resolver |
/// | CircularDependency | error | dependency graph |
/// | FieldNumberMissing / Duplicate / OutOfRange | error | field validator |
/// | FieldNumberGap | warning | field validator |
/// | FieldNameDuplicate | error | field validator |
/// | NamingConvention | warning | field validator |
/// | Enum* | error | enum validator |
/// | CollectionInvalidDimension | error | collection validator |
/// | AttributeUnknown | warning (error when strict) | attribute dispatch |
/// | AttributeTypeMismatch / MissingRequiredProperty / ConstraintViolation | error | property checking |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    TypeNotFound,
    DuplicateTypeName,
    ImportNotFound,
    CircularDependency,
    FieldNumberMissing,
    FieldNumberDuplicate,
    FieldNumberOutOfRange,
    FieldNumberGap,
    FieldNameDuplicate,
    NamingConvention,
    EnumInvalidStorageType,
    EnumNoMembers,
    EnumDuplicateName,
    EnumDuplicateValue,
    EnumValueOutOfRange,
    CollectionInvalidDimension,
    AttributeUnknown,
    AttributeTypeMismatch,
    AttributeMissingRequiredProperty,
    AttributeConstraintViolation,
}

impl DiagnosticKind {
    /// Snake-case tag used in rendered output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TypeNotFound => "type_not_found",
            Self::DuplicateTypeName => "duplicate_type_name",
            Self::ImportNotFound => "import_not_found",
            Self::CircularDependency => "circular_dependency",
            Self::FieldNumberMissing => "field_number_missing",
            Self::FieldNumberDuplicate => "field_number_duplicate",
            Self::FieldNumberOutOfRange => "field_number_out_of_range",
            Self::FieldNumberGap => "field_number_gap",
            Self::FieldNameDuplicate => "field_name_duplicate",
            Self::NamingConvention => "naming_convention",
            Self::EnumInvalidStorageType => "enum_invalid_storage_type",
            Self::EnumNoMembers => "enum_no_members",
            Self::EnumDuplicateName => "enum_duplicate_name",
            Self::EnumDuplicateValue => "enum_duplicate_value",
            Self::EnumValueOutOfRange => "enum_value_out_of_range",
            Self::CollectionInvalidDimension => "collection_invalid_dimension",
            Self::AttributeUnknown => "attribute_unknown",
            Self::AttributeTypeMismatch => "attribute_type_mismatch",
            Self::AttributeMissingRequiredProperty => "attribute_missing_required_property",
            Self::AttributeConstraintViolation => "attribute_constraint_violation",
        }
    }

    /// Severity when no policy overrides it.
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::FieldNumberGap | Self::NamingConvention | Self::AttributeUnknown => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single located finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub file: PathBuf,
    /// 1-based line, or 0 when unknown.
    pub line: u32,
    /// 1-based column, or 0 when unknown.
    pub column: u32,
    pub message: String,
}

impl Diagnostic {
    /// A diagnostic at the kind's default severity, location unknown.
    pub fn new(kind: DiagnosticKind, file: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self {
            severity: kind.default_severity(),
            kind,
            file: file.as_ref().to_path_buf(),
            line: 0,
            column: 0,
            message: message.into(),
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn at_line(self, line: u32) -> Self {
        self.at(line, 0)
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {}: {}",
            self.file.display(),
            self.line,
            self.column,
            self.severity,
            self.kind,
            self.message
        )
    }
}

/// Accumulates diagnostics from every phase of a run.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Diagnostics in emission order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Consume the collector, returning diagnostics ordered by file then line.
    pub fn into_sorted(mut self) -> Vec<Diagnostic> {
        self.diagnostics
            .sort_by(|a, b| a.file.cmp(&b.file).then(a.line.cmp(&b.line)));
        self.diagnostics
    }
}

impl Extend<Diagnostic> for DiagnosticCollector {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.diagnostics.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_severities() {
        assert_eq!(DiagnosticKind::FieldNumberGap.default_severity(), Severity::Warning);
        assert_eq!(DiagnosticKind::AttributeUnknown.default_severity(), Severity::Warning);
        assert_eq!(DiagnosticKind::NamingConvention.default_severity(), Severity::Warning);
        assert_eq!(DiagnosticKind::TypeNotFound.default_severity(), Severity::Error);
        assert_eq!(
            DiagnosticKind::AttributeConstraintViolation.default_severity(),
            Severity::Error
        );
    }

    #[test]
    fn display_format() {
        let d = Diagnostic::new(DiagnosticKind::TypeNotFound, "a.msg", "type 'Foo' not found")
            .at(3, 5);
        assert_eq!(
            d.to_string(),
            "a.msg:3:5: error: type_not_found: type 'Foo' not found"
        );
    }

    #[test]
    fn severity_override() {
        let d = Diagnostic::new(DiagnosticKind::AttributeUnknown, "a.msg", "x")
            .with_severity(Severity::Error);
        assert!(d.is_error());
    }

    #[test]
    fn counts() {
        let mut c = DiagnosticCollector::new();
        assert!(c.is_empty());
        c.push(Diagnostic::new(DiagnosticKind::FieldNumberGap, "a.msg", "gap"));
        c.push(Diagnostic::new(DiagnosticKind::EnumNoMembers, "a.msg", "empty"));
        assert_eq!(c.len(), 2);
        assert_eq!(c.error_count(), 1);
        assert_eq!(c.warning_count(), 1);
        assert!(c.has_errors());
    }

    #[test]
    fn sorted_by_file_then_line_stably() {
        let mut c = DiagnosticCollector::new();
        c.extend([
            Diagnostic::new(DiagnosticKind::TypeNotFound, "b.msg", "b7").at_line(7),
            Diagnostic::new(DiagnosticKind::TypeNotFound, "a.msg", "a9").at_line(9),
            Diagnostic::new(DiagnosticKind::TypeNotFound, "a.msg", "a2-first").at_line(2),
            Diagnostic::new(DiagnosticKind::FieldNumberGap, "a.msg", "a2-second").at_line(2),
        ]);
        let messages: Vec<String> = c.into_sorted().into_iter().map(|d| d.message).collect();
        assert_eq!(messages, vec!["a2-first", "a2-second", "a9", "b7"]);
    }

    #[test]
    fn kind_serializes_as_snake_case() {
        let json = serde_json::to_string(&DiagnosticKind::AttributeMissingRequiredProperty).unwrap();
        assert_eq!(json, "\"attribute_missing_required_property\"");
    }
}
