//! # Validation Report
//!
//! The user-visible form of a run's diagnostics: grouped by file, each
//! line prefixed by severity, followed by a one-line summary.
//!
//! ```text
//! common/geometry.msg
//!   error   3:0  type_not_found: type 'Vec4' not found (field 'w')
//!   warning 9:0  field_number_gap: fields of 'Pose' skip numbers 3..4
//!
//! 1 error(s), 1 warning(s)
//! ```

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use crate::diagnostic::{Diagnostic, DiagnosticCollector, Severity};

/// Diagnostics of one run, sorted by file then line.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn from_collector(collector: DiagnosticCollector) -> Self {
        Self {
            diagnostics: collector.into_sorted(),
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// True iff no error-level diagnostic exists.
    pub fn is_success(&self) -> bool {
        self.error_count() == 0
    }

    pub fn summary(&self) -> String {
        let (errors, warnings) = (self.error_count(), self.warning_count());
        if errors == 0 && warnings == 0 {
            "No errors or warnings".to_string()
        } else {
            format!("{errors} error(s), {warnings} warning(s)")
        }
    }

    /// Render as text grouped by file.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut current: Option<&Path> = None;
        for d in &self.diagnostics {
            if current != Some(d.file.as_path()) {
                if current.is_some() {
                    out.push('\n');
                }
                let _ = writeln!(out, "{}", d.file.display());
                current = Some(d.file.as_path());
            }
            let _ = writeln!(
                out,
                "  {:<7} {}:{}  {}: {}",
                d.severity.as_str(),
                d.line,
                d.column,
                d.kind,
                d.message
            );
        }
        if !self.diagnostics.is_empty() {
            out.push('\n');
        }
        out.push_str(&self.summary());
        out.push('\n');
        out
    }
}
