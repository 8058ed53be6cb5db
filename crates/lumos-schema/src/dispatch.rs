//! # Attribute Dispatch
//!
//! Routes each attached attribute key to the first enabled schema that
//! declares it at the matching attachment point, and checks the value
//! against that schema's spec. Later schemas are not consulted for a key
//! once one has claimed it, so independent metadata consumers can share an
//! entity without validating each other's keys.
//!
//! | Situation | Outcome |
//! |-----------|---------|
//! | no schemas enabled | attributes are not inspected |
//! | key claimed by a schema | spec violations reported as errors |
//! | key unclaimed, strict mode | `AttributeUnknown` error |
//! | key unclaimed, `warn_unknown` | `AttributeUnknown` warning |
//! | key unclaimed, otherwise | nothing |

use std::path::Path;

use lumos_core::{
    AttributeMap, AttributePolicy, Diagnostic, DiagnosticCollector, DiagnosticKind, Severity,
};

use crate::check::check_value;
use crate::error::SchemaError;
use crate::registry::SchemaRegistry;
use crate::spec::{Attachment, AttributeSchema};

/// Location and owner of an attribute tree, for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct AttributeSite<'a> {
    pub file: &'a Path,
    pub line: u32,
    pub attachment: Attachment,
    /// Name of the type or field carrying the attributes.
    pub owner: &'a str,
}

/// Validates attribute trees against an ordered list of enabled schemas.
#[derive(Debug)]
pub struct AttributeValidator<'r> {
    schemas: Vec<&'r AttributeSchema>,
    warn_unknown: bool,
    strict: bool,
}

impl<'r> AttributeValidator<'r> {
    /// Select the enabled schemas from `registry`.
    ///
    /// Fails if an enabled name is not registered.
    pub fn new(registry: &'r SchemaRegistry, policy: &AttributePolicy) -> Result<Self, SchemaError> {
        let schemas = registry.select(&policy.enabled_schemas)?;
        Ok(Self {
            schemas,
            warn_unknown: policy.warn_unknown,
            strict: policy.strict_mode,
        })
    }

    /// True when no schema is enabled and validation is a no-op.
    pub fn is_disabled(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Names of the enabled schemas, in dispatch order.
    pub fn schema_names(&self) -> Vec<&str> {
        self.schemas.iter().map(|s| s.name()).collect()
    }

    /// First enabled schema declaring `key` at `attachment`.
    pub fn claim(&self, attachment: Attachment, key: &str) -> Option<&'r AttributeSchema> {
        self.schemas
            .iter()
            .copied()
            .find(|s| s.lookup(attachment, key).is_some())
    }

    /// Check every key of `attributes`, appending diagnostics to `out`.
    pub fn validate(
        &self,
        site: AttributeSite<'_>,
        attributes: &AttributeMap,
        out: &mut DiagnosticCollector,
    ) {
        if self.is_disabled() {
            return;
        }

        for (key, value) in attributes {
            let Some(schema) = self.claim(site.attachment, key) else {
                self.report_unknown(site, key, out);
                continue;
            };
            let Some(spec) = schema.lookup(site.attachment, key) else {
                continue;
            };

            for violation in check_value(value, spec) {
                let at = if violation.path.is_empty() {
                    String::new()
                } else {
                    format!(" at '{}'", violation.path)
                };
                out.push(
                    Diagnostic::new(
                        violation.kind.diagnostic_kind(),
                        site.file,
                        format!(
                            "attribute '{key}' on {} '{}' (schema '{}'){at}: {}",
                            site.attachment,
                            site.owner,
                            schema.name(),
                            violation.message
                        ),
                    )
                    .at_line(site.line),
                );
            }
        }
    }

    fn report_unknown(&self, site: AttributeSite<'_>, key: &str, out: &mut DiagnosticCollector) {
        let severity = if self.strict {
            Severity::Error
        } else if self.warn_unknown {
            Severity::Warning
        } else {
            return;
        };
        out.push(
            Diagnostic::new(
                DiagnosticKind::AttributeUnknown,
                site.file,
                format!(
                    "unknown {} attribute '{key}' on '{}' (not in enabled schemas: {})",
                    site.attachment,
                    site.owner,
                    self.schema_names().join(", ")
                ),
            )
            .with_severity(severity)
            .at_line(site.line),
        );
    }
}
