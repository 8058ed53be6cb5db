//! # PropertySpec Checking
//!
//! Structural check of one attribute value against one [`PropertySpec`].
//! Nested objects and arrays are walked with an explicit FIFO worklist, so
//! pathological nesting depth costs heap, not call stack, and violations
//! come out level by level in declaration order.
//!
//! A value whose kind does not match its spec yields one type mismatch
//! and is not inspected further. Sub-properties the spec does not declare
//! are ignored.

use std::collections::VecDeque;
use std::fmt;

use lumos_core::{AttributeValue, DiagnosticKind};

use crate::spec::{Constraints, PropertySpec};

/// Category of a spec violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    TypeMismatch,
    MissingRequired,
    Constraint,
}

impl ViolationKind {
    /// The diagnostic kind a violation is reported as.
    pub fn diagnostic_kind(&self) -> DiagnosticKind {
        match self {
            Self::TypeMismatch => DiagnosticKind::AttributeTypeMismatch,
            Self::MissingRequired => DiagnosticKind::AttributeMissingRequiredProperty,
            Self::Constraint => DiagnosticKind::AttributeConstraintViolation,
        }
    }
}

/// One way a value fails its spec.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Dotted path below the checked value; empty for the value itself.
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

/// Check `value` against `spec`, returning every violation found.
pub fn check_value(value: &AttributeValue, spec: &PropertySpec) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut queue: VecDeque<(String, &AttributeValue, &PropertySpec)> = VecDeque::new();
    queue.push_back((String::new(), value, spec));

    while let Some((path, value, spec)) = queue.pop_front() {
        if !spec.kind.accepts(value) {
            violations.push(Violation {
                kind: ViolationKind::TypeMismatch,
                path,
                message: format!("expected {}, got {}", spec.kind, value.kind_name()),
            });
            continue;
        }

        if let Some(constraints) = &spec.constraints {
            if let Some(message) = check_constraints(value, constraints) {
                violations.push(Violation {
                    kind: ViolationKind::Constraint,
                    path: path.clone(),
                    message,
                });
            }
        }

        match value {
            AttributeValue::Map(map) => {
                for (name, sub_spec) in &spec.properties {
                    match map.get(name) {
                        Some(sub_value) => queue.push_back((join(&path, name), sub_value, sub_spec)),
                        None if sub_spec.required => violations.push(Violation {
                            kind: ViolationKind::MissingRequired,
                            path: join(&path, name),
                            message: format!("required property '{name}' missing"),
                        }),
                        None => {}
                    }
                }
            }
            AttributeValue::List(items) => {
                if let Some(item_spec) = &spec.items {
                    for (i, item) in items.iter().enumerate() {
                        queue.push_back((format!("{path}[{i}]"), item, item_spec));
                    }
                }
            }
            _ => {}
        }
    }

    violations
}

/// First constraint `value` violates, as a message.
fn check_constraints(value: &AttributeValue, c: &Constraints) -> Option<String> {
    if let Some(n) = value.as_f64() {
        if let Some(min) = c.min {
            if n < min {
                return Some(format!("value {value} is less than minimum {min}"));
            }
        }
        if let Some(max) = c.max {
            if n > max {
                return Some(format!("value {value} is greater than maximum {max}"));
            }
        }
    }

    let length = match value {
        AttributeValue::Text(s) => Some(s.chars().count()),
        AttributeValue::List(items) => Some(items.len()),
        _ => None,
    };
    if let Some(len) = length {
        if let Some(min) = c.min_length {
            if len < min {
                return Some(format!("length {len} is less than minimum {min}"));
            }
        }
        if let Some(max) = c.max_length {
            if len > max {
                return Some(format!("length {len} is greater than maximum {max}"));
            }
        }
    }

    if let (Some(pattern), AttributeValue::Text(text)) = (&c.pattern, value) {
        if !pattern.matches_start(text) {
            return Some(format!(
                "value '{text}' does not match pattern '{}'",
                pattern.as_str()
            ));
        }
    }

    if let Some(allowed) = &c.allowed {
        if !allowed.iter().any(|a| a.loosely_equals(value)) {
            let list: Vec<String> = allowed.iter().map(ToString::to_string).collect();
            return Some(format!(
                "value {value} not in allowed values [{}]",
                list.join(", ")
            ));
        }
    }

    None
}
