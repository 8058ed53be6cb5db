//! # Attribute Schema Documents
//!
//! An attribute schema declares which metadata keys are legal at each
//! attachment point and how their values must be shaped:
//!
//! ```yaml
//! schema_name: can_bus
//! version: "1.0"
//! struct_attributes:
//!   can_message:
//!     type: object
//!     properties:
//!       id: { type: integer, required: true, constraints: { min: 0 } }
//! field_attributes: {}
//! ```
//!
//! `schema_name`, `version`, `struct_attributes` and `field_attributes` are
//! required; `enum_attributes` and `description` are optional. A document
//! is checked for internal consistency once, at load time, so a schema in
//! the registry can always be applied without further validation.

use std::collections::VecDeque;
use std::fmt;

use indexmap::IndexMap;
use lumos_core::AttributeValue;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::check::check_value;
use crate::error::SchemaError;

/// Where an attribute tree is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attachment {
    /// On a struct or interface.
    Struct,
    /// On an enum.
    Enum,
    /// On a field (inline and indented attributes merged).
    Field,
}

impl Attachment {
    /// Document key holding the specs for this attachment point.
    pub fn section(&self) -> &'static str {
        match self {
            Self::Struct => "struct_attributes",
            Self::Enum => "enum_attributes",
            Self::Field => "field_attributes",
        }
    }
}

impl fmt::Display for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Field => "field",
        })
    }
}

/// Expected kind of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Integer,
    /// Accepts integers as well as floats.
    #[serde(alias = "number")]
    Float,
    String,
    Boolean,
    Object,
    Array,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    /// Whether `value` has this kind.
    pub fn accepts(&self, value: &AttributeValue) -> bool {
        matches!(
            (self, value),
            (Self::Integer, AttributeValue::Integer(_) | AttributeValue::Unsigned(_))
                | (
                    Self::Float,
                    AttributeValue::Integer(_) | AttributeValue::Unsigned(_) | AttributeValue::Float(_)
                )
                | (Self::String, AttributeValue::Text(_))
                | (Self::Boolean, AttributeValue::Boolean(_))
                | (Self::Object, AttributeValue::Map(_))
                | (Self::Array, AttributeValue::List(_))
        )
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One or more accepted kinds. Written as `type: integer` or
/// `type: [integer, string]`; a value passes if any kind accepts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OneOrMany", into = "OneOrMany")]
pub struct PropertyKinds(Vec<PropertyType>);

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(PropertyType),
    Many(Vec<PropertyType>),
}

impl PropertyKinds {
    pub fn kinds(&self) -> &[PropertyType] {
        &self.0
    }

    pub fn contains(&self, kind: PropertyType) -> bool {
        self.0.contains(&kind)
    }

    pub fn accepts(&self, value: &AttributeValue) -> bool {
        self.0.iter().any(|k| k.accepts(value))
    }
}

impl From<PropertyType> for PropertyKinds {
    fn from(kind: PropertyType) -> Self {
        Self(vec![kind])
    }
}

impl TryFrom<OneOrMany> for PropertyKinds {
    type Error = String;

    fn try_from(value: OneOrMany) -> Result<Self, Self::Error> {
        let kinds = match value {
            OneOrMany::One(kind) => vec![kind],
            OneOrMany::Many(list) => {
                let mut kinds: Vec<PropertyType> = Vec::with_capacity(list.len());
                for kind in list {
                    if !kinds.contains(&kind) {
                        kinds.push(kind);
                    }
                }
                kinds
            }
        };
        if kinds.is_empty() {
            return Err("'type' list must name at least one kind".to_string());
        }
        Ok(Self(kinds))
    }
}

impl From<PropertyKinds> for OneOrMany {
    fn from(value: PropertyKinds) -> Self {
        match value.0.as_slice() {
            [one] => OneOrMany::One(*one),
            _ => OneOrMany::Many(value.0),
        }
    }
}

impl PartialEq<PropertyType> for PropertyKinds {
    fn eq(&self, other: &PropertyType) -> bool {
        self.0.as_slice() == [*other]
    }
}

impl fmt::Display for PropertyKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(PropertyType::as_str).collect();
        f.write_str(&names.join(" or "))
    }
}

/// A compiled text pattern, matched at the start of the value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern(Regex);

impl Pattern {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// True when a match begins at offset 0.
    pub fn matches_start(&self, text: &str) -> bool {
        self.0.find(text).is_some_and(|m| m.start() == 0)
    }
}

impl TryFrom<String> for Pattern {
    type Error = regex::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Regex::new(&value).map(Self)
    }
}

impl From<Pattern> for String {
    fn from(value: Pattern) -> Self {
        value.0.as_str().to_string()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// Value constraints. Each applies only to values of a matching kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Constraints {
    /// Inclusive numeric lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive numeric upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Minimum length of text or array values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    /// Closed set of allowed values.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<AttributeValue>>,
}

/// Recursive description of an expected attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySpec {
    #[serde(rename = "type")]
    pub kind: PropertyKinds,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<AttributeValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
    /// Named sub-properties of an object.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, PropertySpec>,
    /// Element spec of an array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<PropertySpec>>,
}

impl PropertySpec {
    pub fn new(kind: PropertyType) -> Self {
        Self {
            kind: kind.into(),
            required: false,
            default: None,
            description: None,
            constraints: None,
            properties: IndexMap::new(),
            items: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, spec: PropertySpec) -> Self {
        self.properties.insert(name.into(), spec);
        self
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = Some(constraints);
        self
    }
}

/// A named, versioned attribute schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSchema {
    pub schema_name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub struct_attributes: IndexMap<String, PropertySpec>,
    pub field_attributes: IndexMap<String, PropertySpec>,
    #[serde(default)]
    pub enum_attributes: IndexMap<String, PropertySpec>,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            schema_name: name.into(),
            version: version.into(),
            description: None,
            struct_attributes: IndexMap::new(),
            field_attributes: IndexMap::new(),
            enum_attributes: IndexMap::new(),
        }
    }

    pub fn with_attribute(
        mut self,
        attachment: Attachment,
        key: impl Into<String>,
        spec: PropertySpec,
    ) -> Self {
        let section = match attachment {
            Attachment::Struct => &mut self.struct_attributes,
            Attachment::Enum => &mut self.enum_attributes,
            Attachment::Field => &mut self.field_attributes,
        };
        section.insert(key.into(), spec);
        self
    }

    pub fn name(&self) -> &str {
        &self.schema_name
    }

    /// Specs declared for an attachment point.
    pub fn section(&self, attachment: Attachment) -> &IndexMap<String, PropertySpec> {
        match attachment {
            Attachment::Struct => &self.struct_attributes,
            Attachment::Enum => &self.enum_attributes,
            Attachment::Field => &self.field_attributes,
        }
    }

    /// The spec for `key` at `attachment`, if this schema declares it.
    pub fn lookup(&self, attachment: Attachment, key: &str) -> Option<&PropertySpec> {
        self.section(attachment).get(key)
    }

    /// Check internal consistency of every property spec.
    ///
    /// Rejects sub-properties on a non-object spec, `items` on a non-array
    /// spec, and any `default` that does not satisfy its own spec.
    pub fn verify(&self) -> Result<(), SchemaError> {
        let mut queue: VecDeque<(String, &PropertySpec)> = VecDeque::new();
        for attachment in [Attachment::Struct, Attachment::Enum, Attachment::Field] {
            for (key, spec) in self.section(attachment) {
                queue.push_back((format!("{}.{key}", attachment.section()), spec));
            }
        }

        while let Some((path, spec)) = queue.pop_front() {
            if !spec.properties.is_empty() && !spec.kind.contains(PropertyType::Object) {
                return Err(self.malformed(
                    &path,
                    format!("'properties' is only valid on object specs, not {}", spec.kind),
                ));
            }
            if spec.items.is_some() && !spec.kind.contains(PropertyType::Array) {
                return Err(self.malformed(
                    &path,
                    format!("'items' is only valid on array specs, not {}", spec.kind),
                ));
            }
            if let Some(default) = &spec.default {
                if let Some(violation) = check_value(default, spec).into_iter().next() {
                    return Err(self.malformed(
                        &path,
                        format!("default {default} does not satisfy its spec: {}", violation.message),
                    ));
                }
            }
            for (name, sub) in &spec.properties {
                queue.push_back((format!("{path}.{name}"), sub));
            }
            if let Some(items) = &spec.items {
                queue.push_back((format!("{path}[]"), items));
            }
        }
        Ok(())
    }

    fn malformed(&self, property: &str, reason: String) -> SchemaError {
        SchemaError::Malformed {
            schema: self.schema_name.clone(),
            property: property.to_string(),
            reason,
        }
    }
}
