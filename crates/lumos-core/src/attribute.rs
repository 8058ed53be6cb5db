//! # Attribute Value Trees
//!
//! Metadata attached to a type or field is an arbitrary nested tree of
//! key/value pairs. The grammar does not interpret it; only enabled
//! attribute schemas do. Values are a closed tagged union inspected
//! structurally, so schema checking is a `match`, never a runtime type query.
//!
//! ```yaml
//! can_message:
//!   id: 0x123
//!   cycle_time: 100
//! ```
//!
//! Maps preserve insertion order so diagnostics are emitted in the order
//! the author wrote the keys.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping from attribute key to value.
pub type AttributeMap = IndexMap<String, AttributeValue>;

/// One node of an attribute tree.
///
/// Deserialization is untagged: `true` is a `Boolean`, `3` an `Integer`,
/// an integer above `i64::MAX` an `Unsigned`, `3.5` a `Float`, `"x"` a
/// `Text`, a sequence a `List`, a mapping a `Map`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Boolean(bool),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
    List(Vec<AttributeValue>),
    Map(AttributeMap),
}

impl AttributeValue {
    /// Short name of the value's shape, used in mismatch messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) | Self::Unsigned(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
            Self::List(_) => "array",
            Self::Map(_) => "object",
        }
    }

    /// Numeric view of integer and float values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Unsigned(u) => Some(*u as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Exact view of integer values of either sign.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Integer(i) => Some(i128::from(*i)),
            Self::Unsigned(u) => Some(i128::from(*u)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&AttributeMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Compare for membership in an allowed-values set.
    ///
    /// Integers and floats compare numerically, so an allowed value of
    /// `1` matches an attribute written as `1.0`.
    pub fn loosely_equals(&self, other: &AttributeValue) -> bool {
        if let (Some(a), Some(b)) = (self.as_i128(), other.as_i128()) {
            return a == b;
        }
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Unsigned(u) => write!(f, "{u}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "'{s}'"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Merge inline attributes with those indented beneath a field.
///
/// Indented entries win on key collision; the key keeps the position of
/// its first (inline) occurrence.
pub fn merge_attributes(inline: &AttributeMap, indented: &AttributeMap) -> AttributeMap {
    let mut merged = inline.clone();
    for (key, value) in indented {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_deserialization_picks_the_right_variant() {
        let v: AttributeValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, AttributeValue::Boolean(true));

        let v: AttributeValue = serde_json::from_str("42").unwrap();
        assert_eq!(v, AttributeValue::Integer(42));

        let v: AttributeValue = serde_json::from_str("4.5").unwrap();
        assert_eq!(v, AttributeValue::Float(4.5));

        let v: AttributeValue = serde_json::from_str("\"rx\"").unwrap();
        assert_eq!(v, AttributeValue::Text("rx".to_string()));
    }

    #[test]
    fn integers_beyond_i64_stay_integers() {
        let v: AttributeValue = serde_yaml::from_str("18446744073709551615").unwrap();
        assert_eq!(v, AttributeValue::Unsigned(u64::MAX));
        assert_eq!(v.kind_name(), "integer");
        assert_eq!(v.as_i128(), Some(i128::from(u64::MAX)));
        assert_eq!(v.to_string(), "18446744073709551615");

        let v: AttributeValue = serde_json::from_str("-9223372036854775808").unwrap();
        assert_eq!(v, AttributeValue::Integer(i64::MIN));
    }

    #[test]
    fn large_integers_compare_exactly() {
        let big = AttributeValue::Unsigned(u64::MAX);
        assert!(big.loosely_equals(&AttributeValue::Unsigned(u64::MAX)));
        assert!(!big.loosely_equals(&AttributeValue::Unsigned(u64::MAX - 1)));
        assert!(AttributeValue::Unsigned(7).loosely_equals(&AttributeValue::Integer(7)));
    }

    #[test]
    fn nested_yaml_map_preserves_order() {
        let yaml = "can_message:\n  id: 291\n  cycle_time: 100\n  name: speed\n";
        let attrs: AttributeMap = serde_yaml::from_str(yaml).unwrap();
        let inner = attrs["can_message"].as_map().unwrap();
        let keys: Vec<&str> = inner.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "cycle_time", "name"]);
        assert_eq!(inner["id"], AttributeValue::Integer(291));
    }

    #[test]
    fn kind_names() {
        assert_eq!(AttributeValue::Integer(1).kind_name(), "integer");
        assert_eq!(AttributeValue::Map(AttributeMap::new()).kind_name(), "object");
        assert_eq!(AttributeValue::List(vec![]).kind_name(), "array");
    }

    #[test]
    fn loose_numeric_equality() {
        assert!(AttributeValue::Integer(1).loosely_equals(&AttributeValue::Float(1.0)));
        assert!(!AttributeValue::Integer(1).loosely_equals(&AttributeValue::Text("1".into())));
        assert!(AttributeValue::Text("a".into()).loosely_equals(&AttributeValue::Text("a".into())));
    }

    #[test]
    fn merge_prefers_indented() {
        let mut inline = AttributeMap::new();
        inline.insert("unit".into(), AttributeValue::Text("m".into()));
        inline.insert("scale".into(), AttributeValue::Integer(1));
        let mut indented = AttributeMap::new();
        indented.insert("unit".into(), AttributeValue::Text("mm".into()));
        indented.insert("offset".into(), AttributeValue::Integer(0));

        let merged = merge_attributes(&inline, &indented);
        let keys: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["unit", "scale", "offset"]);
        assert_eq!(merged["unit"], AttributeValue::Text("mm".into()));
    }

    #[test]
    fn display_renders_nested_values() {
        let mut map = AttributeMap::new();
        map.insert("id".into(), AttributeValue::Integer(7));
        map.insert(
            "tags".into(),
            AttributeValue::List(vec![AttributeValue::Text("a".into())]),
        );
        assert_eq!(AttributeValue::Map(map).to_string(), "{id: 7, tags: ['a']}");
    }
}
