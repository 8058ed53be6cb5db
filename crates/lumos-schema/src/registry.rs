//! # Schema Registry
//!
//! Owned, per-run collection of attribute schemas keyed by name. There is
//! no process-wide registry: callers construct one explicitly, either
//! empty ([`SchemaRegistry::new`]) or pre-loaded with the bundled schemas
//! ([`SchemaRegistry::with_builtin`]), and pass it by reference to the
//! attribute validator.
//!
//! Registering a schema under a name that is already present replaces the
//! earlier entry. The replacement is logged at `warn` and the previous
//! schema is returned to the caller.

use std::path::Path;

use indexmap::IndexMap;

use crate::error::SchemaError;
use crate::spec::AttributeSchema;

/// Bundled schema documents, in load order.
const BUILTIN_SCHEMAS: &[(&str, &str)] = &[
    ("can_bus.yaml", include_str!("../schemas/can_bus.yaml")),
    ("validation.yaml", include_str!("../schemas/validation.yaml")),
];

/// Named attribute schemas, in registration order.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, AttributeSchema>,
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the bundled `can_bus` and `validation` schemas.
    pub fn with_builtin() -> Result<Self, SchemaError> {
        let mut registry = Self::new();
        for (origin, text) in BUILTIN_SCHEMAS {
            registry.load_yaml_str(text, Path::new(origin))?;
        }
        Ok(registry)
    }

    /// Insert a schema, replacing and returning any schema of the same name.
    pub fn register(&mut self, schema: AttributeSchema) -> Option<AttributeSchema> {
        let name = schema.schema_name.clone();
        let previous = self.schemas.insert(name.clone(), schema);
        if let Some(prev) = &previous {
            tracing::warn!(
                schema = %name,
                previous_version = %prev.version,
                "attribute schema re-registered; previous definition replaced"
            );
        } else {
            tracing::debug!(schema = %name, "attribute schema registered");
        }
        previous
    }

    /// Parse, verify and register a YAML schema document.
    ///
    /// `origin` is only used for error context.
    pub fn load_yaml_str(&mut self, text: &str, origin: &Path) -> Result<&AttributeSchema, SchemaError> {
        let schema: AttributeSchema =
            serde_yaml::from_str(text).map_err(|source| SchemaError::YamlParse {
                path: origin.to_path_buf(),
                source,
            })?;
        self.insert_verified(schema)
    }

    /// Parse, verify and register a JSON schema document.
    pub fn load_json_str(&mut self, text: &str, origin: &Path) -> Result<&AttributeSchema, SchemaError> {
        let schema: AttributeSchema =
            serde_json::from_str(text).map_err(|source| SchemaError::JsonParse {
                path: origin.to_path_buf(),
                source,
            })?;
        self.insert_verified(schema)
    }

    /// Load a schema file. `.json` files are parsed as JSON, anything else as YAML.
    pub fn load_file(&mut self, path: &Path) -> Result<&AttributeSchema, SchemaError> {
        if !path.exists() {
            return Err(SchemaError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        if is_json {
            self.load_json_str(&text, path)
        } else {
            self.load_yaml_str(&text, path)
        }
    }

    fn insert_verified(&mut self, schema: AttributeSchema) -> Result<&AttributeSchema, SchemaError> {
        schema.verify()?;
        let name = schema.schema_name.clone();
        self.register(schema);
        self.schemas
            .get(&name)
            .ok_or_else(|| SchemaError::UnknownSchema {
                name,
                available: self.names().join(", "),
            })
    }

    pub fn get(&self, name: &str) -> Option<&AttributeSchema> {
        self.schemas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeSchema> {
        self.schemas.values()
    }

    /// Look up each enabled name, preserving the caller's order.
    ///
    /// Fails on the first name that is not registered.
    pub fn select(&self, enabled: &[String]) -> Result<Vec<&AttributeSchema>, SchemaError> {
        enabled
            .iter()
            .map(|name| {
                self.get(name).ok_or_else(|| SchemaError::UnknownSchema {
                    name: name.clone(),
                    available: self.names().join(", "),
                })
            })
            .collect()
    }
}
