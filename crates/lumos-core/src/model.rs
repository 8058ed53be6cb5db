//! # Schema Model — Parser Output Records
//!
//! The shapes the parsing front end hands to the validator: one
//! [`FileUnit`] per source file, holding raw imports, namespace directives,
//! type definitions and aliases. Nothing here is resolved; type references
//! are the strings the author wrote, enum values are the literals the
//! author wrote (or absent), and field numbers are optional.
//!
//! Records are read-only to the validator. Every derived fact (qualified
//! names, effective enum values, the dependency graph) is computed per run
//! and kept elsewhere.
//!
//! ## Record Format
//!
//! All types derive `Serialize`/`Deserialize`. Optional parts may be
//! omitted, so a minimal file record in YAML reads:
//!
//! ```yaml
//! path: common/geometry.msg
//! types:
//!   - kind: struct
//!     name: Vector3
//!     fields:
//!       - { name: x, type: float32 }
//!       - { name: y, type: float32 }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::attribute::{merge_attributes, AttributeMap, AttributeValue};
use crate::error::LumosError;
use crate::names::{Namespace, QualifiedName};
use crate::primitive::StorageType;

/// Kind of a user-defined type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Struct,
    Interface,
    Enum,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Struct => "struct",
            Self::Interface => "interface",
            Self::Enum => "enum",
        }
    }

    /// Structs and interfaces carry fields; enums carry members.
    pub fn has_fields(&self) -> bool {
        matches!(self, Self::Struct | Self::Interface)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `import` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    /// Slash-separated path without extension, e.g. `common/geometry`.
    pub path: String,
    #[serde(default)]
    pub line: u32,
}

impl Import {
    pub fn new(path: impl Into<String>, line: u32) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }

    /// The namespace this import makes visible.
    pub fn namespace(&self) -> Namespace {
        Namespace::from_import(&self.path)
    }
}

/// One source file's extracted facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileUnit {
    pub path: PathBuf,
    /// Explicit namespace. When absent it is derived from `path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<Namespace>,
    #[serde(default)]
    pub imports: Vec<Import>,
    /// `using namespace X` directives, in source order.
    #[serde(default)]
    pub using_namespaces: Vec<String>,
    /// `namespace short = long::name` directives.
    #[serde(default)]
    pub namespace_aliases: IndexMap<String, String>,
    #[serde(default)]
    pub types: Vec<TypeDefinition>,
    #[serde(default)]
    pub aliases: Vec<AliasDefinition>,
}

impl FileUnit {
    /// An empty record for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            namespace: None,
            imports: Vec::new(),
            using_namespaces: Vec::new(),
            namespace_aliases: IndexMap::new(),
            types: Vec::new(),
            aliases: Vec::new(),
        }
    }

    /// The file's namespace: explicit if set, else derived from its path.
    pub fn namespace(&self) -> Namespace {
        self.namespace
            .clone()
            .unwrap_or_else(|| Namespace::from_path(&self.path))
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(Namespace::new(namespace));
        self
    }

    pub fn with_import(mut self, path: impl Into<String>, line: u32) -> Self {
        self.imports.push(Import::new(path, line));
        self
    }

    pub fn with_using(mut self, namespace: impl Into<String>) -> Self {
        self.using_namespaces.push(namespace.into());
        self
    }

    pub fn with_namespace_alias(
        mut self,
        alias: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.namespace_aliases.insert(alias.into(), target.into());
        self
    }

    pub fn with_type(mut self, def: TypeDefinition) -> Self {
        self.types.push(def);
        self
    }

    pub fn with_alias(mut self, alias: AliasDefinition) -> Self {
        self.aliases.push(alias);
        self
    }

    /// Directory containing the file, used as the last import search root.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// A struct, interface or enum definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub kind: TypeKind,
    pub name: String,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
    /// Fields of a struct or interface, in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    /// Members of an enum, in declaration order.
    #[serde(default)]
    pub members: Vec<EnumMember>,
    /// Raw storage keyword of an enum; `int32` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    /// Type-level attribute tree.
    #[serde(default)]
    pub attributes: AttributeMap,
}

impl TypeDefinition {
    fn new(kind: TypeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            line: 0,
            column: 0,
            fields: Vec::new(),
            members: Vec::new(),
            storage: None,
            attributes: AttributeMap::new(),
        }
    }

    pub fn structure(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Struct, name)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Interface, name)
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Enum, name)
    }

    pub fn at_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_member(mut self, member: EnumMember) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_storage(mut self, storage: impl Into<String>) -> Self {
        self.storage = Some(storage.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Fully-qualified name within `namespace`.
    pub fn qualified_name(&self, namespace: &Namespace) -> QualifiedName {
        namespace.qualify(&self.name)
    }

    /// Effective storage type of an enum.
    ///
    /// Fails with [`LumosError::UnknownKeyword`] when the raw keyword is
    /// not one of the eight integer kinds.
    pub fn storage_type(&self) -> Result<StorageType, LumosError> {
        match &self.storage {
            None => Ok(StorageType::default()),
            Some(raw) => raw.parse(),
        }
    }
}

/// One field of a struct or interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    /// Raw type reference. For a collection field, the element type.
    #[serde(rename = "type")]
    pub type_ref: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<i64>,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionShape>,
    /// Attributes written on the field's own line.
    #[serde(default)]
    pub attributes: AttributeMap,
    /// Attributes indented beneath the field.
    #[serde(default)]
    pub indented_attributes: AttributeMap,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_ref: type_ref.into(),
            optional: false,
            number: None,
            line: 0,
            column: 0,
            collection: None,
            attributes: AttributeMap::new(),
            indented_attributes: AttributeMap::new(),
        }
    }

    pub fn numbered(mut self, number: i64) -> Self {
        self.number = Some(number);
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn at_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    pub fn with_collection(mut self, shape: CollectionShape) -> Self {
        self.collection = Some(shape);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn with_indented_attribute(
        mut self,
        key: impl Into<String>,
        value: AttributeValue,
    ) -> Self {
        self.indented_attributes.insert(key.into(), value);
        self
    }

    /// Inline and indented attributes as one logical set.
    pub fn all_attributes(&self) -> AttributeMap {
        merge_attributes(&self.attributes, &self.indented_attributes)
    }
}

/// Container kind of a collection field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// Single dimension.
    Array,
    /// Exactly two dimensions.
    Matrix,
    /// One or more dimensions.
    Tensor,
}

impl CollectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Matrix => "matrix",
            Self::Tensor => "tensor",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared dimension of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Exactly `n` elements.
    Fixed(i64),
    /// At most `n` elements.
    Max(i64),
    /// Explicitly unbounded (`?` in source).
    #[serde(alias = "dynamic")]
    Unbounded,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "{n}"),
            Self::Max(n) => write!(f, "max={n}"),
            Self::Unbounded => f.write_str("?"),
        }
    }
}

/// Shape of a sized container field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionShape {
    pub kind: CollectionKind,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
}

impl CollectionShape {
    pub fn new(kind: CollectionKind, dimensions: Vec<Dimension>) -> Self {
        Self { kind, dimensions }
    }
}

/// One member of an enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    /// Explicit value as written; `None` means auto-increment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i128>,
    #[serde(default)]
    pub line: u32,
}

impl EnumMember {
    pub fn auto(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            line: 0,
        }
    }

    pub fn explicit(name: impl Into<String>, value: i128) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            line: 0,
        }
    }

    pub fn at_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }
}

/// `using Name = target` type alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasDefinition {
    pub name: String,
    /// Raw target reference; must name a primitive.
    pub target: String,
    #[serde(default)]
    pub line: u32,
}

impl AliasDefinition {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            line: 0,
        }
    }

    pub fn at_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }
}
