//! # Validation Configuration
//!
//! Every knob a validation run consults, loaded from YAML with every key
//! optional. A missing key takes its default, so an empty document is a
//! valid configuration.
//!
//! ```yaml
//! search_paths: [idl, vendor/idl]
//! numbering:
//!   allow_negative: false
//!   max_field_number: 536870911
//!   warn_on_gap: true
//! naming:
//!   enforce: true
//! attributes:
//!   enabled_schemas: [can_bus]
//!   custom_schemas: [schemas/telemetry.yaml]
//!   strict_mode: true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LumosError;

/// Largest field number accepted by default (2^29 - 1).
pub const DEFAULT_MAX_FIELD_NUMBER: i64 = 536_870_911;

/// Default PascalCase pattern for type names.
pub const DEFAULT_TYPE_NAME_PATTERN: &str = "^[A-Z][a-zA-Z0-9]*$";

/// Default snake_case pattern for field names.
pub const DEFAULT_FIELD_NAME_PATTERN: &str = "^[a-z][a-z0-9_]*$";

/// Top-level configuration of a validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Import search roots, tried in order.
    pub search_paths: Vec<PathBuf>,
    pub numbering: NumberingPolicy,
    pub naming: NamingPolicy,
    pub attributes: AttributePolicy,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            search_paths: vec![PathBuf::from(".")],
            numbering: NumberingPolicy::default(),
            naming: NamingPolicy::default(),
            attributes: AttributePolicy::default(),
        }
    }
}

/// Field-number rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberingPolicy {
    pub allow_negative: bool,
    pub max_field_number: i64,
    /// Report non-consecutive numbers as a warning.
    pub warn_on_gap: bool,
}

impl Default for NumberingPolicy {
    fn default() -> Self {
        Self {
            allow_negative: false,
            max_field_number: DEFAULT_MAX_FIELD_NUMBER,
            warn_on_gap: true,
        }
    }
}

impl NumberingPolicy {
    /// Smallest accepted field number.
    pub fn min_field_number(&self) -> i64 {
        if self.allow_negative {
            -self.max_field_number
        } else {
            0
        }
    }
}

/// Naming-convention rules. Mismatches are warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingPolicy {
    pub enforce: bool,
    pub type_name_pattern: String,
    pub field_name_pattern: String,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self {
            enforce: false,
            type_name_pattern: DEFAULT_TYPE_NAME_PATTERN.to_string(),
            field_name_pattern: DEFAULT_FIELD_NAME_PATTERN.to_string(),
        }
    }
}

/// Attribute schema selection and unknown-key policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributePolicy {
    /// Schemas consulted, in dispatch order. Empty disables attribute checks.
    pub enabled_schemas: Vec<String>,
    /// Extra schema documents loaded after the built-ins.
    pub custom_schemas: Vec<PathBuf>,
    pub warn_unknown: bool,
    /// Escalate unknown attributes to errors.
    pub strict_mode: bool,
}

impl Default for AttributePolicy {
    fn default() -> Self {
        Self {
            enabled_schemas: Vec::new(),
            custom_schemas: Vec::new(),
            warn_unknown: true,
            strict_mode: false,
        }
    }
}

impl ValidationConfig {
    /// Parse a YAML document and check its invariants.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, LumosError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check(None)?;
        Ok(config)
    }

    /// Load from a YAML file.
    ///
    /// Relative `search_paths` and `custom_schemas` are resolved against
    /// the directory containing the file.
    pub fn load(path: &Path) -> Result<Self, LumosError> {
        let text = std::fs::read_to_string(path).map_err(|source| LumosError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self =
            serde_yaml::from_str(&text).map_err(|e| LumosError::InvalidConfig {
                path: Some(path.to_path_buf()),
                reason: e.to_string(),
            })?;
        config.check(Some(path))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for p in config
            .search_paths
            .iter_mut()
            .chain(config.attributes.custom_schemas.iter_mut())
        {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
        Ok(config)
    }

    fn check(&self, path: Option<&Path>) -> Result<(), LumosError> {
        if self.numbering.max_field_number < 0 {
            return Err(LumosError::InvalidConfig {
                path: path.map(Path::to_path_buf),
                reason: format!(
                    "numbering.max_field_number must be non-negative, got {}",
                    self.numbering.max_field_number
                ),
            });
        }
        Ok(())
    }

    /// Whether attribute checking runs at all.
    pub fn attributes_enabled(&self) -> bool {
        !self.attributes.enabled_schemas.is_empty()
    }
}
