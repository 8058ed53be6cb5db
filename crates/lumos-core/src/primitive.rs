//! # Primitive and Storage Types — Single Source of Truth
//!
//! Defines the primitive keywords a type reference may name directly and
//! the eight fixed-width integer kinds an enum may be stored as. Every
//! `match` on these enums is exhaustive, so adding a keyword forces each
//! consumer (resolver, enum validator, CLI output) to handle it.
//!
//! ## Storage Bounds
//!
//! | Storage | Min | Max |
//! |---------|-----|-----|
//! | int8    | -128 | 127 |
//! | int16   | -32768 | 32767 |
//! | int32   | -2147483648 | 2147483647 |
//! | int64   | -9223372036854775808 | 9223372036854775807 |
//! | uint8   | 0 | 255 |
//! | uint16  | 0 | 65535 |
//! | uint32  | 0 | 4294967295 |
//! | uint64  | 0 | 18446744073709551615 |
//!
//! Bounds are expressed as `i128` so both `int64::MIN` and `uint64::MAX`
//! fit in one comparison domain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LumosError;

/// Primitive type keywords recognised in a type reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
    Bytes,
}

/// Total number of primitive keywords.
pub const PRIMITIVE_COUNT: usize = 13;

impl Primitive {
    /// All primitive keywords in canonical order.
    pub fn all() -> &'static [Primitive] {
        &[
            Self::Bool,
            Self::Int8,
            Self::Int16,
            Self::Int32,
            Self::Int64,
            Self::Uint8,
            Self::Uint16,
            Self::Uint32,
            Self::Uint64,
            Self::Float32,
            Self::Float64,
            Self::String,
            Self::Bytes,
        ]
    }

    /// The keyword as written in source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::String => "string",
            Self::Bytes => "bytes",
        }
    }

    /// Match a raw reference against the primitive keywords.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::all().iter().copied().find(|p| p.as_str() == keyword)
    }

    /// The storage kind this primitive corresponds to, if it is a
    /// fixed-width integer.
    pub fn as_storage(&self) -> Option<StorageType> {
        StorageType::from_keyword(self.as_str())
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Primitive {
    type Err = LumosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_keyword(s).ok_or_else(|| LumosError::UnknownKeyword {
            kind: "primitive type",
            value: s.to_string(),
        })
    }
}

/// Fixed-width integer kind an enum's values are encoded as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    Int8,
    Int16,
    #[default]
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
}

/// Total number of enum storage kinds.
pub const STORAGE_TYPE_COUNT: usize = 8;

impl StorageType {
    /// All storage kinds, signed first, narrowest first.
    pub fn all() -> &'static [StorageType] {
        &[
            Self::Int8,
            Self::Int16,
            Self::Int32,
            Self::Int64,
            Self::Uint8,
            Self::Uint16,
            Self::Uint32,
            Self::Uint64,
        ]
    }

    /// The keyword as written in source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
        }
    }

    /// Match a raw storage keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::all().iter().copied().find(|s| s.as_str() == keyword)
    }

    /// Inclusive lower bound.
    pub fn min(&self) -> i128 {
        match self {
            Self::Int8 => i8::MIN as i128,
            Self::Int16 => i16::MIN as i128,
            Self::Int32 => i32::MIN as i128,
            Self::Int64 => i64::MIN as i128,
            Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64 => 0,
        }
    }

    /// Inclusive upper bound.
    pub fn max(&self) -> i128 {
        match self {
            Self::Int8 => i8::MAX as i128,
            Self::Int16 => i16::MAX as i128,
            Self::Int32 => i32::MAX as i128,
            Self::Int64 => i64::MAX as i128,
            Self::Uint8 => u8::MAX as i128,
            Self::Uint16 => u16::MAX as i128,
            Self::Uint32 => u32::MAX as i128,
            Self::Uint64 => u64::MAX as i128,
        }
    }

    /// Whether `value` is representable in this storage kind.
    pub fn contains(&self, value: i128) -> bool {
        (self.min()..=self.max()).contains(&value)
    }

    /// Whether the kind is signed.
    pub fn is_signed(&self) -> bool {
        self.min() < 0
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageType {
    type Err = LumosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_keyword(s).ok_or_else(|| LumosError::UnknownKeyword {
            kind: "enum storage type",
            value: s.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn primitive_count_matches() {
        assert_eq!(Primitive::all().len(), PRIMITIVE_COUNT);
    }

    #[test]
    fn storage_count_matches() {
        assert_eq!(StorageType::all().len(), STORAGE_TYPE_COUNT);
    }

    #[test]
    fn primitive_keywords_round_trip() {
        for p in Primitive::all() {
            assert_eq!(Primitive::from_keyword(p.as_str()), Some(*p));
            assert_eq!(p.as_str().parse::<Primitive>().unwrap(), *p);
        }
    }

    #[test]
    fn unknown_primitive_rejected() {
        assert_eq!(Primitive::from_keyword("float16"), None);
        assert!("Vector3".parse::<Primitive>().is_err());
    }

    #[test]
    fn integer_primitives_map_to_storage() {
        assert_eq!(Primitive::Uint16.as_storage(), Some(StorageType::Uint16));
        assert_eq!(Primitive::Float32.as_storage(), None);
        assert_eq!(Primitive::String.as_storage(), None);
    }

    #[test]
    fn storage_default_is_int32() {
        assert_eq!(StorageType::default(), StorageType::Int32);
    }

    #[test]
    fn storage_bounds_extremes() {
        assert_eq!(StorageType::Int8.min(), -128);
        assert_eq!(StorageType::Int8.max(), 127);
        assert_eq!(StorageType::Uint64.max(), 18_446_744_073_709_551_615);
        assert_eq!(StorageType::Int64.min(), -9_223_372_036_854_775_808);
        assert!(!StorageType::Uint8.is_signed());
        assert!(StorageType::Int16.is_signed());
    }

    #[test]
    fn float_is_not_a_storage_type() {
        assert!(StorageType::from_keyword("float32").is_none());
        assert!("float32".parse::<StorageType>().is_err());
    }

    proptest! {
        /// A value is contained iff it lies within [min, max].
        #[test]
        fn contains_agrees_with_bounds(idx in 0usize..STORAGE_TYPE_COUNT, value in any::<i64>()) {
            let storage = StorageType::all()[idx];
            let v = value as i128;
            prop_assert_eq!(storage.contains(v), v >= storage.min() && v <= storage.max());
        }

        /// One past either bound is never contained.
        #[test]
        fn just_outside_bounds_rejected(idx in 0usize..STORAGE_TYPE_COUNT) {
            let storage = StorageType::all()[idx];
            prop_assert!(!storage.contains(storage.min() - 1));
            prop_assert!(!storage.contains(storage.max() + 1));
            prop_assert!(storage.contains(storage.min()));
            prop_assert!(storage.contains(storage.max()));
        }
    }
}
