//! Primitive type catalog and per-architecture size/alignment table.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::arch::Architecture;

/// Size and alignment of a type in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeInfo {
    pub size: u32,
    pub align: u32,
}

impl TypeInfo {
    const fn new(size: u32, align: u32) -> Self {
        Self { size, align }
    }
}

/// Closed catalog of field types understood by the layout engine.
///
/// Composite-looking types (`string`, `slice`, `interface`, ...) are opaque:
/// only their header size matters, never their element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Bool,
    Byte,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Rune,
    Int32,
    Uint32,
    Float32,
    Int,
    Uint,
    Int64,
    Uint64,
    Float64,
    Uintptr,
    String,
    Pointer,
    Slice,
    Map,
    Chan,
    Interface,
    Func,
}

impl PrimitiveType {
    /// Every catalog entry, in picker order
    pub const ALL: [Self; 23] = [
        Self::Bool,
        Self::Byte,
        Self::Int8,
        Self::Uint8,
        Self::Int16,
        Self::Uint16,
        Self::Rune,
        Self::Int32,
        Self::Uint32,
        Self::Float32,
        Self::Int,
        Self::Uint,
        Self::Int64,
        Self::Uint64,
        Self::Float64,
        Self::Uintptr,
        Self::String,
        Self::Pointer,
        Self::Slice,
        Self::Map,
        Self::Chan,
        Self::Interface,
        Self::Func,
    ];

    /// Look up a type by canonical name or display label.
    ///
    /// Returns `None` for anything outside the catalog. Matching is exact:
    /// surrounding whitespace or a different case makes the name unknown.
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "bool" => Self::Bool,
            "byte" => Self::Byte,
            "int8" => Self::Int8,
            "uint8" => Self::Uint8,
            "int16" => Self::Int16,
            "uint16" => Self::Uint16,
            "rune" => Self::Rune,
            "int32" => Self::Int32,
            "uint32" => Self::Uint32,
            "float32" => Self::Float32,
            "int" => Self::Int,
            "uint" => Self::Uint,
            "int64" => Self::Int64,
            "uint64" => Self::Uint64,
            "float64" => Self::Float64,
            "uintptr" => Self::Uintptr,
            "string" => Self::String,
            "pointer" | "*T" => Self::Pointer,
            "slice" | "[]T" => Self::Slice,
            "map" => Self::Map,
            "chan" => Self::Chan,
            "interface" | "interface{}" => Self::Interface,
            "func" => Self::Func,
            _ => return None,
        };
        Some(ty)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Rune => "rune",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Float32 => "float32",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
            Self::Float64 => "float64",
            Self::Uintptr => "uintptr",
            Self::String => "string",
            Self::Pointer => "pointer",
            Self::Slice => "slice",
            Self::Map => "map",
            Self::Chan => "chan",
            Self::Interface => "interface",
            Self::Func => "func",
        }
    }

    /// Label shown to users (`*T`, `[]T`, `interface{}` for the generic shapes)
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pointer => "*T",
            Self::Slice => "[]T",
            Self::Interface => "interface{}",
            other => other.name(),
        }
    }

    /// Size and alignment on `arch`
    pub const fn info(self, arch: Architecture) -> TypeInfo {
        let word = arch.word_size();
        match self {
            Self::Bool | Self::Byte | Self::Int8 | Self::Uint8 => TypeInfo::new(1, 1),
            Self::Int16 | Self::Uint16 => TypeInfo::new(2, 2),
            Self::Rune | Self::Int32 | Self::Uint32 | Self::Float32 => TypeInfo::new(4, 4),
            // 64-bit scalars are only word-aligned on 32-bit targets
            Self::Int64 | Self::Uint64 | Self::Float64 => TypeInfo::new(8, word),
            Self::Int
            | Self::Uint
            | Self::Uintptr
            | Self::Pointer
            | Self::Map
            | Self::Chan
            | Self::Func => TypeInfo::new(word, word),
            // data pointer + length
            Self::String => TypeInfo::new(2 * word, word),
            // type pointer + data pointer
            Self::Interface => TypeInfo::new(2 * word, word),
            // data pointer + length + capacity
            Self::Slice => TypeInfo::new(3 * word, word),
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Size and alignment of a named type on `arch`, or `None` for unknown names.
pub fn size_and_align_of(type_name: &str, arch: Architecture) -> Option<TypeInfo> {
    PrimitiveType::from_name(type_name).map(|ty| ty.info(arch))
}
