use thiserror::Error;

/// Errors produced while computing or analyzing a layout
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Only raised under [`crate::UnknownTypePolicy::Strict`]
    #[error("field `{field}` has unknown type `{type_name}`")]
    UnknownType { field: String, type_name: String },

    #[error("cache line size must be a non-zero power of two, got {0}")]
    InvalidLineSize(u32),

    #[error("struct size overflows 32 bits at field `{field}`")]
    SizeOverflow { field: String },

    /// Internal logic error: a computed layout broke one of its own invariants
    #[error("layout invariant violated: {0}")]
    InvariantViolation(String),
}
