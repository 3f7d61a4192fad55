//! Target architectures and the primitive type table used by the layout engine.

pub mod arch;
pub mod types;

pub use crate::arch::{ArchError, Architecture};
pub use crate::types::{PrimitiveType, TypeInfo, size_and_align_of};
