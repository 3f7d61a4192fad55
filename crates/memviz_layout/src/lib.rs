//! Struct memory-layout engine
//!
//! Computes natural-alignment layouts for an ordered field list, suggests a
//! smaller field order and breaks a layout down into cache lines. Every entry
//! point is a pure function of its inputs.

pub mod analysis;
pub mod cache;
pub mod calculator;
pub mod error;
pub mod field;
pub mod layout;
pub mod optimizer;

pub use analysis::{MemoryLayout, StructInfo, analyze_struct};
pub use cache::{
    CACHE_LINE_SIZE, CacheLineAnalysis, CacheLineInfo, FieldCacheInfo, analyze_cache_lines,
};
pub use calculator::{LayoutOptions, UnknownTypePolicy, compute_layout, compute_layout_with};
pub use error::LayoutError;
pub use field::{Field, StructDefinition};
pub use layout::{BlockKind, DisplayBlock, Layout, LayoutEntry, consolidate_entries};
pub use optimizer::{
    OptimizationResult, optimize, optimize_with, optimized_order, rounded_percent,
};
