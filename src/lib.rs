//! memviz: struct memory-layout engine
//!
//! Facade over the workspace crates plus the input helpers shared by the
//! `memviz` binary.

pub mod input;

pub use memviz_arch::{ArchError, Architecture, PrimitiveType, TypeInfo, size_and_align_of};
pub use memviz_config::{AnalyzerConfig, ConfigError};
pub use memviz_export::{ExportError, ExportField, ExportFormat, ExportStruct, to_export_format};
pub use memviz_layout::{
    BlockKind, CACHE_LINE_SIZE, CacheLineAnalysis, CacheLineInfo, DisplayBlock, Field,
    FieldCacheInfo, Layout, LayoutEntry, LayoutError, LayoutOptions, MemoryLayout,
    OptimizationResult, StructDefinition, StructInfo, UnknownTypePolicy, analyze_cache_lines,
    analyze_struct, compute_layout, compute_layout_with, consolidate_entries, optimize,
    optimize_with, optimized_order, rounded_percent,
};
