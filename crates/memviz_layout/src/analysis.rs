//! Whole-struct analysis: layout plus cache-line view, for one or many structs

use memviz_arch::Architecture;
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::cache::{CacheLineAnalysis, analyze_cache_lines};
use crate::calculator::{LayoutOptions, compute_layout_with};
use crate::error::LayoutError;
use crate::field::StructDefinition;
use crate::layout::Layout;

/// Everything computed for a single struct
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructInfo {
    pub name: String,
    pub layout: Layout,
    pub cache: CacheLineAnalysis,
}

impl StructInfo {
    pub const fn total_size(&self) -> u32 {
        self.layout.total_size
    }

    pub const fn total_padding(&self) -> u32 {
        self.layout.padding_bytes
    }

    pub const fn alignment(&self) -> u32 {
        self.layout.max_align
    }

    pub fn cache_lines_crossed(&self) -> usize {
        self.cache.lines_spanned()
    }

    pub fn hot_fields(&self) -> Vec<&str> {
        self.cache.hot_fields()
    }
}

/// Lay out one struct definition and break it into cache lines.
pub fn analyze_struct(
    definition: &StructDefinition,
    arch: Architecture,
    options: &LayoutOptions,
) -> Result<StructInfo, LayoutError> {
    let layout = compute_layout_with(&definition.fields, arch, options)?;
    let cache = analyze_cache_lines(&layout, options.cache_line_size)?;
    Ok(StructInfo {
        name: definition.name.clone(),
        layout,
        cache,
    })
}

/// Analysis of a set of structs on one architecture
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryLayout {
    pub architecture: Architecture,
    pub structs: Vec<StructInfo>,
}

impl MemoryLayout {
    /// Analyze every definition; results keep the input order.
    ///
    /// Definitions are independent, so they are processed in parallel.
    pub fn analyze(
        definitions: &[StructDefinition],
        arch: Architecture,
        options: &LayoutOptions,
    ) -> Result<Self, LayoutError> {
        let structs = definitions
            .par_iter()
            .map(|definition| analyze_struct(definition, arch, options))
            .collect::<Result<Vec<_>, _>>()?;

        info!(%arch, structs = structs.len(), "analyzed struct layouts");
        Ok(Self {
            architecture: arch,
            structs,
        })
    }

    pub fn get(&self, name: &str) -> Option<&StructInfo> {
        self.structs.iter().find(|info| info.name == name)
    }

    pub fn total_padding(&self) -> u64 {
        self.structs
            .iter()
            .map(|info| u64::from(info.total_padding()))
            .sum()
    }
}
