//! Cache-line breakdown of a computed layout

use serde::Serialize;
use tracing::debug;

use crate::error::LayoutError;
use crate::layout::{Layout, LayoutEntry};

/// Cache line size of most current CPUs, in bytes
pub const CACHE_LINE_SIZE: u32 = 64;

/// Occupancy of one cache line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheLineInfo {
    /// 0-based line index
    pub line_number: u32,
    pub start_offset: u32,
    /// Exclusive; the last line stops at the struct size
    pub end_offset: u32,
    /// Names of fields with at least one byte in this line
    pub fields: Vec<String>,
    pub bytes_used: u32,
    pub bytes_padding: u32,
}

impl CacheLineInfo {
    pub const fn len(&self) -> u32 {
        self.end_offset - self.start_offset
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which cache lines a single field touches
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldCacheInfo {
    pub name: String,
    pub start_line: u32,
    pub end_line: u32,
    pub crosses_line_boundary: bool,
}

impl FieldCacheInfo {
    /// Line span of `size` bytes at `offset`; `size` must be non-zero
    pub fn for_span(name: impl Into<String>, offset: u32, size: u32, line_size: u32) -> Self {
        let start_line = offset / line_size;
        let end_line = (offset + size.max(1) - 1) / line_size;
        Self {
            name: name.into(),
            start_line,
            end_line,
            crosses_line_boundary: start_line != end_line,
        }
    }
}

/// Per-line and per-field cache view of a layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheLineAnalysis {
    pub line_size: u32,
    pub lines: Vec<CacheLineInfo>,
    pub fields: Vec<FieldCacheInfo>,
}

impl CacheLineAnalysis {
    /// Fields that straddle a line boundary
    pub fn hot_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.crosses_line_boundary)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Number of cache lines the struct occupies
    pub fn lines_spanned(&self) -> usize {
        self.lines.len()
    }
}

/// Break `layout` into `line_size`-byte cache lines.
pub fn analyze_cache_lines(
    layout: &Layout,
    line_size: u32,
) -> Result<CacheLineAnalysis, LayoutError> {
    if line_size == 0 || !line_size.is_power_of_two() {
        return Err(LayoutError::InvalidLineSize(line_size));
    }

    let line_count = layout.total_size.div_ceil(line_size);
    let mut lines: Vec<CacheLineInfo> = (0..line_count)
        .map(|line| {
            let start_offset = line * line_size;
            CacheLineInfo {
                line_number: line,
                start_offset,
                end_offset: start_offset.saturating_add(line_size).min(layout.total_size),
                fields: Vec::new(),
                bytes_used: 0,
                bytes_padding: 0,
            }
        })
        .collect();
    let mut fields = Vec::with_capacity(layout.entries.len());

    for entry in &layout.entries {
        let span = FieldCacheInfo::for_span(
            entry.name().unwrap_or_default(),
            entry.offset(),
            entry.size(),
            line_size,
        );

        for line in span.start_line..=span.end_line {
            let info = lines.get_mut(line as usize).ok_or_else(|| {
                LayoutError::InvariantViolation(format!(
                    "entry at offset {} reaches past the struct end",
                    entry.offset()
                ))
            })?;
            let overlap =
                entry.end().min(info.end_offset) - entry.offset().max(info.start_offset);
            match entry {
                LayoutEntry::Field { name, .. } => {
                    info.bytes_used += overlap;
                    info.fields.push(name.clone());
                }
                LayoutEntry::Padding { .. } => info.bytes_padding += overlap,
            }
        }

        if !entry.is_padding() {
            fields.push(span);
        }
    }

    let analysis = CacheLineAnalysis {
        line_size,
        lines,
        fields,
    };
    debug!(
        lines = analysis.lines_spanned(),
        hot = analysis.hot_fields().len(),
        "analyzed cache lines"
    );
    Ok(analysis)
}
