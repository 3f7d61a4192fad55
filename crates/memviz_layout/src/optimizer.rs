//! Field reordering to shrink a struct
//!
//! Fields are stable-sorted by descending alignment, then descending size.
//! With power-of-two alignments and sizes that are multiples of their
//! alignment this removes every inter-field gap, leaving only tail padding.

use memviz_arch::{Architecture, TypeInfo, size_and_align_of};
use serde::Serialize;
use std::cmp::Reverse;
use tracing::debug;

use crate::calculator::{LayoutOptions, compute_layout_with};
use crate::error::LayoutError;
use crate::field::{Field, with_display_names};
use crate::layout::Layout;

/// Sort key used for fields whose type is not in the catalog
const UNKNOWN_TYPE_KEY: TypeInfo = TypeInfo { size: 1, align: 1 };

/// Original and reordered layouts of the same field set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptimizationResult {
    pub original: Layout,
    pub optimized: Layout,
    pub bytes_saved: u32,
    /// Names of the laid-out fields in their suggested order
    pub reordered_field_names: Vec<String>,
}

impl OptimizationResult {
    /// Whether the input order is already as small as the suggested one
    pub const fn is_already_optimal(&self) -> bool {
        self.bytes_saved == 0
    }

    /// Savings as a rounded percentage of the original size
    pub fn savings_percent(&self) -> u32 {
        rounded_percent(self.bytes_saved, self.original.total_size)
    }
}

/// `round(part / whole * 100)` with halves rounded up, 0 when `whole` is 0
pub fn rounded_percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let (part, whole) = (u64::from(part), u64::from(whole));
    ((part * 200 + whole) / (2 * whole)) as u32
}

/// `fields` (with display names resolved) in suggested order
pub fn optimized_order(fields: &[Field], arch: Architecture) -> Vec<Field> {
    let mut sorted = with_display_names(fields);
    // sort_by_key is stable: equal keys keep their input order
    sorted.sort_by_key(|field| {
        let info = size_and_align_of(&field.type_name, arch).unwrap_or(UNKNOWN_TYPE_KEY);
        (Reverse(info.align), Reverse(info.size))
    });
    sorted
}

/// Compare the input order against the suggested order.
pub fn optimize(fields: &[Field], arch: Architecture) -> Result<OptimizationResult, LayoutError> {
    optimize_with(fields, arch, &LayoutOptions::default())
}

pub fn optimize_with(
    fields: &[Field],
    arch: Architecture,
    options: &LayoutOptions,
) -> Result<OptimizationResult, LayoutError> {
    let original = compute_layout_with(fields, arch, options)?;
    let optimized = compute_layout_with(&optimized_order(fields, arch), arch, options)?;

    let bytes_saved = original
        .total_size
        .checked_sub(optimized.total_size)
        .ok_or_else(|| {
            LayoutError::InvariantViolation(format!(
                "reordering grew the struct from {} to {} bytes",
                original.total_size, optimized.total_size
            ))
        })?;
    let reordered_field_names = optimized
        .field_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    debug!(
        %arch,
        original = original.total_size,
        optimized = optimized.total_size,
        bytes_saved,
        "optimized field order"
    );

    Ok(OptimizationResult {
        original,
        optimized,
        bytes_saved,
        reordered_field_names,
    })
}
