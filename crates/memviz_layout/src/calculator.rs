//! Natural-alignment layout calculation
//!
//! Each field is placed at the next offset that is a multiple of its own
//! alignment; the struct size is then rounded up to the largest member
//! alignment.

use memviz_arch::{Architecture, PrimitiveType, TypeInfo};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::cache::CACHE_LINE_SIZE;
use crate::error::LayoutError;
use crate::field::Field;
use crate::layout::{Layout, LayoutEntry};

/// What to do with a field whose type is not in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownTypePolicy {
    /// Leave the field out of the layout entirely
    #[default]
    Permissive,
    /// Fail with [`LayoutError::UnknownType`]
    Strict,
}

impl std::str::FromStr for UnknownTypePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "permissive" | "skip" => Ok(Self::Permissive),
            "strict" | "error" => Ok(Self::Strict),
            _ => Err(format!("Unknown type policy: {s}")),
        }
    }
}

/// Knobs shared by the layout, optimizer and cache-line entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutOptions {
    pub unknown_types: UnknownTypePolicy,
    pub cache_line_size: u32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            unknown_types: UnknownTypePolicy::Permissive,
            cache_line_size: CACHE_LINE_SIZE,
        }
    }
}

impl LayoutOptions {
    pub fn strict() -> Self {
        Self {
            unknown_types: UnknownTypePolicy::Strict,
            ..Default::default()
        }
    }
}

/// Reported as the field name when the trailing padding overflows
const TAIL_PADDING: &str = "<struct tail>";

/// Running state of a layout under construction
struct LayoutBuilder {
    arch: Architecture,
    entries: Vec<LayoutEntry>,
    offset: u32,
    max_align: u32,
    data_bytes: u32,
    padding_bytes: u32,
}

impl LayoutBuilder {
    fn new(arch: Architecture, capacity: usize) -> Self {
        Self {
            arch,
            entries: Vec::with_capacity(capacity * 2 + 1),
            offset: 0,
            max_align: 1,
            data_bytes: 0,
            padding_bytes: 0,
        }
    }

    /// Insert padding so the current offset becomes a multiple of `align`
    fn pad_to(&mut self, align: u32, context: &str) -> Result<(), LayoutError> {
        let pad = (align - self.offset % align) % align;
        if pad == 0 {
            return Ok(());
        }
        let end = self
            .offset
            .checked_add(pad)
            .ok_or_else(|| LayoutError::SizeOverflow {
                field: context.to_string(),
            })?;
        trace!(offset = self.offset, size = pad, "padding");
        self.entries.push(LayoutEntry::Padding {
            offset: self.offset,
            size: pad,
        });
        self.offset = end;
        self.padding_bytes += pad;
        Ok(())
    }

    fn push_field(
        &mut self,
        name: String,
        ty: PrimitiveType,
        info: TypeInfo,
    ) -> Result<(), LayoutError> {
        self.max_align = self.max_align.max(info.align);
        self.pad_to(info.align, &name)?;

        let end = self
            .offset
            .checked_add(info.size)
            .ok_or_else(|| LayoutError::SizeOverflow {
                field: name.clone(),
            })?;
        trace!(field = %name, %ty, offset = self.offset, size = info.size, "field");
        self.entries.push(LayoutEntry::Field {
            name,
            ty,
            offset: self.offset,
            size: info.size,
            align: info.align,
        });
        self.data_bytes += info.size;
        self.offset = end;
        Ok(())
    }

    fn finish(mut self) -> Result<Layout, LayoutError> {
        let max_align = self.max_align;
        self.pad_to(max_align, TAIL_PADDING)?;

        let layout = Layout {
            arch: self.arch,
            entries: self.entries,
            total_size: self.offset,
            data_bytes: self.data_bytes,
            padding_bytes: self.padding_bytes,
            max_align,
        };
        layout.validate()?;
        Ok(layout)
    }
}

/// Layout of `fields` in the given order, skipping unknown types.
pub fn compute_layout(fields: &[Field], arch: Architecture) -> Result<Layout, LayoutError> {
    compute_layout_with(fields, arch, &LayoutOptions::default())
}

/// Layout of `fields` in the given order under explicit options.
///
/// Blank field names become `field{N}` after their position in `fields`.
pub fn compute_layout_with(
    fields: &[Field],
    arch: Architecture,
    options: &LayoutOptions,
) -> Result<Layout, LayoutError> {
    let mut builder = LayoutBuilder::new(arch, fields.len());

    for (idx, field) in fields.iter().enumerate() {
        let name = field.display_name(idx);
        let Some(ty) = PrimitiveType::from_name(&field.type_name) else {
            match options.unknown_types {
                UnknownTypePolicy::Permissive => {
                    debug!(field = %name, type_name = %field.type_name, "skipping field with unknown type");
                    continue;
                }
                UnknownTypePolicy::Strict => {
                    return Err(LayoutError::UnknownType {
                        field: name,
                        type_name: field.type_name.clone(),
                    });
                }
            }
        };
        builder.push_field(name, ty, ty.info(arch))?;
    }

    let layout = builder.finish()?;
    debug!(
        %arch,
        fields = layout.field_count(),
        size = layout.total_size,
        padding = layout.padding_bytes,
        align = layout.max_align,
        "computed layout"
    );
    Ok(layout)
}
