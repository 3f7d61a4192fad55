//! Computed struct layouts and their display consolidation

use memviz_arch::{Architecture, PrimitiveType};
use serde::Serialize;

use crate::error::LayoutError;

/// One contiguous byte region of a struct
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LayoutEntry {
    Padding {
        offset: u32,
        size: u32,
    },
    Field {
        name: String,
        #[serde(rename = "type")]
        ty: PrimitiveType,
        offset: u32,
        size: u32,
        align: u32,
    },
}

impl LayoutEntry {
    #[inline]
    pub const fn offset(&self) -> u32 {
        match self {
            Self::Padding { offset, .. } | Self::Field { offset, .. } => *offset,
        }
    }

    #[inline]
    pub const fn size(&self) -> u32 {
        match self {
            Self::Padding { size, .. } | Self::Field { size, .. } => *size,
        }
    }

    /// One past the last byte of this entry
    #[inline]
    pub const fn end(&self) -> u32 {
        self.offset() + self.size()
    }

    #[inline]
    pub const fn is_padding(&self) -> bool {
        matches!(self, Self::Padding { .. })
    }

    /// Field name, `None` for padding
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Field { name, .. } => Some(name),
            Self::Padding { .. } => None,
        }
    }
}

/// Byte-level layout of one struct on one architecture
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub arch: Architecture,
    pub entries: Vec<LayoutEntry>,
    pub total_size: u32,
    pub data_bytes: u32,
    pub padding_bytes: u32,
    /// Largest member alignment, 1 for an empty struct
    pub max_align: u32,
}

impl Layout {
    /// Zero-size layout with no entries
    pub const fn empty(arch: Architecture) -> Self {
        Self {
            arch,
            entries: Vec::new(),
            total_size: 0,
            data_bytes: 0,
            padding_bytes: 0,
            max_align: 1,
        }
    }

    /// Field entries in layout order
    pub fn fields(&self) -> impl Iterator<Item = &LayoutEntry> {
        self.entries.iter().filter(|entry| !entry.is_padding())
    }

    pub fn field_count(&self) -> usize {
        self.fields().count()
    }

    /// Field names in layout order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields().filter_map(LayoutEntry::name).collect()
    }

    /// Length of the padding entry directly after `entries[index]`, 0 if none
    pub fn padding_after(&self, index: usize) -> u32 {
        match self.entries.get(index + 1) {
            Some(LayoutEntry::Padding { size, .. }) => *size,
            _ => 0,
        }
    }

    /// Checks the structural invariants every computed layout must satisfy.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.max_align == 0 {
            return Err(LayoutError::InvariantViolation(
                "zero struct alignment".to_string(),
            ));
        }

        let mut cursor = 0u32;
        let mut data = 0u32;
        let mut padding = 0u32;
        for entry in &self.entries {
            if entry.offset() != cursor {
                return Err(LayoutError::InvariantViolation(format!(
                    "entry at offset {} does not follow previous end {cursor}",
                    entry.offset()
                )));
            }
            match entry {
                LayoutEntry::Field {
                    name,
                    offset,
                    size,
                    align,
                    ..
                } => {
                    if *align == 0 || offset % align != 0 {
                        return Err(LayoutError::InvariantViolation(format!(
                            "field `{name}` at offset {offset} is not {align}-byte aligned"
                        )));
                    }
                    data += size;
                }
                LayoutEntry::Padding { size, .. } => padding += size,
            }
            cursor = entry.end();
        }

        if cursor != self.total_size
            || data != self.data_bytes
            || padding != self.padding_bytes
            || self.total_size != self.data_bytes + self.padding_bytes
        {
            return Err(LayoutError::InvariantViolation(format!(
                "totals disagree: size {} = data {} + padding {}, entries cover {cursor}",
                self.total_size, self.data_bytes, self.padding_bytes
            )));
        }
        if self.total_size % self.max_align != 0 {
            return Err(LayoutError::InvariantViolation(format!(
                "size {} is not a multiple of alignment {}",
                self.total_size, self.max_align
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Field,
    Padding,
}

/// A region as drawn by a visualizer; may cover several merged entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayBlock {
    pub kind: BlockKind,
    /// Field name (with one `+` per merged neighbour), empty for padding
    pub label: String,
    /// Field type (of the first field when merged), `None` for padding
    pub ty: Option<PrimitiveType>,
    pub offset: u32,
    pub size: u32,
}

impl From<&LayoutEntry> for DisplayBlock {
    fn from(entry: &LayoutEntry) -> Self {
        let (kind, ty) = match entry {
            LayoutEntry::Padding { .. } => (BlockKind::Padding, None),
            LayoutEntry::Field { ty, .. } => (BlockKind::Field, Some(*ty)),
        };
        Self {
            kind,
            label: entry.name().unwrap_or_default().to_string(),
            ty,
            offset: entry.offset(),
            size: entry.size(),
        }
    }
}

/// Display blocks for `entries`, merging adjacent entries of the same kind
/// when there are more than `max_blocks` of them.
///
/// A merged field block keeps the label and type of its first field, with one
/// `+` appended per field folded into it.
///
/// A single merge pass is made; the result may still exceed `max_blocks`.
pub fn consolidate_entries(entries: &[LayoutEntry], max_blocks: usize) -> Vec<DisplayBlock> {
    if entries.len() <= max_blocks {
        return entries.iter().map(DisplayBlock::from).collect();
    }

    let mut blocks: Vec<DisplayBlock> = Vec::new();
    for entry in entries {
        let block = DisplayBlock::from(entry);
        match blocks.last_mut() {
            Some(last) if last.kind == block.kind => {
                last.size += block.size;
                if block.kind == BlockKind::Field {
                    last.label.push('+');
                }
            }
            _ => blocks.push(block),
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, offset: u32, size: u32) -> LayoutEntry {
        LayoutEntry::Field {
            name: name.to_string(),
            ty: PrimitiveType::Uint8,
            offset,
            size,
            align: 1,
        }
    }

    #[test]
    fn test_entry_accessors() {
        let pad = LayoutEntry::Padding { offset: 3, size: 5 };
        assert_eq!(pad.end(), 8);
        assert!(pad.is_padding());
        assert_eq!(pad.name(), None);
        assert_eq!(field("a", 0, 1).name(), Some("a"));
    }

    #[test]
    fn test_empty_layout_is_valid() {
        let layout = Layout::empty(Architecture::Amd64);
        assert!(layout.validate().is_ok());
        assert_eq!(layout.field_count(), 0);
    }

    #[test]
    fn test_validate_rejects_gap() {
        let layout = Layout {
            arch: Architecture::Amd64,
            entries: vec![field("a", 0, 1), field("b", 2, 1)],
            total_size: 3,
            data_bytes: 2,
            padding_bytes: 1,
            max_align: 1,
        };
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_consolidate_below_limit_is_identity() {
        let entries = vec![field("a", 0, 1), field("b", 1, 1)];
        let blocks = consolidate_entries(&entries, 50);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].label, "b");
        assert_eq!(blocks[1].ty, Some(PrimitiveType::Uint8));
    }

    #[test]
    fn test_consolidate_merges_runs() {
        let entries = vec![
            field("a", 0, 1),
            LayoutEntry::Field {
                name: "b".to_string(),
                ty: PrimitiveType::Bool,
                offset: 1,
                size: 1,
                align: 1,
            },
            field("c", 2, 1),
            LayoutEntry::Padding { offset: 3, size: 1 },
            field("d", 4, 4),
        ];
        let blocks = consolidate_entries(&entries, 2);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].label, "a++");
        assert_eq!(blocks[0].size, 3);
        assert_eq!(blocks[0].ty, Some(PrimitiveType::Uint8));
        assert_eq!(blocks[1].ty, None);
        assert_eq!(blocks[1].kind, BlockKind::Padding);
        assert_eq!(blocks[2].offset, 4);
    }
}
