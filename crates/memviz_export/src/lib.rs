//! Stable interchange format for computed layouts
//!
//! The JSON field names produced here (`totalSize`, `paddingPercentage`,
//! `paddingAfter`, ...) are consumed by external tooling and must not change.

use chrono::{DateTime, SecondsFormat, Utc};
use memviz_arch::Architecture;
use memviz_layout::{Layout, LayoutEntry, MemoryLayout, rounded_percent};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One field of an exported struct
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub offset: u32,
    pub size: u32,
    pub alignment: u32,
    /// Padding bytes directly after this field, 0 if the next entry is a field
    pub padding_after: u32,
}

/// One exported struct
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportStruct {
    pub name: String,
    pub total_size: u32,
    pub alignment: u32,
    pub total_padding: u32,
    /// `round(total_padding / total_size * 100)`, 0 for an empty struct
    pub padding_percentage: u32,
    pub fields: Vec<ExportField>,
}

impl ExportStruct {
    pub fn from_layout(name: impl Into<String>, layout: &Layout) -> Self {
        let fields = layout
            .entries
            .iter()
            .enumerate()
            .filter_map(|(idx, entry)| match entry {
                LayoutEntry::Field {
                    name,
                    ty,
                    offset,
                    size,
                    align,
                } => Some(ExportField {
                    name: name.clone(),
                    type_name: ty.name().to_string(),
                    offset: *offset,
                    size: *size,
                    alignment: *align,
                    padding_after: layout.padding_after(idx),
                }),
                LayoutEntry::Padding { .. } => None,
            })
            .collect();

        Self {
            name: name.into(),
            total_size: layout.total_size,
            alignment: layout.max_align,
            total_padding: layout.padding_bytes,
            padding_percentage: rounded_percent(layout.padding_bytes, layout.total_size),
            fields,
        }
    }
}

/// Top-level export document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFormat {
    pub structs: Vec<ExportStruct>,
    pub architecture: Architecture,
    /// RFC 3339 UTC timestamp with millisecond precision
    pub exported_at: String,
}

impl ExportFormat {
    pub fn from_memory_layout(memory: &MemoryLayout, timestamp: DateTime<Utc>) -> Self {
        to_export_format(
            memory
                .structs
                .iter()
                .map(|info| (info.name.as_str(), &info.layout)),
            memory.architecture,
            timestamp,
        )
    }

    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ExportError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Restructure named layouts into the export shape.
///
/// Nothing is written anywhere; persisting the result is up to the caller.
pub fn to_export_format<'a>(
    structs: impl IntoIterator<Item = (&'a str, &'a Layout)>,
    arch: Architecture,
    timestamp: DateTime<Utc>,
) -> ExportFormat {
    let structs = structs
        .into_iter()
        .map(|(name, layout)| {
            if layout.arch != arch {
                warn!(
                    name,
                    layout_arch = %layout.arch,
                    export_arch = %arch,
                    "exporting layout computed for a different architecture"
                );
            }
            ExportStruct::from_layout(name, layout)
        })
        .collect();

    ExportFormat {
        structs,
        architecture: arch,
        exported_at: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use memviz_layout::{Field, LayoutOptions, StructDefinition, compute_layout};

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    fn padded_layout() -> Layout {
        compute_layout(
            &[
                Field::new("a", "bool"),
                Field::new("b", "int64"),
                Field::new("c", "bool"),
            ],
            Architecture::Amd64,
        )
        .unwrap()
    }

    #[test]
    fn test_export_struct_fields() {
        let layout = padded_layout();
        let export = to_export_format([("Padded", &layout)], Architecture::Amd64, timestamp());

        assert_eq!(export.exported_at, "2024-03-01T12:30:00.000Z");
        assert_eq!(export.architecture, Architecture::Amd64);

        let s = &export.structs[0];
        assert_eq!(s.name, "Padded");
        assert_eq!(s.total_size, 24);
        assert_eq!(s.alignment, 8);
        assert_eq!(s.total_padding, 14);
        assert_eq!(s.padding_percentage, 58);

        let padding_after: Vec<(&str, u32, u32)> = s
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.offset, f.padding_after))
            .collect();
        assert_eq!(
            padding_after,
            vec![("a", 0, 7), ("b", 8, 0), ("c", 16, 7)]
        );
        assert_eq!(s.fields[1].type_name, "int64");
    }

    #[test]
    fn test_empty_struct_percentage_is_zero() {
        let layout = compute_layout(&[], Architecture::I386).unwrap();
        let s = ExportStruct::from_layout("Empty", &layout);
        assert_eq!(s.total_size, 0);
        assert_eq!(s.padding_percentage, 0);
        assert!(s.fields.is_empty());
    }

    #[test]
    fn test_json_field_names_are_stable() {
        let layout = padded_layout();
        let export = to_export_format([("Padded", &layout)], Architecture::I386, timestamp());
        let value: serde_json::Value =
            serde_json::from_str(&export.to_json_pretty().unwrap()).unwrap();

        assert_eq!(value["architecture"], "386");
        assert_eq!(value["exportedAt"], "2024-03-01T12:30:00.000Z");
        let s = &value["structs"][0];
        for key in [
            "name",
            "totalSize",
            "alignment",
            "totalPadding",
            "paddingPercentage",
            "fields",
        ] {
            assert!(s.get(key).is_some(), "missing {key}");
        }
        let f = &s["fields"][0];
        for key in ["name", "type", "offset", "size", "alignment", "paddingAfter"] {
            assert!(f.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_from_memory_layout_round_trips() {
        let defs = vec![
            StructDefinition::new("A", vec![Field::new("x", "int32"), Field::new("y", "int8")]),
            StructDefinition::new("B", vec![Field::new("s", "string")]),
        ];
        let memory =
            MemoryLayout::analyze(&defs, Architecture::Arm64, &LayoutOptions::default()).unwrap();
        let export = ExportFormat::from_memory_layout(&memory, timestamp());
        assert_eq!(export.structs.len(), 2);
        assert_eq!(export.structs[0].total_size, 8);
        assert_eq!(export.structs[0].fields[1].padding_after, 3);

        let parsed = ExportFormat::from_json(&export.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed, export);
    }
}
