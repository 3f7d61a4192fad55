//! End-to-end checks through the public facade: definition file in, layout,
//! optimization, cache-line view and export document out.

use chrono::{TimeZone, Utc};
use memviz::input::load_definitions;
use memviz::{
    AnalyzerConfig, Architecture, ExportFormat, LayoutError, LayoutOptions, MemoryLayout,
    UnknownTypePolicy, optimize_with,
};
use std::io::Write;

const DEFINITIONS: &str = r#"[
  {
    "name": "Rectangle",
    "fields": [
      { "name": "Visible", "type": "bool" },
      { "name": "X", "type": "float64" },
      { "name": "Y", "type": "float64" },
      { "name": "Color", "type": "uint32" }
    ]
  },
  {
    "name": "Document",
    "fields": [
      { "name": "Meta", "type": "*T" },
      { "name": "Title", "type": "string" },
      { "name": "Content", "type": "[]T" },
      { "name": "Published", "type": "bool" },
      { "type": "Metadata" }
    ]
  }
]"#;

fn definitions_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(DEFINITIONS.as_bytes()).unwrap();
    file
}

#[test]
fn test_layout_from_file() {
    let file = definitions_file();
    let defs = load_definitions(file.path()).unwrap();
    let memory = MemoryLayout::analyze(&defs, Architecture::Amd64, &LayoutOptions::default())
        .unwrap();

    let rect = memory.get("Rectangle").unwrap();
    // Visible@0, pad 7, X@8, Y@16, Color@24, tail pad 4
    assert_eq!(rect.total_size(), 32);
    assert_eq!(rect.total_padding(), 11);

    let doc = memory.get("Document").unwrap();
    // Meta 8 + Title 16 + Content 24 + Published 1, tail pad 7; unknown type skipped
    assert_eq!(doc.total_size(), 56);
    assert_eq!(doc.layout.field_count(), 4);
}

#[test]
fn test_same_definitions_on_386() {
    let file = definitions_file();
    let defs = load_definitions(file.path()).unwrap();
    let memory =
        MemoryLayout::analyze(&defs, Architecture::I386, &LayoutOptions::default()).unwrap();

    // Visible@0, pad 3, X@4, Y@12, Color@20
    assert_eq!(memory.get("Rectangle").unwrap().total_size(), 24);
    // Meta 4 + Title 8 + Content 12 + Published 1, tail pad 3
    assert_eq!(memory.get("Document").unwrap().total_size(), 28);
}

#[test]
fn test_optimize_rectangle() {
    let defs = memviz::input::parse_definitions(DEFINITIONS).unwrap();
    let result = optimize_with(&defs[0].fields, Architecture::Amd64, &LayoutOptions::default())
        .unwrap();
    assert_eq!(result.optimized.total_size, 24);
    assert_eq!(result.bytes_saved, 8);
    assert_eq!(
        result.reordered_field_names,
        vec!["X", "Y", "Color", "Visible"]
    );
    assert_eq!(result.savings_percent(), 25);
}

#[test]
fn test_strict_config_rejects_unknown_field() {
    let defs = memviz::input::parse_definitions(DEFINITIONS).unwrap();
    let config = AnalyzerConfig {
        unknown_types: UnknownTypePolicy::Strict,
        ..Default::default()
    };
    let err = MemoryLayout::analyze(&defs, config.architecture, &config.layout_options())
        .unwrap_err();
    assert_eq!(
        err,
        LayoutError::UnknownType {
            field: "field5".to_string(),
            type_name: "Metadata".to_string(),
        }
    );
}

#[test]
fn test_export_document() {
    let defs = memviz::input::parse_definitions(DEFINITIONS).unwrap();
    let memory =
        MemoryLayout::analyze(&defs, Architecture::Arm64, &LayoutOptions::default()).unwrap();
    let timestamp = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    let export = ExportFormat::from_memory_layout(&memory, timestamp);

    assert_eq!(export.architecture, Architecture::Arm64);
    assert_eq!(export.exported_at, "2025-01-02T03:04:05.000Z");
    let rect = &export.structs[0];
    assert_eq!(rect.padding_percentage, 34);
    assert_eq!(rect.fields[0].padding_after, 7);
    assert_eq!(rect.fields[3].padding_after, 4);
    assert_eq!(export.structs[1].fields[0].type_name, "pointer");
}

#[test]
fn test_cache_lines_for_large_struct() {
    let json = r#"{"name":"Wide","fields":[
        {"name":"a","type":"slice"},
        {"name":"b","type":"slice"},
        {"name":"c","type":"string"},
        {"name":"d","type":"string"}
    ]}"#;
    let defs = memviz::input::parse_definitions(json).unwrap();
    let memory =
        MemoryLayout::analyze(&defs, Architecture::Amd64, &LayoutOptions::default()).unwrap();
    let wide = &memory.structs[0];

    // a@0..24, b@24..48, c@48..64, d@64..80
    assert_eq!(wide.total_size(), 80);
    assert_eq!(wide.cache_lines_crossed(), 2);
    assert!(wide.hot_fields().is_empty());
    assert_eq!(wide.cache.lines[1].fields, vec!["d"]);
    assert_eq!(wide.cache.lines[1].end_offset, 80);
}
