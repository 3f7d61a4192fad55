//! Reading struct definitions from JSON

use anyhow::{Context, Result};
use memviz_layout::StructDefinition;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// An input document holds either one struct or a list of them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InputDocument {
    Many(Vec<StructDefinition>),
    One(StructDefinition),
}

/// Parse one struct definition or an array of them.
pub fn parse_definitions(json: &str) -> Result<Vec<StructDefinition>> {
    let document: InputDocument =
        serde_json::from_str(json).context("input is not a struct definition or a list of them")?;
    Ok(match document {
        InputDocument::Many(defs) => defs,
        InputDocument::One(def) => vec![def],
    })
}

pub fn load_definitions(path: &Path) -> Result<Vec<StructDefinition>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read input file {}", path.display()))?;
    parse_definitions(&content).with_context(|| format!("failed to parse {}", path.display()))
}
