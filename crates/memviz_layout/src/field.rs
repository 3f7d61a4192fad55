use serde::{Deserialize, Serialize};

/// A named, typed struct field as supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    /// Display name; blank names are replaced by `field{N}` (1-based position)
    #[serde(default)]
    pub name: String,

    /// Type name from the primitive catalog; anything else is an unknown type
    #[serde(rename = "type", alias = "typeName")]
    pub type_name: String,
}

impl Field {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    /// Field with no name yet; it is named after its position when laid out
    pub fn unnamed(type_name: impl Into<String>) -> Self {
        Self::new(String::new(), type_name)
    }

    /// Name shown for this field when it sits at `index` in the input list
    pub fn display_name(&self, index: usize) -> String {
        let name = self.name.trim();
        if name.is_empty() {
            format!("field{}", index + 1)
        } else {
            name.to_string()
        }
    }
}

/// Copy of `fields` with every blank name replaced by its positional default.
///
/// Names are fixed here, before any reordering, so a field keeps the same
/// name in the original and the optimized layout.
pub fn with_display_names(fields: &[Field]) -> Vec<Field> {
    fields
        .iter()
        .enumerate()
        .map(|(idx, field)| Field::new(field.display_name(idx), field.type_name.clone()))
        .collect()
}

/// A named struct made of an ordered field list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructDefinition {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl StructDefinition {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }
}
