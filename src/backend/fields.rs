//! Decoding of request `fields` and `sections` into Connect models.
//!
//! Request entries arrive as loosely typed JSON. Each entry is checked
//! against a closed schema before anything is sent upstream; the first bad
//! entry fails the whole request with a [`PluginError::Validation`] naming
//! its position, e.g. `fields[2]`.

use serde::Deserialize;
use serde_json::Value;

use crate::connect::{FieldPurpose, FieldType, GeneratorRecipe, ItemField, ItemSection, SectionRef};
use crate::errors::{PluginError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSection {
    #[serde(default)]
    id: String,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawField {
    #[serde(default)]
    id: String,
    #[serde(default)]
    label: String,
    #[serde(rename = "type", default)]
    field_type: Option<String>,
    #[serde(default)]
    purpose: Option<String>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    section: Option<SectionRef>,
    #[serde(default)]
    generate: bool,
    #[serde(default)]
    recipe: Option<GeneratorRecipe>,
}

/// Decode the `sections` list of a request, in declaration order.
pub fn decode_sections(value: Option<&Value>) -> Result<Vec<ItemSection>> {
    entries(value, "sections")?
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let name = format!("sections[{}]", i);
            let raw: RawSection = from_object(entry, &name)?;
            Ok(ItemSection { id: raw.id, label: raw.label })
        })
        .collect()
}

/// Decode the `fields` list of a request, in declaration order.
pub fn decode_fields(value: Option<&Value>) -> Result<Vec<ItemField>> {
    entries(value, "fields")?
        .iter()
        .enumerate()
        .map(|(i, entry)| decode_field(entry, &format!("fields[{}]", i)))
        .collect()
}

fn decode_field(entry: &Value, name: &str) -> Result<ItemField> {
    let raw: RawField = from_object(entry, name)?;

    let field_type = match raw.field_type.as_deref() {
        None | Some("") => FieldType::String,
        Some(t) => parse_field_type(t)
            .ok_or_else(|| PluginError::validation(name, format!("unknown field type '{}'", t)))?,
    };

    let purpose = match raw.purpose.as_deref() {
        None | Some("") => None,
        Some(p) => Some(parse_purpose(p).ok_or_else(|| {
            PluginError::validation(name, format!("unknown field purpose '{}'", p))
        })?),
    };

    Ok(ItemField {
        id: raw.id,
        section: raw.section,
        field_type,
        purpose,
        label: raw.label,
        value: raw.value,
        generate: raw.generate,
        recipe: raw.recipe,
        entropy: None,
    })
}

fn parse_field_type(value: &str) -> Option<FieldType> {
    match serde_json::from_value::<FieldType>(Value::String(value.to_ascii_uppercase())) {
        Ok(FieldType::Unknown) | Err(_) => None,
        Ok(t) => Some(t),
    }
}

fn parse_purpose(value: &str) -> Option<FieldPurpose> {
    serde_json::from_value(Value::String(value.to_ascii_uppercase())).ok()
}

fn entries<'a>(value: Option<&'a Value>, name: &str) -> Result<&'a [Value]> {
    match value {
        None | Some(Value::Null) => Ok(&[][..]),
        Some(Value::Array(list)) => Ok(list.as_slice()),
        Some(_) => Err(PluginError::validation(name, "expected a list of objects")),
    }
}

fn from_object<T: serde::de::DeserializeOwned>(entry: &Value, name: &str) -> Result<T> {
    if !entry.is_object() {
        return Err(PluginError::validation(name, "expected an object"));
    }
    T::deserialize(entry).map_err(|e| PluginError::validation(name, e.to_string()))
}
