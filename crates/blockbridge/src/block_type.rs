//! Block type descriptors as published by the host registry.
//!
//! The field names follow the host's block metadata format, so a descriptor can be
//! deserialized straight from a block's metadata file.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use smol_str::SmolStr;

use crate::schema::{AttributeSchema, is_truthy};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTypeDescriptor {
    /// Registered name, e.g. `acme/gallery`.
    pub name: SmolStr,
    /// Context keys this block consumes from its ancestors, in declaration order.
    #[serde(default)]
    pub uses_context: Vec<SmolStr>,
    #[serde(default)]
    pub attributes: AttributeSchema,
    #[serde(default)]
    pub supports: Supports,
    #[serde(flatten)]
    pub assets: AssetIds,
}

impl BlockTypeDescriptor {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn supports_interactivity(&self) -> bool {
        self.supports.interactivity.is_enabled()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supports {
    #[serde(default)]
    pub interactivity: Interactivity,
}

/// Interactivity support: either a plain flag or a settings object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Interactivity {
    Flag(bool),
    Settings(Value),
}

impl Default for Interactivity {
    fn default() -> Self {
        Interactivity::Flag(false)
    }
}

impl Interactivity {
    /// A `true` flag or any non-empty settings value enables interactivity.
    pub fn is_enabled(&self) -> bool {
        match self {
            Interactivity::Flag(enabled) => *enabled,
            Interactivity::Settings(settings) => is_truthy(settings),
        }
    }
}

/// Resource identifiers a block declares, grouped by where they load.
///
/// Each field accepts either a single identifier or a list in block metadata.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIds {
    /// Scripts loaded in the editor and on the front end.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub script: Vec<SmolStr>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub editor_script: Vec<SmolStr>,
    /// Front-end only scripts.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub view_script: Vec<SmolStr>,
    /// Front-end only ES modules.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub view_script_module: Vec<SmolStr>,
    /// Styles loaded in the editor and on the front end.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub style: Vec<SmolStr>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub editor_style: Vec<SmolStr>,
    /// Front-end only styles.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub view_style: Vec<SmolStr>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(SmolStr),
    Many(Vec<SmolStr>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<SmolStr>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(id) => vec![id],
        OneOrMany::Many(ids) => ids,
    })
}
