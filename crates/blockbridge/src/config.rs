use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::block_type::BlockTypeDescriptor;
use crate::detect::{DEFAULT_PREVIEW_ENDPOINT_FRAGMENT, ModeDetector};
use crate::error::ConfigError;
use crate::memory::InMemoryRegistry;
use crate::wrapper::DEFAULT_INTERACTIVITY_ATTRIBUTE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BridgeConfig {
    /// Attribute the wrapper adds to the root of interactive blocks.
    pub interactivity_attribute: String,
    /// Request path fragment of the server-side block preview endpoint.
    pub preview_endpoint_fragment: String,
    /// Class prefix used when deriving a block's wrapper class.
    pub block_class_prefix: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            interactivity_attribute: DEFAULT_INTERACTIVITY_ATTRIBUTE.to_owned(),
            preview_endpoint_fragment: DEFAULT_PREVIEW_ENDPOINT_FRAGMENT.to_owned(),
            block_class_prefix: "wp-block-".to_owned(),
        }
    }
}

impl BridgeConfig {
    pub fn detector(&self) -> ModeDetector {
        ModeDetector::new(self.preview_endpoint_fragment.clone())
    }
}

/// Bridge configuration plus the block types to register.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub config: BridgeConfig,
    #[serde(default)]
    pub blocks: Vec<BlockTypeDescriptor>,
}

impl Manifest {
    pub fn load<L: Loader + ?Sized>(loader: &L) -> Result<Self, ConfigError> {
        loader.load()
    }

    pub fn registry(&self) -> InMemoryRegistry {
        self.blocks.iter().cloned().collect()
    }
}

/// Source of a [`Manifest`].
pub trait Loader {
    fn load(&self) -> Result<Manifest, ConfigError>;
}

/// A manifest file, parsed according to its extension (`.json` or `.toml`).
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Loader for FileStore {
    fn load(&self) -> Result<Manifest, ConfigError> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&std::fs::read_to_string(&self.path)?)?),
            Some("toml") => Ok(toml::from_str(&std::fs::read_to_string(&self.path)?)?),
            _ => Err(ConfigError::UnsupportedFormat(
                self.path.display().to_string(),
            )),
        }
    }
}

impl Loader for str {
    /// Parse JSON manifest text directly.
    fn load(&self) -> Result<Manifest, ConfigError> {
        Ok(serde_json::from_str(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::BlockTypeRegistry;

    #[test]
    fn defaults_when_empty() {
        let manifest = Manifest::load("{}").unwrap();
        assert_eq!(manifest.config, BridgeConfig::default());
        assert!(manifest.blocks.is_empty());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let manifest = Manifest::load(
            r#"{
                "config": { "preview-endpoint-fragment": "/preview/" },
                "blocks": [{ "name": "acme/card", "usesContext": ["postId"] }]
            }"#,
        )
        .unwrap();
        assert_eq!(manifest.config.preview_endpoint_fragment, "/preview/");
        assert_eq!(
            manifest.config.interactivity_attribute,
            DEFAULT_INTERACTIVITY_ATTRIBUTE
        );
        let registry = manifest.registry();
        assert_eq!(registry.get("acme/card").unwrap().uses_context, ["postId"]);
    }

    #[test]
    fn toml_manifest() {
        let manifest: Manifest = toml::from_str(
            r#"
            [config]
            block-class-prefix = "blk-"

            [[blocks]]
            name = "acme/card"
            viewStyle = "card-view"

            [blocks.attributes.title]
            type = "string"
            default = "Untitled"
            "#,
        )
        .unwrap();
        assert_eq!(manifest.config.block_class_prefix, "blk-");
        assert_eq!(manifest.blocks[0].assets.view_style, ["card-view"]);
        assert_eq!(
            manifest.blocks[0].attributes["title"].default,
            Some(serde_json::json!("Untitled"))
        );
    }

    #[test]
    fn unsupported_extension() {
        let err = FileStore::new("blocks.yaml").load().unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }
}
