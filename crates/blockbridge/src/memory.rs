//! In-memory host capabilities.
//!
//! Used by the CLI, and as test doubles wherever a real host is not available.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::ValueMap;
use crate::block_type::BlockTypeDescriptor;
use crate::config::BridgeConfig;
use crate::host::{
    AssetLoader, BlockTypeRegistry, BridgeHost, ContentStore, DirectiveProcessor, NativeHandle,
    NativeWrapper,
};
use crate::schema::to_text;
use crate::wrapper::attribute_string;

#[derive(Debug, Default, Clone)]
pub struct InMemoryRegistry {
    blocks: HashMap<SmolStr, Arc<BlockTypeDescriptor>>,
}

impl InMemoryRegistry {
    /// Register a block type, returning the descriptor it replaced.
    pub fn register(
        &mut self,
        descriptor: BlockTypeDescriptor,
    ) -> Option<Arc<BlockTypeDescriptor>> {
        self.blocks
            .insert(descriptor.name.clone(), Arc::new(descriptor))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl FromIterator<BlockTypeDescriptor> for InMemoryRegistry {
    fn from_iter<T: IntoIterator<Item = BlockTypeDescriptor>>(iter: T) -> Self {
        let mut registry = Self::default();
        for descriptor in iter {
            registry.register(descriptor);
        }
        registry
    }
}

impl BlockTypeRegistry for InMemoryRegistry {
    fn get(&self, name: &str) -> Option<Arc<BlockTypeDescriptor>> {
        self.blocks.get(name).cloned()
    }
}

/// A native render handle with fixed, already-validated data.
#[derive(Debug, Clone)]
pub struct StaticHandle {
    block_type: Arc<BlockTypeDescriptor>,
    context: ValueMap,
    attributes: ValueMap,
}

impl StaticHandle {
    pub fn new(block_type: Arc<BlockTypeDescriptor>) -> Self {
        Self {
            block_type,
            context: ValueMap::new(),
            attributes: ValueMap::new(),
        }
    }

    pub fn with_context(mut self, context: ValueMap) -> Self {
        self.context = context;
        self
    }

    pub fn with_attributes(mut self, attributes: ValueMap) -> Self {
        self.attributes = attributes;
        self
    }
}

impl NativeHandle for StaticHandle {
    fn name(&self) -> &str {
        &self.block_type.name
    }

    fn context(&self) -> &ValueMap {
        &self.context
    }

    fn attributes(&self) -> &ValueMap {
        &self.attributes
    }

    fn block_type(&self) -> Arc<BlockTypeDescriptor> {
        self.block_type.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetKind {
    Script,
    ScriptModule,
    Style,
}

impl AssetKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            AssetKind::Script => "script",
            AssetKind::ScriptModule => "script-module",
            AssetKind::Style => "style",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnqueuedAsset {
    pub kind: AssetKind,
    pub id: SmolStr,
}

/// Records enqueue requests in first-request order, ignoring repeats.
#[derive(Debug, Default)]
pub struct RecordingAssetLoader {
    enqueued: Mutex<Vec<EnqueuedAsset>>,
}

impl RecordingAssetLoader {
    pub fn enqueued(&self) -> Vec<EnqueuedAsset> {
        self.enqueued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, kind: AssetKind, id: &str) {
        let mut enqueued = self.enqueued.lock().unwrap_or_else(PoisonError::into_inner);
        if !enqueued.iter().any(|a| a.kind == kind && a.id == id) {
            enqueued.push(EnqueuedAsset {
                kind,
                id: SmolStr::new(id),
            });
        }
    }
}

impl AssetLoader for RecordingAssetLoader {
    fn enqueue_script(&self, id: &str) {
        self.push(AssetKind::Script, id);
    }

    fn enqueue_script_module(&self, id: &str) {
        self.push(AssetKind::ScriptModule, id);
    }

    fn enqueue_style(&self, id: &str) {
        self.push(AssetKind::Style, id);
    }
}

/// Directive pass that returns markup unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughDirectives;

impl DirectiveProcessor for PassthroughDirectives {
    fn process(&self, html: &str) -> String {
        html.to_owned()
    }
}

/// Native wrapper that adds the block's class name to the supplied attributes.
///
/// `acme/gallery` gets `<prefix>acme-gallery`; blocks in the `core` namespace drop it,
/// so `core/quote` gets `<prefix>quote`.
#[derive(Debug, Clone)]
pub struct ClassNameWrapper {
    prefix: String,
}

impl Default for ClassNameWrapper {
    fn default() -> Self {
        Self::new(BridgeConfig::default().block_class_prefix)
    }
}

impl ClassNameWrapper {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn class_name(&self, block_name: &str) -> String {
        let name = block_name.strip_prefix("core/").unwrap_or(block_name);
        format!("{}{}", self.prefix, name.replace('/', "-"))
    }
}

impl NativeWrapper for ClassNameWrapper {
    fn wrapper_attributes(&self, handle: &dyn NativeHandle, extra: &ValueMap) -> String {
        let mut class = self.class_name(handle.name());
        if let Some(extra_class) = extra.get("class").map(to_text) {
            if !extra_class.is_empty() {
                class.push(' ');
                class.push_str(&extra_class);
            }
        }

        let mut attributes = ValueMap::new();
        attributes.insert("class".to_owned(), class.into());
        for (name, value) in extra {
            if name != "class" {
                attributes.insert(name.clone(), value.clone());
            }
        }

        attribute_string(&attributes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: u64,
    pub content_type: SmolStr,
    pub published: bool,
    /// Publication time, in seconds since the epoch.
    pub published_at: u64,
}

#[derive(Debug, Default, Clone)]
pub struct MemoryContentStore {
    items: Vec<ContentItem>,
}

impl MemoryContentStore {
    pub fn with_item(mut self, item: ContentItem) -> Self {
        self.items.push(item);
        self
    }
}

impl ContentStore for MemoryContentStore {
    fn latest_published(&self, content_type: &str) -> Option<u64> {
        self.items
            .iter()
            .filter(|item| item.published && item.content_type == content_type)
            .max_by_key(|item| (item.published_at, item.id))
            .map(|item| item.id)
    }
}

/// A [`BridgeHost`] made of in-memory parts, plus a handle on its asset loader.
pub fn memory_host(
    registry: InMemoryRegistry,
    config: &BridgeConfig,
) -> (BridgeHost, Arc<RecordingAssetLoader>) {
    let assets = Arc::new(RecordingAssetLoader::default());
    let host = BridgeHost {
        registry: Arc::new(registry),
        assets: assets.clone(),
        directives: Arc::new(PassthroughDirectives),
        wrapper: Arc::new(ClassNameWrapper::new(config.block_class_prefix.clone())),
        content: Arc::new(MemoryContentStore::default()),
    };
    (host, assets)
}
