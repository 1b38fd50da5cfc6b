//! Capabilities the bridge needs from its host.
//!
//! Every collaborator outside the render pipeline is reached through one of these
//! traits. [`crate::memory`] has in-memory implementations of all of them.

use std::fmt;
use std::sync::Arc;

use crate::ValueMap;
use crate::block_type::BlockTypeDescriptor;

/// Lookup of registered block types.
pub trait BlockTypeRegistry {
    fn get(&self, name: &str) -> Option<Arc<BlockTypeDescriptor>>;
}

/// The host renderer's handle for the block it is currently rendering.
///
/// Context and attributes exposed here were already filtered and validated by the
/// host and are used as-is.
pub trait NativeHandle {
    fn name(&self) -> &str;
    fn context(&self) -> &ValueMap;
    fn attributes(&self) -> &ValueMap;
    fn block_type(&self) -> Arc<BlockTypeDescriptor>;
}

/// Resource loader. Every method is safe to call repeatedly with the same identifier.
pub trait AssetLoader {
    fn enqueue_script(&self, id: &str);
    fn enqueue_script_module(&self, id: &str);
    fn enqueue_style(&self, id: &str);
}

/// The post-render directive pass.
pub trait DirectiveProcessor {
    fn process(&self, html: &str) -> String;
}

/// The host's own convention for writing block wrapper attributes.
pub trait NativeWrapper {
    /// Attribute string (without surrounding whitespace) for the wrapper of `handle`.
    fn wrapper_attributes(&self, handle: &dyn NativeHandle, extra: &ValueMap) -> String;
}

/// Content lookups used by editor previews.
pub trait ContentStore {
    /// Identifier of the most recently published item of `content_type`.
    fn latest_published(&self, content_type: &str) -> Option<u64>;
}

/// All host capabilities the bridge talks to.
#[derive(Clone)]
pub struct BridgeHost {
    pub registry: Arc<dyn BlockTypeRegistry>,
    pub assets: Arc<dyn AssetLoader>,
    pub directives: Arc<dyn DirectiveProcessor>,
    pub wrapper: Arc<dyn NativeWrapper>,
    pub content: Arc<dyn ContentStore>,
}

impl fmt::Debug for BridgeHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeHost").finish_non_exhaustive()
    }
}

impl<F> DirectiveProcessor for F
where
    F: Fn(&str) -> String,
{
    fn process(&self, html: &str) -> String {
        self(html)
    }
}
