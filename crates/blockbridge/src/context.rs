use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::ValueMap;
use crate::block_type::BlockTypeDescriptor;
use crate::detect::{AmbientSignals, ModeDetector};
use crate::host::{BlockTypeRegistry, NativeHandle};
use crate::mode::RenderMode;
use crate::schema::{apply_defaults_and_cast, filter_context};

/// Everything a block's template may see during one render cycle.
///
/// Built once at the start of a cycle and never mutated. `context` only holds keys the
/// block type declared in `uses_context`, and `attributes` only holds keys from its
/// attribute schema.
#[derive(Clone)]
pub struct RenderContext<'h> {
    block_name: SmolStr,
    mode: RenderMode,
    context: ValueMap,
    attributes: ValueMap,
    block_type: Arc<BlockTypeDescriptor>,
    native_handle: Option<&'h dyn NativeHandle>,
}

impl<'h> RenderContext<'h> {
    /// Context for a block the host renderer is rendering itself.
    ///
    /// The handle's context and attributes are trusted and not re-validated.
    pub fn from_native(
        handle: &'h dyn NativeHandle,
        detector: &ModeDetector,
        signals: &AmbientSignals,
    ) -> Self {
        Self {
            block_name: SmolStr::new(handle.name()),
            mode: detector.detect(false, signals),
            context: handle.context().clone(),
            attributes: handle.attributes().clone(),
            block_type: handle.block_type(),
            native_handle: Some(handle),
        }
    }
}

impl RenderContext<'static> {
    /// Context for a bridged render. `None` if `block_name` is not registered.
    pub fn from_bridge(
        registry: &dyn BlockTypeRegistry,
        block_name: &str,
        raw_context: &ValueMap,
        raw_attributes: &ValueMap,
    ) -> Option<Self> {
        let block_type = registry.get(block_name)?;
        Some(Self {
            block_name: SmolStr::new(block_name),
            mode: RenderMode::Bridge,
            context: filter_context(&block_type.uses_context, raw_context),
            attributes: apply_defaults_and_cast(&block_type.attributes, raw_attributes),
            block_type,
            native_handle: None,
        })
    }
}

impl<'h> RenderContext<'h> {
    pub fn block_name(&self) -> &str {
        &self.block_name
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn context(&self) -> &ValueMap {
        &self.context
    }

    pub fn attributes(&self) -> &ValueMap {
        &self.attributes
    }

    pub fn block_type(&self) -> &BlockTypeDescriptor {
        &self.block_type
    }

    pub fn native_handle(&self) -> Option<&'h dyn NativeHandle> {
        self.native_handle
    }

    pub fn supports_interactivity(&self) -> bool {
        self.block_type.supports_interactivity()
    }

    pub fn is_bridge(&self) -> bool {
        self.mode == RenderMode::Bridge
    }

    pub fn is_native(&self) -> bool {
        self.native_handle.is_some()
    }

    /// Directives only run for interactive blocks, and only where the mode needs it.
    pub fn requires_directive_processing(&self) -> bool {
        self.supports_interactivity() && self.mode.requires_directive_processing()
    }
}

impl fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("block_name", &self.block_name)
            .field("mode", &self.mode)
            .field("context", &self.context)
            .field("attributes", &self.attributes)
            .field("native", &self.is_native())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_type::Interactivity;
    use crate::memory::{InMemoryRegistry, StaticHandle};
    use crate::schema::AttributeDefinition;
    use serde_json::{Value, json};

    fn object(value: Value) -> ValueMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn descriptor(interactive: bool) -> BlockTypeDescriptor {
        let mut descriptor = BlockTypeDescriptor::new("acme/card");
        descriptor.uses_context = vec!["postId".into()];
        descriptor.attributes.insert(
            "title".to_owned(),
            AttributeDefinition::new("string").with_default("Untitled"),
        );
        descriptor.supports.interactivity = Interactivity::Flag(interactive);
        descriptor
    }

    #[test]
    fn bridge_context_filters_and_defaults() {
        let registry = InMemoryRegistry::from_iter([descriptor(false)]);
        let ctx = RenderContext::from_bridge(
            &registry,
            "acme/card",
            &object(json!({ "postId": 7, "extra": "x" })),
            &ValueMap::new(),
        )
        .unwrap();

        assert_eq!(Value::Object(ctx.context().clone()), json!({ "postId": 7 }));
        assert_eq!(
            Value::Object(ctx.attributes().clone()),
            json!({ "title": "Untitled" })
        );
        assert!(ctx.is_bridge());
        assert!(!ctx.is_native());
        assert!(ctx.mode().requires_directive_processing());
        assert!(!ctx.requires_directive_processing());
    }

    #[test]
    fn bridge_context_unregistered_block() {
        let registry = InMemoryRegistry::default();
        assert!(
            RenderContext::from_bridge(&registry, "acme/missing", &ValueMap::new(), &ValueMap::new())
                .is_none()
        );
    }

    #[test]
    fn native_context_trusts_handle() {
        let handle = StaticHandle::new(Arc::new(descriptor(true)))
            .with_context(object(json!({ "postId": 3, "hostOnly": true })))
            .with_attributes(object(json!({ "title": 9 })));
        let ctx = RenderContext::from_native(
            &handle,
            &ModeDetector::default(),
            &AmbientSignals::default(),
        );

        // Host values are not filtered or cast again.
        assert_eq!(ctx.context()["hostOnly"], json!(true));
        assert_eq!(ctx.attributes()["title"], json!(9));
        assert_eq!(ctx.mode(), RenderMode::Native);
        assert!(ctx.is_native());
        assert!(!ctx.is_bridge());
        assert!(ctx.supports_interactivity());
        assert!(!ctx.requires_directive_processing());
    }

    #[test]
    fn native_context_in_editor_preview() {
        let handle = StaticHandle::new(Arc::new(descriptor(true)));
        let signals = AmbientSignals::new().with_edit_preview(true);
        let ctx = RenderContext::from_native(&handle, &ModeDetector::default(), &signals);
        assert_eq!(ctx.mode(), RenderMode::EditorPreview);
        assert!(ctx.is_native());
        assert!(ctx.requires_directive_processing());
    }
}
