//! The render orchestrator.
//!
//! [`BlockBridge`] holds at most one active [`RenderContext`]: the one belonging to
//! the bridged render currently in progress. Render cycles are strictly sequential,
//! so the slot is a plain `RefCell` and the bridge is not `Sync`. Hosts that render
//! concurrently need one bridge per render thread.
//!
//! `render_block` must not be re-entered. A template that calls `render_block` for a
//! child block gets [`BridgeError::NestedRender`] and the parent's context stays in place.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::ValueMap;
use crate::assets::enqueue_frontend_assets;
use crate::config::BridgeConfig;
use crate::context::RenderContext;
use crate::detect::{AmbientSignals, ModeDetector};
use crate::error::BridgeError;
use crate::host::{BridgeHost, NativeHandle};
use crate::mode::RenderMode;
use crate::template::TemplateResolver;
use crate::wrapper::HtmlWrapper;

type Slot = RefCell<Option<Rc<RenderContext<'static>>>>;

pub struct BlockBridge {
    host: BridgeHost,
    templates: Arc<dyn TemplateResolver>,
    config: BridgeConfig,
    detector: ModeDetector,
    signals: AmbientSignals,
    active: Slot,
}

/// Clears the active slot when dropped, including on early return and unwinding.
struct ActiveSlot<'a> {
    slot: &'a Slot,
}

impl<'a> ActiveSlot<'a> {
    fn acquire(slot: &'a Slot, ctx: Rc<RenderContext<'static>>) -> Self {
        *slot.borrow_mut() = Some(ctx);
        Self { slot }
    }
}

impl Drop for ActiveSlot<'_> {
    fn drop(&mut self) {
        self.slot.borrow_mut().take();
    }
}

impl BlockBridge {
    pub fn new(
        host: BridgeHost,
        templates: Arc<dyn TemplateResolver>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            host,
            templates,
            detector: config.detector(),
            config,
            signals: AmbientSignals::default(),
            active: RefCell::new(None),
        }
    }

    /// Use the given request signals for mode detection.
    pub fn with_signals(mut self, signals: AmbientSignals) -> Self {
        self.signals = signals;
        self
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The mode of the current request, ignoring any bridged render in progress.
    pub fn ambient_mode(&self) -> RenderMode {
        self.detector.detect(false, &self.signals)
    }

    /// Render `block_name` with the template behind `template_ref`.
    ///
    /// Returns `Ok(None)` without doing anything if the block type is not registered
    /// or the template does not resolve. Otherwise the block's front-end assets are
    /// enqueued and the template's buffered output is returned, after the directive
    /// pass when the block needs one.
    ///
    /// The directive pass runs on the whole buffered output. A template that already
    /// wrapped its markup with [`Self::render`] has had that markup processed once
    /// there, so interactive markup goes through the processor twice.
    ///
    /// The active context is released before this returns, whatever the outcome. If
    /// the template fails, its partial output is discarded and the error is returned.
    pub fn render_block(
        &self,
        block_name: &str,
        template_ref: &str,
        context: &ValueMap,
        attributes: &ValueMap,
    ) -> Result<Option<String>, BridgeError> {
        let _span = tracing::debug_span!("render_block", block = %block_name).entered();

        if let Some(outer) = self.active_context() {
            return Err(BridgeError::NestedRender {
                outer: SmolStr::new(outer.block_name()),
                inner: SmolStr::new(block_name),
            });
        }

        let Some(ctx) =
            RenderContext::from_bridge(&*self.host.registry, block_name, context, attributes)
        else {
            tracing::debug!("block type not registered, skipping");
            return Ok(None);
        };
        let Some(template) = self.templates.resolve(template_ref) else {
            tracing::debug!(template = %template_ref, "template not found, skipping");
            return Ok(None);
        };

        if ctx.mode().requires_manual_asset_enqueue() {
            enqueue_frontend_assets(ctx.block_type(), &*self.host.assets);
        }

        let ctx = Rc::new(ctx);
        let _slot = ActiveSlot::acquire(&self.active, ctx.clone());

        let mut buffer = String::new();
        if let Err(source) = template.render(self, &mut buffer) {
            tracing::warn!(error = %source, "block template failed");
            return Err(BridgeError::Template {
                block: SmolStr::new(block_name),
                source,
            });
        }

        if ctx.requires_directive_processing() {
            Ok(Some(self.host.directives.process(&buffer)))
        } else {
            Ok(Some(buffer))
        }
    }

    /// The context of the bridged render in progress, if any.
    pub fn active_context(&self) -> Option<Rc<RenderContext<'static>>> {
        self.active.borrow().clone()
    }

    /// Context data for the block being rendered.
    ///
    /// Prefers the active bridged render, then the native handle, else empty.
    pub fn context(&self, native: Option<&dyn NativeHandle>) -> ValueMap {
        if let Some(active) = self.active_context() {
            active.context().clone()
        } else if let Some(handle) = native {
            handle.context().clone()
        } else {
            ValueMap::new()
        }
    }

    /// Attributes for the block being rendered. Same precedence as [`Self::context`].
    pub fn attributes(&self, native: Option<&dyn NativeHandle>) -> ValueMap {
        if let Some(active) = self.active_context() {
            active.attributes().clone()
        } else if let Some(handle) = native {
            handle.attributes().clone()
        } else {
            ValueMap::new()
        }
    }

    /// Wrap block markup for the current mode and run directives if needed.
    ///
    /// With neither an active bridged render nor a native handle, `html` comes back
    /// unchanged.
    pub fn render(
        &self,
        html: &str,
        native: Option<&dyn NativeHandle>,
        extra_attrs: Option<&ValueMap>,
    ) -> String {
        if let Some(active) = self.active_context() {
            self.finish(html, &active, extra_attrs)
        } else if let Some(handle) = native {
            let ctx = RenderContext::from_native(handle, &self.detector, &self.signals);
            self.finish(html, &ctx, extra_attrs)
        } else {
            html.to_owned()
        }
    }

    fn finish(&self, html: &str, ctx: &RenderContext<'_>, extra_attrs: Option<&ValueMap>) -> String {
        let empty = ValueMap::new();
        let wrapped = HtmlWrapper::new(&*self.host.wrapper, &self.config.interactivity_attribute)
            .wrap(html, ctx, extra_attrs.unwrap_or(&empty));
        if ctx.requires_directive_processing() {
            self.host.directives.process(&wrapped)
        } else {
            wrapped
        }
    }

    pub fn is_bridge_context(&self) -> bool {
        self.active
            .borrow()
            .as_ref()
            .is_some_and(|ctx| ctx.is_bridge())
    }

    /// Most recent published item of `content_type`, for editor previews only.
    pub fn get_preview_example_post(&self, content_type: &str) -> Option<u64> {
        if self.ambient_mode() != RenderMode::EditorPreview {
            return None;
        }
        self.host.content.latest_published(content_type)
    }
}
