//! Outer wrapper markup for rendered blocks.

use std::fmt::{self, Write};

use markdown_weaver_escape::{FmtWriter, escape_html};
use serde_json::Value;

use crate::ValueMap;
use crate::context::RenderContext;
use crate::host::NativeWrapper;
use crate::schema::to_text;

/// Attribute marking the root element of an interactive block.
pub const DEFAULT_INTERACTIVITY_ATTRIBUTE: &str = "data-wp-interactive";

pub struct HtmlWrapper<'a> {
    native: &'a dyn NativeWrapper,
    interactivity_attribute: &'a str,
}

impl<'a> HtmlWrapper<'a> {
    pub fn new(native: &'a dyn NativeWrapper, interactivity_attribute: &'a str) -> Self {
        Self {
            native,
            interactivity_attribute,
        }
    }

    /// Wrap `html` in a `<div>` carrying `extra_attrs`.
    ///
    /// Native renders defer to the host's wrapper convention. Everything else gets
    /// its attributes written directly.
    pub fn wrap(&self, html: &str, ctx: &RenderContext<'_>, extra_attrs: &ValueMap) -> String {
        let mut attrs = extra_attrs.clone();
        if ctx.supports_interactivity() {
            attrs.insert(
                self.interactivity_attribute.to_owned(),
                Value::String(ctx.block_name().to_owned()),
            );
        }

        let attributes = match ctx.native_handle() {
            Some(handle) => self.native.wrapper_attributes(handle, &attrs),
            None => attribute_string(&attrs),
        };

        let mut out = String::with_capacity(html.len() + attributes.len() + 12);
        out.push_str("<div");
        if !attributes.is_empty() {
            out.push(' ');
            out.push_str(&attributes);
        }
        out.push('>');
        out.push_str(html);
        out.push_str("</div>");
        out
    }
}

/// Write `attrs` as a space-separated HTML attribute string.
///
/// `true` writes the bare attribute name and `false` leaves the attribute out. Any
/// other value is written as its escaped textual form. Names that could break out of
/// the tag are skipped.
pub fn write_attributes<W: Write>(out: &mut W, attrs: &ValueMap) -> fmt::Result {
    let mut first = true;
    for (name, value) in attrs {
        if !is_valid_attribute_name(name) {
            tracing::debug!(attribute = %name, "skipping invalid attribute name");
            continue;
        }
        if matches!(value, Value::Bool(false)) {
            continue;
        }
        if !first {
            out.write_char(' ')?;
        }
        first = false;
        out.write_str(name)?;
        if matches!(value, Value::Bool(true)) {
            continue;
        }
        out.write_str("=\"")?;
        escape_html(FmtWriter(&mut *out), &to_text(value))?;
        out.write_char('"')?;
    }
    Ok(())
}

/// [`write_attributes`] into a new `String`.
pub fn attribute_string(attrs: &ValueMap) -> String {
    let mut out = String::new();
    write_attributes(&mut out, attrs).ok();
    out
}

fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().any(|c| {
            c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '>' | '<' | '/' | '=')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_type::{BlockTypeDescriptor, Interactivity};
    use crate::memory::{ClassNameWrapper, InMemoryRegistry, StaticHandle};
    use crate::{AmbientSignals, detect::ModeDetector};
    use serde_json::json;
    use std::sync::Arc;

    fn attrs(value: Value) -> ValueMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn descriptor(interactive: bool) -> BlockTypeDescriptor {
        let mut descriptor = BlockTypeDescriptor::new("acme/counter");
        descriptor.supports.interactivity = Interactivity::Flag(interactive);
        descriptor
    }

    fn bridge_ctx(interactive: bool) -> RenderContext<'static> {
        let registry = InMemoryRegistry::from_iter([descriptor(interactive)]);
        RenderContext::from_bridge(&registry, "acme/counter", &ValueMap::new(), &ValueMap::new())
            .unwrap()
    }

    fn wrap(html: &str, ctx: &RenderContext<'_>, extra: Value) -> String {
        let native = ClassNameWrapper::default();
        HtmlWrapper::new(&native, DEFAULT_INTERACTIVITY_ATTRIBUTE).wrap(html, ctx, &attrs(extra))
    }

    #[test]
    fn escapes_attribute_values() {
        let out = wrap("x", &bridge_ctx(false), json!({ "data-x": "a\"b<c&d>" }));
        insta::assert_snapshot!(out, @r#"<div data-x="a&quot;b&lt;c&amp;d&gt;">x</div>"#);
    }

    #[test]
    fn boolean_attributes() {
        let out = wrap(
            "x",
            &bridge_ctx(false),
            json!({ "hidden": false, "checked": true, "id": "c" }),
        );
        insta::assert_snapshot!(out, @r#"<div checked id="c">x</div>"#);
    }

    #[test]
    fn non_string_values_use_text_form() {
        let out = wrap("", &bridge_ctx(false), json!({ "data-n": 3, "data-o": null }));
        insta::assert_snapshot!(out, @r#"<div data-n="3" data-o=""></div>"#);
    }

    #[test]
    fn no_attributes() {
        let out = wrap("<p>hi</p>", &bridge_ctx(false), json!({}));
        insta::assert_snapshot!(out, @"<div><p>hi</p></div>");
    }

    #[test]
    fn interactive_blocks_get_marker() {
        let out = wrap("<p>hi</p>", &bridge_ctx(true), json!({ "id": "c" }));
        insta::assert_snapshot!(out, @r#"<div id="c" data-wp-interactive="acme/counter"><p>hi</p></div>"#);
    }

    #[test]
    fn breakout_names_are_skipped() {
        let out = wrap(
            "x",
            &bridge_ctx(false),
            json!({ "onload=\"alert(1)\"": "y", "a b": "z", "ok": "1" }),
        );
        insta::assert_snapshot!(out, @r#"<div ok="1">x</div>"#);
    }

    #[test]
    fn native_defers_to_host_convention() {
        let handle = StaticHandle::new(Arc::new(descriptor(true)));
        let ctx = RenderContext::from_native(
            &handle,
            &ModeDetector::default(),
            &AmbientSignals::default(),
        );
        let out = wrap("<p>hi</p>", &ctx, json!({ "checked": true }));
        insta::assert_snapshot!(out, @r#"<div class="wp-block-acme-counter" checked data-wp-interactive="acme/counter"><p>hi</p></div>"#);
    }
}
