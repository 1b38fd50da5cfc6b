//! Block templates and how the bridge finds them.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, LazyLock};

use markdown_weaver_escape::{FmtWriter, escape_html};
use regex::{Captures, Regex};

use crate::bridge::BlockBridge;
use crate::error::TemplateError;
use crate::schema::to_text;

/// `{{ attributes.key }}` or `{{ context.key }}`.
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*(?P<scope>context|attributes)\.(?P<key>[A-Za-z0-9_-]+)\s*\}\}")
        .expect("static regex")
});

/// Produces a block's markup.
///
/// Templates read their data through the bridge accessors and write into `out`. The
/// output is buffered by the caller; nothing reaches the page until the template
/// returns successfully.
pub trait BlockTemplate {
    fn render(&self, bridge: &BlockBridge, out: &mut String) -> Result<(), TemplateError>;
}

impl<F> BlockTemplate for F
where
    F: Fn(&BlockBridge, &mut String) -> Result<(), TemplateError>,
{
    fn render(&self, bridge: &BlockBridge, out: &mut String) -> Result<(), TemplateError> {
        self(bridge, out)
    }
}

/// Pins down closure signatures so they can be used as templates.
pub fn from_fn<F>(f: F) -> F
where
    F: Fn(&BlockBridge, &mut String) -> Result<(), TemplateError>,
{
    f
}

/// Resolves the opaque template reference passed to `render_block`.
pub trait TemplateResolver {
    fn resolve(&self, template_ref: &str) -> Option<Arc<dyn BlockTemplate>>;
}

#[derive(Default, Clone)]
pub struct TemplateMap {
    templates: HashMap<String, Arc<dyn BlockTemplate>>,
}

impl TemplateMap {
    pub fn insert(
        &mut self,
        template_ref: impl Into<String>,
        template: impl BlockTemplate + 'static,
    ) -> &mut Self {
        self.templates.insert(template_ref.into(), Arc::new(template));
        self
    }
}

impl fmt::Debug for TemplateMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.templates.keys()).finish()
    }
}

impl TemplateResolver for TemplateMap {
    fn resolve(&self, template_ref: &str) -> Option<Arc<dyn BlockTemplate>> {
        self.templates.get(template_ref).cloned()
    }
}

/// Template files under a root directory, referenced by relative path.
#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    root: PathBuf,
}

impl DirectoryTemplates {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl TemplateResolver for DirectoryTemplates {
    /// Only plain relative paths resolve. Absolute paths and `..` segments are
    /// rejected so lookups stay under the root.
    fn resolve(&self, template_ref: &str) -> Option<Arc<dyn BlockTemplate>> {
        let relative = Path::new(template_ref);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            tracing::debug!(template = %template_ref, "template path escapes root");
            return None;
        }
        let path = self.root.join(relative);
        match std::fs::read_to_string(&path) {
            Ok(source) => Some(Arc::new(PlaceholderTemplate::new(source))),
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "template not readable");
                None
            }
        }
    }
}

/// Markup with `{{ attributes.key }}` / `{{ context.key }}` placeholders.
///
/// Substituted values are HTML-escaped; missing keys render as nothing. The result
/// goes through [`BlockBridge::render`], so it is wrapped like any other block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderTemplate {
    source: String,
}

impl PlaceholderTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    fn substitute<'s>(&'s self, bridge: &BlockBridge) -> Cow<'s, str> {
        let context = bridge.context(None);
        let attributes = bridge.attributes(None);
        PLACEHOLDER_RE.replace_all(&self.source, |caps: &Captures<'_>| {
            let scope = match &caps["scope"] {
                "context" => &context,
                _ => &attributes,
            };
            let mut escaped = String::new();
            if let Some(value) = scope.get(&caps["key"]) {
                escape_html(FmtWriter(&mut escaped), &to_text(value)).ok();
            }
            escaped
        })
    }
}

impl BlockTemplate for PlaceholderTemplate {
    fn render(&self, bridge: &BlockBridge, out: &mut String) -> Result<(), TemplateError> {
        let html = self.substitute(bridge);
        out.push_str(&bridge.render(&html, None, None));
        Ok(())
    }
}
