//! Picks the active [`RenderMode`] from request signals.

use serde::{Deserialize, Serialize};

use crate::mode::RenderMode;

/// Path fragment of the server-side block preview endpoint.
pub const DEFAULT_PREVIEW_ENDPOINT_FRAGMENT: &str = "/block-renderer/";

/// Request-level signals the host exposes about the current render.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbientSignals {
    /// Set by the host while the editor is rendering a live preview.
    #[serde(default)]
    pub edit_preview: bool,
    /// Path (and optionally query) of the current request, if there is one.
    #[serde(default)]
    pub request_path: Option<String>,
}

impl AmbientSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_edit_preview(mut self, edit_preview: bool) -> Self {
        self.edit_preview = edit_preview;
        self
    }

    pub fn with_request_path(mut self, path: impl Into<String>) -> Self {
        self.request_path = Some(path.into());
        self
    }
}

/// Mode detection with a configurable preview endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeDetector {
    preview_endpoint_fragment: String,
}

impl Default for ModeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_ENDPOINT_FRAGMENT)
    }
}

impl ModeDetector {
    pub fn new(preview_endpoint_fragment: impl Into<String>) -> Self {
        Self {
            preview_endpoint_fragment: preview_endpoint_fragment.into(),
        }
    }

    /// Decide the mode. Never fails; anything unrecognised is [`RenderMode::Native`].
    ///
    /// An explicit bridge request wins over every ambient signal. Otherwise the edit
    /// preview signal is checked before the request path.
    pub fn detect(&self, explicit_bridge: bool, signals: &AmbientSignals) -> RenderMode {
        let mode = if explicit_bridge {
            RenderMode::Bridge
        } else if signals.edit_preview {
            RenderMode::EditorPreview
        } else if self.is_preview_request(signals) {
            RenderMode::RestPreview
        } else {
            RenderMode::Native
        };
        tracing::debug!(%mode, explicit_bridge, "detected render mode");
        mode
    }

    fn is_preview_request(&self, signals: &AmbientSignals) -> bool {
        // An empty fragment would match every request.
        !self.preview_endpoint_fragment.is_empty()
            && signals
                .request_path
                .as_deref()
                .is_some_and(|path| path.contains(&self.preview_endpoint_fragment))
    }
}

/// [`ModeDetector::detect`] with the default preview endpoint.
pub fn detect(explicit_bridge: bool, signals: &AmbientSignals) -> RenderMode {
    ModeDetector::default().detect(explicit_bridge, signals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview_path() -> String {
        format!("/api{}acme/gallery?context=edit", DEFAULT_PREVIEW_ENDPOINT_FRAGMENT)
    }

    #[test]
    fn defaults_to_native() {
        assert_eq!(detect(false, &AmbientSignals::new()), RenderMode::Native);
        let signals = AmbientSignals::new().with_request_path("/blog/hello-world");
        assert_eq!(detect(false, &signals), RenderMode::Native);
    }

    #[test]
    fn explicit_bridge_wins() {
        let signals = AmbientSignals::new()
            .with_edit_preview(true)
            .with_request_path(preview_path());
        assert_eq!(detect(true, &signals), RenderMode::Bridge);
    }

    #[test]
    fn edit_preview_beats_preview_endpoint() {
        let signals = AmbientSignals::new()
            .with_edit_preview(true)
            .with_request_path(preview_path());
        assert_eq!(detect(false, &signals), RenderMode::EditorPreview);
    }

    #[test]
    fn preview_endpoint_path() {
        let signals = AmbientSignals::new().with_request_path(preview_path());
        assert_eq!(detect(false, &signals), RenderMode::RestPreview);
    }

    #[test]
    fn custom_fragment() {
        let detector = ModeDetector::new("/preview/");
        let signals = AmbientSignals::new().with_request_path("/x/preview/acme");
        assert_eq!(detector.detect(false, &signals), RenderMode::RestPreview);
        assert_eq!(
            detector.detect(false, &AmbientSignals::new().with_request_path(preview_path())),
            RenderMode::Native
        );
    }

    #[test]
    fn empty_fragment_never_matches() {
        let detector = ModeDetector::new("");
        let signals = AmbientSignals::new().with_request_path("/anything");
        assert_eq!(detector.detect(false, &signals), RenderMode::Native);
    }
}
