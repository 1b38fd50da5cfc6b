use serde::{Deserialize, Serialize};

/// The environment a block is being rendered in.
///
/// Exactly one mode is active for a render cycle. New modes must be added here and
/// to both policy matches below.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    /// The host's own component-tree renderer.
    #[default]
    Native,
    /// A page-assembly tool invoking `render_block` directly.
    Bridge,
    /// The server-side block preview endpoint.
    RestPreview,
    /// The editor's live preview.
    EditorPreview,
}

impl RenderMode {
    /// Whether rendered markup needs an explicit directive pass afterwards.
    ///
    /// The native renderer runs directives itself; every other host does not.
    pub const fn requires_directive_processing(self) -> bool {
        match self {
            RenderMode::Native => false,
            RenderMode::Bridge | RenderMode::RestPreview | RenderMode::EditorPreview => true,
        }
    }

    /// Whether front-end resources must be enqueued by hand.
    pub const fn requires_manual_asset_enqueue(self) -> bool {
        match self {
            RenderMode::Bridge => true,
            RenderMode::Native | RenderMode::RestPreview | RenderMode::EditorPreview => false,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            RenderMode::Native => "native",
            RenderMode::Bridge => "bridge",
            RenderMode::RestPreview => "rest-preview",
            RenderMode::EditorPreview => "editor-preview",
        }
    }
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [RenderMode; 4] = [
        RenderMode::Native,
        RenderMode::Bridge,
        RenderMode::RestPreview,
        RenderMode::EditorPreview,
    ];

    #[test]
    fn only_native_skips_directives() {
        for mode in ALL {
            assert_eq!(
                mode.requires_directive_processing(),
                mode != RenderMode::Native,
                "{mode}"
            );
        }
    }

    #[test]
    fn only_bridge_enqueues_manually() {
        for mode in ALL {
            assert_eq!(
                mode.requires_manual_asset_enqueue(),
                mode == RenderMode::Bridge,
                "{mode}"
            );
        }
    }
}
