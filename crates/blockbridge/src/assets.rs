//! Front-end resource loading for bridged renders.

use crate::block_type::BlockTypeDescriptor;
use crate::host::AssetLoader;

/// Ask `loader` for every front-end resource `descriptor` declares.
///
/// Requests go out in a fixed order: view script modules, view scripts, shared
/// styles, then view styles. Empty groups are skipped.
pub fn enqueue_frontend_assets(descriptor: &BlockTypeDescriptor, loader: &dyn AssetLoader) {
    let assets = &descriptor.assets;
    for id in &assets.view_script_module {
        tracing::trace!(block = %descriptor.name, %id, "enqueue script module");
        loader.enqueue_script_module(id);
    }
    for id in &assets.view_script {
        tracing::trace!(block = %descriptor.name, %id, "enqueue script");
        loader.enqueue_script(id);
    }
    for id in assets.style.iter().chain(&assets.view_style) {
        tracing::trace!(block = %descriptor.name, %id, "enqueue style");
        loader.enqueue_style(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{AssetKind, EnqueuedAsset, RecordingAssetLoader};

    fn asset(kind: AssetKind, id: &str) -> EnqueuedAsset {
        EnqueuedAsset {
            kind,
            id: id.into(),
        }
    }

    #[test]
    fn enqueues_in_fixed_order() {
        let mut descriptor = BlockTypeDescriptor::new("acme/slider");
        descriptor.assets.view_style = vec!["slider-view".into()];
        descriptor.assets.style = vec!["slider".into(), "base".into()];
        descriptor.assets.view_script = vec!["slider-legacy".into()];
        descriptor.assets.view_script_module = vec!["slider-module".into()];
        // Editor-only resources never load on the front end.
        descriptor.assets.editor_script = vec!["slider-editor".into()];
        descriptor.assets.editor_style = vec!["slider-editor".into()];

        let loader = RecordingAssetLoader::default();
        enqueue_frontend_assets(&descriptor, &loader);

        assert_eq!(
            loader.enqueued(),
            vec![
                asset(AssetKind::ScriptModule, "slider-module"),
                asset(AssetKind::Script, "slider-legacy"),
                asset(AssetKind::Style, "slider"),
                asset(AssetKind::Style, "base"),
                asset(AssetKind::Style, "slider-view"),
            ]
        );
    }

    #[test]
    fn nothing_declared_is_a_no_op() {
        let loader = RecordingAssetLoader::default();
        enqueue_frontend_assets(&BlockTypeDescriptor::new("acme/plain"), &loader);
        assert!(loader.enqueued().is_empty());
    }
}
