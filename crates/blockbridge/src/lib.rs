//! Block bridge
//!
//! Renders a single block correctly under several mutually incompatible hosts: the
//! native component-tree renderer, the server-side preview endpoint, the editor
//! preview, and page-assembly tools that drive a render explicitly ("bridged" renders).
//!
//! The flow for a bridged render is:
//!
//! 1. [`detect()`] decides which [`RenderMode`] is active.
//! 2. [`RenderContext`] is built from the block's [`BlockTypeDescriptor`], keeping only the
//!    context keys the block declared and validating attributes against its schema.
//! 3. [`assets`] asks the host loader for the block's front-end resources.
//! 4. The block's template runs while [`BlockBridge`] holds the context, so it can
//!    call [`BlockBridge::context`], [`BlockBridge::attributes`] and [`BlockBridge::render`]
//!    without branching on mode itself.
//!

pub mod assets;
pub mod block_type;
pub mod bridge;
pub mod config;
pub mod context;
pub mod detect;
pub mod error;
pub mod host;
pub mod memory;
pub mod mode;
pub mod schema;
#[cfg(feature = "telemetry")]
pub mod telemetry;
pub mod template;
pub mod wrapper;

pub use block_type::{AssetIds, BlockTypeDescriptor, Interactivity};
pub use bridge::BlockBridge;
pub use config::{BridgeConfig, Manifest};
pub use context::RenderContext;
pub use detect::{AmbientSignals, detect};
pub use error::{BridgeError, ConfigError};
pub use host::BridgeHost;
pub use mode::RenderMode;
pub use schema::{AttributeDefinition, AttributeType};
pub use template::{BlockTemplate, TemplateResolver};

/// String-keyed JSON mapping used for both block context and block attributes.
pub type ValueMap = serde_json::Map<String, serde_json::Value>;
