use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;

/// Error type for block template code.
pub type TemplateError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error, Diagnostic)]
pub enum BridgeError {
    #[error("nested bridge render of {inner} while {outer} is still rendering")]
    #[diagnostic(
        code(blockbridge::bridge::nested_render),
        help("render_block holds a single context slot; render child blocks natively instead")
    )]
    NestedRender { outer: SmolStr, inner: SmolStr },

    #[error("template for {block} failed")]
    #[diagnostic(code(blockbridge::bridge::template))]
    Template {
        block: SmolStr,
        #[source]
        source: TemplateError,
    },
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("io error: {0}")]
    #[diagnostic(code(blockbridge::config::io))]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(blockbridge::config::json))]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(blockbridge::config::toml))]
    Toml(#[from] toml::de::Error),

    #[error("unsupported manifest format: {0}")]
    #[diagnostic(
        code(blockbridge::config::format),
        help("manifests must be .json or .toml files")
    )]
    UnsupportedFormat(String),
}
