use std::path::{Path, PathBuf};
use std::sync::Arc;

use blockbridge::config::FileStore;
use blockbridge::memory::memory_host;
use blockbridge::telemetry::{self, TelemetryConfig};
use blockbridge::template::{PlaceholderTemplate, TemplateMap};
use blockbridge::{AmbientSignals, BlockBridge, BridgeConfig, Manifest, RenderContext, ValueMap};
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};

#[derive(Parser)]
#[command(version, about = "Render blocks outside their native host", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Block manifest (.json or .toml)
    #[arg(long, global = true, env = "BLOCKBRIDGE_MANIFEST")]
    manifest: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the render mode the given request signals select
    Detect {
        /// Caller is a page-assembly tool driving the render
        #[arg(long)]
        bridge: bool,
        /// Editor preview signal is set
        #[arg(long)]
        edit_preview: bool,
        /// Path of the current request
        #[arg(long)]
        request_path: Option<String>,
    },
    /// Print the validated context and attributes for a bridged render
    Resolve {
        block: String,
        /// Raw context as a JSON object
        #[arg(long, default_value = "{}")]
        context: String,
        /// Raw attributes as a JSON object
        #[arg(long, default_value = "{}")]
        attributes: String,
    },
    /// Render a block with a placeholder template file
    Render {
        block: String,
        /// Template file, with {{ attributes.key }} / {{ context.key }} placeholders
        #[arg(long)]
        template: PathBuf,
        /// Raw context as a JSON object
        #[arg(long, default_value = "{}")]
        context: String,
        /// Raw attributes as a JSON object
        #[arg(long, default_value = "{}")]
        attributes: String,
    },
}

fn main() -> Result<()> {
    init_miette();
    telemetry::init(TelemetryConfig::from_env("blockbridge"));

    let cli = Cli::parse();
    let manifest_path = cli.manifest.unwrap_or_else(default_manifest_path);

    match cli.command {
        Commands::Detect {
            bridge,
            edit_preview,
            request_path,
        } => {
            // Detection works without a manifest; it only needs the preview endpoint.
            let config = if manifest_path.exists() {
                load_manifest(&manifest_path)?.config
            } else {
                BridgeConfig::default()
            };
            let mut signals = AmbientSignals::new().with_edit_preview(edit_preview);
            if let Some(path) = request_path {
                signals = signals.with_request_path(path);
            }
            println!("{}", config.detector().detect(bridge, &signals));
        }
        Commands::Resolve {
            block,
            context,
            attributes,
        } => {
            let manifest = load_manifest(&manifest_path)?;
            let registry = manifest.registry();
            let ctx = RenderContext::from_bridge(
                &registry,
                &block,
                &parse_object("context", &context)?,
                &parse_object("attributes", &attributes)?,
            );
            match ctx {
                Some(ctx) => {
                    let resolved = serde_json::json!({
                        "block": ctx.block_name(),
                        "mode": ctx.mode(),
                        "context": ctx.context(),
                        "attributes": ctx.attributes(),
                        "requiresDirectiveProcessing": ctx.requires_directive_processing(),
                    });
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&resolved).into_diagnostic()?
                    );
                }
                None => tracing::info!(%block, "block type not registered"),
            }
        }
        Commands::Render {
            block,
            template,
            context,
            attributes,
        } => {
            let manifest = load_manifest(&manifest_path)?;
            let source = std::fs::read_to_string(&template)
                .into_diagnostic()
                .wrap_err_with(|| format!("reading template {}", template.display()))?;
            let mut templates = TemplateMap::default();
            templates.insert("cli", PlaceholderTemplate::new(source));

            let (host, assets) = memory_host(manifest.registry(), &manifest.config);
            let bridge = BlockBridge::new(host, Arc::new(templates), manifest.config);
            let html = bridge.render_block(
                &block,
                "cli",
                &parse_object("context", &context)?,
                &parse_object("attributes", &attributes)?,
            )?;

            match html {
                Some(html) => {
                    println!("{html}");
                    for asset in assets.enqueued() {
                        eprintln!("enqueued {}: {}", asset.kind.as_str(), asset.id);
                    }
                }
                None => tracing::info!(%block, "nothing rendered"),
            }
        }
    }

    Ok(())
}

fn load_manifest(path: &Path) -> Result<Manifest> {
    if !path.exists() {
        return Err(miette::miette!(
            "Manifest not found: {} (pass --manifest or set BLOCKBRIDGE_MANIFEST)",
            path.display()
        ));
    }
    let manifest = Manifest::load(&FileStore::new(path))?;
    tracing::debug!(path = %path.display(), blocks = manifest.blocks.len(), "loaded manifest");
    Ok(manifest)
}

fn parse_object(what: &str, raw: &str) -> Result<ValueMap> {
    match serde_json::from_str(raw).into_diagnostic()? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(miette::miette!("--{what} must be a JSON object")),
    }
}

fn default_manifest_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("blockbridge")
        .join("blocks.json")
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .context_lines(2)
                .build(),
        )
    }))
    .ok();
    miette::set_panic_hook();
}
