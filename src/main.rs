use anyhow::Context;
use clap::Parser;
use minecraft_bedrock_gateway::{
    config::GatewayConfig,
    gateway::Gateway,
    mappings::{MappingSource, Mappings},
};
use mimalloc::MiMalloc;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Debug, Parser)]
struct Args {
    /// Gateway settings; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Block state mapping table.
    #[arg(long)]
    blocks: PathBuf,
    /// Item mapping table.
    #[arg(long)]
    items: PathBuf,
    /// Validate the configuration and mappings, then exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GatewayConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => GatewayConfig::default(),
    };
    let source = MappingSource::from_paths(&args.blocks, &args.items)
        .context("failed to read mappings")?;
    let mappings = Mappings::build(source).context("invalid mappings")?;
    tracing::info!(
        "Loaded {} block states and {} items",
        mappings.blocks.len(),
        mappings.items.len()
    );
    if args.check {
        return Ok(());
    }

    let gateway = Gateway::new(config, mappings);
    tracing::info!(
        "Gateway ready for {}:{} (protocol {}), {} Java and {} Bedrock translators",
        gateway.config().remote_address,
        gateway.config().remote_port,
        gateway.config().protocol_version,
        gateway.java_registry().len(),
        gateway.bedrock_registry().len(),
    );

    let mut console = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = console.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "reload" => {
                        match MappingSource::from_paths(&args.blocks, &args.items)
                            .and_then(|source| gateway.reload(source))
                        {
                            Ok(()) => {}
                            Err(e) => tracing::error!("Reload failed, keeping current mappings: {e}"),
                        }
                    }
                    "list" => {
                        for handle in gateway.directory().handles() {
                            tracing::info!("{} ({}) session {}", handle.display_name, handle.uuid, handle.id);
                        }
                    }
                    "stop" => break,
                    "" => {}
                    other => tracing::warn!("Unknown command {other:?}; try reload, list or stop"),
                }
            }
        }
    }

    for handle in gateway.directory().handles() {
        gateway.on_session_disconnected(&handle, "Gateway shutting down");
    }
    tracing::info!("Stopped");
    Ok(())
}
