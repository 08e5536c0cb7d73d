//! Recipe Search MCP Server — entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use recipe_index::{InMemoryIndex, RecipeStore, UpstashIndex};
use recipe_search_mcp::config::{load_config, Overrides};
use recipe_search_mcp::protocol::ProtocolHandler;
use recipe_search_mcp::tools::default_registry;
use recipe_search_mcp::transport::SseTransport;
use recipe_search_mcp::types::InitializeResult;

#[derive(Parser)]
#[command(
    name = "recipe-search-mcp",
    about = "MCP server for recipe similarity search over an SSE transport",
    version
)]
struct Cli {
    /// Configuration file path.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the SSE server (default).
    Serve {
        /// Listen address, overrides SERVER_HOST.
        #[arg(long)]
        host: Option<String>,

        /// Listen port, overrides SERVER_PORT.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check that the configuration resolves.
    Validate,

    /// Print server capabilities as JSON.
    Info,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    }) {
        Commands::Serve { host, port } => {
            let config = load_config(cli.config.as_deref(), &Overrides { host, port })?;
            tracing::debug!("Resolved configuration: {config:?}");

            let index = UpstashIndex::new(config.upstash())?;
            let store = RecipeStore::with_namespace(Arc::new(index), config.namespace.clone());
            let registry = default_registry(store)?;
            tracing::info!("Registered {} tools", registry.len());

            let handler = ProtocolHandler::new(Arc::new(registry));
            let transport = SseTransport::new(handler, config.api_key.clone());
            transport.run(config.socket_addr()).await?;
        }

        Commands::Validate => match load_config(cli.config.as_deref(), &Overrides::default()) {
            Ok(config) => {
                println!("Valid configuration");
                println!("  Listen: {}", config.socket_addr());
                println!("  Index: {}", config.upstash_url);
                println!("  Namespace: {}", config.namespace);
            }
            Err(e) => {
                eprintln!("Invalid configuration: {e}");
                std::process::exit(1);
            }
        },

        Commands::Info => {
            let capabilities = InitializeResult::default_result();
            // Tool descriptors do not depend on the backing index.
            let registry = default_registry(RecipeStore::new(Arc::new(InMemoryIndex::new())))?;
            let tools = registry.list();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "tools": tools.iter().map(|t| &t.name).collect::<Vec<_>>(),
                "tool_count": tools.len(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }

    Ok(())
}
