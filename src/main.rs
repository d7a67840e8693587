//! Page dispatch server.
//!
//! Serves the rule table described by a TOML config file. Pages are rendered from the
//! configured template root; handlers are looked up by name in the process registry.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ Dispatcher ──▶ routing (match rule)
//!                                        │
//!                                        ├──▶ handler (resolve, invoke, interceptors)
//!                                        ├──▶ outcome (failure mapping, descriptor)
//!                                        └──▶ writer (page / redirect / json / rest)
//!     Client Response
//!     ◀────────────── BufferedResponse ◀─┘
//!
//!     config file ──▶ watcher ──▶ rebuilt RuleTable ──▶ Dispatcher::publish
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use page_dispatch::config::{build_rule_table, load_config, ConfigWatcher};
use page_dispatch::handler::{HandlerMap, HandlerResolver, RegistryResolver};
use page_dispatch::observability::{logging, metrics};
use page_dispatch::template::FileTemplateResolver;
use page_dispatch::writer::WriterSet;
use page_dispatch::{Dispatcher, HttpServer};

#[derive(Parser)]
#[command(name = "page-dispatch")]
#[command(about = "Rule-based page dispatch server", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Rebuild the rule table when the configuration file changes.
    #[arg(short, long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("page-dispatch v{} starting", env!("CARGO_PKG_VERSION"));

    // Required handlers must be registered before the table is built.
    let registry = Arc::new(HandlerMap::new());
    let resolver: Arc<dyn HandlerResolver> = Arc::new(RegistryResolver::new(registry));

    let table = build_rule_table(&config, Some(resolver.clone()))?;
    tracing::info!(
        bind_address = %config.server.bind_address,
        rules = table.rules().len(),
        templates = %config.templates.root,
        request_timeout_secs = config.server.request_timeout_secs,
        "Configuration loaded"
    );

    let writers = WriterSet::new(Arc::new(FileTemplateResolver::new(&config.templates.root)));
    let dispatcher = Arc::new(Dispatcher::new(table, resolver.clone(), writers));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Keep the watcher alive for the lifetime of the server.
    let (_watcher, updates) = if cli.watch {
        let (watcher, updates) = ConfigWatcher::new(&cli.config, Some(resolver));
        (Some(watcher.run()?), Some(updates))
    } else {
        (None, None)
    };

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let server = HttpServer::new(config, dispatcher);
    server.run(listener, updates).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
