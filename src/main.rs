//! Stratum demo server.
//!
//! Serves the demo application from [`stratum::demo`]: a version route, a
//! users sub-application mounted at `/admin`, and an optional static
//! directory.
//!
//! # Startup
//!
//! ```text
//! CLI args → load config (or defaults) → apply overrides → validate
//!     → logging → metrics (optional) → build app → bind → serve until signal
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use stratum::config::{load_config, validate_config, ServerConfig};
use stratum::demo::{create_app, UserStore};
use stratum::lifecycle::{signals, Shutdown};
use stratum::observability::{logging, metrics};
use stratum::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "stratum", version, about = "Middleware pipeline demo server")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address (e.g. 127.0.0.1:8480).
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the log level.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if let Some(level) = args.log_level {
        config.observability.log_level = level;
    }
    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            eprintln!("invalid configuration: {error}");
        }
        return Err(format!("{} configuration error(s)", errors.len()).into());
    }

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "stratum starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_body_bytes = config.listener.max_body_bytes,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

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

    let store = UserStore::seeded();
    let app = create_app(&config, &store)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    let server = HttpServer::new(config, app);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
