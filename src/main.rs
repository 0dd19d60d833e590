//! Student records service.
//!
//! A JSON REST API over a pluggable document store.
//!
//! ```text
//!     Client ──▶ request id ─▶ trace ─▶ timeout ─▶ CORS ─▶ body limit
//!                                                              │
//!                                                              ▼
//!                                  handlers ─▶ StudentService ─▶ Collection
//!                                                                   │
//!                                             memory │ JSON file │ Firestore
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use student_records::config::{load_config, validate_config, AppConfig, ConfigError};
use student_records::lifecycle::{self, signals, Shutdown};
use student_records::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "student-records")]
#[command(about = "Student records REST service", long_about = None)]
struct Args {
    /// TOML configuration file. Built-in defaults apply when omitted.
    #[arg(short, long, env = "RECORDS_CONFIG")]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

fn resolve_config(args: &Args) -> Result<AppConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    if let Some(bind) = &args.bind {
        config.listener.bind_address = bind.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    logging::init_logging(&config.observability)?;
    tracing::info!("student-records v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        allowed_origin = %config.cors.allowed_origin,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let prepared = lifecycle::prepare(config).await?;
    tracing::info!(
        address = %prepared.listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    signals::spawn_listener(shutdown.clone());
    prepared.server.run(prepared.listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
