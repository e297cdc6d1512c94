//! Model Inference Firewall
//!
//! ```text
//!     Client ──▶ http server ──▶ pipeline ──────────────────────────▶ upstream model
//!                (request id,    parse → rate limit → content filter
//!                 body limit)         │               │
//!                                     ▼               ▼
//!                                    429             403
//!
//!     Cross-cutting: config, observability (audit log, metrics, stats),
//!     lifecycle (startup, signals, shutdown), admin API
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use inference_firewall::admin::serve_admin;
use inference_firewall::config::load_config;
use inference_firewall::http::{AppState, HttpServer};
use inference_firewall::lifecycle::{build_pipeline, signals, Shutdown};
use inference_firewall::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "inference-firewall")]
#[command(about = "Rate-limiting, content-filtering gateway for a model inference endpoint", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    dotenvy::dotenv().ok();

    let config = load_config(args.config.as_deref())?;
    let _log_guard = logging::init_logging(&config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        rate_limit = config.rate_limit.max_requests,
        rate_window_secs = config.rate_limit.window_secs,
        upstream = %config.upstream.url,
        "inference-firewall starting"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let pipeline = Arc::new(build_pipeline(&config)?);
    let shutdown = Shutdown::new();
    tokio::spawn(signals::forward_signals(shutdown.clone()));

    let admin_task = if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        let state = AppState {
            pipeline: pipeline.clone(),
            trust_forwarded_for: config.listener.trust_forwarded_for,
        };
        Some(tokio::spawn(serve_admin(listener, state, shutdown.clone())))
    } else {
        None
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    HttpServer::new(&config, pipeline).run(listener, &shutdown).await?;

    if let Some(task) = admin_task {
        task.await??;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
