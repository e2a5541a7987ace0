//! hello-backend - hello-world HTTP backend with Prometheus metrics
//!
//! Usage:
//!     hello-backend [--config <path>]
//!
//! See --help for more options.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use hello_metrics::config::{load_config, Config};
use hello_metrics::metrics::{run_process_sampler, MetricsCollector};
use hello_metrics::server::HttpServer;
use hello_metrics::util::init_logging;
use hello_metrics::AppState;

/// Hello-world HTTP backend with request metrics.
#[derive(Parser, Debug)]
#[command(name = "hello-backend")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path).with_context(|| {
            format!("failed to load configuration from '{}'", path.display())
        })?,
        None => Config::default(),
    };

    // CLI overrides config
    let log_level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.global.log_level);

    init_logging(log_level, &config.global.log_format);

    if cli.validate {
        info!("Configuration is valid");
        println!("Configuration is valid.");
        println!("  Listen: {}", config.server.listen);
        println!("  Metrics path: {}", config.metrics.path);
        println!("  Unmatched routes: {:?}", config.metrics.route_labels);
        println!("  CORS origin: {}", config.server.cors.allow_origin);
        return Ok(());
    }

    info!(
        config_path = ?cli.config,
        listen = %config.server.listen,
        metrics_path = %config.metrics.path,
        route_labels = ?config.metrics.route_labels,
        process_metrics = config.metrics.process.enabled,
        "hello-backend starting"
    );

    run(config)
}

/// Run the backend with the given configuration.
fn run(config: Config) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    runtime.block_on(async { run_async(config).await })
}

/// Async entry point for the backend.
async fn run_async(config: Config) -> Result<()> {
    let collector = if config.metrics.process.enabled {
        MetricsCollector::with_process_metrics()
    } else {
        MetricsCollector::new()
    };

    let state = AppState::new(&config, collector.clone())
        .context("invalid CORS allow_origin")?;
    let shutdown = state.shutdown().clone();

    let mut handles = Vec::new();

    if let Some(process) = collector.process() {
        handles.push(tokio::spawn(run_process_sampler(
            process.clone(),
            config.metrics.process.interval,
            shutdown.subscribe(),
        )));
    }

    let server = HttpServer::bind(config.server.listen, state)
        .await
        .with_context(|| format!("failed to bind {}", config.server.listen))?;

    let shutdown_rx = shutdown.subscribe();
    handles.push(tokio::spawn(async move {
        server.run(shutdown_rx).await;
    }));

    info!("press Ctrl+C to stop");

    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("received shutdown signal");
        }
        Err(e) => {
            error!(error = %e, "failed to listen for shutdown signal");
        }
    }

    shutdown.shutdown();

    for handle in handles {
        let _ = handle.await;
    }

    info!("hello-backend shut down complete");
    Ok(())
}
