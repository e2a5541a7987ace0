//! hello-page - mounts the client page against a running backend
//!
//! Usage:
//!     hello-page [--backend-url <URL>]
//!
//! Prints the rendered page once the fetch has settled.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use hello_metrics::client::{FetchStatus, HelloPage, HttpMessageSource, DEFAULT_BACKEND_URL};
use hello_metrics::config::LogFormat;
use hello_metrics::util::init_logging;

/// Fetch the backend's hello message and render the page.
#[derive(Parser, Debug)]
#[command(name = "hello-page")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the backend
    #[arg(long, value_name = "URL", env = "BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    backend_url: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, &LogFormat::Pretty);

    let source = HttpMessageSource::new(&cli.backend_url)
        .with_context(|| format!("invalid backend URL '{}'", cli.backend_url))?;
    info!(url = %source.url(), "mounting page");

    let mut page = HelloPage::new(source);
    page.mount();
    page.settle().await;

    if page.status() != FetchStatus::Loaded {
        info!(status = ?page.status(), "page rendered without a message");
    }

    println!("{}", page.render());
    page.unmount();
    Ok(())
}
