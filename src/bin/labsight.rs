//! Server binary for labsight.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `AnalysisConfig` and serves the analysis endpoint.

use anyhow::{Context, Result};
use clap::Parser;
use labsight::{server, AnalysisConfig, AnalysisPipeline};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Analyze medical reports over HTTP using Gemini.
#[derive(Debug, Parser)]
#[command(name = "labsight", version, about)]
struct Cli {
    /// Address to bind the HTTP server to.
    #[arg(long, default_value = "127.0.0.1:3000", env = "LABSIGHT_ADDR")]
    addr: SocketAddr,

    /// Gemini model identifier.
    #[arg(long, default_value = "gemini-2.0-flash", env = "LABSIGHT_MODEL")]
    model: String,

    /// Per-model-call timeout in seconds.
    #[arg(long, default_value_t = 60)]
    api_timeout_secs: u64,

    /// Maximum tokens the model may generate per report.
    #[arg(long, default_value_t = 4096)]
    max_output_tokens: u32,

    /// Enable debug logging (same as RUST_LOG=labsight=debug).
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "labsight=debug,info"
    } else {
        "labsight=info,warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let config = AnalysisConfig::builder()
        .model(cli.model)
        .api_timeout_secs(cli.api_timeout_secs)
        .max_output_tokens(cli.max_output_tokens)
        .build()
        .context("invalid configuration")?;

    // The API key is resolved per request, so a missing GEMINI_API_KEY is
    // not fatal at startup — but warn early so the operator notices.
    if config.resolve_api_key().is_err() {
        tracing::warn!(
            "GEMINI_API_KEY is not set; analyze requests will fail until it is configured"
        );
    }

    let pipeline = Arc::new(AnalysisPipeline::new(config));
    let app = server::router(pipeline);

    let listener = tokio::net::TcpListener::bind(cli.addr)
        .await
        .with_context(|| format!("failed to bind {}", cli.addr))?;
    tracing::info!("labsight listening on http://{}", cli.addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
