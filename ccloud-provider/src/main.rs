//! ccloud-provider: runs one lifecycle operation against Confluent Cloud.
//!
//! Reads an operation request as JSON from a file or stdin, executes it and
//! writes the response to stdout. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ccloud_provider::config::DEFAULT_ENDPOINT;
use ccloud_provider::{Client, OperationRequest, Provider, ProviderConfig};

/// Confluent Cloud provider
#[derive(Parser, Debug)]
#[command(name = "ccloud-provider", version, about)]
struct Args {
    /// Control-plane endpoint
    #[arg(long, env = "CONFLUENT_CLOUD_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Organization API key
    #[arg(long, env = "CONFLUENT_CLOUD_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,

    /// Organization API secret
    #[arg(long, env = "CONFLUENT_CLOUD_API_SECRET", default_value = "", hide_env_values = true)]
    api_secret: String,

    /// Cluster provisioning poll interval in seconds
    #[arg(long, default_value = "10")]
    poll_interval: u64,

    /// Request file (reads stdin when omitted)
    input: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the response, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ccloud_provider=info,ccloud_sdk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let raw = match &args.input {
        Some(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read request from {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buf)
                .await
                .context("Failed to read request from stdin")?;
            buf
        }
    };
    let request: OperationRequest =
        serde_json::from_slice(&raw).context("Failed to parse operation request")?;

    let config = ProviderConfig::new(args.endpoint, args.api_key, args.api_secret)
        .with_poll_interval(Duration::from_secs(args.poll_interval));
    info!("Endpoint: {}", config.endpoint);

    let provider = Provider::new(Arc::new(Client::new(&config)));
    let response = provider.execute(request).await;

    let mut out = serde_json::to_vec_pretty(&response).context("Failed to encode response")?;
    out.push(b'\n');
    let mut stdout = tokio::io::stdout();
    stdout.write_all(&out).await?;
    stdout.flush().await?;

    if response.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}
