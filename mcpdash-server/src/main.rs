use std::sync::Arc;

use clap::Parser;
use mcpdash_core::{DashConfig, DashboardApi, HttpDashboardClient};
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "mcpdash.toml")]
    config: String,

    /// Check that the dashboard API answers, then exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience, production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config
    let config = match DashConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Init logging, RUST_LOG wins over the configured level
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level)),
        )
        .init();

    let client = match HttpDashboardClient::new(&config.api) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid API configuration: {}", e);
            std::process::exit(1);
        }
    };

    if args.check {
        match client.list_servers().await {
            Ok(servers) => {
                println!("✅ Dashboard API reachable at {}", client.base_url());
                println!("✅ {} MCP server(s) registered", servers.len());
            }
            Err(e) => {
                println!("❌ Dashboard API check failed: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let (tx, rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    tracing::info!(api = %client.base_url(), "Using dashboard API");
    let api: Arc<dyn DashboardApi> = Arc::new(client);
    mcpdash_server::http::start_http_server(api, config, rx).await?;

    Ok(())
}
