use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use qr_gateway::app::create_app;
use qr_gateway::config::{resolve_routes, Config};
use qr_gateway::state::AppState;

#[derive(Parser)]
#[command(name = "qr-gateway")]
#[command(about = "QR code redirect gateway with scan analytics", long_about = None)]
struct Cli {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Extra routes file (overrides ROUTES_FILE)
    #[arg(long)]
    routes_file: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the redirect server (default)
    Serve,
    /// Print the resolved route table and exit
    Routes,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr; stdout is reserved for scan log lines
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(path) = cli.routes_file.as_deref() {
        config.routes = resolve_routes(Some(path))?;
    }
    info!("Loaded configuration");

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Routes => {
            for route in config.routes.iter() {
                println!("/r/{}\t{}", route.slug, route.target_url);
            }
            Ok(())
        }
        Commands::Serve => serve(config).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    let state = Arc::new(AppState::new(config.routes.clone(), config.analytics.clone()));
    let app = create_app(state, &config.cors);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🚀 QR redirect gateway listening on http://{}", addr);
    info!("📍 Available routes:");
    for route in config.routes.iter() {
        info!("   /r/{} → {}", route.slug, route.target_url);
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
