use actix_web::{middleware, App, HttpServer};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod auth;
mod config;
mod docs;
mod health;
mod metrics;
mod models;
mod store;
mod utils;

use api::AppState;
use auth::{HttpOAuthClient, OAuthClient};
use config::AppConfig;

/// In-memory entity store server with OAuth2 login and OpenAPI docs.
#[derive(Parser)]
#[command(name = "entity-store-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the application port
    #[arg(short, long)]
    port: Option<u16>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
        config.validate()?;
    }

    // Structured logging; RUST_LOG wins over the configured filter
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .init();

    tracing::info!("🚀 Starting entity store server");

    // === 1. Metrics registry ===
    let metrics = Arc::new(metrics::Metrics::new()?);

    // === 2. OAuth provider client ===
    let oauth_client: Arc<dyn OAuthClient> = Arc::new(HttpOAuthClient::new(config.oauth.clone())?);
    if config.oauth.enabled {
        tracing::info!(
            provider = %config.oauth.provider_name,
            redirect_url = %config.oauth.redirect_url,
            "OAuth login enabled"
        );
    } else {
        tracing::warn!("OAuth disabled; /hello and /data are open to everyone");
    }

    // === 3. Stores, sessions and API docs ===
    let state = AppState::new(&config, oauth_client, metrics.clone());
    tracing::info!(
        users = state.users.len(),
        messages = state.messages.len(),
        "Seeded in-memory stores"
    );

    // === 4. Application server ===
    let app_state = state.clone();
    let mut server = HttpServer::new(move || {
        let state = app_state.clone();
        App::new()
            .wrap(middleware::Logger::default())
            .configure(move |cfg| api::configure(cfg, &state))
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }
    let server = server
        .bind((config.server.host.as_str(), config.server.port))?
        .run();

    tracing::info!(
        "📡 Listening on http://{}:{} (docs at /docs)",
        config.server.host,
        config.server.port
    );

    // === 5. Metrics server next to it ===
    if config.metrics.enabled {
        let metrics_server = metrics::metrics_server(
            metrics,
            state.health(),
            &config.metrics.host,
            config.metrics.port,
        )?;
        tokio::try_join!(server, metrics_server)?;
    } else {
        server.await?;
    }

    tracing::info!("Server stopped");
    Ok(())
}
