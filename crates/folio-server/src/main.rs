//! # Folio
//!
//! One binary for the whole portfolio backend:
//! - `folio serve` runs the public read API plus the contact endpoint
//! - `folio setup` provisions the Appwrite database, collections, and buckets
//! - the remaining subcommands are the admin dashboard on the command line

mod cli;
mod commands;
mod setup;
mod uploads;

use anyhow::bail;
use clap::Parser;
use folio_api::{AppState, build_router};
use folio_appwrite::{ClientOptions, RestClient};
use folio_common::config::AppConfig;
use folio_store::{AppwriteBackend, Contexts};
use std::net::SocketAddr;
use std::sync::Arc;

use cli::{Cli, Command};

/// Multipart framing on top of the largest accepted file.
const BODY_SLACK_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = folio_common::config::init()?;

    let default_filter = match cli.command {
        Command::Serve => "folio=debug,tower_http=debug",
        _ => "folio=info",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match cli.command {
        Command::Setup(args) => setup::run(args, config).await,
        Command::Serve => serve(config).await,
        Command::Projects { command } => commands::projects(&contexts(config, true)?, command).await,
        Command::Messages { command } => {
            commands::messages(&contexts(config, true)?, config, command).await
        }
        Command::Jobs { command } => commands::jobs(&contexts(config, true)?, command).await,
        Command::Cvs { command } => commands::cvs(&contexts(config, true)?, command).await,
        // Sessions belong to the user, never to the server key
        Command::Auth { command } => commands::auth(&contexts(config, false)?, command).await,
    }
}

/// Wire every context to the configured Appwrite project.
fn contexts(config: &AppConfig, with_key: bool) -> anyhow::Result<Contexts> {
    if config.appwrite.project.trim().is_empty() {
        bail!("No Appwrite project configured. Run `folio setup` or set NEXT_PUBLIC_APPWRITE_PROJECT_ID.");
    }

    let mut options = ClientOptions::new(&config.appwrite.endpoint, &config.appwrite.project);
    match (&config.appwrite.api_key, with_key) {
        (Some(key), true) => options = options.api_key(key),
        (None, true) => tracing::warn!(
            "no API key configured; requests run with guest permissions"
        ),
        _ => {}
    }

    let client = RestClient::new(options)?;
    let backend = Arc::new(AppwriteBackend::new(client, &config.appwrite.database));
    Ok(Contexts::new(backend, config))
}

async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Folio v{}", env!("CARGO_PKG_VERSION"));

    let contexts = contexts(config, true)?;
    let max_body = usize::try_from(config.limits.max_upload_bytes)?.saturating_add(BODY_SLACK_BYTES);
    let app = build_router(AppState::new(contexts, max_body));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        endpoint = %config.appwrite.endpoint,
        project = %config.appwrite.project,
        "API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Folio shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
    }
}
