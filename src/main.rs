//! ID Photo Studio
//!
//! ID-photo creation API using Rust + Actix-Web.
//! Uploads are sent through an ordered chain of background-removal
//! providers, then center-cropped to a physical photo spec and composited
//! over an optional solid backdrop.

use actix_web::{web, App, HttpServer, middleware};
use anyhow::Context;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_actix_web::TracingLogger;

mod api;
mod config;
mod domain;
mod engine;
mod providers;
mod session;

use crate::config::Settings;
use crate::providers::FallbackChain;
use crate::session::{sweep_idle_sessions, SessionStore};

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Settings,
    pub sessions: Arc<SessionStore>,
    pub removal_chain: Arc<FallbackChain>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(settings: Settings, removal_chain: FallbackChain) -> Self {
        AppState {
            settings,
            sessions: Arc::new(SessionStore::new()),
            removal_chain: Arc::new(removal_chain),
            started_at: Instant::now(),
        }
    }

    /// Request body limit: one byte over the upload limit so oversized
    /// uploads reach validation and get a descriptive error
    pub fn payload_limit(&self) -> usize {
        self.settings.upload.max_bytes.saturating_add(1)
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("idphoto_studio=info".parse()?)
                .add_directive("actix_web=info".parse()?)
        )
        .json()
        .init();

    // Load configuration
    let settings = Settings::load().context("Failed to load configuration")?;
    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);
    let workers = settings.server.workers.unwrap_or_else(|| num_cpus::get() * 2);

    info!(
        "Starting ID Photo Studio v{} on {}",
        env!("CARGO_PKG_VERSION"),
        bind_addr
    );

    let removal_chain = FallbackChain::from_settings(&settings.providers)
        .context("Failed to initialize background removal providers")?;
    if removal_chain.is_empty() {
        tracing::warn!("No background removal provider configured, uploads will fail");
    }

    let app_state = web::Data::new(AppState::new(settings, removal_chain));

    // Drop abandoned editor sessions and their images
    let session_settings = &app_state.settings.sessions;
    tokio::spawn(sweep_idle_sessions(
        app_state.sessions.clone(),
        Duration::from_secs(session_settings.idle_ttl_secs),
        Duration::from_secs(session_settings.sweep_interval_secs),
    ));

    // Configure and start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(web::PayloadConfig::new(app_state.payload_limit()))
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(
                middleware::DefaultHeaders::new()
                    .add(("X-Service", "idphoto-studio"))
                    .add(("X-Version", env!("CARGO_PKG_VERSION")))
            )
            .configure(api::configure_routes)
    })
    .workers(workers)
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
