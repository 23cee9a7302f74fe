//! Health check endpoint

use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub active_sessions: usize,
    /// Background-removal providers in fallback order
    pub providers: Vec<String>,
}

/// GET /health - Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let providers: Vec<String> = state
        .removal_chain
        .provider_codes()
        .into_iter()
        .map(str::to_string)
        .collect();

    let response = HealthResponse {
        // Uploads cannot succeed without at least one provider
        status: if providers.is_empty() { "degraded" } else { "healthy" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        active_sessions: state.sessions.len(),
        providers,
    };

    HttpResponse::Ok().json(response)
}
