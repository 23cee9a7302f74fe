//! Error response envelope shared by all handlers

use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::domain::{SpecError, ValidationError};
use crate::engine::CompositorError;
use crate::providers::RemovalError;
use crate::session::SessionError;

/// Error response
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ApiError,
}

#[derive(Serialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

pub fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        success: false,
        error: ApiError {
            code: code.to_string(),
            message: message.into(),
        },
    })
}

pub fn validation_error(e: &ValidationError) -> HttpResponse {
    warn!(error = %e, "Rejected invalid input");
    error_response(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", e.to_string())
}

pub fn spec_error(e: &SpecError) -> HttpResponse {
    match e {
        SpecError::NotFound(_) => error_response(StatusCode::NOT_FOUND, "SPEC_NOT_FOUND", e.to_string()),
        SpecError::Malformed { .. } => {
            error!(error = %e, "Catalog contains a malformed spec");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "MALFORMED_SPEC", e.to_string())
        }
    }
}

pub fn session_error(e: &SessionError) -> HttpResponse {
    match e {
        SessionError::NotFound(_) => error_response(StatusCode::NOT_FOUND, "SESSION_NOT_FOUND", e.to_string()),
        SessionError::Validation(v) => validation_error(v),
        SessionError::Spec(s) => spec_error(s),
        SessionError::NothingToExport => error_response(StatusCode::CONFLICT, "NOTHING_TO_EXPORT", e.to_string()),
    }
}

pub fn compositor_error(e: &CompositorError) -> HttpResponse {
    error!(error = %e, "Export failed");
    match e {
        CompositorError::MalformedSpec(s) => spec_error(s),
        CompositorError::InvalidSource(_) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, "INVALID_SOURCE", e.to_string())
        }
        CompositorError::CanvasAllocation { .. } => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "CANVAS_ALLOCATION_FAILED", e.to_string())
        }
        CompositorError::Encoding(_) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "ENCODING_FAILED", e.to_string())
        }
    }
}

pub fn removal_error(e: &RemovalError) -> HttpResponse {
    error!(error = %e, "Background removal failed");
    match e {
        RemovalError::NoProviders => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, "NO_PROVIDERS", e.to_string())
        }
        RemovalError::AllProvidersFailed { .. } => error_response(
            StatusCode::BAD_GATEWAY,
            "ALL_PROVIDERS_FAILED",
            "All background removal services are unavailable, please try again later",
        ),
    }
}

pub fn internal_error(message: impl Into<String>) -> HttpResponse {
    let message = message.into();
    error!(message = %message, "Internal error");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
}
