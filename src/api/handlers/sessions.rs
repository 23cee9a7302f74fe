//! Editor session endpoints
//!
//! A session mirrors one open editor: upload a portrait, let the provider
//! chain strip its background, tune spec/backdrop/preview settings and
//! download the composited PNG.

use actix_web::{web, HttpRequest, HttpResponse};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{validate_upload, Adjustments, PhotoSpecInfo};
use crate::engine::export_file_name;
use crate::session::{
    upload_and_remove, EditorSession, SessionError, SessionUpdate, StoredImage, UploadOutcome,
};
use crate::AppState;

use super::composite::{png_download, request_content_type, run_export};
use super::errors::{removal_error, session_error, validation_error, ErrorResponse};

/// Client-facing view of a session
#[derive(Serialize, ToSchema)]
pub struct SessionView {
    pub id: Uuid,
    pub spec: PhotoSpecInfo,
    pub adjustments: Adjustments,
    /// Hex backdrop color, null for none
    pub background: Option<String>,
    /// CSS filter the client applies to the preview
    pub preview_filter: Option<String>,
    pub has_original: bool,
    pub has_processed: bool,
    /// Data URL of the upload (only with `include_images=true`)
    pub original_image: Option<String>,
    /// Data URL of the background-free image (only with `include_images=true`)
    pub processed_image: Option<String>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn data_url(image: &StoredImage) -> String {
    format!(
        "data:{};base64,{}",
        image.content_type,
        base64::engine::general_purpose::STANDARD.encode(&image.bytes)
    )
}

impl SessionView {
    fn build(session: &EditorSession, include_images: bool) -> Result<Self, SessionError> {
        let images = |image: &Option<StoredImage>| image.as_ref().filter(|_| include_images).map(data_url);

        Ok(SessionView {
            id: session.id,
            spec: PhotoSpecInfo::try_from(session.spec)?,
            adjustments: session.adjustments,
            background: session.fill.to_hex(),
            preview_filter: session.adjustments.preview_filter(),
            has_original: session.original.is_some(),
            has_processed: session.processed.is_some(),
            original_image: images(&session.original),
            processed_image: images(&session.processed),
            version: session.version(),
            created_at: session.created_at,
            updated_at: session.updated_at,
        })
    }
}

/// Response wrapping a session view
#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub success: bool,
    pub data: SessionView,
}

/// Result of background removal for an upload
#[derive(Serialize, ToSchema)]
pub struct UploadInfo {
    /// Provider that produced the image, null when superseded
    pub provider: Option<String>,
    pub fallback_used: bool,
    /// True when a newer upload replaced this one mid-processing
    pub superseded: bool,
    pub warnings: Vec<String>,
    pub processing_time_ms: u64,
}

/// Response for an upload
#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub data: UploadInfo,
    pub session: SessionView,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SessionQuery {
    /// Embed images as data URLs
    #[serde(default)]
    pub include_images: bool,
}

fn session_response(session: &EditorSession, include_images: bool) -> HttpResponse {
    match SessionView::build(session, include_images) {
        Ok(view) => HttpResponse::Ok().json(SessionResponse { success: true, data: view }),
        Err(e) => session_error(&e),
    }
}

/// POST /api/v1/sessions - Start an editor session
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "sessions",
    responses(
        (status = 201, description = "Session created", body = SessionResponse)
    )
)]
pub async fn create_session(state: web::Data<AppState>) -> HttpResponse {
    let handle = state.sessions.create();
    let session = handle.lock();

    match SessionView::build(&session, false) {
        Ok(view) => HttpResponse::Created().json(SessionResponse { success: true, data: view }),
        Err(e) => session_error(&e),
    }
}

/// GET /api/v1/sessions/{id} - Current session state
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}",
    tag = "sessions",
    params(
        ("id" = Uuid, Path, description = "Session id"),
        SessionQuery
    ),
    responses(
        (status = 200, description = "Session state", body = SessionResponse),
        (status = 404, description = "Unknown session", body = ErrorResponse)
    )
)]
pub async fn get_session(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<SessionQuery>,
) -> HttpResponse {
    let handle = match state.sessions.get(path.into_inner()) {
        Ok(handle) => handle,
        Err(e) => return session_error(&e),
    };

    let session = handle.lock();
    session_response(&session, query.include_images)
}

/// PATCH /api/v1/sessions/{id} - Change spec, preview adjustments or backdrop
#[utoipa::path(
    patch,
    path = "/api/v1/sessions/{id}",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body = SessionUpdate,
    responses(
        (status = 200, description = "Session updated", body = SessionResponse),
        (status = 400, description = "Invalid adjustment or color", body = ErrorResponse),
        (status = 404, description = "Unknown session or spec", body = ErrorResponse)
    )
)]
pub async fn update_session(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<SessionUpdate>,
) -> HttpResponse {
    let handle = match state.sessions.get(path.into_inner()) {
        Ok(handle) => handle,
        Err(e) => return session_error(&e),
    };

    let mut session = handle.lock();
    if let Err(e) = session.apply(&body) {
        return session_error(&e);
    }

    info!(
        session_id = %session.id,
        spec = session.spec.name,
        background = ?session.fill.to_hex(),
        "Session settings updated"
    );
    session_response(&session, false)
}

/// DELETE /api/v1/sessions/{id} - Discard a session and its images
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/{id}",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 204, description = "Session removed"),
        (status = 404, description = "Unknown session", body = ErrorResponse)
    )
)]
pub async fn delete_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> HttpResponse {
    match state.sessions.remove(path.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => session_error(&e),
    }
}

/// POST /api/v1/sessions/{id}/upload - Upload a portrait and remove its background
///
/// The request body is the raw JPEG/PNG image.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/upload",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body(content = Vec<u8>, description = "Raw JPEG or PNG image", content_type = "image/png"),
    responses(
        (status = 200, description = "Background removed", body = UploadResponse),
        (status = 400, description = "Unsupported type or too large", body = ErrorResponse),
        (status = 404, description = "Unknown session", body = ErrorResponse),
        (status = 502, description = "All providers failed", body = ErrorResponse),
        (status = 503, description = "No providers configured", body = ErrorResponse)
    )
)]
pub async fn upload_image(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    let start = Instant::now();

    let handle = match state.sessions.get(path.into_inner()) {
        Ok(handle) => handle,
        Err(e) => return session_error(&e),
    };

    // Reject before any provider is contacted
    let kind = match validate_upload(request_content_type(&req), &body, state.settings.upload.max_bytes) {
        Ok(kind) => kind,
        Err(e) => return validation_error(&e),
    };

    let outcome = match upload_and_remove(&handle, &state.removal_chain, body, kind).await {
        Ok(outcome) => outcome,
        Err(e) => return removal_error(&e),
    };

    let processing_time_ms = start.elapsed().as_millis() as u64;
    let data = match outcome {
        UploadOutcome::Processed { provider, fallback_used, warnings } => UploadInfo {
            provider: Some(provider.to_string()),
            fallback_used,
            superseded: false,
            warnings,
            processing_time_ms,
        },
        UploadOutcome::Superseded { warnings } => UploadInfo {
            provider: None,
            fallback_used: false,
            superseded: true,
            warnings,
            processing_time_ms,
        },
    };

    let session = match SessionView::build(&handle.lock(), false) {
        Ok(view) => view,
        Err(e) => return session_error(&e),
    };

    HttpResponse::Ok().json(UploadResponse { success: true, data, session })
}

/// GET /api/v1/sessions/{id}/export - Download the composited ID photo
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}/export",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Cropped PNG attachment"),
        (status = 404, description = "Unknown session", body = ErrorResponse),
        (status = 409, description = "Nothing uploaded yet", body = ErrorResponse),
        (status = 422, description = "Stored image could not be decoded", body = ErrorResponse)
    )
)]
pub async fn export_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> HttpResponse {
    let start = Instant::now();
    let session_id = path.into_inner();

    let handle = match state.sessions.get(session_id) {
        Ok(handle) => handle,
        Err(e) => return session_error(&e),
    };

    // Snapshot under the lock, composite without it
    let request = {
        let session = handle.lock();
        session.export_request()
    };
    let request = match request {
        Ok(request) => request,
        Err(e) => return session_error(&e),
    };

    let spec = request.spec;
    let result = match run_export(request.source.bytes, spec, request.fill).await {
        Ok(result) => result,
        Err(response) => return response,
    };

    info!(
        session_id = %session_id,
        spec = spec.name,
        width = result.width,
        height = result.height,
        export_time_ms = start.elapsed().as_millis() as u64,
        "Session export complete"
    );

    let file_name = export_file_name(&state.settings.export.product_name, spec, Utc::now());
    png_download(result, &file_name)
}
