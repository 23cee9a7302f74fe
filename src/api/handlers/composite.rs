//! Stateless export endpoint and the shared PNG download response

use actix_web::{http::header, web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use std::time::Instant;
use tracing::info;
use utoipa::IntoParams;

use crate::domain::{default_spec, find_spec, validate_upload, FillColor, PhotoSpec, SpecError};
use crate::engine::{composite_bytes, content_disposition, export_file_name, ExportResult};
use crate::AppState;

use super::errors::{compositor_error, internal_error, spec_error, validation_error, ErrorResponse};

/// Query parameters for a one-shot export
#[derive(Debug, Deserialize, IntoParams)]
pub struct CompositeQuery {
    /// Photo spec id, defaults to the first catalog entry
    pub spec_id: Option<u32>,
    /// Hex backdrop color, or "none"
    pub background: Option<String>,
}

/// Content-Type header value of a request, empty when absent
pub fn request_content_type(req: &HttpRequest) -> &str {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Run the compositor off the async workers
pub async fn run_export(
    source: web::Bytes,
    spec: &'static PhotoSpec,
    fill: FillColor,
) -> Result<ExportResult, HttpResponse> {
    match web::block(move || composite_bytes(&source, spec, fill)).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => Err(compositor_error(&e)),
        Err(e) => Err(internal_error(format!("Export task failed: {}", e))),
    }
}

/// PNG attachment response
pub fn png_download(result: ExportResult, file_name: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("image/png")
        .insert_header((header::CONTENT_DISPOSITION, content_disposition(file_name)))
        .insert_header(("X-Image-Width", result.width.to_string()))
        .insert_header(("X-Image-Height", result.height.to_string()))
        .insert_header(("X-Crop-Offset", format!("{},{}", result.crop.offset_x, result.crop.offset_y)))
        .body(result.bytes)
}

/// POST /api/v1/composite - Crop and fill an uploaded image in one call
///
/// The request body is the raw JPEG/PNG image.
#[utoipa::path(
    post,
    path = "/api/v1/composite",
    tag = "export",
    params(CompositeQuery),
    request_body(content = Vec<u8>, description = "Raw JPEG or PNG image", content_type = "image/png"),
    responses(
        (status = 200, description = "Cropped PNG attachment"),
        (status = 400, description = "Unsupported file or invalid color", body = ErrorResponse),
        (status = 404, description = "Unknown photo spec", body = ErrorResponse),
        (status = 422, description = "Image could not be decoded", body = ErrorResponse)
    )
)]
pub async fn composite_image(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<CompositeQuery>,
    body: web::Bytes,
) -> HttpResponse {
    let start = Instant::now();

    if let Err(e) = validate_upload(request_content_type(&req), &body, state.settings.upload.max_bytes) {
        return validation_error(&e);
    }

    let spec = match query.spec_id {
        Some(id) => match find_spec(id) {
            Some(spec) => spec,
            None => return spec_error(&SpecError::NotFound(id)),
        },
        None => default_spec(),
    };

    let fill = match FillColor::parse(query.background.as_deref().unwrap_or_default()) {
        Ok(fill) => fill,
        Err(e) => return validation_error(&e),
    };

    let result = match run_export(body, spec, fill).await {
        Ok(result) => result,
        Err(response) => return response,
    };

    info!(
        spec = spec.name,
        width = result.width,
        height = result.height,
        export_time_ms = start.elapsed().as_millis() as u64,
        "One-shot export complete"
    );

    let file_name = export_file_name(&state.settings.export.product_name, spec, Utc::now());
    png_download(result, &file_name)
}
