//! OpenAPI 3.0 specification definition

use utoipa::OpenApi;

use crate::api::handlers::{
    catalog::{PaletteResponse, SpecsResponse},
    errors::{ApiError, ErrorResponse},
    health::HealthResponse,
    sessions::{SessionResponse, SessionView, UploadInfo, UploadResponse},
};
use crate::domain::{Adjustments, PaletteEntryInfo, PhotoSpecInfo};
use crate::session::SessionUpdate;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ID Photo Studio API",
        version = "0.1.0",
        description = "ID photo creation: background removal with provider fallback, spec-ratio cropping and backdrop fill",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/", description = "Current server")
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "catalog", description = "Photo specs and backdrop palette"),
        (name = "sessions", description = "Editor sessions: upload, settings, export"),
        (name = "export", description = "Stateless export")
    ),
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::catalog::list_specs,
        crate::api::handlers::catalog::list_palette,
        crate::api::handlers::composite::composite_image,
        crate::api::handlers::sessions::create_session,
        crate::api::handlers::sessions::get_session,
        crate::api::handlers::sessions::update_session,
        crate::api::handlers::sessions::delete_session,
        crate::api::handlers::sessions::upload_image,
        crate::api::handlers::sessions::export_session,
    ),
    components(
        schemas(
            // Health schemas
            HealthResponse,
            // Catalog schemas
            SpecsResponse,
            PaletteResponse,
            PhotoSpecInfo,
            PaletteEntryInfo,
            // Session schemas
            SessionResponse,
            SessionView,
            SessionUpdate,
            UploadResponse,
            UploadInfo,
            Adjustments,
            // Errors
            ErrorResponse,
            ApiError,
        )
    )
)]
pub struct ApiDoc;
