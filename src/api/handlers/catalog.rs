//! Photo spec and backdrop palette endpoints

use actix_web::HttpResponse;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{catalog, palette, PaletteEntryInfo, PhotoSpecInfo};

use super::errors::{spec_error, ErrorResponse};

/// Response for listing photo specs
#[derive(Serialize, ToSchema)]
pub struct SpecsResponse {
    pub success: bool,
    pub data: Vec<PhotoSpecInfo>,
    pub count: usize,
}

/// Response for listing backdrop colors
#[derive(Serialize, ToSchema)]
pub struct PaletteResponse {
    pub success: bool,
    pub data: Vec<PaletteEntryInfo>,
}

/// GET /api/v1/specs - List photo specs in display order
#[utoipa::path(
    get,
    path = "/api/v1/specs",
    tag = "catalog",
    responses(
        (status = 200, description = "All photo specs", body = SpecsResponse),
        (status = 500, description = "Catalog entry could not be parsed", body = ErrorResponse)
    )
)]
pub async fn list_specs() -> HttpResponse {
    let data = match catalog().iter().map(PhotoSpecInfo::try_from).collect::<Result<Vec<_>, _>>() {
        Ok(data) => data,
        Err(e) => return spec_error(&e),
    };

    HttpResponse::Ok().json(SpecsResponse {
        success: true,
        count: data.len(),
        data,
    })
}

/// GET /api/v1/palette - List backdrop colors
#[utoipa::path(
    get,
    path = "/api/v1/palette",
    tag = "catalog",
    responses(
        (status = 200, description = "Backdrop palette", body = PaletteResponse)
    )
)]
pub async fn list_palette() -> HttpResponse {
    HttpResponse::Ok().json(PaletteResponse {
        success: true,
        data: palette().iter().map(PaletteEntryInfo::from).collect(),
    })
}
