//! API module - HTTP routes and handlers

pub mod handlers;
pub mod openapi;

use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::openapi::ApiDoc;

/// Configure all API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/specs", web::get().to(handlers::catalog::list_specs))
            .route("/palette", web::get().to(handlers::catalog::list_palette))
            .route("/composite", web::post().to(handlers::composite::composite_image))
            .service(
                web::scope("/sessions")
                    .route("", web::post().to(handlers::sessions::create_session))
                    // More specific routes first
                    .route("/{id}/upload", web::post().to(handlers::sessions::upload_image))
                    .route("/{id}/export", web::get().to(handlers::sessions::export_session))
                    .route("/{id}", web::get().to(handlers::sessions::get_session))
                    .route("/{id}", web::patch().to(handlers::sessions::update_session))
                    .route("/{id}", web::delete().to(handlers::sessions::delete_session))
            )
    )
    .route("/health", web::get().to(handlers::health::health_check))
    // Swagger UI and OpenAPI spec
    .service(
        SwaggerUi::new("/swagger-ui/{_:.*}")
            .url("/api-docs/openapi.json", ApiDoc::openapi())
    );
}
