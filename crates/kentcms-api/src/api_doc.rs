//! OpenAPI documentation.

use crate::error::ErrorResponse;
use crate::handlers;
use kentcms_core::models;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "KentCMS Media API",
        version = "0.1.0",
        description = "Media backend for the municipal CMS: uploads with validation, \
                       threat scanning and image renditions, embed links, and the media \
                       library query API. All endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::media_upload::upload_media,
        handlers::media_list::list_media,
        handlers::media_get::get_media,
        handlers::media_delete::delete_media,
        handlers::categories::list_categories,
        handlers::categories::create_category,
        handlers::categories::delete_category,
    ),
    components(schemas(
        models::MediaResponse,
        models::MediaType,
        models::Pagination,
        models::ImageProcessingSummary,
        models::ImageOriginalInfo,
        models::ImageVariantInfo,
        models::ImageProcessingStats,
        models::CategoryResponse,
        models::NewCategory,
        handlers::media_upload::UploadResponse,
        handlers::media_list::MediaListResponse,
        handlers::categories::CategoryListResponse,
        ErrorResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "media", description = "Media upload and library operations"),
        (name = "categories", description = "Media category management")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
