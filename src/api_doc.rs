use axum::http::StatusCode;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use crate::models::{Booking, CreateBookingRequest};
use crate::response::PrettyJson;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "booking-registry API",
        version = "1.0.0",
        description = "A booking registry backed by a key-value store, guarded by a shared bearer token"
    ),
    paths(
        handlers::list::list_handler,
        handlers::create::create_handler
    ),
    components(
        schemas(
            Booking,
            CreateBookingRequest
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "bookings", description = "Booking operations")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// GET /api-docs/openapi.json handler
pub async fn openapi_handler() -> PrettyJson<utoipa::openapi::OpenApi> {
    PrettyJson(StatusCode::OK, ApiDoc::openapi())
}
