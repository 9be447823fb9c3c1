use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::api_doc::openapi_handler;
use crate::handlers::{create_handler, list_handler, not_found_handler};
use crate::response;
use crate::routes;
use crate::state::AppState;

/// Build the HTTP router
///
/// Preflight and CORS are handled by middleware wrapping every route and
/// the fallback, so even 404s carry CORS headers.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new().route(
        routes::BOOKINGS,
        get(list_handler)
            .post(create_handler)
            // axum answers HEAD from the GET handler unless told otherwise
            .head(not_found_handler)
            .fallback(not_found_handler),
    );

    if state.config.api_docs_enabled {
        router = router.route(routes::OPENAPI_JSON, get(openapi_handler));
    }

    router
        .fallback(not_found_handler)
        .with_state(state)
        .layer(middleware::from_fn(response::cors))
        .layer(TraceLayer::new_for_http())
}
