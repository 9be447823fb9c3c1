use crate::auth;
use crate::error::ApiError;
use crate::models::{Booking, CreateBookingRequest};
use crate::response::PrettyJson;
use crate::routes;
use crate::state::AppState;
use crate::validation;
use axum::{body::Bytes, extract::State, http::HeaderMap, http::StatusCode};

/// POST /bookings handler - Validate and store a new booking
#[utoipa::path(
    post,
    path = routes::BOOKINGS,
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = Booking),
        (status = 400, description = "Invalid JSON or missing required field", body = String, content_type = "text/plain"),
        (status = 401, description = "Missing or invalid bearer token", body = String, content_type = "text/plain"),
        (status = 500, description = "Server misconfigured or storage unavailable", body = String, content_type = "text/plain")
    ),
    security(("bearer" = [])),
    tag = "bookings"
)]
pub async fn create_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<PrettyJson<Booking>, ApiError> {
    auth::check(&headers, &state.config)?;
    let store = state.store()?;

    let booking = validation::new_booking(&body)?;
    store.put(&booking).await?;

    tracing::info!("Created booking with id: {}", booking.id);
    Ok(PrettyJson(StatusCode::CREATED, booking))
}
