use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Custom error type for API endpoints
///
/// Every variant is terminal for the request and renders as a plain-text
/// body. CORS headers are attached by the router's middleware, not here.
#[derive(Debug)]
pub enum ApiError {
    /// No access token configured for this deployment
    ServerMisconfigured,
    /// No key-value store bound to this deployment
    StorageUnavailable,
    /// Backend failure while reading or writing
    StorageError(anyhow::Error),
    /// Missing or wrong bearer token
    Unauthorized,
    /// Request body is not valid JSON
    InvalidPayload,
    /// First required field without a usable value
    MissingField(&'static str),
    /// No route for this method and path
    NotFound,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ServerMisconfigured
            | ApiError::StorageUnavailable
            | ApiError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InvalidPayload | ApiError::MissingField(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::ServerMisconfigured => "Server misconfigured".to_string(),
            ApiError::StorageUnavailable => "Storage unavailable".to_string(),
            ApiError::StorageError(_) => "Storage error".to_string(),
            ApiError::Unauthorized => "Unauthorized".to_string(),
            ApiError::InvalidPayload => "Invalid JSON".to_string(),
            ApiError::MissingField(field) => format!("Missing field: {}", field),
            ApiError::NotFound => "Not Found".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::StorageError(err) => tracing::error!("Storage error: {:#}", err),
            ApiError::ServerMisconfigured => tracing::error!("ACCESS_TOKEN is not configured"),
            ApiError::StorageUnavailable => tracing::error!("No storage backend is configured"),
            _ => {}
        }

        (self.status(), self.message()).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::StorageError(err)
    }
}
