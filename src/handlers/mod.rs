pub mod create;
pub mod list;

pub use create::create_handler;
pub use list::list_handler;

use crate::error::ApiError;

/// Fallback for every unmatched method or path
pub async fn not_found_handler() -> ApiError {
    ApiError::NotFound
}
