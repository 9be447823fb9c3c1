use crate::config::Config;
use crate::store::BookingStore;
use std::sync::Arc;

/// Shared application state, immutable for the life of the process
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// `None` when no storage backend is bound
    pub store: Option<BookingStore>,
}

impl AppState {
    pub fn store(&self) -> Result<&BookingStore, crate::error::ApiError> {
        self.store.as_ref().ok_or(crate::error::ApiError::StorageUnavailable)
    }
}
