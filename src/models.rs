use serde::{Deserialize, Serialize};

/// Key prefix shared by every stored booking
pub const BOOKING_KEY_PREFIX: &str = "booking:";

/// A single appointment record
///
/// Bookings are written once and never updated. Stored values written by
/// older clients may lack `notes`, so it falls back to an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub beneficiary_name: String,
    pub beneficiary_email: String,
    pub beneficiary_phone: String,
    pub service_type: String,
    /// Caller-supplied, stored verbatim
    pub date: String,
    /// Caller-supplied, stored verbatim
    pub time: String,
    pub room: String,
    pub clinician: String,
    #[serde(default)]
    pub notes: String,
    /// ISO 8601 creation timestamp
    pub created_at: String,
}

impl Booking {
    /// Storage key for this booking
    pub fn storage_key(&self) -> String {
        storage_key(&self.id)
    }

    /// Lexical sort key; assumes `date`/`time` are already in a sortable format
    pub fn schedule_key(&self) -> String {
        format!("{} {}", self.date, self.time)
    }
}

pub fn storage_key(id: &str) -> String {
    format!("{}{}", BOOKING_KEY_PREFIX, id)
}

/// Request body for creating a booking
///
/// Only used to document the API; the handler validates the raw JSON itself
/// so it can report the first missing field by name.
#[allow(dead_code)]
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub beneficiary_name: String,
    pub beneficiary_email: String,
    pub beneficiary_phone: String,
    pub service_type: String,
    pub date: String,
    pub time: String,
    pub room: String,
    pub clinician: String,
    pub notes: Option<String>,
}
