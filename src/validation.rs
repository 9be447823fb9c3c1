use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::Booking;

/// Required fields, in the order they are checked
pub const REQUIRED_FIELDS: [&str; 8] = [
    "beneficiaryName",
    "beneficiaryEmail",
    "beneficiaryPhone",
    "serviceType",
    "date",
    "time",
    "room",
    "clinician",
];

/// Required fields kept exactly as sent; any non-empty string will do
const VERBATIM_FIELDS: [&str; 2] = ["date", "time"];

/// Parse and validate a creation request body into a new booking
pub fn new_booking(body: &[u8]) -> Result<Booking, ApiError> {
    new_booking_at(body, Uuid::new_v4(), Utc::now())
}

pub(crate) fn new_booking_at(
    body: &[u8],
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<Booking, ApiError> {
    let payload: JsonValue = serde_json::from_slice(body).map_err(|_| ApiError::InvalidPayload)?;

    // Anything other than an object has no fields at all.
    let empty = Map::new();
    let fields = payload.as_object().unwrap_or(&empty);

    if let Some(missing) = REQUIRED_FIELDS
        .into_iter()
        .find(|field| required(fields, field).is_none())
    {
        return Err(ApiError::MissingField(missing));
    }

    let value = |field: &str| required(fields, field).unwrap_or_default();
    let trimmed = |field: &str| value(field).trim().to_string();
    let verbatim = |field: &str| value(field).to_string();

    Ok(Booking {
        id: id.to_string(),
        beneficiary_name: trimmed("beneficiaryName"),
        beneficiary_email: trimmed("beneficiaryEmail"),
        beneficiary_phone: trimmed("beneficiaryPhone"),
        service_type: trimmed("serviceType"),
        date: verbatim("date"),
        time: verbatim("time"),
        room: trimmed("room"),
        clinician: trimmed("clinician"),
        notes: fields
            .get("notes")
            .and_then(JsonValue::as_str)
            .map(|notes| notes.trim().to_string())
            .unwrap_or_default(),
        created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// A required field's string value, if it counts as present
///
/// Verbatim fields only need a non-empty string. The others are stored
/// trimmed, so they need visible content.
fn required<'a>(fields: &'a Map<String, JsonValue>, field: &str) -> Option<&'a str> {
    let value = fields
        .get(field)
        .and_then(JsonValue::as_str)
        .filter(|value| !value.is_empty())?;

    if VERBATIM_FIELDS.contains(&field) {
        Some(value)
    } else {
        (!value.trim().is_empty()).then_some(value)
    }
}
