// Route path constants - single source of truth for all API paths

pub const BOOKINGS: &str = "/bookings";
pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";
