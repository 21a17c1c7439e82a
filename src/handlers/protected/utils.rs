use uuid::Uuid;

use crate::error::ApiError;

/// Path and query ids arrive as text; a malformed one is a 400 in the API's
/// error format rather than axum's plain-text rejection.
pub fn parse_uuid(field: &str, value: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(value.trim()).map_err(|_| ApiError::field_error(field, format!("Invalid UUID format: {}", value)))
}

pub fn parse_optional_uuid(field: &str, value: Option<&str>) -> Result<Option<Uuid>, ApiError> {
    value.map(|v| parse_uuid(field, v)).transpose()
}

/// `?limit=` must be a positive integer when present.
pub fn parse_limit(value: Option<&str>) -> Result<Option<u32>, ApiError> {
    match value {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(limit) if limit > 0 => Ok(Some(limit)),
            _ => Err(ApiError::field_error("limit", "Must be a positive integer")),
        },
    }
}
