//! Request and response bodies of the HTTP functions.
//!
//! Fields a handler validates itself are read leniently (a non-string becomes
//! `None`) so the caller gets the field's own error message instead of a
//! generic parse failure.

use crate::{
    api::contact_phone::PhoneUpdateResult,
    errors::{GatewayError, ValidationFailure},
    models::contact::string_or_none,
};
use ntex::util::Bytes;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindEventGuestsRequest {
    #[serde(default, deserialize_with = "string_or_none")]
    pub event_id: Option<String>,
    #[serde(default)]
    pub last_checked_timestamp: Option<Value>,
}

impl FindEventGuestsRequest {
    /// The optional lower bound, which must be a string when given.
    pub fn last_checked(&self) -> Result<Option<&str>, GatewayError> {
        match &self.last_checked_timestamp {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(ts)) => Ok(Some(ts.as_str())),
            Some(_) => Err(ValidationFailure::new(
                "lastCheckedTimestamp must be an ISO 8601 date-time.",
            )
            .into()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindEventGuestPhoneRequest {
    #[serde(default, deserialize_with = "string_or_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactPhoneRequest {
    #[serde(default)]
    pub contacts_to_update: Value,
}

#[derive(Debug, Serialize)]
pub struct UpdateContactPhoneResponse {
    pub results: Vec<PhoneUpdateResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpContactData {
    #[serde(default, deserialize_with = "string_or_none")]
    pub secret_key: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub user_id: Option<String>,
}

/// Body of the shared-secret lookup: `{ "data": { "userId", "secretKey" } }`.
#[derive(Debug, Deserialize)]
pub struct FindRsvpContactRequest {
    #[serde(default)]
    pub data: RsvpContactData,
}

/// Parses a JSON request body.
pub fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, GatewayError> {
    serde_json::from_slice(body).map_err(|e| {
        GatewayError::from(ValidationFailure::new(format!(
            "Request body must be valid JSON: {e}"
        )))
    })
}

/// Trimmed, non-empty string field or the given validation error.
pub fn required_field(value: Option<&str>, message: &str) -> Result<String, GatewayError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .ok_or_else(|| ValidationFailure::new(message).into())
}
