use crate::{
    consts,
    errors::{GatewayError, ValidationFailure},
    models::guest::{Guest, GuestQuery},
    services::GuestRegistry,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuestsFound {
    pub message: String,
    pub guests: Vec<Guest>,
}

/// Guests of `event_id` whose attendance changed after `last_checked`
/// (every guest when no timestamp is given), oldest change first.
pub async fn find_new_guests(
    registry: &dyn GuestRegistry,
    event_id: &str,
    last_checked: Option<&str>,
) -> Result<GuestsFound, GatewayError> {
    let query = GuestQuery::new(event_id, last_checked).map_err(|e| {
        ValidationFailure::new(format!(
            "lastCheckedTimestamp must be an ISO 8601 date-time: {e}"
        ))
    })?;

    let guests = registry.query_guests(&query).await.map_err(|err| {
        GatewayError::Upstream(format!(
            "Failed to retrieve guests from Wix Events: {err:#}"
        ))
    })?;
    let guests = query.select(guests);

    let message = if guests.is_empty() {
        consts::MSG_NO_NEW_GUESTS.to_string()
    } else {
        format!("✅ Found {} new guests.", guests.len())
    };

    Ok(GuestsFound { message, guests })
}
