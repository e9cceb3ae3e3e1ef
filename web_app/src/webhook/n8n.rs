//! Bearer-protected functions called by n8n workflows.
//!
//! Every handler authenticates first, then validates its body. Any failure is
//! answered with `400 { "error": <message> }`.

use super::{AppState, authorization, log_failure, schemas};
use crate::{
    api::{
        auth_gate::Endpoint,
        contact_phone::update_contact_phones,
        contact_resolver::{ContactResolver, PhoneLookup},
        guests::{GuestsFound, find_new_guests},
    },
    errors::{GatewayError, ValidationFailure},
};
use ntex::{util::Bytes, web};

/// `POST /_functions/findEventGuests`
///
/// # Request Body
/// - `eventId` - Event whose guests are listed
/// - `lastCheckedTimestamp` - Optional RFC 3339 lower bound on the attendance update time
#[web::post("/findEventGuests")]
pub async fn find_event_guests(
    req: web::HttpRequest,
    body: Bytes,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let endpoint = Endpoint::FindEventGuests;
    let _span = logfire::span!("post_findEventGuests").entered();

    let found = guests_since(&req, &body, &app_state)
        .await
        .inspect_err(|err| log_failure(endpoint.name(), err))?;

    logfire::info!(
        "[{endpoint}]: returning {count} guests",
        endpoint = endpoint.to_string(),
        count = found.guests.len() as i64
    );

    Ok(web::HttpResponse::Ok().json(&found))
}

async fn guests_since(
    req: &web::HttpRequest,
    body: &Bytes,
    app_state: &AppState,
) -> Result<GuestsFound, GatewayError> {
    app_state
        .auth_gate
        .verify(authorization(req), Endpoint::FindEventGuests)
        .await?;

    let request: schemas::FindEventGuestsRequest = schemas::parse_body(body)?;
    let event_id = schemas::required_field(request.event_id.as_deref(), "eventId must be a string.")?;
    let last_checked = request.last_checked()?;

    find_new_guests(app_state.guests.as_ref(), &event_id, last_checked).await
}

/// `POST /_functions/findEventGuestPhone`
///
/// # Request Body
/// - `userId` - Contact id
///
/// # Returns
/// `{ message, phone }`, with an empty `phone` when the contact has none
#[web::post("/findEventGuestPhone")]
pub async fn find_event_guest_phone(
    req: web::HttpRequest,
    body: Bytes,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let endpoint = Endpoint::FindEventGuestPhone;
    let _span = logfire::span!("post_findEventGuestPhone").entered();

    let found = guest_phone(&req, &body, &app_state)
        .await
        .inspect_err(|err| log_failure(endpoint.name(), err))?;

    Ok(web::HttpResponse::Ok().json(&found))
}

async fn guest_phone(
    req: &web::HttpRequest,
    body: &Bytes,
    app_state: &AppState,
) -> Result<PhoneLookup, GatewayError> {
    app_state
        .auth_gate
        .verify(authorization(req), Endpoint::FindEventGuestPhone)
        .await?;

    let request: schemas::FindEventGuestPhoneRequest = schemas::parse_body(body)?;
    let user_id = schemas::required_field(request.user_id.as_deref(), "userId must be a string.")?;

    Ok(ContactResolver::new(app_state.contacts.as_ref())
        .find_phone(&user_id)
        .await?)
}

/// `POST /_functions/updateContactPhone`
///
/// # Request Body
/// - `contactsToUpdate` - Non-empty array of `{ email, phone }`, where `phone`
///   is a string or `{ countryCode?, number }`
///
/// # Returns
/// `{ results }` with one entry per requested contact, in request order
#[web::post("/updateContactPhone")]
pub async fn update_contact_phone(
    req: web::HttpRequest,
    body: Bytes,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let endpoint = Endpoint::UpdateContactPhone;
    let _span = logfire::span!("post_updateContactPhone").entered();

    let response = phone_updates(&req, &body, &app_state)
        .await
        .inspect_err(|err| log_failure(endpoint.name(), err))?;

    let updated = response.results.iter().filter(|r| r.success).count();
    logfire::info!(
        "[{endpoint}]: {updated} of {total} contacts updated",
        endpoint = endpoint.to_string(),
        updated = updated as i64,
        total = response.results.len() as i64
    );

    Ok(web::HttpResponse::Ok().json(&response))
}

async fn phone_updates(
    req: &web::HttpRequest,
    body: &Bytes,
    app_state: &AppState,
) -> Result<schemas::UpdateContactPhoneResponse, GatewayError> {
    app_state
        .auth_gate
        .verify(authorization(req), Endpoint::UpdateContactPhone)
        .await?;

    let request: schemas::UpdateContactPhoneRequest = schemas::parse_body(body)?;
    let items = request
        .contacts_to_update
        .as_array()
        .filter(|items| !items.is_empty())
        .ok_or_else(|| ValidationFailure::new("contactsToUpdate must be a non-empty array."))?;

    let results = update_contact_phones(
        app_state.contacts.as_ref(),
        items,
        &app_state.settings.default_phone_country_code,
    )
    .await;

    Ok(schemas::UpdateContactPhoneResponse { results })
}
