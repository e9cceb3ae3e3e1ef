use ntex::web;

/// Configures the HTTP functions.
///
/// # Routes
/// - `POST /_functions/findRsvpContactById` - Shared-secret contact phone lookup
/// - `POST /_functions/findEventGuests` - Event guests changed since a timestamp
/// - `POST /_functions/findEventGuestPhone` - Contact phone lookup
/// - `POST /_functions/updateContactPhone` - Batch phone update by email
pub fn functions(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/_functions").service((
        super::legacy::find_rsvp_contact_by_id,
        super::n8n::find_event_guests,
        super::n8n::find_event_guest_phone,
        super::n8n::update_contact_phone,
    )));
}

/// Configures the waitlist automation actions.
///
/// # Routes
/// - `POST /automation/waitlist/email` - Email or record the contact
/// - `POST /automation/waitlist/label` - Label contacts without a phone
pub fn automation(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/automation/waitlist").service((
        super::automation::waitlist_email,
        super::automation::waitlist_label,
    )));
}

/// Fallback for unknown paths.
pub async fn not_found() -> web::HttpResponse {
    web::HttpResponse::NotFound().json(&serde_json::json!({ "error": "Not found." }))
}
