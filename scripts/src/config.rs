use envconfig::Envconfig;

/// Signing secrets shared with the n8n workflows, one per endpoint.
/// Only the secret of the endpoint a token is minted for must be set.
#[derive(Envconfig, Clone)]
pub struct AppConfig {
    pub find_event_guests_jwt_secret: Option<String>,
    pub find_event_guest_phone_jwt_secret: Option<String>,
    pub update_contact_phone_jwt_secret: Option<String>,
    pub automation_email_jwt_secret: Option<String>,
    pub automation_label_jwt_secret: Option<String>,
}
