//! Application configuration management with security considerations.
//!
//! All values come from environment variables. Sensitive fields are marked and
//! must never be logged. Secret *values* (JWT signing keys, shared secrets) are
//! not configured here at all: only the identifiers used to fetch them from the
//! remote vault at request time.

use crate::{
    api::{auth_gate::Endpoint, automation::WaitlistSettings},
    services::wix::ServiceCredential,
    webhook::GatewaySettings,
};
use envconfig::Envconfig;
use std::{collections::HashMap, sync::OnceLock};

/// Application configuration with security-aware field management.
#[derive(Envconfig, Clone)]
pub struct AppConfig {
    /// Environment name to deploy the app (NON-SENSITIVE)
    /// Values: "local", "dev", "staging", "prod"
    #[envconfig(default = "local")]
    pub env: String,

    /// Host address for web server binding (NON-SENSITIVE)
    #[envconfig(default = "0.0.0.0")]
    pub web_server_host: String,

    /// Port for web server binding (NON-SENSITIVE)
    #[envconfig(default = "8080")]
    pub web_server_port: u16,

    /// Path to SSL private key file (SENSITIVE PATH)
    #[envconfig(default = "server.key")]
    pub private_key_path: String,

    /// Path to SSL certificate file (NON-SENSITIVE)
    #[envconfig(default = "server.crt")]
    pub certificate_path: String,

    /// 🔒 SENSITIVE: Logfire write token. Traces stay local when unset.
    pub logfire_token: Option<String>,

    /// Base URL of the site REST APIs (NON-SENSITIVE)
    #[envconfig(default = "https://www.wixapis.com")]
    pub wix_api_base_url: String,

    /// 🔒 SENSITIVE: API key granted to this service for the contacts,
    /// events, secrets, emails and data APIs.
    pub wix_api_key: String,

    /// Site the API key is scoped to (NON-SENSITIVE)
    pub wix_site_id: String,

    /// Vault identifier of the signing secret for `findEventGuests` (NON-SENSITIVE)
    pub secret_id_find_event_guests: String,

    /// Vault identifier of the signing secret for `findEventGuestPhone` (NON-SENSITIVE)
    pub secret_id_find_event_guest_phone: String,

    /// Vault identifier of the signing secret for `updateContactPhone` (NON-SENSITIVE)
    pub secret_id_update_contact_phone: String,

    /// Vault identifier of the signing secret for the email automation (NON-SENSITIVE)
    pub secret_id_automation_email: String,

    /// Vault identifier of the signing secret for the label automation (NON-SENSITIVE)
    pub secret_id_automation_label: String,

    /// Vault identifier of the plain shared secret used by `findRsvpContactById` (NON-SENSITIVE)
    pub secret_id_find_rsvp_contact: String,

    /// Subject claim every bearer token must carry
    #[envconfig(default = "n8n")]
    pub jwt_expected_subject: String,

    /// Seconds a fetched secret may be reused. 0 disables caching.
    #[envconfig(default = "0")]
    pub secret_cache_ttl_secs: u64,

    /// Country code applied to phone updates that don't name one
    #[envconfig(default = "HU")]
    pub default_phone_country_code: String,

    /// Triggered email sent to waitlisted contacts without a phone
    #[envconfig(default = "waitlist_phone_number")]
    pub waitlist_email_template_id: String,

    /// Collection receiving waitlisted contacts that already have a phone
    #[envconfig(default = "ContactsWithPhone")]
    pub contacts_with_phone_collection: String,

    /// Label attached to waitlisted contacts without a phone
    #[envconfig(default = "Needs Phone")]
    pub needs_phone_label: String,
}

impl AppConfig {
    /// Checks if running in production environment
    pub fn is_prod(&self) -> bool {
        self.env.to_lowercase() == "prod"
    }

    /// Credential handed to every remote collaborator client
    pub fn service_credential(&self) -> ServiceCredential {
        ServiceCredential {
            api_key: self.wix_api_key.clone(),
            site_id: self.wix_site_id.clone(),
        }
    }

    /// Non-secret values the HTTP handlers need.
    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            legacy_secret_id: self.secret_id_find_rsvp_contact.clone(),
            default_phone_country_code: self.default_phone_country_code.clone(),
            waitlist: WaitlistSettings {
                email_template_id: self.waitlist_email_template_id.clone(),
                contacts_with_phone_collection: self.contacts_with_phone_collection.clone(),
                needs_phone_label: self.needs_phone_label.clone(),
            },
        }
    }

    /// Maps every bearer-protected endpoint to the vault entry holding its secret.
    pub fn endpoint_secrets(&self) -> HashMap<Endpoint, String> {
        HashMap::from([
            (
                Endpoint::FindEventGuests,
                self.secret_id_find_event_guests.clone(),
            ),
            (
                Endpoint::FindEventGuestPhone,
                self.secret_id_find_event_guest_phone.clone(),
            ),
            (
                Endpoint::UpdateContactPhone,
                self.secret_id_update_contact_phone.clone(),
            ),
            (
                Endpoint::AutomationEmail,
                self.secret_id_automation_email.clone(),
            ),
            (
                Endpoint::AutomationLabel,
                self.secret_id_automation_label.clone(),
            ),
        ])
    }

    /// Fails when two endpoints, the shared-secret lookup included, point at
    /// the same vault entry.
    pub fn validate_secret_ids(&self) -> anyhow::Result<()> {
        let ids = self
            .endpoint_secrets()
            .into_iter()
            .map(|(endpoint, id)| (endpoint.name(), id))
            .chain([(
                "post_findRsvpContactById",
                self.secret_id_find_rsvp_contact.clone(),
            )]);

        let mut seen: HashMap<String, &str> = HashMap::new();
        for (owner, id) in ids {
            if let Some(other) = seen.insert(id.clone(), owner) {
                anyhow::bail!("{owner} and {other} share the vault secret id {id:?}");
            }
        }
        Ok(())
    }
}

/// Global application configuration, set once by [`init_config`].
pub static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Loads the configuration from the environment into [`APP_CONFIG`].
pub fn init_config() -> anyhow::Result<()> {
    let app_config = AppConfig::init_from_env()?;
    app_config.validate_secret_ids()?;
    APP_CONFIG
        .set(app_config)
        .map_err(|_| anyhow::anyhow!("app config was already initialized"))
}
