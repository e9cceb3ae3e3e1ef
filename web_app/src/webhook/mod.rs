//! HTTP handlers called by external automation.
//!
//! ## Modules
//!
//! - [`n8n`] - Bearer-protected lookups and the batch phone update
//! - [`legacy`] - Shared-secret contact lookup kept for older automations
//! - [`automation`] - Waitlist automation actions
//! - [`routes`] - Route configuration

pub mod automation;
pub mod legacy;
pub mod n8n;
pub mod routes;
pub mod schemas;

use crate::{
    api::{auth_gate::AuthGate, automation::WaitlistSettings},
    consts, errors, services,
};
use ntex::web;

/// Values the handlers need besides their collaborators.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub legacy_secret_id: String,
    pub default_phone_country_code: String,
    pub waitlist: WaitlistSettings,
}

pub struct AppState {
    pub auth_gate: AuthGate,
    pub secrets: services::ImplSecretStore,
    pub contacts: services::ImplContactDirectory,
    pub guests: services::ImplGuestRegistry,
    pub emails: services::ImplEmailSender,
    pub labels: services::ImplLabelService,
    pub collections: services::ImplCollectionWriter,
    pub settings: GatewaySettings,
}

/// Raw `Authorization` header value. A value that isn't visible ASCII is
/// passed on as empty so it fails the bearer prefix check.
pub fn authorization(req: &web::HttpRequest) -> Option<&str> {
    req.headers()
        .get(consts::AUTHORIZATION_HEADER)
        .map(|value| value.to_str().unwrap_or_default())
}

fn log_failure(endpoint: &str, err: &errors::GatewayError) {
    logfire::warn!(
        "[{endpoint}]: request rejected: {error}",
        endpoint = endpoint.to_string(),
        error = err.to_string()
    );
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::{
        api::auth_gate::Endpoint,
        services::{
            MockCollectionWriter, MockContactDirectory, MockEmailSender, MockGuestRegistry,
            MockLabelService, MockSecretStore,
        },
    };
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    use serde_json::json;
    use std::{collections::HashMap, sync::Arc};

    pub const LEGACY_SECRET: &str = "legacy-shared-secret";

    /// Signing secret of each endpoint in the mocked vault.
    pub fn endpoint_secret(endpoint: Endpoint) -> String {
        format!("{}-signing-secret", endpoint.name())
    }

    pub fn bearer(endpoint: Endpoint) -> String {
        let token = encode(
            &Header::new(Algorithm::HS256),
            &json!({"sub": "n8n", "iat": chrono::Utc::now().timestamp()}),
            &EncodingKey::from_secret(endpoint_secret(endpoint).as_bytes()),
        )
        .unwrap();
        format!("Bearer {token}")
    }

    fn vault() -> MockSecretStore {
        let mut store = MockSecretStore::new();
        store.expect_get_secret_value().returning(|name| {
            Ok(match name {
                "vault-legacy" => Some(LEGACY_SECRET.to_string()),
                other => other
                    .strip_prefix("vault-")
                    .map(|endpoint| format!("{endpoint}-signing-secret")),
            })
        });
        store
    }

    /// Collaborators a test may script before building the state.
    #[derive(Default)]
    pub struct Mocks {
        pub contacts: MockContactDirectory,
        pub guests: MockGuestRegistry,
        pub emails: MockEmailSender,
        pub labels: MockLabelService,
        pub collections: MockCollectionWriter,
    }

    impl Mocks {
        pub fn into_state(self) -> AppState {
            let secrets: services::ImplSecretStore = Arc::new(vault());
            let endpoint_secrets: HashMap<_, _> = [
                Endpoint::FindEventGuests,
                Endpoint::FindEventGuestPhone,
                Endpoint::UpdateContactPhone,
                Endpoint::AutomationEmail,
                Endpoint::AutomationLabel,
            ]
            .into_iter()
            .map(|endpoint| (endpoint, format!("vault-{}", endpoint.name())))
            .collect();

            AppState {
                auth_gate: AuthGate::new(secrets.clone(), endpoint_secrets, "n8n"),
                secrets,
                contacts: Box::new(self.contacts),
                guests: Box::new(self.guests),
                emails: Box::new(self.emails),
                labels: Box::new(self.labels),
                collections: Box::new(self.collections),
                settings: GatewaySettings {
                    legacy_secret_id: "vault-legacy".into(),
                    default_phone_country_code: "HU".into(),
                    waitlist: WaitlistSettings {
                        email_template_id: "waitlist_phone_number".into(),
                        contacts_with_phone_collection: "ContactsWithPhone".into(),
                        needs_phone_label: "Needs Phone".into(),
                    },
                },
            }
        }
    }
}
