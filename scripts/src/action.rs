use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{config::AppConfig, utils};
use anyhow::Context;
use envconfig::Envconfig;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    FindEventGuests,
    FindEventGuestPhone,
    UpdateContactPhone,
    AutomationEmail,
    AutomationLabel,
}

impl Endpoint {
    /// Environment variable holding the endpoint's signing secret.
    pub fn secret_var(&self) -> &'static str {
        match self {
            Endpoint::FindEventGuests => "FIND_EVENT_GUESTS_JWT_SECRET",
            Endpoint::FindEventGuestPhone => "FIND_EVENT_GUEST_PHONE_JWT_SECRET",
            Endpoint::UpdateContactPhone => "UPDATE_CONTACT_PHONE_JWT_SECRET",
            Endpoint::AutomationEmail => "AUTOMATION_EMAIL_JWT_SECRET",
            Endpoint::AutomationLabel => "AUTOMATION_LABEL_JWT_SECRET",
        }
    }

    fn secret<'a>(&self, config: &'a AppConfig) -> Option<&'a str> {
        match self {
            Endpoint::FindEventGuests => config.find_event_guests_jwt_secret.as_deref(),
            Endpoint::FindEventGuestPhone => config.find_event_guest_phone_jwt_secret.as_deref(),
            Endpoint::UpdateContactPhone => config.update_contact_phone_jwt_secret.as_deref(),
            Endpoint::AutomationEmail => config.automation_email_jwt_secret.as_deref(),
            Endpoint::AutomationLabel => config.automation_label_jwt_secret.as_deref(),
        }
        .filter(|secret| !secret.is_empty())
    }
}

#[derive(Args, Debug, Clone)]
pub struct MintTokenArgs {
    /// Endpoint the token is valid for
    #[arg(short, long, value_enum)]
    endpoint: Endpoint,

    /// Seconds until the token expires
    #[arg(long, default_value_t = 900)]
    ttl_secs: i64,

    /// Subject claim expected by the gateway
    #[arg(long, default_value = "n8n")]
    subject: String,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Action {
    MintToken(MintTokenArgs),
}

/// Operator tools for the contact gateway
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct AppArgs {
    #[command(subcommand)]
    pub action: Action,
}

impl AppArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.action {
            Action::MintToken(MintTokenArgs {
                endpoint,
                ttl_secs,
                subject,
            }) => {
                let config = AppConfig::init_from_env()?;
                let secret = endpoint
                    .secret(&config)
                    .with_context(|| format!("{} is not set", endpoint.secret_var()))?;

                let token = utils::mint_token(
                    secret,
                    subject,
                    *ttl_secs,
                    chrono::Utc::now().timestamp(),
                )?;
                println!("{}", serde_json::json!({ "token": token }));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_mint_token_defaults() {
        let args =
            AppArgs::try_parse_from(["gateway-scripts", "mint-token", "--endpoint", "update-contact-phone"])
                .unwrap();
        let Action::MintToken(mint) = args.action;
        assert_eq!(mint.endpoint, Endpoint::UpdateContactPhone);
        assert_eq!(mint.ttl_secs, 900);
        assert_eq!(mint.subject, "n8n");
    }

    #[test]
    fn test_endpoint_secret_lookup() {
        let config = AppConfig::init_from_hashmap(&HashMap::from([
            ("AUTOMATION_LABEL_JWT_SECRET".to_string(), "label-secret".to_string()),
            ("FIND_EVENT_GUESTS_JWT_SECRET".to_string(), String::new()),
        ]))
        .unwrap();

        assert_eq!(Endpoint::AutomationLabel.secret(&config), Some("label-secret"));
        assert_eq!(Endpoint::FindEventGuests.secret(&config), None);
        assert_eq!(Endpoint::AutomationEmail.secret(&config), None);
    }
}
