//! # Batch phone update
//!
//! Each requested contact is resolved by email and updated on its own task.
//! Results keep the request order and a failing item never aborts the others.

use super::contact_resolver::ContactResolver;
use crate::{
    errors::{GatewayError, ValidationFailure},
    models::contact::{PhoneEntry, has_phone_value, string_or_none},
    services::ContactDirectory,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Phone as sent by the caller: a bare number or a number with its country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneInput {
    pub country_code: Option<String>,
    pub number: String,
}

impl PhoneInput {
    /// Accepts `"+36..."` or `{ "countryCode"?: "HU", "number": "+36..." }`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(_) if has_phone_value(value) => Some(Self {
                country_code: None,
                number: value.as_str()?.to_string(),
            }),
            Value::Object(map) => {
                let number = map.get("number").filter(|n| has_phone_value(n))?;
                let country_code = map
                    .get("countryCode")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|cc| !cc.is_empty())
                    .map(String::from);

                Some(Self {
                    country_code,
                    number: number.as_str()?.to_string(),
                })
            }
            _ => None,
        }
    }

    pub fn to_entry(&self, default_country_code: &str) -> PhoneEntry {
        PhoneEntry::primary(
            self.country_code.as_deref().unwrap_or(default_country_code),
            &self.number,
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhoneUpdateItem {
    #[serde(default, deserialize_with = "string_or_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneUpdateResult {
    pub email: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PhoneUpdateResult {
    fn updated(email: &str) -> Self {
        Self {
            email: Some(email.to_string()),
            success: true,
            message: Some(format!("✅ Phone number updated successfully for {email}.")),
            error: None,
        }
    }

    fn failed(email: Option<String>, err: &GatewayError) -> Self {
        Self {
            email,
            success: false,
            message: None,
            error: Some(err.client_message()),
        }
    }
}

/// Updates every item concurrently, one result per item in request order.
pub async fn update_contact_phones(
    directory: &dyn ContactDirectory,
    items: &[Value],
    default_country_code: &str,
) -> Vec<PhoneUpdateResult> {
    let resolver = ContactResolver::new(directory);

    join_all(
        items
            .iter()
            .map(|item| update_one(&resolver, item, default_country_code)),
    )
    .await
}

async fn update_one(
    resolver: &ContactResolver<'_>,
    item: &Value,
    default_country_code: &str,
) -> PhoneUpdateResult {
    let item: PhoneUpdateItem = serde_json::from_value(item.clone()).unwrap_or_default();
    let email = item.email.clone();

    match apply_update(resolver, &item, default_country_code).await {
        Ok(email) => {
            logfire::info!(
                "[post_updateContactPhone]: phone updated for {email}",
                email = email.clone()
            );
            PhoneUpdateResult::updated(&email)
        }
        Err(err) => {
            logfire::warn!(
                "[post_updateContactPhone]: update failed: {error}",
                error = err.to_string()
            );
            PhoneUpdateResult::failed(email, &err)
        }
    }
}

async fn apply_update(
    resolver: &ContactResolver<'_>,
    item: &PhoneUpdateItem,
    default_country_code: &str,
) -> Result<String, GatewayError> {
    let email = item.email.as_deref().unwrap_or_default();
    let contact = resolver.find_unique_by_email(email).await?;

    let phone = PhoneInput::from_value(&item.phone)
        .ok_or_else(|| ValidationFailure::new("Invalid contactPhone provided."))?;

    resolver
        .update_phone(&contact, &phone.to_entry(default_country_code))
        .await?;

    Ok(email.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::MutationFailure,
        models::contact::{Contact, Revision},
        services::MockContactDirectory,
    };
    use mockall::predicate::*;
    use serde_json::json;

    fn contact(id: &str, email: &str, revision: &str) -> Contact {
        Contact {
            id: id.to_string(),
            email: Some(email.to_string()),
            phone: None,
            revision: Some(Revision(revision.to_string())),
        }
    }

    #[test]
    fn test_phone_input_shapes() {
        assert_eq!(
            PhoneInput::from_value(&json!("+36301234567")),
            Some(PhoneInput {
                country_code: None,
                number: "+36301234567".into()
            })
        );
        assert_eq!(
            PhoneInput::from_value(&json!({"countryCode": "AT", "number": "+43660123"})),
            Some(PhoneInput {
                country_code: Some("AT".into()),
                number: "+43660123".into()
            })
        );
        assert_eq!(
            PhoneInput::from_value(&json!({"number": "+36301234567"}))
                .map(|p| p.to_entry("HU").country_code),
            Some("HU".to_string())
        );
        assert_eq!(PhoneInput::from_value(&json!("  ")), None);
        assert_eq!(PhoneInput::from_value(&json!(36301234567u64)), None);
        assert_eq!(PhoneInput::from_value(&json!({"countryCode": "HU"})), None);
        assert_eq!(PhoneInput::from_value(&Value::Null), None);
    }

    #[ntex::test]
    async fn test_batch_reports_success_and_failure_in_order() {
        let mut directory = MockContactDirectory::new();
        directory
            .expect_query_contacts_by_email()
            .with(eq("one@example.com"))
            .times(1)
            .returning(|_| Ok(vec![contact("c1", "one@example.com", "5")]));
        directory
            .expect_query_contacts_by_email()
            .with(eq("ghost@example.com"))
            .times(1)
            .returning(|_| Ok(vec![]));
        directory
            .expect_update_contact_phone()
            .withf(|id, revision, phone| {
                id == "c1"
                    && revision == &Revision("5".into())
                    && phone.country_code == "HU"
                    && phone.phone == "+36301234567"
            })
            .times(1)
            .returning(|_, _, _| Ok(contact("c1", "one@example.com", "6")));

        let items = vec![
            json!({"email": "ghost@example.com", "phone": "+36300000000"}),
            json!({"email": "one@example.com", "phone": {"number": "+36301234567"}}),
        ];
        let results = update_contact_phones(&directory, &items, "HU").await;

        assert_eq!(
            results,
            vec![
                PhoneUpdateResult {
                    email: Some("ghost@example.com".into()),
                    success: false,
                    message: None,
                    error: Some("No contact found for the provided email address.".into()),
                },
                PhoneUpdateResult {
                    email: Some("one@example.com".into()),
                    success: true,
                    message: Some(
                        "✅ Phone number updated successfully for one@example.com.".into()
                    ),
                    error: None,
                },
            ]
        );
    }

    #[ntex::test]
    async fn test_batch_item_failures_are_isolated() {
        let mut directory = MockContactDirectory::new();
        directory
            .expect_query_contacts_by_email()
            .with(eq("dup@example.com"))
            .returning(|_| {
                Ok(vec![
                    contact("a", "dup@example.com", "1"),
                    contact("b", "dup@example.com", "1"),
                ])
            });
        directory
            .expect_query_contacts_by_email()
            .with(eq("stale@example.com"))
            .returning(|_| Ok(vec![contact("s", "stale@example.com", "2")]));
        directory
            .expect_update_contact_phone()
            .times(1)
            .returning(|_, _, _| Err(MutationFailure::ConcurrentModification));

        let items = vec![
            json!({"email": "dup@example.com", "phone": "+361"}),
            json!({"email": 42, "phone": "+362"}),
            json!("not an object"),
            json!({"email": "stale@example.com", "phone": "+363"}),
        ];
        let results = update_contact_phones(&directory, &items, "HU").await;

        let errors: Vec<_> = results.iter().map(|r| r.error.as_deref()).collect();
        assert_eq!(
            errors,
            vec![
                Some("Found more than one contact with the same email address."),
                Some("Invalid contactEmail provided."),
                Some("Invalid contactEmail provided."),
                Some("Failed to update contact phone: contact revision is stale."),
            ]
        );
        assert!(results.iter().all(|r| !r.success));
        assert_eq!(results[1].email, None);
    }

    #[ntex::test]
    async fn test_invalid_phone_is_reported_per_item() {
        let mut directory = MockContactDirectory::new();
        directory
            .expect_query_contacts_by_email()
            .returning(|_| Ok(vec![contact("c1", "one@example.com", "1")]));
        directory.expect_update_contact_phone().never();

        let results = update_contact_phones(
            &directory,
            &[json!({"email": "one@example.com", "phone": "   "})],
            "HU",
        )
        .await;

        assert_eq!(
            results[0].error.as_deref(),
            Some("Invalid contactPhone provided.")
        );
    }
}
