//! Contacts store client (lookup by id, query by email, revision-checked update).

use super::wix::{self, WixApi};
use crate::{
    consts,
    errors::MutationFailure,
    models::contact::{Contact, PhoneEntry, Revision, string_or_none},
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrimaryInfo {
    #[serde(default)]
    email: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactRecord {
    #[serde(alias = "_id")]
    id: String,
    #[serde(default)]
    revision: Option<Revision>,
    #[serde(default)]
    primary_info: Option<PrimaryInfo>,
}

impl From<ContactRecord> for Contact {
    fn from(record: ContactRecord) -> Self {
        let (email, phone) = record
            .primary_info
            .map(|info| (info.email, info.phone))
            .unwrap_or_default();

        Contact {
            id: record.id,
            email,
            phone,
            revision: record.revision,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContactEnvelope {
    contact: ContactRecord,
}

#[derive(Debug, Deserialize)]
struct ContactsPage {
    #[serde(default)]
    contacts: Vec<ContactRecord>,
}

/// Body of the email-equality query.
pub fn email_query_body(email: &str) -> Value {
    json!({
        "query": {
            "filter": { "primaryInfo.email": { "$eq": email } }
        }
    })
}

/// Body of the phone replacement, carrying the revision the store must still hold.
pub fn phone_update_body(revision: &Revision, phone: &PhoneEntry) -> Value {
    json!({
        "revision": revision.to_wire(),
        "info": {
            "phones": { "items": [phone] }
        }
    })
}

/// Maps a rejected update to the failure the resolver reports.
pub fn classify_update_failure(status: StatusCode, body: &str) -> MutationFailure {
    match status {
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
            MutationFailure::ConcurrentModification
        }
        _ => MutationFailure::UpdateError(format!(
            "contacts API returned error status {status}: {body}"
        )),
    }
}

#[derive(Clone)]
pub struct WixContactsClient {
    pub api: WixApi,
}

#[async_trait]
impl crate::services::ContactDirectory for WixContactsClient {
    async fn get_contact(&self, contact_id: &str) -> anyhow::Result<Option<Contact>> {
        let response = self
            .api
            .request(Method::GET, consts::WIX_CONTACTS_PATH, &[contact_id])?
            .send()
            .await
            .context("Failed to send request to contacts API")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let envelope: ContactEnvelope = wix::read_json(response, "contacts API").await?;
        Ok(Some(envelope.contact.into()))
    }

    async fn query_contacts_by_email(&self, email: &str) -> anyhow::Result<Vec<Contact>> {
        let response = self
            .api
            .request(Method::POST, consts::WIX_CONTACTS_QUERY_PATH, &[])?
            .json(&email_query_body(email))
            .send()
            .await
            .context("Failed to send query to contacts API")?;

        let page: ContactsPage = wix::read_json(response, "contacts query API").await?;
        Ok(page.contacts.into_iter().map(Contact::from).collect())
    }

    async fn update_contact_phone(
        &self,
        contact_id: &str,
        revision: &Revision,
        phone: &PhoneEntry,
    ) -> Result<Contact, MutationFailure> {
        let request = self
            .api
            .request(Method::PATCH, consts::WIX_CONTACTS_PATH, &[contact_id])
            .map_err(|e| MutationFailure::UpdateError(e.to_string()))?;

        let response = request
            .json(&phone_update_body(revision, phone))
            .send()
            .await
            .map_err(|e| MutationFailure::UpdateError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = wix::error_body(response).await;
            return Err(classify_update_failure(status, &body));
        }

        response
            .json::<ContactEnvelope>()
            .await
            .map(|envelope| envelope.contact.into())
            .map_err(|e| MutationFailure::UpdateError(format!("unreadable update response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_record_maps_primary_info() {
        let envelope: ContactEnvelope = serde_json::from_value(json!({
            "contact": {
                "id": "u1",
                "revision": 4,
                "primaryInfo": {"email": "u1@example.com", "phone": "+3612345"}
            }
        }))
        .unwrap();

        let contact: Contact = envelope.contact.into();
        assert_eq!(contact.id, "u1");
        assert_eq!(contact.email.as_deref(), Some("u1@example.com"));
        assert_eq!(contact.phone.as_deref(), Some("+3612345"));
        assert_eq!(contact.revision, Some(Revision("4".into())));
    }

    #[test]
    fn test_contact_record_without_primary_info() {
        let record: ContactRecord = serde_json::from_value(json!({"_id": "u2"})).unwrap();
        let contact: Contact = record.into();
        assert_eq!(contact.id, "u2");
        assert_eq!(contact.email, None);
        assert_eq!(contact.phone, None);
    }

    #[test]
    fn test_empty_query_page() {
        let page: ContactsPage = serde_json::from_value(json!({})).unwrap();
        assert!(page.contacts.is_empty());
    }

    #[test]
    fn test_phone_update_body_carries_revision() {
        let body = phone_update_body(
            &Revision("12".into()),
            &PhoneEntry::primary("HU", "+36301234567"),
        );
        assert_eq!(body["revision"], json!(12));
        assert_eq!(
            body["info"]["phones"]["items"][0],
            json!({"countryCode": "HU", "phone": "+36301234567", "primary": true})
        );
    }

    #[test]
    fn test_email_query_body_is_exact_match() {
        assert_eq!(
            email_query_body("dup@example.com")["query"]["filter"]["primaryInfo.email"],
            json!({"$eq": "dup@example.com"})
        );
    }

    #[test]
    fn test_stale_revision_statuses_map_to_concurrent_modification() {
        assert_eq!(
            classify_update_failure(StatusCode::CONFLICT, ""),
            MutationFailure::ConcurrentModification
        );
        assert_eq!(
            classify_update_failure(StatusCode::PRECONDITION_FAILED, ""),
            MutationFailure::ConcurrentModification
        );
        assert!(matches!(
            classify_update_failure(StatusCode::INTERNAL_SERVER_ERROR, "oops"),
            MutationFailure::UpdateError(msg) if msg.contains("oops")
        ));
    }
}
