//! # Contact resolution
//!
//! Lookups against the remote contacts store by id or by email. Email lookups
//! feed mutations, so anything other than exactly one match is refused rather
//! than guessed.

use crate::{
    consts,
    errors::{GatewayError, LookupFailure, MutationFailure, ValidationFailure},
    metric,
    models::contact::{Contact, PhoneEntry, has_phone},
    services::ContactDirectory,
};
use serde::Serialize;

/// Answer of the phone lookup endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneLookup {
    pub message: String,
    pub phone: String,
}

impl PhoneLookup {
    pub fn from_contact(contact: &Contact) -> Self {
        match contact.phone.as_deref() {
            Some(phone) if has_phone(contact) => Self {
                message: consts::MSG_PHONE_FOUND.to_string(),
                phone: phone.to_string(),
            },
            _ => Self {
                message: consts::MSG_PHONE_NOT_FOUND.to_string(),
                phone: String::new(),
            },
        }
    }
}

pub struct ContactResolver<'a> {
    directory: &'a dyn ContactDirectory,
}

impl<'a> ContactResolver<'a> {
    pub fn new(directory: &'a dyn ContactDirectory) -> Self {
        Self { directory }
    }

    /// Single lookup by primary key. Transport and remote errors are returned
    /// as [`LookupFailure::LookupError`].
    pub async fn find_by_id(&self, contact_id: &str) -> Result<Contact, LookupFailure> {
        let result = match self.directory.get_contact(contact_id).await {
            Ok(Some(contact)) => Ok(contact),
            Ok(None) => Err(LookupFailure::NotFound),
            Err(err) => Err(LookupFailure::LookupError(format!("{err:#}"))),
        };

        metric::incr_lookup_statds(lookup_outcome(&result));
        result
    }

    /// The one contact whose primary email is `email`.
    ///
    /// # Errors
    /// * `ValidationFailure` when `email` is blank
    /// * `LookupFailure::NoMatch` for zero matches
    /// * `LookupFailure::AmbiguousMatch` for more than one match
    pub async fn find_unique_by_email(&self, email: &str) -> Result<Contact, GatewayError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ValidationFailure::new("Invalid contactEmail provided.").into());
        }

        let mut matches = self
            .directory
            .query_contacts_by_email(email)
            .await
            .map_err(|err| LookupFailure::LookupError(format!("{err:#}")))?;

        let result = match matches.len() {
            0 => Err(LookupFailure::NoMatch),
            1 => Ok(matches.remove(0)),
            _ => Err(LookupFailure::AmbiguousMatch),
        };

        metric::incr_lookup_statds(lookup_outcome(&result));
        Ok(result?)
    }

    /// Replaces the contact phone, guarded by the revision read with the contact.
    pub async fn update_phone(
        &self,
        contact: &Contact,
        phone: &PhoneEntry,
    ) -> Result<Contact, MutationFailure> {
        let Some(revision) = contact.revision.as_ref() else {
            return Err(MutationFailure::UpdateError(format!(
                "contact {} carries no revision",
                contact.id
            )));
        };

        let result = self
            .directory
            .update_contact_phone(&contact.id, revision, phone)
            .await;

        metric::incr_phone_update_statds(match &result {
            Ok(_) => "updated",
            Err(MutationFailure::ConcurrentModification) => "stale_revision",
            Err(MutationFailure::UpdateError(_)) => "error",
        });
        result
    }

    /// Phone of the contact with `contact_id`, empty when it has none.
    pub async fn find_phone(&self, contact_id: &str) -> Result<PhoneLookup, LookupFailure> {
        let contact = self.find_by_id(contact_id).await?;
        Ok(PhoneLookup::from_contact(&contact))
    }
}

fn lookup_outcome<T>(result: &Result<T, LookupFailure>) -> &'static str {
    match result {
        Ok(_) => "found",
        Err(LookupFailure::NotFound) => "not_found",
        Err(LookupFailure::NoMatch) => "no_match",
        Err(LookupFailure::AmbiguousMatch) => "ambiguous",
        Err(LookupFailure::LookupError(_)) => "error",
    }
}
