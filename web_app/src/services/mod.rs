//! Remote collaborators reached by the gateway.
//!
//! Each trait is one black-box service; the `wix` implementations talk to the
//! site REST APIs with an explicitly granted [`wix::ServiceCredential`].

pub mod contacts;
pub mod crm;
pub mod data;
pub mod events;
pub mod secrets;
pub mod wix;

use crate::{
    errors::MutationFailure,
    models::{
        contact::{Contact, PhoneEntry, Revision},
        guest::{Guest, GuestQuery},
        label::Label,
    },
};
use async_trait::async_trait;
use std::sync::Arc;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Current value of a named secret, `None` when the vault has nothing for it.
    async fn get_secret_value(&self, name: &str) -> anyhow::Result<Option<String>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactDirectory: Send + Sync {
    async fn get_contact(&self, contact_id: &str) -> anyhow::Result<Option<Contact>>;

    /// All contacts whose primary email equals `email` exactly.
    async fn query_contacts_by_email(&self, email: &str) -> anyhow::Result<Vec<Contact>>;

    /// Replaces the contact phones with `phone`. The store rejects the write
    /// when `revision` is no longer current.
    async fn update_contact_phone(
        &self,
        contact_id: &str,
        revision: &Revision,
        phone: &PhoneEntry,
    ) -> Result<Contact, MutationFailure>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GuestRegistry: Send + Sync {
    async fn query_guests(&self, query: &GuestQuery) -> anyhow::Result<Vec<Guest>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_to_contact(
        &self,
        template_id: &str,
        contact_id: &str,
        variables: serde_json::Value,
    ) -> anyhow::Result<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LabelService: Send + Sync {
    async fn find_or_create_label(&self, display_name: &str) -> anyhow::Result<Label>;

    async fn label_contact(&self, contact_id: &str, label_keys: &[String]) -> anyhow::Result<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionWriter: Send + Sync {
    async fn insert(&self, collection: &str, item: serde_json::Value) -> anyhow::Result<()>;
}

pub type ImplSecretStore = Arc<dyn SecretStore>;
pub type ImplContactDirectory = Box<dyn ContactDirectory>;
pub type ImplGuestRegistry = Box<dyn GuestRegistry>;
pub type ImplEmailSender = Box<dyn EmailSender>;
pub type ImplLabelService = Box<dyn LabelService>;
pub type ImplCollectionWriter = Box<dyn CollectionWriter>;
