//! # Waitlist automation actions
//!
//! Both actions start from the contact behind a waitlist registration and
//! branch only on whether it already has a phone:
//!
//! - **email-or-record**: no phone sends the templated email asking for one,
//!   otherwise the contact is recorded in the "contacts with phone" collection
//! - **label**: no phone attaches the "needs phone" label, otherwise nothing

use super::contact_resolver::ContactResolver;
use crate::{
    errors::LookupFailure,
    metric,
    models::{
        contact::{Contact, has_phone},
        waitlist::{WaitlistEmailPayload, WaitlistLabelPayload},
    },
    services::{CollectionWriter, ContactDirectory, EmailSender, LabelService},
};
use chrono::{SecondsFormat, Utc};
use derive_more::Display;
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum AutomationOutcome {
    #[display("email sent")]
    EmailSent,
    #[display("record inserted")]
    RecordInserted,
    #[display("labelled")]
    Labelled,
    #[display("skipped: {_0}")]
    Skipped(String),
}

impl AutomationOutcome {
    fn skipped(reason: impl Into<String>) -> Self {
        AutomationOutcome::Skipped(reason.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AutomationOutcome::EmailSent => "email_sent",
            AutomationOutcome::RecordInserted => "record_inserted",
            AutomationOutcome::Labelled => "labelled",
            AutomationOutcome::Skipped(_) => "skipped",
        }
    }
}

/// Names of the site resources the actions write to.
#[derive(Debug, Clone)]
pub struct WaitlistSettings {
    pub email_template_id: String,
    pub contacts_with_phone_collection: String,
    pub needs_phone_label: String,
}

/// Resolves the contact or explains why the action stops here.
async fn resolve_contact(
    directory: &dyn ContactDirectory,
    contact_id: &str,
) -> anyhow::Result<Result<Contact, AutomationOutcome>> {
    match ContactResolver::new(directory).find_by_id(contact_id).await {
        Ok(contact) => Ok(Ok(contact)),
        Err(LookupFailure::NotFound) => Ok(Err(AutomationOutcome::skipped("contact not found"))),
        Err(failure) => Err(anyhow::anyhow!(failure)),
    }
}

/// Sends the phone request email to contacts without a phone and records the
/// ones that have one.
///
/// A failed collection insert is logged and reported as skipped; remote
/// lookup and email failures are returned.
pub async fn email_or_record(
    directory: &dyn ContactDirectory,
    emails: &dyn EmailSender,
    collections: &dyn CollectionWriter,
    settings: &WaitlistSettings,
    payload: &WaitlistEmailPayload,
) -> anyhow::Result<AutomationOutcome> {
    let Some(contact_id) = payload
        .contact_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
    else {
        return Ok(tally(AutomationOutcome::skipped("missing contactId")));
    };

    let contact = match resolve_contact(directory, contact_id).await? {
        Ok(contact) => contact,
        Err(outcome) => return Ok(tally(outcome)),
    };

    if !has_phone(&contact) {
        emails
            .send_to_contact(
                &settings.email_template_id,
                contact_id,
                json!({ "subscriberName": payload.guest_first_name }),
            )
            .await?;
        return Ok(tally(AutomationOutcome::EmailSent));
    }

    let row = json!({
        "contactId": contact_id,
        "email": payload.guest_email,
        "phone": contact.trimmed_phone(),
        "firstName": payload.guest_first_name,
        "lastName": payload.guest_last_name,
        "timestamp": { "$date": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true) },
    });

    if let Err(err) = collections
        .insert(&settings.contacts_with_phone_collection, row)
        .await
    {
        logfire::error!(
            "[automation_waitlistEmail]: failed to insert contact {contact_id} into {collection}: {error}",
            contact_id = contact_id.to_string(),
            collection = settings.contacts_with_phone_collection.clone(),
            error = format!("{err:#}")
        );
        return Ok(tally(AutomationOutcome::skipped("record insert failed")));
    }

    Ok(tally(AutomationOutcome::RecordInserted))
}

/// Labels contacts that still have no phone.
pub async fn label_missing_phone(
    directory: &dyn ContactDirectory,
    labels: &dyn LabelService,
    settings: &WaitlistSettings,
    payload: &WaitlistLabelPayload,
) -> anyhow::Result<AutomationOutcome> {
    let has_email = payload
        .guest_email
        .as_deref()
        .is_some_and(|email| !email.trim().is_empty());

    let Some(contact_id) = payload.target_contact_id().filter(|_| has_email) else {
        return Ok(tally(AutomationOutcome::skipped(
            "missing contactId or guest_email",
        )));
    };

    let contact = match resolve_contact(directory, contact_id).await? {
        Ok(contact) => contact,
        Err(outcome) => return Ok(tally(outcome)),
    };

    if has_phone(&contact) {
        return Ok(tally(AutomationOutcome::skipped("contact has a phone")));
    }

    let label = labels
        .find_or_create_label(&settings.needs_phone_label)
        .await?;

    let Some(label_key) = label.key.filter(|key| !key.is_empty()) else {
        logfire::error!(
            "[automation_waitlistLabel]: could not find or create label key for {label}",
            label = settings.needs_phone_label.clone()
        );
        return Ok(tally(AutomationOutcome::skipped("label has no key")));
    };

    labels.label_contact(&contact.id, &[label_key]).await?;
    Ok(tally(AutomationOutcome::Labelled))
}

fn tally(outcome: AutomationOutcome) -> AutomationOutcome {
    metric::incr_automation_statds(outcome.kind());
    outcome
}
