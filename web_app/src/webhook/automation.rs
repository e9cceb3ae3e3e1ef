//! Waitlist automation actions.
//!
//! Once the bearer token is accepted the automation always gets `200 {}`;
//! what the action did, or why it stopped, is only logged.

use super::{AppState, authorization, log_failure};
use crate::{
    api::{
        auth_gate::Endpoint,
        automation::{self, AutomationOutcome},
    },
    errors::GatewayError,
    models::waitlist::{WaitlistEmailPayload, WaitlistLabelPayload},
};
use ntex::{util::Bytes, web};
use serde::de::DeserializeOwned;
use serde_json::json;

/// Payload of an accepted request, `None` when it isn't the expected JSON.
fn payload<T: DeserializeOwned>(endpoint: Endpoint, body: &Bytes) -> Option<T> {
    serde_json::from_slice(body)
        .inspect_err(|e| {
            logfire::error!(
                "[{endpoint}]: unreadable automation payload: {error}",
                endpoint = endpoint.to_string(),
                error = e.to_string()
            );
        })
        .ok()
}

fn log_outcome(endpoint: Endpoint, outcome: anyhow::Result<AutomationOutcome>) {
    match outcome {
        Ok(outcome) => {
            logfire::info!(
                "[{endpoint}]: {outcome}",
                endpoint = endpoint.to_string(),
                outcome = outcome.to_string()
            );
        }
        Err(err) => {
            logfire::error!(
                "[{endpoint}]: could not process contact: {error}",
                endpoint = endpoint.to_string(),
                error = format!("{err:#}")
            );
        }
    }
}

/// `POST /automation/waitlist/email`
///
/// Emails waitlisted contacts without a phone, records the others.
#[web::post("/email")]
pub async fn waitlist_email(
    req: web::HttpRequest,
    body: Bytes,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let endpoint = Endpoint::AutomationEmail;
    let _span = logfire::span!("automation_waitlistEmail").entered();

    app_state
        .auth_gate
        .verify(authorization(&req), endpoint)
        .await
        .map_err(GatewayError::from)
        .inspect_err(|err| log_failure(endpoint.name(), err))?;

    if let Some(payload) = payload::<WaitlistEmailPayload>(endpoint, &body) {
        let outcome = automation::email_or_record(
            app_state.contacts.as_ref(),
            app_state.emails.as_ref(),
            app_state.collections.as_ref(),
            &app_state.settings.waitlist,
            &payload,
        )
        .await;
        log_outcome(endpoint, outcome);
    }

    Ok(web::HttpResponse::Ok().json(&json!({})))
}

/// `POST /automation/waitlist/label`
///
/// Labels waitlisted contacts that have no phone.
#[web::post("/label")]
pub async fn waitlist_label(
    req: web::HttpRequest,
    body: Bytes,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let endpoint = Endpoint::AutomationLabel;
    let _span = logfire::span!("automation_waitlistLabel").entered();

    app_state
        .auth_gate
        .verify(authorization(&req), endpoint)
        .await
        .map_err(GatewayError::from)
        .inspect_err(|err| log_failure(endpoint.name(), err))?;

    if let Some(payload) = payload::<WaitlistLabelPayload>(endpoint, &body) {
        let outcome = automation::label_missing_phone(
            app_state.contacts.as_ref(),
            app_state.labels.as_ref(),
            &app_state.settings.waitlist,
            &payload,
        )
        .await;
        log_outcome(endpoint, outcome);
    }

    Ok(web::HttpResponse::Ok().json(&json!({})))
}
