//! Triggered emails and contact labels.

use super::{
    EmailSender, LabelService,
    wix::{self, WixApi},
};
use crate::{consts, models::label::Label};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct LabelEnvelope {
    label: Label,
}

#[derive(Clone)]
pub struct WixCrmClient {
    pub api: WixApi,
}

#[async_trait]
impl EmailSender for WixCrmClient {
    async fn send_to_contact(
        &self,
        template_id: &str,
        contact_id: &str,
        variables: serde_json::Value,
    ) -> anyhow::Result<()> {
        let response = self
            .api
            .request(
                Method::POST,
                consts::WIX_TRIGGERED_EMAILS_PATH,
                &[template_id, "send"],
            )?
            .json(&json!({ "contactId": contact_id, "variables": variables }))
            .send()
            .await
            .context("Failed to send request to triggered emails API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = wix::error_body(response).await;
            anyhow::bail!("Triggered emails API returned error status {status}: {body}");
        }

        Ok(())
    }
}

#[async_trait]
impl LabelService for WixCrmClient {
    async fn find_or_create_label(&self, display_name: &str) -> anyhow::Result<Label> {
        let response = self
            .api
            .request(Method::POST, consts::WIX_LABELS_PATH, &[])?
            .json(&json!({ "displayName": display_name }))
            .send()
            .await
            .context("Failed to send request to labels API")?;

        let envelope: LabelEnvelope = wix::read_json(response, "labels API").await?;
        Ok(envelope.label)
    }

    async fn label_contact(&self, contact_id: &str, label_keys: &[String]) -> anyhow::Result<()> {
        let response = self
            .api
            .request(Method::POST, consts::WIX_CONTACTS_PATH, &[contact_id, "labels"])?
            .json(&json!({ "labelKeys": label_keys }))
            .send()
            .await
            .context("Failed to send request to contact labels API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = wix::error_body(response).await;
            anyhow::bail!("Contact labels API returned error status {status}: {body}");
        }

        Ok(())
    }
}
