//! Event guest registry client.

use super::wix::{self, WixApi};
use crate::{
    consts,
    models::guest::{Guest, GuestQuery},
};
use anyhow::Context;
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
struct GuestsPage {
    #[serde(default)]
    guests: Vec<Guest>,
}

/// Remote query for one event, newest-after filter and ascending order when a
/// lower bound is set.
pub fn guest_query_body(query: &GuestQuery) -> Value {
    let mut filter = json!({ "eventId": query.event_id });
    let mut body = json!({ "fields": consts::GUEST_FIELDS });

    if let Some(after) = query.updated_after {
        filter[consts::GUEST_UPDATED_DATE_FIELD] =
            json!({ "$gt": after.to_rfc3339_opts(SecondsFormat::Millis, true) });
        body["query"] = json!({
            "filter": filter,
            "sort": [{ "fieldName": consts::GUEST_UPDATED_DATE_FIELD, "order": "ASC" }],
        });
    } else {
        body["query"] = json!({ "filter": filter });
    }

    body
}

#[derive(Clone)]
pub struct WixEventsClient {
    pub api: WixApi,
}

#[async_trait]
impl crate::services::GuestRegistry for WixEventsClient {
    async fn query_guests(&self, query: &GuestQuery) -> anyhow::Result<Vec<Guest>> {
        let response = self
            .api
            .request(Method::POST, consts::WIX_GUESTS_QUERY_PATH, &[])?
            .json(&guest_query_body(query))
            .send()
            .await
            .context("Failed to send query to events API")?;

        let page: GuestsPage = wix::read_json(response, "events guests API").await?;
        Ok(page.guests)
    }
}
