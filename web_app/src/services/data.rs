use super::{
    CollectionWriter,
    wix::{self, WixApi},
};
use crate::consts;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;

#[derive(Clone)]
pub struct WixDataClient {
    pub api: WixApi,
}

#[async_trait]
impl CollectionWriter for WixDataClient {
    async fn insert(&self, collection: &str, item: serde_json::Value) -> anyhow::Result<()> {
        let response = self
            .api
            .request(Method::POST, consts::WIX_DATA_ITEMS_PATH, &[])?
            .json(&json!({
                "dataCollectionId": collection,
                "dataItem": { "data": item },
            }))
            .send()
            .await
            .context("Failed to send request to data items API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = wix::error_body(response).await;
            anyhow::bail!("Data items API returned error status {status}: {body}");
        }

        Ok(())
    }
}
