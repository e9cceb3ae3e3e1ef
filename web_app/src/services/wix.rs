//! # Site REST API base client
//!
//! Shared plumbing for every remote collaborator: URL building, the service
//! credential headers and error-body handling. The credential is the only
//! authority these clients act with; inbound caller credentials never reach
//! the remote APIs.

use crate::{consts, utils};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fmt;

/// API key and site scope granted to this service.
#[derive(Clone)]
pub struct ServiceCredential {
    pub api_key: String,
    pub site_id: String,
}

impl fmt::Debug for ServiceCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCredential")
            .field("api_key", &"***")
            .field("site_id", &self.site_id)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct WixApi {
    client: reqwest::Client,
    base_url: String,
    credential: ServiceCredential,
}

impl WixApi {
    pub fn new(base_url: &str, credential: ServiceCredential) -> Self {
        Self {
            client: utils::REQUEST_CLIENT.clone(),
            base_url: base_url.to_string(),
            credential,
        }
    }

    /// Joins `path` and the percent-encoded `params` onto the base URL.
    pub fn url(&self, path: &str, params: &[&str]) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("Invalid API base url: {}", self.base_url))?;

        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("API base url cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(path.split('/').filter(|segment| !segment.is_empty()))
            .extend(params);

        Ok(url)
    }

    /// Request builder carrying the service credential.
    pub fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        params: &[&str],
    ) -> Result<reqwest::RequestBuilder> {
        Ok(self
            .client
            .request(method, self.url(path, params)?)
            .header("Authorization", &self.credential.api_key)
            .header(consts::WIX_SITE_ID_HEADER, &self.credential.site_id)
            .header("Content-Type", "application/json"))
    }
}

/// Reads the body of a failed response for error reporting.
pub async fn error_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string())
}

/// Fails on non-success statuses, otherwise parses the JSON body.
pub async fn read_json<T: DeserializeOwned>(response: reqwest::Response, api: &str) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let body = error_body(response).await;
        anyhow::bail!("{api} returned error status {status}: {body}");
    }

    response
        .json::<T>()
        .await
        .with_context(|| format!("Failed to parse {api} response"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base_url: &str) -> WixApi {
        WixApi::new(
            base_url,
            ServiceCredential {
                api_key: "secret-key".into(),
                site_id: "site-1".into(),
            },
        )
    }

    #[test]
    fn test_url_joins_path_and_encodes_params() {
        let url = api("https://www.wixapis.com")
            .url(consts::WIX_CONTACTS_PATH, &["a b/c"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.wixapis.com/contacts/v4/contacts/a%20b%2Fc"
        );
    }

    #[test]
    fn test_url_keeps_base_path_prefix() {
        let url = api("http://localhost:9000/proxy/")
            .url(consts::WIX_LABELS_PATH, &[])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/proxy/contacts/v4/labels");
    }

    #[test]
    fn test_url_rejects_invalid_base() {
        assert!(api("not a url").url(consts::WIX_LABELS_PATH, &[]).is_err());
    }

    #[test]
    fn test_credential_debug_hides_api_key() {
        let rendered = format!("{:?}", api("https://www.wixapis.com"));
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("site-1"));
    }
}
