//! Secret vault client and an optional short-lived cache in front of it.

use super::{
    SecretStore,
    wix::{self, WixApi},
};
use crate::consts;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

#[derive(Debug, Deserialize)]
struct SecretValue {
    #[serde(default)]
    value: Option<String>,
}

#[derive(Clone)]
pub struct WixSecretsClient {
    pub api: WixApi,
}

#[async_trait]
impl SecretStore for WixSecretsClient {
    async fn get_secret_value(&self, name: &str) -> anyhow::Result<Option<String>> {
        let response = self
            .api
            .request(Method::GET, consts::WIX_SECRETS_PATH, &[name, "value"])?
            .send()
            .await
            .context("Failed to send request to secrets API")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let secret: SecretValue = wix::read_json(response, "secrets API").await?;
        Ok(secret.value.filter(|value| !value.is_empty()))
    }
}

/// Reuses fetched secrets for at most `ttl`, so a rotated secret is picked up
/// within that bound. A zero `ttl` passes every call straight through and
/// missing secrets are never remembered.
pub struct CachedSecretStore<S> {
    inner: S,
    ttl: Duration,
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl<S: SecretStore> CachedSecretStore<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    async fn fresh_entry(&self, name: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(name)
            .filter(|(_, fetched_at)| fetched_at.elapsed() < self.ttl)
            .map(|(value, _)| value.clone())
    }
}

#[async_trait]
impl<S: SecretStore> SecretStore for CachedSecretStore<S> {
    async fn get_secret_value(&self, name: &str) -> anyhow::Result<Option<String>> {
        if self.ttl.is_zero() {
            return self.inner.get_secret_value(name).await;
        }

        if let Some(value) = self.fresh_entry(name).await {
            return Ok(Some(value));
        }

        let value = self.inner.get_secret_value(name).await?;

        let mut entries = self.entries.write().await;
        match &value {
            Some(v) => {
                entries.insert(name.to_string(), (v.clone(), Instant::now()));
            }
            None => {
                entries.remove(name);
            }
        }

        Ok(value)
    }
}
