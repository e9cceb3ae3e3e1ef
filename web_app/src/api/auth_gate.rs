//! # Bearer token gate
//!
//! Every automation-facing endpoint is bound to its own signing secret held in
//! the remote vault. A request passes only when its bearer token verifies
//! against that endpoint's secret and names the expected subject.

use crate::{
    consts, errors::AuthFailure, metric, models::claims::VerifiedClaims,
    services::ImplSecretStore,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use std::{collections::HashMap, fmt};
use subtle::ConstantTimeEq;

/// Logical endpoints guarded by [`AuthGate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    FindEventGuests,
    FindEventGuestPhone,
    UpdateContactPhone,
    AutomationEmail,
    AutomationLabel,
}

impl Endpoint {
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::FindEventGuests => "post_findEventGuests",
            Endpoint::FindEventGuestPhone => "post_findEventGuestPhone",
            Endpoint::UpdateContactPhone => "post_updateContactPhone",
            Endpoint::AutomationEmail => "automation_waitlistEmail",
            Endpoint::AutomationLabel => "automation_waitlistLabel",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone)]
pub struct AuthGate {
    store: ImplSecretStore,
    endpoint_secrets: HashMap<Endpoint, String>,
    expected_subject: String,
}

impl AuthGate {
    pub fn new(
        store: ImplSecretStore,
        endpoint_secrets: HashMap<Endpoint, String>,
        expected_subject: &str,
    ) -> Self {
        Self {
            store,
            endpoint_secrets,
            expected_subject: expected_subject.to_string(),
        }
    }

    /// Verifies the raw `Authorization` header value for `endpoint`.
    ///
    /// # Process
    /// 1. Header must be present, start with `Bearer ` and carry a non-empty token
    /// 2. The endpoint's secret is fetched from the vault
    /// 3. The token signature is checked with that secret (HMAC family only)
    /// 4. The `sub` claim must equal the expected subject
    ///
    /// The detailed cause of a rejection is logged here; callers only surface
    /// [`AuthFailure::client_message`].
    pub async fn verify(
        &self,
        authorization: Option<&str>,
        endpoint: Endpoint,
    ) -> Result<VerifiedClaims, AuthFailure> {
        let result = self.check(authorization, endpoint).await;

        match &result {
            Ok(_) => {
                tracing::debug!("[{endpoint}]: bearer token accepted");
                metric::incr_auth_statds("accepted");
            }
            Err(failure) => {
                logfire::warn!(
                    "[{endpoint}]: {failure}",
                    endpoint = endpoint.to_string(),
                    failure = failure.to_string()
                );
                metric::incr_auth_statds(failure.kind());
            }
        }

        result
    }

    async fn check(
        &self,
        authorization: Option<&str>,
        endpoint: Endpoint,
    ) -> Result<VerifiedClaims, AuthFailure> {
        let token = bearer_token(authorization)?;
        let secret = self.endpoint_secret(endpoint).await?;
        let claims = decode_claims(token, &secret)?;

        if claims.sub.as_deref() != Some(self.expected_subject.as_str()) {
            return Err(AuthFailure::UnexpectedSubject);
        }

        Ok(claims)
    }

    async fn endpoint_secret(&self, endpoint: Endpoint) -> Result<String, AuthFailure> {
        let Some(secret_id) = self.endpoint_secrets.get(&endpoint) else {
            logfire::error!(
                "[{endpoint}]: no secret id configured",
                endpoint = endpoint.to_string()
            );
            return Err(AuthFailure::SecretUnavailable);
        };

        match self.store.get_secret_value(secret_id).await {
            Ok(Some(secret)) => Ok(secret),
            Ok(None) => Err(AuthFailure::SecretUnavailable),
            Err(err) => {
                logfire::error!(
                    "[{endpoint}]: secret fetch failed: {error}",
                    endpoint = endpoint.to_string(),
                    error = format!("{err:#}")
                );
                Err(AuthFailure::SecretUnavailable)
            }
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthFailure> {
    let header = authorization.ok_or(AuthFailure::MissingToken)?;
    let token = header
        .strip_prefix(consts::BEARER_PREFIX)
        .ok_or(AuthFailure::MalformedToken)?
        .trim();

    if token.is_empty() {
        return Err(AuthFailure::EmptyToken);
    }

    Ok(token)
}

fn decode_claims(token: &str, secret: &str) -> Result<VerifiedClaims, AuthFailure> {
    let header =
        decode_header(token).map_err(|e| AuthFailure::InvalidSignature(e.to_string()))?;

    if !matches!(
        header.alg,
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
    ) {
        return Err(AuthFailure::InvalidSignature(format!(
            "unsupported algorithm {:?}",
            header.alg
        )));
    }

    let mut validation = Validation::new(header.alg);
    validation.required_spec_claims.clear();
    validation.validate_aud = false;

    decode::<VerifiedClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AuthFailure::InvalidSignature(e.to_string()))
}

/// Constant-time equality of a caller supplied shared secret.
pub fn verify_shared_secret(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}
