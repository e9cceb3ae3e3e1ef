//! Failure taxonomy shared by the gateway operations and the HTTP layer.
//!
//! Every failure reaches the caller as `400 Bad Request` with a JSON body
//! `{ "error": <message> }`. Auth causes beyond the header checks are only
//! logged; the client sees a single generic message for them.

use crate::consts;
use derive_more::{Display, Error, From};
use ntex::{http, web};
use serde_json::json;

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum AuthFailure {
    #[display("Missing token.")]
    MissingToken,
    #[display("Invalid token format.")]
    MalformedToken,
    #[display("Authorization token is empty.")]
    EmptyToken,
    #[display("JWT secret not found.")]
    SecretUnavailable,
    #[display("JWT verification failed: {_0}")]
    InvalidSignature(#[error(not(source))] String),
    #[display("Invalid JWT subject.")]
    UnexpectedSubject,
    #[display("Server configuration error: Secret key missing.")]
    SharedSecretMissing,
    #[display("Unauthorized: Invalid or missing secretKey.")]
    InvalidSharedSecret,
}

impl AuthFailure {
    /// Message safe to hand back to the caller.
    pub fn client_message(&self) -> String {
        match self {
            AuthFailure::MissingToken
            | AuthFailure::MalformedToken
            | AuthFailure::EmptyToken
            | AuthFailure::SharedSecretMissing
            | AuthFailure::InvalidSharedSecret => self.to_string(),
            _ => consts::MSG_UNAUTHORIZED_TOKEN.to_string(),
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthFailure::MissingToken => "missing_token",
            AuthFailure::MalformedToken => "malformed_token",
            AuthFailure::EmptyToken => "empty_token",
            AuthFailure::SecretUnavailable => "secret_unavailable",
            AuthFailure::InvalidSignature(_) => "invalid_signature",
            AuthFailure::UnexpectedSubject => "unexpected_subject",
            AuthFailure::SharedSecretMissing => "shared_secret_missing",
            AuthFailure::InvalidSharedSecret => "invalid_shared_secret",
        }
    }
}

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum LookupFailure {
    #[display("Contact not found.")]
    NotFound,
    #[display("No contact found for the provided email address.")]
    NoMatch,
    #[display("Found more than one contact with the same email address.")]
    AmbiguousMatch,
    #[display("Failed to retrieve contact: {_0}")]
    LookupError(#[error(not(source))] String),
}

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum MutationFailure {
    #[display("Failed to update contact phone: contact revision is stale.")]
    ConcurrentModification,
    #[display("Failed to update contact phone: {_0}")]
    UpdateError(#[error(not(source))] String),
}

#[derive(Debug, Display, Error, PartialEq, Eq)]
#[display("{_0}")]
pub struct ValidationFailure(#[error(not(source))] pub String);

impl ValidationFailure {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

#[derive(Debug, Display, Error, From)]
pub enum GatewayError {
    Auth(AuthFailure),
    Lookup(LookupFailure),
    Mutation(MutationFailure),
    Validation(ValidationFailure),
    #[from(skip)]
    Upstream(#[error(not(source))] String),
}

impl GatewayError {
    pub fn upstream(err: &anyhow::Error) -> Self {
        GatewayError::Upstream(format!("{err:#}"))
    }

    pub fn client_message(&self) -> String {
        match self {
            GatewayError::Auth(failure) => failure.client_message(),
            GatewayError::Lookup(failure) => failure.to_string(),
            GatewayError::Mutation(failure) => failure.to_string(),
            GatewayError::Validation(failure) => failure.to_string(),
            GatewayError::Upstream(msg) => msg.clone(),
        }
    }
}

impl web::error::WebResponseError for GatewayError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        web::HttpResponse::build(self.status_code()).json(&json!({
            "error": self.client_message()
        }))
    }

    fn status_code(&self) -> http::StatusCode {
        http::StatusCode::BAD_REQUEST
    }
}
