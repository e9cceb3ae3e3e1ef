use anyhow::Context;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 token for `subject`, issued at `now` and valid for `ttl_secs`.
pub fn mint_token(secret: &str, subject: &str, ttl_secs: i64, now: i64) -> anyhow::Result<String> {
    anyhow::ensure!(ttl_secs > 0, "ttl must be positive, got {ttl_secs}");

    let exp = now
        .checked_add(ttl_secs)
        .with_context(|| format!("ttl of {ttl_secs}s overflows the expiry time"))?;

    let claims = TokenClaims {
        sub: subject.to_string(),
        iat: now,
        exp,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}
