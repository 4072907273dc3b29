//! Token codec: compact HS512-signed tokens carrying subject and expiry.
//!
//! The codec is pure given the secret and TTL. The clock is always passed
//! in by the caller, which keeps expiry testable; the library's own expiry
//! validation is disabled because it reads the system clock and applies
//! leeway, and the expiry check here must be strict (`now >= exp` is
//! expired).

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Claims carried by an issued token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the identity's email.
    pub sub: String,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtManager {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Sign a token for `subject` expiring `ttl` after `now`.
    pub fn issue(&self, subject: &str, now: OffsetDateTime) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.unix_timestamp(),
            exp: (now + self.ttl).unix_timestamp(),
        };

        Ok(encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Check signature, shape, and expiry; return the embedded subject.
    pub fn verify(&self, token: &str, now: OffsetDateTime) -> Result<String, TokenError> {
        let mut validation = Validation::new(Algorithm::HS512);
        // Expiry is checked below against the caller's clock.
        validation.validate_exp = false;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        if now.unix_timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims.sub)
    }
}
