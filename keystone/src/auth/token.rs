//! Session token signing and verification
//!
//! Tokens are HS256 JWTs carrying the account id, username, email and role
//! name. Nothing about an issued token is stored server-side.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::config::AuthConfig;
use std::time::Duration;

use super::error::AuthError;
use super::models::AccountSummary;

/// Claim set of a session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,
    pub username: String,
    pub email: String,
    /// Role name
    pub role: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn for_account(account: &AccountSummary, ttl: Duration) -> Self {
        let iat = Utc::now().timestamp();
        let ttl_seconds = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);

        Self {
            sub: account.id.clone(),
            username: account.username.clone(),
            email: account.email.clone(),
            role: account.role.clone(),
            iat,
            exp: iat.saturating_add(ttl_seconds),
        }
    }
}

impl From<Claims> for AccountSummary {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            email: claims.email,
            role: claims.role,
        }
    }
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.secret, config.expires_in)
    }

    /// Sign a token for the given account
    pub fn issue(&self, account: &AccountSummary) -> Result<String, AuthError> {
        let claims = Claims::for_account(account, self.ttl);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Verify signature and expiry, returning the claim set
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }
}
