//! Credential hashing and bearer-token issuing.
//!
//! Passwords are stored as Argon2id PHC strings; the plaintext never leaves
//! this module's functions. Sessions are stateless HS256 JWTs carrying the
//! user id, with no rotation or revocation.

use crate::config::AuthConfig;
use anyhow::{anyhow, Result};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub fn hash_password(plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|err| anyhow!("password hashing failed: {err}"))?;
    Ok(hash.to_string())
}

/// One-way comparison against a stored PHC string. A malformed stored hash
/// counts as a mismatch rather than an error.
pub fn verify_password(plaintext: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id.
    sub: String,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl: Duration::hours(config.token_ttl_hours),
        }
    }

    pub fn issue(&self, user_id: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| anyhow!("token signing failed: {err}"))
    }

    /// Returns the user id carried by a valid, unexpired token.
    pub fn verify(&self, token: &str) -> Result<String> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|err| anyhow!("invalid token: {err}"))?;
        Ok(data.claims.sub)
    }
}
