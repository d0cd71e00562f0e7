use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

pub mod password;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("JWT expiry is out of range")]
    InvalidExpiry,

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, expiry: Duration) -> Result<Self, AuthError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(expiry)
            .ok_or(AuthError::InvalidExpiry)?
            .timestamp();

        Ok(Self {
            sub: user_id.to_string(),
            exp,
            iat: now.timestamp(),
        })
    }

    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AuthError::InvalidToken("subject is not a user id".to_string()))
    }
}

/// Signs and verifies bearer tokens with the configured HS256 secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl TokenService {
    pub fn new(security: &SecurityConfig) -> Result<Self, AuthError> {
        let secret = security.jwt_secret.as_bytes();
        if secret.is_empty() {
            return Err(AuthError::InvalidSecret);
        }

        let expiry = security.jwt_expiry().ok_or(AuthError::InvalidExpiry)?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiry,
        })
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, AuthError> {
        let claims = Claims::new(user_id, self.expiry)?;
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Verify signature and expiry, returning the user id in `sub`.
    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        token_data.claims.user_id()
    }
}
