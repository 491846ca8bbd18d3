pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::database::models::Account;

pub use password::{hash_password, verify_password};

/// Only algorithm accepted on validation. Tokens carrying any other `alg`
/// header are rejected before the signature is checked.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "accountID")]
    pub account_id: i32,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Fails when `expiry_hours` does not fit the timestamp range.
    pub fn new(account_id: i32, expiry_hours: u64) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                JwtError::TokenGeneration(format!(
                    "token lifetime of {} hours is out of range",
                    expiry_hours
                ))
            })?;

        Ok(Self {
            account_id,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret is not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Token has expired")]
    Expired,

    #[error("Token signed with a disallowed algorithm")]
    DisallowedAlgorithm,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Issues and validates the signed tokens that identify an account.
pub struct TokenService {
    secret: String,
    expiry_hours: u64,
}

impl TokenService {
    pub fn new(security: &SecurityConfig) -> Self {
        if security.jwt_secret.is_empty() {
            tracing::warn!("JWT secret is empty; token issuance will fail until JWT_SECRET is set");
        }
        Self {
            secret: security.jwt_secret.clone(),
            expiry_hours: security.jwt_expiry_hours,
        }
    }

    pub fn expiry_hours(&self) -> u64 {
        self.expiry_hours
    }

    pub fn issue_token(&self, account: &Account) -> Result<String, JwtError> {
        self.sign(&Claims::new(account.id, self.expiry_hours)?)
    }

    /// Signs arbitrary claims with the configured secret.
    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::new(TOKEN_ALGORITHM), claims, &encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Verifies signature, algorithm and expiry, returning the embedded account id.
    pub fn validate_token(&self, token: &str) -> Result<i32, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }
        if token.trim().is_empty() {
            return Err(JwtError::InvalidToken("empty token".to_string()));
        }

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::new(TOKEN_ALGORITHM);

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                ErrorKind::InvalidAlgorithm => JwtError::DisallowedAlgorithm,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims.account_id)
    }
}
