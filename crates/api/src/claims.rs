use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session token claims (transport-agnostic).
///
/// Timestamps are Unix seconds, as in any JWT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject / user identifier.
    pub sub: String,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(sub: impl Into<String>, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: sub.into(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    /// `exp` is at or before `iat`.
    #[error("token `exp` is not after its `iat`")]
    InvalidTimeWindow,

    #[error("token `iat` lies in the future")]
    NotYetValid,

    #[error("token `exp` has passed")]
    Expired,
}

/// Check the `iat`/`exp` window of already signature-checked claims.
///
/// `exp` is exclusive: a token expiring at `now` is expired.
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    match (claims.iat, claims.exp) {
        (iat, exp) if exp <= iat => Err(TokenValidationError::InvalidTimeWindow),
        (iat, _) if now < iat => Err(TokenValidationError::NotYetValid),
        (_, exp) if now >= exp => Err(TokenValidationError::Expired),
        _ => Ok(()),
    }
}
