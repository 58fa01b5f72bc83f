use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hrm_core::PrincipalId;

use crate::Role;

/// Session token claims (transport-agnostic).
///
/// The token is a fast-path carrier of id + role; the store remains the
/// source of truth for anything authorization-sensitive. Unknown fields are
/// rejected at the deserialization boundary rather than silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionClaims {
    /// Subject / principal identifier.
    pub sub: PrincipalId,

    /// Role granted at issue time.
    pub role: Role,

    /// Issued-at timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("malformed token")]
    Malformed,
}

/// Deterministically validate session claims against a clock reading.
///
/// Expiry is inclusive: a token whose `expires_at` equals `now` is already
/// expired. Signature verification happens in the codec, not here.
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenError::Malformed);
    }
    if now >= claims.expires_at {
        return Err(TokenError::Expired);
    }
    Ok(())
}
