use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::{Principal, SessionClaims, TokenError, validate_claims};

/// Issues and validates session tokens.
///
/// Validation is stateless: there is no server-side session record and no
/// revocation list. A token stays verifiable until its natural expiry;
/// logout is client-side discard. Authorization-sensitive callers compensate
/// by re-reading principal status from the store (see the route guard in
/// `hrm-api`).
pub trait TokenCodec: Send + Sync {
    /// Issue a signed token for `principal`, valid from `now` for the
    /// configured lifetime. Tokens are not renewed on use; the lifetime is
    /// fixed at issue time.
    fn issue(&self, principal: &Principal, now: DateTime<Utc>) -> Result<String, TokenError>;

    /// Verify signature and expiry, returning the decoded claims.
    ///
    /// Short-circuits on signature failure before any further work, so a
    /// flood of garbage tokens never costs store I/O downstream.
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError>;
}

/// HS256 token codec with a process-wide secret.
///
/// The secret is held only as key material; it has no `Debug`/`Display`
/// surface and must never be logged.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl Hs256TokenCodec {
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }
}

impl TokenCodec for Hs256TokenCodec {
    fn issue(&self, principal: &Principal, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = SessionClaims {
            sub: principal.id,
            role: principal.role,
            issued_at: now,
            expires_at: now + self.lifetime,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Malformed)
    }

    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        // Expiry is enforced by `validate_claims` (inclusive boundary, no
        // leeway), not by the library default keyed off a claim named `exp`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}
