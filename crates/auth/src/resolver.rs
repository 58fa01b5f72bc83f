use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use hrm_core::PrincipalId;

use crate::{Principal, PrincipalStore, TokenCodec};

/// Resolves the current principal from a session token or an id.
///
/// The token is only a fast-path carrier of id + role; resolution always
/// re-reads the store, so role and status changes take effect without
/// waiting for token expiry.
pub struct PrincipalResolver {
    store: Arc<dyn PrincipalStore>,
    codec: Arc<dyn TokenCodec>,
}

impl PrincipalResolver {
    pub fn new(store: Arc<dyn PrincipalStore>, codec: Arc<dyn TokenCodec>) -> Self {
        Self { store, codec }
    }

    /// Resolve a principal from a session token.
    ///
    /// Signature and expiry are checked before any store I/O. Returns `None`
    /// for any token failure, an unknown id, a non-active principal, or a
    /// store failure; the request path is never handed an error to leak.
    pub async fn resolve_from_token(&self, token: &str, now: DateTime<Utc>) -> Option<Principal> {
        let claims = self.codec.validate(token, now).ok()?;

        let principal = match self.store.find_by_id(claims.sub).await {
            Ok(found) => found?,
            Err(e) => {
                warn!(error = %e, "principal lookup failed during token resolution");
                return None;
            }
        };

        principal.is_active().then_some(principal)
    }

    /// Resolve a principal by id, fresh from the store.
    ///
    /// Status is *not* filtered here; callers decide what a suspended
    /// principal means for them. Store failures resolve to `None`.
    pub async fn resolve_by_id(&self, id: PrincipalId) -> Option<Principal> {
        match self.store.find_by_id(id).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, principal_id = %id, "principal lookup failed");
                None
            }
        }
    }
}
