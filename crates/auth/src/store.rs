//! Store seams for principals and permissions.
//!
//! Implementations live in `hrm-infra`; the traits stay here so the verifier
//! and resolver are testable without infrastructure.

use async_trait::async_trait;
use thiserror::Error;

use hrm_core::{Email, PrincipalId};

use crate::{NewPrincipal, Permission, Principal, PrincipalStatus, Role};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found")]
    NotFound,

    /// The backing store could not be reached. Callers in the request path
    /// must treat this as a denial (fail closed), never as an allow.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence seam for principal records.
///
/// Each mutation is a single atomic operation against the backing store; no
/// multi-step transactions are required by this subsystem.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Look up by normalized email (stored emails are normalized on insert,
    /// so this is an exact match).
    async fn find_by_email(&self, email: &Email) -> Result<Option<Principal>, StoreError>;

    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, StoreError>;

    async fn list(&self) -> Result<Vec<Principal>, StoreError>;

    /// Insert a new principal. Fails with `Conflict` when the normalized
    /// email is already taken.
    async fn insert(&self, new: NewPrincipal) -> Result<Principal, StoreError>;

    async fn update_status(
        &self,
        id: PrincipalId,
        status: PrincipalStatus,
    ) -> Result<(), StoreError>;

    async fn update_role(&self, id: PrincipalId, role: Role) -> Result<(), StoreError>;

    async fn delete(&self, id: PrincipalId) -> Result<(), StoreError>;
}

/// Persistence seam for the permission catalog and role grants.
///
/// `grant`/`revoke` are atomic per `(role, key)` pair; no cross-pair
/// ordering is required or provided.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Create a permission. Fails with `Conflict` when the key exists.
    async fn create(&self, permission: Permission) -> Result<Permission, StoreError>;

    /// Delete a permission and any grants referencing it.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    async fn list(&self) -> Result<Vec<Permission>, StoreError>;

    /// Grant `key` to `role`. Idempotent: granting an already-granted pair
    /// is a no-op. Fails with `NotFound` when the permission does not exist
    /// (grants must reference the catalog).
    async fn grant(&self, role: Role, key: &str) -> Result<(), StoreError>;

    /// Revoke `key` from `role`. Revoking an absent grant is a no-op.
    async fn revoke(&self, role: Role, key: &str) -> Result<(), StoreError>;

    async fn list_for_role(&self, role: Role) -> Result<Vec<Permission>, StoreError>;

    async fn has(&self, role: Role, key: &str) -> Result<bool, StoreError>;
}
