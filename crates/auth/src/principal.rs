use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hrm_core::{Email, PrincipalId};

use crate::Role;

/// Principal account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalStatus {
    /// Can authenticate and transact.
    #[default]
    Active,
    /// Cannot authenticate; outstanding sessions are denied on re-resolution.
    Suspended,
}

impl core::fmt::Display for PrincipalStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PrincipalStatus::Active => f.write_str("active"),
            PrincipalStatus::Suspended => f.write_str("suspended"),
        }
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[error("unknown principal status: {0}")]
pub struct UnknownStatus(pub String);

impl core::str::FromStr for PrincipalStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(PrincipalStatus::Active),
            "suspended" => Ok(PrincipalStatus::Suspended),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// An authenticated identity: the single source of truth for id, role and
/// status.
///
/// # Invariants
/// - `email` is unique (case-insensitive) across all principals.
/// - `password_hash` never reaches an external response. The struct is
///   deliberately not `Serialize`, and `Debug` redacts the hash.
/// - Status and role transitions are admin-controlled.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: PrincipalId,
    pub email: Email,
    pub display_name: String,
    pub role: Role,
    pub status: PrincipalStatus,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Principal {
    pub fn is_active(&self) -> bool {
        self.status == PrincipalStatus::Active
    }
}

impl core::fmt::Debug for Principal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("role", &self.role)
            .field("status", &self.status)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Insert payload for a new principal; the store assigns the id.
#[derive(Clone)]
pub struct NewPrincipal {
    pub email: Email,
    pub display_name: String,
    pub role: Role,
    pub status: PrincipalStatus,
    pub password_hash: String,
}

impl core::fmt::Debug for NewPrincipal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewPrincipal")
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("role", &self.role)
            .field("status", &self.status)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Principal {
        Principal {
            id: PrincipalId::new(1),
            email: Email::parse("alice@hrm.local").unwrap(),
            display_name: "Alice".to_string(),
            role: Role::Employee,
            status: PrincipalStatus::Active,
            password_hash: "$2b$10$secret-material".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn debug_never_exposes_the_password_hash() {
        let rendered = format!("{:?}", sample());
        assert!(!rendered.contains("secret-material"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn suspended_is_not_active() {
        let mut p = sample();
        assert!(p.is_active());
        p.status = PrincipalStatus::Suspended;
        assert!(!p.is_active());
    }
}
