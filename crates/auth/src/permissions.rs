use serde::{Deserialize, Serialize};

use hrm_core::DomainError;

/// A fine-grained, named capability assignable to roles.
///
/// Keys are free-form strings, namespaced by convention as
/// `resource:action` (e.g. `"employees:read"`, `"leave:approve"`). Identity
/// is the key; the description is display-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub key: String,
    pub description: String,
}

impl Permission {
    /// Validate and construct. Keys must be non-empty.
    pub fn new(
        key: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(DomainError::validation("permission key cannot be empty"));
        }
        Ok(Self {
            key,
            description: description.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_namespaced_keys() {
        let p = Permission::new("leave:approve", "Approve leave requests").unwrap();
        assert_eq!(p.key, "leave:approve");
    }

    #[test]
    fn rejects_empty_key() {
        assert!(Permission::new("", "x").is_err());
        assert!(Permission::new("   ", "x").is_err());
    }
}
