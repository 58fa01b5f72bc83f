use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse access class used for RBAC.
///
/// The role set is closed. Route tables, guards and grants all match on this
/// enum, so an invalid role is unrepresentable rather than a runtime string
/// mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Hr,
    Employee,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Hr, Role::Employee];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Hr => "hr",
            Role::Employee => "employee",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "hr" => Ok(Role::Hr),
            "employee" => Ok(Role::Employee),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_role() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("manager".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Hr).unwrap(), "\"hr\"");
        let back: Role = serde_json::from_str("\"employee\"").unwrap();
        assert_eq!(back, Role::Employee);
    }
}
