use serde::{Deserialize, Serialize};

use hrm_auth::{Permission, Principal, Role};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl core::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePermissionRequest {
    pub key: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct GrantRequest {
    pub role: Role,
    pub permission_key: String,
}

#[derive(Debug, Deserialize)]
pub struct RevokeParams {
    pub role: Role,
    pub permission_key: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

// -------------------------
// Response DTOs
// -------------------------

/// Safe external view of a principal. The password hash has no path into
/// this type.
#[derive(Debug, Clone, Serialize)]
pub struct PrincipalResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub status: String,
}

impl From<&Principal> for PrincipalResponse {
    fn from(p: &Principal) -> Self {
        Self {
            id: p.id.as_i64(),
            email: p.email.as_str().to_string(),
            name: p.display_name.clone(),
            role: p.role,
            status: p.status.to_string(),
        }
    }
}

/// Permissions granted to one role, for the grouped management listing.
#[derive(Debug, Serialize)]
pub struct RolePermissionsResponse {
    pub role: Role,
    pub permissions: Vec<Permission>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hrm_auth::PrincipalStatus;
    use hrm_core::{Email, PrincipalId};

    #[test]
    fn principal_response_carries_no_hash_material() {
        let principal = Principal {
            id: PrincipalId::new(3),
            email: Email::parse("safe@hrm.local").unwrap(),
            display_name: "Safe".to_string(),
            role: Role::Employee,
            status: PrincipalStatus::Active,
            password_hash: "$2b$10$very-secret-hash".to_string(),
            created_at: Utc::now(),
        };

        let body = serde_json::to_string(&PrincipalResponse::from(&principal)).unwrap();
        assert!(!body.contains("very-secret-hash"));
        assert!(!body.contains("password"));
        assert!(body.contains("safe@hrm.local"));
    }

    #[test]
    fn login_request_debug_redacts_password() {
        let req = LoginRequest {
            email: "a@b.c".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{req:?}");
        assert!(!rendered.contains("hunter2"));
    }
}
