//! Route-level authorization guard.
//!
//! Defense in depth behind the gateway: every protected handler asserts its
//! allowed roles here, against the *current* store state. A misconfigured or
//! bypassed gateway therefore cannot grant access on its own, and role or
//! status changes bite immediately instead of at token expiry.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use hrm_auth::{Principal, Role};

use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GuardError {
    /// No resolvable principal: missing context, unknown id, non-active
    /// account, or an unreachable store (denied, never allowed).
    #[error("unauthorized")]
    Unauthorized,

    /// A live principal whose current role is not in the allowed set.
    #[error("forbidden: role {0} not allowed")]
    Forbidden(Role),
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        match self {
            GuardError::Unauthorized => {
                errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "no active session")
            }
            GuardError::Forbidden(role) => errors::json_error(
                StatusCode::FORBIDDEN,
                "forbidden",
                format!("role {role} not allowed"),
            ),
        }
    }
}

/// Require one of `allowed` roles, returning the freshly resolved principal
/// for the handler's use (no second lookup needed within the request).
///
/// The gateway-supplied context contributes only the id; role and status
/// are re-read from the store on every call.
pub async fn require_role(
    services: &AppServices,
    ctx: Option<&PrincipalContext>,
    allowed: &[Role],
) -> Result<Principal, GuardError> {
    let ctx = ctx.ok_or(GuardError::Unauthorized)?;

    let principal = services
        .resolver
        .resolve_by_id(ctx.principal_id())
        .await
        .ok_or(GuardError::Unauthorized)?;

    if !principal.is_active() {
        return Err(GuardError::Unauthorized);
    }

    if !allowed.contains(&principal.role) {
        return Err(GuardError::Forbidden(principal.role));
    }

    Ok(principal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, DeniedRolePolicy, RouteTable};
    use chrono::Duration;
    use hrm_auth::{NewPrincipal, PrincipalStatus, PrincipalStore};
    use hrm_core::Email;
    use std::sync::Arc;

    fn test_config() -> AuthConfig {
        AuthConfig {
            session_secret: b"guard-test-secret".to_vec(),
            session_ttl: Duration::days(1),
            bcrypt_cost: 4,
            login_path: "/login".to_string(),
            denied_role_policy: DeniedRolePolicy::Redirect,
            routes: RouteTable::default_panels(),
            listen_addr: "127.0.0.1:0".to_string(),
        }
    }

    async fn seeded_services(role: Role, status: PrincipalStatus) -> (AppServices, Principal) {
        let services = AppServices::in_memory(&test_config());
        let principal = services
            .principals
            .insert(NewPrincipal {
                email: Email::parse("guard@hrm.local").unwrap(),
                display_name: "Guard".to_string(),
                role,
                status,
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        (services, principal)
    }

    #[tokio::test]
    async fn missing_context_is_unauthorized() {
        let (services, _) = seeded_services(Role::Admin, PrincipalStatus::Active).await;
        let err = require_role(&services, None, &[Role::Admin]).await.unwrap_err();
        assert_eq!(err, GuardError::Unauthorized);
    }

    #[tokio::test]
    async fn wrong_role_is_forbidden() {
        let (services, principal) = seeded_services(Role::Employee, PrincipalStatus::Active).await;
        let ctx = PrincipalContext::new(principal.id, principal.role);

        let err = require_role(&services, Some(&ctx), &[Role::Admin])
            .await
            .unwrap_err();
        assert_eq!(err, GuardError::Forbidden(Role::Employee));
    }

    #[tokio::test]
    async fn suspended_principal_is_unauthorized_even_with_valid_context() {
        let (services, principal) = seeded_services(Role::Hr, PrincipalStatus::Active).await;
        let ctx = PrincipalContext::new(principal.id, principal.role);

        services
            .principals
            .update_status(principal.id, PrincipalStatus::Suspended)
            .await
            .unwrap();

        let err = require_role(&services, Some(&ctx), &[Role::Hr])
            .await
            .unwrap_err();
        assert_eq!(err, GuardError::Unauthorized);
    }

    #[tokio::test]
    async fn role_change_is_picked_up_without_new_token() {
        // Context still carries the stale Employee role; the store says Hr.
        let (services, principal) = seeded_services(Role::Employee, PrincipalStatus::Active).await;
        let stale_ctx = PrincipalContext::new(principal.id, Role::Employee);

        services
            .principals
            .update_role(principal.id, Role::Hr)
            .await
            .unwrap();

        let resolved = require_role(&services, Some(&stale_ctx), &[Role::Hr])
            .await
            .unwrap();
        assert_eq!(resolved.role, Role::Hr);
    }

    #[tokio::test]
    async fn success_returns_the_fresh_principal() {
        let (services, principal) = seeded_services(Role::Admin, PrincipalStatus::Active).await;
        let ctx = PrincipalContext::new(principal.id, principal.role);

        let resolved = require_role(&services, Some(&ctx), &[Role::Admin])
            .await
            .unwrap();
        assert_eq!(resolved.id, principal.id);
    }
}
