//! Permission management endpoints (admin-only).
//!
//! The catalog (`/permissions`) and the role grants (`/role-permissions`)
//! mirror the management UI's surface: list, create, delete; grant, revoke,
//! grouped listing.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use hrm_auth::{Permission, Role, StoreError};

use crate::app::{
    dto::{CreatePermissionRequest, GrantRequest, RevokeParams, RolePermissionsResponse},
    errors,
    services::AppServices,
};
use crate::context::PrincipalContext;
use crate::guard::{self, GuardError};

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router {
    Router::new()
        .route("/permissions", get(list_permissions).post(create_permission))
        .route("/permissions/:key", axum::routing::delete(delete_permission))
        .route(
            "/role-permissions",
            get(list_role_permissions)
                .post(grant_permission)
                .delete(revoke_permission),
        )
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn admin_only(
    services: &AppServices,
    ctx: Option<&PrincipalContext>,
) -> Result<(), GuardError> {
    guard::require_role(services, ctx, &[Role::Admin])
        .await
        .map(|_| ())
}

/// GET /admin/permissions - the catalog, ordered by key.
pub async fn list_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: Option<Extension<PrincipalContext>>,
) -> Result<Response, GuardError> {
    let ctx = ctx.map(|Extension(c)| c);
    admin_only(&services, ctx.as_ref()).await?;

    match services.permissions.list().await {
        Ok(permissions) => {
            Ok(Json(serde_json::json!({ "permissions": permissions })).into_response())
        }
        Err(e) => Ok(errors::store_error_to_response(e)),
    }
}

/// POST /admin/permissions
pub async fn create_permission(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: Option<Extension<PrincipalContext>>,
    Json(body): Json<CreatePermissionRequest>,
) -> Result<Response, GuardError> {
    let ctx = ctx.map(|Extension(c)| c);
    admin_only(&services, ctx.as_ref()).await?;

    let permission = match Permission::new(body.key, body.description) {
        Ok(p) => p,
        Err(e) => {
            return Ok(errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                e.to_string(),
            ));
        }
    };

    match services.permissions.create(permission).await {
        Ok(created) => Ok((StatusCode::CREATED, Json(created)).into_response()),
        Err(e) => Ok(errors::store_error_to_response(e)),
    }
}

/// DELETE /admin/permissions/:key - removes the permission and its grants.
pub async fn delete_permission(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: Option<Extension<PrincipalContext>>,
    Path(key): Path<String>,
) -> Result<Response, GuardError> {
    let ctx = ctx.map(|Extension(c)| c);
    admin_only(&services, ctx.as_ref()).await?;

    match services.permissions.delete(&key).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(e) => Ok(errors::store_error_to_response(e)),
    }
}

/// GET /admin/role-permissions - grants grouped per role.
pub async fn list_role_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: Option<Extension<PrincipalContext>>,
) -> Result<Response, GuardError> {
    let ctx = ctx.map(|Extension(c)| c);
    admin_only(&services, ctx.as_ref()).await?;

    let mut grouped = Vec::with_capacity(Role::ALL.len());
    for role in Role::ALL {
        match services.permissions.list_for_role(role).await {
            Ok(permissions) => grouped.push(RolePermissionsResponse { role, permissions }),
            Err(e) => return Ok(errors::store_error_to_response(e)),
        }
    }

    Ok(Json(grouped).into_response())
}

/// POST /admin/role-permissions - grant a permission to a role.
///
/// Granting an already-granted pair succeeds unchanged (idempotent).
pub async fn grant_permission(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: Option<Extension<PrincipalContext>>,
    Json(body): Json<GrantRequest>,
) -> Result<Response, GuardError> {
    let ctx = ctx.map(|Extension(c)| c);
    admin_only(&services, ctx.as_ref()).await?;

    match services.permissions.grant(body.role, &body.permission_key).await {
        Ok(()) => Ok((
            StatusCode::CREATED,
            Json(serde_json::json!({
                "role": body.role,
                "permission_key": body.permission_key,
            })),
        )
            .into_response()),
        Err(StoreError::NotFound) => Ok(errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            "permission does not exist",
        )),
        Err(e) => Ok(errors::store_error_to_response(e)),
    }
}

/// DELETE /admin/role-permissions?role=..&permission_key=..
///
/// Revoking an absent grant still reports success (no-op semantics).
pub async fn revoke_permission(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: Option<Extension<PrincipalContext>>,
    Query(params): Query<RevokeParams>,
) -> Result<Response, GuardError> {
    let ctx = ctx.map(|Extension(c)| c);
    admin_only(&services, ctx.as_ref()).await?;

    match services
        .permissions
        .revoke(params.role, &params.permission_key)
        .await
    {
        Ok(()) => Ok(Json(serde_json::json!({ "success": true })).into_response()),
        Err(e) => Ok(errors::store_error_to_response(e)),
    }
}
