//! Admin routes for account administration.
//!
//! Status transitions, role changes and deletion are admin actions; every
//! handler asserts the admin role through the guard even though the gateway
//! already filters `/admin` by prefix.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use hrm_auth::{PrincipalStatus, Role};
use hrm_core::PrincipalId;

use crate::app::{
    dto::{ChangeRoleRequest, PrincipalResponse},
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
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user).delete(delete_user))
        .route("/users/:id/suspend", post(suspend_user))
        .route("/users/:id/activate", post(activate_user))
        .route("/users/:id/role", post(change_role))
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

/// GET /admin/users - list every account with role and status.
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: Option<Extension<PrincipalContext>>,
) -> Result<Response, GuardError> {
    let ctx = ctx.map(|Extension(c)| c);
    admin_only(&services, ctx.as_ref()).await?;

    let principals = match services.principals.list().await {
        Ok(all) => all,
        Err(e) => return Ok(errors::store_error_to_response(e)),
    };

    let users: Vec<PrincipalResponse> = principals.iter().map(PrincipalResponse::from).collect();
    Ok(Json(serde_json::json!({ "users": users })).into_response())
}

/// GET /admin/users/:id
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: Option<Extension<PrincipalContext>>,
    Path(id): Path<i64>,
) -> Result<Response, GuardError> {
    let ctx = ctx.map(|Extension(c)| c);
    admin_only(&services, ctx.as_ref()).await?;

    match services.principals.find_by_id(PrincipalId::new(id)).await {
        Ok(Some(p)) => Ok(Json(PrincipalResponse::from(&p)).into_response()),
        Ok(None) => Ok(errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            "user not found",
        )),
        Err(e) => Ok(errors::store_error_to_response(e)),
    }
}

/// POST /admin/users/:id/suspend
pub async fn suspend_user(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: Option<Extension<PrincipalContext>>,
    Path(id): Path<i64>,
) -> Result<Response, GuardError> {
    let ctx = ctx.map(|Extension(c)| c);
    admin_only(&services, ctx.as_ref()).await?;

    set_status(&services, id, PrincipalStatus::Suspended).await
}

/// POST /admin/users/:id/activate
pub async fn activate_user(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: Option<Extension<PrincipalContext>>,
    Path(id): Path<i64>,
) -> Result<Response, GuardError> {
    let ctx = ctx.map(|Extension(c)| c);
    admin_only(&services, ctx.as_ref()).await?;

    set_status(&services, id, PrincipalStatus::Active).await
}

async fn set_status(
    services: &AppServices,
    id: i64,
    status: PrincipalStatus,
) -> Result<Response, GuardError> {
    match services
        .principals
        .update_status(PrincipalId::new(id), status)
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(e) => Ok(errors::store_error_to_response(e)),
    }
}

/// POST /admin/users/:id/role
pub async fn change_role(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: Option<Extension<PrincipalContext>>,
    Path(id): Path<i64>,
    Json(body): Json<ChangeRoleRequest>,
) -> Result<Response, GuardError> {
    let ctx = ctx.map(|Extension(c)| c);
    admin_only(&services, ctx.as_ref()).await?;

    match services
        .principals
        .update_role(PrincipalId::new(id), body.role)
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(e) => Ok(errors::store_error_to_response(e)),
    }
}

/// DELETE /admin/users/:id
pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: Option<Extension<PrincipalContext>>,
    Path(id): Path<i64>,
) -> Result<Response, GuardError> {
    let ctx = ctx.map(|Extension(c)| c);
    admin_only(&services, ctx.as_ref()).await?;

    match services.principals.delete(PrincipalId::new(id)).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(e) => Ok(errors::store_error_to_response(e)),
    }
}
