//! HR panel routes, thin consumers of the auth core.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use hrm_auth::Role;

use crate::app::{dto::PrincipalResponse, errors, services::AppServices};
use crate::context::PrincipalContext;
use crate::guard::{self, GuardError};

pub fn router() -> Router {
    Router::new().route("/directory", get(directory))
}

/// GET /hr/directory - active accounts, for the HR panel.
///
/// The coarse role gate (admin or hr) is followed by a fine-grained
/// capability check: listing people additionally requires the
/// `employees:read` permission to be granted to the caller's role.
pub async fn directory(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: Option<Extension<PrincipalContext>>,
) -> Result<Response, GuardError> {
    let ctx = ctx.map(|Extension(c)| c);
    let viewer = guard::require_role(&services, ctx.as_ref(), &[Role::Admin, Role::Hr]).await?;

    let can_read = match services.permissions.has(viewer.role, "employees:read").await {
        Ok(granted) => granted,
        Err(e) => return Ok(errors::store_error_to_response(e)),
    };
    if !can_read {
        return Ok(errors::json_error(
            StatusCode::FORBIDDEN,
            "missing_permission",
            "employees:read is not granted to your role",
        ));
    }

    let principals = match services.principals.list().await {
        Ok(all) => all,
        Err(e) => return Ok(errors::store_error_to_response(e)),
    };

    let directory: Vec<PrincipalResponse> = principals
        .iter()
        .filter(|p| p.is_active())
        .map(PrincipalResponse::from)
        .collect();

    Ok(Json(serde_json::json!({ "directory": directory })).into_response())
}
