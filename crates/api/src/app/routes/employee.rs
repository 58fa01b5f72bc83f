//! Employee panel routes, thin consumers of the auth core.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    response::{IntoResponse, Response},
    routing::get,
};

use hrm_auth::Role;

use crate::app::{dto::PrincipalResponse, services::AppServices};
use crate::context::PrincipalContext;
use crate::guard::{self, GuardError};

pub fn router() -> Router {
    Router::new().route("/profile", get(profile))
}

/// GET /employee/profile - the caller's own record, freshly resolved.
///
/// Open to every role; the guard still re-reads the store, so a suspended
/// account is cut off here even while its token remains formally valid.
pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: Option<Extension<PrincipalContext>>,
) -> Result<Response, GuardError> {
    let ctx = ctx.map(|Extension(c)| c);
    let principal = guard::require_role(&services, ctx.as_ref(), &Role::ALL).await?;

    Ok(Json(PrincipalResponse::from(&principal)).into_response())
}
