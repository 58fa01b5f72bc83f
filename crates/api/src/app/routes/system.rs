use std::sync::Arc;

use axum::{
    Extension, Json,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::app::{errors, services::AppServices};
use crate::middleware;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /whoami - echo of the session claims.
///
/// A public route (no prefix match), so it validates the token itself
/// instead of relying on gateway-inserted context.
pub async fn whoami(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> Response {
    let Some(token) = middleware::session_token(&headers) else {
        return errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "no active session");
    };

    match services.codec.validate(&token, Utc::now()) {
        Ok(claims) => Json(serde_json::json!({
            "principal_id": claims.sub,
            "role": claims.role,
        }))
        .into_response(),
        Err(_) => {
            errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "no active session")
        }
    }
}
