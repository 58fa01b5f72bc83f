use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use hrm_auth::{AuthError, StoreError};

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Map store failures to responses.
///
/// Unavailability surfaces as a generic 500 and the request is denied,
/// never waved through on the grounds that the store could not be asked.
pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        StoreError::Unavailable(msg) => {
            tracing::error!(error = %msg, "store unavailable");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "server_error", "server error")
        }
    }
}

/// Collapse every authentication failure into one generic 401 so the
/// response cannot be used for account enumeration. The precise cause
/// (wrong password vs. inactive account) is only visible in logs.
pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::InvalidCredentials | AuthError::AccountInactive => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "invalid credentials",
        ),
        AuthError::Store(e) => store_error_to_response(e),
    }
}
