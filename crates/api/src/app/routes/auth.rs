//! Authentication entry points: login, registration, logout.
//!
//! These are the only routes that handle plaintext credentials. The session
//! token travels exclusively in an HTTP-only cookie; it is never a readable
//! response field.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;

use hrm_auth::{NewPrincipal, PrincipalStatus, Role, hash_password};
use hrm_core::Email;

use crate::app::{
    dto::{LoginRequest, PrincipalResponse, RegisterRequest},
    errors,
    services::AppServices,
};
use crate::middleware::SESSION_COOKIE;

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/logout", post(logout))
}

/// POST /auth/login
///
/// Every failure (unknown email, wrong password, inactive account)
/// produces the same generic 401; the distinction lives in the logs only.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> Response {
    let principal = match services.verifier.verify(&body.email, &body.password).await {
        Ok(p) => p,
        Err(e) => return errors::auth_error_to_response(e),
    };

    let token = match services.codec.issue(&principal, Utc::now()) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "failed to issue session token");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "server_error",
                "server error",
            );
        }
    };

    tracing::info!(principal_id = %principal.id, role = %principal.role, "login succeeded");

    let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(PrincipalResponse::from(&principal)),
    )
        .into_response()
}

/// POST /auth/register
///
/// Open registration: new accounts start as active employees. Duplicate
/// emails (any case variant) conflict without touching the existing record.
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RegisterRequest>,
) -> Response {
    if body.email.trim().is_empty() || body.name.trim().is_empty() || body.password.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "email, name and password are required",
        );
    }

    let email = match Email::parse(&body.email) {
        Ok(e) => e,
        Err(e) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string());
        }
    };

    // Hashing is CPU-bound; keep it off the async workers.
    let cost = services.bcrypt_cost;
    let password = body.password;
    let password_hash =
        match tokio::task::spawn_blocking(move || hash_password(&password, cost)).await {
            Ok(Ok(hash)) => hash,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "password hashing failed");
                return errors::json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "server_error",
                    "server error",
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "password hashing task failed");
                return errors::json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "server_error",
                    "server error",
                );
            }
        };

    let new = NewPrincipal {
        email,
        display_name: body.name.trim().to_string(),
        role: Role::Employee,
        status: PrincipalStatus::Active,
        password_hash,
    };

    match services.principals.insert(new).await {
        Ok(p) => (StatusCode::CREATED, Json(PrincipalResponse::from(&p))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// POST /auth/logout
///
/// Sessions are stateless: logout expires the cookie client-side and the
/// token itself stays verifiable until natural expiry. The route guard's
/// store re-check is the compensating control (see DESIGN.md).
pub async fn logout() -> Response {
    let cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]).into_response()
}
