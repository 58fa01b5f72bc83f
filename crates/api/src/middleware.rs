use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;

use hrm_auth::TokenCodec;

use crate::app::errors;
use crate::config::{DeniedRolePolicy, RouteTable};
use crate::context::PrincipalContext;

/// Name of the HTTP-only session cookie set at login.
pub const SESSION_COOKIE: &str = "hrm_session";

#[derive(Clone)]
pub struct GatewayState {
    pub codec: Arc<dyn TokenCodec>,
    pub routes: Arc<RouteTable>,
    pub login_path: String,
    pub denied_role_policy: DeniedRolePolicy,
}

/// Request-level authorization gateway.
///
/// Runs before any handler. Public paths pass through untouched; protected
/// paths require a session token whose embedded role is allowed for the
/// matched prefix. Signature/expiry failures are decided here without any
/// store I/O. This is the coarse first line of defense; protected handlers
/// re-check through the guard.
pub async fn gateway(
    State(state): State<GatewayState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    let Some(allowed) = state.routes.allowed_roles(&path) else {
        return next.run(req).await;
    };

    let Some(token) = session_token(req.headers()) else {
        return Redirect::to(&state.login_path).into_response();
    };

    let claims = match state.codec.validate(&token, Utc::now()) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(path = %path, error = %e, "rejected session token");
            return Redirect::to(&state.login_path).into_response();
        }
    };

    if !allowed.contains(&claims.role) {
        tracing::debug!(path = %path, role = %claims.role, "role not allowed for route");
        return match state.denied_role_policy {
            DeniedRolePolicy::Redirect => Redirect::to(&state.login_path).into_response(),
            DeniedRolePolicy::Forbidden => errors::json_error(
                StatusCode::FORBIDDEN,
                "forbidden",
                "role not allowed for this route",
            ),
        };
    }

    req.extensions_mut()
        .insert(PrincipalContext::new(claims.sub, claims.role));

    next.run(req).await
}

/// Session token from the `hrm_session` cookie, falling back to a bearer
/// `Authorization` header for non-browser clients.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = cookie_value(headers, SESSION_COOKIE) {
        return Some(token);
    }
    bearer_token(headers)
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
