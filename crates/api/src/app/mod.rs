//! HTTP API application wiring (axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: store/codec/verifier wiring shared by all handlers
//! - `routes/`: HTTP routes + handlers (one file per panel/surface)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use crate::config::AuthConfig;
use crate::middleware::{self, GatewayState};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// The gateway is the outermost layer: it sees every request before any
/// handler, passes public paths through, and enforces the route table for
/// protected prefixes.
pub fn build_app(config: &AuthConfig, services: Arc<services::AppServices>) -> Router {
    let gateway_state = GatewayState {
        codec: services.codec.clone(),
        routes: Arc::new(config.routes.clone()),
        login_path: config.login_path.clone(),
        denied_role_policy: config.denied_role_policy,
    };

    routes::router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn_with_state(
                gateway_state,
                middleware::gateway,
            ))
            .layer(Extension(services)),
    )
}
