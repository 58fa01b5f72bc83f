use axum::{Router, routing::get};

pub mod admin;
pub mod auth;
pub mod employee;
pub mod hr;
pub mod rbac;
pub mod system;

/// Full routing tree. Which prefixes are protected is the gateway's
/// decision (route table), not the router's.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/whoami", get(system::whoami))
        .nest("/auth", auth::router())
        .nest("/admin", admin::router().merge(rbac::router()))
        .nest("/hr", hr::router())
        .nest("/employee", employee::router())
}
