use std::sync::Arc;

use anyhow::Context;

use hrm_api::app::services::{AppServices, seed_admin};
use hrm_api::config::AuthConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hrm_observability::init();

    // Missing or empty HRM_SESSION_SECRET aborts startup here.
    let config = AuthConfig::from_env().context("invalid configuration")?;

    let services = match std::env::var("HRM_DATABASE_URL") {
        Ok(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(8)
                .connect(&url)
                .await
                .context("failed to connect to HRM_DATABASE_URL")?;
            hrm_infra::ensure_schema(&pool)
                .await
                .context("failed to ensure database schema")?;

            AppServices::new(
                &config,
                Arc::new(hrm_infra::PgPrincipalStore::new(pool.clone())),
                Arc::new(hrm_infra::PgPermissionStore::new(pool)),
            )
        }
        Err(_) => {
            tracing::warn!("HRM_DATABASE_URL not set; using in-memory stores");
            AppServices::in_memory(&config)
        }
    };
    let services = Arc::new(services);

    if let Ok(password) = std::env::var("HRM_ADMIN_PASSWORD") {
        seed_admin(&services, &password)
            .await
            .context("failed to seed admin account")?;
    }

    let app = hrm_api::app::build_app(&config, services);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
