use std::sync::Arc;

use hrm_auth::{
    CredentialVerifier, Hs256TokenCodec, NewPrincipal, PermissionStore, PrincipalResolver,
    PrincipalStatus, PrincipalStore, Role, StoreError, TokenCodec, hash_password,
};
use hrm_core::Email;

use crate::config::AuthConfig;

/// Shared application services, wired once at startup.
pub struct AppServices {
    pub principals: Arc<dyn PrincipalStore>,
    pub permissions: Arc<dyn PermissionStore>,
    pub codec: Arc<dyn TokenCodec>,
    pub verifier: CredentialVerifier,
    pub resolver: PrincipalResolver,
    pub bcrypt_cost: u32,
}

impl AppServices {
    /// Wire services over the given stores.
    pub fn new(
        config: &AuthConfig,
        principals: Arc<dyn PrincipalStore>,
        permissions: Arc<dyn PermissionStore>,
    ) -> Self {
        let codec: Arc<dyn TokenCodec> = Arc::new(Hs256TokenCodec::new(
            &config.session_secret,
            config.session_ttl,
        ));

        Self {
            verifier: CredentialVerifier::new(principals.clone()),
            resolver: PrincipalResolver::new(principals.clone(), codec.clone()),
            principals,
            permissions,
            codec,
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    /// In-memory stores (tests, local development).
    pub fn in_memory(config: &AuthConfig) -> Self {
        Self::new(
            config,
            Arc::new(hrm_infra::InMemoryPrincipalStore::new()),
            Arc::new(hrm_infra::InMemoryPermissionStore::new()),
        )
    }
}

/// Create the bootstrap admin account when it does not exist yet.
///
/// Called from `main` only when an admin password is supplied out-of-band;
/// a conflict means the account is already there and is not an error.
pub async fn seed_admin(services: &AppServices, password: &str) -> Result<(), anyhow::Error> {
    let email = Email::parse("admin@hrm.local").expect("static admin email is valid");

    if services.principals.find_by_email(&email).await?.is_some() {
        return Ok(());
    }

    let password_hash = hash_password(password, services.bcrypt_cost)?;
    let result = services
        .principals
        .insert(NewPrincipal {
            email,
            display_name: "Administrator".to_string(),
            role: Role::Admin,
            status: PrincipalStatus::Active,
            password_hash,
        })
        .await;

    match result {
        Ok(admin) => {
            tracing::info!(principal_id = %admin.id, "seeded bootstrap admin account");
            Ok(())
        }
        // Lost a race against another instance; the account exists either way.
        Err(StoreError::Conflict(_)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
