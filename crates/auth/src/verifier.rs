use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use hrm_core::Email;

use crate::{Principal, PrincipalStore, StoreError, password};

/// Credential verification failure.
///
/// `InvalidCredentials` covers unknown email and wrong password alike, so
/// the boundary cannot leak which one happened. `AccountInactive` exists for
/// operators (logs, audit); user-facing surfaces must collapse it into the
/// same generic message.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is not active")]
    AccountInactive,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Validates email/password pairs against stored hashes.
pub struct CredentialVerifier {
    store: Arc<dyn PrincipalStore>,
}

impl CredentialVerifier {
    pub fn new(store: Arc<dyn PrincipalStore>) -> Self {
        Self { store }
    }

    /// Verify a credential pair, returning the matching principal.
    ///
    /// The email is normalized before lookup. Check order follows the login
    /// flow (lookup, hash comparison, then status), so a suspended account
    /// with a wrong password still reports `InvalidCredentials`.
    pub async fn verify(&self, email: &str, plaintext: &str) -> Result<Principal, AuthError> {
        if plaintext.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let Some(principal) = self.store.find_by_email(&email).await? else {
            debug!(email = %email, "login attempt for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        // bcrypt verification is CPU-bound; run it off the async workers.
        // A failed join denies, never allows.
        let hash = principal.password_hash.clone();
        let attempt = plaintext.to_string();
        let password_ok =
            tokio::task::spawn_blocking(move || password::verify_password(&attempt, &hash))
                .await
                .unwrap_or(false);

        if !password_ok {
            debug!(principal_id = %principal.id, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        if !principal.is_active() {
            debug!(
                principal_id = %principal.id,
                status = %principal.status,
                "login attempt on inactive account"
            );
            return Err(AuthError::AccountInactive);
        }

        Ok(principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubPrincipalStore;
    use crate::{PrincipalStatus, Role};

    const TEST_COST: u32 = 4;

    fn store_with(entries: Vec<(&str, &str, Role, PrincipalStatus)>) -> Arc<StubPrincipalStore> {
        let store = StubPrincipalStore::default();
        for (email, pw, role, status) in entries {
            store.seed(email, &password::hash_password(pw, TEST_COST).unwrap(), role, status);
        }
        Arc::new(store)
    }

    #[tokio::test]
    async fn unknown_email_yields_invalid_credentials() {
        let verifier = CredentialVerifier::new(store_with(vec![]));
        let err = verifier.verify("nobody@hrm.local", "whatever").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn wrong_password_yields_invalid_credentials() {
        let store = store_with(vec![(
            "alice@hrm.local",
            "correct",
            Role::Employee,
            PrincipalStatus::Active,
        )]);
        let verifier = CredentialVerifier::new(store);

        let err = verifier.verify("alice@hrm.local", "incorrect").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn mixed_case_email_matches_stored_account() {
        let store = store_with(vec![(
            "admin@hrm.local",
            "s3cret",
            Role::Admin,
            PrincipalStatus::Active,
        )]);
        let verifier = CredentialVerifier::new(store);

        let principal = verifier.verify("  Admin@Hrm.Local ", "s3cret").await.unwrap();
        assert_eq!(principal.email.as_str(), "admin@hrm.local");
        assert_eq!(principal.role, Role::Admin);
    }

    #[tokio::test]
    async fn suspended_account_with_correct_password_is_inactive() {
        let store = store_with(vec![(
            "bob@hrm.local",
            "s3cret",
            Role::Hr,
            PrincipalStatus::Suspended,
        )]);
        let verifier = CredentialVerifier::new(store);

        let err = verifier.verify("bob@hrm.local", "s3cret").await.unwrap_err();
        assert!(matches!(err, AuthError::AccountInactive));
    }

    #[tokio::test]
    async fn suspended_account_with_wrong_password_stays_generic() {
        let store = store_with(vec![(
            "bob@hrm.local",
            "s3cret",
            Role::Hr,
            PrincipalStatus::Suspended,
        )]);
        let verifier = CredentialVerifier::new(store);

        let err = verifier.verify("bob@hrm.local", "nope").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn empty_password_is_rejected_without_lookup() {
        let verifier = CredentialVerifier::new(store_with(vec![]));
        let err = verifier.verify("alice@hrm.local", "").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }
}
