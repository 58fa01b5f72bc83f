//! Minimal in-memory principal store for unit tests in this crate.
//!
//! The real implementations live in `hrm-infra`; depending on them here
//! would create a cycle.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use hrm_core::{Email, PrincipalId};

use crate::{NewPrincipal, Principal, PrincipalStatus, PrincipalStore, Role, StoreError};

#[derive(Default)]
pub(crate) struct StubPrincipalStore {
    inner: RwLock<HashMap<PrincipalId, Principal>>,
    next_id: AtomicI64,
}

impl StubPrincipalStore {
    pub(crate) fn seed(
        &self,
        email: &str,
        password_hash: &str,
        role: Role,
        status: PrincipalStatus,
    ) -> Principal {
        let principal = Principal {
            id: PrincipalId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            email: Email::parse(email).unwrap(),
            display_name: email.to_string(),
            role,
            status,
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        self.inner
            .write()
            .unwrap()
            .insert(principal.id, principal.clone());
        principal
    }

    pub(crate) fn set_status(&self, id: PrincipalId, status: PrincipalStatus) {
        if let Some(p) = self.inner.write().unwrap().get_mut(&id) {
            p.status = status;
        }
    }

    pub(crate) fn remove(&self, id: PrincipalId) {
        self.inner.write().unwrap().remove(&id);
    }
}

#[async_trait]
impl PrincipalStore for StubPrincipalStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Principal>, StoreError> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .values()
            .find(|p| p.email == *email)
            .cloned())
    }

    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, StoreError> {
        Ok(self.inner.read().unwrap().get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Principal>, StoreError> {
        Ok(self.inner.read().unwrap().values().cloned().collect())
    }

    async fn insert(&self, new: NewPrincipal) -> Result<Principal, StoreError> {
        let principal = self.seed(new.email.as_str(), &new.password_hash, new.role, new.status);
        Ok(principal)
    }

    async fn update_status(
        &self,
        id: PrincipalId,
        status: PrincipalStatus,
    ) -> Result<(), StoreError> {
        self.set_status(id, status);
        Ok(())
    }

    async fn update_role(&self, id: PrincipalId, role: Role) -> Result<(), StoreError> {
        if let Some(p) = self.inner.write().unwrap().get_mut(&id) {
            p.role = role;
        }
        Ok(())
    }

    async fn delete(&self, id: PrincipalId) -> Result<(), StoreError> {
        self.remove(id);
        Ok(())
    }
}
