//! In-memory stores for tests and local development.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use hrm_auth::{
    NewPrincipal, Permission, PermissionStore, Principal, PrincipalStatus, PrincipalStore, Role,
    StoreError,
};
use hrm_core::{Email, PrincipalId};

fn poisoned() -> StoreError {
    StoreError::Unavailable("store lock poisoned".to_string())
}

/// In-memory principal store.
///
/// Ids are assigned from a monotonically increasing sequence, mirroring the
/// autoincrement column of the relational backend.
#[derive(Default)]
pub struct InMemoryPrincipalStore {
    inner: RwLock<HashMap<PrincipalId, Principal>>,
    next_id: AtomicI64,
}

impl InMemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PrincipalStore for InMemoryPrincipalStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Principal>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().find(|p| p.email == *email).cloned())
    }

    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Principal>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let mut all: Vec<Principal> = map.values().cloned().collect();
        all.sort_by_key(|p| p.id);
        Ok(all)
    }

    async fn insert(&self, new: NewPrincipal) -> Result<Principal, StoreError> {
        // Uniqueness check and insert happen under one write lock, matching
        // the single-statement atomicity of the relational backend.
        let mut map = self.inner.write().map_err(|_| poisoned())?;

        if map.values().any(|p| p.email == new.email) {
            return Err(StoreError::Conflict(format!(
                "email already registered: {}",
                new.email
            )));
        }

        let id = PrincipalId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let principal = Principal {
            id,
            email: new.email,
            display_name: new.display_name,
            role: new.role,
            status: new.status,
            password_hash: new.password_hash,
            created_at: Utc::now(),
        };
        map.insert(id, principal.clone());
        Ok(principal)
    }

    async fn update_status(
        &self,
        id: PrincipalId,
        status: PrincipalStatus,
    ) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let principal = map.get_mut(&id).ok_or(StoreError::NotFound)?;
        principal.status = status;
        Ok(())
    }

    async fn update_role(&self, id: PrincipalId, role: Role) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let principal = map.get_mut(&id).ok_or(StoreError::NotFound)?;
        principal.role = role;
        Ok(())
    }

    async fn delete(&self, id: PrincipalId) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.remove(&id).ok_or(StoreError::NotFound)?;
        Ok(())
    }
}

#[derive(Default)]
struct PermissionState {
    // BTreeMap keeps listings ordered by key.
    catalog: BTreeMap<String, Permission>,
    grants: HashSet<(Role, String)>,
}

/// In-memory permission catalog and role grants.
#[derive(Default)]
pub struct InMemoryPermissionStore {
    inner: RwLock<PermissionState>,
}

impl InMemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PermissionStore for InMemoryPermissionStore {
    async fn create(&self, permission: Permission) -> Result<Permission, StoreError> {
        let mut state = self.inner.write().map_err(|_| poisoned())?;
        if state.catalog.contains_key(&permission.key) {
            return Err(StoreError::Conflict(format!(
                "permission already exists: {}",
                permission.key
            )));
        }
        state
            .catalog
            .insert(permission.key.clone(), permission.clone());
        Ok(permission)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut state = self.inner.write().map_err(|_| poisoned())?;
        state.catalog.remove(key).ok_or(StoreError::NotFound)?;
        // Grants referencing a deleted permission go with it.
        state.grants.retain(|(_, k)| k != key);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Permission>, StoreError> {
        let state = self.inner.read().map_err(|_| poisoned())?;
        Ok(state.catalog.values().cloned().collect())
    }

    async fn grant(&self, role: Role, key: &str) -> Result<(), StoreError> {
        let mut state = self.inner.write().map_err(|_| poisoned())?;
        if !state.catalog.contains_key(key) {
            return Err(StoreError::NotFound);
        }
        state.grants.insert((role, key.to_string()));
        Ok(())
    }

    async fn revoke(&self, role: Role, key: &str) -> Result<(), StoreError> {
        let mut state = self.inner.write().map_err(|_| poisoned())?;
        state.grants.remove(&(role, key.to_string()));
        Ok(())
    }

    async fn list_for_role(&self, role: Role) -> Result<Vec<Permission>, StoreError> {
        let state = self.inner.read().map_err(|_| poisoned())?;
        Ok(state
            .catalog
            .values()
            .filter(|p| state.grants.contains(&(role, p.key.clone())))
            .cloned()
            .collect())
    }

    async fn has(&self, role: Role, key: &str) -> Result<bool, StoreError> {
        let state = self.inner.read().map_err(|_| poisoned())?;
        Ok(state.grants.contains(&(role, key.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_principal(email: &str) -> NewPrincipal {
        NewPrincipal {
            email: Email::parse(email).unwrap(),
            display_name: email.to_string(),
            role: Role::Employee,
            status: PrincipalStatus::Active,
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = InMemoryPrincipalStore::new();
        let a = store.insert(new_principal("a@hrm.local")).await.unwrap();
        let b = store.insert(new_principal("b@hrm.local")).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_and_leaves_original_untouched() {
        let store = InMemoryPrincipalStore::new();
        let original = store.insert(new_principal("dup@hrm.local")).await.unwrap();

        // Any case variant of the same address normalizes to the same email.
        let mut second = new_principal("dup@hrm.local");
        second.email = Email::parse("  DUP@HRM.LOCAL ").unwrap();
        second.display_name = "Imposter".to_string();

        let err = store.insert(second).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let kept = store.find_by_id(original.id).await.unwrap().unwrap();
        assert_eq!(kept.display_name, original.display_name);
    }

    #[tokio::test]
    async fn find_by_email_matches_normalized_address() {
        let store = InMemoryPrincipalStore::new();
        store.insert(new_principal("carol@hrm.local")).await.unwrap();

        let found = store
            .find_by_email(&Email::parse("Carol@HRM.Local").unwrap())
            .await
            .unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn status_update_is_visible_on_next_read() {
        let store = InMemoryPrincipalStore::new();
        let p = store.insert(new_principal("dave@hrm.local")).await.unwrap();

        store
            .update_status(p.id, PrincipalStatus::Suspended)
            .await
            .unwrap();
        let reread = store.find_by_id(p.id).await.unwrap().unwrap();
        assert_eq!(reread.status, PrincipalStatus::Suspended);
    }

    #[tokio::test]
    async fn grant_is_idempotent() {
        let store = InMemoryPermissionStore::new();
        store
            .create(Permission::new("leave:approve", "Approve leave").unwrap())
            .await
            .unwrap();

        store.grant(Role::Hr, "leave:approve").await.unwrap();
        store.grant(Role::Hr, "leave:approve").await.unwrap();

        assert!(store.has(Role::Hr, "leave:approve").await.unwrap());
        assert_eq!(store.list_for_role(Role::Hr).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn grant_requires_existing_permission() {
        let store = InMemoryPermissionStore::new();
        let err = store.grant(Role::Hr, "ghost:none").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn revoke_of_absent_grant_is_a_noop() {
        let store = InMemoryPermissionStore::new();
        store
            .create(Permission::new("employees:read", "Read employees").unwrap())
            .await
            .unwrap();

        // Never granted; revoke must still succeed.
        store.revoke(Role::Employee, "employees:read").await.unwrap();
        assert!(!store.has(Role::Employee, "employees:read").await.unwrap());
    }

    #[tokio::test]
    async fn grant_then_revoke_round_trip() {
        let store = InMemoryPermissionStore::new();
        store
            .create(Permission::new("leave:approve", "Approve leave").unwrap())
            .await
            .unwrap();

        store.grant(Role::Hr, "leave:approve").await.unwrap();
        assert!(store.has(Role::Hr, "leave:approve").await.unwrap());

        store.revoke(Role::Hr, "leave:approve").await.unwrap();
        assert!(!store.has(Role::Hr, "leave:approve").await.unwrap());
    }

    #[tokio::test]
    async fn deleting_a_permission_drops_its_grants() {
        let store = InMemoryPermissionStore::new();
        store
            .create(Permission::new("payroll:run", "Run payroll").unwrap())
            .await
            .unwrap();
        store.grant(Role::Admin, "payroll:run").await.unwrap();

        store.delete("payroll:run").await.unwrap();
        assert!(!store.has(Role::Admin, "payroll:run").await.unwrap());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listings_are_ordered_by_key() {
        let store = InMemoryPermissionStore::new();
        for key in ["z:last", "a:first", "m:middle"] {
            store.create(Permission::new(key, "").unwrap()).await.unwrap();
        }

        let keys: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.key)
            .collect();
        assert_eq!(keys, vec!["a:first", "m:middle", "z:last"]);
    }
}
