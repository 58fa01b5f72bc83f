//! Postgres-backed store implementations.
//!
//! ## Atomicity
//!
//! Every mutation is a single statement; grant idempotence comes from
//! `ON CONFLICT DO NOTHING` and the referential invariant (grants must point
//! at an existing permission) from a foreign key with `ON DELETE CASCADE`.
//!
//! ## Schema
//!
//! See [`ensure_schema`]; emails are stored pre-normalized (the domain only
//! constructs normalized [`Email`] values), so the plain `UNIQUE` constraint
//! is already case-insensitive in effect.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use hrm_auth::{
    NewPrincipal, Permission, PermissionStore, Principal, PrincipalStatus, PrincipalStore, Role,
    StoreError,
};
use hrm_core::{Email, PrincipalId};

/// Create the subsystem's tables when they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS principals (
            id BIGSERIAL PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL,
            role TEXT NOT NULL,
            status TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS permissions (
            key TEXT PRIMARY KEY,
            description TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS role_permissions (
            role TEXT NOT NULL,
            permission_key TEXT NOT NULL REFERENCES permissions(key) ON DELETE CASCADE,
            PRIMARY KEY (role, permission_key)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

fn map_sqlx_error(op: &str, e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(format!("{op}: {e}"))
}

fn corrupt_row(op: &str, detail: impl core::fmt::Display) -> StoreError {
    StoreError::Unavailable(format!("{op}: corrupt row: {detail}"))
}

fn row_to_principal(op: &str, row: &PgRow) -> Result<Principal, StoreError> {
    let id: i64 = row.try_get("id").map_err(|e| corrupt_row(op, e))?;
    let email: String = row.try_get("email").map_err(|e| corrupt_row(op, e))?;
    let display_name: String = row
        .try_get("display_name")
        .map_err(|e| corrupt_row(op, e))?;
    let role: String = row.try_get("role").map_err(|e| corrupt_row(op, e))?;
    let status: String = row.try_get("status").map_err(|e| corrupt_row(op, e))?;
    let password_hash: String = row
        .try_get("password_hash")
        .map_err(|e| corrupt_row(op, e))?;
    let created_at: chrono::DateTime<chrono::Utc> =
        row.try_get("created_at").map_err(|e| corrupt_row(op, e))?;

    Ok(Principal {
        id: PrincipalId::new(id),
        email: Email::parse(&email).map_err(|e| corrupt_row(op, e))?,
        display_name,
        role: role.parse::<Role>().map_err(|e| corrupt_row(op, e))?,
        status: status
            .parse::<PrincipalStatus>()
            .map_err(|e| corrupt_row(op, e))?,
        password_hash,
        created_at,
    })
}

const PRINCIPAL_COLUMNS: &str =
    "id, email, display_name, role, status, password_hash, created_at";

/// Postgres principal store.
pub struct PgPrincipalStore {
    pool: PgPool,
}

impl PgPrincipalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalStore for PgPrincipalStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Principal>, StoreError> {
        let sql = format!("SELECT {PRINCIPAL_COLUMNS} FROM principals WHERE email = $1");
        let row = sqlx::query(&sql)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_email", e))?;

        row.map(|r| row_to_principal("find_by_email", &r)).transpose()
    }

    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, StoreError> {
        let sql = format!("SELECT {PRINCIPAL_COLUMNS} FROM principals WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.map(|r| row_to_principal("find_by_id", &r)).transpose()
    }

    async fn list(&self) -> Result<Vec<Principal>, StoreError> {
        let sql = format!("SELECT {PRINCIPAL_COLUMNS} FROM principals ORDER BY id");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_principals", e))?;

        rows.iter()
            .map(|r| row_to_principal("list_principals", r))
            .collect()
    }

    async fn insert(&self, new: NewPrincipal) -> Result<Principal, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO principals (email, display_name, role, status, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PRINCIPAL_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(new.email.as_str())
            .bind(&new.display_name)
            .bind(new.role.as_str())
            .bind(new.status.to_string())
            .bind(&new.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StoreError::Conflict(format!("email already registered: {}", new.email))
                }
                _ => map_sqlx_error("insert_principal", e),
            })?;

        row_to_principal("insert_principal", &row)
    }

    async fn update_status(
        &self,
        id: PrincipalId,
        status: PrincipalStatus,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE principals SET status = $1 WHERE id = $2")
            .bind(status.to_string())
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_status", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn update_role(&self, id: PrincipalId, role: Role) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE principals SET role = $1 WHERE id = $2")
            .bind(role.as_str())
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_role", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: PrincipalId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM principals WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_principal", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

/// Postgres permission catalog and role grants.
pub struct PgPermissionStore {
    pool: PgPool,
}

impl PgPermissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_permission(op: &str, row: &PgRow) -> Result<Permission, StoreError> {
    let key: String = row.try_get("key").map_err(|e| corrupt_row(op, e))?;
    let description: String = row.try_get("description").map_err(|e| corrupt_row(op, e))?;
    Permission::new(key, description).map_err(|e| corrupt_row(op, e))
}

#[async_trait]
impl PermissionStore for PgPermissionStore {
    async fn create(&self, permission: Permission) -> Result<Permission, StoreError> {
        let row = sqlx::query(
            "INSERT INTO permissions (key, description) VALUES ($1, $2) RETURNING key, description",
        )
        .bind(&permission.key)
        .bind(&permission.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(format!("permission already exists: {}", permission.key))
            }
            _ => map_sqlx_error("create_permission", e),
        })?;

        row_to_permission("create_permission", &row)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        // Grants follow via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM permissions WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_permission", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Permission>, StoreError> {
        let rows = sqlx::query("SELECT key, description FROM permissions ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_permissions", e))?;

        rows.iter()
            .map(|r| row_to_permission("list_permissions", r))
            .collect()
    }

    async fn grant(&self, role: Role, key: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO role_permissions (role, permission_key)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(role.as_str())
        .bind(key)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => StoreError::NotFound,
            _ => map_sqlx_error("grant", e),
        })?;

        Ok(())
    }

    async fn revoke(&self, role: Role, key: &str) -> Result<(), StoreError> {
        // Zero rows deleted is fine: revoking an absent grant is a no-op.
        sqlx::query("DELETE FROM role_permissions WHERE role = $1 AND permission_key = $2")
            .bind(role.as_str())
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("revoke", e))?;

        Ok(())
    }

    async fn list_for_role(&self, role: Role) -> Result<Vec<Permission>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT p.key, p.description
            FROM permissions p
            JOIN role_permissions rp ON rp.permission_key = p.key
            WHERE rp.role = $1
            ORDER BY p.key
            "#,
        )
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_for_role", e))?;

        rows.iter()
            .map(|r| row_to_permission("list_for_role", r))
            .collect()
    }

    async fn has(&self, role: Role, key: &str) -> Result<bool, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM role_permissions
                WHERE role = $1 AND permission_key = $2
            ) AS present
            "#,
        )
        .bind(role.as_str())
        .bind(key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("has", e))?;

        row.try_get("present").map_err(|e| corrupt_row("has", e))
    }
}
