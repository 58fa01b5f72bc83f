//! `hrm-infra` — store implementations behind the `hrm-auth` seams.
//!
//! Two backends: in-memory (tests, local development) and Postgres (sqlx).
//! Both uphold the same contracts (idempotent grants, conflict on duplicate
//! email, atomic per-pair grant/revoke), so the API layer never cares which
//! one it is wired to.

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryPermissionStore, InMemoryPrincipalStore};
pub use postgres::{PgPermissionStore, PgPrincipalStore, ensure_schema};
