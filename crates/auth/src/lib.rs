//! `hrm-auth` — authentication/authorization core (zero-trust boundary).
//!
//! This crate owns credential verification, session tokens, the role model,
//! and the store seams for principals and permissions. It is deliberately
//! decoupled from HTTP: the gateway and guard in `hrm-api` are thin
//! consumers, and store implementations live in `hrm-infra`.

pub mod claims;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod resolver;
pub mod roles;
pub mod store;
pub mod token;
pub mod verifier;

#[cfg(test)]
mod test_support;

pub use claims::{SessionClaims, TokenError, validate_claims};
pub use password::{DEFAULT_BCRYPT_COST, PasswordError, hash_password, verify_password};
pub use permissions::Permission;
pub use principal::{NewPrincipal, Principal, PrincipalStatus, UnknownStatus};
pub use resolver::PrincipalResolver;
pub use roles::{Role, UnknownRole};
pub use store::{PermissionStore, PrincipalStore, StoreError};
pub use token::{Hs256TokenCodec, TokenCodec};
pub use verifier::{AuthError, CredentialVerifier};
