use hrm_auth::Role;
use hrm_core::PrincipalId;

/// Principal context for a request (gateway-derived identity + role).
///
/// The role here is the token's embedded role, a coarse fast-path value
/// with bounded staleness. Handlers that make authorization-sensitive
/// decisions go through the guard, which re-reads the store.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal_id: PrincipalId,
    role: Role,
}

impl PrincipalContext {
    pub fn new(principal_id: PrincipalId, role: Role) -> Self {
        Self { principal_id, role }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn role(&self) -> Role {
        self.role
    }
}
