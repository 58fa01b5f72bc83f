//! Startup configuration.
//!
//! Everything here is assembled once in `main` and injected into the gateway
//! and services, never read from a process global during request handling.

use anyhow::{Context, bail};
use chrono::Duration;

use hrm_auth::{DEFAULT_BCRYPT_COST, Role};

/// How the gateway answers an authenticated request whose role is not
/// allowed for the matched prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeniedRolePolicy {
    /// Same redirect as the unauthenticated case (no information leak).
    #[default]
    Redirect,
    /// Explicit 403 (clearer UX, reveals that a session exists).
    Forbidden,
}

/// Static route-prefix authorization table.
///
/// Longest matching prefix wins; prefixes match on path-segment boundaries
/// (`/hr` covers `/hr` and `/hr/...`, never `/hrm`). Unmatched paths are
/// public. Loaded once at startup, read-only afterwards.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<(String, Vec<Role>)>,
}

impl RouteTable {
    pub fn new(mut entries: Vec<(String, Vec<Role>)>) -> Self {
        // Longest prefix first, so the first hit is the winner.
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { entries }
    }

    /// The panel mapping: `/admin` → admin; `/hr` → admin, hr;
    /// `/employee` → admin, hr, employee.
    pub fn default_panels() -> Self {
        Self::new(vec![
            ("/admin".to_string(), vec![Role::Admin]),
            ("/hr".to_string(), vec![Role::Admin, Role::Hr]),
            (
                "/employee".to_string(),
                vec![Role::Admin, Role::Hr, Role::Employee],
            ),
        ])
    }

    /// Allowed roles for `path`, or `None` when the path is public.
    pub fn allowed_roles(&self, path: &str) -> Option<&[Role]> {
        self.entries
            .iter()
            .find(|(prefix, _)| {
                path == prefix.as_str()
                    || (path.starts_with(prefix.as_str())
                        && path.as_bytes().get(prefix.len()) == Some(&b'/'))
            })
            .map(|(_, roles)| roles.as_slice())
    }
}

/// Immutable authorization/session configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret. Required; never logged.
    pub session_secret: Vec<u8>,
    pub session_ttl: Duration,
    pub bcrypt_cost: u32,
    pub login_path: String,
    pub denied_role_policy: DeniedRolePolicy,
    pub routes: RouteTable,
    pub listen_addr: String,
}

impl AuthConfig {
    /// Build configuration from the environment.
    ///
    /// A missing or empty `HRM_SESSION_SECRET` is a startup error: running
    /// without a signing secret would silently disable authorization.
    pub fn from_env() -> anyhow::Result<Self> {
        let secret = std::env::var("HRM_SESSION_SECRET")
            .context("HRM_SESSION_SECRET must be set; refusing to start without a signing secret")?;
        if secret.trim().is_empty() {
            bail!("HRM_SESSION_SECRET is empty; refusing to start without a signing secret");
        }

        let ttl_days = match std::env::var("HRM_SESSION_TTL_DAYS") {
            Ok(raw) => raw
                .parse::<i64>()
                .context("HRM_SESSION_TTL_DAYS must be an integer number of days")?,
            Err(_) => 30,
        };
        if ttl_days <= 0 {
            bail!("HRM_SESSION_TTL_DAYS must be positive");
        }

        let bcrypt_cost = match std::env::var("HRM_BCRYPT_COST") {
            Ok(raw) => raw
                .parse::<u32>()
                .context("HRM_BCRYPT_COST must be an integer")?,
            Err(_) => DEFAULT_BCRYPT_COST,
        };

        let denied_role_policy = match std::env::var("HRM_DENIED_ROLE_RESPONSE") {
            Ok(raw) => match raw.as_str() {
                "redirect" => DeniedRolePolicy::Redirect,
                "forbidden" => DeniedRolePolicy::Forbidden,
                other => bail!("HRM_DENIED_ROLE_RESPONSE must be 'redirect' or 'forbidden', got '{other}'"),
            },
            Err(_) => DeniedRolePolicy::default(),
        };

        let listen_addr =
            std::env::var("HRM_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        Ok(Self {
            session_secret: secret.into_bytes(),
            session_ttl: Duration::days(ttl_days),
            bcrypt_cost,
            login_path: "/login".to_string(),
            denied_role_policy,
            routes: RouteTable::default_panels(),
            listen_addr,
        })
    }
}

impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("session_secret", &"<redacted>")
            .field("session_ttl", &self.session_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("login_path", &self.login_path)
            .field("denied_role_policy", &self.denied_role_policy)
            .field("routes", &self.routes)
            .field("listen_addr", &self.listen_addr)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_prefix_admits_only_admin() {
        let table = RouteTable::default_panels();
        assert_eq!(table.allowed_roles("/admin/users"), Some(&[Role::Admin][..]));
    }

    #[test]
    fn employee_prefix_admits_all_roles() {
        let table = RouteTable::default_panels();
        let allowed = table.allowed_roles("/employee/profile").unwrap();
        assert_eq!(allowed, &Role::ALL[..]);
    }

    #[test]
    fn unmatched_paths_are_public() {
        let table = RouteTable::default_panels();
        assert!(table.allowed_roles("/").is_none());
        assert!(table.allowed_roles("/auth/login").is_none());
        assert!(table.allowed_roles("/health").is_none());
    }

    #[test]
    fn prefixes_match_on_segment_boundaries() {
        let table = RouteTable::default_panels();
        // "/hrm-docs" shares bytes with "/hr" but is a different segment.
        assert!(table.allowed_roles("/hrm-docs").is_none());
        assert!(table.allowed_roles("/hr").is_some());
        assert!(table.allowed_roles("/hr/directory").is_some());
    }

    #[test]
    fn longest_prefix_wins() {
        let table = RouteTable::new(vec![
            ("/admin".to_string(), vec![Role::Admin]),
            ("/admin/reports".to_string(), vec![Role::Admin, Role::Hr]),
        ]);

        assert_eq!(
            table.allowed_roles("/admin/reports/monthly"),
            Some(&[Role::Admin, Role::Hr][..])
        );
        assert_eq!(table.allowed_roles("/admin/users"), Some(&[Role::Admin][..]));
    }

    #[test]
    fn config_debug_never_exposes_the_secret() {
        let config = AuthConfig {
            session_secret: b"super-secret".to_vec(),
            session_ttl: Duration::days(30),
            bcrypt_cost: 10,
            login_path: "/login".to_string(),
            denied_role_policy: DeniedRolePolicy::Redirect,
            routes: RouteTable::default_panels(),
            listen_addr: "127.0.0.1:0".to_string(),
        };

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
