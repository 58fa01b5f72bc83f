use core::num::ParseIntError;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identity of an authenticated principal.
///
/// Principals are keyed by the integer row id of the backing user table.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PrincipalId(i64);

impl PrincipalId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for PrincipalId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<PrincipalId> for i64 {
    fn from(value: PrincipalId) -> Self {
        value.0
    }
}

impl FromStr for PrincipalId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(i64::from_str(s)?))
    }
}
