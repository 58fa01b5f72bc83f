use core::str::FromStr;

use serde::Serialize;

use crate::DomainError;

/// Normalized email address.
///
/// Stored-email lookups are case-insensitive. Normalization (trim +
/// lowercase) happens exactly once, at this boundary, so every comparison
/// downstream is plain equality. Construction goes through [`Email::parse`];
/// there is no way to hold an unnormalized value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parse and normalize a raw email string.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(DomainError::validation("email cannot be empty"));
        }
        if !normalized.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        let a = Email::parse("  Admin@HRM.Local ").unwrap();
        let b = Email::parse("admin@hrm.local").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "admin@hrm.local");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = Email::parse("Alice@Example.COM").unwrap();
        let twice = Email::parse(once.as_str()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn rejects_empty_and_whitespace_only() {
        assert!(Email::parse("").is_err());
        assert!(Email::parse("   ").is_err());
    }

    #[test]
    fn rejects_missing_at_sign() {
        assert!(Email::parse("not-an-email").is_err());
    }
}
