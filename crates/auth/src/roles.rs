use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier used for route authorization.
///
/// Roles are opaque strings compared byte-for-byte. There is no hierarchy:
/// `"admin"` does not imply `"user"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Role {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl core::borrow::Borrow<str> for Role {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn equality_is_exact() {
        assert_eq!(Role::new("admin"), Role::from(String::from("admin")));
        assert_ne!(Role::new("admin"), Role::new("Admin"));
        assert_ne!(Role::new("admin"), Role::new("admin "));
    }

    #[test]
    fn role_sets_can_be_queried_by_str() {
        let roles: HashSet<Role> = ["admin", "editor"].into_iter().map(Role::from).collect();
        assert!(roles.contains("admin"));
        assert!(!roles.contains("user"));
    }
}
