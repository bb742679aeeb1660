//! Role model for access control decisions

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Roles a user can hold
///
/// The set is closed: authorization only ever compares against these three.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
    Guest,
}

impl Role {
    /// Collect roles into the set form used by the access decision.
    pub fn set(roles: impl IntoIterator<Item = Role>) -> HashSet<Role> {
        roles.into_iter().collect()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "ADMIN"),
            Role::User => write!(f, "USER"),
            Role::Guest => write!(f, "GUEST"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            "GUEST" => Ok(Role::Guest),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}
