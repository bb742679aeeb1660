//! Access decision procedure
//!
//! One policy applies per operation: open to everyone, closed to everyone,
//! or a non-empty role set of which the caller must hold at least one.

use crate::error::{AuthError, AuthResult};
use crate::role::Role;
use std::collections::HashSet;

/// Declared access requirement of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Everyone may call; authentication is skipped entirely.
    Open,
    /// Nobody may call, regardless of credentials.
    Closed,
    /// Callers holding at least one of these roles may call.
    AnyOf(HashSet<Role>),
}

impl AccessPolicy {
    /// Build an `AnyOf` policy from a role list.
    pub fn any_of(roles: impl IntoIterator<Item = Role>) -> Self {
        let roles: HashSet<Role> = roles.into_iter().collect();
        debug_assert!(!roles.is_empty(), "AnyOf policy needs at least one role");
        AccessPolicy::AnyOf(roles)
    }

    /// Decide whether a caller with the given roles may proceed.
    ///
    /// The granted set must be the store's current assignment for the
    /// caller, never a cached or token-claimed one, so a revocation is
    /// effective on the next request.
    pub fn authorize(&self, granted: &HashSet<Role>) -> AuthResult<()> {
        match self {
            AccessPolicy::Open => Ok(()),
            AccessPolicy::Closed => Err(AuthError::OperationForbidden),
            AccessPolicy::AnyOf(required) => {
                if required.is_disjoint(granted) {
                    Err(AuthError::RoleNotAllowed)
                } else {
                    Ok(())
                }
            }
        }
    }
}
