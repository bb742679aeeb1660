//! In-memory credential store
//!
//! A process-wide role based authentication database. Passwords are salted
//! and hashed at insertion; the salt/hash pair is immutable afterwards and
//! the plaintext is never kept. Reads and writes go through a read-write
//! lock so lookups stay coherent under concurrent add/remove.

use crate::error::{AuthError, AuthResult};
use crate::password::{self, HASH_LEN, SALT_LEN};
use crate::role::Role;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// A stored user
///
/// Identity key is the email. The salt and hash are private to this module;
/// verification goes through [`UserRecord::verify_password`].
#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip)]
    salt: [u8; SALT_LEN],
    #[serde(skip)]
    password_hash: [u8; HASH_LEN],
    pub roles: HashSet<Role>,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Create a new record, deriving the salt/hash pair from the password.
    pub fn new(
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
        roles: HashSet<Role>,
    ) -> AuthResult<Self> {
        if roles.is_empty() {
            return Err(AuthError::EmptyRoleSet);
        }
        let salt = password::generate_salt()?;
        let password_hash = password::derive_hash(password, &salt);

        Ok(Self {
            id: Uuid::new_v4(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            salt,
            password_hash,
            roles,
            created_at: Utc::now(),
        })
    }

    /// Re-derive with the stored salt and compare against the stored hash.
    pub fn verify_password(&self, password: &str) -> bool {
        password::verify(password, &self.salt, &self.password_hash)
    }

    /// Principal display form, e.g. `Doe, John <john.doe@nowhere.com>`.
    pub fn display_name(&self) -> String {
        format!("{}, {} <{}>", self.last_name, self.first_name, self.email)
    }
}

/// In-memory user database keyed by email
#[derive(Debug, Default)]
pub struct CredentialStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl CredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store populated with the demo users.
    ///
    /// Failure here means the OS entropy source is unavailable and is fatal
    /// at startup; callers at request time treat the same error as a
    /// rejected add instead.
    pub fn with_seed_users() -> AuthResult<Self> {
        let store = Self::new();
        store.add_user("John", "Doe", "john.doe@nowhere.com", "admin", Role::set([Role::Admin]))?;
        store.add_user("William", "Smith", "william.smith@here.net", "user", Role::set([Role::User]))?;
        store.add_user("Mary", "Robert", "mary.roberts@here.net", "user", Role::set([Role::User]))?;
        info!("Seeded credential store with {} demo users", store.len());
        Ok(store)
    }

    /// Insert a user keyed by email. An existing record under the same
    /// email is replaced.
    pub fn add_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
        roles: HashSet<Role>,
    ) -> AuthResult<()> {
        let record = UserRecord::new(first_name, last_name, email, password, roles)?;
        debug!("Adding user: {}", email);
        self.users.write().unwrap().insert(record.email.clone(), record);
        Ok(())
    }

    /// Remove a user by email. Removing an absent email is a no-op.
    pub fn remove_user(&self, email: &str) {
        debug!("Removing user: {}", email);
        self.users.write().unwrap().remove(email);
    }

    /// Look up a user by email.
    pub fn get_user(&self, email: &str) -> Option<UserRecord> {
        self.users.read().unwrap().get(email).cloned()
    }

    /// Check a password against the stored salt/hash pair.
    ///
    /// An absent email is a plain `false`, not an error.
    pub fn verify_password(&self, email: &str, password: &str) -> bool {
        match self.get_user(email) {
            Some(user) => user.verify_password(password),
            None => false,
        }
    }

    /// Current roles of a user; empty when the email is absent.
    ///
    /// Authorization always reads this, never token claims, so a role
    /// change is effective on the very next request.
    pub fn roles_of(&self, email: &str) -> HashSet<Role> {
        self.users
            .read()
            .unwrap()
            .get(email)
            .map(|user| user.roles.clone())
            .unwrap_or_default()
    }

    /// Replace the role set of an existing user. Returns false when the
    /// email is absent.
    pub fn set_roles(&self, email: &str, roles: HashSet<Role>) -> bool {
        let mut users = self.users.write().unwrap();
        match users.get_mut(email) {
            Some(user) => {
                info!("Updating roles for {}: {:?}", email, roles);
                user.roles = roles;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.users.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_one_user() -> CredentialStore {
        let store = CredentialStore::new();
        store
            .add_user("John", "Doe", "j.d@here.com", "mypass", Role::set([Role::Admin]))
            .unwrap();
        store
    }

    #[test]
    fn added_user_verifies_with_its_password() {
        let store = store_with_one_user();
        assert!(store.verify_password("j.d@here.com", "mypass"));
        assert!(!store.verify_password("j.d@here.com", "notmypass"));
    }

    #[test]
    fn absent_email_is_false_not_an_error() {
        let store = store_with_one_user();
        assert!(!store.verify_password("nobody@here.com", "mypass"));
        assert!(store.roles_of("nobody@here.com").is_empty());
        assert!(store.get_user("nobody@here.com").is_none());
    }

    #[test]
    fn empty_role_set_is_rejected() {
        let store = CredentialStore::new();
        let result = store.add_user("John", "Doe", "j.d@here.com", "mypass", HashSet::new());
        assert_eq!(result, Err(AuthError::EmptyRoleSet));
        assert!(store.is_empty());
    }

    #[test]
    fn removal_takes_effect_immediately() {
        let store = store_with_one_user();
        store.remove_user("j.d@here.com");
        assert!(!store.verify_password("j.d@here.com", "mypass"));
        assert!(store.is_empty());
    }

    #[test]
    fn role_change_is_visible_on_next_lookup() {
        let store = store_with_one_user();
        assert!(store.roles_of("j.d@here.com").contains(&Role::Admin));
        assert!(store.set_roles("j.d@here.com", Role::set([Role::Guest])));
        let roles = store.roles_of("j.d@here.com");
        assert!(!roles.contains(&Role::Admin));
        assert!(roles.contains(&Role::Guest));
        assert!(!store.set_roles("nobody@here.com", Role::set([Role::Guest])));
    }

    #[test]
    fn seed_users_are_present() {
        let store = CredentialStore::with_seed_users().unwrap();
        assert_eq!(store.len(), 3);
        assert!(store.verify_password("john.doe@nowhere.com", "admin"));
        assert!(store.roles_of("john.doe@nowhere.com").contains(&Role::Admin));
        assert_eq!(
            store.get_user("john.doe@nowhere.com").unwrap().display_name(),
            "Doe, John <john.doe@nowhere.com>"
        );
    }

    #[test]
    fn duplicate_email_replaces_the_record() {
        let store = store_with_one_user();
        store
            .add_user("Jane", "Doe", "j.d@here.com", "newpass", Role::set([Role::User]))
            .unwrap();
        assert_eq!(store.len(), 1);
        assert!(!store.verify_password("j.d@here.com", "mypass"));
        assert!(store.verify_password("j.d@here.com", "newpass"));
    }
}
