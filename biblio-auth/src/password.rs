//! Salted password hashing
//!
//! PBKDF2-HMAC-SHA-256 with a 16-byte random salt per user and a 128-bit
//! derived key. The iteration count makes derivation deliberately slow, so
//! it must run at most once per authentication attempt.

use crate::error::{AuthError, AuthResult};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

/// Salt length in bytes, fixed at user creation.
pub const SALT_LEN: usize = 16;
/// Derived key length in bytes (128 bits).
pub const HASH_LEN: usize = 16;

const PBKDF2_ROUNDS: u32 = 65_536;

/// Generate a fresh random salt from the OS entropy source.
pub fn generate_salt() -> AuthResult<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| AuthError::CryptoUnavailable(e.to_string()))?;
    Ok(salt)
}

/// Derive the stored hash for a password under the given salt.
pub fn derive_hash(password: &str, salt: &[u8]) -> [u8; HASH_LEN] {
    let mut hash = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut hash);
    hash
}

/// Re-derive with the stored salt and compare in constant time.
pub fn verify(password: &str, salt: &[u8], expected: &[u8]) -> bool {
    constant_time_eq(&derive_hash(password, salt), expected)
}

/// Constant-time comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let difference = a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    difference == 0
}
