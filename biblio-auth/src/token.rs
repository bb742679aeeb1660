//! Bearer token issuance and verification
//!
//! Tokens are HS256-signed JWTs carrying `iss`, `sub`, `iat` and `exp`,
//! plus display-only name and role claims. The signing key is generated
//! once per process and held only in memory, so a restart invalidates every
//! outstanding token. The signature and issuer are checked before any claim
//! is trusted, and the role claims are never used for authorization: the
//! decision procedure re-reads the credential store by subject.

use crate::error::{AuthError, AuthResult};
use crate::role::Role;
use crate::store::CredentialStore;
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Issuer constant pinned on every token.
pub const ISSUER: &str = "biblio-api";

/// Token lifetime in seconds (15 minutes).
pub const TOKEN_TTL_SECS: i64 = 15 * 60;

const SIGNING_KEY_LEN: usize = 32;

/// JWT claims
///
/// `first_name`, `last_name` and `roles` are carried for client convenience
/// only and must never feed the access decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Role>,
}

/// Token signing and verification service
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Create a service with a fresh random signing key.
    pub fn new() -> AuthResult<Self> {
        let mut secret = [0u8; SIGNING_KEY_LEN];
        OsRng
            .try_fill_bytes(&mut secret)
            .map_err(|e| AuthError::CryptoUnavailable(e.to_string()))?;
        Ok(Self::with_secret(&secret))
    }

    /// Create a service over an explicit secret.
    pub fn with_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token for a subject present in the store.
    ///
    /// Issuance always follows a successful password authentication, so an
    /// unknown subject is a defensive failure rather than a normal outcome.
    pub fn issue(&self, store: &CredentialStore, email: &str) -> AuthResult<String> {
        self.issue_with_ttl(store, email, TOKEN_TTL_SECS)
    }

    fn issue_with_ttl(&self, store: &CredentialStore, email: &str, ttl_secs: i64) -> AuthResult<String> {
        let user = store
            .get_user(email)
            .ok_or_else(|| AuthError::UnknownSubject(email.to_string()))?;

        let mut roles: Vec<Role> = user.roles.iter().copied().collect();
        roles.sort();

        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: ISSUER.to_string(),
            sub: user.email.clone(),
            iat: now,
            exp: now + ttl_secs,
            first_name: Some(user.first_name.clone()),
            last_name: Some(user.last_name.clone()),
            roles,
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|e| {
            debug!("Failed to encode token: {}", e);
            AuthError::TokenMalformed
        })
    }

    /// Verify a compact token and return its claims.
    ///
    /// The four failure modes are distinguished for diagnostics; callers
    /// present them to clients as one generic unauthorized outcome.
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let error = match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    ErrorKind::InvalidSignature => AuthError::TokenSignatureInvalid,
                    ErrorKind::InvalidIssuer => AuthError::TokenIssuerMismatch,
                    ErrorKind::MissingRequiredClaim(claim) if claim == "iss" => {
                        AuthError::TokenIssuerMismatch
                    }
                    _ => AuthError::TokenMalformed,
                };
                debug!("Token verification failed: {} ({})", error, e);
                error
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (TokenService, CredentialStore) {
        (TokenService::new().unwrap(), CredentialStore::with_seed_users().unwrap())
    }

    #[test]
    fn issued_token_verifies_with_its_subject() {
        let (tokens, store) = seeded();
        let token = tokens.issue(&store, "john.doe@nowhere.com").unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "john.doe@nowhere.com");
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.first_name.as_deref(), Some("John"));
        assert_eq!(claims.last_name.as_deref(), Some("Doe"));
        assert_eq!(claims.roles, vec![Role::Admin]);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn unknown_subject_is_rejected_at_issuance() {
        let (tokens, store) = seeded();
        assert_eq!(
            tokens.issue(&store, "nobody@nowhere.com"),
            Err(AuthError::UnknownSubject("nobody@nowhere.com".to_string()))
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let (tokens, store) = seeded();
        let token = tokens
            .issue_with_ttl(&store, "john.doe@nowhere.com", -60)
            .unwrap();
        assert_eq!(tokens.verify(&token).unwrap_err(), AuthError::TokenExpired);
    }

    #[test]
    fn token_signed_with_another_key_is_rejected() {
        let (_, store) = seeded();
        let ours = TokenService::with_secret(b"process-key");
        let theirs = TokenService::with_secret(b"forged-key");
        let forged = theirs.issue(&store, "john.doe@nowhere.com").unwrap();
        assert_eq!(ours.verify(&forged).unwrap_err(), AuthError::TokenSignatureInvalid);
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let tokens = TokenService::with_secret(b"process-key");

        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: "some-other-domain".to_string(),
            sub: "john.doe@nowhere.com".to_string(),
            iat: now,
            exp: now + TOKEN_TTL_SECS,
            first_name: None,
            last_name: None,
            roles: vec![],
        };
        let foreign = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"process-key")).unwrap();

        assert_eq!(tokens.verify(&foreign).unwrap_err(), AuthError::TokenIssuerMismatch);
    }

    #[test]
    fn garbage_is_malformed() {
        let (tokens, _) = seeded();
        assert_eq!(tokens.verify("not-a-token").unwrap_err(), AuthError::TokenMalformed);
        assert_eq!(tokens.verify("").unwrap_err(), AuthError::TokenMalformed);
    }

    #[test]
    fn restart_invalidates_outstanding_tokens() {
        let store = CredentialStore::with_seed_users().unwrap();
        let before = TokenService::new().unwrap();
        let after = TokenService::new().unwrap();
        let token = before.issue(&store, "john.doe@nowhere.com").unwrap();
        assert!(before.verify(&token).is_ok());
        assert_eq!(after.verify(&token).unwrap_err(), AuthError::TokenSignatureInvalid);
    }
}
