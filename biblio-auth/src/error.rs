//! Error taxonomy for authentication and authorization
//!
//! The four token failure variants are distinguished here for diagnostics;
//! the web layer collapses them into a single unauthorized outcome so the
//! response body never reveals which verification step rejected the token.

use thiserror::Error;

/// Authentication and authorization errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("credentials required")]
    CredentialsMissing,
    #[error("credentials malformed")]
    CredentialsMalformed,
    #[error("wrong username or password")]
    CredentialsInvalid,
    #[error("token malformed")]
    TokenMalformed,
    #[error("token expired")]
    TokenExpired,
    #[error("token signature invalid")]
    TokenSignatureInvalid,
    #[error("token issuer mismatch")]
    TokenIssuerMismatch,
    #[error("roles not allowed")]
    RoleNotAllowed,
    #[error("access denied to all users")]
    OperationForbidden,
    #[error("unknown subject: {0}")]
    UnknownSubject(String),
    #[error("empty role set")]
    EmptyRoleSet,
    #[error("cryptographic primitive unavailable: {0}")]
    CryptoUnavailable(String),
}

impl AuthError {
    /// True for any of the token verification failures.
    ///
    /// They are reported to clients as one generic unauthorized outcome.
    pub fn is_token_failure(&self) -> bool {
        matches!(
            self,
            AuthError::TokenMalformed
                | AuthError::TokenExpired
                | AuthError::TokenSignatureInvalid
                | AuthError::TokenIssuerMismatch
        )
    }
}

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;
