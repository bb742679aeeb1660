//! Request-outcome errors and their HTTP mapping
//!
//! Every failure a handler or the security middleware can produce maps to
//! one `{error, message}` JSON body with the appropriate status code. Token
//! verification failures collapse into one generic unauthorized answer so
//! the response never helps credential guessing; the distinguishing detail
//! only goes to the logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use biblio_auth::AuthError;
use serde_json::json;
use tracing::{debug, error};

/// Errors surfaced to API clients
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("resource not found")]
    NotFound,

    #[error("page out of range")]
    PageOutOfRange,

    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ApiError {
    fn status_code_message(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::NotFound | ApiError::PageOutOfRange => {
                (StatusCode::NOT_FOUND, "not_found", "Not found".to_string())
            }
            ApiError::InvalidInput(message) => (
                StatusCode::NOT_ACCEPTABLE,
                "invalid_input",
                message.clone(),
            ),
            ApiError::Auth(auth) => Self::auth_status(auth),
        }
    }

    fn auth_status(auth: &AuthError) -> (StatusCode, &'static str, String) {
        if auth.is_token_failure() {
            // Which of the four checks failed stays in the logs.
            debug!("Token rejected: {}", auth);
            return (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid token".to_string(),
            );
        }
        match auth {
            AuthError::CredentialsMissing => (
                StatusCode::UNAUTHORIZED,
                "credentials_missing",
                "Please provide your credentials".to_string(),
            ),
            AuthError::CredentialsMalformed => (
                StatusCode::UNAUTHORIZED,
                "credentials_invalid",
                "Please provide correct credentials".to_string(),
            ),
            AuthError::CredentialsInvalid | AuthError::UnknownSubject(_) => (
                StatusCode::UNAUTHORIZED,
                "credentials_invalid",
                "Wrong username or password".to_string(),
            ),
            AuthError::RoleNotAllowed => (
                StatusCode::FORBIDDEN,
                "roles_not_allowed",
                "Roles not allowed".to_string(),
            ),
            AuthError::OperationForbidden => (
                StatusCode::FORBIDDEN,
                "access_denied",
                "Access denied to all users".to_string(),
            ),
            AuthError::CryptoUnavailable(_) | AuthError::EmptyRoleSet => {
                error!("Internal security error: {}", auth);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
            // Token failures are handled above.
            _ => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid token".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = self.status_code_message();
        let body = Json(json!({
            "error": error_code,
            "message": message,
        }));
        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_failures_collapse_to_one_answer() {
        for auth in [
            AuthError::TokenMalformed,
            AuthError::TokenExpired,
            AuthError::TokenSignatureInvalid,
            AuthError::TokenIssuerMismatch,
        ] {
            let (status, code, message) = ApiError::Auth(auth).status_code_message();
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(code, "invalid_token");
            assert_eq!(message, "Invalid token");
        }
    }

    #[test]
    fn role_mismatch_is_forbidden() {
        let (status, _, _) = ApiError::Auth(AuthError::RoleNotAllowed).status_code_message();
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn page_out_of_range_reads_as_not_found() {
        let (status, code, _) = ApiError::PageOutOfRange.status_code_message();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "not_found");
    }
}
