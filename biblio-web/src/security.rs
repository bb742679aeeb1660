//! Per-operation authentication middleware
//!
//! Each protected route is registered with an [`OperationSpec`]: which of
//! the two interchangeable schemes guards it and what its access policy
//! is. The middleware inspects the descriptor before dispatch, without
//! any runtime discovery, and exactly one scheme owns the whole decision
//! for an operation; schemes are never chained. On success a
//! [`SecurityContext`] is placed in the request extensions for handlers.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::MethodRouter;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use biblio_auth::{AccessPolicy, AuthError, SecurityContext};
use tracing::{debug, info};

/// The two authentication schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeKind {
    /// `Authorization: Basic <base64(email:password)>`
    Basic,
    /// `Authorization: Bearer <compact-signed-token>`
    Bearer,
}

impl SchemeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SchemeKind::Basic => "Basic",
            SchemeKind::Bearer => "Bearer",
        }
    }
}

/// Registration-time security descriptor of one operation
#[derive(Debug, Clone)]
pub struct OperationSpec {
    pub scheme: SchemeKind,
    pub access: AccessPolicy,
}

impl OperationSpec {
    pub fn basic(access: AccessPolicy) -> Self {
        Self {
            scheme: SchemeKind::Basic,
            access,
        }
    }

    pub fn bearer(access: AccessPolicy) -> Self {
        Self {
            scheme: SchemeKind::Bearer,
            access,
        }
    }
}

/// Guard a group of method routes with an operation descriptor.
pub fn protect(state: &AppState, spec: OperationSpec, routes: MethodRouter<AppState>) -> MethodRouter<AppState> {
    routes.route_layer(middleware::from_fn_with_state((state.clone(), spec), enforce))
}

async fn enforce(
    State((state, spec)): State<(AppState, OperationSpec)>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, &spec, request.headers()) {
        Ok(Some(context)) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        // Open operation: proceed without an identity.
        Ok(None) => next.run(request).await,
        Err(error) => ApiError::Auth(error).into_response(),
    }
}

/// Run the declared scheme and the access decision for one request.
fn authenticate(
    state: &AppState,
    spec: &OperationSpec,
    headers: &HeaderMap,
) -> Result<Option<SecurityContext>, AuthError> {
    match &spec.access {
        AccessPolicy::Open => return Ok(None),
        AccessPolicy::Closed => return Err(AuthError::OperationForbidden),
        AccessPolicy::AnyOf(_) => {}
    }

    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if authorization.is_empty() {
        return Err(AuthError::CredentialsMissing);
    }

    let email = match spec.scheme {
        SchemeKind::Basic => {
            let (email, password) = decode_basic(authorization)?;
            info!("{} tries to log in", email);
            if !state.store.verify_password(&email, &password) {
                debug!("Password verification failed for {}", email);
                return Err(AuthError::CredentialsInvalid);
            }
            email
        }
        SchemeKind::Bearer => {
            let token = extract_bearer(authorization)?;
            // Signature and issuer are checked before any claim is used;
            // the subject is all we take from the token.
            state.tokens.verify(token)?.sub
        }
    };

    // Roles come from the store at decision time, never from token claims,
    // so a revocation is effective on the very next request.
    spec.access.authorize(&state.store.roles_of(&email))?;

    Ok(Some(SecurityContext::new(spec.scheme.as_str(), email)))
}

fn decode_basic(authorization: &str) -> Result<(String, String), AuthError> {
    let encoded = authorization
        .strip_prefix("Basic ")
        .ok_or(AuthError::CredentialsMalformed)?
        .trim();
    let decoded = BASE64
        .decode(encoded)
        .map_err(|_| AuthError::CredentialsMalformed)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::CredentialsMalformed)?;
    let (email, password) = decoded
        .split_once(':')
        .ok_or(AuthError::CredentialsMalformed)?;
    Ok((email.to_string(), password.to_string()))
}

fn extract_bearer(authorization: &str) -> Result<&str, AuthError> {
    let token = authorization
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::CredentialsMalformed)?;
    if token.is_empty() {
        return Err(AuthError::CredentialsMalformed);
    }
    Ok(token)
}
