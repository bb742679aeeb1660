//! HTTP handlers
//!
//! The catalog CRUD is deliberately thin; everything interesting happens in
//! the security middleware before dispatch and in the response enrichment
//! afterwards.

use crate::error::{ApiError, ApiResult};
use crate::model::{Author, AuthorQuery};
use crate::pagination::Page;
use crate::state::AppState;
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use biblio_auth::{SecurityContext, TOKEN_TTL_SECS};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

/// Issued-token response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public view of a stored user
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<String>,
}

/// Smoke-test endpoint.
pub async fn hello() -> &'static str {
    "hello"
}

/// Reset the catalog to the two demo authors.
pub async fn seed_demo(State(state): State<AppState>) -> ApiResult<Json<usize>> {
    Ok(Json(state.library.seed_demo()?))
}

/// Reset the catalog to `size` randomly named authors.
pub async fn seed_random(
    State(state): State<AppState>,
    Path(size): Path<usize>,
) -> ApiResult<Json<usize>> {
    Ok(Json(state.library.seed_random(size)?))
}

pub async fn list_authors(State(state): State<AppState>) -> Json<Vec<Author>> {
    Json(state.library.all())
}

pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Author>> {
    Ok(Json(state.library.get(id)?))
}

/// Create an author. Answers 201 through the declared status override.
pub async fn create_author(
    State(state): State<AppState>,
    Json(author): Json<Author>,
) -> ApiResult<Json<Author>> {
    Ok(Json(state.library.add(author)?))
}

pub async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(author): Json<Author>,
) -> ApiResult<Json<Author>> {
    Ok(Json(state.library.update(id, author)?))
}

pub async fn delete_author(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<StatusCode> {
    state.library.remove(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_authors(State(state): State<AppState>) -> StatusCode {
    state.library.clear();
    StatusCode::NO_CONTENT
}

/// Filtered and sorted listing, without pagination.
pub async fn filter_authors(
    State(state): State<AppState>,
    Query(query): Query<AuthorQuery>,
) -> ApiResult<Json<Vec<Author>>> {
    Ok(Json(state.library.filtered(&query)?))
}

/// One page of the listing; enriched on the way out.
pub async fn page_authors(
    State(state): State<AppState>,
    Query(query): Query<AuthorQuery>,
) -> ApiResult<Page<Author>> {
    state.library.page(&query)
}

/// Exchange a successful Basic authentication for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Extension(context): Extension<SecurityContext>,
) -> ApiResult<Json<TokenResponse>> {
    let token = state.tokens.issue(&state.store, context.email())?;
    let user = state
        .store
        .get_user(context.email())
        .ok_or(ApiError::NotFound)?;

    info!("Issued bearer token for {}", user.email);

    let mut roles: Vec<String> = user.roles.iter().map(|role| role.to_string()).collect();
    roles.sort();

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "Bearer",
        expires_in: TOKEN_TTL_SECS,
        user: UserInfo {
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            roles,
        },
    }))
}

/// Echo of the request context, with the security context when present.
pub async fn whoami(request: Request) -> Json<Value> {
    let security = request.extensions().get::<SecurityContext>().map(|context| {
        json!({
            "scheme": context.authentication_scheme(),
            "user": context.email(),
            "secure": context.is_secure(),
        })
    });
    Json(json!({
        "method": request.method().as_str(),
        "uri": request.uri().to_string(),
        "security": security,
    }))
}

pub async fn admins_only(
    State(state): State<AppState>,
    Extension(context): Extension<SecurityContext>,
) -> String {
    format!("secret for admins! {}", principal_name(&state, &context))
}

pub async fn users_only(
    State(state): State<AppState>,
    Extension(context): Extension<SecurityContext>,
) -> String {
    format!("secret for users! {}", principal_name(&state, &context))
}

pub async fn secured(
    State(state): State<AppState>,
    Extension(context): Extension<SecurityContext>,
) -> String {
    info!("USER ACCESS: {}", context.email());
    format!("Access with bearer token ok for {}", principal_name(&state, &context))
}

pub async fn secured_admin(
    State(state): State<AppState>,
    Extension(context): Extension<SecurityContext>,
) -> String {
    info!("ADMIN ACCESS: {}", context.email());
    format!("Access with bearer token ok for {}", principal_name(&state, &context))
}

/// Behind a closed-to-all policy; the middleware rejects before dispatch.
pub async fn locked() -> &'static str {
    "unreachable"
}

fn principal_name(state: &AppState, context: &SecurityContext) -> String {
    state
        .store
        .get_user(context.email())
        .map(|user| user.display_name())
        .unwrap_or_else(|| context.email().to_string())
}
