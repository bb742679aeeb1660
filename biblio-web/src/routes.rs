//! Route definitions
//!
//! Security is declared here, at registration time: a route is either
//! registered bare (unauthenticated-accessible) or wrapped with an
//! [`OperationSpec`](crate::security::OperationSpec) naming its scheme and
//! access policy. The declared 201 on author creation goes through the same
//! registration-time mechanism.

use crate::security::{protect, OperationSpec};
use crate::status::declared_status;
use crate::{handlers, state::AppState};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::Router;
use biblio_auth::{AccessPolicy, Role};

/// Create all application routes
pub fn app_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Smoke test and catalog seeding
        .route("/", get(handlers::hello))
        .route("/setup/init", put(handlers::seed_demo))
        .route("/setup/init/{size}", put(handlers::seed_random))
        // Catalog CRUD
        .route(
            "/authors",
            get(handlers::list_authors).delete(handlers::delete_authors),
        )
        .route(
            "/authors",
            declared_status(StatusCode::CREATED, post(handlers::create_author)),
        )
        .route("/authors/filter", get(handlers::filter_authors))
        .route("/authors/page", get(handlers::page_authors))
        .route(
            "/authors/{id}",
            get(handlers::get_author)
                .put(handlers::update_author)
                .delete(handlers::delete_author),
        )
        // Request context echo
        .route("/whoami", get(handlers::whoami))
        // Password-guarded operations
        .route(
            "/login",
            protect(
                state,
                OperationSpec::basic(AccessPolicy::any_of([Role::User, Role::Admin])),
                get(handlers::login),
            ),
        )
        .route(
            "/admins-only",
            protect(
                state,
                OperationSpec::basic(AccessPolicy::any_of([Role::Admin])),
                get(handlers::admins_only),
            ),
        )
        .route(
            "/users-only",
            protect(
                state,
                OperationSpec::basic(AccessPolicy::any_of([Role::User])),
                get(handlers::users_only),
            ),
        )
        // Token-guarded operations
        .route(
            "/secured",
            protect(
                state,
                OperationSpec::bearer(AccessPolicy::any_of([Role::User, Role::Admin])),
                get(handlers::secured),
            ),
        )
        .route(
            "/secured/admin",
            protect(
                state,
                OperationSpec::bearer(AccessPolicy::any_of([Role::Admin])),
                get(handlers::secured_admin),
            ),
        )
        // Closed to everyone, whatever the credentials
        .route(
            "/locked",
            protect(
                state,
                OperationSpec::bearer(AccessPolicy::Closed),
                get(handlers::locked),
            ),
        )
}
