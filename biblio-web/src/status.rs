//! Declared success status codes
//!
//! An operation can declare the 2xx code it answers with on success (201
//! for creations, for instance). The override only fires when the computed
//! status is exactly 200; any other status, error or not, is left alone.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::MethodRouter;

/// Attach a declared success status to a group of method routes.
pub fn declared_status<S>(status: StatusCode, routes: MethodRouter<S>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    routes.route_layer(middleware::from_fn_with_state(status, override_success_status))
}

async fn override_success_status(
    State(status): State<StatusCode>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    if response.status() == StatusCode::OK {
        *response.status_mut() = status;
    }
    response
}
