use axum::Router;
use axum::middleware::from_fn_with_state;
use polycase_kernel::server::router::system_router;
use polycase_kernel::server::{ApiState, request_scope};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Composes the application router.
///
/// The request scope wraps every route so handlers and responders see the
/// caller's naming header; tracing runs outermost.
pub fn init(state: ApiState) -> Router {
    let resolver = Arc::clone(&state.contracts);

    Router::new()
        .merge(system_router())
        .nest(polycase_persons::ROUTE_PREFIX, polycase_persons::router())
        .layer(from_fn_with_state(resolver, request_scope))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
