//! Per-request ambient context for async handlers.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use polycase_contract::{ContractError, ContractResolver, RequestContextAccessor, RequestHeaders};
use std::future::Future;
use std::sync::Arc;

/// What the current request exposes to code running on its task.
#[derive(Debug, Clone)]
struct RequestScope {
    headers: Arc<RequestHeaders>,
    resolver: Arc<ContractResolver>,
}

tokio::task_local! {
    static REQUEST_SCOPE: RequestScope;
}

/// Snapshots request headers. Values that are not visible ASCII are skipped.
#[must_use]
pub fn snapshot_headers(headers: &HeaderMap) -> RequestHeaders {
    let mut snapshot = RequestHeaders::new();
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            snapshot.insert(name.as_str(), value);
        }
    }
    snapshot
}

/// Middleware installing the request scope for the rest of the pipeline.
///
/// Mount it with `axum::middleware::from_fn_with_state(resolver, request_scope)`.
pub async fn request_scope(
    State(resolver): State<Arc<ContractResolver>>,
    request: Request,
    next: Next,
) -> Response {
    let headers = Arc::new(snapshot_headers(request.headers()));
    REQUEST_SCOPE.scope(RequestScope { headers, resolver }, next.run(request)).await
}

/// Runs `future` inside a request scope built by hand (background tasks, tests).
pub async fn with_request_scope<F: Future>(
    resolver: Arc<ContractResolver>,
    headers: RequestHeaders,
    future: F,
) -> F::Output {
    REQUEST_SCOPE.scope(RequestScope { headers: Arc::new(headers), resolver }, future).await
}

/// The resolver the current request was served with.
///
/// # Errors
/// [`ContractError::NoRequestContext`] outside of a request scope.
pub fn current_resolver() -> Result<Arc<ContractResolver>, ContractError> {
    REQUEST_SCOPE.try_with(|scope| Arc::clone(&scope.resolver)).map_err(|_| no_scope())
}

fn no_scope() -> ContractError {
    ContractError::NoRequestContext {
        message: "no request scope is active on this task".into(),
        context: Some("mount the `request_scope` middleware".into()),
    }
}

/// [`RequestContextAccessor`] over the task-local request scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskLocalAccessor;

impl RequestContextAccessor for TaskLocalAccessor {
    fn current_headers(&self) -> Result<Arc<RequestHeaders>, ContractError> {
        REQUEST_SCOPE.try_with(|scope| Arc::clone(&scope.headers)).map_err(|_| no_scope())
    }
}
