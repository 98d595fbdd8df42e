use super::json::ContractJson;
use axum::http::header;
use axum::response::IntoResponse;
use polycase_contract::Contract;
use std::sync::LazyLock;
use std::time::Instant;

/// Health check response
#[derive(Debug, Contract)]
#[contract(skip_default = false)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_seconds: u64,
}

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Marks the process start for the uptime counter.
pub fn mark_started() {
    LazyLock::force(&START_TIME);
}

pub(super) async fn health_handler() -> impl IntoResponse {
    let body = HealthResponse {
        status: "up".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        uptime_seconds: START_TIME.elapsed().as_secs(),
    };

    (
        [
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
            (header::PRAGMA, "no-cache"),
        ],
        ContractJson(body),
    )
}
