use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::middleware::from_fn_with_state;
use axum::routing::post;
use chrono::NaiveDateTime;
use polycase_kernel::prelude::*;
use polycase_kernel::server::router::system_router;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

#[derive(Debug, Contract)]
struct Signup {
    first_name: String,
    #[contract(rename = "DateOfBirth", date_only)]
    dob: Option<NaiveDateTime>,
}

async fn echo(ContractBody(signup): ContractBody<Signup>) -> ContractJson<Signup> {
    ContractJson(signup)
}

fn state() -> ApiState {
    ApiState::builder().config(ApiConfig::default()).build().unwrap()
}

fn app(state: ApiState) -> Router {
    Router::new()
        .merge(system_router())
        .route("/echo", post(echo))
        .layer(from_fn_with_state(Arc::clone(&state.contracts), request_scope))
        .with_state(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_defaults_to_camel_case() {
    let response = app(state())
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    let json = body_json(response).await;
    assert_eq!(json["status"], "up");
    assert!(json.get("uptimeSeconds").is_some(), "{json}");
}

#[tokio::test]
async fn test_health_follows_the_header() {
    let response = app(state())
        .oneshot(
            Request::get("/health")
                .header(NAMING_HEADER, "snake_case")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json = body_json(response).await;
    assert!(json.get("uptime_seconds").is_some(), "{json}");
    assert!(json.get("uptimeSeconds").is_none(), "{json}");
}

#[tokio::test]
async fn test_body_is_read_and_written_under_the_request_convention() {
    let request = Request::post("/echo")
        .header(NAMING_HEADER, "kebab-case")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"first-name":"Ada","date-of-birth":"1815-12-10T10:00:00Z"}"#))
        .unwrap();

    let response = app(state()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "first-name": "Ada", "date-of-birth": "1815-12-10" }));
}

#[tokio::test]
async fn test_unknown_header_value_falls_back_to_camel_case() {
    let request = Request::post("/echo")
        .header(NAMING_HEADER, "SCREAMING_CASE")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"firstName":"Ada"}"#))
        .unwrap();

    let response = app(state()).oneshot(request).await.unwrap();
    assert_eq!(body_json(response).await, json!({ "firstName": "Ada" }));
}

#[tokio::test]
async fn test_malformed_bodies_are_client_errors() {
    let cases = [
        ("application/json", "{not json"),
        ("application/json", r#"{"firstName": 5}"#),
        ("text/plain", r#"{"firstName":"Ada"}"#),
    ];

    for (content_type, body) in cases {
        let request = Request::post("/echo")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();

        let response = app(state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{content_type} {body}");
        assert_eq!(body_json(response).await["status"], 400);
    }
}

#[tokio::test]
async fn test_missing_scope_is_a_server_error() {
    let state = state();
    let app = Router::new().merge(system_router()).with_state(state);

    let response = app.oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_contracts_are_cached_across_requests() {
    let state = state();
    let app = app(state.clone());

    for convention in ["snake_case", "snake_case", "PascalCase"] {
        let request = Request::get("/health")
            .header(NAMING_HEADER, convention)
            .body(Body::empty())
            .unwrap();
        app.clone().oneshot(request).await.unwrap();
    }

    assert_eq!(state.contracts.builds(), 2);
}
