use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use axum::middleware::from_fn_with_state;
use polycase_kernel::prelude::*;
use polycase_persons::{PersonStore, ROUTE_PREFIX};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> (Router, ApiState) {
    let state = ApiState::builder()
        .config(ApiConfig::default())
        .register_slice(polycase_persons::init().unwrap())
        .build()
        .unwrap();

    let router = Router::new()
        .nest(ROUTE_PREFIX, polycase_persons::router())
        .layer(from_fn_with_state(Arc::clone(&state.contracts), request_scope))
        .with_state(state.clone());
    (router, state)
}

fn request(method: Method, uri: &str, convention: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(convention) = convention {
        builder = builder.header(NAMING_HEADER, convention);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<Value>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = (!bytes.is_empty()).then(|| serde_json::from_slice(&bytes).unwrap());
    (status, json)
}

#[tokio::test]
async fn test_get_person_in_every_casing() {
    let (app, _) = app();
    let cases = [
        (None, json!({ "id": 1, "firstName": "Ada", "lastName": "Lovelace", "dateOfBirth": "1815-12-10" })),
        (
            Some("snake_case"),
            json!({ "id": 1, "first_name": "Ada", "last_name": "Lovelace", "date_of_birth": "1815-12-10" }),
        ),
        (
            Some("kebab-case"),
            json!({ "id": 1, "first-name": "Ada", "last-name": "Lovelace", "date-of-birth": "1815-12-10" }),
        ),
        (
            Some("PascalCase"),
            json!({ "Id": 1, "FirstName": "Ada", "LastName": "Lovelace", "DateOfBirth": "1815-12-10" }),
        ),
        (
            Some("unknown"),
            json!({ "id": 1, "firstName": "Ada", "lastName": "Lovelace", "dateOfBirth": "1815-12-10" }),
        ),
    ];

    for (convention, expected) in cases {
        let (status, json) =
            send(&app, request(Method::GET, "/api/v1/persons/1", convention, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, Some(expected), "{convention:?}");
    }
}

#[tokio::test]
async fn test_list_persons() {
    let (app, _) = app();

    let (status, json) =
        send(&app, request(Method::GET, "/api/v1/persons", Some("snake_case"), None)).await;
    assert_eq!(status, StatusCode::OK);

    let people = json.and_then(|v| v.as_array().cloned()).unwrap();
    assert_eq!(people.len(), 3);
    assert!(people.iter().all(|p| p.get("first_name").is_some() && p.get("firstName").is_none()));
}

#[tokio::test]
async fn test_unknown_person_is_not_found() {
    let (app, _) = app();

    let (status, json) = send(&app, request(Method::GET, "/api/v1/persons/99", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json.map(|v| v["status"].clone()), Some(json!(404)));
}

#[tokio::test]
async fn test_create_reads_the_body_in_the_request_casing() {
    let (app, state) = app();
    let body = json!({ "first-name": "Katherine", "last-name": "Johnson", "date-of-birth": "1918-08-26" });

    let (status, json) =
        send(&app, request(Method::POST, "/api/v1/persons", Some("kebab-case"), Some(body))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        json,
        Some(json!({ "id": 4, "first-name": "Katherine", "last-name": "Johnson", "date-of-birth": "1918-08-26" }))
    );

    let stored = state.get_slice::<PersonStore>().and_then(|s| s.get(4)).unwrap();
    assert_eq!(stored.first_name, "Katherine");
}

#[tokio::test]
async fn test_create_after_the_highest_id_takes_a_free_one() {
    let (app, _) = app();
    let highest = json!({ "id": i32::MAX, "firstName": "Max", "lastName": "Id" });
    let next = json!({ "id": 0, "firstName": "Next", "lastName": "Id" });

    let (status, json) = send(&app, request(Method::POST, "/api/v1/persons", None, Some(highest))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json.unwrap()["id"], i32::MAX);

    let (status, json) = send(&app, request(Method::POST, "/api/v1/persons", None, Some(next))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json.unwrap()["id"], 4);
}

#[tokio::test]
async fn test_update_and_delete() {
    let (app, state) = app();
    let body = json!({ "FirstName": "Augusta Ada", "LastName": "King" });

    let (status, _) =
        send(&app, request(Method::PUT, "/api/v1/persons/1", Some("PascalCase"), Some(body.clone())))
            .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let store = state.get_slice::<PersonStore>().unwrap();
    assert_eq!(store.get(1).map(|p| p.last_name), Some("King".to_owned()));

    let (status, _) =
        send(&app, request(Method::PUT, "/api/v1/persons/99", Some("PascalCase"), Some(body))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, request(Method::DELETE, "/api/v1/persons/2", None, None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, request(Method::DELETE, "/api/v1/persons/2", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let (app, _) = app();
    let body = json!({ "firstName": ["not", "a", "name"] });

    let (status, _) = send(&app, request(Method::POST, "/api/v1/persons", None, Some(body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
