//! JSON bodies written and read through serialization contracts.

use super::error::ApiError;
use super::scope::current_resolver;
use axum::body::Bytes;
use axum::extract::{FromRef, FromRequest, Request};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use polycase_contract::{ContractError, ContractResolver, ContractValue};
use serde_json::Value;
use std::sync::Arc;

const APPLICATION_JSON: &str = "application/json";

/// JSON response keyed in the convention the request asked for.
///
/// Must be produced inside the request scope (see
/// [`request_scope`](super::scope::request_scope)).
#[derive(Debug, Clone, Copy, Default)]
#[must_use]
pub struct ContractJson<T>(pub T);

impl<T: ContractValue> IntoResponse for ContractJson<T> {
    fn into_response(self) -> Response {
        let encoded = current_resolver().and_then(|resolver| resolver.to_vec(&self.0));
        match encoded {
            Ok(bytes) => (
                [(header::CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))],
                bytes,
            )
                .into_response(),
            Err(err) => ApiError::from(err).into_response(),
        }
    }
}

/// Request body read under the request's convention.
///
/// Member names are matched exactly first, then ignoring ASCII case.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractBody<T>(pub T);

impl<T, S> FromRequest<S> for ContractBody<T>
where
    T: ContractValue,
    S: Send + Sync,
    Arc<ContractResolver>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json(&req) {
            return Err(ApiError::bad_request("expected an `application/json` body"));
        }

        let resolver = Arc::<ContractResolver>::from_ref(state);
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

        let value: Value = serde_json::from_slice(&bytes).map_err(ContractError::from)?;
        Ok(Self(resolver.from_value(&value)?))
    }
}

fn is_json(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case(APPLICATION_JSON)
                || mime.rsplit_once('+').is_some_and(|(_, suffix)| suffix.eq_ignore_ascii_case("json"))
        })
}
