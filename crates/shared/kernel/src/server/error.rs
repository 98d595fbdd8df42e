use super::state::ApiStateError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use polycase_contract::ContractError;
use serde_json::json;
use std::borrow::Cow;
use tracing::{error, warn};

/// Errors returned by request handlers.
#[polycase_derive::polycase_error]
pub enum ApiError {
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Bad request{}: {message}", format_context(.context))]
    BadRequest { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Contract error{}: {source}", format_context(.context))]
    Contract { source: ContractError, context: Option<Cow<'static, str>> },

    #[error("State error{}: {source}", format_context(.context))]
    State { source: ApiStateError, context: Option<Cow<'static, str>> },

    #[error("Internal server error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ApiError {
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound { message: message.into(), context: None }
    }

    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest { message: message.into(), context: None }
    }

    /// Body shape and member errors are the client's fault; wiring,
    /// ambient-context and reference-loop failures are ours.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Contract { source, .. } if source.is_input_error() => StatusCode::BAD_REQUEST,
            Self::Contract { .. } | Self::State { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), "{self}");
        } else {
            warn!(status = status.as_u16(), "{self}");
        }

        // Server-side details stay in the logs.
        let message = if status.is_server_error() {
            Cow::Borrowed(status.canonical_reason().unwrap_or("Internal Server Error"))
        } else {
            Cow::Owned(self.to_string())
        };

        (status, Json(json!({ "status": status.as_u16(), "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_errors_map_by_cause() {
        let input = ApiError::from(ContractError::MissingMember {
            message: "`firstName` is required".into(),
            context: None,
        });
        assert_eq!(input.status(), StatusCode::BAD_REQUEST);

        let wiring = ApiError::from(ContractError::Configuration {
            message: "cache missing".into(),
            context: None,
        });
        assert_eq!(wiring.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let cycle = ApiError::from(ContractError::ReferenceLoop {
            message: "loop".into(),
            context: None,
        });
        assert_eq!(cycle.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let encoding = ApiError::from(ContractError::Encoding {
            message: "key must be a string".into(),
            context: Some("response body".into()),
        });
        assert_eq!(encoding.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let decoding = ApiError::from(ContractError::from(
            serde_json::from_slice::<serde_json::Value>(b"{").unwrap_err(),
        ));
        assert_eq!(decoding.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn client_errors_keep_their_message() {
        let response = ApiError::not_found("person 7").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        assert_eq!(ApiError::from("boom").status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
