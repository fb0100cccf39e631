//! HTTP error response handling for the API
//!
//! Converts pipeline errors to HTTP responses with appropriate status codes
//! and JSON error bodies.

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let api_error: ApiError = self.into();

        (status_code, Json(api_error)).into_response()
    }
}

/// Bare `ApiError`s are request validation failures
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> ApiError {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn exhausted_retries_become_service_unavailable() {
        let error = Error::RetriesExhausted {
            attempts: 3,
            source: Box::new(Error::HttpStatus {
                status: 500,
                url: "http://upstream/beststories.json".to_string(),
            }),
        };

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let api_error = body_of(response).await;
        assert_eq!(api_error.error.code, "retries_exhausted");
        assert_eq!(api_error.error.details.unwrap()["attempts"], 3);
    }

    #[tokio::test]
    async fn malformed_upstream_becomes_bad_gateway() {
        let error = Error::Decode {
            url: "http://upstream/item/1.json".to_string(),
            source: serde_json::from_str::<u64>("x").unwrap_err(),
        };

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_of(response).await.error.code, "malformed_response");
    }

    #[tokio::test]
    async fn validation_error_is_bad_request() {
        let response = ApiError::validation("count too large").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_of(response).await.error.code, "validation_error");
    }
}
