//! API error types and conversions

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use maps_core::{GatewayError, ValidationError};
use serde::Serialize;

/// API error type that converts to HTTP responses
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request (unparseable body)
    BadRequest(String),
    /// 415 Unsupported Media Type
    UnsupportedMediaType(String),
    /// 422 Unprocessable Entity, with per-field detail
    Validation(ValidationError),
    /// 500 Internal Server Error - upstream unreachable, timed out or non-2xx
    UpstreamUnavailable { error: &'static str, message: String },
    /// 502 Bad Gateway - upstream answered with a non-JSON body
    BadGateway { error: &'static str, message: String },
}

/// Standard error response format
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

/// Validation error response format
#[derive(Serialize)]
struct ValidationErrorResponse {
    error: &'static str,
    message: String,
    errors: BTreeMap<String, Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Validation(err) = self {
            tracing::debug!(fields = ?err.fields().collect::<Vec<_>>(), "Validation failed");

            let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for field_error in err.errors() {
                errors
                    .entry(field_error.field.clone())
                    .or_default()
                    .push(field_error.message.clone());
            }

            let body = Json(ValidationErrorResponse {
                error: "validation_failed",
                message: err.summary(),
                errors,
            });

            return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
        }

        let (status, error, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "unsupported_media_type",
                msg,
            ),
            ApiError::Validation(_) => unreachable!(), // Handled above
            ApiError::UpstreamUnavailable { error, message } => {
                (StatusCode::INTERNAL_SERVER_ERROR, error, message)
            }
            ApiError::BadGateway { error, message } => (StatusCode::BAD_GATEWAY, error, message),
        };

        // Log errors at appropriate levels
        if status.is_server_error() {
            tracing::error!(%error, %message, "API error");
        } else if status.is_client_error() {
            tracing::debug!(%error, %message, "API client error");
        }

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Validation(e) => ApiError::Validation(e),
            GatewayError::UpstreamUnavailable { context, message } => ApiError::UpstreamUnavailable {
                error: context,
                message,
            },
            GatewayError::MalformedUpstreamResponse { context, message } => ApiError::BadGateway {
                error: context,
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use maps_core::FieldError;
    use serde_json::{json, Value};

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_response() {
        let err = ApiError::Validation(ValidationError::new(vec![
            FieldError::required("lat"),
            FieldError::invalid("lng", "a number"),
        ]));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(
            body,
            json!({
                "error": "validation_failed",
                "message": "The lat field is required. (and 1 more error)",
                "errors": {
                    "lat": ["The lat field is required."],
                    "lng": ["The lng field must be a number."],
                }
            })
        );
    }

    #[tokio::test]
    async fn test_upstream_unavailable_response() {
        let err: ApiError = GatewayError::UpstreamUnavailable {
            context: "Unable to search places",
            message: "Request timed out after 10000ms".to_string(),
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({
                "error": "Unable to search places",
                "message": "Request timed out after 10000ms",
            })
        );
    }

    #[tokio::test]
    async fn test_malformed_upstream_response() {
        let err: ApiError = GatewayError::MalformedUpstreamResponse {
            context: "Unable to geocode address",
            message: "Upstream response is not valid JSON: expected value at line 1 column 1"
                .to_string(),
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["error"], "Unable to geocode address");
    }
}
