//! Request body extractor for operation parameters

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use maps_core::RequestParams;
use serde_json::Value;

use crate::error::ApiError;

/// Operation parameters taken from a JSON object or form-encoded body.
///
/// An empty body yields empty parameters, so the caller gets field-level
/// validation detail instead of a body error.
#[derive(Debug, Clone, Default)]
pub struct Params(pub RequestParams);

enum BodyFormat {
    Json,
    Form,
}

fn body_format(content_type: Option<&str>) -> Result<BodyFormat, ApiError> {
    let Some(content_type) = content_type else {
        return Ok(BodyFormat::Json);
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if mime == "application/x-www-form-urlencoded" {
        Ok(BodyFormat::Form)
    } else if mime == "application/json" || mime.ends_with("+json") || mime.is_empty() {
        Ok(BodyFormat::Json)
    } else {
        Err(ApiError::UnsupportedMediaType(format!(
            "Unsupported content type: {}. Use application/json or application/x-www-form-urlencoded",
            content_type
        )))
    }
}

impl<S> FromRequest<S> for Params
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Params(RequestParams::new()));
        }

        match body_format(content_type.as_deref())? {
            BodyFormat::Form => Ok(Params(
                url::form_urlencoded::parse(&body)
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect(),
            )),
            BodyFormat::Json => {
                let value: Value = serde_json::from_slice(&body)
                    .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))?;
                match value {
                    Value::Object(map) => Ok(Params(map.into())),
                    _ => Err(ApiError::BadRequest(
                        "Request body must be a JSON object".to_string(),
                    )),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde_json::json;

    async fn extract(content_type: Option<&str>, body: &'static str) -> Result<Params, ApiError> {
        let mut builder = Request::builder().method("POST").uri("/geocode");
        if let Some(ct) = content_type {
            builder = builder.header(CONTENT_TYPE, ct);
        }
        let req = builder.body(Body::from(body)).unwrap();
        Params::from_request(req, &()).await
    }

    #[tokio::test]
    async fn test_json_body() {
        let Params(params) = extract(Some("application/json"), r#"{"lat": 12.5, "lng": "-45.25"}"#)
            .await
            .unwrap();
        assert_eq!(params.get("lat"), Some(&json!(12.5)));
        assert_eq!(params.get("lng"), Some(&json!("-45.25")));
    }

    #[tokio::test]
    async fn test_form_body() {
        let Params(params) = extract(
            Some("application/x-www-form-urlencoded; charset=UTF-8"),
            "location=1%2C2&radius=500&type=",
        )
        .await
        .unwrap();
        assert_eq!(params.get("location"), Some(&json!("1,2")));
        assert_eq!(params.get("radius"), Some(&json!("500")));
        assert_eq!(params.get("type"), Some(&json!("")));
    }

    #[tokio::test]
    async fn test_empty_body_is_empty_params() {
        let Params(params) = extract(None, "").await.unwrap();
        assert!(params.is_empty());

        let Params(params) = extract(Some("application/json"), "  \n").await.unwrap();
        assert!(params.is_empty());
    }

    #[tokio::test]
    async fn test_json_without_content_type() {
        let Params(params) = extract(None, r#"{"address": "Main St"}"#).await.unwrap();
        assert_eq!(params.get("address"), Some(&json!("Main St")));
    }

    #[tokio::test]
    async fn test_rejects_non_object_json() {
        let err = extract(Some("application/json"), "[1, 2]").await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err = extract(Some("application/json"), "{not json").await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_rejects_unknown_content_type() {
        let err = extract(Some("text/plain"), "address=x").await.unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedMediaType(_)));
    }
}
