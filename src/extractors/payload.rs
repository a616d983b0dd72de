//! Decode a JSON, urlencoded or multipart form body into a `serde_json::Value`.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};

/// Request body as JSON. Form fields become string values; multipart file parts are
/// skipped. An empty body, or one without a content type, decodes to an empty object.
#[derive(Clone, Debug)]
pub struct Payload(pub Value);

#[async_trait]
impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if content_type.as_deref().map_or(false, is_multipart) {
            let multipart = Multipart::from_request(req, state).await.map_err(|rejection| {
                AppError::BadRequest(format!("Multipart form parse error - {}", rejection.body_text())).into_response()
            })?;
            return read_multipart(multipart).await.map(Payload).map_err(|e| {
                if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    return e.into_response();
                }
                AppError::BadRequest(format!("Multipart form parse error - {}", e.body_text())).into_response()
            });
        }
        // Buffering errors (e.g. over the body limit) keep axum's own status.
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        decode(content_type.as_deref(), &bytes)
            .map(Payload)
            .map_err(IntoResponse::into_response)
    }
}

fn is_multipart(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|media_type| media_type.trim().eq_ignore_ascii_case("multipart/form-data"))
}

async fn read_multipart(mut multipart: Multipart) -> Result<Value, MultipartError> {
    let mut map = Map::new();
    while let Some(field) = multipart.next_field().await? {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let text = field.text().await?;
        map.insert(name, Value::String(text));
    }
    Ok(Value::Object(map))
}

pub(crate) fn decode(content_type: Option<&str>, bytes: &[u8]) -> Result<Value, AppError> {
    let Some(content_type) = content_type else {
        return Ok(Value::Object(Map::new()));
    };
    if bytes.is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    if media_type == "application/json" || media_type.ends_with("+json") {
        return serde_json::from_slice(bytes)
            .map_err(|e| AppError::BadRequest(format!("JSON parse error - {}", e)));
    }
    if media_type == "application/x-www-form-urlencoded" {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(bytes)
            .map_err(|e| AppError::BadRequest(format!("Form parse error - {}", e)))?;
        let mut map = Map::new();
        for (k, v) in pairs {
            map.insert(k, Value::String(v));
        }
        return Ok(Value::Object(map));
    }
    Err(AppError::UnsupportedMediaType(format!(
        "Unsupported media type \"{}\" in request.",
        content_type
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_body() {
        let v = decode(Some("application/json; charset=utf-8"), br#"{"name":"a"}"#).unwrap();
        assert_eq!(v, json!({"name": "a"}));
    }

    #[test]
    fn form_body_is_percent_decoded() {
        let v = decode(
            Some("application/x-www-form-urlencoded"),
            b"username=admin&password=a%20b&name=%ED%99%8D",
        )
        .unwrap();
        assert_eq!(v, json!({"username": "admin", "password": "a b", "name": "홍"}));
    }

    #[test]
    fn multipart_media_type_ignores_parameters() {
        assert!(is_multipart("multipart/form-data; boundary=xyz"));
        assert!(is_multipart("Multipart/Form-Data"));
        assert!(!is_multipart("application/x-www-form-urlencoded"));
    }

    #[test]
    fn empty_or_untyped_body_is_empty_object() {
        assert_eq!(decode(None, b"{\"a\":1}").unwrap(), json!({}));
        assert_eq!(decode(Some("application/json"), b"").unwrap(), json!({}));
    }

    #[test]
    fn malformed_json_and_unknown_types() {
        assert!(matches!(decode(Some("application/json"), b"{"), Err(AppError::BadRequest(msg)) if msg.starts_with("JSON parse error - ")));
        assert!(matches!(decode(Some("text/plain"), b"hi"), Err(AppError::UnsupportedMediaType(msg)) if msg == "Unsupported media type \"text/plain\" in request."));
    }
}
