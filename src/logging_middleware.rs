// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode

use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum::body::to_bytes;
use tracing::debug;

/// Blank out credential fields before a body reaches the log.
fn redact_sensitive(value: &mut serde_json::Value) {
    if let Some(map) = value.as_object_mut() {
        for key in ["password", "token"] {
            if let Some(field) = map.get_mut(key) {
                *field = serde_json::Value::String("[REDACTED]".to_string());
            }
        }
    }
}

fn loggable_body(body_str: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body_str) {
        Ok(mut json) => {
            redact_sensitive(&mut json);
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| body_str.to_string())
        }
        Err(_) => body_str.to_string(),
    }
}

/// Middleware to log request and response bodies in debug mode
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    let (parts, body) = request.into_parts();

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() {
        if let Ok(body_str) = std::str::from_utf8(&bytes) {
            debug!(
                method = %parts.method,
                uri = %parts.uri,
                request_body = %loggable_body(body_str),
                "📥 Request"
            );
        }
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() {
        if let Ok(body_str) = std::str::from_utf8(&bytes) {
            debug!(
                status = %parts.status,
                response_body = %loggable_body(body_str),
                "📤 Response"
            );
        }
    }

    let response = Response::from_parts(parts, Body::from(bytes));
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_is_redacted() {
        let logged = loggable_body(r#"{"email":"a@b.com","password":"hunter2"}"#);
        assert!(logged.contains("[REDACTED]"));
        assert!(!logged.contains("hunter2"));
    }

    #[test]
    fn test_token_is_redacted() {
        let logged = loggable_body(r#"{"success":true,"token":"eyJhbGciOiJIUzI1NiJ9"}"#);
        assert!(logged.contains("[REDACTED]"));
        assert!(!logged.contains("eyJhbGciOiJIUzI1NiJ9"));
    }

    #[test]
    fn test_non_json_body_passes_through() {
        assert_eq!(loggable_body("plain text"), "plain text");
    }
}
