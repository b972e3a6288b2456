// web-server/src/error.rs
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::{json, Value};
use thiserror::Error;

/// Every way a proxied request can fail
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Missing service credentials or other deployment settings
    #[error("{0}")]
    Configuration(String),

    /// Login failed or the backend kept rejecting the token
    #[error("Authentication failed: {status} - {body}")]
    Auth { status: u16, body: String },

    #[error("{0}")]
    BadRequest(String),

    /// Caller is not an admin
    #[error("Admin access required")]
    Forbidden { wallet: String },

    /// Backend answered with a non-2xx status
    #[error("Backend returned {status}: {message}")]
    Upstream {
        status: u16,
        message: String,
        details: Value,
    },

    #[error("{0}")]
    Internal(String),
}

impl ProxyError {
    /// Build an upstream error from a failed backend reply
    pub fn upstream(status: u16, body: &str) -> Self {
        let details = serde_json::from_str::<Value>(body)
            .unwrap_or_else(|_| Value::String(body.to_string()));

        let message = details
            .get("message")
            .or_else(|| details.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| "Backend request failed".to_string());

        Self::Upstream {
            status,
            message,
            details,
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ProxyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl ResponseError for ProxyError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Configuration(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth { .. } => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::Configuration(message) | Self::BadRequest(message) => json!({
                "error": message
            }),
            Self::Auth { .. } => json!({
                "error": "Authentication failed"
            }),
            Self::Forbidden { wallet } => json!({
                "error": "Admin access required",
                "wallet": wallet
            }),
            Self::Upstream { message, details, .. } => json!({
                "error": message,
                "details": details
            }),
            Self::Internal(details) => json!({
                "error": "Internal Server Error",
                "details": details
            }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(err: ProxyError) -> (StatusCode, Value) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn test_upstream_keeps_backend_status_and_message() {
        let err = ProxyError::upstream(404, r#"{"message":"Proposal not found"}"#);
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Proposal not found");
        assert_eq!(body["details"]["message"], "Proposal not found");
    }

    #[actix_web::test]
    async fn test_upstream_plain_text_body() {
        let (status, body) = body_of(ProxyError::upstream(409, "NFT already claimed")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Backend request failed");
        assert_eq!(body["details"], "NFT already claimed");
    }

    #[actix_web::test]
    async fn test_auth_hides_backend_body() {
        let err = ProxyError::Auth {
            status: 500,
            body: "bad creds".to_string(),
        };
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "Authentication failed"}));
    }

    #[actix_web::test]
    async fn test_internal_envelope() {
        let (status, body) = body_of(ProxyError::Internal("connection refused".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal Server Error");
        assert_eq!(body["details"], "connection refused");
    }
}
