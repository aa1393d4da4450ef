use http::StatusCode;
use serde_json::{json, Value as JsonValue};

/// Upstream failure detail preserved inside a [`ApiError::Upstream`] envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamDetail {
    pub code: String,
    pub message: String,
}

/// The gateway's error taxonomy.
///
/// Every variant carries a fixed external status code and machine-readable
/// type tag; the wire shape is the OpenAI error envelope
/// `{"error":{"message","type","code",...}}`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Authentication(String),
    #[error("{0}")]
    Authorization(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    RateLimit(String),
    /// Wraps any invocation-client failure; the upstream's own code and
    /// message survive as nested detail.
    #[error("{message}")]
    Upstream {
        message: String,
        detail: UpstreamDetail,
    },
    /// Catch-all. The inner detail is logged, never sent to the caller.
    #[error("an unexpected error occurred")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }

    pub fn upstream(message: impl Into<String>, code: impl Into<String>) -> Self {
        let message = message.into();
        Self::Upstream {
            detail: UpstreamDetail {
                code: code.into(),
                message: message.clone(),
            },
            message,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::Authorization(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimit(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Authentication(_) => "authentication_error",
            ApiError::Authorization(_) => "authorization_error",
            ApiError::BadRequest(_) => "bad_request_error",
            ApiError::NotFound(_) => "not_found_error",
            ApiError::RateLimit(_) => "rate_limit_error",
            ApiError::Upstream { .. } => "bedrock_error",
            ApiError::Internal(_) => "service_error",
        }
    }

    /// External message. Internal detail is withheld here; callers log it
    /// separately.
    pub fn public_message(&self) -> &str {
        match self {
            ApiError::Internal(_) => "an unexpected error occurred",
            ApiError::Authentication(message)
            | ApiError::Authorization(message)
            | ApiError::BadRequest(message)
            | ApiError::NotFound(message)
            | ApiError::RateLimit(message) => message,
            ApiError::Upstream { message, .. } => message,
        }
    }

    /// Wire envelope as a JSON value.
    pub fn envelope(&self) -> JsonValue {
        let mut error = json!({
            "message": self.public_message(),
            "type": self.code(),
            "code": self.code(),
        });
        if let ApiError::Upstream { detail, .. } = self {
            error["bedrock_error"] = json!({
                "code": detail.code,
                "message": detail.message,
            });
        }
        json!({ "error": error })
    }
}
