use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{Value, json};
use thiserror::Error;

/// Request-level failures, matched exhaustively into the uniform
/// `{success: false, error, message?, details?}` envelope
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required parameters")]
    Validation {
        required: Vec<&'static str>,
        received: Value,
    },

    #[error("Invalid request body")]
    InvalidBody(String),

    #[error("BIRD_ACCESS_KEY not configured on server")]
    Configuration,

    #[error("Bird.com API error")]
    Upstream { status: StatusCode, body: Value },

    #[error("Network error when contacting Bird.com")]
    Network(#[source] reqwest::Error),

    #[error("Media URL not found in Bird.com response")]
    ResponseShape { response: Value },

    #[error("Failed to download media")]
    Download(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Configuration
            | ApiError::Network(_)
            | ApiError::ResponseShape { .. }
            | ApiError::Download(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream { status, .. } => *status,
        }
    }

    fn envelope(&self) -> Value {
        match self {
            ApiError::Validation { required, received } => json!({
                "success": false,
                "error": self.to_string(),
                "details": {
                    "required": required,
                    "received": received,
                },
            }),
            ApiError::InvalidBody(message) => json!({
                "success": false,
                "error": self.to_string(),
                "message": message,
            }),
            ApiError::Configuration => json!({
                "success": false,
                "error": self.to_string(),
            }),
            ApiError::Upstream { status, body } => json!({
                "success": false,
                "error": self.to_string(),
                "status": status.as_u16(),
                "message": body,
                "details": status.canonical_reason(),
            }),
            ApiError::Network(source) => json!({
                "success": false,
                "error": self.to_string(),
                "message": source.to_string(),
            }),
            ApiError::ResponseShape { response } => json!({
                "success": false,
                "error": self.to_string(),
                "details": response,
            }),
            ApiError::Download(message) => json!({
                "success": false,
                "error": self.to_string(),
                "message": message,
            }),
        }
    }
}

// Body-parse rejections (malformed JSON, wrong content type) stay inside
// the envelope instead of surfacing axum's plain-text responses.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.envelope())).into_response()
    }
}
