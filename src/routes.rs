use crate::AppState;
use crate::error::ApiError;
use axum::body::Body;
use axum::extract::{Extension, FromRequest, Query};
use axum::http::{Response, header};
use axum::response::{IntoResponse, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

pub(crate) const SERVICE_NAME: &str = "Bird.com Media Proxy";
pub(crate) const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

// Bird.com presigned URLs are valid for 15 minutes.
const EXPIRY_HINT: &str = "15 minutes";

/// JSON body extractor whose rejections go through [`ApiError`], keeping
/// malformed bodies inside the uniform error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub(crate) struct AppJson<T>(pub(crate) T);

/// Identifiers of a media object attached to a Bird.com message. Used both
/// as the JSON body of `POST /bird-media` and as the query string of
/// `GET /get-media`; absent fields deserialize to empty strings and are
/// rejected by [`MediaRequest::validate`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaRequest {
    pub workspace_id: String,
    pub message_id: String,
    pub file_id: String,
}

impl MediaRequest {
    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.workspace_id.trim().is_empty() {
            missing.push("workspaceId");
        }
        if self.message_id.trim().is_empty() {
            missing.push("messageId");
        }
        if self.file_id.trim().is_empty() {
            missing.push("fileId");
        }
        missing
    }

    fn validate(&self) -> Result<(), ApiError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            return Ok(());
        }

        Err(ApiError::Validation {
            required: missing,
            received: json!({
                "workspaceId": non_empty(&self.workspace_id),
                "messageId": non_empty(&self.message_id),
                "fileId": non_empty(&self.file_id),
            }),
        })
    }
}

fn non_empty(value: &str) -> Value {
    if value.trim().is_empty() {
        Value::Null
    } else {
        Value::String(value.to_string())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaResponse {
    pub success: bool,
    pub media_url: String,
    pub expires_in: String,
    pub timestamp: String,
    pub metadata: MediaRequest,
    pub original_response: Value,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DownloadRequest {
    pub media_url: String,
    pub filename: Option<String>,
}

/// `POST /bird-media` — resolve a presigned media URL and return it in an
/// enriched envelope echoing the request identifiers.
#[axum::debug_handler]
pub(crate) async fn resolve_media(
    Extension(state): Extension<AppState>,
    AppJson(request): AppJson<MediaRequest>,
) -> Result<Json<MediaResponse>, ApiError> {
    info!(
        workspace_id = %request.workspace_id,
        message_id = %request.message_id,
        file_id = %request.file_id,
        "Bird media request received"
    );
    request.validate()?;

    let resolved = state
        .bird
        .resolve(&request.workspace_id, &request.message_id, &request.file_id)
        .await?;

    Ok(Json(MediaResponse {
        success: true,
        media_url: resolved.location,
        expires_in: EXPIRY_HINT.to_string(),
        timestamp: Utc::now().to_rfc3339(),
        metadata: request,
        original_response: resolved.json,
    }))
}

/// `GET /get-media` — same resolution, but relays the upstream JSON body
/// unmodified instead of enriching it.
#[axum::debug_handler]
pub(crate) async fn get_media(
    Extension(state): Extension<AppState>,
    Query(request): Query<MediaRequest>,
) -> Result<Response<Body>, ApiError> {
    request.validate()?;

    let resolved = state
        .bird
        .resolve(&request.workspace_id, &request.message_id, &request.file_id)
        .await?;

    Ok((
        [(header::CONTENT_TYPE, "application/json")],
        resolved.raw,
    )
        .into_response())
}

/// `POST /download-media` — relay the media bytes as an attachment without
/// buffering. Dropping the response body closes the upstream connection.
#[axum::debug_handler]
pub(crate) async fn download_media(
    Extension(state): Extension<AppState>,
    AppJson(request): AppJson<DownloadRequest>,
) -> Result<Response<Body>, ApiError> {
    if request.media_url.trim().is_empty() {
        return Err(ApiError::Validation {
            required: vec!["mediaUrl"],
            received: json!({ "mediaUrl": Value::Null }),
        });
    }

    let upstream = state.bird.fetch_media(&request.media_url).await?;

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    let filename = sanitize_filename(request.filename.as_deref());

    let mut res = Response::new(Body::from_stream(upstream.bytes_stream()));
    let headers = res.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type.parse().unwrap());
    headers.insert(
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{filename}\"")
            .parse()
            .unwrap(),
    );
    Ok(res)
}

/// Keep the filename usable inside a quoted Content-Disposition value.
fn sanitize_filename(filename: Option<&str>) -> String {
    let cleaned: String = filename
        .unwrap_or("media-file")
        .chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control() && *c != '"' && *c != '\\')
        .collect();

    if cleaned.trim().is_empty() {
        "media-file".to_string()
    } else {
        cleaned
    }
}

#[axum::debug_handler]
pub(crate) async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "service": SERVICE_NAME,
        "version": SERVICE_VERSION,
    }))
}

/// `GET /` — static API documentation. Reports whether the access key is
/// configured, never its value.
#[axum::debug_handler]
pub(crate) async fn index(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let access_key = if state.bird.access_key_configured() {
        "***configured***"
    } else {
        "NOT SET"
    };

    Json(json!({
        "service": SERVICE_NAME,
        "version": SERVICE_VERSION,
        "endpoints": {
            "POST /bird-media": "Retrieve media URL from Bird.com",
            "GET /get-media": "Retrieve media URL, relaying the upstream response as-is",
            "POST /download-media": "Download media file directly",
            "GET /health": "Health check",
            "GET /": "API documentation",
        },
        "usage": {
            "/bird-media": {
                "method": "POST",
                "headers": { "Content-Type": "application/json" },
                "body": {
                    "workspaceId": "your_workspace_id",
                    "messageId": "your_message_id",
                    "fileId": "your_file_id",
                },
                "response": {
                    "success": true,
                    "mediaUrl": "https://presigned-url-to-media",
                    "expiresIn": EXPIRY_HINT,
                },
            },
        },
        "environment": { "BIRD_ACCESS_KEY": access_key },
    }))
}
