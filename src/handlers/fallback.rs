use crate::core::error::StatusError;
use axum::http::Uri;

pub async fn fallback_handler(uri: Uri) -> StatusError {
    StatusError::NotFound(format!(
        "{}. Valid endpoints: /health, /collections, /stats, /tracking, /map, /metrics",
        uri.path()
    ))
}
