// Centralized error handling for the sync layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

pub const UNREACHABLE_MESSAGE: &str =
    "Unable to connect to server. Please check if the backend is running.";

/// Failures surfaced by the remote resource client
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Unable to connect to server. Please check if the backend is running.")]
    Unreachable,

    /// Non-2xx response; message is the server's `error` field or the operation default
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// 2xx response whose body could not be decoded
    #[error("{message}")]
    Malformed { message: String },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors returned by the dispatch pipeline and session operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Local precondition failure, rejected before any request is sent
    #[error("{0}")]
    Invalid(String),

    #[error("Tracking view has been disposed")]
    Disposed,

    #[error("Failed to apply patch: {0}")]
    Patch(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("Failed to load map: {0}")]
    Init(String),

    #[error("Failed to update markers: {0}")]
    Marker(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Errors returned by the local status surface
#[derive(Error, Debug)]
pub enum StatusError {
    #[error("Resource not found: {0}")]
    NotFound(String),
}

impl IntoResponse for StatusError {
    fn into_response(self) -> Response {
        use crate::models::status::ErrorResponse;

        let status = match &self {
            StatusError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
