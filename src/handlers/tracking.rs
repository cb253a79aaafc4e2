use crate::core::error::StatusError;
use crate::core::state::AppState;
use crate::tracking::map_binder::MapView;
use crate::tracking::reconciler::TrackedVehicle;
use axum::{extract::State, Json};
use std::sync::Arc;

/// GET /tracking
///
/// Reconciled vehicles from the running tracking view, empty when none runs.
pub async fn tracking_handler(State(state): State<Arc<AppState>>) -> Json<Vec<TrackedVehicle>> {
    let tracked = state
        .tracking
        .as_ref()
        .map(|handle| handle.tracked().as_ref().clone())
        .unwrap_or_default();

    Json(tracked)
}

/// GET /map
pub async fn map_handler(State(state): State<Arc<AppState>>) -> Result<Json<MapView>, StatusError> {
    state
        .tracking
        .as_ref()
        .map(|handle| Json(handle.map_view()))
        .ok_or_else(|| StatusError::NotFound("tracking view is not running".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_app_state;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn test_no_view_means_empty_tracking() {
        let Json(tracked) = tracking_handler(State(test_app_state())).await;
        assert!(tracked.is_empty());
    }

    #[tokio::test]
    async fn test_no_view_means_map_404() {
        let err = map_handler(State(test_app_state())).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
