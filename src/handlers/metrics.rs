// Metrics endpoint

use crate::core::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

/// Returns JSON with the sync counters:
/// - Fetches started, applied, failed, superseded and dropped, plus success rate
/// - Mutations succeeded and failed
/// - Poll ticks and uptime
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.client.metrics.snapshot()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::collector::{MetricsSnapshot, SyncMetrics};
    use crate::test_support::test_app_state;
    use axum::body::Body;
    use http_body_util::BodyExt;

    async fn read_snapshot(state: Arc<AppState>) -> MetricsSnapshot {
        let response = metrics_handler(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let (_, body) = response.into_parts();
        let bytes = Body::new(body).collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_metrics_handler_empty() {
        let snapshot = read_snapshot(test_app_state()).await;

        assert_eq!(snapshot.fetches_started, 0);
        assert_eq!(snapshot.polls, 0);
        assert!(snapshot.uptime_seconds >= 0);
    }

    #[tokio::test]
    async fn test_metrics_handler_with_data() {
        let state = test_app_state();
        let metrics = &state.client.metrics;

        SyncMetrics::increment(&metrics.fetches_started);
        SyncMetrics::increment(&metrics.fetches_applied);
        SyncMetrics::increment(&metrics.mutations_failed);

        let snapshot = read_snapshot(state).await;

        assert_eq!(snapshot.fetches_started, 1);
        assert_eq!(snapshot.fetches_applied, 1);
        assert_eq!(snapshot.mutations_failed, 1);
        assert!((snapshot.fetch_success_rate - 100.0).abs() < f64::EPSILON);
    }
}
