// HTTP routes for the local status surface

use crate::core::state::AppState;
use axum::{routing::get, Router};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::handlers::health::health_handler))
        .route("/metrics", get(crate::handlers::metrics::metrics_handler))

        // Client state
        .route("/collections", get(crate::handlers::collections::collections_handler))
        .route("/collections/{name}", get(crate::handlers::collections::collection_handler))
        .route("/stats", get(crate::handlers::collections::stats_handler))

        // Tracking view
        .route("/tracking", get(crate::handlers::tracking::tracking_handler))
        .route("/map", get(crate::handlers::tracking::map_handler))

        // 404 fallback for all unmatched routes
        .fallback(crate::handlers::fallback::fallback_handler)

        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::ClientState;
    use crate::stores::local_store::LocalStore;
    use crate::test_support::{spawn_backend, test_config};
    use crate::tracking::map_binder::{MapBinder, MapSettings};
    use crate::tracking::reconciler::FallbackArea;
    use crate::tracking::view::TrackingView;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Json;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    async fn get_json(app: Router, path: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_unknown_route_returns_json_404() {
        let app = build_router(crate::test_support::test_app_state());

        let (status, body) = get_json(app, "/vehicles").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_tracking_surface_serves_running_view() {
        let backend = Router::new()
            .route(
                "/vehicles",
                axum::routing::get(|| async {
                    Json(json!([{"vehicle_id": 3, "vehicle_number": "BUS-303", "driver_name": "Asma", "capacity": 25}]))
                }),
            )
            .route(
                "/gps",
                axum::routing::get(|| async {
                    Json(json!([{"location_id": 1, "vehicle_id": 3, "latitude": 33.6844, "longitude": 73.0479}]))
                }),
            );
        let base = spawn_backend(backend).await;

        let client = Arc::new(ClientState::new(test_config(&base), LocalStore::in_memory()).unwrap());
        let view = TrackingView::start(
            client.tracking_sources(),
            MapBinder::open(MapSettings::default()),
            FallbackArea::default(),
            Duration::from_secs(30),
            Arc::clone(&client.metrics),
        );
        let state = Arc::new(AppState::new(Arc::clone(&client), Some(view.handle())));

        for _ in 0..200 {
            if !view.tracked().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let (status, tracked) = get_json(build_router(Arc::clone(&state)), "/tracking").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(tracked[0]["vehicle_number"], "BUS-303");
        assert_eq!(tracked[0]["position"]["source"]["kind"], "live");

        let (status, map) = get_json(build_router(Arc::clone(&state)), "/map").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(map["status"]["status"], "ready");
        assert_eq!(map["markers"].as_array().unwrap().len(), 1);

        let (_, collections) = get_json(build_router(state), "/collections/gps").await;
        assert_eq!(collections["state"], "loaded");
        assert_eq!(collections["count"], 1);
    }
}
