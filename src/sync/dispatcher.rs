use crate::api::client::ApiClient;
use crate::core::error::{ApiError, SyncError};
use crate::metrics::collector::SyncMetrics;
use crate::models::gps::GpsLocation;
use crate::models::Validate;
use crate::stores::resource_cache::{FetchOutcome, ResourceCache};
use crate::sync::liveness::Liveness;
use crate::sync::resource::{Creatable, Deletable, GpsLocations, Resource, Updatable};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Request → pending → success/failure pipeline for one collection.
///
/// Only the success handlers here mutate the cached collection.
pub struct Dispatcher<R: Resource> {
    api: Arc<ApiClient>,
    cache: Arc<ResourceCache<R>>,
    metrics: Arc<SyncMetrics>,
}

impl<R: Resource> Clone for Dispatcher<R> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            cache: Arc::clone(&self.cache),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<R: Resource> Dispatcher<R> {
    pub fn new(api: Arc<ApiClient>, cache: Arc<ResourceCache<R>>, metrics: Arc<SyncMetrics>) -> Self {
        Self { api, cache, metrics }
    }

    pub fn cache(&self) -> &Arc<ResourceCache<R>> {
        &self.cache
    }

    /// Reload the whole collection from `R::PATH`
    pub async fn fetch(&self) -> Result<Arc<Vec<R::Entity>>, SyncError> {
        self.fetch_from(R::PATH, None).await
    }

    /// `fetch` on behalf of a view; nothing is applied once `liveness` is killed.
    ///
    /// A response dropped this way is abandoned: the collection keeps its
    /// items and returns to the state it had before the fetch.
    pub async fn fetch_while(&self, liveness: &Liveness) -> Result<Arc<Vec<R::Entity>>, SyncError> {
        self.fetch_from(R::PATH, Some(liveness)).await
    }

    async fn fetch_from(&self, path: &str, liveness: Option<&Liveness>) -> Result<Arc<Vec<R::Entity>>, SyncError> {
        let dead = || liveness.is_some_and(|l| !l.is_alive());

        if dead() {
            return Err(SyncError::Disposed);
        }

        let ticket = self.cache.begin_fetch();
        SyncMetrics::increment(&self.metrics.fetches_started);

        let result = self.api.get::<Vec<R::Entity>>(path, &R::fetch_failed()).await;

        if dead() {
            self.cache.abandon_fetch(ticket);
            SyncMetrics::increment(&self.metrics.fetches_dropped);
            debug!(collection = R::NAME, seq = ticket.seq(), "Dropped response for disposed view");
            return Err(SyncError::Disposed);
        }

        match result {
            Ok(items) => {
                let count = items.len();
                match self.cache.complete_fetch(ticket, items) {
                    FetchOutcome::Applied => {
                        SyncMetrics::increment(&self.metrics.fetches_applied);
                        debug!(collection = R::NAME, seq = ticket.seq(), count, "Collection loaded");
                    }
                    FetchOutcome::Superseded => {
                        SyncMetrics::increment(&self.metrics.fetches_superseded);
                        debug!(collection = R::NAME, seq = ticket.seq(), "Discarded superseded response");
                    }
                }
                Ok(self.cache.items())
            }
            Err(e) => {
                SyncMetrics::increment(&self.metrics.fetches_failed);
                if self.cache.fail_fetch(ticket, e.to_string()) == FetchOutcome::Superseded {
                    SyncMetrics::increment(&self.metrics.fetches_superseded);
                }
                warn!(collection = R::NAME, seq = ticket.seq(), error = %e, "Collection fetch failed");
                Err(e.into())
            }
        }
    }

    fn settle_mutation<T>(&self, operation: &'static str, result: Result<T, ApiError>) -> Result<T, SyncError> {
        match result {
            Ok(value) => {
                SyncMetrics::increment(&self.metrics.mutations_succeeded);
                self.cache.clear_mutation_error();
                Ok(value)
            }
            Err(e) => {
                SyncMetrics::increment(&self.metrics.mutations_failed);
                self.cache.record_mutation_error(e.to_string());
                warn!(collection = R::NAME, operation, error = %e, "Mutation failed");
                Err(e.into())
            }
        }
    }
}

impl<R: Creatable> Dispatcher<R> {
    /// Create a record on the backend. The cache is not touched; fetch to observe it.
    pub async fn create(&self, draft: &R::Draft) -> Result<Value, SyncError> {
        draft.validate()?;

        let result = self.api.post::<Value, _>(R::PATH, draft, &R::create_failed()).await;
        let response = self.settle_mutation("create", result)?;

        info!(collection = R::NAME, "Record created");
        Ok(response)
    }

    /// `create` followed by a full reload of the collection
    pub async fn create_and_refresh(&self, draft: &R::Draft) -> Result<Arc<Vec<R::Entity>>, SyncError> {
        self.create(draft).await?;
        self.fetch().await
    }
}

impl<R: Updatable> Dispatcher<R> {
    /// Send `patch` and, on success, overwrite exactly those fields in the cached record
    pub async fn update(&self, id: R::Id, patch: &R::Patch) -> Result<(), SyncError> {
        patch.validate()?;

        let result = self
            .api
            .put::<Value, _>(&R::item_path(id), patch, &R::update_failed())
            .await;
        self.settle_mutation("update", result)?;

        let patched = self.cache.apply_patch(id, patch)?;
        info!(collection = R::NAME, id = %id, cached = patched, "Record updated");

        Ok(())
    }
}

impl<R: Deletable> Dispatcher<R> {
    /// Delete on the backend and drop the cached record; absent records are a no-op
    pub async fn delete(&self, id: R::Id) -> Result<(), SyncError> {
        let result = self
            .api
            .delete::<Value>(&R::item_path(id), &R::delete_failed())
            .await;
        self.settle_mutation("delete", result)?;

        let removed = self.cache.remove(id);
        info!(collection = R::NAME, id = %id, cached = removed, "Record deleted");

        Ok(())
    }
}

impl Dispatcher<GpsLocations> {
    /// Replace the GPS collection with the history of a single vehicle
    pub async fn fetch_for_vehicle(&self, vehicle_id: i64) -> Result<Arc<Vec<GpsLocation>>, SyncError> {
        let path = format!("{}/{}", GpsLocations::PATH, vehicle_id);
        self.fetch_from(&path, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::route::Route;
    use crate::models::vehicle::{VehicleDraft, VehiclePatch};
    use crate::session::context::SessionContext;
    use crate::stores::local_store::LocalStore;
    use crate::stores::resource_cache::LoadState;
    use crate::sync::resource::{Routes, Vehicles};
    use crate::test_support::{dead_endpoint, spawn_backend};
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::{get, put};
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct Hits {
        posts: Arc<AtomicUsize>,
        vehicle_gets: Arc<AtomicUsize>,
    }

    fn vehicles_json(count: usize) -> Value {
        let items: Vec<Value> = (1..=count as i64)
            .map(|id| {
                json!({
                    "vehicle_id": id,
                    "vehicle_number": format!("BUS-{}", 100 + id),
                    "driver_name": format!("Driver {}", id),
                    "capacity": 40,
                    "route_id": 1
                })
            })
            .collect();
        Value::Array(items)
    }

    fn backend(hits: Hits) -> Router {
        Router::new()
            .route(
                "/vehicles",
                get(|State(hits): State<Hits>| async move {
                    // Each create adds one vehicle server-side
                    hits.vehicle_gets.fetch_add(1, Ordering::SeqCst);
                    Json(vehicles_json(2 + hits.posts.load(Ordering::SeqCst)))
                })
                .post(|State(hits): State<Hits>| async move {
                    hits.posts.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::CREATED, Json(json!({"message": "Vehicle added"})))
                }),
            )
            .route(
                "/vehicles/{id}",
                put(|Path(id): Path<i64>| async move {
                    if id == 404 {
                        (StatusCode::NOT_FOUND, Json(json!({"error": "Vehicle not found"})))
                    } else {
                        (StatusCode::OK, Json(json!({"message": "Vehicle updated"})))
                    }
                })
                .delete(|| async { Json(json!({"message": "Vehicle deleted"})) }),
            )
            .route(
                "/routes",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "database is locked"}))) }),
            )
            .with_state(hits)
    }

    fn api(base: &str) -> Arc<ApiClient> {
        let session = Arc::new(SessionContext::new(Arc::new(LocalStore::in_memory())));
        Arc::new(ApiClient::new(base, Duration::from_secs(5), session).unwrap())
    }

    fn dispatcher<R: Resource>(api: &Arc<ApiClient>) -> Dispatcher<R> {
        Dispatcher::new(Arc::clone(api), Arc::new(ResourceCache::new()), Arc::new(SyncMetrics::new()))
    }

    #[tokio::test]
    async fn test_fetch_replaces_collection() {
        let base = spawn_backend(backend(Hits::default())).await;
        let vehicles = dispatcher::<Vehicles>(&api(&base));

        let items = vehicles.fetch().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(vehicles.cache().state(), LoadState::Loaded);
    }

    #[tokio::test]
    async fn test_failed_fetch_stores_server_message() {
        let base = spawn_backend(backend(Hits::default())).await;
        let routes = dispatcher::<Routes>(&api(&base));

        let err = routes.fetch().await.unwrap_err();
        assert_eq!(err.to_string(), "database is locked");

        let snap = routes.cache().snapshot();
        assert_eq!(snap.state, LoadState::Failed);
        assert_eq!(snap.error.as_deref(), Some("database is locked"));
    }

    #[tokio::test]
    async fn test_errors_do_not_cross_collections() {
        let base = spawn_backend(backend(Hits::default())).await;
        let client = api(&base);
        let vehicles = dispatcher::<Vehicles>(&client);
        let routes = dispatcher::<Routes>(&client);

        vehicles.fetch().await.unwrap();
        let _ = routes.fetch().await;

        assert_eq!(vehicles.cache().state(), LoadState::Loaded);
        assert!(vehicles.cache().error().is_none());
        assert_eq!(routes.cache().state(), LoadState::Failed);
        let empty: Arc<Vec<Route>> = routes.cache().items();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_message_is_stored() {
        let base = dead_endpoint().await;
        let vehicles = dispatcher::<Vehicles>(&api(&base));

        assert!(vehicles.fetch().await.is_err());
        assert_eq!(
            vehicles.cache().error().as_deref(),
            Some(crate::core::error::UNREACHABLE_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_create_does_not_touch_cache_until_refetch() {
        let hits = Hits::default();
        let base = spawn_backend(backend(hits.clone())).await;
        let vehicles = dispatcher::<Vehicles>(&api(&base));
        vehicles.fetch().await.unwrap();

        let draft = VehicleDraft {
            vehicle_number: "BUS-200".to_string(),
            driver_name: "Imran".to_string(),
            capacity: 30,
            route_id: None,
        };
        vehicles.create(&draft).await.unwrap();
        assert_eq!(vehicles.cache().len(), 2);

        let refreshed = vehicles.create_and_refresh(&draft).await.unwrap();
        assert_eq!(refreshed.len(), 4);
        assert_eq!(hits.posts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalid_draft_sends_nothing() {
        let hits = Hits::default();
        let base = spawn_backend(backend(hits.clone())).await;
        let vehicles = dispatcher::<Vehicles>(&api(&base));

        let draft = VehicleDraft {
            vehicle_number: String::new(),
            driver_name: "Imran".to_string(),
            capacity: 30,
            route_id: None,
        };
        let err = vehicles.create(&draft).await.unwrap_err();

        assert!(matches!(err, SyncError::Invalid(_)));
        assert_eq!(hits.posts.load(Ordering::SeqCst), 0);
        assert!(vehicles.cache().snapshot().mutation_error.is_none());
    }

    #[tokio::test]
    async fn test_update_patches_cached_record() {
        let base = spawn_backend(backend(Hits::default())).await;
        let vehicles = dispatcher::<Vehicles>(&api(&base));
        vehicles.fetch().await.unwrap();
        let before = vehicles.cache().find(2).unwrap();

        let patch = VehiclePatch {
            capacity: Some(55),
            ..Default::default()
        };
        vehicles.update(2, &patch).await.unwrap();

        let after = vehicles.cache().find(2).unwrap();
        assert_eq!(after.capacity, 55);
        assert_eq!(after.vehicle_number, before.vehicle_number);
        assert_eq!(after.driver_name, before.driver_name);
        assert_eq!(after.route_id, before.route_id);
    }

    #[tokio::test]
    async fn test_failed_update_leaves_cache_untouched() {
        let base = spawn_backend(backend(Hits::default())).await;
        let vehicles = dispatcher::<Vehicles>(&api(&base));
        vehicles.fetch().await.unwrap();
        let before = vehicles.cache().items();

        let patch = VehiclePatch {
            capacity: Some(55),
            ..Default::default()
        };
        let err = vehicles.update(404, &patch).await.unwrap_err();

        assert_eq!(err.to_string(), "Vehicle not found");
        assert_eq!(*vehicles.cache().items(), *before);
        assert_eq!(
            vehicles.cache().snapshot().mutation_error.as_deref(),
            Some("Vehicle not found")
        );
        assert_eq!(vehicles.cache().state(), LoadState::Loaded);
    }

    #[tokio::test]
    async fn test_delete_twice_matches_delete_once() {
        let base = spawn_backend(backend(Hits::default())).await;
        let vehicles = dispatcher::<Vehicles>(&api(&base));
        vehicles.fetch().await.unwrap();

        vehicles.delete(1).await.unwrap();
        let once = vehicles.cache().items();

        vehicles.delete(1).await.unwrap();
        let twice = vehicles.cache().items();

        assert_eq!(*once, *twice);
        assert_eq!(twice.len(), 1);
        assert_eq!(twice[0].vehicle_id, 2);
    }

    #[tokio::test]
    async fn test_fetch_while_dead_sends_nothing() {
        let hits = Hits::default();
        let base = spawn_backend(backend(hits.clone())).await;
        let vehicles = dispatcher::<Vehicles>(&api(&base));

        let liveness = Liveness::new();
        vehicles.fetch_while(&liveness).await.unwrap();
        assert_eq!(hits.vehicle_gets.load(Ordering::SeqCst), 1);

        liveness.kill();
        let err = vehicles.fetch_while(&liveness).await.unwrap_err();

        assert_eq!(err, SyncError::Disposed);
        assert_eq!(hits.vehicle_gets.load(Ordering::SeqCst), 1);
        assert_eq!(vehicles.cache().state(), LoadState::Loaded);
    }

    #[tokio::test]
    async fn test_gps_fetch_for_vehicle_uses_scoped_path() {
        let app = Router::new().route(
            "/gps/{id}",
            get(|Path(id): Path<i64>| async move {
                Json(json!([{"location_id": 9, "vehicle_id": id, "latitude": "1.5", "longitude": "2.5"}]))
            }),
        );
        let base = spawn_backend(app).await;
        let gps = dispatcher::<GpsLocations>(&api(&base));

        let items = gps.fetch_for_vehicle(7).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].vehicle_id, 7);
    }
}
