use crate::core::error::SyncError;
use crate::metrics::collector::SyncMetrics;
use crate::stores::resource_cache::ResourceCache;
use crate::sync::dispatcher::Dispatcher;
use crate::sync::liveness::Liveness;
use crate::sync::resource::{GpsLocations, Routes, Vehicles};
use crate::tracking::map_binder::{MapBackend, MapBinder, MapView, Plottable};
use crate::tracking::reconciler::{reconcile, FallbackArea, TrackedVehicle};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

impl Plottable for TrackedVehicle {
    fn coordinates(&self) -> (f64, f64) {
        (self.position.latitude, self.position.longitude)
    }

    fn popup(&self) -> String {
        let mut lines = vec![
            self.vehicle.vehicle_number.clone(),
            format!("Driver: {}", self.vehicle.driver_name),
        ];
        if let Some(route) = &self.route_name {
            lines.push(format!("Route: {}", route));
        }
        lines.push(format!("{:.4}, {:.4}", self.position.latitude, self.position.longitude));
        lines.join("\n")
    }
}

/// Collections the tracking view reads from
#[derive(Clone)]
pub struct TrackingSources {
    pub vehicles: Dispatcher<Vehicles>,
    pub gps: Dispatcher<GpsLocations>,
    pub routes: Arc<ResourceCache<Routes>>,
}

struct Shared<B: MapBackend> {
    liveness: Liveness,
    sources: TrackingSources,
    fallback: FallbackArea,
    metrics: Arc<SyncMetrics>,
    tracked: RwLock<Arc<Vec<TrackedVehicle>>>,
    binder: Mutex<MapBinder<B, TrackedVehicle>>,
}

impl<B: MapBackend> Shared<B> {
    /// Fetch vehicles and GPS together, then rebuild
    async fn refresh(&self) -> Result<(), SyncError> {
        let (gps, vehicles) = tokio::join!(
            self.sources.gps.fetch_while(&self.liveness),
            self.sources.vehicles.fetch_while(&self.liveness),
        );
        self.rebuild()?;

        gps.and(vehicles).map(|_| ())
    }

    async fn poll(&self) -> Result<(), SyncError> {
        SyncMetrics::increment(&self.metrics.polls);

        let gps = self.sources.gps.fetch_while(&self.liveness).await;
        self.rebuild()?;

        gps.map(|_| ())
    }

    /// Re-run the reconciler over whatever the caches hold and rebind markers
    fn rebuild(&self) -> Result<usize, SyncError> {
        if !self.liveness.is_alive() {
            return Err(SyncError::Disposed);
        }

        let tracked = Arc::new(reconcile(
            &self.sources.vehicles.cache().items(),
            &self.sources.gps.cache().items(),
            &self.sources.routes.items(),
            &self.fallback,
        ));

        let placed = self
            .binder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .bind(&tracked);

        debug!(vehicles = tracked.len(), markers = placed, "Tracking view rebuilt");
        *self.tracked.write().unwrap_or_else(PoisonError::into_inner) = tracked;

        Ok(placed)
    }
}

/// Read access to a running view, shareable with other tasks
pub struct TrackingHandle<B: MapBackend>(Arc<Shared<B>>);

impl<B: MapBackend> Clone for TrackingHandle<B> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<B: MapBackend> TrackingHandle<B> {
    pub fn is_alive(&self) -> bool {
        self.0.liveness.is_alive()
    }

    /// Latest reconciled vehicles
    pub fn tracked(&self) -> Arc<Vec<TrackedVehicle>> {
        Arc::clone(&self.0.tracked.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn map_view(&self) -> MapView {
        self.0.binder.lock().unwrap_or_else(PoisonError::into_inner).view()
    }

    /// Manual refresh of both sources; a no-op once the view is disposed
    pub async fn refresh(&self) -> Result<(), SyncError> {
        if !self.is_alive() {
            return Err(SyncError::Disposed);
        }
        self.0.refresh().await
    }
}

/// Live tracking screen: initial load, periodic GPS poll, reconciled markers.
///
/// Dropping or disposing the view stops the poll, and any response still in
/// flight is discarded instead of being applied.
pub struct TrackingView<B: MapBackend> {
    handle: TrackingHandle<B>,
    task: Option<JoinHandle<()>>,
}

impl<B: MapBackend> TrackingView<B> {
    /// Spawn the poll task on the current runtime
    pub fn start(
        sources: TrackingSources,
        binder: MapBinder<B, TrackedVehicle>,
        fallback: FallbackArea,
        poll_interval: Duration,
        metrics: Arc<SyncMetrics>,
    ) -> Self {
        let shared = Arc::new(Shared {
            liveness: Liveness::new(),
            sources,
            fallback,
            metrics,
            tracked: RwLock::new(Arc::new(Vec::new())),
            binder: Mutex::new(binder),
        });

        let task = tokio::spawn(run_poll_loop(Arc::clone(&shared), poll_interval));

        info!(interval_secs = poll_interval.as_secs_f64(), "Tracking view started");

        Self {
            handle: TrackingHandle(shared),
            task: Some(task),
        }
    }

    pub fn handle(&self) -> TrackingHandle<B> {
        self.handle.clone()
    }

    pub fn is_alive(&self) -> bool {
        self.handle.is_alive()
    }

    pub fn tracked(&self) -> Arc<Vec<TrackedVehicle>> {
        self.handle.tracked()
    }

    pub fn map_view(&self) -> MapView {
        self.handle.map_view()
    }

    pub async fn refresh(&self) -> Result<(), SyncError> {
        self.handle.refresh().await
    }

    /// Stop polling, drop late results and release the map
    pub fn dispose(&mut self) {
        let shared = &self.handle.0;
        if !shared.liveness.is_alive() {
            return;
        }

        shared.liveness.kill();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        shared.binder.lock().unwrap_or_else(PoisonError::into_inner).dispose();

        info!("Tracking view disposed");
    }
}

impl<B: MapBackend> Drop for TrackingView<B> {
    fn drop(&mut self) {
        self.dispose();
    }
}

async fn run_poll_loop<B: MapBackend>(shared: Arc<Shared<B>>, period: Duration) {
    if let Err(SyncError::Disposed) = shared.refresh().await {
        return;
    }

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if !shared.liveness.is_alive() {
            break;
        }

        // Fetch failures are already recorded in the cache; keep polling
        if let Err(SyncError::Disposed) = shared.poll().await {
            break;
        }
    }
}
