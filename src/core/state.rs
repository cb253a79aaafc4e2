// Client state (ClientState) and status surface state (AppState)

use crate::api::client::ApiClient;
use crate::core::config::Config;
use crate::metrics::collector::SyncMetrics;
use crate::models::status::CollectionSummary;
use crate::session::auth::AuthService;
use crate::session::context::SessionContext;
use crate::stores::local_store::LocalStore;
use crate::stores::resource_cache::ResourceCache;
use crate::sync::dispatcher::Dispatcher;
use crate::sync::portal::UserPortal;
use crate::sync::resource::{
    AccessLogs, Cards, Categories, GpsLocations, Permissions, Resource, Routes, Users, Vehicles,
};
use crate::sync::stats::DashboardStats;
use crate::tracking::memory_map::MemoryMap;
use crate::tracking::view::{TrackingHandle, TrackingSources};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

/// One cache per remote collection
#[derive(Default)]
pub struct Caches {
    pub users: Arc<ResourceCache<Users>>,
    pub vehicles: Arc<ResourceCache<Vehicles>>,
    pub routes: Arc<ResourceCache<Routes>>,
    pub cards: Arc<ResourceCache<Cards>>,
    pub categories: Arc<ResourceCache<Categories>>,
    pub permissions: Arc<ResourceCache<Permissions>>,
    pub access_logs: Arc<ResourceCache<AccessLogs>>,
    pub gps: Arc<ResourceCache<GpsLocations>>,
}

/// Everything the dashboard reads from, shared across tasks.
///
/// Collections are only written through the dispatchers handed out here.
pub struct ClientState {
    pub config: Arc<Config>,
    pub storage: Arc<LocalStore>,
    pub session: Arc<SessionContext>,
    pub api: Arc<ApiClient>,
    pub metrics: Arc<SyncMetrics>,
    pub caches: Caches,
}

impl ClientState {
    /// Restore the session from `storage` and build the API client
    pub fn new(config: Config, storage: LocalStore) -> Result<Self> {
        let config = Arc::new(config);
        let storage = Arc::new(storage);
        let session = Arc::new(SessionContext::load(Arc::clone(&storage)));

        let api = ApiClient::new(
            config.api.base_url.clone(),
            Duration::from_secs(config.api.timeout_secs),
            Arc::clone(&session),
        )
        .context("Failed to create API client")?;

        Ok(Self {
            config,
            storage,
            session,
            api: Arc::new(api),
            metrics: Arc::new(SyncMetrics::new()),
            caches: Caches::default(),
        })
    }

    fn dispatcher<R: Resource>(&self, cache: &Arc<ResourceCache<R>>) -> Dispatcher<R> {
        Dispatcher::new(Arc::clone(&self.api), Arc::clone(cache), Arc::clone(&self.metrics))
    }

    pub fn users(&self) -> Dispatcher<Users> {
        self.dispatcher(&self.caches.users)
    }

    pub fn vehicles(&self) -> Dispatcher<Vehicles> {
        self.dispatcher(&self.caches.vehicles)
    }

    pub fn routes(&self) -> Dispatcher<Routes> {
        self.dispatcher(&self.caches.routes)
    }

    pub fn cards(&self) -> Dispatcher<Cards> {
        self.dispatcher(&self.caches.cards)
    }

    pub fn categories(&self) -> Dispatcher<Categories> {
        self.dispatcher(&self.caches.categories)
    }

    pub fn permissions(&self) -> Dispatcher<Permissions> {
        self.dispatcher(&self.caches.permissions)
    }

    pub fn access_logs(&self) -> Dispatcher<AccessLogs> {
        self.dispatcher(&self.caches.access_logs)
    }

    pub fn gps(&self) -> Dispatcher<GpsLocations> {
        self.dispatcher(&self.caches.gps)
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(Arc::clone(&self.api))
    }

    pub fn portal(&self) -> UserPortal {
        UserPortal::new(Arc::clone(&self.api))
    }

    pub fn tracking_sources(&self) -> TrackingSources {
        TrackingSources {
            vehicles: self.vehicles(),
            gps: self.gps(),
            routes: Arc::clone(&self.caches.routes),
        }
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::collect(
            &self.caches.users.items(),
            &self.caches.routes.items(),
            &self.caches.vehicles.items(),
            &self.caches.cards.items(),
            &self.caches.access_logs.items(),
        )
    }

    pub fn summaries(&self) -> Vec<CollectionSummary> {
        let c = &self.caches;
        vec![
            summarize(&c.users),
            summarize(&c.vehicles),
            summarize(&c.routes),
            summarize(&c.cards),
            summarize(&c.categories),
            summarize(&c.permissions),
            summarize(&c.access_logs),
            summarize(&c.gps),
        ]
    }
}

fn summarize<R: Resource>(cache: &ResourceCache<R>) -> CollectionSummary {
    let snapshot = cache.snapshot();
    CollectionSummary {
        name: R::NAME.to_string(),
        count: snapshot.items.len(),
        state: snapshot.state.as_str().to_string(),
        error: snapshot.error,
        mutation_error: snapshot.mutation_error,
    }
}

/// Shared state for the status surface handlers
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<ClientState>,
    /// Present while the tracking view runs
    pub tracking: Option<TrackingHandle<MemoryMap>>,
}

impl AppState {
    pub fn new(client: Arc<ClientState>, tracking: Option<TrackingHandle<MemoryMap>>) -> Self {
        Self { client, tracking }
    }
}
