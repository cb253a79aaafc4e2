use crate::core::error::SyncError;
use crate::sync::resource::{Keyed, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Failed,
}

impl LoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::Idle => "idle",
            LoadState::Loading => "loading",
            LoadState::Loaded => "loaded",
            LoadState::Failed => "failed",
        }
    }
}

/// Sequence number handed out when a fetch starts
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A later fetch already resolved; this result was dropped
    Superseded,
}

/// Immutable view of one collection
#[derive(Debug, Clone)]
pub struct Snapshot<E> {
    pub items: Arc<Vec<E>>,
    pub state: LoadState,
    pub error: Option<String>,
    pub mutation_error: Option<String>,
}

struct CacheState<E> {
    items: Arc<Vec<E>>,
    state: LoadState,
    error: Option<String>,
    mutation_error: Option<String>,
    issued: u64,
    resolved: u64,
    /// State and error as of the last resolved fetch
    settled: (LoadState, Option<String>),
}

/// In-memory cache for one remote collection.
///
/// The collection is held behind an `Arc<Vec<_>>` that is swapped or patched
/// under a single write lock, so readers never observe a half-applied update.
pub struct ResourceCache<R: Resource> {
    inner: RwLock<CacheState<R::Entity>>,
}

impl<R: Resource> ResourceCache<R> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(CacheState {
                items: Arc::new(Vec::new()),
                state: LoadState::Idle,
                error: None,
                mutation_error: None,
                issued: 0,
                resolved: 0,
                settled: (LoadState::Idle, None),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheState<R::Entity>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState<R::Entity>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn name(&self) -> &'static str {
        R::NAME
    }

    pub fn snapshot(&self) -> Snapshot<R::Entity> {
        let inner = self.read();
        Snapshot {
            items: Arc::clone(&inner.items),
            state: inner.state,
            error: inner.error.clone(),
            mutation_error: inner.mutation_error.clone(),
        }
    }

    pub fn items(&self) -> Arc<Vec<R::Entity>> {
        Arc::clone(&self.read().items)
    }

    pub fn state(&self) -> LoadState {
        self.read().state
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    pub fn len(&self) -> usize {
        self.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().items.is_empty()
    }

    /// Enter `Loading`, clear the stored error and issue a fresh ticket
    pub fn begin_fetch(&self) -> FetchTicket {
        let mut inner = self.write();
        inner.issued += 1;
        inner.state = LoadState::Loading;
        inner.error = None;
        FetchTicket(inner.issued)
    }

    /// Replace the collection wholesale, unless a later ticket already resolved
    pub fn complete_fetch(&self, ticket: FetchTicket, items: Vec<R::Entity>) -> FetchOutcome {
        let mut inner = self.write();
        if ticket.0 <= inner.resolved {
            return FetchOutcome::Superseded;
        }

        inner.resolved = ticket.0;
        inner.items = Arc::new(items);
        inner.settled = (LoadState::Loaded, None);

        // An older response landing while a newer fetch is in flight keeps `Loading`
        if ticket.0 == inner.issued {
            inner.state = LoadState::Loaded;
        }

        FetchOutcome::Applied
    }

    /// Record a failed fetch; the cached collection stays readable
    pub fn fail_fetch(&self, ticket: FetchTicket, message: String) -> FetchOutcome {
        let mut inner = self.write();
        if ticket.0 <= inner.resolved {
            return FetchOutcome::Superseded;
        }

        inner.resolved = ticket.0;
        inner.settled = (LoadState::Failed, Some(message.clone()));

        if ticket.0 == inner.issued {
            inner.state = LoadState::Failed;
            inner.error = Some(message);
        }

        FetchOutcome::Applied
    }

    /// Give up on a fetch whose response will never be applied.
    ///
    /// When it was the latest fetch, its ticket is withdrawn; with nothing
    /// else in flight the collection returns to its state before the fetch.
    pub fn abandon_fetch(&self, ticket: FetchTicket) {
        let mut inner = self.write();
        if ticket.0 != inner.issued || ticket.0 <= inner.resolved {
            return;
        }

        inner.issued -= 1;

        if inner.issued == inner.resolved {
            let (state, error) = inner.settled.clone();
            inner.state = state;
            inner.error = error;
        }
    }

    pub fn record_mutation_error(&self, message: String) {
        self.write().mutation_error = Some(message);
    }

    pub fn clear_mutation_error(&self) {
        self.write().mutation_error = None;
    }
}

impl<R: Keyed> ResourceCache<R> {
    pub fn find(&self, id: R::Id) -> Option<R::Entity> {
        self.read().items.iter().find(|e| R::id(e) == id).cloned()
    }

    /// Overwrite exactly the fields present in `patch` on the record with `id`.
    ///
    /// Returns `Ok(false)` when no such record is cached.
    pub fn apply_patch<P: Serialize>(&self, id: R::Id, patch: &P) -> Result<bool, SyncError> {
        let mut inner = self.write();

        let Some(index) = inner.items.iter().position(|e| R::id(e) == id) else {
            return Ok(false);
        };

        let patched = merge_patch(&inner.items[index], patch)?;
        Arc::make_mut(&mut inner.items)[index] = patched;

        Ok(true)
    }

    /// Drop the record with `id`; a no-op when absent
    pub fn remove(&self, id: R::Id) -> bool {
        let mut inner = self.write();

        if !inner.items.iter().any(|e| R::id(e) == id) {
            return false;
        }

        Arc::make_mut(&mut inner.items).retain(|e| R::id(e) != id);
        true
    }
}

impl<R: Resource> Default for ResourceCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Shallow field-wise merge of `patch` over `record`
pub fn merge_patch<E, P>(record: &E, patch: &P) -> Result<E, SyncError>
where
    E: Serialize + DeserializeOwned,
    P: Serialize,
{
    let mut base = serde_json::to_value(record).map_err(|e| SyncError::Patch(e.to_string()))?;
    let fields = serde_json::to_value(patch).map_err(|e| SyncError::Patch(e.to_string()))?;

    match (base.as_object_mut(), fields) {
        (Some(target), Value::Object(fields)) => {
            for (key, value) in fields {
                target.insert(key, value);
            }
        }
        _ => return Err(SyncError::Patch("record and patch must be JSON objects".to_string())),
    }

    serde_json::from_value(base).map_err(|e| SyncError::Patch(e.to_string()))
}
