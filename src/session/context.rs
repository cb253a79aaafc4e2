use crate::core::error::StorageError;
use crate::models::session::{Identity, Role, Session};
use crate::stores::local_store::LocalStore;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const ROLE_KEY: &str = "role";
pub const MAP_TOKEN_KEY: &str = "mapbox_token";

/// Explicit authentication state shared by the API client and the views.
///
/// Durable storage is only touched by `load`, `save` and `clear`.
pub struct SessionContext {
    storage: Arc<LocalStore>,
    current: RwLock<Option<Session>>,
    last_error: RwLock<Option<String>>,
}

impl SessionContext {
    /// Empty, unauthenticated context
    pub fn new(storage: Arc<LocalStore>) -> Self {
        Self {
            storage,
            current: RwLock::new(None),
            last_error: RwLock::new(None),
        }
    }

    /// Seed the context from durable storage at process start
    pub fn load(storage: Arc<LocalStore>) -> Self {
        let restored = restore_session(&storage);

        match &restored {
            Some(session) => info!(role = %session.role, name = %session.identity.name, "Session restored"),
            None => info!("No persisted session"),
        }

        Self {
            storage,
            current: RwLock::new(restored),
            last_error: RwLock::new(None),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.token.clone())
    }

    pub fn role(&self) -> Option<Role> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Adopt a freshly logged-in session and persist it.
    ///
    /// The session is adopted even when persisting fails; storage then keeps
    /// its previous contents.
    pub fn save(&self, session: Session) -> Result<(), StorageError> {
        let identity = serde_json::to_string(&session.identity)?;
        let pairs = [
            (TOKEN_KEY, session.token.clone()),
            (USER_KEY, identity),
            (ROLE_KEY, session.role.as_str().to_string()),
        ];

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        self.clear_error();

        self.storage.set_many(&pairs)
    }

    /// Forget the session in memory and on disk; the map token is kept
    pub fn clear(&self) -> Result<(), StorageError> {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.clear_error();
        self.storage.remove_many(&[TOKEN_KEY, USER_KEY, ROLE_KEY])
    }

    pub fn map_token(&self) -> Option<String> {
        self.storage.get(MAP_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn set_map_token(&self, token: Option<&str>) -> Result<(), StorageError> {
        match token {
            Some(token) if !token.is_empty() => self.storage.set(MAP_TOKEN_KEY, token),
            _ => self.storage.remove(MAP_TOKEN_KEY).map(|_| ()),
        }
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_error(&self, message: String) {
        *self.last_error.write().unwrap_or_else(PoisonError::into_inner) = Some(message);
    }

    pub fn clear_error(&self) {
        *self.last_error.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

fn restore_session(storage: &LocalStore) -> Option<Session> {
    let token = storage.get(TOKEN_KEY)?;
    let role_raw = storage.get(ROLE_KEY)?;
    let user_raw = storage.get(USER_KEY)?;

    let Some(role) = Role::parse(&role_raw) else {
        warn!(role = %role_raw, "Ignoring persisted session with unknown role");
        return None;
    };

    let identity: Identity = match serde_json::from_str(&user_raw) {
        Ok(identity) => identity,
        Err(e) => {
            warn!(error = %e, "Ignoring persisted session with unreadable identity");
            return None;
        }
    };

    Some(Session {
        token,
        identity,
        role,
    })
}
