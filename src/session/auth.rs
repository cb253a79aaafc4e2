use crate::api::client::ApiClient;
use crate::core::error::SyncError;
use crate::models::session::{AdminRegistration, Credentials, LoginResponse, Role, Session, UserRegistration};
use crate::models::Validate;
use crate::session::context::SessionContext;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";

/// Login and registration against the backend's auth endpoints.
///
/// Successful logins are adopted by the shared [`SessionContext`]; failures
/// are stored there as the last auth error and returned to the caller.
pub struct AuthService {
    api: Arc<ApiClient>,
    session: Arc<SessionContext>,
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        let session = Arc::clone(api.session());
        Self { api, session }
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub async fn login(&self, role: Role, credentials: &Credentials) -> Result<Session, SyncError> {
        let path = match role {
            Role::Admin => "/admin/login",
            Role::User => "/user/login",
        };

        self.session.clear_error();
        if let Err(e) = credentials.validate() {
            self.session.set_error(e.to_string());
            return Err(e);
        }

        let response: LoginResponse = match self.api.post(path, credentials, LOGIN_FAILED).await {
            Ok(response) => response,
            Err(e) => {
                warn!(role = %role, error = %e, "Login failed");
                self.session.set_error(e.to_string());
                return Err(e.into());
            }
        };

        let session = Session {
            token: response.token,
            identity: response.user,
            role,
        };

        // A session that cannot be persisted still holds for this process
        if let Err(e) = self.session.save(session.clone()) {
            warn!(error = %e, "Failed to persist session");
        }

        info!(role = %role, name = %session.identity.name, "Logged in");
        Ok(session)
    }

    pub async fn login_admin(&self, credentials: &Credentials) -> Result<Session, SyncError> {
        self.login(Role::Admin, credentials).await
    }

    pub async fn login_user(&self, credentials: &Credentials) -> Result<Session, SyncError> {
        self.login(Role::User, credentials).await
    }

    /// Register a rider account; the caller logs in separately
    pub async fn register_user(&self, registration: &UserRegistration) -> Result<Value, SyncError> {
        registration.validate()?;
        self.register("/user/register", registration).await
    }

    pub async fn register_admin(&self, registration: &AdminRegistration) -> Result<Value, SyncError> {
        registration.validate()?;
        self.register("/admin/register", registration).await
    }

    async fn register<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<Value, SyncError> {
        self.session.clear_error();

        match self.api.post::<Value, _>(path, body, REGISTRATION_FAILED).await {
            Ok(response) => {
                info!(path, "Registration accepted");
                Ok(response)
            }
            Err(e) => {
                warn!(path, error = %e, "Registration failed");
                self.session.set_error(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Drop the session locally; no request is sent
    pub fn logout(&self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear persisted session");
        }
        info!("Logged out");
    }
}
