use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::core::config::AuthConfig;
use crate::core::state::ClientState;
use crate::models::session::{Credentials, Role};

/// Log in with the configured credentials unless a session was restored.
///
/// Returns the role of the active session, if any.
pub async fn authenticate(state: &ClientState, auth: &AuthConfig) -> Result<Option<Role>> {
    if let Some(session) = state.session.current() {
        info!(role = %session.role, name = %session.identity.name, "Using restored session");
        return Ok(Some(session.role));
    }

    let (Some(role), Some(email), Some(password_env)) = (&auth.role, &auth.email, &auth.password_env) else {
        info!("No credentials configured, continuing unauthenticated");
        return Ok(None);
    };

    let Some(role) = Role::parse(role) else {
        bail!("Invalid auth role '{}'", role);
    };

    let password = std::env::var(password_env)
        .context(format!("Password environment variable '{}' is not set", password_env))?;

    let credentials = Credentials {
        email: email.clone(),
        password,
    };

    let session = state
        .auth()
        .login(role, &credentials)
        .await
        .context("Initial login failed")?;

    Ok(Some(session.role))
}

/// Whether the live tracking view should run for this session.
///
/// GPS and vehicle listings are admin endpoints, so a user session would only
/// collect failed polls.
pub fn tracks_fleet(role: Option<Role>) -> bool {
    role != Some(Role::User)
}

/// Load every collection the role can see. Failures stay in their own collection.
pub async fn populate(state: &ClientState, role: Option<Role>) {
    if role == Some(Role::User) {
        let overview = state.portal().overview().await;
        info!(
            card = %overview.card.card_uid,
            route = %overview.route.route_name,
            vehicle = %overview.vehicle.vehicle_number,
            placeholders = ?overview.placeholders,
            "User portal loaded"
        );
        return;
    }

    let dispatchers = (
        state.users(),
        state.vehicles(),
        state.routes(),
        state.cards(),
        state.categories(),
        state.permissions(),
        state.access_logs(),
        state.gps(),
    );

    let (users, vehicles, routes, cards, categories, permissions, access_logs, gps) = tokio::join!(
        dispatchers.0.fetch(),
        dispatchers.1.fetch(),
        dispatchers.2.fetch(),
        dispatchers.3.fetch(),
        dispatchers.4.fetch(),
        dispatchers.5.fetch(),
        dispatchers.6.fetch(),
        dispatchers.7.fetch(),
    );

    let failures = [
        ("users", users.err()),
        ("vehicles", vehicles.err()),
        ("routes", routes.err()),
        ("cards", cards.err()),
        ("categories", categories.err()),
        ("permissions", permissions.err()),
        ("access_logs", access_logs.err()),
        ("gps", gps.err()),
    ];

    for (collection, error) in &failures {
        if let Some(e) = error {
            warn!(collection, error = %e, "Collection unavailable at startup");
        }
    }

    let stats = state.stats();
    info!(
        users = stats.total_users,
        routes = stats.total_routes,
        vehicles = stats.total_vehicles,
        active_cards = stats.active_cards,
        failed = failures.iter().filter(|(_, e)| e.is_some()).count(),
        "Collections loaded"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::local_store::LocalStore;
    use crate::stores::resource_cache::LoadState;
    use crate::test_support::{spawn_backend, test_config};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    fn backend() -> Router {
        Router::new()
            .route(
                "/admin/login",
                post(|| async { Json(json!({"token": "t", "admin": {"admin_id": 1, "name": "Root"}})) }),
            )
            .route(
                "/vehicles",
                get(|| async {
                    Json(json!([{"vehicle_id": 1, "vehicle_number": "BUS-1", "driver_name": "A", "capacity": 10}]))
                }),
            )
            .route(
                "/routes",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "database is locked"}))) }),
            )
    }

    #[tokio::test]
    async fn test_unconfigured_auth_stays_anonymous() {
        let state = ClientState::new(test_config("http://127.0.0.1:9"), LocalStore::in_memory()).unwrap();

        let role = authenticate(&state, &AuthConfig::default()).await.unwrap();
        assert_eq!(role, None);
    }

    #[tokio::test]
    async fn test_missing_password_env_is_an_error() {
        let state = ClientState::new(test_config("http://127.0.0.1:9"), LocalStore::in_memory()).unwrap();
        let auth = AuthConfig {
            role: Some("admin".to_string()),
            email: Some("root@example.com".to_string()),
            password_env: Some("TRACKGO_TEST_PASSWORD_THAT_IS_NEVER_SET".to_string()),
        };

        assert!(authenticate(&state, &auth).await.is_err());
    }

    #[test]
    fn test_tracking_skipped_for_user_sessions() {
        assert!(tracks_fleet(Some(Role::Admin)));
        assert!(tracks_fleet(None));
        assert!(!tracks_fleet(Some(Role::User)));
    }

    #[tokio::test]
    async fn test_populate_isolates_failures() {
        let base = spawn_backend(backend()).await;
        let state = ClientState::new(test_config(&base), LocalStore::in_memory()).unwrap();

        populate(&state, Some(Role::Admin)).await;

        assert_eq!(state.caches.vehicles.state(), LoadState::Loaded);
        assert_eq!(state.caches.vehicles.len(), 1);
        assert_eq!(state.caches.routes.state(), LoadState::Failed);
        assert_eq!(state.caches.routes.error().as_deref(), Some("database is locked"));
        // Unrouted paths answer 404 with no body
        assert_eq!(state.caches.users.error().as_deref(), Some("Failed to fetch users"));
    }
}
