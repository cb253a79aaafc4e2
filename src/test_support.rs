//! Helpers for tests that need a throwaway HTTP backend or client state.

use crate::core::config::Config;
use crate::core::state::{AppState, ClientState};
use crate::stores::local_store::LocalStore;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Serve `app` on an ephemeral local port and return its base URL
pub async fn spawn_backend(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Base URL of a port nothing listens on
pub async fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    format!("http://{}", addr)
}

pub fn test_config(base_url: &str) -> Config {
    Config::from_toml(&format!("[api]\nbase_url = \"{}\"\n", base_url)).unwrap()
}

/// Status surface state with empty caches and no tracking view
pub fn test_app_state() -> Arc<AppState> {
    let client = ClientState::new(test_config("http://127.0.0.1:9"), LocalStore::in_memory()).unwrap();
    Arc::new(AppState::new(Arc::new(client), None))
}
