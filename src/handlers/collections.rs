use crate::core::error::StatusError;
use crate::core::state::AppState;
use crate::models::status::CollectionSummary;
use crate::sync::stats::DashboardStats;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

/// GET /collections
pub async fn collections_handler(State(state): State<Arc<AppState>>) -> Json<Vec<CollectionSummary>> {
    Json(state.client.summaries())
}

/// GET /collections/{name}
pub async fn collection_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<CollectionSummary>, StatusError> {
    state
        .client
        .summaries()
        .into_iter()
        .find(|s| s.name == name)
        .map(Json)
        .ok_or_else(|| StatusError::NotFound(format!("collection '{}'", name)))
}

/// GET /stats
pub async fn stats_handler(State(state): State<Arc<AppState>>) -> Json<DashboardStats> {
    Json(state.client.stats())
}
