use crate::api::client::ApiClient;
use crate::core::error::SyncError;
use crate::models::card::CardStatus;
use crate::models::portal::{AssignedRoute, ProfileResponse, ProfileUpdate, UserCard, UserVehicle};
use crate::models::Validate;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything the rider dashboard shows, with placeholders where a call failed
#[derive(Debug, Clone, Serialize)]
pub struct PortalOverview {
    pub card: UserCard,
    pub route: AssignedRoute,
    pub vehicle: UserVehicle,
    /// Sections that fell back to placeholder values
    pub placeholders: Vec<&'static str>,
}

/// User-scoped endpoints under `/user/*`
pub struct UserPortal {
    api: Arc<ApiClient>,
}

impl UserPortal {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn card(&self) -> Result<UserCard, SyncError> {
        Ok(self.api.get("/user/card", "Failed to fetch card").await?)
    }

    pub async fn route(&self) -> Result<AssignedRoute, SyncError> {
        Ok(self.api.get("/user/route", "Failed to fetch route").await?)
    }

    pub async fn vehicle(&self) -> Result<UserVehicle, SyncError> {
        Ok(self.api.get("/user/vehicle", "Failed to fetch vehicle").await?)
    }

    pub async fn profile(&self) -> Result<Value, SyncError> {
        Ok(self.api.get("/user/profile", "Failed to fetch profile").await?)
    }

    /// Send only the supplied profile fields; an empty update never leaves the process
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Option<Value>, SyncError> {
        update.validate()?;

        let response: ProfileResponse = self
            .api
            .put("/user/profile", update, "Failed to update profile")
            .await?;

        info!("Profile updated");
        Ok(response.user)
    }

    /// Store a route preference and return it as the new assigned route
    pub async fn update_route(&self, route: &AssignedRoute) -> Result<AssignedRoute, SyncError> {
        route.validate()?;

        self.api
            .put::<Value, _>("/user/route", route, "Failed to update route")
            .await?;

        info!(route = %route.route_name, "Route preference updated");
        Ok(route.clone())
    }

    /// Load card, route and vehicle; each failed section falls back to its placeholder
    pub async fn overview(&self) -> PortalOverview {
        let mut placeholders = Vec::new();

        let card = match self.card().await {
            Ok(card) => card,
            Err(e) => {
                warn!(error = %e, "Failed to fetch card info");
                placeholders.push("card");
                placeholder_card(self.api.session().current().and_then(|s| s.identity.user_id))
            }
        };

        let route = match self.route().await {
            Ok(route) => route,
            Err(e) => {
                warn!(error = %e, "Failed to fetch route info");
                placeholders.push("route");
                placeholder_route()
            }
        };

        let vehicle = match self.vehicle().await {
            Ok(vehicle) => vehicle,
            Err(e) => {
                warn!(error = %e, "Failed to fetch vehicle info");
                placeholders.push("vehicle");
                placeholder_vehicle()
            }
        };

        PortalOverview {
            card,
            route,
            vehicle,
            placeholders,
        }
    }
}

pub fn placeholder_card(user_id: Option<i64>) -> UserCard {
    let suffix = user_id.map_or_else(|| "1234".to_string(), |id| id.to_string());
    UserCard {
        card_uid: format!("TRX-{}", suffix),
        status: CardStatus::Active,
    }
}

pub fn placeholder_route() -> AssignedRoute {
    AssignedRoute {
        route_name: "Route A".to_string(),
        start_point: "Campus Gate 1".to_string(),
        end_point: "North Block".to_string(),
    }
}

pub fn placeholder_vehicle() -> UserVehicle {
    UserVehicle {
        vehicle_id: 1,
        vehicle_number: "BUS-101".to_string(),
        driver_name: "Aslam Driver".to_string(),
        route_id: None,
        route_name: Some("Route A".to_string()),
        latitude: Some(20.5937.into()),
        longitude: Some(78.9629.into()),
    }
}
