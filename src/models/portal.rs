use crate::core::error::SyncError;
use crate::models::card::CardStatus;
use crate::models::gps::Coordinate;
use crate::models::Validate;
use serde::{Deserialize, Serialize};

/// `GET /user/card`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserCard {
    pub card_uid: String,
    #[serde(default)]
    pub status: CardStatus,
}

/// `GET /user/route`, `PUT /user/route`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssignedRoute {
    pub route_name: String,
    pub start_point: String,
    pub end_point: String,
}

/// `GET /user/vehicle`: a vehicle joined with its latest fix
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserVehicle {
    pub vehicle_id: i64,
    pub vehicle_number: String,
    pub driver_name: String,
    #[serde(default)]
    pub route_id: Option<i64>,
    #[serde(default)]
    pub route_name: Option<String>,
    #[serde(default)]
    pub latitude: Option<Coordinate>,
    #[serde(default)]
    pub longitude: Option<Coordinate>,
}

impl UserVehicle {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.latitude.as_ref()?.value()?;
        let lon = self.longitude.as_ref()?.value()?;
        Some((lat, lon))
    }
}

/// Self-service profile edit; only supplied fields are sent
#[derive(Clone, Debug, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Validate for ProfileUpdate {
    fn validate(&self) -> Result<(), SyncError> {
        let supplied = [
            &self.name,
            &self.email,
            &self.phone,
            &self.emergency_contact,
            &self.password,
        ];

        if supplied.iter().all(|f| f.is_none()) {
            return Err(SyncError::Invalid("No valid fields provided".to_string()));
        }

        Ok(())
    }
}

impl Validate for AssignedRoute {
    fn validate(&self) -> Result<(), SyncError> {
        crate::validation::fields::require_fields(&[
            ("route_name", self.route_name.as_str()),
            ("start_point", self.start_point.as_str()),
            ("end_point", self.end_point.as_str()),
        ])
    }
}

#[derive(Debug, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}
