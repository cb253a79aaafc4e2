use crate::core::error::SyncError;
use crate::models::Validate;
use crate::validation::fields::require_fields;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub vehicle_id: i64,
    /// Display label, expected unique in practice
    pub vehicle_number: String,
    pub driver_name: String,
    pub capacity: u32,
    #[serde(default)]
    pub route_id: Option<i64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct VehicleDraft {
    pub vehicle_number: String,
    pub driver_name: String,
    pub capacity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_id: Option<i64>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct VehiclePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    /// `Some(None)` clears the route assignment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_id: Option<Option<i64>>,
}

impl Validate for VehicleDraft {
    fn validate(&self) -> Result<(), SyncError> {
        require_fields(&[
            ("vehicle_number", self.vehicle_number.as_str()),
            ("driver_name", self.driver_name.as_str()),
        ])?;

        if self.capacity == 0 {
            return Err(SyncError::Invalid("capacity must be a positive integer".to_string()));
        }

        Ok(())
    }
}

impl Validate for VehiclePatch {
    fn validate(&self) -> Result<(), SyncError> {
        if matches!(self.vehicle_number.as_deref(), Some(n) if n.trim().is_empty()) {
            return Err(SyncError::Invalid("vehicle_number must not be empty".to_string()));
        }

        if self.capacity == Some(0) {
            return Err(SyncError::Invalid("capacity must be a positive integer".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_accepts_null_route() {
        let vehicle: Vehicle = serde_json::from_str(
            r#"{"vehicle_id":7,"vehicle_number":"BUS-101","driver_name":"Aslam","capacity":40,"route_id":null}"#,
        )
        .unwrap();

        assert_eq!(vehicle.vehicle_id, 7);
        assert_eq!(vehicle.route_id, None);
    }

    #[test]
    fn test_patch_serializes_only_supplied_fields() {
        let patch = VehiclePatch {
            driver_name: Some("Bilal".to_string()),
            route_id: Some(None),
            ..Default::default()
        };

        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"driver_name": "Bilal", "route_id": null}));
    }

    #[test]
    fn test_draft_requires_capacity() {
        let draft = VehicleDraft {
            vehicle_number: "BUS-9".to_string(),
            driver_name: "Kamran".to_string(),
            capacity: 0,
            route_id: None,
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_draft_requires_number() {
        let draft = VehicleDraft {
            vehicle_number: "  ".to_string(),
            driver_name: "Kamran".to_string(),
            capacity: 30,
            route_id: None,
        };
        assert_eq!(
            draft.validate(),
            Err(SyncError::Invalid("Missing fields: vehicle_number".to_string()))
        );
    }
}
