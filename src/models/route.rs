use crate::core::error::SyncError;
use crate::models::Validate;
use crate::validation::fields::require_fields;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub route_id: i64,
    pub route_name: String,
    pub start_point: String,
    pub end_point: String,
}

/// Body for `POST /routes` and `PUT /user/route`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteDraft {
    pub route_name: String,
    pub start_point: String,
    pub end_point: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct RoutePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_point: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_point: Option<String>,
}

impl Validate for RouteDraft {
    fn validate(&self) -> Result<(), SyncError> {
        require_fields(&[
            ("route_name", self.route_name.as_str()),
            ("start_point", self.start_point.as_str()),
            ("end_point", self.end_point.as_str()),
        ])
    }
}

impl Validate for RoutePatch {
    fn validate(&self) -> Result<(), SyncError> {
        if matches!(self.route_name.as_deref(), Some(n) if n.trim().is_empty()) {
            return Err(SyncError::Invalid("route_name must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_lists_every_missing_field() {
        let draft = RouteDraft {
            route_name: "Route A".to_string(),
            start_point: String::new(),
            end_point: String::new(),
        };
        assert_eq!(
            draft.validate(),
            Err(SyncError::Invalid("Missing fields: start_point, end_point".to_string()))
        );
    }
}
