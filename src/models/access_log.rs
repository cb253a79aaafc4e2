use crate::core::error::SyncError;
use crate::models::Validate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessAction {
    AccessGranted,
    AccessDenied,
    #[serde(other)]
    Other,
}

/// Denormalized, append-only record; never patched or deleted client-side
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccessLog {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub card_uid: Option<String>,
    pub action_type: AccessAction,
    pub timestamp: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct AccessLogDraft {
    pub user_id: i64,
    pub card_id: i64,
    pub action_type: String,
}

impl Validate for AccessLogDraft {
    fn validate(&self) -> Result<(), SyncError> {
        crate::validation::fields::require_fields(&[("action_type", self.action_type.as_str())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_action_maps_to_other() {
        let log: AccessLog = serde_json::from_str(
            r#"{"name":"Ali","category_name":"Student","card_uid":"A1","action_type":"door_forced","timestamp":"2024-03-01 08:00:00"}"#,
        )
        .unwrap();
        assert_eq!(log.action_type, AccessAction::Other);
    }

    #[test]
    fn test_left_join_nulls_are_accepted() {
        let log: AccessLog = serde_json::from_str(
            r#"{"name":null,"category_name":null,"card_uid":null,"action_type":"access_denied","timestamp":"2024-03-01 08:00:00"}"#,
        )
        .unwrap();
        assert_eq!(log.action_type, AccessAction::AccessDenied);
        assert!(log.name.is_none());
    }
}
