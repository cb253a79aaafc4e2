use crate::core::error::SyncError;
use crate::models::Validate;
use crate::validation::fields::require_fields;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub permission_id: i64,
    pub category_id: i64,
    /// Free-text area label
    pub allowed_area: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct PermissionDraft {
    pub category_id: i64,
    pub allowed_area: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct PermissionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_area: Option<String>,
}

impl Validate for PermissionDraft {
    fn validate(&self) -> Result<(), SyncError> {
        require_fields(&[("allowed_area", self.allowed_area.as_str())])
    }
}

impl Validate for PermissionPatch {
    fn validate(&self) -> Result<(), SyncError> {
        Ok(())
    }
}
