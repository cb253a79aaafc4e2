use crate::core::error::SyncError;
use crate::models::Validate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeStatus {
    Paid,
    Unpaid,
    /// Free text the backend accepted that is neither of the above
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub category_id: i64,
    #[serde(default)]
    pub fee_status: Option<FeeStatus>,
    #[serde(default)]
    pub vehicle_id: Option<i64>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
}

/// Admin edit of a user record
#[derive(Clone, Debug, Default, Serialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_status: Option<FeeStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<Option<String>>,
}

impl Validate for UserPatch {
    fn validate(&self) -> Result<(), SyncError> {
        if matches!(self.name.as_deref(), Some(n) if n.trim().is_empty()) {
            return Err(SyncError::Invalid("name must not be empty".to_string()));
        }

        if matches!(self.email.as_deref(), Some(e) if !e.contains('@')) {
            return Err(SyncError::Invalid("email must be a valid address".to_string()));
        }

        Ok(())
    }
}
