use crate::core::error::SyncError;
use crate::models::Validate;
use crate::validation::fields::require_fields;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    #[default]
    Active,
    Inactive,
    Lost,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub card_id: i64,
    pub card_uid: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub status: CardStatus,
}

#[derive(Clone, Debug, Serialize)]
pub struct CardDraft {
    pub card_uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CardStatus>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct CardPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CardStatus>,
}

impl Validate for CardDraft {
    fn validate(&self) -> Result<(), SyncError> {
        require_fields(&[("card_uid", self.card_uid.as_str())])
    }
}

impl Validate for CardPatch {
    fn validate(&self) -> Result<(), SyncError> {
        if matches!(self.card_uid.as_deref(), Some(uid) if uid.trim().is_empty()) {
            return Err(SyncError::Invalid("card_uid must not be empty".to_string()));
        }
        Ok(())
    }
}
