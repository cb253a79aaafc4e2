use serde::{Deserialize, Serialize};

/// Classifies users and keys permissions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: i64,
    pub category_name: String,
}
