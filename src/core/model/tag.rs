use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagCategory {
    Auto,
    #[default]
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
    /// Number of conversations and documents carrying this tag.
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub category: TagCategory,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: "#6b7280".to_string(),
            count: 0,
            category: TagCategory::Manual,
            created_at: Utc::now(),
        }
    }
}
