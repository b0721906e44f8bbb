use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// A folder groups only one kind of entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderType {
    Conversation,
    Document,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(rename = "type")]
    pub folder_type: FolderType,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub order: i64,
}

impl Folder {
    pub fn new(id: impl Into<String>, name: impl Into<String>, folder_type: FolderType) -> Self {
        let icon = match folder_type {
            FolderType::Conversation => "message-square",
            FolderType::Document => "folder",
        };
        Self {
            id: id.into(),
            name: name.into(),
            color: "#3b82f6".to_string(),
            icon: icon.to_string(),
            parent_id: None,
            folder_type,
            created_at: Utc::now(),
            order: 0,
        }
    }
}
