use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

pub const DEFAULT_USER_ID: &str = "user-1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationPreferences {
    pub email: bool,
    pub push: bool,
    pub desktop: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email: true,
            push: false,
            desktop: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiPreferences {
    pub compact_mode: bool,
    pub show_confidence: bool,
    pub show_sources: bool,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            compact_mode: false,
            show_confidence: true,
            show_sources: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub theme: Theme,
    pub language: String,
    pub timezone: String,
    pub notifications: NotificationPreferences,
    pub ui: UiPreferences,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            language: "ko".to_string(),
            timezone: "Asia/Seoul".to_string(),
            notifications: NotificationPreferences::default(),
            ui: UiPreferences::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(default)]
    pub total_conversations: usize,
    #[serde(default)]
    pub total_messages: usize,
    #[serde(default)]
    pub total_documents: usize,
    #[serde(with = "timestamp")]
    pub last_active: DateTime<Utc>,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            total_conversations: 0,
            total_messages: 0,
            total_documents: 0,
            last_active: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub preferences: UserPreferences,
    #[serde(default)]
    pub stats: UserStats,
}

fn default_role() -> String {
    "member".to_string()
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: DEFAULT_USER_ID.to_string(),
            name: "사용자".to_string(),
            email: "user@syncinsight.local".to_string(),
            avatar: None,
            role: default_role(),
            preferences: UserPreferences::default(),
            stats: UserStats::default(),
        }
    }
}
