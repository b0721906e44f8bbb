use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSpeed {
    Fast,
    #[default]
    Normal,
    Slow,
}

impl ResponseSpeed {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseSpeed::Fast => "fast",
            ResponseSpeed::Normal => "normal",
            ResponseSpeed::Slow => "slow",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub response_speed: ResponseSpeed,
    pub include_context: bool,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            model: "syncinsight-rag".to_string(),
            temperature: 0.7,
            max_tokens: 2048,
            response_speed: ResponseSpeed::default(),
            include_context: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralSettings {
    pub auto_save: bool,
    pub language: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            auto_save: true,
            language: "ko".to_string(),
        }
    }
}

/// Application settings persisted alongside the store's collections.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub ai: AiSettings,
    pub general: GeneralSettings,
}
