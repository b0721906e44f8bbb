use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::adapters::responder::ResponderDelays;
use crate::adapters::storage::StorageBackend;
use crate::core::store::DEFAULT_STORAGE_KEY;

/// Bump this when adding new fields with non-trivial defaults.
/// When a loaded config has a lower version, it is re-saved to disk
/// so that users see the new keys in their `config.toml`.
const CURRENT_CONFIG_VERSION: u32 = 1;

const MAX_DELAY_MS: u64 = 60_000;

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_upload_delay_ms() -> u64 {
    2_000
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub config_version: u32,
    pub storage_backend: StorageBackend,
    /// Defaults to `~/.syncinsight/data` when unset.
    pub data_dir: Option<String>,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default = "default_upload_delay_ms")]
    pub upload_delay_ms: u64,
    #[serde(default = "default_true")]
    pub cancel_on_switch: bool,
    #[serde(default = "default_true")]
    pub seed_demo_data: bool,
    /// Kept last: serialized as a TOML table.
    pub responder_delays: ResponderDelays,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_version: 0,
            storage_backend: StorageBackend::default(),
            data_dir: None,
            storage_key: default_storage_key(),
            upload_delay_ms: default_upload_delay_ms(),
            cancel_on_switch: true,
            seed_demo_data: true,
            responder_delays: ResponderDelays::default(),
        }
    }
}

impl Settings {
    fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".syncinsight")
    }

    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    pub fn load_global() -> Self {
        Self::load_from(&Self::global_config_path())
    }

    /// Reads `path`, falling back to defaults when it is missing or malformed.
    /// Older files are re-saved so new keys show up on disk.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self {
                config_version: CURRENT_CONFIG_VERSION,
                ..Self::default()
            };
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("[config] Failed to read {}: {e}. Using defaults.", path.display());
                return Self::default();
            }
        };
        let mut settings: Self = match toml::from_str(&content) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("[config] Failed to parse {}: {e}. Using defaults.", path.display());
                return Self::default();
            }
        };

        if settings.config_version < CURRENT_CONFIG_VERSION {
            settings.config_version = CURRENT_CONFIG_VERSION;
            if let Err(e) = settings.save_to(path) {
                log::warn!("[config] Failed to migrate config to v{CURRENT_CONFIG_VERSION}: {e}");
            }
        }
        settings
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::global_config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, &content)?;
        Ok(())
    }

    pub fn set_storage_backend(&mut self, backend: &str) -> Result<(), String> {
        self.storage_backend = backend.parse()?;
        Ok(())
    }

    pub fn set_data_dir(&mut self, dir: &str) {
        let normalized = dir.trim();
        self.data_dir = (!normalized.is_empty()).then(|| normalized.to_string());
    }

    /// Resolves `data_dir`, expanding a leading `~`.
    pub fn data_dir(&self) -> PathBuf {
        let Some(raw) = self.data_dir.as_deref().map(str::trim).filter(|d| !d.is_empty()) else {
            return Self::global_config_dir().join("data");
        };
        match raw.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(rest),
            None => PathBuf::from(raw),
        }
    }

    pub fn storage_key(&self) -> String {
        let key = self.storage_key.trim();
        if key.is_empty() {
            default_storage_key()
        } else {
            key.to_string()
        }
    }

    pub fn responder_delays(&self) -> ResponderDelays {
        let delays = self.responder_delays;
        ResponderDelays {
            fast_ms: delays.fast_ms.min(MAX_DELAY_MS),
            normal_ms: delays.normal_ms.min(MAX_DELAY_MS),
            slow_ms: delays.slow_ms.min(MAX_DELAY_MS),
        }
    }

    pub fn upload_delay(&self) -> Duration {
        Duration::from_millis(self.upload_delay_ms.min(MAX_DELAY_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("syncinsight-config-{}", uuid::Uuid::new_v4()))
            .join("config.toml")
    }

    #[test]
    fn missing_file_yields_current_defaults() {
        let settings = Settings::load_from(&temp_config_path());
        assert_eq!(settings.config_version, CURRENT_CONFIG_VERSION);
        assert_eq!(settings.storage_backend, StorageBackend::Json);
        assert!(settings.cancel_on_switch);
        assert!(settings.seed_demo_data);
        assert_eq!(settings.storage_key(), DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn old_config_is_upgraded_and_resaved() {
        let path = temp_config_path();
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(
            &path,
            "storage_backend = \"sqlite\"\ncancel_on_switch = false\n\n[responder_delays]\nfast_ms = 5\n",
        )
        .expect("write config");

        let settings = Settings::load_from(&path);
        assert_eq!(settings.storage_backend, StorageBackend::Sqlite);
        assert!(!settings.cancel_on_switch);
        assert_eq!(settings.responder_delays.fast_ms, 5);
        assert_eq!(
            settings.responder_delays.slow_ms,
            ResponderDelays::default().slow_ms
        );

        let rewritten = std::fs::read_to_string(&path).expect("read back");
        assert!(rewritten.contains("config_version = 1"));
        assert!(rewritten.contains("seed_demo_data = true"));
        let _ = std::fs::remove_dir_all(path.parent().expect("parent"));
    }

    #[test]
    fn malformed_config_falls_back_to_defaults() {
        let path = temp_config_path();
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&path, "storage_backend = [").expect("write config");

        let settings = Settings::load_from(&path);
        assert_eq!(settings, Settings::default());
        let _ = std::fs::remove_dir_all(path.parent().expect("parent"));
    }

    #[test]
    fn data_dir_expands_home_and_defaults() {
        let mut settings = Settings::default();
        assert!(settings.data_dir().ends_with(".syncinsight/data"));

        settings.set_data_dir("  /var/lib/syncinsight ");
        assert_eq!(settings.data_dir(), PathBuf::from("/var/lib/syncinsight"));

        settings.set_data_dir("~/notes");
        assert!(settings.data_dir().ends_with("notes"));
        assert!(!settings.data_dir().starts_with("~"));

        settings.set_data_dir("");
        assert!(settings.data_dir.is_none());
    }

    #[test]
    fn backend_setter_rejects_unknown_names() {
        let mut settings = Settings::default();
        settings.set_storage_backend("memory").expect("memory backend");
        assert_eq!(settings.storage_backend, StorageBackend::Memory);
        assert!(settings.set_storage_backend("postgres").is_err());
        assert_eq!(settings.storage_backend, StorageBackend::Memory);
    }

    #[test]
    fn delays_are_capped() {
        let mut settings = Settings::default();
        settings.upload_delay_ms = u64::MAX;
        settings.responder_delays.slow_ms = u64::MAX;
        assert_eq!(settings.upload_delay(), Duration::from_millis(MAX_DELAY_MS));
        assert_eq!(settings.responder_delays().slow_ms, MAX_DELAY_MS);
    }
}
