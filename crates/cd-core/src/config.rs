//! Decorator configuration.
//!
//! Templates, format patterns, and feature toggles. Callers take a fresh
//! snapshot from [`ConfigStore`] on every resolution pass, so a reload is
//! visible on the next pass without a restart.

use crate::error::{DecoError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoratorConfig {
    pub global: GlobalConfig,
    pub chat: ChatConfig,
    pub welcome: WelcomeConfig,
    pub join: JoinConfig,
    pub mute: MuteConfig,
    pub tab: TabConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Substituted for tokens no handler resolves; an empty string means the
    /// literal token text is kept instead.
    pub default_placeholder_value: String,
    pub datetime_format: String,
    pub date_format: String,
    pub time_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub enabled: bool,
    pub template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeConfig {
    pub enabled: bool,
    pub template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinConfig {
    pub enabled: bool,
    pub template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuteConfig {
    pub enabled: bool,
    pub mute_template: String,
    pub unmute_template: String,
    /// Sent back to a muted sender in place of delivering their chat line.
    pub chat_ignore_template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabConfig {
    pub enabled: bool,
    pub headers: Vec<String>,
    pub footers: Vec<String>,
    pub entry_template: String,
    pub refresh_ms: u64,
}

impl Default for DecoratorConfig {
    fn default() -> Self {
        Self {
            global: GlobalConfig {
                default_placeholder_value: String::new(),
                datetime_format: DEFAULT_DATETIME_FORMAT.into(),
                date_format: DEFAULT_DATE_FORMAT.into(),
                time_format: DEFAULT_TIME_FORMAT.into(),
            },
            chat: ChatConfig {
                enabled: true,
                template: "<%username%> : %message%".into(),
            },
            welcome: WelcomeConfig {
                enabled: false,
                template: String::new(),
            },
            join: JoinConfig {
                enabled: false,
                template: String::new(),
            },
            mute: MuteConfig {
                enabled: true,
                mute_template: "<SERVER> : You were muted by %mute_source_name%, reason: %mute_reason%".into(),
                unmute_template: "<SERVER> : You were unmuted by %unmute_source_name%".into(),
                chat_ignore_template:
                    "<SERVER> : You were muted by %mute_source_name% at %mute_datetime%, reason: %mute_reason%".into(),
            },
            tab: TabConfig {
                enabled: false,
                headers: Vec::new(),
                footers: Vec::new(),
                entry_template: "%username%".into(),
                refresh_ms: 1000,
            },
        }
    }
}

impl DecoratorConfig {
    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DecoError::Storage(format!("read config {}: {e}", path.display())))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Load from a JSON file, falling back to defaults when the file is
    /// missing or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "config load failed, using defaults");
                Self::default()
            }
        }
    }

    /// Save as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| DecoError::Storage(format!("mkdir {}: {e}", parent.display())))?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)
            .map_err(|e| DecoError::Storage(format!("write config {}: {e}", path.display())))
    }
}

/// Default config location under the user's home directory.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".chatdeco")
        .join("config.json")
}

/// Shared configuration handle.
///
/// Readers get an `Arc` snapshot; `replace` swaps the whole tree atomically,
/// which is how a reload takes effect on the next resolution pass.
#[derive(Clone)]
pub struct ConfigStore {
    inner: Arc<RwLock<Arc<DecoratorConfig>>>,
}

impl ConfigStore {
    pub fn new(config: DecoratorConfig) -> Self {
        Self { inner: Arc::new(RwLock::new(Arc::new(config))) }
    }

    /// Current snapshot.
    pub fn current(&self) -> Arc<DecoratorConfig> {
        self.inner.read().unwrap().clone()
    }

    pub fn replace(&self, config: DecoratorConfig) {
        *self.inner.write().unwrap() = Arc::new(config);
    }

    /// Reload from disk; on failure the running config is left untouched.
    pub fn reload_from(&self, path: &Path) -> Result<()> {
        let config = DecoratorConfig::load(path)?;
        self.replace(config);
        tracing::info!(path = %path.display(), "configuration reloaded");
        Ok(())
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(DecoratorConfig::default())
    }
}
