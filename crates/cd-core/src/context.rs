//! Read-only snapshot types assembled once per resolution pass.

use crate::config::{DecoratorConfig, DEFAULT_DATETIME_FORMAT, DEFAULT_DATE_FORMAT, DEFAULT_TIME_FORMAT};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Live attributes the host supplies for one player.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerAttrs {
    pub username: String,
    pub locale: Option<String>,
    pub position: Option<[f64; 3]>,
    pub max_health: Option<f64>,
    pub current_health: Option<f64>,
    pub ping_ms: Option<u32>,
}

/// Server-wide statistics the host samples for a resolution pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerStats {
    /// Ticks per second.
    pub tps: Option<f64>,
    /// CPU load in the 0..=1 range.
    pub cpu_load: Option<f64>,
    pub mem_total: Option<u64>,
    pub mem_free: Option<u64>,
    pub online_count: Option<usize>,
}

impl ServerStats {
    pub fn mem_used(&self) -> Option<u64> {
        match (self.mem_total, self.mem_free) {
            (Some(total), Some(free)) => Some(total.saturating_sub(free)),
            _ => None,
        }
    }
}

/// Snapshot of the target's most recent mute record, open or closed, with
/// source identities already resolved to display names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MuteView {
    pub source_name: Option<String>,
    pub reason: Option<String>,
    pub muted_at: Option<DateTime<Utc>>,
    pub unmute_source_name: Option<String>,
    pub unmuted_at: Option<DateTime<Utc>>,
}

/// Per-pass snapshot of the config's global section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalFormat {
    pub default_value: String,
    pub datetime_format: String,
    pub date_format: String,
    pub time_format: String,
}

impl GlobalFormat {
    pub fn from_config(config: &DecoratorConfig) -> Self {
        Self {
            default_value: config.global.default_placeholder_value.clone(),
            datetime_format: config.global.datetime_format.clone(),
            date_format: config.global.date_format.clone(),
            time_format: config.global.time_format.clone(),
        }
    }
}

impl Default for GlobalFormat {
    fn default() -> Self {
        Self {
            default_value: String::new(),
            datetime_format: DEFAULT_DATETIME_FORMAT.into(),
            date_format: DEFAULT_DATE_FORMAT.into(),
            time_format: DEFAULT_TIME_FORMAT.into(),
        }
    }
}

/// The read-only snapshot placeholder handlers consume.
///
/// Built once per resolution pass; session-derived fields are `None` when
/// the target has no session (a source that never joined, or test contexts).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageContext {
    pub ident: String,
    pub nickname: Option<String>,
    pub first_join: Option<DateTime<Utc>>,
    pub last_join: Option<DateTime<Utc>>,
    /// Effective total playtime in seconds at snapshot time.
    pub playtime_secs: Option<u64>,
    /// Elapsed seconds of the current session; `None` while offline.
    pub session_secs: Option<u64>,
    /// Raw chat text, for chat events only.
    pub message: Option<String>,
    pub attrs: PlayerAttrs,
    pub stats: ServerStats,
    pub mute: Option<MuteView>,
    pub format: GlobalFormat,
}

impl MessageContext {
    /// Minimal context carrying only an identity and display name.
    pub fn new(ident: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            attrs: PlayerAttrs { username: username.into(), ..PlayerAttrs::default() },
            ..Self::default()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
