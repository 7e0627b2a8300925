//! Persisted record shapes.

use cd_session::MuteRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredUser {
    pub ident: String,
    pub first_join: DateTime<Utc>,
    pub last_join: DateTime<Utc>,
    pub playtime_secs: u64,
}

/// One user's full persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDoc {
    pub user: StoredUser,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub mutes: Vec<MuteRecord>,
}

impl UserDoc {
    pub fn new(user: StoredUser) -> Self {
        Self { user, nickname: String::new(), mutes: Vec::new() }
    }
}

/// Why a chat line did or did not reach the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatOutcome {
    Delivered,
    Muted,
    Cancelled,
    Offline,
    Error,
}

/// Append-only chat log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatLogEntry {
    pub id: String,
    pub ident: String,
    pub content: String,
    pub at: DateTime<Utc>,
    pub outcome: ChatOutcome,
}

impl ChatLogEntry {
    pub fn new(ident: impl Into<String>, content: impl Into<String>, outcome: ChatOutcome) -> Self {
        Self {
            id: format!("log_{}", Uuid::new_v4().simple()),
            ident: ident.into(),
            content: content.into(),
            at: Utc::now(),
            outcome,
        }
    }

    /// Serialize to a JSONL line.
    pub fn to_jsonl(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Deserialize from a JSONL line.
    pub fn from_jsonl(line: &str) -> cd_core::Result<Self> {
        Ok(serde_json::from_str(line)?)
    }
}
