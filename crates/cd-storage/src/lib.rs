//! Persistence for chatdeco: user records, nicknames, mute histories, and
//! the append-only chat log.
//!
//! The engine reads one snapshot to seed a session and emits deltas for the
//! caller to persist; it never assumes a write succeeded, so the in-memory
//! and persisted views may diverge until the next successful write.

pub mod json_store;
pub mod schema;

pub use json_store::JsonStore;
pub use schema::{ChatLogEntry, ChatOutcome, StoredUser, UserDoc};

use async_trait::async_trait;
use cd_core::Result;
use cd_session::MuteRecord;
use chrono::{DateTime, Utc};

/// Storage collaborator. Read misses are `Ok(None)` / empty, not errors.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn load_user(&self, ident: &str) -> Result<Option<UserDoc>>;

    async fn save_user(&self, doc: &UserDoc) -> Result<()>;

    async fn update_last_join(&self, ident: &str, at: DateTime<Utc>) -> Result<()>;

    async fn update_playtime(&self, ident: &str, playtime_secs: u64) -> Result<()>;

    async fn set_nickname(&self, ident: &str, nickname: &str) -> Result<()>;

    /// Replace the persisted mute history with the in-memory one.
    async fn save_mutes(&self, ident: &str, mutes: &[MuteRecord]) -> Result<()>;

    async fn append_chat_log(&self, entry: &ChatLogEntry) -> Result<()>;

    /// The most recent `limit` entries for one identity, oldest first.
    async fn chat_log(&self, ident: &str, limit: usize) -> Result<Vec<ChatLogEntry>>;
}
