//! JSON-file-backed storage.
//!
//! One document per user under `users/`, one JSONL chat log per user under
//! `chatlog/`. Layout:
//!
//! ```text
//! <root>/users/<ident>.json
//! <root>/chatlog/<ident>.jsonl
//! ```

use crate::schema::{ChatLogEntry, UserDoc};
use crate::Storage;
use async_trait::async_trait;
use cd_core::{DecoError, Result};
use cd_session::MuteRecord;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Map an identity to a filesystem-safe file stem.
fn safe_ident(ident: &str) -> String {
    ident
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn user_path(&self, ident: &str) -> PathBuf {
        self.root.join("users").join(format!("{}.json", safe_ident(ident)))
    }

    fn chatlog_path(&self, ident: &str) -> PathBuf {
        self.root.join("chatlog").join(format!("{}.jsonl", safe_ident(ident)))
    }

    async fn read_doc(&self, ident: &str) -> Result<Option<UserDoc>> {
        let path = self.user_path(ident);
        match fs::read_to_string(&path).await {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DecoError::Storage(format!("read {}: {e}", path.display()))),
        }
    }

    async fn write_doc(&self, doc: &UserDoc) -> Result<()> {
        let path = self.user_path(&doc.user.ident);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DecoError::Storage(format!("mkdir {}: {e}", parent.display())))?;
        }
        let raw = serde_json::to_string_pretty(doc)?;
        fs::write(&path, raw)
            .await
            .map_err(|e| DecoError::Storage(format!("write {}: {e}", path.display())))?;
        debug!(ident = %doc.user.ident, "persisted user document");
        Ok(())
    }

    async fn require_doc(&self, ident: &str) -> Result<UserDoc> {
        self.read_doc(ident)
            .await?
            .ok_or_else(|| DecoError::UserNotFound { ident: ident.to_string() })
    }
}

#[async_trait]
impl Storage for JsonStore {
    async fn load_user(&self, ident: &str) -> Result<Option<UserDoc>> {
        self.read_doc(ident).await
    }

    async fn save_user(&self, doc: &UserDoc) -> Result<()> {
        self.write_doc(doc).await
    }

    async fn update_last_join(&self, ident: &str, at: DateTime<Utc>) -> Result<()> {
        let mut doc = self.require_doc(ident).await?;
        doc.user.last_join = at;
        self.write_doc(&doc).await
    }

    async fn update_playtime(&self, ident: &str, playtime_secs: u64) -> Result<()> {
        let mut doc = self.require_doc(ident).await?;
        doc.user.playtime_secs = playtime_secs;
        self.write_doc(&doc).await
    }

    async fn set_nickname(&self, ident: &str, nickname: &str) -> Result<()> {
        let mut doc = self.require_doc(ident).await?;
        doc.nickname = nickname.to_string();
        self.write_doc(&doc).await
    }

    async fn save_mutes(&self, ident: &str, mutes: &[MuteRecord]) -> Result<()> {
        let mut doc = self.require_doc(ident).await?;
        doc.mutes = mutes.to_vec();
        self.write_doc(&doc).await
    }

    async fn append_chat_log(&self, entry: &ChatLogEntry) -> Result<()> {
        let path = self.chatlog_path(&entry.ident);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DecoError::Storage(format!("mkdir {}: {e}", parent.display())))?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| DecoError::Storage(format!("open {}: {e}", path.display())))?;
        let line = format!("{}\n", entry.to_jsonl());
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| DecoError::Storage(format!("append {}: {e}", path.display())))
    }

    async fn chat_log(&self, ident: &str, limit: usize) -> Result<Vec<ChatLogEntry>> {
        let path = self.chatlog_path(ident);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DecoError::Storage(format!("read {}: {e}", path.display()))),
        };

        let mut entries = Vec::new();
        for line in raw.lines().filter(|l| !l.trim().is_empty()) {
            entries.push(ChatLogEntry::from_jsonl(line)?);
        }
        let skip = entries.len().saturating_sub(limit);
        Ok(entries.split_off(skip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ChatOutcome, StoredUser};
    use cd_session::MuteHistory;
    use tempfile::TempDir;

    fn doc(ident: &str) -> UserDoc {
        let now = Utc::now();
        UserDoc::new(StoredUser {
            ident: ident.into(),
            first_join: now,
            last_join: now,
            playtime_secs: 0,
        })
    }

    #[tokio::test]
    async fn test_load_missing_user() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::new(tmp.path());
        assert!(store.load_user("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::new(tmp.path());
        store.save_user(&doc("u1")).await.unwrap();

        let loaded = store.load_user("u1").await.unwrap().unwrap();
        assert_eq!(loaded.user.ident, "u1");
        assert!(loaded.mutes.is_empty());
    }

    #[tokio::test]
    async fn test_update_playtime() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::new(tmp.path());
        store.save_user(&doc("u1")).await.unwrap();
        store.update_playtime("u1", 3600).await.unwrap();
        assert_eq!(store.load_user("u1").await.unwrap().unwrap().user.playtime_secs, 3600);
    }

    #[tokio::test]
    async fn test_update_unknown_user_fails() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::new(tmp.path());
        let err = store.update_playtime("ghost", 1).await.unwrap_err();
        assert!(matches!(err, DecoError::UserNotFound { .. }));
    }

    #[tokio::test]
    async fn test_nickname_persists() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::new(tmp.path());
        store.save_user(&doc("u1")).await.unwrap();
        store.set_nickname("u1", "Ace").await.unwrap();
        assert_eq!(store.load_user("u1").await.unwrap().unwrap().nickname, "Ace");
    }

    #[tokio::test]
    async fn test_mutes_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::new(tmp.path());
        store.save_user(&doc("u1")).await.unwrap();

        let mut history = MuteHistory::new();
        history.mute("@console", "spam");
        history.unmute("@console");
        history.mute("@console", "again");
        store.save_mutes("u1", history.records()).await.unwrap();

        let loaded = store.load_user("u1").await.unwrap().unwrap();
        assert_eq!(loaded.mutes.len(), 2);
        assert!(loaded.mutes[0].is_closed());
        assert!(loaded.mutes[1].is_open());
    }

    #[tokio::test]
    async fn test_chat_log_append_order() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::new(tmp.path());
        for i in 0..5 {
            let entry = ChatLogEntry::new("u1", format!("line {i}"), ChatOutcome::Delivered);
            store.append_chat_log(&entry).await.unwrap();
        }

        let entries = store.chat_log("u1", 100).await.unwrap();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].content, "line 0");
        assert_eq!(entries[4].content, "line 4");
    }

    #[tokio::test]
    async fn test_chat_log_limit_keeps_most_recent() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::new(tmp.path());
        for i in 0..10 {
            store
                .append_chat_log(&ChatLogEntry::new("u1", format!("line {i}"), ChatOutcome::Delivered))
                .await
                .unwrap();
        }

        let entries = store.chat_log("u1", 3).await.unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].content, "line 7");
        assert_eq!(entries[2].content, "line 9");
    }

    #[tokio::test]
    async fn test_chat_log_empty_for_unknown_user() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::new(tmp.path());
        assert!(store.chat_log("nobody", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chat_log_outcomes() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::new(tmp.path());
        store
            .append_chat_log(&ChatLogEntry::new("u1", "blocked", ChatOutcome::Muted))
            .await
            .unwrap();
        let entries = store.chat_log("u1", 10).await.unwrap();
        assert_eq!(entries[0].outcome, ChatOutcome::Muted);
    }

    #[test]
    fn test_safe_ident() {
        assert_eq!(safe_ident("@console"), "_console");
        assert_eq!(safe_ident("ab-cd_12"), "ab-cd_12");
        assert_eq!(safe_ident("a/b:c"), "a_b_c");
    }
}
