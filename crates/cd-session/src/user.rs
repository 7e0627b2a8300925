//! The per-user session record.

use crate::mute::{MuteHistory, MuteRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// In-memory record of one user's identity, timing, nickname, and
/// moderation history.
///
/// Created on first-ever join and kept for the process lifetime, including
/// after disconnect, so offline placeholder and log queries still resolve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    pub ident: String,
    pub nickname: String,
    pub first_join: DateTime<Utc>,
    pub last_join: DateTime<Utc>,
    /// Playtime frozen at last disconnect, in seconds.
    pub accumulated_secs: u64,
    pub online: bool,
    mutes: MuteHistory,
}

impl UserSession {
    pub fn new(ident: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            ident: ident.into(),
            nickname: String::new(),
            first_join: now,
            last_join: now,
            accumulated_secs: 0,
            online: false,
            mutes: MuteHistory::new(),
        }
    }

    /// Rebuild a session from a persisted record.
    pub fn from_stored(
        ident: impl Into<String>,
        first_join: DateTime<Utc>,
        last_join: DateTime<Utc>,
        accumulated_secs: u64,
    ) -> Self {
        Self {
            ident: ident.into(),
            nickname: String::new(),
            first_join,
            last_join,
            accumulated_secs,
            online: false,
            mutes: MuteHistory::new(),
        }
    }

    pub fn join(&mut self) {
        self.join_at(Utc::now());
    }

    pub(crate) fn join_at(&mut self, now: DateTime<Utc>) {
        self.last_join = now;
        self.online = true;
    }

    /// Fold the current session into the frozen accumulation.
    pub fn exit(&mut self) {
        self.exit_at(Utc::now());
    }

    pub(crate) fn exit_at(&mut self, now: DateTime<Utc>) {
        if self.online {
            self.accumulated_secs += (now - self.last_join).num_seconds().max(0) as u64;
        }
        self.online = false;
    }

    /// Effective total playtime: the frozen accumulation, plus the running
    /// session while online.
    pub fn total_playtime_secs(&self) -> u64 {
        self.total_playtime_at(Utc::now())
    }

    pub(crate) fn total_playtime_at(&self, now: DateTime<Utc>) -> u64 {
        self.accumulated_secs + self.session_elapsed_at(now)
    }

    /// Elapsed seconds of the current session; zero while offline.
    pub fn session_elapsed_secs(&self) -> u64 {
        self.session_elapsed_at(Utc::now())
    }

    pub(crate) fn session_elapsed_at(&self, now: DateTime<Utc>) -> u64 {
        if self.online {
            (now - self.last_join).num_seconds().max(0) as u64
        } else {
            0
        }
    }

    pub fn set_nickname(&mut self, nickname: impl Into<String>) {
        self.nickname = nickname.into();
    }

    /// Nickname when set, identity otherwise.
    pub fn display_name(&self) -> &str {
        if self.nickname.is_empty() {
            &self.ident
        } else {
            &self.nickname
        }
    }

    // All mute mutation goes through these two; the history is never
    // manipulated directly.

    pub fn mute(&mut self, source: &str, reason: &str) -> bool {
        self.mutes.mute(source, reason)
    }

    pub fn unmute(&mut self, source: &str) -> bool {
        self.mutes.unmute(source)
    }

    pub fn is_muted(&self) -> bool {
        self.mutes.is_muted()
    }

    pub fn last_mute(&self) -> Option<&MuteRecord> {
        self.mutes.last_record()
    }

    pub fn mute_history(&self) -> &MuteHistory {
        &self.mutes
    }

    /// Replace the history wholesale with persisted records. Join-time
    /// seeding only.
    pub fn restore_mutes(&mut self, records: Vec<MuteRecord>) {
        self.mutes = MuteHistory::from_records(records);
    }
}

impl fmt::Display for UserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UserSession(ident={}, online={}, muted={})",
            self.ident,
            self.online,
            self.is_muted()
        )
    }
}
