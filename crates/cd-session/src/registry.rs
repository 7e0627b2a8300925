//! Process-lifetime registry of user sessions.

use crate::mute::MuteRecord;
use crate::user::UserSession;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info};

/// Reserved pseudo-identity for the administrative console.
pub const CONSOLE_IDENT: &str = "@console";
/// Reserved pseudo-identity for moderation sources that cannot be mapped to
/// a real session.
pub const UNKNOWN_IDENT: &str = "@unknown";

const CONSOLE_NAME: &str = "Server console";
const UNKNOWN_NAME: &str = "Unknown source";

/// The shared mutable state all handlers and commands read.
///
/// Sessions are kept after disconnect. The map lock serializes mute and
/// unmute transitions per identity, which is what preserves the
/// single-open-record invariant under concurrent command execution.
pub struct UserRegistry {
    sessions: Mutex<HashMap<String, UserSession>>,
}

impl UserRegistry {
    /// Registry seeded with the two reserved pseudo-identities; they always
    /// exist and can never be removed.
    pub fn new() -> Self {
        let mut sessions = HashMap::new();
        sessions.insert(CONSOLE_IDENT.to_string(), UserSession::new(CONSOLE_IDENT));
        sessions.insert(UNKNOWN_IDENT.to_string(), UserSession::new(UNKNOWN_IDENT));
        Self { sessions: Mutex::new(sessions) }
    }

    pub fn get(&self, ident: &str) -> Option<UserSession> {
        self.sessions.lock().unwrap().get(ident).cloned()
    }

    pub fn contains(&self, ident: &str) -> bool {
        self.sessions.lock().unwrap().contains_key(ident)
    }

    pub fn find_or_create(&self, ident: &str) -> UserSession {
        self.sessions
            .lock()
            .unwrap()
            .entry(ident.to_string())
            .or_insert_with(|| UserSession::new(ident))
            .clone()
    }

    /// Insert a storage-seeded session unless one already exists in memory;
    /// the in-memory session stays authoritative on rejoin.
    pub fn seed(&self, session: UserSession) {
        self.sessions
            .lock()
            .unwrap()
            .entry(session.ident.clone())
            .or_insert(session);
    }

    /// Mark the identity online, creating the session on first-ever join.
    pub fn join(&self, ident: &str) -> UserSession {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .entry(ident.to_string())
            .or_insert_with(|| UserSession::new(ident));
        session.join();
        debug!(ident, "user joined");
        session.clone()
    }

    /// Freeze playtime and mark the identity offline.
    pub fn exit(&self, ident: &str) -> Option<UserSession> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions.get_mut(ident)?;
        session.exit();
        info!(ident, playtime_secs = session.accumulated_secs, "user exited");
        Some(session.clone())
    }

    /// Run a closure against one session under the registry lock.
    pub fn update<R>(&self, ident: &str, f: impl FnOnce(&mut UserSession) -> R) -> Option<R> {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.get_mut(ident).map(f)
    }

    pub fn mute(&self, target: &str, source: &str, reason: &str) -> bool {
        let ok = self.update(target, |s| s.mute(source, reason)).unwrap_or(false);
        info!(target, source, ok, "mute");
        ok
    }

    pub fn unmute(&self, target: &str, source: &str) -> bool {
        let ok = self.update(target, |s| s.unmute(source)).unwrap_or(false);
        info!(target, source, ok, "unmute");
        ok
    }

    /// False when the session is absent.
    pub fn set_nickname(&self, ident: &str, nickname: &str) -> bool {
        self.update(ident, |s| s.set_nickname(nickname)).is_some()
    }

    pub fn last_mute(&self, ident: &str) -> Option<MuteRecord> {
        self.sessions
            .lock()
            .unwrap()
            .get(ident)
            .and_then(|s| s.last_mute().cloned())
    }

    /// Display name for any identity, reserved pseudo-identities included.
    pub fn display_name(&self, ident: &str) -> Option<String> {
        match ident {
            CONSOLE_IDENT => Some(CONSOLE_NAME.to_string()),
            UNKNOWN_IDENT => Some(UNKNOWN_NAME.to_string()),
            _ => self.get(ident).map(|s| s.display_name().to_string()),
        }
    }

    pub fn online_idents(&self) -> Vec<String> {
        self.sessions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.online)
            .map(|s| s.ident.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

impl Default for UserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
