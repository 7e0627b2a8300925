//! Join, exit, and chat event flows.
//!
//! Each flow performs the in-memory transition first, then emits the
//! persistence delta; a failed write is logged and never rolls the
//! in-memory state back. Decisions are returned as data and the host
//! renders and delivers them.

use crate::state::AppState;
use cd_core::context::{PlayerAttrs, ServerStats};
use cd_session::{build_context, UserSession};
use cd_storage::{ChatLogEntry, ChatOutcome, Storage, StoredUser, UserDoc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Result of a join event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinOutcome {
    pub new_user: bool,
    /// Notice shown to a joiner who is still muted.
    pub mute_notice: Option<String>,
    /// Welcome (first-ever join) or join message, per config toggles.
    pub greeting: Option<String>,
}

/// Result of a chat event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatDecision {
    pub delivered: bool,
    /// Decorated chat line, when decoration is enabled and the line passed.
    pub rendered: Option<String>,
    /// Ignore notice sent back to a muted sender.
    pub notice: Option<String>,
}

/// Re-render one user's tab entry into the shared cache.
pub fn refresh_tab_entry(state: &AppState, ident: &str, attrs: &PlayerAttrs) {
    let config = state.config.current();
    let ctx = build_context(&state.registry, &config, ident, attrs.clone(), ServerStats::default(), None);
    let entry = state.parser.parse(&config.tab.entry_template, &ctx);
    state.tabs.set_entry(ident, entry);
}

pub async fn handle_join(
    state: &AppState,
    ident: &str,
    attrs: PlayerAttrs,
    stats: ServerStats,
) -> JoinOutcome {
    debug!(ident, "join event");
    let config = state.config.current();

    let stored = match state.storage.load_user(ident).await {
        Ok(doc) => doc,
        Err(e) => {
            warn!(ident, error = %e, "user load failed, treating as new");
            None
        }
    };

    let mut outcome = JoinOutcome::default();
    match stored {
        Some(doc) => {
            let mut session = UserSession::from_stored(
                ident,
                doc.user.first_join,
                doc.user.last_join,
                doc.user.playtime_secs,
            );
            session.set_nickname(doc.nickname);
            session.restore_mutes(doc.mutes);
            state.registry.seed(session);
            let session = state.registry.join(ident);

            if let Err(e) = state.storage.update_last_join(ident, session.last_join).await {
                warn!(ident, error = %e, "last-join update failed");
            }

            if config.mute.enabled && session.is_muted() {
                let ctx = build_context(&state.registry, &config, ident, attrs.clone(), stats.clone(), None);
                outcome.mute_notice = Some(state.parser.parse(&config.mute.chat_ignore_template, &ctx));
            }
            if config.join.enabled {
                let ctx = build_context(&state.registry, &config, ident, attrs.clone(), stats, None);
                outcome.greeting = Some(state.parser.parse(&config.join.template, &ctx));
            }
        }
        None => {
            info!(ident, "first-ever join");
            outcome.new_user = true;
            let session = state.registry.join(ident);

            let doc = UserDoc::new(StoredUser {
                ident: ident.to_string(),
                first_join: session.first_join,
                last_join: session.last_join,
                playtime_secs: 0,
            });
            if let Err(e) = state.storage.save_user(&doc).await {
                warn!(ident, error = %e, "new user save failed");
            }

            if config.welcome.enabled {
                let ctx = build_context(&state.registry, &config, ident, attrs.clone(), stats, None);
                outcome.greeting = Some(state.parser.parse(&config.welcome.template, &ctx));
            }
        }
    }

    refresh_tab_entry(state, ident, &attrs);
    outcome
}

/// Freeze playtime, persist it, and drop the tab entry. Returns the frozen
/// total, or `None` when the session is unknown.
pub async fn handle_exit(state: &AppState, ident: &str) -> Option<u64> {
    debug!(ident, "exit event");
    let session = state.registry.exit(ident)?;

    if let Err(e) = state.storage.update_playtime(ident, session.accumulated_secs).await {
        warn!(ident, error = %e, "playtime update failed");
    }
    state.tabs.remove_entry(ident);
    Some(session.accumulated_secs)
}

pub async fn handle_chat(
    state: &AppState,
    ident: &str,
    attrs: PlayerAttrs,
    stats: ServerStats,
    text: String,
) -> ChatDecision {
    debug!(ident, "chat event");
    let config = state.config.current();

    let Some(session) = state.registry.get(ident) else {
        warn!(ident, "chat from unknown session");
        log_chat(state, ident, &text, ChatOutcome::Error).await;
        return ChatDecision { delivered: false, rendered: None, notice: None };
    };

    if !session.online {
        log_chat(state, ident, &text, ChatOutcome::Offline).await;
        return ChatDecision { delivered: false, rendered: None, notice: None };
    }

    if config.mute.enabled && session.is_muted() {
        log_chat(state, ident, &text, ChatOutcome::Muted).await;
        let ctx = build_context(&state.registry, &config, ident, attrs, stats, Some(text));
        let notice = state.parser.parse(&config.mute.chat_ignore_template, &ctx);
        return ChatDecision { delivered: false, rendered: None, notice: Some(notice) };
    }

    let rendered = if config.chat.enabled {
        let ctx = build_context(&state.registry, &config, ident, attrs, stats, Some(text.clone()));
        Some(state.parser.parse(&config.chat.template, &ctx))
    } else {
        None
    };

    log_chat(state, ident, &text, ChatOutcome::Delivered).await;
    ChatDecision { delivered: true, rendered, notice: None }
}

async fn log_chat(state: &AppState, ident: &str, text: &str, outcome: ChatOutcome) {
    let entry = ChatLogEntry::new(ident, text, outcome);
    if let Err(e) = state.storage.append_chat_log(&entry).await {
        warn!(ident, error = %e, "chat log write failed");
    }
}
