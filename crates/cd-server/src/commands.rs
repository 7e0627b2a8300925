//! Moderation and utility command executors.
//!
//! Boolean failures from the state machine surface here as user-facing
//! replies; the command source decides nothing about mute semantics.

use crate::service::refresh_tab_entry;
use crate::state::AppState;
use cd_core::context::{PlayerAttrs, ServerStats};
use cd_core::Result;
use cd_session::{build_context, MuteRecord};
use cd_storage::{ChatLogEntry, Storage};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Reply to the command source, plus an optional notice for the target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandReply {
    pub ok: bool,
    pub reply: String,
    pub target_notice: Option<String>,
}

impl CommandReply {
    fn ok(reply: impl Into<String>) -> Self {
        Self { ok: true, reply: reply.into(), target_notice: None }
    }

    fn failed(reply: impl Into<String>) -> Self {
        Self { ok: false, reply: reply.into(), target_notice: None }
    }

    fn with_notice(mut self, notice: String) -> Self {
        self.target_notice = Some(notice);
        self
    }
}

async fn persist_mutes(state: &AppState, target: &str) {
    let records = state
        .registry
        .get(target)
        .map(|s| s.mute_history().records().to_vec())
        .unwrap_or_default();
    if let Err(e) = state.storage.save_mutes(target, &records).await {
        warn!(target, error = %e, "mute history save failed");
    }
}

pub async fn mute(
    state: &AppState,
    source: &str,
    target: &str,
    reason: &str,
    attrs: PlayerAttrs,
    stats: ServerStats,
) -> CommandReply {
    info!(source, target, reason, "mute command");
    if !state.registry.mute(target, source, reason) {
        return CommandReply::failed("Could not mute: user is unknown or already muted.");
    }
    persist_mutes(state, target).await;

    let config = state.config.current();
    let ctx = build_context(&state.registry, &config, target, attrs, stats, None);
    let notice = state.parser.parse(&config.mute.mute_template, &ctx);
    CommandReply::ok("User muted.").with_notice(notice)
}

pub async fn unmute(
    state: &AppState,
    source: &str,
    target: &str,
    attrs: PlayerAttrs,
    stats: ServerStats,
) -> CommandReply {
    info!(source, target, "unmute command");
    if !state.registry.unmute(target, source) {
        return CommandReply::failed("Could not unmute: user is unknown or not muted.");
    }
    persist_mutes(state, target).await;

    let config = state.config.current();
    let ctx = build_context(&state.registry, &config, target, attrs, stats, None);
    let notice = state.parser.parse(&config.mute.unmute_template, &ctx);
    CommandReply::ok("User unmuted.").with_notice(notice)
}

pub async fn nickname(state: &AppState, ident: &str, nickname: &str, attrs: PlayerAttrs) -> CommandReply {
    info!(ident, nickname, "nickname command");
    if !state.registry.set_nickname(ident, nickname) {
        return CommandReply::failed("Could not set nickname: user is unknown.");
    }
    if let Err(e) = state.storage.set_nickname(ident, nickname).await {
        warn!(ident, error = %e, "nickname save failed");
    }
    refresh_tab_entry(state, ident, &attrs);
    CommandReply::ok("Nickname set.")
}

/// Mute history for one identity: the in-memory session when present,
/// otherwise the persisted document.
pub async fn mute_log(state: &AppState, ident: &str) -> Result<Vec<MuteRecord>> {
    if let Some(session) = state.registry.get(ident) {
        return Ok(session.mute_history().records().to_vec());
    }
    let doc = state.storage.load_user(ident).await?;
    Ok(doc.map(|d| d.mutes).unwrap_or_default())
}

pub async fn chat_log(state: &AppState, ident: &str, limit: usize) -> Result<Vec<ChatLogEntry>> {
    state.storage.chat_log(ident, limit).await
}

/// Swap in the on-disk configuration; effective on the next resolution pass.
pub fn reload(state: &AppState, path: &Path) -> CommandReply {
    match state.config.reload_from(path) {
        Ok(()) => CommandReply::ok("Configuration reloaded."),
        Err(e) => {
            warn!(error = %e, "config reload failed");
            CommandReply::failed(format!("Reload failed: {e}"))
        }
    }
}
