//! Assembles the read-only message context for one resolution pass.
//!
//! Reads the current config snapshot, clones the target's session state,
//! and resolves mute source identities to display names through the
//! registry, so handlers never need registry access of their own.

use crate::registry::UserRegistry;
use cd_core::config::DecoratorConfig;
use cd_core::context::{GlobalFormat, MessageContext, MuteView, PlayerAttrs, ServerStats};

pub fn build_context(
    registry: &UserRegistry,
    config: &DecoratorConfig,
    ident: &str,
    attrs: PlayerAttrs,
    stats: ServerStats,
    message: Option<String>,
) -> MessageContext {
    let session = registry.get(ident);

    let mute = session.as_ref().and_then(|s| {
        s.last_mute().map(|record| MuteView {
            source_name: registry.display_name(&record.source),
            reason: Some(record.reason.clone()),
            muted_at: Some(record.muted_at),
            unmute_source_name: record
                .unmute_source
                .as_deref()
                .and_then(|source| registry.display_name(source)),
            unmuted_at: record.unmuted_at,
        })
    });

    let nickname = session
        .as_ref()
        .map(|s| s.nickname.clone())
        .filter(|n| !n.is_empty());

    MessageContext {
        ident: ident.to_string(),
        nickname,
        first_join: session.as_ref().map(|s| s.first_join),
        last_join: session.as_ref().map(|s| s.last_join),
        playtime_secs: session.as_ref().map(|s| s.total_playtime_secs()),
        session_secs: session.as_ref().map(|s| s.session_elapsed_secs()),
        message,
        attrs,
        stats,
        mute,
        format: GlobalFormat::from_config(config),
    }
}
