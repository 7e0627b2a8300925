//! Built-in placeholder catalog.
//!
//! Identity: `username`, `nickname`
//! Timing: `joindate`, `lastdate`, `playtime`, `session_playtime`
//! Player: `locale`, `loc_x`, `loc_y`, `loc_z`, `maxhealth`, `currenthealth`, `ping`
//! Chat: `message`
//! Server clock: `serverdatetime`, `serverdate`, `servertime`
//! Server stats: `tps`, `cpuload`, `online_count`,
//!   `mem_used` / `mem_free` / `mem_total` (+ `_mb` / `_gb`)
//! Moderation: `mute_source_name`, `mute_reason`, `mute_datetime`,
//!   `unmute_source_name`, `unmute_datetime`

use crate::token::Token;
use crate::traits::PlaceholderHandler;
use cd_core::timefmt;
use cd_core::MessageContext;
use chrono::Utc;

const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * 1024 * 1024;

/// Handler for every unnamespaced key; any key outside the catalog resolves
/// to no value.
pub struct BuiltinHandler;

fn scaled(bytes: Option<u64>, unit: u64) -> Option<String> {
    bytes.map(|b| (b / unit).to_string())
}

impl PlaceholderHandler for BuiltinHandler {
    fn name(&self) -> &str {
        "builtin"
    }

    fn matches(&self, token: &Token) -> bool {
        !token.is_namespaced()
    }

    fn resolve(&self, token: &Token, ctx: &MessageContext) -> Option<String> {
        let fmt = &ctx.format;
        match token.key.as_str() {
            "username" => Some(ctx.attrs.username.clone()),
            "nickname" => ctx.nickname.clone(),

            "joindate" => ctx.first_join.map(|at| timefmt::format_datetime(at, &fmt.datetime_format)),
            "lastdate" => ctx.last_join.map(|at| timefmt::format_datetime(at, &fmt.datetime_format)),
            "playtime" => ctx.playtime_secs.map(|secs| (secs / 60).to_string()),
            "session_playtime" => ctx.session_secs.map(|secs| (secs / 60).to_string()),

            "locale" => ctx.attrs.locale.clone(),
            "loc_x" => ctx.attrs.position.map(|p| p[0].to_string()),
            "loc_y" => ctx.attrs.position.map(|p| p[1].to_string()),
            "loc_z" => ctx.attrs.position.map(|p| p[2].to_string()),
            "maxhealth" => ctx.attrs.max_health.map(|h| h.to_string()),
            "currenthealth" => ctx.attrs.current_health.map(|h| h.to_string()),
            "ping" => ctx.attrs.ping_ms.map(|ms| ms.to_string()),

            "message" => ctx.message.clone(),

            "serverdatetime" => Some(timefmt::format_datetime(Utc::now(), &fmt.datetime_format)),
            "serverdate" => Some(timefmt::format_date(Utc::now(), &fmt.date_format)),
            "servertime" => Some(timefmt::format_time(Utc::now(), &fmt.time_format)),

            "tps" => ctx.stats.tps.map(|tps| format!("{tps:.1}")),
            "cpuload" => ctx.stats.cpu_load.map(|load| format!("{:.1}", load * 100.0)),
            "online_count" => ctx.stats.online_count.map(|n| n.to_string()),
            "mem_used" => ctx.stats.mem_used().map(|b| b.to_string()),
            "mem_free" => ctx.stats.mem_free.map(|b| b.to_string()),
            "mem_total" => ctx.stats.mem_total.map(|b| b.to_string()),
            "mem_used_mb" => scaled(ctx.stats.mem_used(), MIB),
            "mem_free_mb" => scaled(ctx.stats.mem_free, MIB),
            "mem_total_mb" => scaled(ctx.stats.mem_total, MIB),
            "mem_used_gb" => scaled(ctx.stats.mem_used(), GIB),
            "mem_free_gb" => scaled(ctx.stats.mem_free, GIB),
            "mem_total_gb" => scaled(ctx.stats.mem_total, GIB),

            // All five derive from the most recent record, open or closed,
            // so an unmute notice can still reference the mute before it.
            "mute_source_name" => ctx.mute.as_ref().and_then(|m| m.source_name.clone()),
            "mute_reason" => ctx.mute.as_ref().and_then(|m| m.reason.clone()),
            "mute_datetime" => ctx
                .mute
                .as_ref()
                .and_then(|m| m.muted_at)
                .map(|at| timefmt::format_datetime(at, &fmt.datetime_format)),
            "unmute_source_name" => ctx.mute.as_ref().and_then(|m| m.unmute_source_name.clone()),
            "unmute_datetime" => ctx
                .mute
                .as_ref()
                .and_then(|m| m.unmuted_at)
                .map(|at| timefmt::format_datetime(at, &fmt.datetime_format)),

            _ => None,
        }
    }
}
