//! HTTP routes: thin JSON handlers over the service and command layers.

use crate::commands;
use crate::error::ApiError;
use crate::service::{self, ChatDecision, JoinOutcome};
use crate::state::AppState;
use crate::tabs::TabView;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use cd_core::context::{PlayerAttrs, ServerStats};
use cd_session::CONSOLE_IDENT;
use serde::Deserialize;
use serde_json::{json, Value};

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(event_routes())
        .merge(command_routes())
        .merge(log_routes())
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/event/join", post(join_event))
        .route("/api/v1/event/exit", post(exit_event))
        .route("/api/v1/event/chat", post(chat_event))
}

fn command_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/command/mute", post(mute_cmd))
        .route("/api/v1/command/unmute", post(unmute_cmd))
        .route("/api/v1/command/nickname", post(nickname_cmd))
        .route("/api/v1/command/reload", post(reload_cmd))
}

fn log_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/log/chat/{ident}", get(chat_log))
        .route("/api/v1/log/mute/{ident}", get(mute_log))
        .route("/api/v1/tab", get(tab_view))
}

#[derive(Debug, Deserialize)]
struct EventBody {
    ident: String,
    #[serde(default)]
    attrs: PlayerAttrs,
    #[serde(default)]
    stats: ServerStats,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModerationBody {
    /// Defaults to the console pseudo-identity.
    source: Option<String>,
    target: String,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    attrs: PlayerAttrs,
    #[serde(default)]
    stats: ServerStats,
}

#[derive(Debug, Deserialize)]
struct NicknameBody {
    ident: String,
    nickname: String,
    #[serde(default)]
    attrs: PlayerAttrs,
}

#[derive(Debug, Deserialize)]
struct ReloadBody {
    path: String,
}

#[derive(Debug, Deserialize)]
struct LogQuery {
    limit: Option<usize>,
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "sessions": state.registry.count(),
    }))
}

async fn join_event(State(state): State<AppState>, Json(body): Json<EventBody>) -> Json<JoinOutcome> {
    Json(service::handle_join(&state, &body.ident, body.attrs, body.stats).await)
}

async fn exit_event(State(state): State<AppState>, Json(body): Json<EventBody>) -> Json<Value> {
    let playtime = service::handle_exit(&state, &body.ident).await;
    Json(json!({ "known": playtime.is_some(), "playtime_secs": playtime }))
}

async fn chat_event(State(state): State<AppState>, Json(body): Json<EventBody>) -> Json<ChatDecision> {
    let text = body.message.unwrap_or_default();
    Json(service::handle_chat(&state, &body.ident, body.attrs, body.stats, text).await)
}

async fn mute_cmd(State(state): State<AppState>, Json(body): Json<ModerationBody>) -> Json<commands::CommandReply> {
    let source = body.source.as_deref().unwrap_or(CONSOLE_IDENT);
    Json(commands::mute(&state, source, &body.target, &body.reason, body.attrs, body.stats).await)
}

async fn unmute_cmd(State(state): State<AppState>, Json(body): Json<ModerationBody>) -> Json<commands::CommandReply> {
    let source = body.source.as_deref().unwrap_or(CONSOLE_IDENT);
    Json(commands::unmute(&state, source, &body.target, body.attrs, body.stats).await)
}

async fn nickname_cmd(State(state): State<AppState>, Json(body): Json<NicknameBody>) -> Json<commands::CommandReply> {
    Json(commands::nickname(&state, &body.ident, &body.nickname, body.attrs).await)
}

async fn reload_cmd(State(state): State<AppState>, Json(body): Json<ReloadBody>) -> Json<commands::CommandReply> {
    Json(commands::reload(&state, std::path::Path::new(&body.path)))
}

async fn chat_log(
    State(state): State<AppState>,
    Path(ident): Path<String>,
    Query(query): Query<LogQuery>,
) -> Result<Json<Value>, ApiError> {
    let entries = commands::chat_log(&state, &ident, query.limit.unwrap_or(50)).await?;
    Ok(Json(json!({ "ident": ident, "entries": entries })))
}

async fn mute_log(State(state): State<AppState>, Path(ident): Path<String>) -> Result<Json<Value>, ApiError> {
    let records = commands::mute_log(&state, &ident).await?;
    Ok(Json(json!({ "ident": ident, "records": records })))
}

async fn tab_view(State(state): State<AppState>) -> Json<TabView> {
    Json(state.tabs.view())
}
