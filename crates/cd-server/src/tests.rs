use crate::commands;
use crate::service;
use crate::state::AppState;
use crate::{app, build_parser};
use cd_core::context::{PlayerAttrs, ServerStats};
use cd_core::DecoratorConfig;
use cd_session::CONSOLE_IDENT;
use cd_storage::{ChatOutcome, JsonStore, Storage};
use std::sync::Arc;
use tempfile::TempDir;

fn attrs(name: &str) -> PlayerAttrs {
    PlayerAttrs { username: name.into(), ..PlayerAttrs::default() }
}

fn test_state(tmp: &TempDir) -> AppState {
    test_state_with(tmp, DecoratorConfig::default())
}

fn test_state_with(tmp: &TempDir, config: DecoratorConfig) -> AppState {
    let storage = Arc::new(JsonStore::new(tmp.path()));
    let parser = build_parser(None).unwrap();
    AppState::new(config, parser, storage)
}

// ========== Event Flows ==========

#[tokio::test]
async fn test_join_then_chat_decorates() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);

    let outcome = service::handle_join(&state, "u1", attrs("Alice"), ServerStats::default()).await;
    assert!(outcome.new_user);
    assert!(outcome.mute_notice.is_none());

    let decision =
        service::handle_chat(&state, "u1", attrs("Alice"), ServerStats::default(), "hello".into()).await;
    assert!(decision.delivered);
    assert_eq!(decision.rendered.as_deref(), Some("<Alice> : hello"));
}

#[tokio::test]
async fn test_chat_from_unknown_session_dropped() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);

    let decision =
        service::handle_chat(&state, "ghost", attrs("Ghost"), ServerStats::default(), "hi".into()).await;
    assert!(!decision.delivered);
    assert!(decision.rendered.is_none());
}

#[tokio::test]
async fn test_chat_while_offline_logged_not_delivered() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);

    service::handle_join(&state, "u1", attrs("Alice"), ServerStats::default()).await;
    service::handle_exit(&state, "u1").await;

    let decision =
        service::handle_chat(&state, "u1", attrs("Alice"), ServerStats::default(), "hi".into()).await;
    assert!(!decision.delivered);

    let log = state.storage.chat_log("u1", 10).await.unwrap();
    assert_eq!(log.last().unwrap().outcome, ChatOutcome::Offline);
}

#[tokio::test]
async fn test_exit_persists_playtime() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);

    service::handle_join(&state, "u1", attrs("Alice"), ServerStats::default()).await;
    let playtime = service::handle_exit(&state, "u1").await;
    assert!(playtime.is_some());

    let doc = state.storage.load_user("u1").await.unwrap().unwrap();
    assert_eq!(doc.user.playtime_secs, playtime.unwrap());
}

#[tokio::test]
async fn test_exit_unknown_session() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);
    assert!(service::handle_exit(&state, "ghost").await.is_none());
}

#[tokio::test]
async fn test_welcome_message_for_new_user() {
    let tmp = TempDir::new().unwrap();
    let mut config = DecoratorConfig::default();
    config.welcome.enabled = true;
    config.welcome.template = "Welcome, %username%!".into();
    let state = test_state_with(&tmp, config);

    let outcome = service::handle_join(&state, "u1", attrs("Alice"), ServerStats::default()).await;
    assert_eq!(outcome.greeting.as_deref(), Some("Welcome, Alice!"));
}

#[tokio::test]
async fn test_join_message_for_returning_user() {
    let tmp = TempDir::new().unwrap();
    let mut config = DecoratorConfig::default();
    config.join.enabled = true;
    config.join.template = "%username% is back".into();
    let state = test_state_with(&tmp, config);

    service::handle_join(&state, "u1", attrs("Alice"), ServerStats::default()).await;
    service::handle_exit(&state, "u1").await;
    let outcome = service::handle_join(&state, "u1", attrs("Alice"), ServerStats::default()).await;
    assert!(!outcome.new_user);
    assert_eq!(outcome.greeting.as_deref(), Some("Alice is back"));
}

// ========== Mute Flow ==========

#[tokio::test]
async fn test_mute_blocks_chat_with_notice() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);

    service::handle_join(&state, "u1", attrs("Alice"), ServerStats::default()).await;

    let reply = commands::mute(
        &state,
        CONSOLE_IDENT,
        "u1",
        "spam",
        attrs("Alice"),
        ServerStats::default(),
    )
    .await;
    assert!(reply.ok);
    let notice = reply.target_notice.unwrap();
    assert!(notice.contains("Server console"));
    assert!(notice.contains("spam"));

    let decision =
        service::handle_chat(&state, "u1", attrs("Alice"), ServerStats::default(), "hey".into()).await;
    assert!(!decision.delivered);
    let ignore = decision.notice.unwrap();
    assert!(ignore.contains("Server console"));
    assert!(ignore.contains("spam"));

    let log = state.storage.chat_log("u1", 10).await.unwrap();
    assert_eq!(log.last().unwrap().outcome, ChatOutcome::Muted);
}

#[tokio::test]
async fn test_double_mute_fails() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);
    service::handle_join(&state, "u1", attrs("Alice"), ServerStats::default()).await;

    let first = commands::mute(&state, CONSOLE_IDENT, "u1", "spam", attrs("Alice"), ServerStats::default()).await;
    let second = commands::mute(&state, CONSOLE_IDENT, "u1", "again", attrs("Alice"), ServerStats::default()).await;
    assert!(first.ok);
    assert!(!second.ok);

    let records = commands::mute_log(&state, "u1").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].reason, "spam");
}

#[tokio::test]
async fn test_unmute_restores_chat_and_keeps_record() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);
    service::handle_join(&state, "u1", attrs("Alice"), ServerStats::default()).await;

    commands::mute(&state, CONSOLE_IDENT, "u1", "spam", attrs("Alice"), ServerStats::default()).await;
    let reply = commands::unmute(&state, CONSOLE_IDENT, "u1", attrs("Alice"), ServerStats::default()).await;
    assert!(reply.ok);
    assert!(reply.target_notice.unwrap().contains("Server console"));

    let decision =
        service::handle_chat(&state, "u1", attrs("Alice"), ServerStats::default(), "back".into()).await;
    assert!(decision.delivered);

    // The closed record still answers moderation placeholders.
    let records = commands::mute_log(&state, "u1").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source, CONSOLE_IDENT);
    assert!(records[0].is_closed());
}

#[tokio::test]
async fn test_unmute_without_mute_fails() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);
    service::handle_join(&state, "u1", attrs("Alice"), ServerStats::default()).await;

    let reply = commands::unmute(&state, CONSOLE_IDENT, "u1", attrs("Alice"), ServerStats::default()).await;
    assert!(!reply.ok);
    assert!(reply.target_notice.is_none());
}

#[tokio::test]
async fn test_mute_survives_restart_via_storage() {
    let tmp = TempDir::new().unwrap();
    {
        let state = test_state(&tmp);
        service::handle_join(&state, "u1", attrs("Alice"), ServerStats::default()).await;
        commands::mute(&state, CONSOLE_IDENT, "u1", "spam", attrs("Alice"), ServerStats::default()).await;
        service::handle_exit(&state, "u1").await;
    }

    // Fresh state over the same storage root: the join seeds the session
    // from disk and the joiner is still muted.
    let state = test_state(&tmp);
    let outcome = service::handle_join(&state, "u1", attrs("Alice"), ServerStats::default()).await;
    assert!(!outcome.new_user);
    let notice = outcome.mute_notice.unwrap();
    assert!(notice.contains("spam"));

    let decision =
        service::handle_chat(&state, "u1", attrs("Alice"), ServerStats::default(), "hi".into()).await;
    assert!(!decision.delivered);
}

#[tokio::test]
async fn test_mute_disabled_by_config() {
    let tmp = TempDir::new().unwrap();
    let mut config = DecoratorConfig::default();
    config.mute.enabled = false;
    let state = test_state_with(&tmp, config);

    service::handle_join(&state, "u1", attrs("Alice"), ServerStats::default()).await;
    commands::mute(&state, CONSOLE_IDENT, "u1", "spam", attrs("Alice"), ServerStats::default()).await;

    // The state machine still transitioned, but chat is not intercepted.
    let decision =
        service::handle_chat(&state, "u1", attrs("Alice"), ServerStats::default(), "hi".into()).await;
    assert!(decision.delivered);
}

// ========== Nickname ==========

#[tokio::test]
async fn test_nickname_command() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);
    service::handle_join(&state, "u1", attrs("Alice"), ServerStats::default()).await;

    let reply = commands::nickname(&state, "u1", "Ace", attrs("Alice")).await;
    assert!(reply.ok);
    assert_eq!(state.registry.display_name("u1").unwrap(), "Ace");
    assert_eq!(state.storage.load_user("u1").await.unwrap().unwrap().nickname, "Ace");

    let reply = commands::nickname(&state, "ghost", "X", attrs("Ghost")).await;
    assert!(!reply.ok);
}

#[tokio::test]
async fn test_nickname_restored_on_rejoin() {
    let tmp = TempDir::new().unwrap();
    {
        let state = test_state(&tmp);
        service::handle_join(&state, "u1", attrs("Alice"), ServerStats::default()).await;
        commands::nickname(&state, "u1", "Ace", attrs("Alice")).await;
    }

    let state = test_state(&tmp);
    service::handle_join(&state, "u1", attrs("Alice"), ServerStats::default()).await;
    assert_eq!(state.registry.get("u1").unwrap().nickname, "Ace");
}

// ========== Config Reload ==========

#[tokio::test]
async fn test_reload_applies_on_next_pass() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);
    service::handle_join(&state, "u1", attrs("Alice"), ServerStats::default()).await;

    let mut changed = DecoratorConfig::default();
    changed.chat.template = "[%username%] %message%".into();
    let path = tmp.path().join("config.json");
    changed.save(&path).unwrap();

    let reply = commands::reload(&state, &path);
    assert!(reply.ok);

    let decision =
        service::handle_chat(&state, "u1", attrs("Alice"), ServerStats::default(), "hi".into()).await;
    assert_eq!(decision.rendered.as_deref(), Some("[Alice] hi"));
}

#[tokio::test]
async fn test_reload_missing_file_fails() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);
    let reply = commands::reload(&state, &tmp.path().join("absent.json"));
    assert!(!reply.ok);
}

// ========== Tab Decoration ==========

#[tokio::test]
async fn test_tab_entry_follows_join_and_nickname() {
    let tmp = TempDir::new().unwrap();
    let mut config = DecoratorConfig::default();
    config.tab.entry_template = "%nickname%".into();
    let state = test_state_with(&tmp, config);

    service::handle_join(&state, "u1", attrs("Alice"), ServerStats::default()).await;
    // No nickname yet: empty default keeps the literal token.
    assert_eq!(state.tabs.entry("u1").unwrap(), "%nickname%");

    commands::nickname(&state, "u1", "Ace", attrs("Alice")).await;
    assert_eq!(state.tabs.entry("u1").unwrap(), "Ace");

    service::handle_exit(&state, "u1").await;
    assert!(state.tabs.entry("u1").is_none());
}

#[tokio::test]
async fn test_tab_rotation_wraps() {
    let tmp = TempDir::new().unwrap();
    let mut config = DecoratorConfig::default();
    config.tab.headers = vec!["one".into(), "two".into()];
    config.tab.footers = vec!["only".into()];
    let state = test_state_with(&tmp, config);
    let config = state.config.current();

    let first = state.tabs.tick(&config, &state.parser, &state.registry);
    let second = state.tabs.tick(&config, &state.parser, &state.registry);
    let third = state.tabs.tick(&config, &state.parser, &state.registry);

    assert_eq!(first.header, "one");
    assert_eq!(second.header, "two");
    assert_eq!(third.header, "one");
    assert_eq!(first.footer, "only");
    assert_eq!(second.footer, "only");
}

#[tokio::test]
async fn test_tab_tick_renders_online_count() {
    let tmp = TempDir::new().unwrap();
    let mut config = DecoratorConfig::default();
    config.tab.headers = vec!["online: %online_count%".into()];
    let state = test_state_with(&tmp, config);

    service::handle_join(&state, "u1", attrs("Alice"), ServerStats::default()).await;
    service::handle_join(&state, "u2", attrs("Bob"), ServerStats::default()).await;

    let config = state.config.current();
    let view = state.tabs.tick(&config, &state.parser, &state.registry);
    assert_eq!(view.header, "online: 2");
    assert_eq!(view.entries.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_tab_refresh_task_ticks() {
    let tmp = TempDir::new().unwrap();
    let mut config = DecoratorConfig::default();
    config.tab.enabled = true;
    config.tab.headers = vec!["the header".into()];
    let state = test_state_with(&tmp, config);

    let handle = crate::tabs::spawn_refresh(state.clone());
    tokio::time::sleep(std::time::Duration::from_millis(2500)).await;
    assert_eq!(state.tabs.view().header, "the header");
    handle.abort();
}

// ========== HTTP Surface ==========

#[tokio::test]
async fn test_router_builds() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);
    let _router = app(state);
}

#[tokio::test]
async fn test_build_parser_rejects_duplicate_registration() {
    use cd_parser::BuiltinHandler;
    let mut parser = build_parser(None).unwrap();
    assert!(parser.register(Box::new(BuiltinHandler)).is_err());
}
