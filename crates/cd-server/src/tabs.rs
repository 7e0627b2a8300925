//! Tab-list decoration.
//!
//! The display-name cache is written by the main event flow (join, exit,
//! nickname) and read by the periodic refresh task — one concurrent
//! reader/writer pair, so every piece of shared state lives behind a lock.
//! Header and footer template lists rotate one step per tick.

use crate::state::AppState;
use cd_core::context::{PlayerAttrs, ServerStats};
use cd_core::DecoratorConfig;
use cd_parser::TemplateParser;
use cd_session::{build_context, UserRegistry, CONSOLE_IDENT};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use tracing::{debug, info};

/// Rendered tab state for one refresh tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TabView {
    pub header: String,
    pub footer: String,
    /// ident -> rendered display entry
    pub entries: HashMap<String, String>,
}

pub struct TabDecorator {
    entries: RwLock<HashMap<String, String>>,
    header_pos: AtomicUsize,
    footer_pos: AtomicUsize,
    view: RwLock<TabView>,
}

impl TabDecorator {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            header_pos: AtomicUsize::new(0),
            footer_pos: AtomicUsize::new(0),
            view: RwLock::new(TabView::default()),
        }
    }

    pub fn set_entry(&self, ident: &str, rendered: String) {
        self.entries.write().unwrap().insert(ident.to_string(), rendered);
    }

    pub fn remove_entry(&self, ident: &str) {
        self.entries.write().unwrap().remove(ident);
    }

    pub fn entry(&self, ident: &str) -> Option<String> {
        self.entries.read().unwrap().get(ident).cloned()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// The view rendered by the most recent tick.
    pub fn view(&self) -> TabView {
        self.view.read().unwrap().clone()
    }

    fn rotate(pos: &AtomicUsize, templates: &[String]) -> String {
        if templates.is_empty() {
            return String::new();
        }
        let index = pos.load(Ordering::Relaxed) % templates.len();
        pos.store((index + 1) % templates.len(), Ordering::Relaxed);
        templates[index].clone()
    }

    /// Advance the rotation and render one tick.
    ///
    /// Header and footer are rendered against a server-level context; the
    /// per-user entries come from the cache maintained by the event flow.
    pub fn tick(
        &self,
        config: &DecoratorConfig,
        parser: &TemplateParser,
        registry: &UserRegistry,
    ) -> TabView {
        let header_template = Self::rotate(&self.header_pos, &config.tab.headers);
        let footer_template = Self::rotate(&self.footer_pos, &config.tab.footers);

        let stats = ServerStats {
            online_count: Some(registry.online_idents().len()),
            ..ServerStats::default()
        };
        let ctx = build_context(registry, config, CONSOLE_IDENT, PlayerAttrs::default(), stats, None);

        let view = TabView {
            header: parser.parse(&header_template, &ctx),
            footer: parser.parse(&footer_template, &ctx),
            entries: self.entries.read().unwrap().clone(),
        };
        debug!(entries = view.entries.len(), "tab tick");
        *self.view.write().unwrap() = view.clone();
        view
    }
}

impl Default for TabDecorator {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the periodic refresh task. The interval and the enable toggle are
/// re-read from the config store every tick, so a reload applies without a
/// restart.
pub fn spawn_refresh(state: AppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!("tab decoration task started");
        loop {
            let config = state.config.current();
            if config.tab.enabled {
                state.tabs.tick(&config, &state.parser, &state.registry);
            }
            let interval = config.tab.refresh_ms.max(50);
            tokio::time::sleep(std::time::Duration::from_millis(interval)).await;
        }
    })
}
