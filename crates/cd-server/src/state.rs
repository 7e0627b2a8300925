//! Application state shared across handlers and the background task.

use crate::tabs::TabDecorator;
use cd_core::{ConfigStore, DecoratorConfig};
use cd_parser::TemplateParser;
use cd_session::UserRegistry;
use cd_storage::Storage;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: ConfigStore,
    pub registry: Arc<UserRegistry>,
    pub parser: Arc<TemplateParser>,
    pub storage: Arc<dyn Storage>,
    pub tabs: Arc<TabDecorator>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: DecoratorConfig, parser: TemplateParser, storage: Arc<dyn Storage>) -> Self {
        Self {
            config: ConfigStore::new(config),
            registry: Arc::new(UserRegistry::new()),
            parser: Arc::new(parser),
            storage,
            tabs: Arc::new(TabDecorator::new()),
            start_time: std::time::Instant::now(),
        }
    }
}
