//! Chat decoration service (Axum).
//!
//! Thin glue over the core engine: event routes build message contexts and
//! run them through the template parser, command routes drive the mute
//! state machine, and a background task refreshes the tab view.

pub mod commands;
pub mod error;
pub mod routes;
pub mod service;
pub mod state;
pub mod tabs;

use axum::Router;
use cd_parser::{BuiltinHandler, RankHandler, RankProvider, TemplateParser};
use cd_core::Result;
use state::AppState;
use std::sync::Arc;

/// Build the default parser: the built-in catalog first, then the rank
/// handler when a permission provider is available. Registration order is
/// dispatch priority and fixed for the process lifetime.
pub fn build_parser(provider: Option<Arc<dyn RankProvider>>) -> Result<TemplateParser> {
    let mut parser = TemplateParser::new();
    parser.register(Box::new(BuiltinHandler))?;
    if let Some(provider) = provider {
        parser.register(Box::new(RankHandler::new(provider)))?;
    }
    Ok(parser)
}

/// Build the application router over the given state.
pub fn app(state: AppState) -> Router {
    routes::router(state)
}

#[cfg(test)]
mod tests;
