//! Ordered handler chain.

use crate::token::Token;
use crate::traits::PlaceholderHandler;
use cd_core::{DecoError, MessageContext, Result};
use tracing::debug;

/// Handlers in registration order; order is dispatch priority and is fixed
/// for the process lifetime.
#[derive(Default)]
pub struct HandlerChain {
    handlers: Vec<Box<dyn PlaceholderHandler>>,
}

impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Box<dyn PlaceholderHandler>) -> Result<()> {
        if self.handlers.iter().any(|h| h.name() == handler.name()) {
            return Err(DecoError::DuplicateHandler { name: handler.name().to_string() });
        }
        debug!(name = handler.name(), "registered placeholder handler");
        self.handlers.push(handler);
        Ok(())
    }

    /// The first handler whose predicate matches resolves the token; later
    /// handlers are never consulted, even when the result is no value.
    pub fn resolve(&self, token: &Token, ctx: &MessageContext) -> Option<String> {
        let handler = self.handlers.iter().find(|h| h.matches(token))?;
        handler.resolve(token, ctx)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
