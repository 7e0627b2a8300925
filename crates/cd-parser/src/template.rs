//! The template parser.

use crate::chain::HandlerChain;
use crate::token::TokenScanner;
use crate::traits::PlaceholderHandler;
use cd_core::{MessageContext, Result};

/// Scans a template for placeholder tokens and substitutes resolved values.
///
/// Never fails on malformed input: text without a complete marker pair is
/// left untouched, and unresolved tokens fall back to the configured
/// default value or their literal text.
pub struct TemplateParser {
    scanner: TokenScanner,
    chain: HandlerChain,
}

impl TemplateParser {
    pub fn new() -> Self {
        Self {
            scanner: TokenScanner::new(),
            chain: HandlerChain::new(),
        }
    }

    /// Append a handler to the chain; registration order is priority.
    pub fn register(&mut self, handler: Box<dyn PlaceholderHandler>) -> Result<()> {
        self.chain.register(handler)
    }

    pub fn handler_count(&self) -> usize {
        self.chain.len()
    }

    pub fn parse(&self, template: &str, ctx: &MessageContext) -> String {
        let tokens = self.scanner.scan(template);
        if tokens.is_empty() {
            return template.to_string();
        }

        // The output is spliced from recorded spans: literal segments come
        // from the original template, values go in verbatim and are never
        // re-scanned, so a value containing `%` or formatting codes cannot
        // introduce new tokens or corrupt adjacent text.
        let mut out = String::with_capacity(template.len());
        let mut cursor = 0;
        for token in &tokens {
            out.push_str(&template[cursor..token.start]);
            match self.chain.resolve(token, ctx) {
                Some(value) => out.push_str(&value),
                None if ctx.format.default_value.is_empty() => out.push_str(&token.raw),
                None => out.push_str(&ctx.format.default_value),
            }
            cursor = token.end;
        }
        out.push_str(&template[cursor..]);
        out
    }
}

impl Default for TemplateParser {
    fn default() -> Self {
        Self::new()
    }
}
