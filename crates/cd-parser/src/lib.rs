//! Placeholder template parsing for chatdeco.
//!
//! A template is scanned for `%...%` tokens; each token is dispatched
//! through an ordered handler chain and replaced with the resolved value or
//! the configured default.

pub mod chain;
pub mod handlers;
pub mod template;
pub mod token;
pub mod traits;

pub use chain::HandlerChain;
pub use handlers::builtin::BuiltinHandler;
pub use handlers::rank::{RankGroup, RankHandler, RankProvider};
pub use template::TemplateParser;
pub use token::{Token, TokenScanner};
pub use traits::PlaceholderHandler;
