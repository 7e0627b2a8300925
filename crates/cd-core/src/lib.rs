//! Shared types for the chatdeco workspace: errors, configuration, and the
//! message-context snapshot that placeholder handlers consume.

pub mod config;
pub mod context;
pub mod error;
pub mod timefmt;

pub use config::{ConfigStore, DecoratorConfig};
pub use context::{GlobalFormat, MessageContext, MuteView, PlayerAttrs, ServerStats};
pub use error::{DecoError, Result};
