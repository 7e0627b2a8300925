//! Namespaced handler backed by the external permission system.
//!
//! `%rank.name%`, `%rank.displayname%`, `%rank.weight%`

use crate::token::Token;
use crate::traits::PlaceholderHandler;
use cd_core::MessageContext;
use std::sync::Arc;

/// Primary-group data for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankGroup {
    pub name: String,
    pub display_name: String,
    pub weight: Option<i32>,
}

/// The single query the external permission system exposes.
pub trait RankProvider: Send + Sync {
    fn primary_group(&self, ident: &str) -> Option<RankGroup>;
}

/// Resolves `rank.`-prefixed tokens through a [`RankProvider`].
pub struct RankHandler {
    provider: Arc<dyn RankProvider>,
}

impl RankHandler {
    pub const NAMESPACE: &'static str = "rank";

    pub fn new(provider: Arc<dyn RankProvider>) -> Self {
        Self { provider }
    }
}

impl PlaceholderHandler for RankHandler {
    fn name(&self) -> &str {
        "rank"
    }

    fn matches(&self, token: &Token) -> bool {
        token.namespace() == Some(Self::NAMESPACE)
    }

    fn resolve(&self, token: &Token, ctx: &MessageContext) -> Option<String> {
        let group = self.provider.primary_group(&ctx.ident)?;
        match token.sub_key()? {
            "name" => Some(group.name),
            "displayname" => Some(group.display_name),
            "weight" => group.weight.map(|w| w.to_string()),
            _ => None,
        }
    }
}
