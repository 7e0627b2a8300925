//! Template token scanning.

use regex::Regex;

/// Tokens are `%`-delimited with no nesting; `[^%]` is what forbids a
/// marker inside a token.
const TOKEN_PATTERN: &str = "%[^%]*%";

/// One marker-delimited placeholder token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Full token text including both markers.
    pub raw: String,
    /// Lookup key: the inner text, lowercased.
    pub key: String,
    /// Byte span in the scanned template.
    pub start: usize,
    pub end: usize,
}

impl Token {
    /// Namespace prefix before the first dot, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.key.split_once('.').map(|(ns, _)| ns)
    }

    /// Sub-key after the first dot, if any.
    pub fn sub_key(&self) -> Option<&str> {
        self.key.split_once('.').map(|(_, key)| key)
    }

    pub fn is_namespaced(&self) -> bool {
        self.key.contains('.')
    }
}

/// Scanner producing non-overlapping tokens in first-position order.
pub struct TokenScanner {
    pattern: Regex,
}

impl TokenScanner {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(TOKEN_PATTERN).expect("token pattern is valid"),
        }
    }

    pub fn scan(&self, template: &str) -> Vec<Token> {
        self.pattern
            .find_iter(template)
            .map(|m| {
                let raw = m.as_str();
                Token {
                    raw: raw.to_string(),
                    key: raw[1..raw.len() - 1].to_lowercase(),
                    start: m.start(),
                    end: m.end(),
                }
            })
            .collect()
    }
}

impl Default for TokenScanner {
    fn default() -> Self {
        Self::new()
    }
}
