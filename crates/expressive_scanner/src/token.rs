//! Token values and recorded tokens.

use crate::token_type::TokenType;
use expressive_core::text::SourceLocation;

/// The value carried by the current token.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TokenValue {
    #[default]
    None,
    /// Names, keywords, string literals and operator text.
    Str(String),
    Num(f64),
    /// BigInt digits without the `n` suffix.
    BigInt(String),
    RegExp { pattern: String, flags: String },
    /// Cooked template text, `None` when it held an invalid escape.
    Template(Option<String>),
}

impl TokenValue {
    /// The string payload, if any.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TokenValue::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn is_str(&self, text: &str) -> bool {
        self.as_str() == Some(text)
    }
}

/// A token recorded when the `tokens` option is on.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub ty: TokenType,
    pub value: TokenValue,
    pub start: u32,
    pub end: u32,
    pub loc: SourceLocation,
}

impl Token {
    /// The length of this token in characters.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A snapshot of the token after the current one.
#[derive(Debug, Clone, PartialEq)]
pub struct LookaheadToken {
    pub ty: TokenType,
    pub value: TokenValue,
    pub start: usize,
    pub end: usize,
}
