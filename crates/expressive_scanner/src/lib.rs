//! expressive_scanner: Character classification and tokenization.
//!
//! The tokenizer reads tokens on demand for the parser and supports:
//! - The extended operators `|>`, `?.`, `::`, `->`, `^` and `#`
//! - Template literals with nested `${}` substitutions
//! - Regular expression literals, disambiguated by the lexical context stack
//! - Unicode identifiers and `\u` escapes
//! - Comment recording for attachment by the parser

pub mod classifier;
pub mod context;
mod token;
mod token_type;
mod tokenizer;

pub use context::{ContextState, TokContext};
pub use token::{LookaheadToken, Token, TokenValue};
pub use token_type::{TokenFlags, TokenType};
pub use tokenizer::{Tokenizer, TokenizerOptions, TokenizerState};

use expressive_diagnostics::SyntaxResult;

/// Tokenize a whole source text, without the final end-of-file token.
pub fn tokenize(source: &str, options: TokenizerOptions) -> SyntaxResult<Vec<Token>> {
    let mut tokenizer = Tokenizer::new(source, TokenizerOptions { tokens: true, ..options });
    tokenizer.next_token()?;
    while tokenizer.ty() != TokenType::Eof {
        tokenizer.next()?;
    }
    Ok(tokenizer.take_tokens())
}
