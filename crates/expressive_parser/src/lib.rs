//! expressive_parser: Recursive descent parser for the expressive language.
//!
//! Builds an arena-allocated tree from the scanner's tokens. On top of the
//! ECMAScript grammar it accepts:
//! - `if`, `while`, `for`, `switch`, `try` and `cond` in expression position
//! - The pipeline `|>`, optional chains `?.` and bind `::` operators
//! - Collection literals and patterns (`Map#{ a: 1 }`)
//! - Slices (`a[1:2]`), block arguments (`f() { ... }`) and curried
//!   functions (`function % add(a, b)`)
//!
//! Comments are attached to nodes while they are finished.

mod comments;
mod expression;
mod lval;
mod options;
mod parser;
mod statement;

pub use options::Options;
pub use parser::{ParseResult, Parser};

use expressive_diagnostics::SyntaxResult;

/// Parse a whole source text.
pub fn parse(source: &str, options: &Options) -> SyntaxResult<ParseResult> {
    Parser::new(source, options).parse()
}
