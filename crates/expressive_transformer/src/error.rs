//! Errors raised while lowering a tree.
//!
//! These signal trees the parser should never have produced, or misuse of
//! the polyfill registry. Syntax problems are reported by the parser.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// `::callee` whose callee is not a member expression.
    #[error("Invalid bind: a bind without a receiver must target a member expression (offset {pos})")]
    MalformedBind { pos: u32 },

    /// A collection pattern outside a declarator or assignment target.
    #[error("Collection patterns are only supported as a declaration or assignment target (offset {pos})")]
    CollectionPatternPosition { pos: u32 },

    #[error("Unknown polyfill '{0}'")]
    UnknownPolyfill(String),

    #[error("Polyfill '{name}' takes {expected} arguments, got {found}")]
    PolyfillArguments { name: &'static str, expected: usize, found: usize },

    /// A node id that does not exist in the input arena.
    #[error("Node {0} is missing from the tree")]
    MissingNode(u32),

    /// A node in a position the lowered tree cannot express, such as a
    /// jump used as a value.
    #[error("'{kind}' is not valid here (offset {pos})")]
    Misplaced { kind: &'static str, pos: u32 },
}

pub type TransformResult<T> = Result<T, TransformError>;
