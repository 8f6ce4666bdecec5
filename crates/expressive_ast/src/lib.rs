//! expressive_ast: Syntax tree definitions for the expressive compiler.
//!
//! Nodes live in an [`Ast`] arena and refer to each other by [`NodeId`].
//! The same [`NodeKind`] enum describes the parser's extended tree and the
//! transformer's standard-only tree.

pub mod arena;
pub mod json;
pub mod kind;
pub mod node;
pub mod operators;

// Re-export key types
pub use arena::Ast;
pub use kind::NodeKind;
pub use node::*;
pub use operators::*;
