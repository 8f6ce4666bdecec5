//! expressive_core: Core utilities for the expressive compiler.
//!
//! Provides source positions, line lookup and string interning shared by
//! every stage of the pipeline.

pub mod intern;
pub mod text;

// Re-export commonly used types
pub use intern::{Atom, StringInterner};
pub use text::{LineMap, Position, SourceLocation, TextPos};
