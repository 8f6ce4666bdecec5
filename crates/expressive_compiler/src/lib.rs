//! expressive_compiler: Compiler orchestration.
//!
//! Runs a source text through the parser and the transformer and hands
//! back the lowered tree with the runtime helpers it needs. Code
//! generation happens outside this crate, from the JSON form of the tree.

use expressive_ast::json::to_json;
use expressive_ast::{Ast, NodeId};
use expressive_diagnostics::SyntaxError;
use expressive_transformer::{transform, TransformError};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub use expressive_parser::Options;

/// A failed compilation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl CompileError {
    /// Whether more input could have completed the source. A REPL uses this
    /// to ask for another line instead of reporting the error.
    pub fn is_unexpected_eof(&self) -> bool {
        match self {
            CompileError::Syntax(err) => err.is_unexpected_eof(),
            CompileError::Transform(_) => false,
        }
    }
}

/// The lowered program and the helpers it calls.
#[derive(Debug, Clone)]
pub struct Output {
    pub ast: Ast,
    /// The `File` node.
    pub root: NodeId,
    /// Helper definitions to place before the generated code.
    pub polyfill_text: String,
    /// Names of the helpers in `polyfill_text`, in emission order.
    pub polyfills: Vec<&'static str>,
}

impl Output {
    /// The `File` tree as ESTree-shaped JSON, for the code emitter.
    pub fn to_json(&self) -> Value {
        to_json(&self.ast, self.root)
    }
}

/// Parse and lower `source`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn compile(source: &str, options: &Options) -> Result<Output, CompileError> {
    let parsed = expressive_parser::parse(source, options)?;
    let lowered = transform(&parsed.ast, parsed.root)?;
    debug!(
        source_len = source.len(),
        nodes = lowered.ast.len(),
        polyfills = lowered.polyfills.len(),
        "compiled"
    );
    Ok(Output {
        ast: lowered.ast,
        root: lowered.root,
        polyfill_text: lowered.polyfill_text,
        polyfills: lowered.polyfills,
    })
}
