//! expressive_transformer: Lowers the extended tree to standard nodes.
//!
//! The parser's tree uses source-language kinds (`If`, `Cond`,
//! `CollectionLiteral`, `|>`, ...). [`transform`] rewrites it into a tree
//! that only uses the standard ESTree kinds, calling small runtime helpers
//! where a construct has no direct equivalent. The helpers' source text is
//! collected by the [`PolyfillRegistry`] and returned with the tree.

mod error;
mod polyfills;
mod state;
mod transform;
mod util;

pub use error::{TransformError, TransformResult};
pub use polyfills::{Polyfill, PolyfillRegistry};
pub use state::TransformerState;
pub use transform::{Transformed, Transformer};

use expressive_ast::{Ast, NodeId};

/// Lower the tree rooted at `root`.
pub fn transform(ast: &Ast, root: NodeId) -> TransformResult<Transformed> {
    Transformer::new(ast).run(root)
}
