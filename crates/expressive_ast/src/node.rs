//! Nodes, comments and the per-node side table.

use crate::kind::NodeKind;
use expressive_core::text::{SourceLocation, TextPos};

/// Index of a node in an [`Ast`](crate::Ast).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a comment in [`Ast::comments`](crate::Ast).
pub type CommentId = u32;

bitflags::bitflags! {
    /// Non-semantic markers recorded while parsing.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ExtraFlags: u8 {
        const NONE                   = 0;
        /// The expression was written inside parentheses.
        const PARENTHESIZED          = 1 << 0;
        /// The operand of a unary operator was parenthesized.
        const PARENTHESIZED_ARGUMENT = 1 << 1;
        /// An object property written as `{ a }`.
        const SHORTHAND              = 1 << 2;
    }
}

/// Raw text, parenthesization and similar metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extra {
    /// The literal's source text.
    pub raw: Option<String>,
    /// Start offset of the enclosing `(` when parenthesized.
    pub paren_start: Option<TextPos>,
    pub flags: ExtraFlags,
}

impl Extra {
    #[inline]
    pub fn raw(raw: String) -> Self {
        Self { raw: Some(raw), ..Self::default() }
    }

    #[inline]
    pub fn is_parenthesized(&self) -> bool {
        self.flags.contains(ExtraFlags::PARENTHESIZED)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_none() && self.paren_start.is_none() && self.flags.is_empty()
    }
}

/// Comments attached to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeComments {
    pub leading: Vec<CommentId>,
    pub trailing: Vec<CommentId>,
    pub inner: Vec<CommentId>,
}

impl NodeComments {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.trailing.is_empty() && self.inner.is_empty()
    }
}

/// A finished node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub start: TextPos,
    pub end: TextPos,
    pub loc: SourceLocation,
    /// `[start, end]`, present when the `ranges` option is on.
    pub range: Option<[TextPos; 2]>,
    pub comments: NodeComments,
    pub extra: Extra,
}

impl Node {
    pub fn new(kind: NodeKind, start: TextPos, end: TextPos, loc: SourceLocation) -> Self {
        debug_assert!(end >= start);
        Self {
            kind,
            start,
            end,
            loc,
            range: None,
            comments: NodeComments::default(),
            extra: Extra::default(),
        }
    }

    #[inline]
    pub fn with_extra(mut self, extra: Extra) -> Self {
        self.extra = extra;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Block,
    Line,
}

/// A `/* block */` or `// line` comment.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub kind: CommentKind,
    /// The text between the delimiters.
    pub value: String,
    pub start: TextPos,
    pub end: TextPos,
    pub loc: SourceLocation,
}

impl Comment {
    #[inline]
    pub fn is_block(&self) -> bool {
        self.kind == CommentKind::Block
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            CommentKind::Block => "CommentBlock",
            CommentKind::Line => "CommentLine",
        }
    }
}
