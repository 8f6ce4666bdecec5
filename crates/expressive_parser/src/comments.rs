//! Comment attachment.
//!
//! Runs once for every finished node. Comments read by the tokenizer are
//! queued in two buffers; a stack of recently finished nodes decides which
//! node owns a comment that sits between a parent and its children.

use expressive_ast::node::{CommentId, NodeId};
use expressive_ast::NodeKind;
use expressive_core::text::TextPos;

use crate::parser::Parser;

/// Pending comments and the stack of finished nodes.
#[derive(Debug, Default)]
pub(crate) struct CommentState {
    /// Comments that may lead the next node.
    pub leading: Vec<CommentId>,
    /// Comments that may trail the node finished next.
    pub trailing: Vec<CommentId>,
    pub stack: Vec<NodeId>,
    pub previous_node: Option<NodeId>,
}

impl Parser {
    #[inline]
    fn comment_start(&self, id: CommentId) -> TextPos {
        self.tok.comment(id).start
    }

    #[inline]
    fn comment_end(&self, id: CommentId) -> TextPos {
        self.tok.comment(id).end
    }

    /// Drop buffered leading comments that end before the previously
    /// finished node does.
    fn retain_after_previous(&mut self) {
        let Some(previous) = self.comments.previous_node else {
            return;
        };
        let previous_end = self.ast[previous].end;
        let tok = &self.tok;
        self.comments.leading.retain(|&c| tok.comment(c).end >= previous_end);
    }

    pub(crate) fn process_comment(&mut self, id: NodeId) {
        if let NodeKind::Program { body, .. } = self.ast.kind(id) {
            if !body.is_empty() {
                return;
            }
        }
        let node_start = self.ast[id].start;
        let node_end = self.ast[id].end;
        let mut trail: Vec<CommentId> = Vec::new();

        if let Some(&first) = self.comments.trailing.first() {
            if self.comment_start(first) >= node_end {
                trail = std::mem::take(&mut self.comments.trailing);
            } else {
                self.comments.trailing.clear();
            }
        } else if let Some(&top) = self.comments.stack.last() {
            let follows = self.ast[top]
                .comments
                .trailing
                .first()
                .is_some_and(|&c| self.comment_start(c) >= node_end);
            if follows {
                trail = std::mem::take(&mut self.ast[top].comments.trailing);
            }
        }

        // Children finished before this node are on top of the stack.
        let mut first_child = None;
        let mut last_child = None;
        if let Some(&top) = self.comments.stack.last() {
            if self.ast[top].start >= node_start {
                first_child = self.comments.stack.pop();
            }
        }
        while let Some(&top) = self.comments.stack.last() {
            if self.ast[top].start < node_start {
                break;
            }
            last_child = self.comments.stack.pop();
        }
        let last_child = last_child.or(first_child);

        if let (Some(child), Some(&last_comment)) = (first_child, self.comments.leading.last()) {
            let comment_start = self.comment_start(last_comment);
            let comment_end = self.comment_end(last_comment);
            let target = match self.ast.kind(id) {
                _ if matches!(self.ast.kind(child), NodeKind::ObjectProperty { .. })
                    && comment_start >= node_start =>
                {
                    Some(child)
                }
                NodeKind::CallExpression { arguments, .. } => arguments
                    .last()
                    .copied()
                    .filter(|&arg| comment_start >= self.ast[arg].start && comment_end <= node_end),
                _ => None,
            };
            if let Some(target) = target {
                self.retain_after_previous();
                if !self.comments.leading.is_empty() {
                    let taken = std::mem::take(&mut self.comments.leading);
                    self.ast[target].comments.trailing.extend(taken);
                }
            }
        }

        if let Some(child) = last_child {
            let child_leading = &self.ast[child].comments.leading;
            if let Some(&last) = child_leading.last() {
                if self.comment_end(last) <= node_start {
                    let taken = std::mem::take(&mut self.ast[child].comments.leading);
                    self.ast[id].comments.leading = taken;
                } else {
                    let split = (0..child_leading.len().saturating_sub(1))
                        .rev()
                        .find(|&i| self.comment_end(child_leading[i]) <= node_start);
                    if let Some(i) = split {
                        let rest = self.ast[child].comments.leading.split_off(i + 1);
                        let taken = std::mem::replace(&mut self.ast[child].comments.leading, rest);
                        self.ast[id].comments.leading = taken;
                    }
                }
            }
        } else if let Some(&last) = self.comments.leading.last() {
            if self.comment_end(last) <= node_start {
                self.retain_after_previous();
                if !self.comments.leading.is_empty() {
                    self.ast[id].comments.leading = std::mem::take(&mut self.comments.leading);
                }
            } else {
                let split = self
                    .comments
                    .leading
                    .iter()
                    .position(|&c| self.comment_end(c) > node_start)
                    .unwrap_or(self.comments.leading.len());
                let (head, tail) = self.comments.leading.split_at(split);
                if !head.is_empty() {
                    self.ast[id].comments.leading = head.to_vec();
                }
                if !tail.is_empty() {
                    trail = tail.to_vec();
                }
            }
        }

        self.comments.previous_node = Some(id);

        if let (Some(&first), Some(&last)) = (trail.first(), trail.last()) {
            if self.comment_start(first) >= node_start && self.comment_end(last) <= node_end {
                self.ast[id].comments.inner = trail;
            } else {
                // Comments on the node's last line belong to it alone.
                let end_line = self.ast[id].loc.end.line;
                let tok = &self.tok;
                self.comments
                    .leading
                    .retain(|c| !(trail.contains(c) && tok.comment(*c).loc.start.line == end_line));
                self.ast[id].comments.trailing = trail;
            }
        }

        self.comments.stack.push(id);
    }

    /// Give a statement the comments that follow its `;` on the same line.
    pub(crate) fn attach_statement_trailing(&mut self, id: NodeId, semi_end: usize) {
        let line = self.tok.position_of(semi_end).line;
        let tok = &self.tok;
        let same_line: Vec<CommentId> = self
            .comments
            .trailing
            .iter()
            .copied()
            .filter(|&c| {
                let comment = tok.comment(c);
                comment.start as usize >= semi_end && comment.loc.start.line == line
            })
            .collect();
        if same_line.is_empty() {
            return;
        }
        self.comments.trailing.retain(|c| !same_line.contains(c));
        self.comments.leading.retain(|c| !same_line.contains(c));
        self.ast[id].comments.trailing.extend(same_line);
    }
}
