//! Index-addressed node storage.

use crate::kind::NodeKind;
use crate::node::{Comment, Node, NodeId};
use expressive_core::intern::{Atom, StringInterner};
use std::ops::{Index, IndexMut};

/// Arena of nodes for one tree, plus the comments they refer to.
///
/// Nodes point at their children through [`NodeId`]s; there are no parent
/// links. Comment lists on nodes index into `comments`.
#[derive(Debug, Clone)]
pub struct Ast {
    nodes: Vec<Node>,
    pub comments: Vec<Comment>,
    pub interner: StringInterner,
}

impl Ast {
    pub fn new(interner: StringInterner) -> Self {
        Self {
            nodes: Vec::new(),
            comments: Vec::new(),
            interner,
        }
    }

    pub fn with_capacity(interner: StringInterner, capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            comments: Vec::new(),
            interner,
        }
    }

    /// Add a node and return its index.
    pub fn add(&mut self, node: Node) -> NodeId {
        let index = self.nodes.len() as u32;
        self.nodes.push(node);
        NodeId(index)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self[id].kind
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn name(&self, atom: Atom) -> &str {
        self.interner.resolve(atom)
    }

    /// The identifier name of `id`, if it is an `Identifier`.
    pub fn identifier_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Identifier { name } => Some(self.name(*name)),
            _ => None,
        }
    }

    /// Visit `root` and every node reachable from it, parents first.
    pub fn walk(&self, root: NodeId, f: &mut dyn FnMut(NodeId, &Node)) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = &self[id];
            f(id, node);
            let mut children = Vec::new();
            node.kind.for_each_child(|child| children.push(child));
            stack.extend(children.into_iter().rev());
        }
    }

    /// The first non-standard node reachable from `root`, if any.
    pub fn find_non_standard(&self, root: NodeId) -> Option<NodeId> {
        let mut found = None;
        self.walk(root, &mut |id, node| {
            if found.is_none() && !node.kind.is_standard() {
                found = Some(id);
            }
        });
        found
    }
}

impl Index<NodeId> for Ast {
    type Output = Node;

    #[inline]
    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

impl IndexMut<NodeId> for Ast {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expressive_core::text::SourceLocation;

    fn leaf(ast: &mut Ast, kind: NodeKind) -> NodeId {
        ast.add(Node::new(kind, 0, 0, SourceLocation::default()))
    }

    #[test]
    fn test_add_and_index() {
        let mut ast = Ast::new(StringInterner::new());
        let name = ast.interner.intern("x");
        let id = leaf(&mut ast, NodeKind::Identifier { name });
        assert_eq!(id, NodeId(0));
        assert_eq!(ast.identifier_name(id), Some("x"));
        assert_eq!(ast.len(), 1);
        assert!(ast.get(NodeId(5)).is_none());
    }

    #[test]
    fn test_walk_visits_parents_first() {
        let mut ast = Ast::new(StringInterner::new());
        let a = leaf(&mut ast, NodeKind::NullLiteral);
        let b = leaf(&mut ast, NodeKind::ThisExpression);
        let seq = leaf(&mut ast, NodeKind::SequenceExpression { expressions: vec![a, b] });
        let mut order = Vec::new();
        ast.walk(seq, &mut |id, _| order.push(id));
        assert_eq!(order, vec![seq, a, b]);
    }

    #[test]
    fn test_find_non_standard() {
        let mut ast = Ast::new(StringInterner::new());
        let a = leaf(&mut ast, NodeKind::NullLiteral);
        let brk = leaf(&mut ast, NodeKind::Break);
        let block = leaf(&mut ast, NodeKind::BlockStatement { body: vec![a] });
        assert_eq!(ast.find_non_standard(block), None);
        let bad = leaf(&mut ast, NodeKind::BlockStatement { body: vec![a, brk] });
        assert_eq!(ast.find_non_standard(bad), Some(brk));
    }
}
