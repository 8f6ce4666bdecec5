//! Node builders and the block-to-value helpers shared by the lowering
//! handlers.

use crate::error::{TransformError, TransformResult};
use crate::polyfills::Polyfill;
use crate::transform::Transformer;
use expressive_ast::{BinaryOperator, Node, NodeId, NodeKind};
use expressive_core::intern::Atom;
use expressive_core::text::{SourceLocation, TextPos};

/// Parameter name of every matcher predicate.
pub(crate) const MATCH_PARAM: &str = "_m";
/// Sentinel returned by a predicate that does not match.
pub(crate) const NOT_FOUND: &str = "__not__found";
/// Test of a switch `default` case.
pub(crate) const DEFAULT_CASE: &str = "def__ault__";
/// Second element of a switch case result that falls through.
pub(crate) const CONTINUE_CASE: &str = "cont__inue__";

/// Source position given to synthesized nodes.
#[derive(Debug, Clone, Default)]
pub(crate) struct Site {
    start: TextPos,
    end: TextPos,
    loc: SourceLocation,
    range: Option<[TextPos; 2]>,
}

impl Site {
    pub(crate) fn of(node: &Node) -> Self {
        Self {
            start: node.start,
            end: node.end,
            loc: node.loc.clone(),
            range: node.range,
        }
    }
}

/// How a tail expression becomes a return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReturnMode {
    /// `return value`.
    Value,
    /// `return [value, cont__inue__]` when the case falls through,
    /// `return [value, undefined]` otherwise.
    SwitchCase { fallthrough: bool },
}

impl<'a> Transformer<'a> {
    // ========================================================================
    // Node allocation
    // ========================================================================

    fn add_with(&mut self, site: &Site, kind: NodeKind) -> NodeId {
        let mut node = Node::new(kind, site.start, site.end, site.loc.clone());
        node.range = site.range;
        self.out.add(node)
    }

    /// A synthesized node positioned at the node being lowered.
    pub(crate) fn add(&mut self, kind: NodeKind) -> NodeId {
        let site = self.site.clone();
        self.add_with(&site, kind)
    }

    /// A synthesized node positioned at input node `at`.
    pub(crate) fn add_at(&mut self, at: NodeId, kind: NodeKind) -> NodeId {
        let site = Site::of(&self.input[at]);
        self.add_with(&site, kind)
    }

    /// A synthesized node positioned at output node `like`.
    pub(crate) fn add_like(&mut self, like: NodeId, kind: NodeKind) -> NodeId {
        let site = Site::of(&self.out[like]);
        self.add_with(&site, kind)
    }

    /// The lowered counterpart of input node `id`, keeping its extra data.
    pub(crate) fn copy(&mut self, id: NodeId, kind: NodeKind) -> NodeId {
        let extra = self.input[id].extra.clone();
        let out = self.add_at(id, kind);
        self.out[out].extra = extra;
        out
    }

    // ========================================================================
    // Builders
    // ========================================================================

    pub(crate) fn ident(&mut self, name: &str) -> NodeId {
        let name = self.out.interner.intern(name);
        self.add(NodeKind::Identifier { name })
    }

    #[inline]
    pub(crate) fn ident_atom(&mut self, name: Atom) -> NodeId {
        self.add(NodeKind::Identifier { name })
    }

    #[inline]
    pub(crate) fn undefined(&mut self) -> NodeId {
        self.ident("undefined")
    }

    pub(crate) fn number(&mut self, value: f64) -> NodeId {
        self.add(NodeKind::NumericLiteral { value })
    }

    pub(crate) fn member(&mut self, object: NodeId, name: &str) -> NodeId {
        let property = self.ident(name);
        self.add(NodeKind::MemberExpression { object, property, computed: false })
    }

    pub(crate) fn call(&mut self, callee: NodeId, arguments: Vec<NodeId>) -> NodeId {
        self.add(NodeKind::CallExpression { callee, arguments, block_param: None })
    }

    /// `object.name(arguments)`.
    pub(crate) fn method_call(&mut self, object: NodeId, name: &str, arguments: Vec<NodeId>) -> NodeId {
        let callee = self.member(object, name);
        self.call(callee, arguments)
    }

    pub(crate) fn array(&mut self, elements: Vec<NodeId>) -> NodeId {
        self.add(NodeKind::ArrayExpression { elements: elements.into_iter().map(Some).collect() })
    }

    pub(crate) fn arrow(&mut self, params: Vec<NodeId>, body: NodeId) -> NodeId {
        self.add(NodeKind::ArrowFunctionExpression { params, body, is_async: false })
    }

    /// `() => body`.
    #[inline]
    pub(crate) fn thunk(&mut self, body: NodeId) -> NodeId {
        self.arrow(Vec::new(), body)
    }

    pub(crate) fn conditional(&mut self, test: NodeId, consequent: NodeId, alternate: NodeId) -> NodeId {
        self.add(NodeKind::ConditionalExpression { test, consequent, alternate })
    }

    pub(crate) fn strict_equal(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.add(NodeKind::BinaryExpression { operator: BinaryOperator::StrictEqual, left, right })
    }

    pub(crate) fn expression_statement(&mut self, expression: NodeId) -> NodeId {
        self.add_like(expression, NodeKind::ExpressionStatement { expression })
    }

    /// `(() => { body })()`.
    pub(crate) fn iife(&mut self, body: Vec<NodeId>) -> NodeId {
        let block = self.add(NodeKind::BlockStatement { body });
        let function = self.thunk(block);
        self.call(function, Vec::new())
    }

    /// `_m => body`.
    pub(crate) fn predicate(&mut self, body: NodeId) -> NodeId {
        let param = self.ident(MATCH_PARAM);
        self.arrow(vec![param], body)
    }

    // ========================================================================
    // Polyfill calls
    // ========================================================================

    /// Build a call to the helper registered as `name`, registering its
    /// source text on first use.
    ///
    /// Test and key arguments are wrapped in thunks, and arguments past the
    /// helper's arity are gathered into an array.
    pub fn use_polyfill(&mut self, name: &str, mut args: Vec<NodeId>) -> TransformResult<NodeId> {
        let polyfill = Polyfill::from_name(name).ok_or_else(|| TransformError::UnknownPolyfill(name.to_string()))?;
        let arity = polyfill.arity();
        if args.len() < arity || (!polyfill.is_variadic() && args.len() != arity) {
            return Err(TransformError::PolyfillArguments {
                name: polyfill.name(),
                expected: arity,
                found: args.len(),
            });
        }
        self.polyfills.register(polyfill);

        let rest = args.split_off(arity);
        match polyfill {
            Polyfill::DoWhile | Polyfill::While => {
                args[0] = self.thunk(args[0]);
            }
            Polyfill::Switch | Polyfill::Cond | Polyfill::MatchObject | Polyfill::MatchArray => {
                let list = self.array(rest);
                args.push(list);
            }
            Polyfill::Constructor | Polyfill::Curry => {}
            Polyfill::OptionalCall => {
                let list = self.array(rest);
                let thunk = self.thunk(list);
                args.push(thunk);
            }
            Polyfill::OptionalProp => {
                args[1] = self.thunk(args[1]);
            }
            Polyfill::OptionalMethod => {
                args[1] = self.thunk(args[1]);
                let list = self.array(rest);
                let thunk = self.thunk(list);
                args.push(thunk);
            }
        }
        let callee = self.ident(polyfill.function_name());
        Ok(self.call(callee, args))
    }

    // ========================================================================
    // Block-to-value
    // ========================================================================

    /// Wrap a lowered node in a block unless it already is one.
    pub(crate) fn ensure_block(&mut self, stmt: NodeId) -> NodeId {
        match self.out.kind(stmt) {
            NodeKind::BlockStatement { .. } => stmt,
            kind if kind.is_statement() => self.add_like(stmt, NodeKind::BlockStatement { body: vec![stmt] }),
            _ => {
                let stmt = self.expression_statement(stmt);
                self.add_like(stmt, NodeKind::BlockStatement { body: vec![stmt] })
            }
        }
    }

    fn block_body_mut(&mut self, block: NodeId) -> Option<&mut Vec<NodeId>> {
        match &mut self.out[block].kind {
            NodeKind::BlockStatement { body } => Some(body),
            _ => None,
        }
    }

    /// Drop the last statement of `block` if `is_jump` holds for it.
    /// Returns whether one was dropped.
    pub(crate) fn pop_trailing(&mut self, block: NodeId, is_jump: fn(&NodeKind) -> bool) -> bool {
        let last = match self.out.kind(block) {
            NodeKind::BlockStatement { body } => body.last().copied(),
            _ => None,
        };
        if !last.is_some_and(|id| is_jump(self.out.kind(id))) {
            return false;
        }
        if let Some(body) = self.block_body_mut(block) {
            body.pop();
        }
        true
    }

    /// Turn a lowered block into a function returning its value.
    ///
    /// An empty block returns `undefined`.
    pub(crate) fn thunk_from_block(&mut self, block: NodeId, params: Vec<NodeId>, mode: ReturnMode) -> NodeId {
        let is_empty = matches!(self.out.kind(block), NodeKind::BlockStatement { body } if body.is_empty());
        if is_empty {
            let undefined = self.undefined();
            let stmt = self.expression_statement(undefined);
            if let Some(body) = self.block_body_mut(block) {
                body.push(stmt);
            }
        }
        self.insert_return(block, mode);
        // A case result must always be a `[value, marker]` pair.
        if matches!(mode, ReturnMode::SwitchCase { .. }) && !self.always_returns(block) {
            let undefined = self.undefined();
            let argument = self.return_value(undefined, mode);
            let ret = self.add(NodeKind::ReturnStatement { argument: Some(argument) });
            if let Some(body) = self.block_body_mut(block) {
                body.push(ret);
            }
        }
        self.arrow(params, block)
    }

    /// Whether every path through `stmt` ends in `return` or `throw`.
    fn always_returns(&self, stmt: NodeId) -> bool {
        match self.out.kind(stmt) {
            NodeKind::ReturnStatement { .. } | NodeKind::ThrowStatement { .. } => true,
            NodeKind::BlockStatement { body } => body.last().is_some_and(|&last| self.always_returns(last)),
            NodeKind::IfStatement { consequent, alternate, .. } => {
                self.always_returns(*consequent) && alternate.is_some_and(|alternate| self.always_returns(alternate))
            }
            NodeKind::TryStatement { block, handler, .. } => {
                let handler_returns = handler.map_or(true, |handler| match self.out.kind(handler) {
                    NodeKind::CatchClause { body, .. } => self.always_returns(*body),
                    _ => false,
                });
                self.always_returns(*block) && handler_returns
            }
            _ => false,
        }
    }

    fn return_value(&mut self, value: NodeId, mode: ReturnMode) -> NodeId {
        match mode {
            ReturnMode::Value => value,
            ReturnMode::SwitchCase { fallthrough } => {
                let marker = if fallthrough { self.ident(CONTINUE_CASE) } else { self.undefined() };
                self.array(vec![value, marker])
            }
        }
    }

    /// Rewrite the tail of `stmt` so it returns its value.
    ///
    /// Expression statements become returns. Blocks, `if` branches, `try`
    /// and `catch` blocks and `switch` cases are followed to their tails.
    pub(crate) fn insert_return(&mut self, stmt: NodeId, mode: ReturnMode) {
        match self.out.kind(stmt).clone() {
            NodeKind::ExpressionStatement { expression } => {
                let argument = self.return_value(expression, mode);
                self.out[stmt].kind = NodeKind::ReturnStatement { argument: Some(argument) };
            }
            NodeKind::ReturnStatement { argument } => {
                if let ReturnMode::SwitchCase { .. } = mode {
                    let value = match argument {
                        Some(value) => value,
                        None => self.undefined(),
                    };
                    let argument = self.return_value(value, mode);
                    self.out[stmt].kind = NodeKind::ReturnStatement { argument: Some(argument) };
                }
            }
            NodeKind::BlockStatement { body } => {
                if let Some(&last) = body.last() {
                    self.insert_return(last, mode);
                }
            }
            NodeKind::IfStatement { consequent, alternate, .. } => {
                self.insert_return(consequent, mode);
                if let Some(alternate) = alternate {
                    self.insert_return(alternate, mode);
                }
            }
            NodeKind::TryStatement { block, handler, .. } => {
                self.insert_return(block, mode);
                let handler_body = handler.and_then(|handler| match self.out.kind(handler) {
                    NodeKind::CatchClause { body, .. } => Some(*body),
                    _ => None,
                });
                if let Some(body) = handler_body {
                    self.insert_return(body, mode);
                }
            }
            NodeKind::SwitchStatement { cases, .. } => {
                let count = cases.len();
                for (index, case) in cases.into_iter().enumerate() {
                    self.insert_case_return(case, index + 1 == count, mode);
                }
            }
            _ => {}
        }
    }

    /// Rewrite the statement that ends a case's evaluation: the one before
    /// a trailing `break`, a trailing `return` or `throw`, or the last
    /// statement of the last case. Other cases fall through and are left
    /// alone.
    fn insert_case_return(&mut self, case: NodeId, is_last: bool, mode: ReturnMode) {
        let NodeKind::SwitchCase { consequent, .. } = self.out.kind(case) else {
            return;
        };
        let tail = match consequent.as_slice() {
            [.., tail, last] if matches!(self.out.kind(*last), NodeKind::BreakStatement) => Some(*tail),
            [.., last]
                if is_last
                    || matches!(
                        self.out.kind(*last),
                        NodeKind::ReturnStatement { .. } | NodeKind::ThrowStatement { .. }
                    ) =>
            {
                Some(*last)
            }
            _ => None,
        };
        if let Some(tail) = tail {
            self.insert_return(tail, mode);
        }
    }
}
