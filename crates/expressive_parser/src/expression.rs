//! Expression parsing.
//!
//! Binary operators use precedence climbing over [`TokenType::binop`].
//! Control-flow keywords (`if`, `while`, `cond`, ...) are expressions in
//! this language, so the atom parser dispatches to the control forms in
//! `statement.rs` as well.

use expressive_ast::node::*;
use expressive_ast::{
    AssignmentOperator, BinaryOperator, LogicalOperator, MethodKind, NodeKind, UnaryOperator,
    UpdateOperator,
};
use expressive_diagnostics::messages::*;
use expressive_diagnostics::SyntaxResult;
use expressive_scanner::{TokenType, TokenValue};

use crate::parser::{FunctionScope, Parser, Start};

/// Position of a `{ a = 1 }` shorthand default that is only legal if the
/// enclosing expression turns out to be a pattern.
pub(crate) type ShorthandRef<'r> = Option<&'r mut Option<usize>>;

#[derive(Debug, Default)]
struct SubscriptState {
    /// Set once a `?.` has been seen in the current chain.
    optional_chain_member: bool,
    stop: bool,
}

impl Parser {
    // ========================================================================
    // Entry points
    // ========================================================================

    /// Parse an expression, including declarations and control forms.
    pub(crate) fn parse_expression(&mut self, is_statement: bool) -> SyntaxResult<NodeId> {
        match self.ty() {
            TokenType::Var | TokenType::Let | TokenType::Const => self.parse_var(false),
            TokenType::If
            | TokenType::While
            | TokenType::Do
            | TokenType::For
            | TokenType::Switch
            | TokenType::Try
            | TokenType::Cond => self.parse_control_form(is_statement),
            _ => self.parse_expression_no_keyword(),
        }
    }

    /// Parse a comma-separated expression.
    pub(crate) fn parse_expression_no_keyword(&mut self) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        let expr = self.parse_maybe_assign(None)?;
        if !self.is(TokenType::Comma) {
            return Ok(expr);
        }
        let mut expressions = vec![expr];
        while self.eat(TokenType::Comma)? {
            expressions.push(self.parse_maybe_assign(None)?);
        }
        Ok(self.finish(start, NodeKind::SequenceExpression { expressions }))
    }

    /// `(expression)`, as used by control-form heads.
    pub(crate) fn parse_paren_expression(&mut self) -> SyntaxResult<NodeId> {
        self.expect(TokenType::ParenL)?;
        let value = self.parse_expression(false)?;
        self.expect(TokenType::ParenR)?;
        Ok(value)
    }

    /// Whether `id` is a control form or jump that no operator may follow.
    pub(crate) fn ends_expression(&self, id: NodeId) -> bool {
        !self.is_parenthesized(id)
            && matches!(
                self.ast.kind(id),
                NodeKind::If { .. }
                    | NodeKind::While { .. }
                    | NodeKind::DoWhile { .. }
                    | NodeKind::For { .. }
                    | NodeKind::ForOf { .. }
                    | NodeKind::Switch { .. }
                    | NodeKind::Try { .. }
                    | NodeKind::Cond { .. }
                    | NodeKind::Return { .. }
                    | NodeKind::Throw { .. }
                    | NodeKind::Break
                    | NodeKind::Continue
                    | NodeKind::Debugger
            )
    }

    #[inline]
    fn is_arrow_at(&self, id: NodeId, potential_arrow_at: Option<usize>) -> bool {
        matches!(self.ast.kind(id), NodeKind::ArrowFunction { .. })
            && Some(self.ast[id].start as usize) == potential_arrow_at
    }

    // ========================================================================
    // Assignment, conditional and binary operators
    // ========================================================================

    pub(crate) fn parse_maybe_assign(&mut self, refs: ShorthandRef<'_>) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        if self.is(TokenType::Yield) && self.state.scope.in_generator {
            return self.parse_yield();
        }

        let mut own = None;
        let fail_on_shorthand = refs.is_none();
        let refs = match refs {
            Some(refs) => refs,
            None => &mut own,
        };

        if matches!(self.ty(), TokenType::ParenL | TokenType::Name | TokenType::Async) {
            self.state.potential_arrow_at = Some(self.cur_start());
        }

        let left = self.parse_maybe_conditional(refs)?;
        if self.ty().is_assign() {
            let text = self.value_string();
            let operator = AssignmentOperator::from_text(&text).ok_or_else(|| self.unexpected())?;
            if self.is_parenthesized(left)
                && matches!(self.ast.kind(left), NodeKind::Object { .. } | NodeKind::Array { .. })
            {
                return Err(self.raise(self.ast[left].start as usize, &PARENTHESIZED_PATTERN, &[]));
            }
            if self.is(TokenType::Eq) {
                self.to_assignable(left, false, "assignment expression")?;
            }
            // The shorthand default was part of a pattern after all.
            *refs = None;
            self.check_lval(left, false, None, "assignment expression")?;
            self.next()?;
            let right = self.parse_maybe_assign(None)?;
            return Ok(self.finish(start, NodeKind::AssignmentExpression { operator, left, right }));
        }
        if fail_on_shorthand {
            if let Some(pos) = *refs {
                return Err(self.unexpected_at(pos));
            }
        }
        Ok(left)
    }

    fn parse_maybe_conditional(&mut self, refs: &mut Option<usize>) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        let potential_arrow_at = self.state.potential_arrow_at;
        let expr = self.parse_expr_ops(refs)?;
        if self.is_arrow_at(expr, potential_arrow_at) || refs.is_some() || self.ends_expression(expr) {
            return Ok(expr);
        }
        if !self.eat(TokenType::Question)? {
            return Ok(expr);
        }
        let consequent = self.parse_maybe_assign(None)?;
        self.expect(TokenType::Colon)?;
        let alternate = self.parse_maybe_assign(None)?;
        Ok(self.finish(start, NodeKind::ConditionalExpression { test: expr, consequent, alternate }))
    }

    fn parse_expr_ops(&mut self, refs: &mut Option<usize>) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        let potential_arrow_at = self.state.potential_arrow_at;
        let expr = self.parse_maybe_unary(Some(&mut *refs))?;
        if self.is_arrow_at(expr, potential_arrow_at) || refs.is_some() || self.ends_expression(expr) {
            return Ok(expr);
        }
        self.parse_expr_op(expr, start, -1)
    }

    /// Parse binary operators binding tighter than `min_prec` after `left`.
    fn parse_expr_op(&mut self, left: NodeId, left_start: Start, min_prec: i32) -> SyntaxResult<NodeId> {
        let ty = self.ty();
        let Some(prec) = ty.binop() else {
            return Ok(left);
        };
        if ty == TokenType::Pipeline && self.state.no_pipe_at == Some(left_start.pos) {
            return Ok(left);
        }
        let prec = i32::from(prec);
        if prec <= min_prec {
            return Ok(left);
        }

        let text = self.value_string();
        if matches!(ty, TokenType::Power | TokenType::Exponent) {
            if let NodeKind::UnaryExpression { argument, .. } = self.ast.kind(left) {
                let extra = &self.ast[left].extra;
                if !extra.flags.contains(ExtraFlags::PARENTHESIZED_ARGUMENT) && !extra.is_parenthesized() {
                    return Err(self.raise(self.ast[*argument].start as usize, &EXPONENT_AFTER_UNARY, &[]));
                }
            }
        }
        self.next()?;

        let right_start = self.start_node();
        if ty == TokenType::Pipeline {
            // `x |> y => y + 1`
            self.state.potential_arrow_at = Some(right_start.pos);
            self.state.pipe_rhs_at = Some(right_start.pos);
        }
        let operand = self.parse_maybe_unary(None)?;
        let right = if self.ends_expression(operand) {
            operand
        } else {
            let next_min = if ty.is_right_assoc() { prec - 1 } else { prec };
            self.parse_expr_op(operand, right_start, next_min)?
        };

        let kind = match ty {
            TokenType::LogicalOr | TokenType::LogicalAnd | TokenType::NullishCoalescing => {
                let operator = LogicalOperator::from_text(&text).ok_or_else(|| self.unexpected_at(left_start.pos))?;
                NodeKind::LogicalExpression { operator, left, right }
            }
            _ => {
                let operator = BinaryOperator::from_text(&text).ok_or_else(|| self.unexpected_at(left_start.pos))?;
                NodeKind::BinaryExpression { operator, left, right }
            }
        };
        let node = self.finish(left_start, kind);
        self.parse_expr_op(node, left_start, min_prec)
    }

    // ========================================================================
    // Unary operators
    // ========================================================================

    pub(crate) fn parse_maybe_unary(&mut self, mut refs: ShorthandRef<'_>) -> SyntaxResult<NodeId> {
        if self.ty().is_prefix() {
            let start = self.start_node();
            let update = self.is(TokenType::IncDec);
            let text = self.value_string();
            self.next()?;
            let argument_ty = self.ty();
            let argument = self.parse_maybe_unary(None)?;
            if let Some(pos) = refs.as_deref().copied().flatten() {
                return Err(self.unexpected_at(pos));
            }

            if update {
                self.check_lval(argument, false, None, "prefix operation")?;
                let operator = UpdateOperator::from_text(&text).ok_or_else(|| self.unexpected_at(start.pos))?;
                return Ok(self.finish(start, NodeKind::UpdateExpression { operator, prefix: true, argument }));
            }

            let operator = UnaryOperator::from_text(&text).ok_or_else(|| self.unexpected_at(start.pos))?;
            if operator == UnaryOperator::Delete
                && self.is_strict()
                && matches!(self.ast.kind(argument), NodeKind::Identifier { .. })
            {
                return Err(self.raise(start.pos, &DELETE_LOCAL_IN_STRICT, &[]));
            }
            let parenthesized_argument = argument_ty == TokenType::ParenL && !self.is_parenthesized(argument);
            let node = self.finish(start, NodeKind::UnaryExpression { operator, argument });
            if parenthesized_argument {
                self.ast[node].extra.flags |= ExtraFlags::PARENTHESIZED_ARGUMENT;
            }
            return Ok(node);
        }

        let start = self.start_node();
        let mut expr = self.parse_expr_subscripts(refs.as_deref_mut())?;
        if refs.as_deref().is_some_and(Option::is_some) {
            return Ok(expr);
        }
        while self.ty().is_postfix() && !self.has_preceding_line_break() && !self.ends_expression(expr) {
            let text = self.value_string();
            let operator = UpdateOperator::from_text(&text).ok_or_else(|| self.unexpected())?;
            self.check_lval(expr, false, None, "postfix operation")?;
            self.next()?;
            expr = self.finish(start, NodeKind::UpdateExpression { operator, prefix: false, argument: expr });
        }
        Ok(expr)
    }

    // ========================================================================
    // Subscripts: member access, calls, bind, optional chains
    // ========================================================================

    pub(crate) fn parse_expr_subscripts(&mut self, mut refs: ShorthandRef<'_>) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        let potential_arrow_at = self.state.potential_arrow_at;
        let expr = self.parse_expr_atom(refs.as_deref_mut())?;
        if self.is_arrow_at(expr, potential_arrow_at) || self.ends_expression(expr) {
            return Ok(expr);
        }
        if refs.as_deref().is_some_and(Option::is_some) {
            return Ok(expr);
        }
        self.parse_subscripts(expr, start, false)
    }

    /// Parse an expression without call arguments, for `new` and `::`.
    pub(crate) fn parse_no_call_expr(&mut self) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        let atom = self.parse_expr_atom(None)?;
        self.parse_subscripts(atom, start, true)
    }

    pub(crate) fn parse_subscripts(&mut self, base: NodeId, start: Start, no_calls: bool) -> SyntaxResult<NodeId> {
        let mut state = SubscriptState::default();
        let mut base = base;
        while !state.stop {
            base = self.parse_subscript(base, start, no_calls, &mut state)?;
        }
        Ok(base)
    }

    fn parse_subscript(
        &mut self,
        base: NodeId,
        start: Start,
        no_calls: bool,
        state: &mut SubscriptState,
    ) -> SyntaxResult<NodeId> {
        match self.ty() {
            TokenType::DoubleColon if !no_calls => {
                self.next()?;
                let callee = self.parse_no_call_expr()?;
                state.stop = true;
                let node = self.finish(start, NodeKind::BindExpression { object: Some(base), callee });
                self.parse_subscripts(node, start, no_calls)
            }
            TokenType::QuestionDot => {
                state.optional_chain_member = true;
                if no_calls && self.tok.lookahead()?.ty == TokenType::ParenL {
                    state.stop = true;
                    return Ok(base);
                }
                self.next()?;
                if self.eat(TokenType::BracketL)? {
                    let property = self.parse_member()?;
                    self.expect(TokenType::BracketR)?;
                    let kind = NodeKind::OptionalMemberExpression { object: base, property, computed: true, optional: true };
                    return Ok(self.finish(start, kind));
                }
                if self.eat(TokenType::ParenL)? {
                    let arguments = self.parse_call_arguments(TokenType::ParenR)?;
                    let kind = NodeKind::OptionalCallExpression { callee: base, arguments, optional: true };
                    return Ok(self.finish(start, kind));
                }
                let property = self.parse_identifier(true)?;
                let kind = NodeKind::OptionalMemberExpression { object: base, property, computed: false, optional: true };
                Ok(self.finish(start, kind))
            }
            TokenType::Dot => {
                self.next()?;
                let property = self.parse_identifier(true)?;
                Ok(self.finish_member(start, base, property, false, state))
            }
            TokenType::BracketL => {
                self.next()?;
                let property = self.parse_member()?;
                self.expect(TokenType::BracketR)?;
                Ok(self.finish_member(start, base, property, true, state))
            }
            TokenType::ParenL if !no_calls => {
                self.next()?;
                let arguments = self.parse_call_arguments(TokenType::ParenR)?;
                if state.optional_chain_member {
                    let kind = NodeKind::OptionalCallExpression { callee: base, arguments, optional: false };
                    return Ok(self.finish(start, kind));
                }
                let block_param = if self.at_block_param() {
                    state.stop = true;
                    Some(self.parse_block_param()?)
                } else {
                    None
                };
                Ok(self.finish(start, NodeKind::CallExpression { callee: base, arguments, block_param }))
            }
            TokenType::BackQuote => {
                if state.optional_chain_member {
                    return Err(self.raise(start.pos, &TAGGED_TEMPLATE_IN_OPTIONAL_CHAIN, &[]));
                }
                let quasi = self.parse_template(true)?;
                Ok(self.finish(start, NodeKind::TaggedTemplateExpression { tag: base, quasi }))
            }
            _ => {
                state.stop = true;
                Ok(base)
            }
        }
    }

    fn finish_member(
        &mut self,
        start: Start,
        object: NodeId,
        property: NodeId,
        computed: bool,
        state: &SubscriptState,
    ) -> NodeId {
        let kind = if state.optional_chain_member {
            NodeKind::OptionalMemberExpression { object, property, computed, optional: false }
        } else {
            NodeKind::MemberExpression { object, property, computed }
        };
        self.finish(start, kind)
    }

    /// The inside of `[...]`: a plain property or a `begin:end` slice.
    fn parse_member(&mut self) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        if self.eat(TokenType::Colon)? {
            let end = if self.is(TokenType::BracketR) { None } else { Some(self.parse_expression_no_keyword()?) };
            return Ok(self.finish(start, NodeKind::SliceMember { beginning: None, finish: end }));
        }
        let member = self.parse_expression_no_keyword()?;
        if !self.eat(TokenType::Colon)? {
            return Ok(member);
        }
        let end = if self.is(TokenType::BracketR) { None } else { Some(self.parse_expression_no_keyword()?) };
        Ok(self.finish(start, NodeKind::SliceMember { beginning: Some(member), finish: end }))
    }

    /// Call arguments up to and including `close`.
    pub(crate) fn parse_call_arguments(&mut self, close: TokenType) -> SyntaxResult<Vec<NodeId>> {
        let mut arguments = Vec::new();
        let mut first = true;
        while !self.eat(close)? {
            if first {
                first = false;
            } else {
                self.expect(TokenType::Comma)?;
                if self.eat(close)? {
                    break;
                }
            }
            arguments.push(self.parse_expr_list_item(None)?);
        }
        Ok(arguments)
    }

    /// A comma-separated list up to `close`; holes become `None` when
    /// `allow_empty` is set.
    pub(crate) fn parse_expr_list(
        &mut self,
        close: TokenType,
        allow_empty: bool,
        mut refs: ShorthandRef<'_>,
    ) -> SyntaxResult<Vec<Option<NodeId>>> {
        let mut elements = Vec::new();
        let mut first = true;
        while !self.eat(close)? {
            if first {
                first = false;
            } else {
                self.expect(TokenType::Comma)?;
                if self.eat(close)? {
                    break;
                }
            }
            if allow_empty && self.is(TokenType::Comma) {
                elements.push(None);
                continue;
            }
            elements.push(Some(self.parse_expr_list_item(refs.as_deref_mut())?));
        }
        Ok(elements)
    }

    fn parse_expr_list_item(&mut self, refs: ShorthandRef<'_>) -> SyntaxResult<NodeId> {
        if self.is(TokenType::Ellipsis) {
            self.parse_spread(refs)
        } else {
            self.parse_maybe_assign(refs)
        }
    }

    pub(crate) fn parse_spread(&mut self, refs: ShorthandRef<'_>) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        self.next()?;
        let argument = self.parse_maybe_assign(refs)?;
        Ok(self.finish(start, NodeKind::SpreadElement { argument }))
    }

    /// A block argument may follow call arguments on the same line.
    fn at_block_param(&self) -> bool {
        matches!(self.ty(), TokenType::BraceL | TokenType::Do)
            && !self.has_preceding_line_break()
            && !self.state.in_class_heritage
    }

    /// `{ ... }`, `do { ... }` or `do (params) { ... }` after a call.
    fn parse_block_param(&mut self) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        let is_do = self.eat(TokenType::Do)?;
        let scope = FunctionScope { in_function: true, in_method: self.state.scope.in_method, ..FunctionScope::default() };
        let (params, body) = self.in_function_scope(scope, |p| {
            let params = if is_do && p.eat(TokenType::ParenL)? {
                p.parse_binding_list(TokenType::ParenR, false)?.into_iter().flatten().collect()
            } else {
                Vec::new()
            };
            let (body, _) = p.parse_braced_block(true)?;
            Ok((params, body))
        })?;
        Ok(self.finish(start, NodeKind::BlockParam { params, body, is_do }))
    }

    // ========================================================================
    // Atoms
    // ========================================================================

    pub(crate) fn parse_expr_atom(&mut self, refs: ShorthandRef<'_>) -> SyntaxResult<NodeId> {
        let can_be_arrow = self.state.potential_arrow_at == Some(self.cur_start());
        let start = self.start_node();
        match self.ty() {
            TokenType::Super => self.parse_super(),
            TokenType::Import => self.parse_import_atom(),
            TokenType::This => {
                self.next()?;
                Ok(self.finish(start, NodeKind::ThisExpression))
            }
            TokenType::Name => self.parse_name_atom(can_be_arrow, refs),
            TokenType::Async => self.parse_async_atom(can_be_arrow),
            TokenType::Num | TokenType::BigInt | TokenType::String | TokenType::Regexp => self.parse_literal(),
            TokenType::Null => {
                self.next()?;
                Ok(self.finish(start, NodeKind::NullLiteral))
            }
            TokenType::True | TokenType::False => {
                let value = self.is(TokenType::True);
                self.next()?;
                Ok(self.finish(start, NodeKind::BooleanLiteral { value }))
            }
            TokenType::ParenL => self.parse_paren_and_distinguish(can_be_arrow),
            TokenType::BracketL => self.parse_array(refs),
            TokenType::BraceL => self.parse_obj(false, refs),
            TokenType::Function => {
                self.next()?;
                self.parse_function(start, false, false)
            }
            TokenType::Class => self.parse_class(false),
            TokenType::New => self.parse_new(),
            TokenType::BackQuote => self.parse_template(false),
            TokenType::DoubleColon => {
                self.next()?;
                let callee = self.parse_no_call_expr()?;
                if !matches!(self.ast.kind(callee), NodeKind::MemberExpression { .. }) {
                    return Err(self.raise(self.ast[callee].start as usize, &BIND_REQUIRES_MEMBER, &[]));
                }
                Ok(self.finish(start, NodeKind::BindExpression { object: None, callee }))
            }
            TokenType::If
            | TokenType::While
            | TokenType::Do
            | TokenType::For
            | TokenType::Switch
            | TokenType::Try
            | TokenType::Cond => self.parse_control_form(false),
            TokenType::Return => self.parse_return(),
            TokenType::Throw => self.parse_throw(),
            TokenType::Await => self.parse_await(),
            TokenType::Yield if self.state.scope.in_generator => self.parse_yield(),
            TokenType::Break => {
                self.next()?;
                Ok(self.finish(start, NodeKind::Break))
            }
            TokenType::Continue => {
                self.next()?;
                Ok(self.finish(start, NodeKind::Continue))
            }
            TokenType::Debugger => {
                self.next()?;
                Ok(self.finish(start, NodeKind::Debugger))
            }
            TokenType::Export => Err(self.raise(start.pos, &EXPORT_NOT_TOP_LEVEL, &[])),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_super(&mut self) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        let in_method = self.state.scope.in_method;
        let allowed = self.options.allow_super_outside_method;
        if in_method.is_none() && !allowed {
            return Err(self.raise(start.pos, &SUPER_OUTSIDE_METHOD, &[]));
        }
        self.next()?;
        if !matches!(self.ty(), TokenType::ParenL | TokenType::BracketL | TokenType::Dot) {
            return Err(self.unexpected());
        }
        if self.is(TokenType::ParenL) && in_method != Some(MethodKind::Constructor) && !allowed {
            return Err(self.raise(start.pos, &SUPER_CALL_OUTSIDE_CONSTRUCTOR, &[]));
        }
        Ok(self.finish(start, NodeKind::Super))
    }

    /// `import.meta` or `import(source)`.
    pub(crate) fn parse_import_atom(&mut self) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        if self.tok.lookahead()?.ty == TokenType::Dot {
            let meta = self.parse_identifier(true)?;
            self.expect(TokenType::Dot)?;
            if !self.options.is_module() {
                return Err(self.raise(start.pos, &IMPORT_META_OUTSIDE_MODULE, &[]));
            }
            return self.parse_meta_property(start, meta, "import", "meta");
        }
        self.next()?;
        self.expect(TokenType::ParenL)?;
        let arguments = self.parse_call_arguments(TokenType::ParenR)?;
        let [argument] = arguments[..] else {
            return Err(self.raise(start.pos, &IMPORT_CALL_ARITY, &[]));
        };
        if matches!(self.ast.kind(argument), NodeKind::SpreadElement { .. }) {
            return Err(self.raise(self.ast[argument].start as usize, &IMPORT_CALL_SPREAD, &[]));
        }
        Ok(self.finish(start, NodeKind::ImportCall { argument }))
    }

    fn parse_meta_property(&mut self, start: Start, meta: NodeId, meta_name: &str, property_name: &str) -> SyntaxResult<NodeId> {
        let contains_esc = self.tok.state.contains_esc;
        let property = self.parse_identifier(true)?;
        if contains_esc || self.ast.identifier_name(property) != Some(property_name) {
            return Err(self.raise(
                self.ast[property].start as usize,
                &INVALID_META_PROPERTY,
                &[meta_name, property_name],
            ));
        }
        Ok(self.finish(start, NodeKind::MetaProperty { meta, property }))
    }

    /// A name, which may start a collection literal or an arrow function.
    fn parse_name_atom(&mut self, can_be_arrow: bool, refs: ShorthandRef<'_>) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        let id = self.parse_identifier(false)?;

        if self.eat_collection_hash()? {
            let collection = match self.ty() {
                TokenType::BraceL => self.parse_collection_body(refs)?,
                TokenType::BracketL => self.parse_array(refs)?,
                TokenType::ParenL => self.parse_paren_and_distinguish(false)?,
                TokenType::Name => self.parse_identifier(false)?,
                _ => self.parse_expr_atom(refs)?,
            };
            return Ok(self.finish(start, NodeKind::CollectionLiteral { constructor: id, collection }));
        }

        if can_be_arrow && self.at_arrow(start.pos) {
            let thin = self.is(TokenType::ArrowThin);
            self.next()?;
            return self.parse_arrow_expression(start, vec![id], false, thin);
        }
        Ok(id)
    }

    /// Whether an arrow token for parameters starting at `params_start`
    /// follows.
    fn at_arrow(&self, params_start: usize) -> bool {
        matches!(self.ty(), TokenType::Arrow | TokenType::ArrowThin)
            && self.state.no_arrow_at != Some(params_start)
            && !self.has_preceding_line_break()
    }

    fn parse_async_atom(&mut self, can_be_arrow: bool) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        let ahead = self.tok.lookahead()?;
        let same_line = !self.tok.has_line_break(self.tok.state.end, ahead.start);

        if ahead.ty == TokenType::Function && same_line {
            self.next()?;
            self.next()?;
            return self.parse_function(start, true, false);
        }
        if can_be_arrow && same_line && matches!(ahead.ty, TokenType::ParenL | TokenType::Name) {
            self.next()?;
            let params = if self.eat(TokenType::ParenL)? {
                self.parse_binding_list(TokenType::ParenR, false)?.into_iter().flatten().collect()
            } else {
                vec![self.parse_identifier(false)?]
            };
            if !matches!(self.ty(), TokenType::Arrow | TokenType::ArrowThin) || self.has_preceding_line_break() {
                return Err(self.expected("=>"));
            }
            let thin = self.is(TokenType::ArrowThin);
            self.next()?;
            return self.parse_arrow_expression(start, params, true, thin);
        }

        // A plain identifier named `async`.
        self.next()?;
        let name = self.intern("async");
        Ok(self.finish(start, NodeKind::Identifier { name }))
    }

    /// Parse the current token as an identifier. `liberal` also accepts
    /// keywords, for property names.
    pub(crate) fn parse_identifier(&mut self, liberal: bool) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        let ty = self.ty();
        let name = match self.value() {
            TokenValue::Str(name) if ty == TokenType::Name => name.clone(),
            _ if liberal && ty.is_keyword() => self.value_string(),
            _ => return Err(self.unexpected()),
        };
        self.next()?;
        let name = self.intern(&name);
        Ok(self.finish(start, NodeKind::Identifier { name }))
    }

    pub(crate) fn parse_literal(&mut self) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        let raw = self.slice(self.cur_start(), self.tok.state.end);
        let kind = match self.value().clone() {
            TokenValue::Num(value) => NodeKind::NumericLiteral { value },
            TokenValue::BigInt(value) => NodeKind::BigIntLiteral { value },
            TokenValue::Str(value) if self.is(TokenType::String) => NodeKind::StringLiteral { value },
            TokenValue::RegExp { pattern, flags } => NodeKind::RegExpLiteral { pattern, flags },
            _ => return Err(self.unexpected()),
        };
        self.next()?;
        let node = self.finish(start, kind);
        self.ast[node].extra.raw = Some(raw);
        Ok(node)
    }

    // ========================================================================
    // Parentheses and arrow functions
    // ========================================================================

    /// Parse `( ... )`, deciding afterwards whether it was an arrow
    /// function's parameter list.
    fn parse_paren_and_distinguish(&mut self, can_be_arrow: bool) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        self.expect(TokenType::ParenL)?;

        let inner_start = self.start_node();
        let mut exprs = Vec::new();
        let mut shorthand = None;
        let mut first = true;
        let mut spread_start = None;
        let mut trailing_comma = None;

        while !self.is(TokenType::ParenR) {
            if first {
                first = false;
            } else {
                self.expect(TokenType::Comma)?;
                if self.is(TokenType::ParenR) {
                    trailing_comma = Some(self.cur_start());
                    break;
                }
            }
            if self.is(TokenType::Ellipsis) {
                spread_start = Some(self.cur_start());
                exprs.push(self.parse_rest()?);
                if self.is(TokenType::Comma) && self.tok.lookahead()?.ty == TokenType::ParenR {
                    return Err(self.raise(self.cur_start(), &TRAILING_COMMA_AFTER_REST, &[]));
                }
                break;
            }
            exprs.push(self.parse_maybe_assign(Some(&mut shorthand))?);
        }
        self.expect(TokenType::ParenR)?;

        if can_be_arrow && self.at_arrow(start.pos) {
            for &param in &exprs {
                if self.is_parenthesized(param) {
                    let paren_start = self.ast[param].extra.paren_start.unwrap_or(self.ast[param].start);
                    return Err(self.unexpected_at(paren_start as usize));
                }
            }
            let thin = self.is(TokenType::ArrowThin);
            self.next()?;
            return self.parse_arrow_expression(start, exprs, false, thin);
        }

        let Some(&last) = exprs.last() else {
            return Err(self.unexpected_at(self.tok.state.last_tok_start));
        };
        if let Some(pos) = trailing_comma.or(spread_start).or(shorthand) {
            return Err(self.unexpected_at(pos));
        }
        let value = if exprs.len() > 1 {
            let end = self.ast[last].end as usize;
            self.finish_at(inner_start, NodeKind::SequenceExpression { expressions: exprs }, end)
        } else {
            last
        };
        self.mark_parenthesized(value, start.pos);
        Ok(value)
    }

    /// Finish an arrow function whose arrow token has been consumed.
    pub(crate) fn parse_arrow_expression(
        &mut self,
        start: Start,
        params: Vec<NodeId>,
        is_async: bool,
        thin: bool,
    ) -> SyntaxResult<NodeId> {
        let as_list: Vec<Option<NodeId>> = params.iter().copied().map(Some).collect();
        self.to_assignable_list(&as_list, true, "arrow function parameters")?;

        let (generator, curried) = self.parse_function_mods()?;
        let in_pipe = self.state.pipe_rhs_at == Some(start.pos);
        let scope = FunctionScope {
            in_function: true,
            in_generator: generator,
            in_async: is_async,
            in_method: self.state.scope.in_method,
        };
        let (body, strict_body) = self.in_function_scope(scope, |p| p.parse_function_body(true, in_pipe))?;
        self.check_params(&params, None, strict_body, true)?;
        Ok(self.finish(start, NodeKind::ArrowFunction { params, body, is_async, generator, curried, thin }))
    }

    // ========================================================================
    // Functions
    // ========================================================================

    /// `*` marks a generator and `%` a curried function.
    pub(crate) fn parse_function_mods(&mut self) -> SyntaxResult<(bool, bool)> {
        let mut generator = false;
        let mut curried = false;
        loop {
            match self.ty() {
                TokenType::Star => generator = true,
                TokenType::Modulo => curried = true,
                _ => return Ok((generator, curried)),
            }
            self.next()?;
        }
    }

    /// Parse a function after its `function` keyword.
    pub(crate) fn parse_function(&mut self, start: Start, is_async: bool, is_statement: bool) -> SyntaxResult<NodeId> {
        let (generator, curried) = self.parse_function_mods()?;
        let id = if self.is(TokenType::Name) {
            Some(self.parse_identifier(false)?)
        } else if is_statement {
            return Err(self.expected("name"));
        } else {
            None
        };
        let scope = FunctionScope { in_function: true, in_generator: generator, in_async: is_async, in_method: None };
        let (params, body, strict_body) = self.parse_params_and_body(scope, !is_statement)?;
        self.check_params(&params, id, strict_body, false)?;
        Ok(self.finish(
            start,
            NodeKind::Function { id, params, body, generator, is_async, curried, declares: is_statement },
        ))
    }

    /// `(params) body` in a fresh function scope.
    pub(crate) fn parse_params_and_body(
        &mut self,
        scope: FunctionScope,
        allow_expression: bool,
    ) -> SyntaxResult<(Vec<NodeId>, NodeId, bool)> {
        self.in_function_scope(scope, |p| {
            p.expect(TokenType::ParenL)?;
            let params: Vec<NodeId> = p.parse_binding_list(TokenType::ParenR, false)?.into_iter().flatten().collect();
            let (body, strict_body) = p.parse_function_body(allow_expression, false)?;
            Ok((params, body, strict_body))
        })
    }

    /// A braced function body, or a single expression when allowed.
    /// Returns the body and whether it switched on strict mode.
    pub(crate) fn parse_function_body(&mut self, allow_expression: bool, no_pipe: bool) -> SyntaxResult<(NodeId, bool)> {
        if self.is(TokenType::BraceL) {
            return self.parse_braced_block(true);
        }
        if !allow_expression {
            return Err(self.raise(self.cur_start(), &SINGLE_EXPRESSION_BODY, &[]));
        }
        let start = self.start_node();
        let outer_no_pipe = self.state.no_pipe_at;
        if no_pipe {
            self.state.no_pipe_at = Some(self.cur_start());
        }
        let expression = self.parse_expression(false);
        self.state.no_pipe_at = outer_no_pipe;
        let expression = expression?;
        Ok((self.finish(start, NodeKind::SingleExpression { expression }), false))
    }

    /// Validate parameter names once the body's strictness is known.
    pub(crate) fn check_params(
        &self,
        params: &[NodeId],
        id: Option<NodeId>,
        strict_body: bool,
        is_arrow: bool,
    ) -> SyntaxResult<()> {
        if !(self.is_strict() || strict_body || is_arrow) {
            return Ok(());
        }
        if let Some(id) = id {
            self.check_lval(id, true, None, "function name")?;
        }
        let mut names = rustc_hash::FxHashSet::default();
        for &param in params {
            if strict_body && !matches!(self.ast.kind(param), NodeKind::Identifier { .. }) {
                return Err(self.raise(self.ast[param].start as usize, &NON_SIMPLE_PARAMETER_IN_STRICT, &[]));
            }
            self.check_lval(param, true, Some(&mut names), "function parameter list")?;
        }
        Ok(())
    }

    fn parse_new(&mut self) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        if self.tok.lookahead()?.ty == TokenType::Dot {
            let meta = self.parse_identifier(true)?;
            self.expect(TokenType::Dot)?;
            let node = self.parse_meta_property(start, meta, "new", "target")?;
            if !self.state.scope.in_function {
                return Err(self.raise(start.pos, &NEW_TARGET_OUTSIDE_FUNCTION, &[]));
            }
            return Ok(node);
        }
        self.next()?;
        let callee = self.parse_no_call_expr()?;
        if matches!(
            self.ast.kind(callee),
            NodeKind::OptionalMemberExpression { .. } | NodeKind::OptionalCallExpression { .. }
        ) {
            return Err(self.raise(self.last_tok_end(), &NEW_IN_OPTIONAL_CHAIN, &[]));
        }
        if self.is(TokenType::QuestionDot) {
            return Err(self.raise(self.cur_start(), &NEW_IN_OPTIONAL_CHAIN, &[]));
        }
        let arguments = if self.eat(TokenType::ParenL)? {
            self.parse_call_arguments(TokenType::ParenR)?
        } else {
            Vec::new()
        };
        Ok(self.finish(start, NodeKind::NewExpression { callee, arguments }))
    }

    fn parse_await(&mut self) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        let scope = self.state.scope;
        if !scope.in_async && !(self.options.allow_await_outside_function && !scope.in_function) {
            return Err(self.raise(start.pos, &AWAIT_OUTSIDE_ASYNC, &[]));
        }
        self.next()?;
        if self.is(TokenType::Star) {
            return Err(self.raise(start.pos, &AWAIT_STAR_REMOVED, &[]));
        }
        let argument = self.parse_maybe_unary(None)?;
        Ok(self.finish(start, NodeKind::AwaitExpression { argument }))
    }

    fn parse_yield(&mut self) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        self.next()?;
        let (argument, delegate) =
            if self.at_statement_end() || (!self.is(TokenType::Star) && !self.ty().starts_expr()) {
                (None, false)
            } else {
                let delegate = self.eat(TokenType::Star)?;
                (Some(self.parse_maybe_assign(None)?), delegate)
            };
        Ok(self.finish(start, NodeKind::YieldExpression { argument, delegate }))
    }

    // ========================================================================
    // Templates
    // ========================================================================

    pub(crate) fn parse_template(&mut self, tagged: bool) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        self.next()?;
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();
        loop {
            let (element, tail) = self.parse_template_element(tagged)?;
            quasis.push(element);
            if tail {
                break;
            }
            self.expect(TokenType::DollarBraceL)?;
            expressions.push(self.parse_expression(false)?);
            self.expect(TokenType::BraceR)?;
        }
        self.next()?;
        Ok(self.finish(start, NodeKind::TemplateLiteral { quasis, expressions }))
    }

    fn parse_template_element(&mut self, tagged: bool) -> SyntaxResult<(NodeId, bool)> {
        let start = self.start_node();
        let TokenValue::Template(cooked) = self.value().clone() else {
            return Err(self.expected("template"));
        };
        if cooked.is_none() {
            if !tagged {
                let pos = self.tok.state.invalid_template_escape_position.unwrap_or(start.pos);
                return Err(self.raise(pos, &INVALID_TEMPLATE_ESCAPE, &[]));
            }
            self.tok.state.invalid_template_escape_position = None;
        }
        let raw = self
            .slice(self.cur_start(), self.tok.state.end)
            .replace("\r\n", "\n")
            .replace('\r', "\n");
        self.next()?;
        let tail = self.is(TokenType::BackQuote);
        Ok((self.finish(start, NodeKind::TemplateElement { raw, cooked, tail }), tail))
    }

    // ========================================================================
    // Arrays, objects and collections
    // ========================================================================

    fn parse_array(&mut self, refs: ShorthandRef<'_>) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        self.next()?;
        let elements = self.parse_expr_list(TokenType::BracketR, true, refs)?;
        Ok(self.finish(start, NodeKind::Array { elements }))
    }

    /// Parse an object literal, or an object pattern when `is_pattern`.
    pub(crate) fn parse_obj(&mut self, is_pattern: bool, mut refs: ShorthandRef<'_>) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        self.next()?;
        let mut properties = Vec::new();
        let mut first = true;
        let mut has_proto = false;
        let mut first_rest = None;

        while !self.eat(TokenType::BraceR)? {
            if first {
                first = false;
            } else {
                self.expect(TokenType::Comma)?;
                if self.eat(TokenType::BraceR)? {
                    break;
                }
            }

            if self.is(TokenType::Ellipsis) {
                if !is_pattern {
                    properties.push(self.parse_spread(refs.as_deref_mut())?);
                    continue;
                }
                properties.push(self.parse_rest()?);
                let position = self.cur_start();
                if let Some(rest) = first_rest {
                    return Err(self.raise(rest, &MULTIPLE_REST, &[]));
                }
                if self.eat(TokenType::BraceR)? {
                    break;
                }
                if self.is(TokenType::Comma) && self.tok.lookahead()?.ty == TokenType::BraceR {
                    return Err(self.raise(position, &TRAILING_COMMA_AFTER_REST, &[]));
                }
                first_rest = Some(position);
                continue;
            }

            let prop = self.parse_object_member(is_pattern, refs.as_deref_mut())?;
            if !is_pattern {
                if let NodeKind::ObjectProperty { key, computed: false, shorthand: false, .. } = *self.ast.kind(prop) {
                    if self.static_key_name(key).as_deref() == Some("__proto__") {
                        if has_proto {
                            return Err(self.raise(self.ast[key].start as usize, &REDEFINITION_OF_PROTO, &[]));
                        }
                        has_proto = true;
                    }
                }
            }
            properties.push(prop);
        }

        if let Some(rest) = first_rest {
            return Err(self.raise(rest, &REST_NOT_LAST, &[]));
        }
        let kind = if is_pattern { NodeKind::ObjectPattern { properties } } else { NodeKind::Object { properties } };
        Ok(self.finish(start, kind))
    }

    fn parse_object_member(&mut self, is_pattern: bool, refs: ShorthandRef<'_>) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        let mut generator = !is_pattern && self.eat(TokenType::Star)?;
        let mut is_async = false;
        let contains_esc = self.tok.state.contains_esc;

        if !is_pattern && !generator && self.is(TokenType::Async) {
            let ahead = self.tok.lookahead()?;
            let is_key = matches!(
                ahead.ty,
                TokenType::Colon | TokenType::ParenL | TokenType::BraceR | TokenType::Eq | TokenType::Comma
            ) || self.tok.has_line_break(self.tok.state.end, ahead.start);
            if !is_key {
                self.next()?;
                is_async = true;
                generator = self.eat(TokenType::Star)?;
            }
        }
        let (key, computed, key_ty) = self.parse_property_name()?;

        if is_async || generator || self.is(TokenType::ParenL) {
            if is_pattern {
                return Err(self.unexpected());
            }
            return self.parse_object_method(start, MethodKind::Method, key, computed, generator, is_async);
        }

        if !is_pattern && !computed && !contains_esc && key_ty == TokenType::Name {
            let accessor = match self.ast.identifier_name(key) {
                Some("get") => Some(MethodKind::Get),
                Some("set") => Some(MethodKind::Set),
                _ => None,
            };
            let named = matches!(self.ty(), TokenType::String | TokenType::Num | TokenType::BracketL | TokenType::Name)
                || self.ty().is_keyword();
            if let (Some(kind), true) = (accessor, named) {
                let (key, computed, _) = self.parse_property_name()?;
                let method = self.parse_object_method(start, kind, key, computed, false, false)?;
                self.check_getter_setter_params(method)?;
                return Ok(method);
            }
        }

        if self.eat(TokenType::Colon)? {
            let value = if is_pattern { self.parse_maybe_default(None, None)? } else { self.parse_maybe_assign(refs)? };
            return Ok(self.finish(start, NodeKind::ObjectProperty { key, value, computed, shorthand: false }));
        }

        if computed || key_ty != TokenType::Name {
            return Err(self.unexpected());
        }
        let copy = self.clone_identifier(key);
        let value = if is_pattern {
            self.parse_maybe_default(Some(start), Some(copy))?
        } else if let (true, Some(refs)) = (self.is(TokenType::Eq), refs) {
            if refs.is_none() {
                *refs = Some(self.cur_start());
            }
            self.parse_maybe_default(Some(start), Some(copy))?
        } else {
            copy
        };
        let prop = self.finish(start, NodeKind::ObjectProperty { key, value, computed: false, shorthand: true });
        self.ast[prop].extra.flags |= ExtraFlags::SHORTHAND;
        Ok(prop)
    }

    fn parse_object_method(
        &mut self,
        start: Start,
        kind: MethodKind,
        key: NodeId,
        computed: bool,
        generator: bool,
        is_async: bool,
    ) -> SyntaxResult<NodeId> {
        let scope = FunctionScope { in_function: true, in_generator: generator, in_async: is_async, in_method: Some(kind) };
        let (params, body, strict_body) = self.parse_params_and_body(scope, false)?;
        self.check_params(&params, None, strict_body, false)?;
        Ok(self.finish(start, NodeKind::ObjectMethod { kind, key, params, body, computed, generator, is_async }))
    }

    pub(crate) fn check_getter_setter_params(&self, method: NodeId) -> SyntaxResult<()> {
        let (kind, params) = match self.ast.kind(method) {
            NodeKind::ObjectMethod { kind, params, .. } | NodeKind::ClassMethod { kind, params, .. } => (*kind, params),
            _ => return Ok(()),
        };
        let start = self.ast[method].start as usize;
        match kind {
            MethodKind::Get if !params.is_empty() => Err(self.raise(start, &GETTER_ARITY, &[])),
            MethodKind::Set if params.len() != 1 => Err(self.raise(start, &SETTER_ARITY, &[])),
            MethodKind::Set if matches!(self.ast.kind(params[0]), NodeKind::RestElement { .. }) => {
                Err(self.raise(start, &SETTER_REST, &[]))
            }
            _ => Ok(()),
        }
    }

    /// Returns the key, whether it is computed, and the key's token type.
    pub(crate) fn parse_property_name(&mut self) -> SyntaxResult<(NodeId, bool, TokenType)> {
        let ty = self.ty();
        if self.eat(TokenType::BracketL)? {
            let key = self.parse_expression_no_keyword()?;
            self.expect(TokenType::BracketR)?;
            return Ok((key, true, ty));
        }
        let key = match ty {
            TokenType::Num | TokenType::String | TokenType::BigInt => self.parse_literal()?,
            _ => self.parse_identifier(true)?,
        };
        Ok((key, false, ty))
    }

    /// The name of a non-computed identifier or string key.
    pub(crate) fn static_key_name(&self, key: NodeId) -> Option<String> {
        match self.ast.kind(key) {
            NodeKind::Identifier { name } => Some(self.ast.name(*name).to_string()),
            NodeKind::StringLiteral { value } => Some(value.clone()),
            _ => None,
        }
    }

    /// The `{ ... }` of `Name#{ ... }`: keyed entries make an object, bare
    /// entries an array.
    fn parse_collection_body(&mut self, mut refs: ShorthandRef<'_>) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        self.next()?;
        let mut entries = Vec::new();
        let mut has_keyed = false;
        let mut has_bare = false;
        let mut first = true;

        while !self.eat(TokenType::BraceR)? {
            if first {
                first = false;
            } else {
                self.expect(TokenType::Comma)?;
                if self.eat(TokenType::BraceR)? {
                    break;
                }
            }
            if self.is(TokenType::Ellipsis) {
                entries.push(self.parse_spread(refs.as_deref_mut())?);
                continue;
            }
            let entry_start = self.start_node();
            let value = self.parse_maybe_assign(refs.as_deref_mut())?;
            if self.eat(TokenType::Colon)? {
                if has_bare {
                    return Err(self.raise(entry_start.pos, &MIXED_COLLECTION_ENTRIES, &[]));
                }
                has_keyed = true;
                let (key, computed) = self.collection_key(value)?;
                let value = self.parse_maybe_assign(refs.as_deref_mut())?;
                entries.push(self.finish(entry_start, NodeKind::ObjectProperty { key, value, computed, shorthand: false }));
            } else {
                if has_keyed {
                    return Err(self.raise(entry_start.pos, &MIXED_COLLECTION_ENTRIES, &[]));
                }
                has_bare = true;
                entries.push(value);
            }
        }

        let kind = if has_keyed || entries.is_empty() {
            NodeKind::Object { properties: entries }
        } else {
            NodeKind::Array { elements: entries.into_iter().map(Some).collect() }
        };
        Ok(self.finish(start, kind))
    }

    /// A collection key: a name, a string or number, or `[expr]`.
    fn collection_key(&self, expr: NodeId) -> SyntaxResult<(NodeId, bool)> {
        if !self.is_parenthesized(expr) {
            match self.ast.kind(expr) {
                NodeKind::Identifier { .. } | NodeKind::StringLiteral { .. } | NodeKind::NumericLiteral { .. } => {
                    return Ok((expr, false));
                }
                NodeKind::Array { elements } => {
                    if let [Some(key)] = elements[..] {
                        return Ok((key, true));
                    }
                }
                _ => {}
            }
        }
        Err(self.unexpected_at(self.ast[expr].start as usize))
    }
}
