//! Statement lists, control forms, declarations and modules.

use expressive_ast::node::*;
use expressive_ast::{MethodKind, NodeKind, VarKind};
use expressive_diagnostics::messages::*;
use expressive_diagnostics::SyntaxResult;
use expressive_scanner::TokenType;
use rustc_hash::FxHashSet;

use crate::parser::{FunctionScope, Parser, Start};

impl Parser {
    // ========================================================================
    // Statement lists and blocks
    // ========================================================================

    /// Parse statements until `end`. With `directives`, a leading
    /// `"use strict"` switches on strict mode for the rest of the list.
    pub(crate) fn parse_statement_list(&mut self, end: TokenType, directives: bool) -> SyntaxResult<Vec<NodeId>> {
        let mut body = Vec::new();
        let mut in_prologue = directives;
        while !self.is(end) {
            if self.eat(TokenType::Semi)? {
                continue;
            }
            let stmt = self.parse_statement()?;
            if in_prologue {
                if self.is_use_strict(stmt) {
                    self.set_strict(true)?;
                } else if !matches!(self.ast.kind(stmt), NodeKind::StringLiteral { .. }) {
                    in_prologue = false;
                }
            }
            body.push(stmt);
        }
        Ok(body)
    }

    fn is_use_strict(&self, id: NodeId) -> bool {
        let node = &self.ast[id];
        matches!(node.kind, NodeKind::StringLiteral { .. })
            && !node.extra.is_parenthesized()
            && matches!(node.extra.raw.as_deref(), Some("'use strict'" | "\"use strict\""))
    }

    /// `{ ... }`. Returns the block and whether its directives made it
    /// strict.
    pub(crate) fn parse_braced_block(&mut self, function_body: bool) -> SyntaxResult<(NodeId, bool)> {
        let start = self.start_node();
        self.expect(TokenType::BraceL)?;
        let outer_strict = self.is_strict();
        self.state.block_depth += 1;
        let body = self.parse_statement_list(TokenType::BraceR, function_body);
        self.state.block_depth -= 1;
        let body = body?;

        let strict_body = function_body && !outer_strict && self.is_strict();
        self.set_strict(outer_strict)?;
        self.expect(TokenType::BraceR)?;
        Ok((self.finish(start, NodeKind::Block { body }), strict_body))
    }

    /// The body of a control form: a block or a single expression.
    pub(crate) fn parse_body(&mut self, is_statement: bool) -> SyntaxResult<NodeId> {
        if self.is(TokenType::BraceL) {
            return Ok(self.parse_braced_block(false)?.0);
        }
        let start = self.start_node();
        let expression = self.parse_expression(is_statement)?;
        Ok(self.finish(start, NodeKind::SingleExpression { expression }))
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub(crate) fn parse_statement(&mut self) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        let node = match self.ty() {
            TokenType::Import if !matches!(self.tok.lookahead()?.ty, TokenType::ParenL | TokenType::Dot) => {
                self.check_module_item()?;
                self.parse_import()?
            }
            TokenType::Export => {
                self.check_module_item()?;
                self.parse_export()?
            }
            TokenType::Function => {
                self.next()?;
                self.parse_function(start, false, true)?
            }
            TokenType::Async if self.at_async_function()? => {
                self.next()?;
                self.next()?;
                self.parse_function(start, true, true)?
            }
            TokenType::Class => self.parse_class(true)?,
            _ => self.parse_expression(true)?,
        };
        self.finish_statement(node)
    }

    /// `async function` on one line.
    fn at_async_function(&mut self) -> SyntaxResult<bool> {
        let ahead = self.tok.lookahead()?;
        Ok(ahead.ty == TokenType::Function && !self.tok.has_line_break(self.tok.state.end, ahead.start))
    }

    fn check_module_item(&self) -> SyntaxResult<()> {
        if self.options.allow_import_export_everywhere {
            return Ok(());
        }
        if !self.at_top_level() {
            return Err(self.raise(self.cur_start(), &IMPORT_EXPORT_TOP_LEVEL, &[]));
        }
        if !self.options.is_module() {
            return Err(self.raise(self.cur_start(), &IMPORT_EXPORT_ONLY_MODULE, &[]));
        }
        Ok(())
    }

    // ========================================================================
    // Control forms
    // ========================================================================

    pub(crate) fn parse_control_form(&mut self, is_statement: bool) -> SyntaxResult<NodeId> {
        match self.ty() {
            TokenType::If => self.parse_if(is_statement),
            TokenType::While => self.parse_while(is_statement),
            TokenType::Do => self.parse_do(is_statement),
            TokenType::For => self.parse_for(is_statement),
            TokenType::Switch => self.parse_switch(is_statement),
            TokenType::Try => self.parse_try(is_statement),
            TokenType::Cond => self.parse_cond(),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_if(&mut self, is_statement: bool) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        self.next()?;
        let test = self.parse_paren_expression()?;
        let consequent = self.parse_body(is_statement)?;
        // `if (a) b; else c`
        if self.is(TokenType::Semi) && self.tok.lookahead()?.ty == TokenType::Else {
            self.next()?;
        }
        let alternate = if self.eat(TokenType::Else)? { Some(self.parse_body(is_statement)?) } else { None };
        Ok(self.finish(start, NodeKind::If { test, consequent, alternate, is_statement }))
    }

    fn parse_while(&mut self, is_statement: bool) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        self.next()?;
        let test = self.parse_paren_expression()?;
        let body = self.parse_body(is_statement)?;
        Ok(self.finish(start, NodeKind::While { test, body, is_statement }))
    }

    fn parse_do(&mut self, is_statement: bool) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        self.next()?;
        let body = self.parse_body(is_statement)?;
        if self.is(TokenType::Semi) && self.tok.lookahead()?.ty == TokenType::While {
            self.next()?;
        }
        self.expect(TokenType::While)?;
        let test = self.parse_paren_expression()?;
        Ok(self.finish(start, NodeKind::DoWhile { body, test, is_statement }))
    }

    fn parse_for(&mut self, is_statement: bool) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        self.next()?;
        let is_await = self.is(TokenType::Await);
        if is_await {
            if !self.state.scope.in_async {
                return Err(self.raise(self.cur_start(), &AWAIT_OUTSIDE_ASYNC, &[]));
            }
            self.next()?;
        }
        self.expect(TokenType::ParenL)?;

        if self.is(TokenType::Semi) {
            if is_await {
                return Err(self.unexpected());
            }
            return self.parse_for_rest(start, None, is_statement);
        }

        let init = if matches!(self.ty(), TokenType::Var | TokenType::Let | TokenType::Const) {
            let init = self.parse_var(true)?;
            let single = matches!(self.ast.kind(init), NodeKind::VariableDeclaration { declarations, .. } if declarations.len() == 1);
            if single && self.is_contextual("of") {
                return self.parse_for_of(start, init, is_await, is_statement);
            }
            init
        } else {
            let init = self.parse_expression_no_keyword()?;
            if self.is_contextual("of") {
                self.to_assignable(init, false, "for-of statement")?;
                self.check_lval(init, false, None, "for-of statement")?;
                return self.parse_for_of(start, init, is_await, is_statement);
            }
            init
        };
        if is_await {
            return Err(self.unexpected());
        }
        self.parse_for_rest(start, Some(init), is_statement)
    }

    fn parse_for_rest(&mut self, start: Start, init: Option<NodeId>, is_statement: bool) -> SyntaxResult<NodeId> {
        self.expect(TokenType::Semi)?;
        let test = if self.is(TokenType::Semi) { None } else { Some(self.parse_expression_no_keyword()?) };
        self.expect(TokenType::Semi)?;
        let update = if self.is(TokenType::ParenR) { None } else { Some(self.parse_expression_no_keyword()?) };
        self.expect(TokenType::ParenR)?;
        let body = self.parse_body(is_statement)?;
        Ok(self.finish(start, NodeKind::For { init, test, update, body, is_statement }))
    }

    fn parse_for_of(&mut self, start: Start, left: NodeId, is_await: bool, is_statement: bool) -> SyntaxResult<NodeId> {
        self.expect_contextual("of")?;
        let right = self.parse_maybe_assign(None)?;
        self.expect(TokenType::ParenR)?;
        let body = self.parse_body(is_statement)?;
        Ok(self.finish(start, NodeKind::ForOf { left, right, body, is_await, is_statement }))
    }

    fn parse_switch(&mut self, is_statement: bool) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        self.next()?;
        let discriminant = self.parse_paren_expression()?;
        self.expect(TokenType::BraceL)?;

        let mut cases = Vec::new();
        let mut saw_default = false;
        while !self.eat(TokenType::BraceR)? {
            let case_start = self.start_node();
            let test = match self.ty() {
                TokenType::Case => {
                    self.next()?;
                    Some(self.parse_paren_expression()?)
                }
                TokenType::Default => {
                    if saw_default {
                        return Err(self.raise(case_start.pos, &MULTIPLE_DEFAULT_CLAUSES, &[]));
                    }
                    saw_default = true;
                    self.next()?;
                    None
                }
                _ => return Err(self.unexpected()),
            };
            let body = self.parse_body(is_statement)?;
            cases.push(self.finish(case_start, NodeKind::Case { test, body }));
            self.eat(TokenType::Semi)?;
        }
        Ok(self.finish(start, NodeKind::Switch { discriminant, cases, is_statement }))
    }

    fn parse_try(&mut self, is_statement: bool) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        self.next()?;
        let block = self.parse_body(is_statement)?;

        let handler = if self.is(TokenType::Catch) {
            let clause_start = self.start_node();
            self.next()?;
            let param = if self.eat(TokenType::ParenL)? {
                let param = self.parse_binding_atom()?;
                let mut names = FxHashSet::default();
                self.check_lval(param, true, Some(&mut names), "catch clause")?;
                self.expect(TokenType::ParenR)?;
                Some(param)
            } else {
                None
            };
            let body = self.parse_body(is_statement)?;
            Some(self.finish(clause_start, NodeKind::CatchClause { param, body }))
        } else {
            None
        };
        let finalizer = if self.eat(TokenType::Finally)? { Some(self.parse_body(is_statement)?) } else { None };

        if handler.is_none() && finalizer.is_none() {
            return Err(self.raise(start.pos, &MISSING_CATCH_OR_FINALLY, &[]));
        }
        Ok(self.finish(start, NodeKind::Try { block, handler, finalizer, is_statement }))
    }

    // ========================================================================
    // cond
    // ========================================================================

    fn parse_cond(&mut self) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        self.expect(TokenType::Cond)?;
        let discriminant = self.parse_paren_expression()?;
        self.expect(TokenType::BraceL)?;
        let mut items = Vec::new();
        while !self.eat(TokenType::BraceR)? {
            let item_start = self.start_node();
            let matcher = self.parse_cond_matcher()?;
            self.expect(TokenType::Arrow)?;
            let consequent = self.parse_body(false)?;
            self.semicolon()?;
            items.push(self.finish(item_start, NodeKind::CondItem { matcher, consequent }));
        }
        Ok(self.finish(start, NodeKind::Cond { discriminant, items }))
    }

    fn parse_cond_matcher(&mut self) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        match self.ty() {
            TokenType::Name => {
                let id = self.parse_identifier(false)?;
                if self.eat_collection_hash()? {
                    let collection = self.parse_cond_matcher()?;
                    return Ok(self.finish(start, NodeKind::CollectionMatcher { id, collection }));
                }
                Ok(self.finish(start, NodeKind::VariableMatcher { id }))
            }
            TokenType::BraceL => {
                self.next()?;
                let mut properties = Vec::new();
                while !self.eat(TokenType::BraceR)? {
                    let prop_start = self.start_node();
                    let (key, computed, _) = self.parse_property_name()?;
                    let value = if self.eat(TokenType::Colon)? { Some(self.parse_cond_matcher()?) } else { None };
                    properties.push(self.finish(prop_start, NodeKind::ObjectMatcherProperty { key, value, computed }));
                    if !self.eat(TokenType::Comma)? && !self.is(TokenType::BraceR) {
                        return Err(self.expected(","));
                    }
                }
                Ok(self.finish(start, NodeKind::ObjectMatcher { properties }))
            }
            TokenType::BracketL => {
                self.next()?;
                let mut elements = Vec::new();
                while !self.eat(TokenType::BracketR)? {
                    elements.push(self.parse_cond_matcher()?);
                    if !self.eat(TokenType::Comma)? && !self.is(TokenType::BracketR) {
                        return Err(self.expected(","));
                    }
                }
                Ok(self.finish(start, NodeKind::ArrayMatcher { elements }))
            }
            _ => {
                // `=>` ends the matcher; it never starts an arrow function.
                let outer = self.state.no_arrow_at.replace(start.pos);
                let expression = self.parse_expression_no_keyword();
                self.state.no_arrow_at = outer;
                let expression = expression?;
                Ok(self.finish(start, NodeKind::ExpressionMatcher { expression }))
            }
        }
    }

    // ========================================================================
    // Jumps
    // ========================================================================

    pub(crate) fn parse_return(&mut self) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        if !self.state.scope.in_function && !self.options.allow_return_outside_function {
            return Err(self.raise(start.pos, &RETURN_OUTSIDE_FUNCTION, &[]));
        }
        self.next()?;
        let argument = if self.at_statement_end()
            || matches!(self.ty(), TokenType::Else | TokenType::Case | TokenType::Default | TokenType::ParenR)
        {
            None
        } else {
            Some(self.parse_expression(false)?)
        };
        Ok(self.finish(start, NodeKind::Return { argument }))
    }

    pub(crate) fn parse_throw(&mut self) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        self.next()?;
        if self.has_preceding_line_break() {
            return Err(self.raise(self.last_tok_end(), &ILLEGAL_NEWLINE_AFTER_THROW, &[]));
        }
        if matches!(self.ty(), TokenType::Semi | TokenType::BraceR | TokenType::Eof) {
            return Err(self.raise(self.cur_start(), &REQUIRES_ARGUMENT, &["Throw"]));
        }
        let argument = self.parse_expression(false)?;
        Ok(self.finish(start, NodeKind::Throw { argument }))
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    /// `var`, `let` or `const` declarations. Inside a `for` head the
    /// declarator of a for-of loop needs no initializer.
    pub(crate) fn parse_var(&mut self, is_for: bool) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        let word = self.value_string();
        let kind = VarKind::from_text(&word).ok_or_else(|| self.unexpected())?;
        self.next()?;
        if matches!(self.ty(), TokenType::Comma | TokenType::Semi) {
            return Err(self.raise(self.cur_start(), &REQUIRES_DECLARATIONS, &[kind.as_str()]));
        }

        let mut declarations = Vec::new();
        loop {
            let decl_start = self.start_node();
            let id = self.parse_binding_atom()?;
            self.check_lval(id, true, None, "variable declaration")?;
            let init = if self.eat(TokenType::Eq)? {
                Some(self.parse_maybe_assign(None)?)
            } else {
                let for_of = is_for && self.is_contextual("of");
                if kind == VarKind::Const && !for_of {
                    return Err(self.expected("="));
                }
                if !for_of && !matches!(self.ast.kind(id), NodeKind::Identifier { .. }) {
                    return Err(self.raise(self.last_tok_end(), &COMPLEX_BINDING_REQUIRES_INIT, &[]));
                }
                None
            };
            declarations.push(self.finish(decl_start, NodeKind::VariableDeclarator { id, init }));
            if !self.eat(TokenType::Comma)? {
                break;
            }
        }
        Ok(self.finish(start, NodeKind::VariableDeclaration { kind, declarations }))
    }

    // ========================================================================
    // Classes
    // ========================================================================

    pub(crate) fn parse_class(&mut self, is_statement: bool) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        self.next()?;
        let outer_strict = self.is_strict();
        self.set_strict(true)?;

        let id = if self.is(TokenType::Name) {
            Some(self.parse_identifier(false)?)
        } else if is_statement {
            return Err(self.expected("name"));
        } else {
            None
        };
        let super_class = if self.eat(TokenType::Extends)? {
            let outer = std::mem::replace(&mut self.state.in_class_heritage, true);
            let heritage = self.parse_expr_subscripts(None);
            self.state.in_class_heritage = outer;
            Some(heritage?)
        } else {
            None
        };
        let body = self.parse_class_body(outer_strict)?;
        Ok(self.finish(start, NodeKind::Class { id, super_class, body, declares: is_statement }))
    }

    fn parse_class_body(&mut self, outer_strict: bool) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        self.expect(TokenType::BraceL)?;
        let mut body = Vec::new();
        let mut had_constructor = false;
        while !self.is(TokenType::BraceR) {
            if self.eat(TokenType::Semi)? {
                continue;
            }
            body.push(self.parse_class_member(&mut had_constructor)?);
        }
        self.set_strict(outer_strict)?;
        self.expect(TokenType::BraceR)?;
        Ok(self.finish(start, NodeKind::ClassBody { body }))
    }

    fn parse_class_member(&mut self, had_constructor: &mut bool) -> SyntaxResult<NodeId> {
        let start = self.start_node();

        let is_static = self.is_contextual("static") && self.tok.lookahead()?.ty != TokenType::ParenL;
        if is_static {
            self.next()?;
        }
        let mut is_async = false;
        if self.is(TokenType::Async) {
            let ahead = self.tok.lookahead()?;
            if ahead.ty != TokenType::ParenL && !self.tok.has_line_break(self.tok.state.end, ahead.start) {
                self.next()?;
                is_async = true;
            }
        }
        let generator = self.eat(TokenType::Star)?;
        let contains_esc = self.tok.state.contains_esc;
        let (mut key, mut computed, key_ty) = self.parse_property_name()?;

        let mut kind = MethodKind::Method;
        if !generator && !is_async && !computed && !contains_esc && key_ty == TokenType::Name && !self.is(TokenType::ParenL) {
            kind = match self.ast.identifier_name(key) {
                Some("get") => MethodKind::Get,
                Some("set") => MethodKind::Set,
                _ => return Err(self.expected("(")),
            };
            (key, computed, _) = self.parse_property_name()?;
        }

        let key_pos = self.ast[key].start as usize;
        let key_name = if computed { None } else { self.static_key_name(key) };
        if !is_static && key_name.as_deref() == Some("constructor") {
            if kind != MethodKind::Method {
                return Err(self.raise(key_pos, &CONSTRUCTOR_ACCESSOR, &[]));
            }
            if generator {
                return Err(self.raise(key_pos, &CONSTRUCTOR_GENERATOR, &[]));
            }
            if is_async {
                return Err(self.raise(key_pos, &CONSTRUCTOR_ASYNC, &[]));
            }
            if *had_constructor {
                return Err(self.raise(key_pos, &DUPLICATE_CONSTRUCTOR, &[]));
            }
            *had_constructor = true;
            kind = MethodKind::Constructor;
        }
        if is_static && key_name.as_deref() == Some("prototype") {
            return Err(self.raise(key_pos, &STATIC_PROTOTYPE, &[]));
        }
        if !self.is(TokenType::ParenL) {
            return Err(self.expected("("));
        }

        let scope = FunctionScope { in_function: true, in_generator: generator, in_async: is_async, in_method: Some(kind) };
        let (params, body, _) = self.parse_params_and_body(scope, false)?;
        self.check_params(&params, None, false, false)?;
        let method = self.finish(
            start,
            NodeKind::ClassMethod { kind, key, params, body, computed, is_static, generator, is_async },
        );
        self.check_getter_setter_params(method)?;
        Ok(method)
    }

    // ========================================================================
    // Modules
    // ========================================================================

    fn parse_import(&mut self) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        self.next()?;
        let mut specifiers = Vec::new();

        if !self.is(TokenType::String) {
            if self.is(TokenType::Name) {
                let spec_start = self.start_node();
                let local = self.parse_binding_identifier()?;
                specifiers.push(self.finish(spec_start, NodeKind::ImportDefaultSpecifier { local }));
                if self.eat(TokenType::Comma)? {
                    self.parse_import_bindings(&mut specifiers)?;
                }
            } else {
                self.parse_import_bindings(&mut specifiers)?;
            }
            self.expect_contextual("from")?;
        }
        if !self.is(TokenType::String) {
            return Err(self.unexpected());
        }
        let source = self.parse_literal()?;
        Ok(self.finish(start, NodeKind::ImportDeclaration { specifiers, source }))
    }

    /// `* as ns` or `{ a, b as c }`.
    fn parse_import_bindings(&mut self, specifiers: &mut Vec<NodeId>) -> SyntaxResult<()> {
        if self.is(TokenType::Star) {
            let start = self.start_node();
            self.next()?;
            self.expect_contextual("as")?;
            let local = self.parse_binding_identifier()?;
            specifiers.push(self.finish(start, NodeKind::ImportNamespaceSpecifier { local }));
            return Ok(());
        }

        self.expect(TokenType::BraceL)?;
        let mut first = true;
        while !self.eat(TokenType::BraceR)? {
            if first {
                first = false;
            } else {
                if self.eat(TokenType::Colon)? {
                    return Err(self.raise(self.last_tok_end(), &ES2015_NAMED_IMPORTS, &[]));
                }
                self.expect(TokenType::Comma)?;
                if self.eat(TokenType::BraceR)? {
                    break;
                }
            }
            let spec_start = self.start_node();
            let imported = self.parse_identifier(true)?;
            let local = if self.eat_contextual("as")? {
                self.parse_binding_identifier()?
            } else {
                self.check_lval(imported, true, None, "import specifier")?;
                self.clone_identifier(imported)
            };
            specifiers.push(self.finish(spec_start, NodeKind::ImportSpecifier { imported, local }));
        }
        Ok(())
    }

    fn parse_export(&mut self) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        self.next()?;

        // export * from "a"; export * as ns from "a"
        if self.is(TokenType::Star) {
            let spec_start = self.start_node();
            self.next()?;
            if self.eat_contextual("as")? {
                let exported = self.parse_identifier(true)?;
                self.record_export_name(exported)?;
                let specifier = self.finish(spec_start, NodeKind::ExportNamespaceSpecifier { exported });
                let source = Some(self.parse_export_from()?);
                let kind = NodeKind::ExportNamedDeclaration { declaration: None, specifiers: vec![specifier], source };
                return Ok(self.finish(start, kind));
            }
            let source = self.parse_export_from()?;
            return Ok(self.finish(start, NodeKind::ExportAllDeclaration { source }));
        }

        if self.is(TokenType::Default) {
            self.record_export(start.pos, "default", &DUPLICATE_DEFAULT_EXPORT)?;
            self.next()?;
            let declaration = self.parse_export_default_value()?;
            return Ok(self.finish(start, NodeKind::ExportDefaultDeclaration { declaration }));
        }

        // export v from "a"
        if self.is(TokenType::Name) && self.tok.lookahead()?.ty != TokenType::Eq {
            let ahead = self.tok.lookahead()?;
            let names_default = ahead.ty == TokenType::Comma
                || (ahead.ty == TokenType::Name && ahead.value.as_str() == Some("from"));
            if names_default {
                let spec_start = self.start_node();
                let exported = self.parse_identifier(false)?;
                self.record_export_name(exported)?;
                let mut specifiers = vec![self.finish(spec_start, NodeKind::ExportDefaultSpecifier { exported })];
                if self.eat(TokenType::Comma)? {
                    specifiers.extend(self.parse_export_specifiers()?);
                }
                let source = Some(self.parse_export_from()?);
                let kind = NodeKind::ExportNamedDeclaration { declaration: None, specifiers, source };
                return Ok(self.finish(start, kind));
            }
        }

        if self.is(TokenType::BraceL) {
            let specifiers = self.parse_export_specifiers()?;
            let source = if self.is_contextual("from") { Some(self.parse_export_from()?) } else { None };
            let kind = NodeKind::ExportNamedDeclaration { declaration: None, specifiers, source };
            return Ok(self.finish(start, kind));
        }

        let decl_start = self.start_node();
        let declaration = match self.ty() {
            TokenType::Var | TokenType::Let | TokenType::Const => self.parse_var(false)?,
            TokenType::Function => {
                self.next()?;
                self.parse_function(decl_start, false, true)?
            }
            TokenType::Async if self.at_async_function()? => {
                self.next()?;
                self.next()?;
                self.parse_function(decl_start, true, true)?
            }
            TokenType::Class => self.parse_class(true)?,
            _ => return Err(self.unexpected()),
        };
        self.record_declared_exports(declaration)?;
        let kind = NodeKind::ExportNamedDeclaration { declaration: Some(declaration), specifiers: Vec::new(), source: None };
        Ok(self.finish(start, kind))
    }

    /// The value of `export default`. Named functions and classes become
    /// declarations.
    fn parse_export_default_value(&mut self) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        let value = match self.ty() {
            TokenType::Var | TokenType::Let | TokenType::Const => {
                return Err(self.raise(start.pos, &DEFAULT_EXPORT_KIND, &[]));
            }
            TokenType::Function => {
                self.next()?;
                self.parse_function(start, false, false)?
            }
            TokenType::Async if self.at_async_function()? => {
                self.next()?;
                self.next()?;
                self.parse_function(start, true, false)?
            }
            TokenType::Class => self.parse_class(false)?,
            _ => return self.parse_maybe_assign(None),
        };
        match &mut self.ast[value].kind {
            NodeKind::Function { id: Some(_), declares, .. } | NodeKind::Class { id: Some(_), declares, .. } => {
                *declares = true;
            }
            _ => {}
        }
        Ok(value)
    }

    fn parse_export_from(&mut self) -> SyntaxResult<NodeId> {
        self.expect_contextual("from")?;
        if !self.is(TokenType::String) {
            return Err(self.unexpected());
        }
        self.parse_literal()
    }

    /// `{ a, b as c }`.
    fn parse_export_specifiers(&mut self) -> SyntaxResult<Vec<NodeId>> {
        self.expect(TokenType::BraceL)?;
        let mut specifiers = Vec::new();
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
            let start = self.start_node();
            let local = self.parse_identifier(true)?;
            let exported = if self.eat_contextual("as")? {
                self.parse_identifier(true)?
            } else {
                self.clone_identifier(local)
            };
            self.record_export_name(exported)?;
            specifiers.push(self.finish(start, NodeKind::ExportSpecifier { local, exported }));
        }
        Ok(specifiers)
    }

    fn record_export_name(&mut self, exported: NodeId) -> SyntaxResult<()> {
        let name = self.ast.identifier_name(exported).unwrap_or_default().to_string();
        let pos = self.ast[exported].start as usize;
        if name == "default" {
            return self.record_export(pos, &name, &DUPLICATE_DEFAULT_EXPORT);
        }
        self.record_export(pos, &name, &DUPLICATE_EXPORT)
    }

    fn record_export(
        &mut self,
        pos: usize,
        name: &str,
        message: &expressive_diagnostics::DiagnosticMessage,
    ) -> SyntaxResult<()> {
        if !self.state.exported_identifiers.insert(name.to_string()) {
            return Err(self.raise(pos, message, &[name]));
        }
        Ok(())
    }

    /// Record every name bound by an exported declaration.
    fn record_declared_exports(&mut self, declaration: NodeId) -> SyntaxResult<()> {
        let mut names = Vec::new();
        match self.ast.kind(declaration) {
            NodeKind::VariableDeclaration { declarations, .. } => {
                for &decl in declarations {
                    if let NodeKind::VariableDeclarator { id, .. } = self.ast.kind(decl) {
                        self.collect_bound_names(*id, &mut names);
                    }
                }
            }
            NodeKind::Function { id: Some(id), .. } | NodeKind::Class { id: Some(id), .. } => names.push(*id),
            _ => {}
        }
        for id in names {
            self.record_export_name(id)?;
        }
        Ok(())
    }

    fn collect_bound_names(&self, pattern: NodeId, names: &mut Vec<NodeId>) {
        match self.ast.kind(pattern) {
            NodeKind::Identifier { .. } => names.push(pattern),
            NodeKind::ObjectPattern { properties } => {
                for &prop in properties {
                    match self.ast.kind(prop) {
                        NodeKind::ObjectProperty { value, .. } => self.collect_bound_names(*value, names),
                        _ => self.collect_bound_names(prop, names),
                    }
                }
            }
            NodeKind::ArrayPattern { elements } => {
                for &element in elements.iter().flatten() {
                    self.collect_bound_names(element, names);
                }
            }
            NodeKind::AssignmentPattern { left, .. } => self.collect_bound_names(*left, names),
            NodeKind::RestElement { argument } => self.collect_bound_names(*argument, names),
            NodeKind::CollectionPattern { pattern, .. } => self.collect_bound_names(*pattern, names),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{parse, Options};
    use expressive_ast::NodeKind;

    fn kinds(source: &str) -> Vec<&'static str> {
        let result = parse(source, &Options::default()).unwrap();
        let NodeKind::Program { body, .. } = result.ast.kind(result.program()) else {
            panic!("expected a program");
        };
        body.iter().map(|&id| result.ast.kind(id).type_name()).collect()
    }

    #[test]
    fn test_stray_semicolons_are_skipped() {
        assert_eq!(kinds(";;a;;b"), vec!["Identifier", "Identifier"]);
    }

    #[test]
    fn test_use_strict_directive() {
        let err = parse("'use strict'; delete x", &Options::default()).unwrap_err();
        assert!(err.message.starts_with("Deleting local variable in strict mode"));
        assert!(parse("'use\\x20strict'; delete x", &Options::default()).is_ok());
    }

    #[test]
    fn test_declarations() {
        assert_eq!(
            kinds("var a = 1\nfunction f() {}\nclass A {}"),
            vec!["VariableDeclaration", "Function", "Class"]
        );
    }

    #[test]
    fn test_var_requires_declarations() {
        let err = parse("let;", &Options::default()).unwrap_err();
        assert!(err.message.starts_with("let requires declarations"));
    }

    #[test]
    fn test_const_requires_initializer() {
        assert!(parse("const a", &Options::default()).is_err());
        assert!(parse("for (const a of b) a", &Options::default()).is_ok());
    }

    #[test]
    fn test_complex_binding_requires_init() {
        let err = parse("var {a}", &Options::default()).unwrap_err();
        assert!(err.message.starts_with("Complex binding patterns require an initialization value"));
    }

    #[test]
    fn test_multiple_default_clauses() {
        let err = parse("switch (a) { default 1; default 2 }", &Options::default()).unwrap_err();
        assert!(err.message.starts_with("Multiple default clauses"));
    }

    #[test]
    fn test_try_requires_handler() {
        let err = parse("try { a }", &Options::default()).unwrap_err();
        assert!(err.message.starts_with("Missing catch or finally clause"));
    }

    #[test]
    fn test_import_requires_module() {
        let err = parse("import a from 'a'", &Options::default()).unwrap_err();
        assert!(err.message.starts_with("'import' and 'export' may appear only"));
        assert!(parse("import a, { b as c } from 'a'", &Options::module()).is_ok());
    }

    #[test]
    fn test_duplicate_exports() {
        let err = parse("export const a = 1; export { a }", &Options::module()).unwrap_err();
        assert!(err.message.starts_with("`a` has already been exported"));
        let err = parse("export default 1; export default 2", &Options::module()).unwrap_err();
        assert!(err.message.starts_with("Only one default export allowed per module."));
    }

    #[test]
    fn test_export_default_named_function_declares() {
        let result = parse("export default function f() {}", &Options::module()).unwrap();
        let NodeKind::Program { body, .. } = result.ast.kind(result.program()) else {
            panic!("expected a program");
        };
        let NodeKind::ExportDefaultDeclaration { declaration } = result.ast.kind(body[0]) else {
            panic!("expected a default export");
        };
        assert!(matches!(result.ast.kind(*declaration), NodeKind::Function { declares: true, .. }));
    }

    #[test]
    fn test_duplicate_constructor() {
        let err = parse("class A { constructor() {} constructor() {} }", &Options::default()).unwrap_err();
        assert!(err.message.starts_with("Duplicate constructor in the same class"));
    }
}
