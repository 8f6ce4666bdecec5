//! The parser driver: token management, node construction and ASI.
//!
//! This is a recursive descent parser over the tokens of
//! [`expressive_scanner::Tokenizer`]. Nodes are added to an [`Ast`] arena as
//! they finish; comments are attached as each node completes.

use expressive_ast::node::*;
use expressive_ast::{Ast, MethodKind, NodeKind, SourceType};
use expressive_core::intern::{Atom, StringInterner};
use expressive_core::text::{Position, TextPos};
use expressive_diagnostics::messages::*;
use expressive_diagnostics::{DiagnosticMessage, SyntaxError, SyntaxResult};
use expressive_scanner::{Token, TokenType, TokenValue, Tokenizer, TokenizerOptions};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::debug;

use crate::comments::CommentState;
use crate::options::Options;

/// The result of a successful parse.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub ast: Ast,
    /// The `File` node.
    pub root: NodeId,
    /// Recorded tokens, empty unless the `tokens` option is on.
    pub tokens: Vec<Token>,
}

impl ParseResult {
    /// The `Program` node under the root.
    pub fn program(&self) -> NodeId {
        match self.ast.kind(self.root) {
            NodeKind::File { program } => *program,
            _ => self.root,
        }
    }
}

/// Where a node started.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Start {
    pub pos: usize,
    pub loc: Position,
}

/// Flags of the innermost enclosing function.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FunctionScope {
    pub in_function: bool,
    pub in_generator: bool,
    pub in_async: bool,
    pub in_method: Option<MethodKind>,
}

/// Mutable parser context.
#[derive(Debug, Default)]
pub(crate) struct ParserState {
    pub scope: FunctionScope,
    /// Start of an expression that may turn out to be arrow parameters.
    pub potential_arrow_at: Option<usize>,
    /// Start of a cond expression matcher, which must not become an arrow.
    pub no_arrow_at: Option<usize>,
    /// Start of a pipeline arrow body that must not absorb a further `|>`.
    pub no_pipe_at: Option<usize>,
    /// Start of the right-hand side of the current `|>`.
    pub pipe_rhs_at: Option<usize>,
    pub in_class_heritage: bool,
    pub exported_identifiers: FxHashSet<String>,
    /// Nesting depth of braced blocks.
    pub block_depth: u32,
}

/// Recursive descent parser for one source text.
pub struct Parser {
    pub(crate) tok: Tokenizer,
    pub(crate) ast: Ast,
    pub(crate) options: Options,
    pub(crate) state: ParserState,
    pub(crate) comments: CommentState,
    /// Type of the token before the current one.
    pub(crate) prev_ty: TokenType,
}

impl Parser {
    pub fn new(source: &str, options: &Options) -> Self {
        Self::with_interner(source, options, StringInterner::new())
    }

    /// Create a parser that interns names into an existing interner.
    pub fn with_interner(source: &str, options: &Options, interner: StringInterner) -> Self {
        let tokenizer_options = TokenizerOptions {
            module: options.is_module(),
            strict: options.is_strict(),
            start_line: options.start_line,
            filename: options.source_filename.as_deref().map(Arc::from),
            tokens: options.tokens,
        };
        Self {
            tok: Tokenizer::new(source, tokenizer_options),
            ast: Ast::with_capacity(interner, source.len() / 4),
            options: options.clone(),
            state: ParserState::default(),
            comments: CommentState::default(),
            prev_ty: TokenType::Eof,
        }
    }

    /// Parse the whole input into a `File` node.
    pub fn parse(mut self) -> SyntaxResult<ParseResult> {
        let file_start = self.start_node();
        let program_start = self.start_node();
        self.tok.skip_hashbang();
        self.tok.next_token()?;
        self.drain_comments();

        let body = self.parse_statement_list(TokenType::Eof, true)?;
        let source_type = if self.options.is_module() { SourceType::Module } else { SourceType::Script };
        let end = self.tok.input().len();
        let program = self.finish_at(program_start, NodeKind::Program { body, source_type }, end);
        let root = self.finish_at(file_start, NodeKind::File { program }, end);

        self.ast.comments = self.tok.take_comments();
        let tokens = self.tok.take_tokens();
        debug!(
            nodes = self.ast.len(),
            comments = self.ast.comments.len(),
            tokens = tokens.len(),
            "parsed program"
        );
        Ok(ParseResult { ast: self.ast, root, tokens })
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    pub(crate) fn ty(&self) -> TokenType {
        self.tok.ty()
    }

    #[inline]
    pub(crate) fn is(&self, ty: TokenType) -> bool {
        self.tok.ty() == ty
    }

    #[inline]
    pub(crate) fn value(&self) -> &TokenValue {
        self.tok.value()
    }

    #[inline]
    pub(crate) fn cur_start(&self) -> usize {
        self.tok.state.start
    }

    #[inline]
    pub(crate) fn last_tok_end(&self) -> usize {
        self.tok.state.last_tok_end
    }

    /// Advance to the next token, collecting any comments read on the way.
    pub(crate) fn next(&mut self) -> SyntaxResult<()> {
        self.prev_ty = self.tok.ty();
        self.tok.next()?;
        self.drain_comments();
        Ok(())
    }

    fn drain_comments(&mut self) {
        for id in self.tok.take_fresh_comments() {
            self.comments.leading.push(id);
            self.comments.trailing.push(id);
        }
    }

    pub(crate) fn eat(&mut self, ty: TokenType) -> SyntaxResult<bool> {
        if self.is(ty) {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume the `#` of `Name#...`, which must touch the name.
    pub(crate) fn eat_collection_hash(&mut self) -> SyntaxResult<bool> {
        if self.is(TokenType::Hash) && self.cur_start() == self.last_tok_end() {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn expect(&mut self, ty: TokenType) -> SyntaxResult<()> {
        if self.eat(ty)? {
            Ok(())
        } else {
            Err(self.expected(ty.label()))
        }
    }

    /// Whether the current token is the name `name`.
    #[inline]
    pub(crate) fn is_contextual(&self, name: &str) -> bool {
        self.is(TokenType::Name) && self.value().is_str(name)
    }

    pub(crate) fn eat_contextual(&mut self, name: &str) -> SyntaxResult<bool> {
        if self.is_contextual(name) {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn expect_contextual(&mut self, name: &str) -> SyntaxResult<()> {
        if self.eat_contextual(name)? {
            Ok(())
        } else {
            Err(self.expected(name))
        }
    }

    /// Whether a line break separates the previous and current tokens.
    #[inline]
    pub(crate) fn has_preceding_line_break(&self) -> bool {
        self.tok.has_line_break(self.tok.state.last_tok_end, self.tok.state.start)
    }

    /// The current token's string value, for names and keywords.
    pub(crate) fn value_string(&self) -> String {
        match self.value() {
            TokenValue::Str(s) => s.clone(),
            _ => self.ty().keyword().unwrap_or_default().to_string(),
        }
    }

    // ========================================================================
    // Errors
    // ========================================================================

    pub(crate) fn raise(&self, pos: usize, message: &DiagnosticMessage, args: &[&str]) -> SyntaxError {
        self.tok.raise(pos, message, args)
    }

    /// "Unexpected token" at the current token.
    pub(crate) fn unexpected(&self) -> SyntaxError {
        self.raise(self.cur_start(), &UNEXPECTED_TOKEN, &[])
    }

    pub(crate) fn unexpected_at(&self, pos: usize) -> SyntaxError {
        self.raise(pos, &UNEXPECTED_TOKEN, &[])
    }

    pub(crate) fn expected(&self, what: &str) -> SyntaxError {
        self.raise(self.cur_start(), &UNEXPECTED_TOKEN_EXPECTED, &[what])
    }

    // ========================================================================
    // Automatic semicolon insertion
    // ========================================================================

    /// Whether a statement may end here without a `;`.
    pub(crate) fn can_insert_semicolon(&self) -> bool {
        matches!(self.ty(), TokenType::Eof | TokenType::BraceR)
            || self.has_preceding_line_break()
            || matches!(self.prev_ty, TokenType::Semi | TokenType::BraceR)
    }

    /// Whether an optional argument of `return`, `yield` or `throw` is absent.
    pub(crate) fn at_statement_end(&self) -> bool {
        matches!(self.ty(), TokenType::Semi | TokenType::Eof | TokenType::BraceR)
            || self.has_preceding_line_break()
    }

    /// Consume a `;`, or accept its absence where ASI applies.
    pub(crate) fn semicolon(&mut self) -> SyntaxResult<()> {
        if self.eat(TokenType::Semi)? || self.can_insert_semicolon() {
            Ok(())
        } else {
            Err(self.expected(";"))
        }
    }

    /// End a statement node, claiming comments on the rest of its line.
    pub(crate) fn finish_statement(&mut self, node: NodeId) -> SyntaxResult<NodeId> {
        if self.is(TokenType::Semi) {
            let semi_end = self.tok.state.end;
            self.next()?;
            self.attach_statement_trailing(node, semi_end);
            return Ok(node);
        }
        if self.can_insert_semicolon() {
            return Ok(node);
        }
        Err(self.expected(";"))
    }

    // ========================================================================
    // Node construction
    // ========================================================================

    #[inline]
    pub(crate) fn start_node(&self) -> Start {
        Start { pos: self.tok.state.start, loc: self.tok.state.start_loc }
    }

    /// Finish a node ending at the previous token.
    pub(crate) fn finish(&mut self, start: Start, kind: NodeKind) -> NodeId {
        let end = self.tok.state.last_tok_end;
        self.finish_at(start, kind, end)
    }

    pub(crate) fn finish_at(&mut self, start: Start, kind: NodeKind, end: usize) -> NodeId {
        let end = end.max(start.pos);
        let loc = self.tok.location(start.loc, self.tok.position_of(end));
        let mut node = Node::new(kind, start.pos as TextPos, end as TextPos, loc);
        if self.options.ranges {
            node.range = Some([node.start, node.end]);
        }
        let id = self.ast.add(node);
        self.process_comment(id);
        id
    }

    /// Replace the kind of an already finished node.
    #[inline]
    pub(crate) fn set_kind(&mut self, id: NodeId, kind: NodeKind) {
        self.ast[id].kind = kind;
    }

    /// Add a fresh copy of an identifier node, without comments.
    pub(crate) fn clone_identifier(&mut self, id: NodeId) -> NodeId {
        let source = &self.ast[id];
        let mut node = Node::new(source.kind.clone(), source.start, source.end, source.loc.clone());
        node.range = source.range;
        self.ast.add(node)
    }

    pub(crate) fn intern(&self, name: &str) -> Atom {
        self.ast.interner.intern(name)
    }

    /// The source text of `start..end`.
    pub(crate) fn slice(&self, start: usize, end: usize) -> String {
        let input = self.tok.input();
        let end = end.min(input.len());
        input[start.min(end)..end].iter().collect()
    }

    pub(crate) fn mark_parenthesized(&mut self, id: NodeId, paren_start: usize) {
        let extra = &mut self.ast[id].extra;
        extra.flags |= ExtraFlags::PARENTHESIZED;
        extra.paren_start = Some(paren_start as TextPos);
    }

    #[inline]
    pub(crate) fn is_parenthesized(&self, id: NodeId) -> bool {
        self.ast[id].extra.is_parenthesized()
    }

    /// Whether statements here are at the program's top level.
    #[inline]
    pub(crate) fn at_top_level(&self) -> bool {
        self.state.block_depth == 0 && !self.state.scope.in_function
    }

    /// Run `f` inside a fresh function scope, restoring the outer one after.
    pub(crate) fn in_function_scope<T>(
        &mut self,
        scope: FunctionScope,
        f: impl FnOnce(&mut Self) -> SyntaxResult<T>,
    ) -> SyntaxResult<T> {
        let outer = std::mem::replace(&mut self.state.scope, scope);
        let outer_arrow = self.state.potential_arrow_at.take();
        let result = f(self);
        self.state.scope = outer;
        self.state.potential_arrow_at = outer_arrow;
        result
    }

    /// Switch strict mode on or off for the tokenizer.
    pub(crate) fn set_strict(&mut self, strict: bool) -> SyntaxResult<()> {
        if self.tok.state.strict == strict {
            return Ok(());
        }
        self.tok.set_strict(strict)
    }

    #[inline]
    pub(crate) fn is_strict(&self) -> bool {
        self.tok.state.strict
    }
}
