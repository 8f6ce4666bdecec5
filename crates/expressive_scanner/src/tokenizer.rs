//! The tokenizer.
//!
//! Reads one token at a time on demand from the parser. Scanning works over a
//! `Vec<char>`, so every offset and column counts Unicode scalar values.
//! Comments met while skipping space are recorded and queued for the
//! parser's comment attachment.

use crate::classifier::{is_digit, is_identifier_char, is_identifier_start, is_line_terminator, is_whitespace};
use crate::context::{brace_is_block, update_context, ContextInput, ContextState, TokContext};
use crate::token::{LookaheadToken, Token, TokenValue};
use crate::token_type::TokenType;
use expressive_ast::{Comment, CommentId, CommentKind};
use expressive_core::text::{LineMap, Position, SourceLocation};
use expressive_diagnostics::{messages, DiagnosticMessage, SyntaxError, SyntaxResult};
use std::sync::Arc;
use tracing::trace;

const VALID_REGEX_FLAGS: &str = "gmsiyu";

/// Settings the tokenizer needs from the parser options.
#[derive(Debug, Clone)]
pub struct TokenizerOptions {
    /// Module code: HTML-like comments are not recognized.
    pub module: bool,
    pub strict: bool,
    /// Line number of the first line.
    pub start_line: u32,
    pub filename: Option<Arc<str>>,
    /// Record every token.
    pub tokens: bool,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            module: false,
            strict: false,
            start_line: 1,
            filename: None,
            tokens: false,
        }
    }
}

/// Everything that changes while tokenizing. Cloned for lookahead.
#[derive(Debug, Clone)]
pub struct TokenizerState {
    pub pos: usize,
    pub ty: TokenType,
    pub value: TokenValue,
    pub start: usize,
    pub end: usize,
    pub start_loc: Position,
    pub end_loc: Position,
    pub last_tok_start: usize,
    pub last_tok_end: usize,
    pub last_tok_start_loc: Position,
    pub last_tok_end_loc: Position,
    pub context: ContextState,
    pub strict: bool,
    /// The last word contained a `\u` escape.
    pub contains_esc: bool,
    pub contains_octal: bool,
    pub octal_position: Option<usize>,
    pub invalid_template_escape_position: Option<usize>,
    /// Offsets of the opening backquotes of the templates being read.
    template_starts: Vec<usize>,
}

impl TokenizerState {
    fn new(strict: bool, start: Position) -> Self {
        Self {
            pos: 0,
            ty: TokenType::Eof,
            value: TokenValue::None,
            start: 0,
            end: 0,
            start_loc: start,
            end_loc: start,
            last_tok_start: 0,
            last_tok_end: 0,
            last_tok_start_loc: start,
            last_tok_end_loc: start,
            context: ContextState::default(),
            strict,
            contains_esc: false,
            contains_octal: false,
            octal_position: None,
            invalid_template_escape_position: None,
            template_starts: Vec::new(),
        }
    }
}

/// Converts source text into tokens.
pub struct Tokenizer {
    input: Vec<char>,
    line_map: LineMap,
    options: TokenizerOptions,
    pub state: TokenizerState,
    is_lookahead: bool,
    comments: Vec<Comment>,
    /// Comments recorded since the parser last drained them.
    fresh_comments: Vec<CommentId>,
    tokens: Vec<Token>,
}

impl Tokenizer {
    pub fn new(source: &str, options: TokenizerOptions) -> Self {
        let input: Vec<char> = source.chars().collect();
        let line_map = LineMap::new(&input, options.start_line);
        let state = TokenizerState::new(options.strict, line_map.position_of(0));
        Self {
            input,
            line_map,
            options,
            state,
            is_lookahead: false,
            comments: Vec::new(),
            fresh_comments: Vec::new(),
            tokens: Vec::new(),
        }
    }

    #[inline]
    pub fn input(&self) -> &[char] {
        &self.input
    }

    /// The current token type.
    #[inline]
    pub fn ty(&self) -> TokenType {
        self.state.ty
    }

    #[inline]
    pub fn value(&self) -> &TokenValue {
        &self.state.value
    }

    #[inline]
    pub fn is_lookahead(&self) -> bool {
        self.is_lookahead
    }

    #[inline]
    pub fn position_of(&self, pos: usize) -> Position {
        self.line_map.position_of(pos as u32)
    }

    pub fn location(&self, start: Position, end: Position) -> SourceLocation {
        SourceLocation::new(start, end, self.options.filename.clone())
    }

    /// Build an error at `pos`.
    pub fn raise(&self, pos: usize, message: &DiagnosticMessage, args: &[&str]) -> SyntaxError {
        SyntaxError::new(&self.input, pos, message, args).with_start_line(self.options.start_line)
    }

    #[inline]
    pub fn comment(&self, id: CommentId) -> &Comment {
        &self.comments[id as usize]
    }

    pub fn take_comments(&mut self) -> Vec<Comment> {
        std::mem::take(&mut self.comments)
    }

    /// Comments recorded since the last call, in source order.
    pub fn take_fresh_comments(&mut self) -> Vec<CommentId> {
        std::mem::take(&mut self.fresh_comments)
    }

    pub fn take_tokens(&mut self) -> Vec<Token> {
        std::mem::take(&mut self.tokens)
    }

    /// Whether a line terminator occurs in `start..end`.
    pub fn has_line_break(&self, start: usize, end: usize) -> bool {
        let end = end.min(self.input.len());
        start < end && self.input[start..end].iter().copied().any(is_line_terminator)
    }

    /// Move to the next token.
    pub fn next(&mut self) -> SyntaxResult<()> {
        if !self.is_lookahead && self.options.tokens {
            let token = Token {
                ty: self.state.ty,
                value: self.state.value.clone(),
                start: self.state.start as u32,
                end: self.state.end as u32,
                loc: self.location(self.state.start_loc, self.state.end_loc),
            };
            self.tokens.push(token);
        }
        self.state.last_tok_start = self.state.start;
        self.state.last_tok_end = self.state.end;
        self.state.last_tok_start_loc = self.state.start_loc;
        self.state.last_tok_end_loc = self.state.end_loc;
        self.next_token()
    }

    /// Read the token after the current one without consuming it.
    pub fn lookahead(&mut self) -> SyntaxResult<LookaheadToken> {
        let saved = self.state.clone();
        self.is_lookahead = true;
        let result = self.next();
        self.is_lookahead = false;
        let ahead = std::mem::replace(&mut self.state, saved);
        result.map(|()| LookaheadToken {
            ty: ahead.ty,
            value: ahead.value,
            start: ahead.start,
            end: ahead.end,
        })
    }

    /// Toggle strict mode, re-reading the current token if its meaning
    /// depends on it.
    pub fn set_strict(&mut self, strict: bool) -> SyntaxResult<()> {
        self.state.strict = strict;
        if !matches!(self.state.ty, TokenType::Num | TokenType::String) {
            return Ok(());
        }
        self.state.pos = self.state.start;
        self.next_token()
    }

    /// Skip a `#!` line at the very start of the input, recording it as a
    /// line comment.
    pub fn skip_hashbang(&mut self) {
        if self.state.pos == 0 && self.input.starts_with(&['#', '!']) {
            self.skip_line_comment(2);
        }
    }

    /// Read a token, updating `state` to describe it.
    pub fn next_token(&mut self) -> SyntaxResult<()> {
        let cur = self.state.context.current();
        if !cur.is_some_and(TokContext::preserve_space) {
            self.skip_space()?;
        }
        self.state.contains_octal = false;
        self.state.octal_position = None;
        self.state.start = self.state.pos;
        self.state.start_loc = self.position_of(self.state.pos);
        if self.is_eof() {
            return self.finish_token(TokenType::Eof, TokenValue::None);
        }
        if cur.is_some_and(TokContext::reads_template) {
            self.read_tmpl_token()
        } else {
            self.read_token()
        }
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    #[inline]
    fn current_char(&self) -> Option<char> {
        self.input.get(self.state.pos).copied()
    }

    #[inline]
    fn char_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.state.pos + offset).copied()
    }

    #[inline]
    fn is_eof(&self) -> bool {
        self.state.pos >= self.input.len()
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.input[start..end.min(self.input.len())].iter().collect()
    }

    fn finish_token(&mut self, ty: TokenType, value: TokenValue) -> SyntaxResult<()> {
        let prev = self.state.ty;
        self.state.end = self.state.pos;
        self.state.end_loc = self.position_of(self.state.pos);
        let value_is_of = ty == TokenType::Name && value.is_str("of");
        self.state.ty = ty;
        self.state.value = value;

        let line_break_after = ty == TokenType::Name
            && matches!(prev, TokenType::Let | TokenType::Const | TokenType::Var)
            && self.input[self.state.end..].iter().copied().any(is_line_terminator);
        let brace_is_block = matches!(ty, TokenType::BraceL | TokenType::Function)
            && brace_is_block(
                &self.state.context,
                prev,
                self.has_line_break(self.state.last_tok_end, self.state.start),
            );
        let was_template = self.state.context.current() == Some(TokContext::Template);
        self.state.context = update_context(
            &self.state.context,
            ContextInput {
                prev,
                cur: ty,
                value_is_of,
                line_break_after,
                brace_is_block,
            },
        );
        if ty == TokenType::BackQuote {
            if was_template {
                self.state.template_starts.pop();
            } else {
                self.state.template_starts.push(self.state.start);
            }
        }
        trace!(token = %ty, start = self.state.start, end = self.state.end, "token");
        Ok(())
    }

    fn finish_punct(&mut self, ty: TokenType, size: usize) -> SyntaxResult<()> {
        self.state.pos += size;
        self.finish_token(ty, TokenValue::None)
    }

    fn finish_op(&mut self, ty: TokenType, size: usize) -> SyntaxResult<()> {
        let text = self.slice(self.state.pos, self.state.pos + size);
        self.state.pos += size;
        self.finish_token(ty, TokenValue::Str(text))
    }

    // ========================================================================
    // Whitespace and comments
    // ========================================================================

    fn skip_space(&mut self) -> SyntaxResult<()> {
        while let Some(ch) = self.current_char() {
            match ch {
                '/' => match self.char_at(1) {
                    Some('*') => self.skip_block_comment()?,
                    Some('/') => self.skip_line_comment(2),
                    _ => break,
                },
                c if is_line_terminator(c) || is_whitespace(c) => self.state.pos += 1,
                _ => break,
            }
        }
        Ok(())
    }

    fn skip_block_comment(&mut self) -> SyntaxResult<()> {
        let start = self.state.pos;
        let start_loc = self.position_of(start);
        let body_start = start + 2;
        let close = (body_start..self.input.len().saturating_sub(1))
            .find(|&i| self.input[i] == '*' && self.input[i + 1] == '/');
        let Some(end) = close else {
            return Err(self.raise(start, &messages::UNTERMINATED_COMMENT, &[]).incomplete());
        };
        self.state.pos = end + 2;
        self.push_comment(CommentKind::Block, body_start, end, start, start_loc);
        Ok(())
    }

    fn skip_line_comment(&mut self, start_skip: usize) {
        let start = self.state.pos;
        let start_loc = self.position_of(start);
        self.state.pos += start_skip;
        while self.current_char().is_some_and(|ch| !is_line_terminator(ch)) {
            self.state.pos += 1;
        }
        self.push_comment(CommentKind::Line, start + start_skip, self.state.pos, start, start_loc);
    }

    fn push_comment(
        &mut self,
        kind: CommentKind,
        value_start: usize,
        value_end: usize,
        start: usize,
        start_loc: Position,
    ) {
        if self.is_lookahead {
            return;
        }
        let end = self.state.pos;
        let comment = Comment {
            kind,
            value: self.slice(value_start, value_end),
            start: start as u32,
            end: end as u32,
            loc: self.location(start_loc, self.position_of(end)),
        };
        let id = self.comments.len() as CommentId;
        self.comments.push(comment);
        self.fresh_comments.push(id);
    }

    // ========================================================================
    // Punctuation and operators
    // ========================================================================

    fn read_token(&mut self) -> SyntaxResult<()> {
        match self.current_char() {
            Some(ch) if is_identifier_start(ch as u32) || ch == '\\' => self.read_word(),
            Some(ch) => self.get_token_from_code(ch),
            None => self.finish_token(TokenType::Eof, TokenValue::None),
        }
    }

    fn get_token_from_code(&mut self, ch: char) -> SyntaxResult<()> {
        match ch {
            '#' => self.finish_punct(TokenType::Hash, 1),
            '.' => self.read_token_dot(),
            '(' => self.finish_punct(TokenType::ParenL, 1),
            ')' => self.finish_punct(TokenType::ParenR, 1),
            ';' => self.finish_punct(TokenType::Semi, 1),
            ',' => self.finish_punct(TokenType::Comma, 1),
            '[' => self.finish_punct(TokenType::BracketL, 1),
            ']' => self.finish_punct(TokenType::BracketR, 1),
            '{' => self.finish_punct(TokenType::BraceL, 1),
            '}' => self.finish_punct(TokenType::BraceR, 1),
            ':' => {
                if self.char_at(1) == Some(':') {
                    self.finish_op(TokenType::DoubleColon, 2)
                } else {
                    self.finish_punct(TokenType::Colon, 1)
                }
            }
            '?' => self.read_token_question(),
            '@' => self.finish_punct(TokenType::At, 1),
            '`' => self.finish_punct(TokenType::BackQuote, 1),
            '0' => match self.char_at(1) {
                Some('x' | 'X') => self.read_radix_number(16),
                Some('o' | 'O') => self.read_radix_number(8),
                Some('b' | 'B') => self.read_radix_number(2),
                _ => self.read_number(false),
            },
            '1'..='9' => self.read_number(false),
            '"' | '\'' => self.read_string(ch),
            '/' => self.read_token_slash(),
            '%' | '*' => self.read_token_mult_modulo(ch),
            '|' | '&' => self.read_token_pipe_amp(ch),
            '^' => {
                if self.char_at(1) == Some('=') {
                    self.finish_op(TokenType::Assign, 2)
                } else {
                    self.finish_op(TokenType::Power, 1)
                }
            }
            '+' | '-' => self.read_token_plus_min(ch),
            '<' | '>' => self.read_token_lt_gt(ch),
            '=' | '!' => self.read_token_eq_excl(ch),
            '~' => self.finish_op(TokenType::Tilde, 1),
            _ => Err(self.raise(
                self.state.pos,
                &messages::UNEXPECTED_CHARACTER,
                &[&ch.to_string()],
            )),
        }
    }

    fn read_token_dot(&mut self) -> SyntaxResult<()> {
        if self.char_at(1).is_some_and(is_digit) {
            return self.read_number(true);
        }
        if self.char_at(1) == Some('.') && self.char_at(2) == Some('.') {
            self.finish_punct(TokenType::Ellipsis, 3)
        } else {
            self.finish_punct(TokenType::Dot, 1)
        }
    }

    fn read_token_slash(&mut self) -> SyntaxResult<()> {
        if self.state.context.expr_allowed {
            self.state.pos += 1;
            return self.read_regexp();
        }
        if self.char_at(1) == Some('=') {
            self.finish_op(TokenType::Assign, 2)
        } else {
            self.finish_op(TokenType::Slash, 1)
        }
    }

    fn read_token_mult_modulo(&mut self, ch: char) -> SyntaxResult<()> {
        let mut ty = if ch == '*' { TokenType::Star } else { TokenType::Modulo };
        let mut width = 1;
        let mut next = self.char_at(1);
        if ch == '*' && next == Some('*') {
            width += 1;
            next = self.char_at(2);
            ty = TokenType::Exponent;
        }
        if next == Some('=') && !self.state.context.expr_allowed {
            width += 1;
            ty = TokenType::Assign;
        }
        self.finish_op(ty, width)
    }

    fn read_token_pipe_amp(&mut self, ch: char) -> SyntaxResult<()> {
        let next = self.char_at(1);
        if next == Some(ch) {
            if self.char_at(2) == Some('=') {
                return self.finish_op(TokenType::Assign, 3);
            }
            let ty = if ch == '|' { TokenType::LogicalOr } else { TokenType::LogicalAnd };
            return self.finish_op(ty, 2);
        }
        if ch == '|' && next == Some('>') {
            return self.finish_op(TokenType::Pipeline, 2);
        }
        if next == Some('=') {
            return self.finish_op(TokenType::Assign, 2);
        }
        let ty = if ch == '|' { TokenType::BitwiseOr } else { TokenType::BitwiseAnd };
        self.finish_op(ty, 1)
    }

    fn read_token_plus_min(&mut self, ch: char) -> SyntaxResult<()> {
        let next = self.char_at(1);
        if next == Some(ch) {
            if ch == '-'
                && !self.options.module
                && self.char_at(2) == Some('>')
                && self.has_line_break(self.state.last_tok_end, self.state.pos)
            {
                // `-->` at the start of a line is an HTML close comment.
                self.skip_line_comment(3);
                self.skip_space()?;
                return self.next_token();
            }
            return self.finish_op(TokenType::IncDec, 2);
        }
        if ch == '-' && next == Some('>') {
            return self.finish_punct(TokenType::ArrowThin, 2);
        }
        if next == Some('=') {
            self.finish_op(TokenType::Assign, 2)
        } else {
            self.finish_op(TokenType::PlusMin, 1)
        }
    }

    fn read_token_lt_gt(&mut self, ch: char) -> SyntaxResult<()> {
        let next = self.char_at(1);
        if next == Some(ch) {
            let size = if ch == '>' && self.char_at(2) == Some('>') { 3 } else { 2 };
            if self.char_at(size) == Some('=') {
                return self.finish_op(TokenType::Assign, size + 1);
            }
            return self.finish_op(TokenType::BitShift, size);
        }
        if ch == '<'
            && next == Some('!')
            && !self.options.module
            && self.char_at(2) == Some('-')
            && self.char_at(3) == Some('-')
        {
            // `<!--` opens an HTML comment that runs to the end of the line.
            self.skip_line_comment(4);
            self.skip_space()?;
            return self.next_token();
        }
        let size = if next == Some('=') { 2 } else { 1 };
        self.finish_op(TokenType::Relational, size)
    }

    fn read_token_eq_excl(&mut self, ch: char) -> SyntaxResult<()> {
        let next = self.char_at(1);
        if next == Some('=') {
            let size = if self.char_at(2) == Some('=') { 3 } else { 2 };
            return self.finish_op(TokenType::Equality, size);
        }
        if ch == '=' && next == Some('>') {
            return self.finish_punct(TokenType::Arrow, 2);
        }
        let ty = if ch == '=' { TokenType::Eq } else { TokenType::Bang };
        self.finish_op(ty, 1)
    }

    fn read_token_question(&mut self) -> SyntaxResult<()> {
        let next = self.char_at(1);
        let next2 = self.char_at(2);
        if next == Some('?') {
            if next2 == Some('=') {
                self.finish_op(TokenType::Assign, 3)
            } else {
                self.finish_op(TokenType::NullishCoalescing, 2)
            }
        } else if next == Some('.') && !next2.is_some_and(is_digit) {
            self.finish_punct(TokenType::QuestionDot, 2)
        } else {
            self.finish_punct(TokenType::Question, 1)
        }
    }

    // ========================================================================
    // Regular expressions
    // ========================================================================

    fn read_regexp(&mut self) -> SyntaxResult<()> {
        let start = self.state.pos;
        let mut escaped = false;
        let mut in_class = false;
        loop {
            let Some(ch) = self.current_char() else {
                return Err(self.raise(start, &messages::UNTERMINATED_REGEXP, &[]).incomplete());
            };
            if is_line_terminator(ch) {
                return Err(self.raise(start, &messages::UNTERMINATED_REGEXP, &[]));
            }
            if escaped {
                escaped = false;
            } else {
                if ch == '[' {
                    in_class = true;
                } else if ch == ']' && in_class {
                    in_class = false;
                } else if ch == '/' && !in_class {
                    break;
                }
                escaped = ch == '\\';
            }
            self.state.pos += 1;
        }
        let pattern = self.slice(start, self.state.pos);
        self.state.pos += 1;

        let mut flags = String::new();
        while let Some(ch) = self.current_char() {
            if VALID_REGEX_FLAGS.contains(ch) {
                if flags.contains(ch) {
                    return Err(self.raise(self.state.pos + 1, &messages::DUPLICATE_REGEXP_FLAG, &[]));
                }
                self.state.pos += 1;
                flags.push(ch);
            } else if is_identifier_char(ch as u32) || ch == '\\' {
                return Err(self.raise(self.state.pos + 1, &messages::INVALID_REGEXP_FLAG, &[]));
            } else {
                break;
            }
        }
        self.finish_token(TokenType::Regexp, TokenValue::RegExp { pattern, flags })
    }

    // ========================================================================
    // Numbers
    // ========================================================================

    /// Read digits in `radix`. With `len`, exactly that many digits must be
    /// present.
    fn read_int(&mut self, radix: u32, len: Option<usize>) -> Option<f64> {
        let start = self.state.pos;
        let mut total = 0f64;
        while len.map_or(true, |len| self.state.pos - start < len) {
            let Some(digit) = self.current_char().and_then(|ch| ch.to_digit(radix)) else {
                break;
            };
            self.state.pos += 1;
            total = total * f64::from(radix) + f64::from(digit);
        }
        let read = self.state.pos - start;
        if read == 0 || len.is_some_and(|len| read != len) {
            None
        } else {
            Some(total)
        }
    }

    fn read_radix_number(&mut self, radix: u32) -> SyntaxResult<()> {
        let start = self.state.pos;
        self.state.pos += 2;
        let Some(value) = self.read_int(radix, None) else {
            return Err(self.raise(
                self.state.start + 2,
                &messages::EXPECTED_NUMBER_IN_RADIX,
                &[&radix.to_string()],
            ));
        };
        let is_bigint = self.current_char() == Some('n');
        if is_bigint {
            self.state.pos += 1;
        }
        self.check_no_identifier_after_number()?;
        if is_bigint {
            let digits = self.number_text(start);
            return self.finish_token(TokenType::BigInt, TokenValue::BigInt(digits));
        }
        self.finish_token(TokenType::Num, TokenValue::Num(value))
    }

    fn read_number(&mut self, starts_with_dot: bool) -> SyntaxResult<()> {
        let start = self.state.pos;
        let mut octal = self.input[start] == '0';
        let mut is_float = false;
        if !starts_with_dot && self.read_int(10, None).is_none() {
            return Err(self.raise(start, &messages::INVALID_NUMBER, &[]));
        }
        if octal && self.state.pos == start + 1 {
            octal = false;
        }

        let mut next = self.current_char();
        if next == Some('.') && !octal {
            self.state.pos += 1;
            self.read_int(10, None);
            is_float = true;
            next = self.current_char();
        }
        if matches!(next, Some('e' | 'E')) && !octal {
            self.state.pos += 1;
            if matches!(self.current_char(), Some('+' | '-')) {
                self.state.pos += 1;
            }
            if self.read_int(10, None).is_none() {
                return Err(self.raise(start, &messages::INVALID_NUMBER, &[]));
            }
            is_float = true;
            next = self.current_char();
        }
        let is_bigint = next == Some('n');
        if is_bigint {
            if is_float || octal {
                return Err(self.raise(start, &messages::INVALID_NUMBER, &[]));
            }
            self.state.pos += 1;
        }
        self.check_no_identifier_after_number()?;

        let text = self.number_text(start);
        if is_bigint {
            return self.finish_token(TokenType::BigInt, TokenValue::BigInt(text));
        }
        let value = if is_float || !octal || text.len() == 1 || text.contains(&['8', '9'][..]) {
            if octal && self.state.strict {
                return Err(self.raise(start, &messages::INVALID_NUMBER, &[]));
            }
            text.parse::<f64>()
                .map_err(|_| self.raise(start, &messages::INVALID_NUMBER, &[]))?
        } else if self.state.strict {
            return Err(self.raise(start, &messages::INVALID_NUMBER, &[]));
        } else {
            text.chars()
                .filter_map(|ch| ch.to_digit(8))
                .fold(0f64, |acc, digit| acc * 8.0 + f64::from(digit))
        };
        self.finish_token(TokenType::Num, TokenValue::Num(value))
    }

    /// The literal text from `start`, without the BigInt suffix.
    fn number_text(&self, start: usize) -> String {
        self.input[start..self.state.pos]
            .iter()
            .filter(|&&ch| ch != 'n' && ch != '_')
            .collect()
    }

    fn check_no_identifier_after_number(&self) -> SyntaxResult<()> {
        if self.current_char().is_some_and(|ch| is_identifier_start(ch as u32)) {
            return Err(self.raise(self.state.pos, &messages::IDENTIFIER_AFTER_NUMBER, &[]));
        }
        Ok(())
    }

    // ========================================================================
    // Strings, templates and escapes
    // ========================================================================

    fn read_string(&mut self, quote: char) -> SyntaxResult<()> {
        let mut out = String::new();
        self.state.pos += 1;
        let mut chunk_start = self.state.pos;
        loop {
            let Some(ch) = self.current_char() else {
                return Err(self
                    .raise(self.state.start, &messages::UNTERMINATED_STRING, &[])
                    .incomplete());
            };
            if ch == quote {
                break;
            }
            if ch == '\\' {
                out.push_str(&self.slice(chunk_start, self.state.pos));
                if let Some(escaped) = self.read_escaped_char(false)? {
                    out.push_str(&escaped);
                }
                chunk_start = self.state.pos;
            } else {
                if is_line_terminator(ch) {
                    return Err(self.raise(self.state.start, &messages::UNTERMINATED_STRING, &[]));
                }
                self.state.pos += 1;
            }
        }
        out.push_str(&self.slice(chunk_start, self.state.pos));
        self.state.pos += 1;
        self.finish_token(TokenType::String, TokenValue::Str(out))
    }

    fn read_tmpl_token(&mut self) -> SyntaxResult<()> {
        let mut out = String::new();
        let mut chunk_start = self.state.pos;
        let mut contains_invalid = false;
        loop {
            let Some(ch) = self.current_char() else {
                let open = self.state.template_starts.last().copied().unwrap_or(self.state.start);
                return Err(self.raise(open, &messages::UNTERMINATED_TEMPLATE, &[]).incomplete());
            };
            if ch == '`' || (ch == '$' && self.char_at(1) == Some('{')) {
                if self.state.pos == self.state.start && self.state.ty == TokenType::Template {
                    if ch == '$' {
                        return self.finish_punct(TokenType::DollarBraceL, 2);
                    }
                    return self.finish_punct(TokenType::BackQuote, 1);
                }
                out.push_str(&self.slice(chunk_start, self.state.pos));
                let cooked = if contains_invalid { None } else { Some(out) };
                return self.finish_token(TokenType::Template, TokenValue::Template(cooked));
            }
            if ch == '\\' {
                out.push_str(&self.slice(chunk_start, self.state.pos));
                match self.read_escaped_char(true)? {
                    Some(escaped) => out.push_str(&escaped),
                    None => contains_invalid = true,
                }
                chunk_start = self.state.pos;
            } else if is_line_terminator(ch) {
                out.push_str(&self.slice(chunk_start, self.state.pos));
                self.state.pos += 1;
                if ch == '\r' {
                    if self.current_char() == Some('\n') {
                        self.state.pos += 1;
                    }
                    out.push('\n');
                } else {
                    out.push(ch);
                }
                chunk_start = self.state.pos;
            } else {
                self.state.pos += 1;
            }
        }
    }

    /// Read the escape at `pos` (the backslash). `None` marks an escape that
    /// is invalid inside a template.
    fn read_escaped_char(&mut self, in_template: bool) -> SyntaxResult<Option<String>> {
        let throw_on_invalid = !in_template;
        self.state.pos += 1;
        let Some(ch) = self.current_char() else {
            return Ok(Some(String::new()));
        };
        self.state.pos += 1;
        let escaped = match ch {
            'n' => "\n".to_string(),
            'r' => "\r".to_string(),
            'x' => return Ok(self.read_hex_char(2, throw_on_invalid)?.map(code_point_to_string)),
            'u' => return Ok(self.read_code_point(throw_on_invalid)?.map(code_point_to_string)),
            't' => "\t".to_string(),
            'b' => "\u{8}".to_string(),
            'v' => "\u{B}".to_string(),
            'f' => "\u{C}".to_string(),
            '\r' => {
                if self.current_char() == Some('\n') {
                    self.state.pos += 1;
                }
                String::new()
            }
            '\n' => String::new(),
            '0'..='7' => {
                let code_pos = self.state.pos - 1;
                let mut digits: String = self.input[code_pos..]
                    .iter()
                    .take(3)
                    .take_while(|ch| ('0'..='7').contains(*ch))
                    .collect();
                let mut octal = u32::from_str_radix(&digits, 8).unwrap_or(0);
                if octal > 255 {
                    digits.pop();
                    octal = u32::from_str_radix(&digits, 8).unwrap_or(0);
                }
                if octal > 0 {
                    if in_template {
                        self.state.invalid_template_escape_position = Some(code_pos);
                        return Ok(None);
                    } else if self.state.strict {
                        return Err(self.raise(code_pos, &messages::OCTAL_IN_STRICT, &[]));
                    } else if !self.state.contains_octal {
                        self.state.contains_octal = true;
                        self.state.octal_position = Some(code_pos);
                    }
                }
                self.state.pos += digits.len() - 1;
                code_point_to_string(octal)
            }
            other => other.to_string(),
        };
        Ok(Some(escaped))
    }

    fn read_hex_char(&mut self, len: usize, throw_on_invalid: bool) -> SyntaxResult<Option<u32>> {
        let code_pos = self.state.pos;
        match self.read_int(16, Some(len)) {
            Some(value) => Ok(Some(value.min(f64::from(u32::MAX)) as u32)),
            None if throw_on_invalid => Err(self.raise(code_pos, &messages::BAD_ESCAPE, &[])),
            None => {
                self.state.pos = code_pos - 1;
                self.state.invalid_template_escape_position = Some(code_pos - 1);
                Ok(None)
            }
        }
    }

    /// Read the code point of a `\u` escape, with `pos` after the `u`.
    fn read_code_point(&mut self, throw_on_invalid: bool) -> SyntaxResult<Option<u32>> {
        if self.current_char() != Some('{') {
            return self.read_hex_char(4, throw_on_invalid);
        }
        self.state.pos += 1;
        let code_pos = self.state.pos;
        let len = self.input[code_pos..].iter().position(|&ch| ch == '}').unwrap_or(0);
        let code = self.read_hex_char(len, throw_on_invalid)?;
        self.state.pos += 1;
        match code {
            None => {
                if let Some(pos) = self.state.invalid_template_escape_position.as_mut() {
                    *pos = pos.saturating_sub(1);
                }
                Ok(None)
            }
            Some(code) if code > 0x10FFFF => {
                if throw_on_invalid {
                    Err(self.raise(code_pos, &messages::CODE_POINT_OUT_OF_BOUNDS, &[]))
                } else {
                    self.state.invalid_template_escape_position = Some(code_pos - 2);
                    Ok(None)
                }
            }
            Some(code) => Ok(Some(code)),
        }
    }

    // ========================================================================
    // Words
    // ========================================================================

    fn read_word1(&mut self) -> SyntaxResult<String> {
        self.state.contains_esc = false;
        let mut word = String::new();
        let mut first = true;
        let mut chunk_start = self.state.pos;
        while let Some(ch) = self.current_char() {
            if is_identifier_char(ch as u32) {
                self.state.pos += 1;
            } else if ch == '\\' {
                self.state.contains_esc = true;
                word.push_str(&self.slice(chunk_start, self.state.pos));
                let esc_start = self.state.pos;
                self.state.pos += 1;
                if self.current_char() != Some('u') {
                    return Err(self.raise(self.state.pos, &messages::EXPECTING_UNICODE_ESCAPE, &[]));
                }
                self.state.pos += 1;
                let Some(esc) = self.read_code_point(true)? else {
                    return Err(self.raise(esc_start, &messages::INVALID_UNICODE_ESCAPE, &[]));
                };
                let valid = if first { is_identifier_start(esc) } else { is_identifier_char(esc) };
                if !valid {
                    return Err(self.raise(esc_start, &messages::INVALID_UNICODE_ESCAPE, &[]));
                }
                word.push_str(&code_point_to_string(esc));
                chunk_start = self.state.pos;
            } else {
                break;
            }
            first = false;
        }
        word.push_str(&self.slice(chunk_start, self.state.pos));
        Ok(word)
    }

    fn read_word(&mut self) -> SyntaxResult<()> {
        let word = self.read_word1()?;
        let ty = match TokenType::from_keyword(&word) {
            Some(keyword) => {
                if self.state.contains_esc {
                    return Err(self.raise(self.state.pos, &messages::ESCAPE_IN_KEYWORD, &[&word]));
                }
                keyword
            }
            None => TokenType::Name,
        };
        self.finish_token(ty, TokenValue::Str(word))
    }
}

/// Lone surrogates cannot live in a `String`; they become U+FFFD.
fn code_point_to_string(code: u32) -> String {
    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types_of(source: &str) -> Vec<TokenType> {
        let mut tokenizer = Tokenizer::new(source, TokenizerOptions::default());
        tokenizer.next_token().unwrap();
        let mut types = Vec::new();
        while tokenizer.ty() != TokenType::Eof {
            types.push(tokenizer.ty());
            tokenizer.next().unwrap();
        }
        types
    }

    #[test]
    fn test_simple_tokens() {
        use TokenType::*;
        assert_eq!(types_of("( ) { } [ ] ; , : ::"), vec![
            ParenL, ParenR, BraceL, BraceR, BracketL, BracketR, Semi, Comma, Colon, DoubleColon
        ]);
    }

    #[test]
    fn test_extended_operators() {
        use TokenType::*;
        assert_eq!(types_of("a |> f"), vec![Name, Pipeline, Name]);
        assert_eq!(types_of("a?.b"), vec![Name, QuestionDot, Name]);
        assert_eq!(types_of("a ? .5 : 1"), vec![Name, Question, Num, Colon, Num]);
        assert_eq!(types_of("x -> y"), vec![Name, ArrowThin, Name]);
        assert_eq!(types_of("a ^ b"), vec![Name, Power, Name]);
        assert_eq!(types_of("Set#{}"), vec![Name, Hash, BraceL, BraceR]);
    }

    #[test]
    fn test_lookahead_does_not_consume() {
        let mut tokenizer = Tokenizer::new("a b", TokenizerOptions::default());
        tokenizer.next_token().unwrap();
        let ahead = tokenizer.lookahead().unwrap();
        assert_eq!(ahead.ty, TokenType::Name);
        assert_eq!(ahead.value, TokenValue::Str("b".into()));
        assert_eq!(tokenizer.value(), &TokenValue::Str("a".into()));
        assert_eq!(tokenizer.state.start, 0);
    }

    #[test]
    fn test_comments_are_queued() {
        let mut tokenizer = Tokenizer::new("/* a */ x // b\n", TokenizerOptions::default());
        tokenizer.next_token().unwrap();
        tokenizer.next().unwrap();
        let fresh = tokenizer.take_fresh_comments();
        assert_eq!(fresh.len(), 2);
        assert_eq!(tokenizer.comment(fresh[0]).value, " a ");
        assert_eq!(tokenizer.comment(fresh[1]).kind, CommentKind::Line);
        assert!(tokenizer.take_fresh_comments().is_empty());
    }

    #[test]
    fn test_set_strict_rereads_octal() {
        let mut tokenizer = Tokenizer::new("010", TokenizerOptions::default());
        tokenizer.next_token().unwrap();
        assert_eq!(tokenizer.value(), &TokenValue::Num(8.0));
        assert!(tokenizer.set_strict(true).is_err());
    }
}
