//! The lexical context stack.
//!
//! Whether a `/` starts a regular expression or a `` ` `` opens a template
//! depends on the brackets the tokenizer is inside and on the previous
//! token. That state is a plain value, [`ContextState`], advanced by the
//! pure function [`update_context`] after every token.

use crate::token_type::TokenType;

/// One entry of the lexical context stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokContext {
    BraceStatement,
    BraceExpression,
    /// `${` inside a template.
    TemplateQuasi,
    /// The parenthesized head of `if`, `for`, `with` or `while`.
    ParenStatement,
    ParenExpression,
    /// Between the backquotes of a template.
    Template,
    FunctionExpression,
}

impl TokContext {
    #[inline]
    pub fn is_expr(self) -> bool {
        !matches!(self, TokContext::BraceStatement | TokContext::ParenStatement)
    }

    /// Whitespace is significant, so `skip_space` must not run.
    #[inline]
    pub fn preserve_space(self) -> bool {
        self == TokContext::Template
    }

    /// The next token is read as template text.
    #[inline]
    pub fn reads_template(self) -> bool {
        self == TokContext::Template
    }
}

/// The context stack and whether an expression may start here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextState {
    pub stack: Vec<TokContext>,
    pub expr_allowed: bool,
}

impl Default for ContextState {
    fn default() -> Self {
        Self {
            stack: vec![TokContext::BraceStatement],
            expr_allowed: true,
        }
    }
}

impl ContextState {
    /// The innermost context.
    #[inline]
    pub fn current(&self) -> Option<TokContext> {
        self.stack.last().copied()
    }
}

/// Facts about the token just finished that the context update needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextInput {
    pub prev: TokenType,
    pub cur: TokenType,
    /// The token is the name `of`.
    pub value_is_of: bool,
    /// A line break occurs somewhere after the token.
    pub line_break_after: bool,
    /// Result of [`brace_is_block`] for `prev`.
    pub brace_is_block: bool,
}

/// Compute the context after the token described by `input`.
pub fn update_context(state: &ContextState, input: ContextInput) -> ContextState {
    let mut next = state.clone();
    let cur = input.cur;

    if cur.is_keyword() && matches!(input.prev, TokenType::Dot | TokenType::QuestionDot) {
        next.expr_allowed = false;
        return next;
    }

    match cur {
        TokenType::ParenR | TokenType::BraceR => {
            if next.stack.len() == 1 {
                next.expr_allowed = true;
                return next;
            }
            let out = next.stack.pop();
            next.expr_allowed = match out {
                Some(TokContext::BraceStatement)
                    if next.current() == Some(TokContext::FunctionExpression) =>
                {
                    next.stack.pop();
                    false
                }
                Some(TokContext::TemplateQuasi) => true,
                Some(ctx) => !ctx.is_expr(),
                None => true,
            };
        }
        TokenType::Name => {
            if input.value_is_of && next.current() == Some(TokContext::ParenStatement) {
                next.expr_allowed = !input.prev.before_expr();
            } else {
                next.expr_allowed = matches!(
                    input.prev,
                    TokenType::Let | TokenType::Const | TokenType::Var
                ) && input.line_break_after;
            }
        }
        TokenType::BraceL => {
            next.stack.push(if input.brace_is_block {
                TokContext::BraceStatement
            } else {
                TokContext::BraceExpression
            });
            next.expr_allowed = true;
        }
        TokenType::DollarBraceL => {
            next.stack.push(TokContext::TemplateQuasi);
            next.expr_allowed = true;
        }
        TokenType::ParenL => {
            let statement_parens = matches!(
                input.prev,
                TokenType::If | TokenType::For | TokenType::With | TokenType::While
            );
            next.stack.push(if statement_parens {
                TokContext::ParenStatement
            } else {
                TokContext::ParenExpression
            });
            next.expr_allowed = true;
        }
        TokenType::IncDec => {}
        TokenType::Function => {
            if next.expr_allowed && !input.brace_is_block {
                next.stack.push(TokContext::FunctionExpression);
            }
            next.expr_allowed = false;
        }
        TokenType::BackQuote => {
            if next.current() == Some(TokContext::Template) {
                next.stack.pop();
            } else {
                next.stack.push(TokContext::Template);
            }
            next.expr_allowed = false;
        }
        _ => next.expr_allowed = cur.before_expr(),
    }
    next
}

/// Whether a `{` following `prev` opens a block rather than an object.
///
/// `line_break_before` reports a line break between the previous token and
/// the brace.
pub fn brace_is_block(state: &ContextState, prev: TokenType, line_break_before: bool) -> bool {
    match prev {
        TokenType::Colon => match state.current() {
            Some(parent @ (TokContext::BraceStatement | TokContext::BraceExpression)) => {
                !parent.is_expr()
            }
            _ => !state.expr_allowed,
        },
        TokenType::Return => line_break_before,
        TokenType::Else | TokenType::Semi | TokenType::Eof | TokenType::ParenR => true,
        TokenType::BraceL => state.current() == Some(TokContext::BraceStatement),
        TokenType::Relational => true,
        _ => !state.expr_allowed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(prev: TokenType, cur: TokenType) -> ContextInput {
        ContextInput {
            prev,
            cur,
            value_is_of: false,
            line_break_after: false,
            brace_is_block: false,
        }
    }

    #[test]
    fn test_initial_state() {
        let state = ContextState::default();
        assert_eq!(state.stack, vec![TokContext::BraceStatement]);
        assert!(state.expr_allowed);
    }

    #[test]
    fn test_paren_after_if_is_statement() {
        let state = ContextState::default();
        let next = update_context(&state, input(TokenType::If, TokenType::ParenL));
        assert_eq!(next.current(), Some(TokContext::ParenStatement));
        let closed = update_context(&next, input(TokenType::Name, TokenType::ParenR));
        assert!(closed.expr_allowed);
        assert_eq!(closed.stack.len(), 1);
        // The input state is left untouched.
        assert_eq!(state, ContextState::default());
    }

    #[test]
    fn test_paren_expression_disallows_regexp_after() {
        let state = ContextState::default();
        let open = update_context(&state, input(TokenType::Name, TokenType::ParenL));
        let closed = update_context(&open, input(TokenType::Name, TokenType::ParenR));
        assert!(!closed.expr_allowed);
    }

    #[test]
    fn test_function_expression_popped_with_body() {
        let mut state = ContextState::default();
        state = update_context(&state, input(TokenType::Eq, TokenType::Function));
        assert_eq!(state.current(), Some(TokContext::FunctionExpression));
        let mut brace = input(TokenType::ParenR, TokenType::BraceL);
        brace.brace_is_block = true;
        state = update_context(&state, brace);
        state = update_context(&state, input(TokenType::BraceL, TokenType::BraceR));
        assert_eq!(state.stack, vec![TokContext::BraceStatement]);
        assert!(!state.expr_allowed);
    }

    #[test]
    fn test_template_toggles() {
        let state = ContextState::default();
        let open = update_context(&state, input(TokenType::Eq, TokenType::BackQuote));
        assert_eq!(open.current(), Some(TokContext::Template));
        assert!(open.current().is_some_and(TokContext::preserve_space));
        let close = update_context(&open, input(TokenType::Template, TokenType::BackQuote));
        assert_eq!(close.stack.len(), 1);
    }

    #[test]
    fn test_keyword_after_dot() {
        let state = ContextState::default();
        let next = update_context(&state, input(TokenType::Dot, TokenType::Return));
        assert!(!next.expr_allowed);
    }

    #[test]
    fn test_name_after_let_with_line_break() {
        let state = ContextState::default();
        let mut name = input(TokenType::Let, TokenType::Name);
        assert!(!update_context(&state, name).expr_allowed);
        name.line_break_after = true;
        assert!(update_context(&state, name).expr_allowed);
    }

    #[test]
    fn test_of_in_for_head() {
        let mut state = ContextState::default();
        state.stack.push(TokContext::ParenStatement);
        let mut of = input(TokenType::Name, TokenType::Name);
        of.value_is_of = true;
        assert!(update_context(&state, of).expr_allowed);
    }

    #[test]
    fn test_brace_is_block() {
        let state = ContextState::default();
        assert!(brace_is_block(&state, TokenType::ParenR, false));
        assert!(brace_is_block(&state, TokenType::Return, true));
        assert!(!brace_is_block(&state, TokenType::Return, false));
        assert!(brace_is_block(&state, TokenType::Colon, false));
        let mut expr = state.clone();
        expr.stack.push(TokContext::BraceExpression);
        assert!(!brace_is_block(&expr, TokenType::Colon, false));
        assert!(!brace_is_block(&state, TokenType::Eq, false));
    }
}
