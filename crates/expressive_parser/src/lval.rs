//! Patterns: converting expressions into assignment targets, parsing
//! binding patterns, and validating left-hand sides.

use expressive_ast::node::*;
use expressive_ast::{AssignmentOperator, MethodKind, NodeKind};
use expressive_core::Atom;
use expressive_diagnostics::messages::*;
use expressive_diagnostics::SyntaxResult;
use rustc_hash::FxHashSet;
use expressive_scanner::TokenType;

use crate::parser::{Parser, Start};

impl Parser {
    // ========================================================================
    // Expression to pattern
    // ========================================================================

    /// Convert an expression parsed ahead of `=` or `=>` into a pattern in
    /// place.
    pub(crate) fn to_assignable(&mut self, id: NodeId, is_binding: bool, context: &str) -> SyntaxResult<()> {
        let start = self.ast[id].start as usize;
        let kind = self.ast.kind(id).clone();
        if self.is_parenthesized(id) && !matches!(kind, NodeKind::Identifier { .. } | NodeKind::MemberExpression { .. }) {
            return Err(self.raise(start, &INVALID_PARENTHESIZED_PATTERN, &[]));
        }

        match kind {
            NodeKind::Identifier { .. }
            | NodeKind::ObjectPattern { .. }
            | NodeKind::ArrayPattern { .. }
            | NodeKind::AssignmentPattern { .. }
            | NodeKind::RestElement { .. }
            | NodeKind::CollectionPattern { .. } => Ok(()),

            NodeKind::MemberExpression { .. } if !is_binding => Ok(()),

            NodeKind::Object { properties } => {
                for (i, &prop) in properties.iter().enumerate() {
                    match self.ast.kind(prop).clone() {
                        NodeKind::ObjectMethod { kind, key, .. } => {
                            let pos = self.ast[key].start as usize;
                            let message = match kind {
                                MethodKind::Get | MethodKind::Set => &PATTERN_GETTER_SETTER,
                                _ => &PATTERN_METHODS,
                            };
                            return Err(self.raise(pos, message, &[]));
                        }
                        NodeKind::SpreadElement { argument } => {
                            if i + 1 != properties.len() {
                                return Err(self.raise(self.ast[prop].start as usize, &REST_NOT_LAST, &[]));
                            }
                            self.to_rest_element(prop, argument, is_binding, context)?;
                        }
                        NodeKind::ObjectProperty { value, .. } => self.to_assignable(value, is_binding, context)?,
                        _ => {}
                    }
                }
                self.set_kind(id, NodeKind::ObjectPattern { properties });
                Ok(())
            }

            NodeKind::Array { elements } => {
                self.to_assignable_list(&elements, is_binding, context)?;
                self.set_kind(id, NodeKind::ArrayPattern { elements });
                Ok(())
            }

            NodeKind::AssignmentExpression { operator, left, right } => {
                if operator != AssignmentOperator::Assign {
                    return Err(self.raise(self.ast[left].end as usize, &DEFAULT_VALUE_OPERATOR, &[]));
                }
                self.set_kind(id, NodeKind::AssignmentPattern { left, right });
                Ok(())
            }

            NodeKind::CollectionLiteral { constructor, collection } => {
                self.to_assignable(collection, is_binding, context)?;
                self.set_kind(id, NodeKind::CollectionPattern { destructurer: constructor, pattern: collection });
                Ok(())
            }

            _ if is_binding => Err(self.raise(start, &BINDING_INVALID_LHS, &[context])),
            _ => Err(self.raise(start, &INVALID_LHS, &[context])),
        }
    }

    /// Convert a list of elements; only the last may be a spread.
    pub(crate) fn to_assignable_list(
        &mut self,
        elements: &[Option<NodeId>],
        is_binding: bool,
        context: &str,
    ) -> SyntaxResult<()> {
        let count = elements.len();
        for (i, element) in elements.iter().enumerate() {
            let Some(element) = *element else {
                continue;
            };
            if let NodeKind::SpreadElement { argument } = *self.ast.kind(element) {
                if i + 1 != count {
                    return Err(self.raise(self.ast[element].start as usize, &REST_NOT_LAST, &[]));
                }
                self.to_rest_element(element, argument, is_binding, context)?;
                continue;
            }
            self.to_assignable(element, is_binding, context)?;
        }
        Ok(())
    }

    fn to_rest_element(&mut self, spread: NodeId, argument: NodeId, is_binding: bool, context: &str) -> SyntaxResult<()> {
        self.to_assignable(argument, is_binding, context)?;
        if !matches!(
            self.ast.kind(argument),
            NodeKind::Identifier { .. }
                | NodeKind::MemberExpression { .. }
                | NodeKind::ArrayPattern { .. }
                | NodeKind::ObjectPattern { .. }
                | NodeKind::CollectionPattern { .. }
        ) {
            return Err(self.raise(self.ast[argument].start as usize, &INVALID_REST_ARGUMENT, &[]));
        }
        self.set_kind(spread, NodeKind::RestElement { argument });
        Ok(())
    }

    // ========================================================================
    // Binding patterns
    // ========================================================================

    /// `...pattern`.
    pub(crate) fn parse_rest(&mut self) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        self.expect(TokenType::Ellipsis)?;
        let argument = self.parse_binding_atom()?;
        Ok(self.finish(start, NodeKind::RestElement { argument }))
    }

    /// A bound name, or `Name#pattern` for a collection pattern.
    pub(crate) fn parse_binding_identifier(&mut self) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        if self.ty().is_keyword() {
            return Err(self.raise(start.pos, &UNEXPECTED_KEYWORD_IN_BINDING, &[]));
        }
        let id = self.parse_identifier(false)?;
        if !self.eat_collection_hash()? {
            return Ok(id);
        }
        let pattern = match self.ty() {
            TokenType::BraceL => self.parse_obj(true, None)?,
            TokenType::BracketL => self.parse_array_pattern()?,
            TokenType::Name => self.parse_binding_identifier()?,
            _ => return Err(self.raise(self.cur_start(), &INVALID_COLLECTION_PATTERN, &[])),
        };
        Ok(self.finish(start, NodeKind::CollectionPattern { destructurer: id, pattern }))
    }

    pub(crate) fn parse_binding_atom(&mut self) -> SyntaxResult<NodeId> {
        match self.ty() {
            TokenType::BracketL => self.parse_array_pattern(),
            TokenType::BraceL => self.parse_obj(true, None),
            _ => self.parse_binding_identifier(),
        }
    }

    fn parse_array_pattern(&mut self) -> SyntaxResult<NodeId> {
        let start = self.start_node();
        self.expect(TokenType::BracketL)?;
        let elements = self.parse_binding_list(TokenType::BracketR, true)?;
        Ok(self.finish(start, NodeKind::ArrayPattern { elements }))
    }

    /// Binding elements up to and including `close`. Holes are `None` and
    /// only allowed with `allow_empty`.
    pub(crate) fn parse_binding_list(&mut self, close: TokenType, allow_empty: bool) -> SyntaxResult<Vec<Option<NodeId>>> {
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
            if self.is(TokenType::Ellipsis) {
                elements.push(Some(self.parse_rest()?));
                if self.is(TokenType::Comma) {
                    let message =
                        if self.tok.lookahead()?.ty == close { &TRAILING_COMMA_AFTER_REST } else { &REST_NOT_LAST };
                    return Err(self.raise(self.cur_start(), message, &[]));
                }
                self.expect(close)?;
                break;
            }
            elements.push(Some(self.parse_maybe_default(None, None)?));
        }
        Ok(elements)
    }

    /// `left = default`, parsing `left` as a binding atom unless given.
    pub(crate) fn parse_maybe_default(&mut self, start: Option<Start>, left: Option<NodeId>) -> SyntaxResult<NodeId> {
        let start = start.unwrap_or_else(|| self.start_node());
        let left = match left {
            Some(left) => left,
            None => self.parse_binding_atom()?,
        };
        if !self.eat(TokenType::Eq)? {
            return Ok(left);
        }
        let right = self.parse_maybe_assign(None)?;
        Ok(self.finish(start, NodeKind::AssignmentPattern { left, right }))
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check that `id` can be assigned to. With `clashes`, bound names must
    /// be unique.
    pub(crate) fn check_lval(
        &self,
        id: NodeId,
        is_binding: bool,
        mut clashes: Option<&mut FxHashSet<Atom>>,
        context: &str,
    ) -> SyntaxResult<()> {
        let start = self.ast[id].start as usize;
        match self.ast.kind(id) {
            NodeKind::Identifier { name } => {
                if let Some(names) = clashes {
                    if !names.insert(*name) {
                        return Err(self.raise(start, &ARGUMENT_NAME_CLASH, &[]));
                    }
                }
                Ok(())
            }
            NodeKind::MemberExpression { property, computed, .. } => {
                if is_binding {
                    return Err(self.raise(start, &BINDING_MEMBER_EXPRESSION, &[]));
                }
                if *computed && matches!(self.ast.kind(*property), NodeKind::SliceMember { .. }) {
                    return Err(self.raise(start, &INVALID_LHS, &[context]));
                }
                Ok(())
            }
            NodeKind::ObjectPattern { properties } => {
                for &prop in properties {
                    let target = match self.ast.kind(prop) {
                        NodeKind::ObjectProperty { value, .. } => *value,
                        _ => prop,
                    };
                    self.check_lval(target, is_binding, clashes.as_deref_mut(), "object destructuring pattern")?;
                }
                Ok(())
            }
            NodeKind::ArrayPattern { elements } => {
                for &element in elements.iter().flatten() {
                    self.check_lval(element, is_binding, clashes.as_deref_mut(), "array destructuring pattern")?;
                }
                Ok(())
            }
            NodeKind::AssignmentPattern { left, .. } => {
                self.check_lval(*left, is_binding, clashes, "assignment pattern")
            }
            NodeKind::RestElement { argument } => self.check_lval(*argument, is_binding, clashes, "rest element"),
            NodeKind::CollectionPattern { destructurer, pattern } => {
                if !matches!(
                    self.ast.kind(*destructurer),
                    NodeKind::Identifier { .. } | NodeKind::MemberExpression { .. }
                ) {
                    return Err(self.raise(self.ast[*destructurer].start as usize, &INVALID_LHS, &[context]));
                }
                self.check_lval(*pattern, is_binding, clashes, "collection pattern")
            }
            _ if is_binding => Err(self.raise(start, &BINDING_INVALID_LHS, &[context])),
            _ => Err(self.raise(start, &INVALID_LHS, &[context])),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{parse, Options};

    fn error(source: &str) -> String {
        parse(source, &Options::default()).unwrap_err().message
    }

    #[test]
    fn test_object_and_array_patterns() {
        assert!(parse("({a, b: [c, ...d]} = x)", &Options::default()).is_ok());
        assert!(parse("[a, , b = 1] = x", &Options::default()).is_ok());
    }

    #[test]
    fn test_collection_pattern() {
        assert!(parse("let Map#{a, b} = m", &Options::default()).is_ok());
        assert_eq!(error("let Map#5 = m"), "Invalid pattern in CollectionPattern");
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert_eq!(error("1 = a"), "Invalid left-hand side in assignment expression");
        assert_eq!(error("a[1:2] = b"), "Invalid left-hand side in assignment expression");
    }

    #[test]
    fn test_default_value_operator() {
        assert_eq!(error("[a += 1] = b"), "Only '=' operator can be used for specifying default value.");
    }

    #[test]
    fn test_pattern_methods() {
        assert_eq!(error("({ f() {} } = a)"), "Object pattern can't contain methods");
        assert_eq!(error("({ get f() {} } = a)"), "Object pattern can't contain getter or setter");
    }

    #[test]
    fn test_rest_must_be_last() {
        assert_eq!(error("[...a, b] = c"), "The rest element has to be the last element when destructuring");
        assert_eq!(error("let [...a,] = c"), "A trailing comma is not permitted after the rest element");
    }

    #[test]
    fn test_parenthesized_pattern() {
        assert!(error("({a}) = 1").starts_with("You're trying to assign to a parenthesized expression"));
    }

    #[test]
    fn test_argument_name_clash_in_arrows() {
        assert_eq!(error("(a, a) => a"), "Argument name clash in strict mode");
    }

    #[test]
    fn test_binding_keyword() {
        assert_eq!(error("let if = 1"), "Unexpected keyword in binding");
    }
}
