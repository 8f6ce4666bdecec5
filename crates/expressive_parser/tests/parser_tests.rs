//! Parser integration tests.
//!
//! Verifies that the parser builds the extended tree for the expressive
//! language and reports errors at the right place.

use expressive_ast::{BinaryOperator, NodeId, NodeKind};
use expressive_parser::{parse, Options, ParseResult};

/// Helper: parse a script and panic on error.
fn parse_ok(source: &str) -> ParseResult {
    match parse(source, &Options::default()) {
        Ok(result) => result,
        Err(err) => panic!("failed to parse {:?}: {}", source, err),
    }
}

/// Helper: the top-level items of the program.
fn body(result: &ParseResult) -> Vec<NodeId> {
    match result.ast.kind(result.program()) {
        NodeKind::Program { body, .. } => body.clone(),
        other => panic!("expected a program, got {}", other.type_name()),
    }
}

/// Helper: the only top-level item.
fn single(result: &ParseResult) -> NodeId {
    let body = body(result);
    assert_eq!(body.len(), 1, "expected one item");
    body[0]
}

fn error_message(source: &str) -> String {
    match parse(source, &Options::default()) {
        Ok(_) => panic!("expected {:?} to fail", source),
        Err(err) => err.message,
    }
}

// ============================================================================
// Statements and ASI
// ============================================================================

#[test]
fn test_program_holds_expressions_directly() {
    let result = parse_ok("a; b\nc");
    let kinds: Vec<_> = body(&result).iter().map(|&id| result.ast.kind(id).type_name()).collect();
    assert_eq!(kinds, vec!["Identifier", "Identifier", "Identifier"]);
}

#[test]
fn test_return_followed_by_newline_has_no_argument() {
    let result = parse_ok("function f() { return\n5 }");
    let NodeKind::Function { body, .. } = result.ast.kind(single(&result)) else {
        panic!("expected a function");
    };
    let NodeKind::Block { body } = result.ast.kind(*body) else {
        panic!("expected a block body");
    };
    assert_eq!(body.len(), 2);
    assert!(matches!(result.ast.kind(body[0]), NodeKind::Return { argument: None }));
    assert!(matches!(result.ast.kind(body[1]), NodeKind::NumericLiteral { value } if *value == 5.0));
}

#[test]
fn test_missing_semicolon_on_one_line() {
    assert_eq!(error_message("a b"), "Unexpected token, expected \";\"");
}

#[test]
fn test_control_forms_mark_statement_position() {
    let result = parse_ok("if (a) b else c\nx = if (a) b else c");
    let items = body(&result);
    assert!(matches!(result.ast.kind(items[0]), NodeKind::If { is_statement: true, .. }));
    let NodeKind::AssignmentExpression { right, .. } = result.ast.kind(items[1]) else {
        panic!("expected an assignment");
    };
    assert!(matches!(result.ast.kind(*right), NodeKind::If { is_statement: false, alternate: Some(_), .. }));
}

#[test]
fn test_single_expression_bodies() {
    let result = parse_ok("while (a) a--");
    let NodeKind::While { body, .. } = result.ast.kind(single(&result)) else {
        panic!("expected a while loop");
    };
    assert!(matches!(result.ast.kind(*body), NodeKind::SingleExpression { .. }));
}

#[test]
fn test_switch_cases_take_parenthesized_tests() {
    let result = parse_ok("switch (a) { case (1) b; default c }");
    let NodeKind::Switch { cases, .. } = result.ast.kind(single(&result)) else {
        panic!("expected a switch");
    };
    assert_eq!(cases.len(), 2);
    assert!(matches!(result.ast.kind(cases[0]), NodeKind::Case { test: Some(_), .. }));
    assert!(matches!(result.ast.kind(cases[1]), NodeKind::Case { test: None, .. }));
}

#[test]
fn test_for_of_with_declaration() {
    let result = parse_ok("for (let x of xs) f(x)");
    assert!(matches!(result.ast.kind(single(&result)), NodeKind::ForOf { is_await: false, .. }));
}

// ============================================================================
// Extended operators
// ============================================================================

#[test]
fn test_optional_chain_flags() {
    let result = parse_ok("a?.b.c");
    let NodeKind::OptionalMemberExpression { object, optional, .. } = result.ast.kind(single(&result)) else {
        panic!("expected an optional member");
    };
    assert!(!optional);
    assert!(matches!(result.ast.kind(*object), NodeKind::OptionalMemberExpression { optional: true, .. }));
}

#[test]
fn test_optional_call() {
    let result = parse_ok("a?.(1)");
    assert!(matches!(
        result.ast.kind(single(&result)),
        NodeKind::OptionalCallExpression { optional: true, arguments, .. } if arguments.len() == 1
    ));
}

#[test]
fn test_pipeline_is_left_associative() {
    let result = parse_ok("x |> f |> g");
    let NodeKind::BinaryExpression { operator, left, .. } = result.ast.kind(single(&result)) else {
        panic!("expected a pipeline");
    };
    assert_eq!(*operator, BinaryOperator::Pipeline);
    assert!(matches!(result.ast.kind(*left), NodeKind::BinaryExpression { operator: BinaryOperator::Pipeline, .. }));
}

#[test]
fn test_arrow_in_pipeline_does_not_swallow_the_next_stage() {
    let result = parse_ok("x |> y => y + 1 |> g");
    let NodeKind::BinaryExpression { left, right, .. } = result.ast.kind(single(&result)) else {
        panic!("expected a pipeline");
    };
    assert!(matches!(result.ast.kind(*right), NodeKind::Identifier { .. }));
    let NodeKind::BinaryExpression { right: arrow, .. } = result.ast.kind(*left) else {
        panic!("expected an inner pipeline");
    };
    assert!(matches!(result.ast.kind(*arrow), NodeKind::ArrowFunction { .. }));
}

#[test]
fn test_bind_expressions() {
    let result = parse_ok("a::b.c; ::a.b");
    let items = body(&result);
    assert!(matches!(result.ast.kind(items[0]), NodeKind::BindExpression { object: Some(_), .. }));
    assert!(matches!(result.ast.kind(items[1]), NodeKind::BindExpression { object: None, .. }));
    assert_eq!(error_message("::a"), "Binding should be performed on object property.");
}

#[test]
fn test_slices() {
    let result = parse_ok("a[1:]; a[:2]; a[:]; a[1:2]");
    let expected = [(true, false), (false, true), (false, false), (true, true)];
    for (&item, (has_begin, has_end)) in body(&result).iter().zip(expected) {
        let NodeKind::MemberExpression { property, computed: true, .. } = result.ast.kind(item) else {
            panic!("expected a computed member");
        };
        let NodeKind::SliceMember { beginning, finish } = result.ast.kind(*property) else {
            panic!("expected a slice");
        };
        assert_eq!((beginning.is_some(), finish.is_some()), (has_begin, has_end));
    }
}

#[test]
fn test_exponent_after_unary() {
    assert!(error_message("-a ** 2").starts_with("Illegal expression."));
    parse_ok("(-a) ** 2");
}

// ============================================================================
// Collections and cond
// ============================================================================

#[test]
fn test_collection_literals() {
    let result = parse_ok("Set#{1, 2, 3}; Map#{a: 1, [b]: 2}; List#[1]");
    let collections: Vec<_> = body(&result)
        .iter()
        .map(|&id| match result.ast.kind(id) {
            NodeKind::CollectionLiteral { collection, .. } => result.ast.kind(*collection).type_name(),
            other => panic!("expected a collection literal, got {}", other.type_name()),
        })
        .collect();
    assert_eq!(collections, vec!["Array", "Object", "Array"]);
}

#[test]
fn test_collection_hash_must_touch_the_name() {
    for source in ["Set #{1, 2}", "const Map #{a} = m", "cond (x) { Map #{m} => m }"] {
        let message = error_message(source);
        assert!(message.starts_with("Unexpected token"), "{:?}: {}", source, message);
    }
}

#[test]
fn test_mixed_collection_entries() {
    assert_eq!(
        error_message("Set#{a: 1, 2}"),
        "Collection entries must either all have keys or all be bare values"
    );
}

#[test]
fn test_cond_matchers() {
    let result = parse_ok("cond (x) { 1 => a; y => b; [h, t] => h; {k: v} => v; Map#{m} => m }");
    let NodeKind::Cond { items, .. } = result.ast.kind(single(&result)) else {
        panic!("expected cond");
    };
    let matchers: Vec<_> = items
        .iter()
        .map(|&item| match result.ast.kind(item) {
            NodeKind::CondItem { matcher, .. } => result.ast.kind(*matcher).type_name(),
            other => panic!("expected a cond item, got {}", other.type_name()),
        })
        .collect();
    assert_eq!(
        matchers,
        vec!["ExpressionMatcher", "VariableMatcher", "ArrayMatcher", "ObjectMatcher", "CollectionMatcher"]
    );
}

// ============================================================================
// Functions and block arguments
// ============================================================================

#[test]
fn test_curried_function_and_thin_arrow() {
    let result = parse_ok("function % add(a, b) { a + b }\nconst f = x -> x");
    let items = body(&result);
    assert!(matches!(result.ast.kind(items[0]), NodeKind::Function { curried: true, declares: true, .. }));
    let NodeKind::VariableDeclaration { declarations, .. } = result.ast.kind(items[1]) else {
        panic!("expected a declaration");
    };
    let NodeKind::VariableDeclarator { init: Some(init), .. } = result.ast.kind(declarations[0]) else {
        panic!("expected an initializer");
    };
    assert!(matches!(result.ast.kind(*init), NodeKind::ArrowFunction { thin: true, .. }));
}

#[test]
fn test_block_arguments() {
    let result = parse_ok("f(1) { x }\ng() do (a, b) { a }");
    let items = body(&result);
    let NodeKind::CallExpression { block_param: Some(block), .. } = result.ast.kind(items[0]) else {
        panic!("expected a call with a block");
    };
    assert!(matches!(result.ast.kind(*block), NodeKind::BlockParam { is_do: false, .. }));
    let NodeKind::CallExpression { block_param: Some(block), .. } = result.ast.kind(items[1]) else {
        panic!("expected a call with a do block");
    };
    assert!(matches!(result.ast.kind(*block), NodeKind::BlockParam { is_do: true, params, .. } if params.len() == 2));
}

#[test]
fn test_block_argument_needs_same_line() {
    let result = parse_ok("f()\n{ x }");
    assert_eq!(body(&result).len(), 2);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_optional_chain_errors() {
    assert_eq!(error_message("a?.b`t`"), "Tagged Template Literals are not allowed in optionalChain");
    assert_eq!(error_message("new a?.b()"), "constructors in/after an Optional Chain are not allowed");
}

#[test]
fn test_return_outside_function() {
    assert_eq!(error_message("return 1"), "'return' outside of function");
    let options = Options { allow_return_outside_function: true, ..Options::default() };
    assert!(parse("return 1", &options).is_ok());
}

#[test]
fn test_throw_requires_argument_on_same_line() {
    assert_eq!(error_message("throw\n1"), "Illegal newline after throw");
    assert_eq!(error_message("throw;"), "Throw requires argument");
}

#[test]
fn test_error_location() {
    let err = parse("let a =\n  ;", &Options::default()).unwrap_err();
    assert_eq!(err.message, "Unexpected token");
    assert_eq!(err.pos, 10);
    assert_eq!((err.loc.line, err.loc.column), (2, 2));
    assert_eq!(err.found, Some(';'));
}

#[test]
fn test_unterminated_input_is_unexpected_eof() {
    let err = parse("f(", &Options::default()).unwrap_err();
    assert!(err.is_unexpected_eof());
}

// ============================================================================
// Comments, templates and options
// ============================================================================

#[test]
fn test_same_line_comment_trails_statement() {
    let result = parse_ok("a = 1; // c\nb");
    let items = body(&result);
    let trailing = &result.ast[items[0]].comments.trailing;
    assert_eq!(trailing.len(), 1);
    assert_eq!(result.ast.comments[trailing[0] as usize].value, " c");
    assert!(result.ast[items[1]].comments.is_empty());
}

#[test]
fn test_leading_comment() {
    let result = parse_ok("// hi\nfoo()");
    let leading = &result.ast[single(&result)].comments.leading;
    assert_eq!(leading.len(), 1);
    assert_eq!(result.ast.comments[leading[0] as usize].value, " hi");
}

#[test]
fn test_template_literal() {
    let result = parse_ok("`a${b}c`");
    let NodeKind::TemplateLiteral { quasis, expressions } = result.ast.kind(single(&result)) else {
        panic!("expected a template");
    };
    assert_eq!((quasis.len(), expressions.len()), (2, 1));
    assert!(matches!(result.ast.kind(quasis[1]), NodeKind::TemplateElement { tail: true, .. }));
}

#[test]
fn test_ranges_and_tokens_options() {
    let options = Options { ranges: true, tokens: true, ..Options::default() };
    let result = parse("a + b", &options).unwrap();
    let item = single(&result);
    assert_eq!(result.ast[item].range, Some([0, 5]));
    assert_eq!(result.tokens.len(), 3);
}

#[test]
fn test_module_features() {
    assert!(parse("import.meta", &Options::module()).is_ok());
    assert_eq!(
        error_message("import.meta"),
        "import.meta may appear only with 'sourceType: \"module\"'"
    );
    assert!(parse("export { a as b } from 'c'", &Options::module()).is_ok());
}
