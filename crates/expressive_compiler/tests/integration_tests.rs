//! Compiler integration tests.
//!
//! End-to-end tests for the pipeline: parse -> transform -> JSON.

use expressive_compiler::{compile, CompileError, Options, Output};
use serde_json::Value;

/// Helper: compile a script and panic on error.
fn compile_ok(source: &str) -> Output {
    match compile(source, &Options::default()) {
        Ok(output) => output,
        Err(err) => panic!("failed to compile {:?}: {}", source, err),
    }
}

/// Helper: the JSON of the top-level statements.
fn statements(output: &Output) -> Vec<Value> {
    let json = output.to_json();
    match json.pointer("/program/body") {
        Some(Value::Array(body)) => body.clone(),
        other => panic!("expected a program body, got {:?}", other),
    }
}

/// Helper: the expression of the only top-level statement.
fn single_expression(output: &Output) -> Value {
    let body = statements(output);
    assert_eq!(body.len(), 1, "expected one statement");
    assert_eq!(body[0]["type"], "ExpressionStatement");
    body[0]["expression"].clone()
}

fn types(values: &Value) -> Vec<String> {
    values.as_array().map_or_else(Vec::new, |items| {
        items.iter().map(|item| item["type"].as_str().unwrap_or_default().to_string()).collect()
    })
}

/// Helper: every `type` reachable from `value`.
fn collect_types(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(ty)) = map.get("type") {
                out.push(ty.clone());
            }
            for (key, child) in map {
                if key != "comments" && key != "leadingComments" && key != "trailingComments" {
                    collect_types(child, out);
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_types(item, out)),
        _ => {}
    }
}

// ============================================================================
// Lowering
// ============================================================================

#[test]
fn test_compile_empty_file() {
    let output = compile_ok("");
    assert!(statements(&output).is_empty());
    assert!(output.polyfill_text.is_empty());
}

#[test]
fn test_only_standard_kinds_reach_the_emitter() {
    let source = r#"
        const s = Set#{1, 2} |> normalize
        const v = cond (s) { Set#[a, b] => a; x => x }
        const w = if (v) 1 else 2
        const h = x -> x?.y(1)
        const log = console::log
        function % both(a, b) { [a, b][0:1] }
    "#;
    let output = compile_ok(source);
    let mut seen = Vec::new();
    collect_types(&output.to_json(), &mut seen);
    let extended = [
        "If", "Block", "SingleExpression", "Cond", "CondItem", "CollectionLiteral", "CollectionPattern",
        "BindExpression", "OptionalMemberExpression", "OptionalCallExpression", "SliceMember", "ArrowFunction",
        "Function", "Class", "Object", "Array", "BlockParam",
    ];
    for kind in extended {
        assert!(!seen.iter().any(|ty| ty == kind), "{} survived lowering", kind);
    }
    assert!(output.ast.find_non_standard(output.root).is_none());
}

#[test]
fn test_pipeline_calls_the_right_hand_side() {
    let call = single_expression(&compile_ok("value |> transform"));
    assert_eq!(call["type"], "CallExpression");
    assert_eq!(call["callee"]["name"], "transform");
    assert_eq!(types(&call["arguments"]), vec!["Identifier"]);
    assert_eq!(call["arguments"][0]["name"], "value");
}

#[test]
fn test_collection_literal_calls_from() {
    let call = single_expression(&compile_ok("Set#{1, 2, 3}"));
    assert_eq!(call["callee"]["object"]["name"], "Set");
    assert_eq!(call["callee"]["property"]["name"], "from");
    let elements: Vec<_> = call["arguments"][0]["elements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|element| element["value"].as_f64().unwrap())
        .collect();
    assert_eq!(elements, vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_cond_arms_keep_source_order() {
    let output = compile_ok("cond (x) { 1 => 'first'; n => 'second' }");
    let call = single_expression(&output);
    assert_eq!(call["callee"]["name"], "cond__");
    let arms = call["arguments"][1]["elements"].as_array().unwrap();
    assert_eq!(arms.len(), 2);
    let bodies: Vec<_> = arms
        .iter()
        .map(|arm| arm["elements"][1]["body"]["body"][0]["argument"]["value"].clone())
        .collect();
    assert_eq!(bodies, vec![Value::from("first"), Value::from("second")]);
    assert_eq!(arms[0]["elements"][0]["type"], "ArrowFunctionExpression");
    assert!(output.polyfill_text.starts_with("const __not__found={};"));
}

#[test]
fn test_curry_helper_is_emitted_once() {
    let output = compile_ok("function % add(a, b) { a + b }\nconst mul = (a, b) => % a * b");
    assert_eq!(output.polyfills, vec!["curry"]);
    assert_eq!(output.polyfill_text.matches("_kn=").count(), 1);
}

#[test]
fn test_comments_reach_the_json() {
    let output = compile_ok("a = 1; // one\nb = 2");
    let body = statements(&output);
    let trailing = &body[0]["expression"]["trailingComments"];
    assert_eq!(trailing[0]["value"], " one");
    assert!(body[1].get("leadingComments").is_none());
    assert!(body[1]["expression"].get("leadingComments").is_none());
    assert_eq!(output.to_json()["comments"].as_array().map(Vec::len), Some(1));
}

// ============================================================================
// Parser properties seen through the pipeline
// ============================================================================

#[test]
fn test_optional_chain_is_lowered_link_by_link() {
    let call = single_expression(&compile_ok("a?.b.c"));
    assert_eq!(call["callee"]["name"], "opt__prop__");
    assert_eq!(call["arguments"][0]["callee"]["name"], "opt__prop__");
}

#[test]
fn test_return_before_newline_has_no_argument() {
    let output = compile_ok("function f() { return\n5 }");
    let body = &statements(&output)[0]["body"]["body"];
    assert_eq!(types(body), vec!["ReturnStatement", "ReturnStatement"]);
    assert_eq!(body[0]["argument"], Value::Null);
    assert_eq!(body[1]["argument"]["value"], 5.0);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unterminated_template_points_at_backquote() {
    let err = compile("let s = `abc", &Options::default()).unwrap_err();
    let CompileError::Syntax(syntax) = &err else {
        panic!("expected a syntax error, got {:?}", err);
    };
    assert_eq!(syntax.message, "Unterminated template");
    assert_eq!(syntax.pos, 8);
    assert!(err.is_unexpected_eof());
}

#[test]
fn test_syntax_error_is_not_incomplete() {
    let err = compile("a b", &Options::default()).unwrap_err();
    assert!(matches!(err, CompileError::Syntax(_)));
    assert!(!err.is_unexpected_eof());
    assert_eq!(err.to_string(), "Unexpected token, expected \";\" at 'b' (1:2)");
}

#[test]
fn test_options_from_json() {
    let options = Options::from_json(r#"{ "sourceType": "module" }"#).unwrap();
    let output = compile("export const a = 1", &options).unwrap();
    assert_eq!(output.to_json()["program"]["sourceType"], "module");
}
