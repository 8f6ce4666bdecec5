//! Transformer integration tests.
//!
//! Sources are parsed with the real parser, lowered, and printed back with a
//! small test-only printer so expectations read like code.

use expressive_ast::json::to_json;
use expressive_ast::{Ast, Node, NodeId, NodeKind};
use expressive_core::text::SourceLocation;
use expressive_core::StringInterner;
use expressive_parser::{parse, Options};
use expressive_transformer::{transform, TransformError, Transformed, Transformer};

/// Helper: parse and lower a script, panicking on error.
fn lower(source: &str) -> Transformed {
    let parsed = match parse(source, &Options::default()) {
        Ok(result) => result,
        Err(err) => panic!("failed to parse {:?}: {}", source, err),
    };
    match transform(&parsed.ast, parsed.root) {
        Ok(out) => out,
        Err(err) => panic!("failed to transform {:?}: {}", source, err),
    }
}

/// Helper: the lowered program printed on one line.
fn render(source: &str) -> String {
    let out = lower(source);
    Printer { ast: &out.ast }.node(out.root)
}

// ============================================================================
// Test printer
// ============================================================================

struct Printer<'a> {
    ast: &'a Ast,
}

impl Printer<'_> {
    fn list(&self, ids: &[NodeId], sep: &str) -> String {
        ids.iter().map(|&id| self.node(id)).collect::<Vec<_>>().join(sep)
    }

    fn holes(&self, ids: &[Option<NodeId>]) -> String {
        ids.iter().map(|id| id.map_or(String::new(), |id| self.node(id))).collect::<Vec<_>>().join(", ")
    }

    fn callee(&self, id: NodeId) -> String {
        match self.ast.kind(id) {
            NodeKind::ArrowFunctionExpression { .. }
            | NodeKind::FunctionExpression { .. }
            | NodeKind::ConditionalExpression { .. } => format!("({})", self.node(id)),
            _ => self.node(id),
        }
    }

    fn function(&self, id: &Option<NodeId>, params: &[NodeId], body: NodeId) -> String {
        let name = id.map_or(String::new(), |id| format!(" {}", self.node(id)));
        format!("function{}({}) {}", name, self.list(params, ", "), self.node(body))
    }

    fn node(&self, id: NodeId) -> String {
        use NodeKind::*;
        match self.ast.kind(id) {
            File { program } => self.node(*program),
            Program { body, .. } => self.list(body, " "),
            ExpressionStatement { expression } => format!("{};", self.node(*expression)),
            BlockStatement { body } if body.is_empty() => "{}".to_string(),
            BlockStatement { body } => format!("{{ {} }}", self.list(body, " ")),
            ReturnStatement { argument: Some(argument) } => format!("return {};", self.node(*argument)),
            ReturnStatement { argument: None } => "return;".to_string(),
            ThrowStatement { argument } => format!("throw {};", self.node(*argument)),
            BreakStatement => "break;".to_string(),
            ContinueStatement => "continue;".to_string(),
            IfStatement { test, consequent, alternate } => {
                let alternate = alternate.map_or(String::new(), |alt| format!(" else {}", self.node(alt)));
                format!("if ({}) {}{}", self.node(*test), self.node(*consequent), alternate)
            }
            WhileStatement { test, body } => format!("while ({}) {}", self.node(*test), self.node(*body)),
            ForOfStatement { left, right, body, .. } => {
                let left = self.node(*left);
                format!("for ({} of {}) {}", left.trim_end_matches(';'), self.node(*right), self.node(*body))
            }
            SwitchStatement { discriminant, cases } => {
                format!("switch ({}) {{ {} }}", self.node(*discriminant), self.list(cases, " "))
            }
            SwitchCase { test, consequent } => {
                let label = test.map_or("default:".to_string(), |test| format!("case {}:", self.node(test)));
                format!("{} {}", label, self.list(consequent, " "))
            }
            TryStatement { block, handler, .. } => {
                let handler = handler.map_or(String::new(), |h| format!(" {}", self.node(h)));
                format!("try {}{}", self.node(*block), handler)
            }
            CatchClause { param, body } => {
                let param = param.map_or(String::new(), |p| format!("({}) ", self.node(p)));
                format!("catch {}{}", param, self.node(*body))
            }
            VariableDeclaration { kind, declarations } => {
                format!("{} {};", kind.as_str(), self.list(declarations, ", "))
            }
            VariableDeclarator { id, init: Some(init) } => format!("{} = {}", self.node(*id), self.node(*init)),
            VariableDeclarator { id, init: None } => self.node(*id),
            FunctionDeclaration { id, params, body, .. } => self.function(&Some(*id), params, *body),
            FunctionExpression { id, params, body, .. } => self.function(id, params, *body),
            ArrowFunctionExpression { params, body, .. } => {
                format!("({}) => {}", self.list(params, ", "), self.node(*body))
            }
            Identifier { name } => self.ast.name(*name).to_string(),
            NullLiteral => "null".to_string(),
            BooleanLiteral { value } => value.to_string(),
            NumericLiteral { value } => value.to_string(),
            StringLiteral { value } => format!("'{}'", value),
            ArrayExpression { elements } => format!("[{}]", self.holes(elements)),
            ObjectExpression { properties } | ObjectPattern { properties } => {
                format!("{{{}}}", self.list(properties, ", "))
            }
            ObjectProperty { key, shorthand: true, .. } => self.node(*key),
            ObjectProperty { key, value, computed, .. } => {
                let key = if *computed { format!("[{}]", self.node(*key)) } else { self.node(*key) };
                format!("{}: {}", key, self.node(*value))
            }
            MemberExpression { object, property, computed: false } => {
                format!("{}.{}", self.callee(*object), self.node(*property))
            }
            MemberExpression { object, property, computed: true } => {
                format!("{}[{}]", self.callee(*object), self.node(*property))
            }
            CallExpression { callee, arguments, .. } => {
                format!("{}({})", self.callee(*callee), self.list(arguments, ", "))
            }
            ConditionalExpression { test, consequent, alternate } => {
                format!("{} ? {} : {}", self.node(*test), self.node(*consequent), self.node(*alternate))
            }
            BinaryExpression { operator, left, right } => {
                format!("{} {} {}", self.node(*left), operator.as_str(), self.node(*right))
            }
            LogicalExpression { operator, left, right } => {
                format!("{} {} {}", self.node(*left), operator.as_str(), self.node(*right))
            }
            AssignmentExpression { operator, left, right } => {
                format!("{} {} {}", self.node(*left), operator.as_str(), self.node(*right))
            }
            UpdateExpression { operator, prefix: false, argument } => {
                format!("{}{}", self.node(*argument), operator.as_str())
            }
            other => other.type_name().to_string(),
        }
    }
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_pipeline_becomes_nested_calls() {
    assert_eq!(render("x |> f |> g"), "g(f(x));");
}

#[test]
fn test_power_operators_become_exponent() {
    assert_eq!(render("a ^ 2; b ^= 3"), "a ** 2; b **= 3;");
}

#[test]
fn test_bind_expressions() {
    assert_eq!(render("a::b.c; ::a.b"), "b.c.bind(a); a.b.bind(a);");
}

#[test]
fn test_slices() {
    assert_eq!(
        render("a[1:]; a[:2]; a[:]; a[1:2]"),
        "a.slice(1); a.slice(0, 2); a.slice(); a.slice(1, 2);"
    );
}

#[test]
fn test_optional_chains_use_helpers() {
    assert_eq!(render("a?.b"), "opt__prop__(a, () => 'b');");
    assert_eq!(render("a?.(1)"), "opt__call__(a, () => [1]);");

    let out = lower("a?.b(1)");
    assert_eq!(out.polyfills, vec!["optionalMethod"]);
    assert_eq!(
        Printer { ast: &out.ast }.node(out.root),
        "opt__method__(a, () => 'b', () => [1]);"
    );
}

// ============================================================================
// Collections
// ============================================================================

#[test]
fn test_collection_literals_call_from() {
    assert_eq!(render("Set#{1, 2, 3}"), "Set.from([1, 2, 3]);");
    assert_eq!(render("Map#{a: 1}"), "Map.from({a: 1});");
}

#[test]
fn test_collection_pattern_declaration() {
    assert_eq!(render("const Map#{a} = m"), "const {a} = Map.toJS(m);");
}

#[test]
fn test_collection_pattern_outside_target_is_an_error() {
    let interner = StringInterner::new();
    let mut ast = Ast::new(interner.clone());
    let add = |ast: &mut Ast, kind: NodeKind, start: u32| ast.add(Node::new(kind, start, start + 1, SourceLocation::default()));
    let ctor = add(&mut ast, NodeKind::Identifier { name: interner.intern("Set") }, 0);
    let inner = add(&mut ast, NodeKind::ArrayPattern { elements: Vec::new() }, 4);
    let pattern = add(&mut ast, NodeKind::CollectionPattern { destructurer: ctor, pattern: inner }, 0);
    let array = add(&mut ast, NodeKind::ArrayExpression { elements: vec![Some(pattern)] }, 0);

    let err = transform(&ast, array).unwrap_err();
    assert_eq!(err, TransformError::CollectionPatternPosition { pos: 0 });
}

// ============================================================================
// Control forms
// ============================================================================

#[test]
fn test_statement_if_stays_a_statement() {
    assert_eq!(render("if (a) b else c"), "if (a) { b; } else { c; }");
}

#[test]
fn test_expression_if_calls_a_chosen_thunk() {
    assert_eq!(
        render("x = if (a) b else c"),
        "x = (a ? () => { return b; } : () => { return c; })();"
    );
    assert_eq!(
        render("x = if (a) b"),
        "x = (a ? () => { return b; } : () => { return undefined; })();"
    );
}

#[test]
fn test_expression_while_uses_helper() {
    let out = lower("x = while (i < 3) i++");
    assert_eq!(out.polyfills, vec!["while"]);
    assert_eq!(
        Printer { ast: &out.ast }.node(out.root),
        "x = while__(() => i < 3, () => { return i++; });"
    );
}

#[test]
fn test_statement_switch_breaks_unless_continued() {
    assert_eq!(
        render("switch (a) { case (1) b; case (2) { c; continue } default d }"),
        "switch (a) { case 1: b; break; case 2: c; default: d; break; }"
    );
}

#[test]
fn test_expression_switch_uses_helper() {
    assert_eq!(
        render("x = switch (a) { case (1) { b; continue } default 'other' }"),
        "x = switch__(a, [[1, () => { return [b, cont__inue__]; }], \
         [def__ault__, () => { return ['other', undefined]; }]]);"
    );
}

#[test]
fn test_switch_case_without_a_value_still_returns_a_pair() {
    assert_eq!(
        render("x = switch (a) { case (1) { let y = 2 } default 3 }"),
        "x = switch__(a, [[1, () => { let y = 2; return [undefined, undefined]; }], \
         [def__ault__, () => { return [3, undefined]; }]]);"
    );
    assert_eq!(
        render("x = switch (a) { case (1) { let y = 2; continue } default 3 }"),
        "x = switch__(a, [[1, () => { let y = 2; return [undefined, cont__inue__]; }], \
         [def__ault__, () => { return [3, undefined]; }]]);"
    );
}

#[test]
fn test_switch_case_if_without_else_falls_back_to_undefined() {
    assert_eq!(
        render("x = switch (a) { case (1) { if (b) 5 } default 3 }"),
        "x = switch__(a, [[1, () => { if (b) { return [5, undefined]; } return [undefined, undefined]; }], \
         [def__ault__, () => { return [3, undefined]; }]]);"
    );
}

#[test]
fn test_switch_case_ending_in_every_branch_gets_no_fallback() {
    assert_eq!(
        render("x = switch (a) { case (1) { if (b) 5 else 6 } default 3 }"),
        "x = switch__(a, [[1, () => { if (b) { return [5, undefined]; } else { return [6, undefined]; } }], \
         [def__ault__, () => { return [3, undefined]; }]]);"
    );
}

#[test]
fn test_switch_default_may_come_first() {
    assert_eq!(
        render("x = switch (a) { default 0; case (1) 1 }"),
        "x = switch__(a, [[def__ault__, () => { return [0, undefined]; }], [1, () => { return [1, undefined]; }]]);"
    );
}

#[test]
fn test_implicit_return_reaches_switch_statement_cases() {
    assert_eq!(
        render("function f(a) { switch (a) { case (1) 'one'; default { 'other'; continue } } }"),
        "function f(a) { switch (a) { case 1: return 'one'; break; default: return 'other'; } }"
    );
}

#[test]
fn test_expression_try_is_invoked_in_place() {
    assert_eq!(
        render("x = try { a() } catch (e) { b }"),
        "x = (() => { try { return a(); } catch (e) { return b; } })();"
    );
}

// ============================================================================
// cond
// ============================================================================

#[test]
fn test_cond_keeps_arm_order() {
    let out = lower("cond (x) { 1 => 'one'; [h, t] => h; y => y }");
    assert_eq!(out.polyfills, vec!["cond", "matchArray"]);
    assert_eq!(
        Printer { ast: &out.ast }.node(out.root),
        "cond__(x, [\
         [(_m) => 1 === _m ? [] : __not__found, () => { return 'one'; }], \
         [(_m) => match__array__(_m, [(_m) => [_m], (_m) => [_m]]), (h, t) => { return h; }], \
         [(_m) => [_m], (y) => { return y; }]]);"
    );
}

#[test]
fn test_cond_object_matcher_binds_keys() {
    assert_eq!(
        render("cond (o) { {k: v, w} => v }"),
        "cond__(o, [[(_m) => match__object__(_m, [['k', (_m) => [_m]], ['w', null]]), (v, w) => { return v; }]]);"
    );
}

#[test]
fn test_cond_collection_matcher_checks_constructor() {
    let out = lower("cond (m) { Map#{a} => a }");
    assert_eq!(out.polyfills, vec!["cond", "constructor", "matchObject"]);
    assert_eq!(
        Printer { ast: &out.ast }.node(out.root),
        "cond__(m, [[(_m) => constructor__(_m, Map) ? \
         ((_m) => match__object__(_m, [['a', null]]))(Map.toJS(_m)) : __not__found, \
         (a) => { return a; }]]);"
    );
}

#[test]
fn test_cond_arms_do_not_share_bindings() {
    let out = lower("cond (x) { [a] => a; b => b }");
    let printed = Printer { ast: &out.ast }.node(out.root);
    assert!(printed.contains("(a) => { return a; }"), "{}", printed);
    assert!(printed.contains("(b) => { return b; }"), "{}", printed);
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_implicit_return_follows_branches() {
    assert_eq!(
        render("function f(a) { if (a) { 1 } else { 2 } }"),
        "function f(a) { if (a) { return 1; } else { return 2; } }"
    );
}

#[test]
fn test_arrow_functions() {
    assert_eq!(render("const g = x => x * 2"), "const g = (x) => { return x * 2; };");
    assert_eq!(render("const h = x -> x"), "const h = function(x) { return x; };");
}

#[test]
fn test_curried_functions_share_one_helper() {
    let out = lower("function % add(a, b) { a + b }\nfunction % mul(a, b) { a * b }");
    assert_eq!(out.polyfills, vec!["curry"]);
    assert_eq!(out.polyfill_text.matches("let _kn=").count(), 1);
    assert_eq!(
        Printer { ast: &out.ast }.node(out.root),
        "var add = _kn(function add(a, b) { return a + b; }, 2); \
         var mul = _kn(function mul(a, b) { return a * b; }, 2);"
    );
}

#[test]
fn test_block_arguments_become_trailing_functions() {
    assert_eq!(render("f(1) { x }"), "f(1, function() { x; });");
    assert_eq!(render("g() do (a, b) { a }"), "g(function(a, b) { a; });");
}

// ============================================================================
// Runtime helpers
// ============================================================================

#[test]
fn test_cond_helper_stops_at_the_first_matching_arm() {
    let out = lower("cond (x) { 1 => 'one'; n => 'any' }");
    assert!(
        out.polyfill_text.contains("for(v of b){r=v[0](a);if(r!==__not__found)return v[1](...r);}"),
        "{}",
        out.polyfill_text
    );
}

#[test]
fn test_switch_helper_falls_through_and_defaults() {
    let out = lower("x = switch (a) { case (1) { 1; continue } default 2 }");
    assert_eq!(out.polyfills, vec!["switch"]);
    let text = &out.polyfill_text;
    // Matching case first, then the default case when nothing matched.
    assert!(text.contains("if(b[i][0]!==def__ault__&&b[i][0]===a)break;"), "{}", text);
    assert!(text.contains("if(i===b.length)for(i=0;i<b.length;i++)if(b[i][0]===def__ault__)break;"), "{}", text);
    // A case marked `cont__inue__` runs on into the next one.
    assert!(text.contains("for(;i<b.length;i++){r=b[i][1]();if(r[1]!==cont__inue__)return r[0];}"), "{}", text);
}

#[test]
fn test_curry_helper_waits_for_all_arguments() {
    let out = lower("const add = (a, b) => % a + b");
    assert_eq!(
        Printer { ast: &out.ast }.node(out.root),
        "const add = _kn((a, b) => { return a + b; }, 2);"
    );
    assert!(out.polyfill_text.contains(".length>=n?f(...s.slice(0,n)):m(s)"), "{}", out.polyfill_text);
}

#[test]
fn test_optional_call_helper_returns_non_functions() {
    let out = lower("a?.(1)");
    assert_eq!(
        out.polyfill_text,
        "function opt__call__(a,b){if(typeof a===\"function\")return a(...b());return a;}"
    );
}

// ============================================================================
// Whole-tree properties
// ============================================================================

const MIXED: &str = r#"
// header
const users = Map#{ alice: Set#{'admin'} }
function % scale(factor, value) { value * factor }
const total = numbers |> sum |> scale(2)
const first = list[0:1]
const label = cond (users) {
  Map#{ alice } => alice;
  [x, y] => x + y;
  _ => 'none'
}
const kind = switch (total) { case (1) 'one'; default 'many' }
let i = 0
const last = while (i < 3) i++
data?.items?.map(x -> x.id)
list.forEach() do (item) { console::log(item) }
"#;

#[test]
fn test_no_extended_kinds_survive() {
    let out = lower(MIXED);
    assert_eq!(out.ast.find_non_standard(out.root), None);
}

#[test]
fn test_transform_is_idempotent_on_lowered_trees() {
    let once = lower(MIXED);
    let twice = transform(&once.ast, once.root).unwrap();
    assert_eq!(to_json(&twice.ast, twice.root), to_json(&once.ast, once.root));
    assert!(twice.polyfills.is_empty());
}

#[test]
fn test_comments_follow_lowered_nodes() {
    let out = lower("// lead\nx |> f");
    let mut leading = 0;
    out.ast.walk(out.root, &mut |_, node: &Node| leading += node.comments.leading.len());
    assert_eq!(leading, 1);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_bind_without_member_is_malformed() {
    let interner = StringInterner::new();
    let mut ast = Ast::new(interner.clone());
    let callee = ast.add(Node::new(NodeKind::Identifier { name: interner.intern("f") }, 2, 3, SourceLocation::default()));
    let bind = ast.add(Node::new(NodeKind::BindExpression { object: None, callee }, 0, 3, SourceLocation::default()));

    assert_eq!(transform(&ast, bind).unwrap_err(), TransformError::MalformedBind { pos: 0 });
}

#[test]
fn test_use_polyfill_validates_name_and_arity() {
    let ast = Ast::new(StringInterner::new());
    let mut transformer = Transformer::new(&ast);
    assert_eq!(
        transformer.use_polyfill("typeof", Vec::new()).unwrap_err(),
        TransformError::UnknownPolyfill("typeof".to_string())
    );
    assert_eq!(
        transformer.use_polyfill("curry", Vec::new()).unwrap_err(),
        TransformError::PolyfillArguments { name: "curry", expected: 2, found: 0 }
    );
}
