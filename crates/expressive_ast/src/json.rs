//! ESTree-shaped JSON output.
//!
//! The lowered tree is handed to an external code emitter as JSON. Each node
//! becomes an object with `type`, `start`, `end`, `loc`, its kind-specific
//! fields and any attached comments.

use crate::arena::Ast;
use crate::kind::NodeKind;
use crate::node::{CommentId, NodeId};
use serde_json::{json, Map, Value};

/// Serialize the tree rooted at `root`.
pub fn to_json(ast: &Ast, root: NodeId) -> Value {
    JsonWriter { ast }.node(root)
}

/// Serialize every comment of the tree, in source order.
pub fn comments_to_json(ast: &Ast) -> Value {
    let writer = JsonWriter { ast };
    Value::Array((0..ast.comments.len() as CommentId).map(|id| writer.comment(id)).collect())
}

struct JsonWriter<'a> {
    ast: &'a Ast,
}

impl<'a> JsonWriter<'a> {
    fn node(&self, id: NodeId) -> Value {
        let node = &self.ast[id];
        let mut map = Map::new();
        map.insert("type".into(), Value::from(node.kind.type_name()));
        map.insert("start".into(), Value::from(node.start));
        map.insert("end".into(), Value::from(node.end));
        map.insert("loc".into(), json!(node.loc));
        if let Some(range) = node.range {
            map.insert("range".into(), json!(range));
        }
        self.fields(&node.kind, &mut map);

        if !node.extra.is_empty() {
            let mut extra = Map::new();
            if let Some(raw) = &node.extra.raw {
                extra.insert("raw".into(), Value::from(raw.as_str()));
            }
            if node.extra.is_parenthesized() {
                extra.insert("parenthesized".into(), Value::Bool(true));
            }
            if let Some(paren_start) = node.extra.paren_start {
                extra.insert("parenStart".into(), Value::from(paren_start));
            }
            map.insert("extra".into(), Value::Object(extra));
        }

        let comments = &node.comments;
        for (key, list) in [
            ("leadingComments", &comments.leading),
            ("trailingComments", &comments.trailing),
            ("innerComments", &comments.inner),
        ] {
            if !list.is_empty() {
                map.insert(key.into(), Value::Array(list.iter().map(|c| self.comment(*c)).collect()));
            }
        }
        Value::Object(map)
    }

    fn comment(&self, id: CommentId) -> Value {
        let comment = &self.ast.comments[id as usize];
        json!({
            "type": comment.type_name(),
            "value": comment.value,
            "start": comment.start,
            "end": comment.end,
            "loc": comment.loc,
        })
    }

    fn opt(&self, id: &Option<NodeId>) -> Value {
        id.map_or(Value::Null, |id| self.node(id))
    }

    fn list(&self, ids: &[NodeId]) -> Value {
        Value::Array(ids.iter().map(|id| self.node(*id)).collect())
    }

    fn holes(&self, ids: &[Option<NodeId>]) -> Value {
        Value::Array(ids.iter().map(|id| self.opt(id)).collect())
    }

    fn fields(&self, kind: &NodeKind, map: &mut Map<String, Value>) {
        use NodeKind::*;
        let mut put = |key: &str, value: Value| {
            map.insert(key.to_string(), value);
        };
        match kind {
            File { program } => {
                put("program", self.node(*program));
                put("comments", comments_to_json(self.ast));
            }
            Program { body, source_type } => {
                put("sourceType", json!(source_type));
                put("body", self.list(body));
            }
            Block { body } | BlockStatement { body } | ClassBody { body } => put("body", self.list(body)),
            SingleExpression { expression } | ExpressionStatement { expression }
            | ExpressionMatcher { expression } => put("expression", self.node(*expression)),
            If { test, consequent, alternate, .. } | IfStatement { test, consequent, alternate } => {
                put("test", self.node(*test));
                put("consequent", self.node(*consequent));
                put("alternate", self.opt(alternate));
            }
            While { test, body, .. } | WhileStatement { test, body }
            | DoWhile { body, test, .. } | DoWhileStatement { body, test } => {
                put("test", self.node(*test));
                put("body", self.node(*body));
            }
            For { init, test, update, body, .. } | ForStatement { init, test, update, body } => {
                put("init", self.opt(init));
                put("test", self.opt(test));
                put("update", self.opt(update));
                put("body", self.node(*body));
            }
            ForOf { left, right, body, is_await, .. } | ForOfStatement { left, right, body, is_await } => {
                put("await", Value::Bool(*is_await));
                put("left", self.node(*left));
                put("right", self.node(*right));
                put("body", self.node(*body));
            }
            Switch { discriminant, cases, .. } | SwitchStatement { discriminant, cases } => {
                put("discriminant", self.node(*discriminant));
                put("cases", self.list(cases));
            }
            Case { test, body } => {
                put("test", self.opt(test));
                put("consequent", self.node(*body));
            }
            SwitchCase { test, consequent } => {
                put("test", self.opt(test));
                put("consequent", self.list(consequent));
            }
            Try { block, handler, finalizer, .. } | TryStatement { block, handler, finalizer } => {
                put("block", self.node(*block));
                put("handler", self.opt(handler));
                put("finalizer", self.opt(finalizer));
            }
            CatchClause { param, body } => {
                put("param", self.opt(param));
                put("body", self.node(*body));
            }
            Return { argument } | ReturnStatement { argument } => put("argument", self.opt(argument)),
            Throw { argument } | ThrowStatement { argument } | AwaitExpression { argument }
            | SpreadElement { argument } | RestElement { argument } | ImportCall { argument } => {
                put("argument", self.node(*argument))
            }
            Break | Continue | BreakStatement | ContinueStatement => put("label", Value::Null),
            Debugger | DebuggerStatement | NullLiteral | ThisExpression | Super | Import => {}
            Cond { discriminant, items } => {
                put("discriminant", self.node(*discriminant));
                put("items", self.list(items));
            }
            CondItem { matcher, consequent } => {
                put("matcher", self.node(*matcher));
                put("consequent", self.node(*consequent));
            }
            VariableMatcher { id } => put("id", self.node(*id)),
            CollectionMatcher { id, collection } => {
                put("id", self.node(*id));
                put("collection", self.node(*collection));
            }
            ObjectMatcher { properties } | Object { properties } | ObjectExpression { properties }
            | ObjectPattern { properties } => put("properties", self.list(properties)),
            ObjectMatcherProperty { key, value, computed } => {
                put("key", self.node(*key));
                put("value", self.opt(value));
                put("computed", Value::Bool(*computed));
            }
            ArrayMatcher { elements } => put("elements", self.list(elements)),
            Array { elements } | ArrayExpression { elements } | ArrayPattern { elements } => {
                put("elements", self.holes(elements))
            }
            CollectionLiteral { constructor, collection } => {
                put("constructor", self.node(*constructor));
                put("collection", self.node(*collection));
            }
            CollectionPattern { destructurer, pattern } => {
                put("destructurer", self.node(*destructurer));
                put("pattern", self.node(*pattern));
            }
            BindExpression { object, callee } => {
                put("object", self.opt(object));
                put("callee", self.node(*callee));
            }
            OptionalMemberExpression { object, property, computed, optional } => {
                put("object", self.node(*object));
                put("property", self.node(*property));
                put("computed", Value::Bool(*computed));
                put("optional", Value::Bool(*optional));
            }
            OptionalCallExpression { callee, arguments, optional } => {
                put("callee", self.node(*callee));
                put("arguments", self.list(arguments));
                put("optional", Value::Bool(*optional));
            }
            SliceMember { beginning, finish } => {
                put("beginning", self.opt(beginning));
                put("finish", self.opt(finish));
            }
            BlockParam { params, body, is_do } => {
                put("isDo", Value::Bool(*is_do));
                put("params", self.list(params));
                put("body", self.node(*body));
            }
            ArrowFunction { params, body, is_async, generator, curried, thin } => {
                put("kind", Value::from(if *thin { "thin" } else { "thick" }));
                put("async", Value::Bool(*is_async));
                put("generator", Value::Bool(*generator));
                put("curried", Value::Bool(*curried));
                put("params", self.list(params));
                put("body", self.node(*body));
            }
            Function { id, params, body, generator, is_async, curried, declares } => {
                put("id", self.opt(id));
                put("async", Value::Bool(*is_async));
                put("generator", Value::Bool(*generator));
                put("curried", Value::Bool(*curried));
                put("declares", Value::Bool(*declares));
                put("params", self.list(params));
                put("body", self.node(*body));
            }
            FunctionExpression { id, params, body, generator, is_async } => {
                put("id", self.opt(id));
                put("async", Value::Bool(*is_async));
                put("generator", Value::Bool(*generator));
                put("params", self.list(params));
                put("body", self.node(*body));
            }
            FunctionDeclaration { id, params, body, generator, is_async } => {
                put("id", self.node(*id));
                put("async", Value::Bool(*is_async));
                put("generator", Value::Bool(*generator));
                put("params", self.list(params));
                put("body", self.node(*body));
            }
            ArrowFunctionExpression { params, body, is_async } => {
                put("async", Value::Bool(*is_async));
                put("expression", Value::Bool(!matches!(self.ast.kind(*body), BlockStatement { .. })));
                put("params", self.list(params));
                put("body", self.node(*body));
            }
            Class { id, super_class, body, .. } | ClassExpression { id, super_class, body } => {
                put("id", self.opt(id));
                put("superClass", self.opt(super_class));
                put("body", self.node(*body));
            }
            ClassDeclaration { id, super_class, body } => {
                put("id", self.node(*id));
                put("superClass", self.opt(super_class));
                put("body", self.node(*body));
            }
            VariableDeclaration { kind, declarations } => {
                put("kind", json!(kind));
                put("declarations", self.list(declarations));
            }
            VariableDeclarator { id, init } => {
                put("id", self.node(*id));
                put("init", self.opt(init));
            }
            Identifier { name } => put("name", Value::from(self.ast.name(*name))),
            BooleanLiteral { value } => put("value", Value::Bool(*value)),
            NumericLiteral { value } => put("value", json!(value)),
            BigIntLiteral { value } | StringLiteral { value } => put("value", Value::from(value.as_str())),
            RegExpLiteral { pattern, flags } => {
                put("pattern", Value::from(pattern.as_str()));
                put("flags", Value::from(flags.as_str()));
            }
            TemplateLiteral { quasis, expressions } => {
                put("expressions", self.list(expressions));
                put("quasis", self.list(quasis));
            }
            TemplateElement { raw, cooked, tail } => {
                put("value", json!({ "raw": raw, "cooked": cooked }));
                put("tail", Value::Bool(*tail));
            }
            TaggedTemplateExpression { tag, quasi } => {
                put("tag", self.node(*tag));
                put("quasi", self.node(*quasi));
            }
            MetaProperty { meta, property } => {
                put("meta", self.node(*meta));
                put("property", self.node(*property));
            }
            ObjectProperty { key, value, computed, shorthand } => {
                put("method", Value::Bool(false));
                put("key", self.node(*key));
                put("computed", Value::Bool(*computed));
                put("shorthand", Value::Bool(*shorthand));
                put("value", self.node(*value));
            }
            ObjectMethod { kind, key, params, body, computed, generator, is_async } => {
                put("kind", json!(kind));
                put("key", self.node(*key));
                put("computed", Value::Bool(*computed));
                put("async", Value::Bool(*is_async));
                put("generator", Value::Bool(*generator));
                put("params", self.list(params));
                put("body", self.node(*body));
            }
            ClassMethod { kind, key, params, body, computed, is_static, generator, is_async } => {
                put("kind", json!(kind));
                put("static", Value::Bool(*is_static));
                put("key", self.node(*key));
                put("computed", Value::Bool(*computed));
                put("async", Value::Bool(*is_async));
                put("generator", Value::Bool(*generator));
                put("params", self.list(params));
                put("body", self.node(*body));
            }
            UnaryExpression { operator, argument } => {
                put("operator", json!(operator));
                put("prefix", Value::Bool(true));
                put("argument", self.node(*argument));
            }
            UpdateExpression { operator, prefix, argument } => {
                put("operator", json!(operator));
                put("prefix", Value::Bool(*prefix));
                put("argument", self.node(*argument));
            }
            BinaryExpression { operator, left, right } => {
                put("operator", json!(operator));
                put("left", self.node(*left));
                put("right", self.node(*right));
            }
            LogicalExpression { operator, left, right } => {
                put("operator", json!(operator));
                put("left", self.node(*left));
                put("right", self.node(*right));
            }
            AssignmentExpression { operator, left, right } => {
                put("operator", json!(operator));
                put("left", self.node(*left));
                put("right", self.node(*right));
            }
            AssignmentPattern { left, right } => {
                put("left", self.node(*left));
                put("right", self.node(*right));
            }
            ConditionalExpression { test, consequent, alternate } => {
                put("test", self.node(*test));
                put("consequent", self.node(*consequent));
                put("alternate", self.node(*alternate));
            }
            CallExpression { callee, arguments, block_param } => {
                put("callee", self.node(*callee));
                put("arguments", self.list(arguments));
                if block_param.is_some() {
                    put("blockParam", self.opt(block_param));
                }
            }
            NewExpression { callee, arguments } => {
                put("callee", self.node(*callee));
                put("arguments", self.list(arguments));
            }
            MemberExpression { object, property, computed } => {
                put("object", self.node(*object));
                put("property", self.node(*property));
                put("computed", Value::Bool(*computed));
            }
            SequenceExpression { expressions } => put("expressions", self.list(expressions)),
            YieldExpression { argument, delegate } => {
                put("delegate", Value::Bool(*delegate));
                put("argument", self.opt(argument));
            }
            ImportDeclaration { specifiers, source } => {
                put("specifiers", self.list(specifiers));
                put("source", self.node(*source));
            }
            ImportSpecifier { imported, local } => {
                put("imported", self.node(*imported));
                put("local", self.node(*local));
            }
            ImportDefaultSpecifier { local } | ImportNamespaceSpecifier { local } => {
                put("local", self.node(*local))
            }
            ExportNamedDeclaration { declaration, specifiers, source } => {
                put("declaration", self.opt(declaration));
                put("specifiers", self.list(specifiers));
                put("source", self.opt(source));
            }
            ExportDefaultDeclaration { declaration } => put("declaration", self.node(*declaration)),
            ExportAllDeclaration { source } => put("source", self.node(*source)),
            ExportSpecifier { local, exported } => {
                put("local", self.node(*local));
                put("exported", self.node(*exported));
            }
            ExportDefaultSpecifier { exported } | ExportNamespaceSpecifier { exported } => {
                put("exported", self.node(*exported))
            }
        }
    }
}
