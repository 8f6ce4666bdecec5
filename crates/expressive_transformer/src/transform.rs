//! Lowering of the extended tree to the standard node vocabulary.
//!
//! Every handler builds fresh nodes in an output arena; the input tree is
//! only read. Dispatch is a single `match` over [`NodeKind`]:
//! - Control forms become statements in statement position, and helper
//!   calls or immediately invoked arrows in expression position.
//! - `cond` becomes a `cond__` call over predicate/body pairs.
//! - Pipelines, binds, slices, optional chains, collections and curried
//!   functions become plain calls.
//! - Kinds that are already standard are rebuilt unchanged.

use crate::error::{TransformError, TransformResult};
use crate::polyfills::{Polyfill, PolyfillRegistry};
use crate::state::TransformerState;
use crate::util::{ReturnMode, Site, DEFAULT_CASE, MATCH_PARAM, NOT_FOUND};
use expressive_ast::{
    AssignmentOperator, Ast, BinaryOperator, MethodKind, NodeId, NodeKind, VarKind,
};
use expressive_core::intern::Atom;
use tracing::debug;

/// The result of lowering one tree.
#[derive(Debug, Clone)]
pub struct Transformed {
    /// The lowered tree. Shares the input's interner and comments.
    pub ast: Ast,
    pub root: NodeId,
    /// Source text of every helper the tree calls, in first-use order.
    pub polyfill_text: String,
    /// Registry names of the helpers used.
    pub polyfills: Vec<&'static str>,
}

/// Lowers one tree into a fresh arena.
pub struct Transformer<'a> {
    pub(crate) input: &'a Ast,
    pub(crate) out: Ast,
    pub(crate) polyfills: PolyfillRegistry,
    pub(crate) state: TransformerState,
    /// Position of the input node being lowered.
    pub(crate) site: Site,
}

impl<'a> Transformer<'a> {
    pub fn new(input: &'a Ast) -> Self {
        let mut out = Ast::with_capacity(input.interner.clone(), input.len());
        out.comments = input.comments.clone();
        Self {
            input,
            out,
            polyfills: PolyfillRegistry::new(),
            state: TransformerState::new(),
            site: Site::default(),
        }
    }

    /// Lower the tree rooted at `root`.
    pub fn run(mut self, root: NodeId) -> TransformResult<Transformed> {
        let root = self.lower(root)?;
        let polyfills = self.polyfills.names();
        debug!(nodes = self.out.len(), ?polyfills, "transform finished");
        Ok(Transformed {
            polyfill_text: self.polyfills.text(),
            polyfills,
            root,
            ast: self.out,
        })
    }

    // ========================================================================
    // Positions
    // ========================================================================

    /// Lower any node. The result carries the node's comments.
    pub(crate) fn lower(&mut self, id: NodeId) -> TransformResult<NodeId> {
        let input = self.input;
        let node = input.get(id).ok_or(TransformError::MissingNode(id.0))?;
        let outer = std::mem::replace(&mut self.site, Site::of(node));
        let lowered = self.lower_node(id, &node.kind);
        self.site = outer;
        let out = lowered?;
        if self.out[out].comments.is_empty() && !node.comments.is_empty() {
            self.out[out].comments = node.comments.clone();
        }
        Ok(out)
    }

    /// Lower a node whose value is used.
    pub(crate) fn expr(&mut self, id: NodeId) -> TransformResult<NodeId> {
        let out = self.lower(id)?;
        self.as_value(out)
    }

    fn as_value(&mut self, out: NodeId) -> TransformResult<NodeId> {
        let kind = self.out.kind(out);
        if matches!(kind, NodeKind::ThrowStatement { .. }) {
            return Ok(self.iife(vec![out]));
        }
        if kind.is_statement() && !matches!(kind, NodeKind::BlockStatement { .. }) {
            return Err(TransformError::Misplaced { kind: kind.type_name(), pos: self.out[out].start });
        }
        Ok(out)
    }

    fn expr_list(&mut self, ids: &[NodeId]) -> TransformResult<Vec<NodeId>> {
        ids.iter().map(|&id| self.expr(id)).collect()
    }

    fn lower_list(&mut self, ids: &[NodeId]) -> TransformResult<Vec<NodeId>> {
        ids.iter().map(|&id| self.lower(id)).collect()
    }

    /// Lower a node in statement position, wrapping expressions.
    pub(crate) fn statement(&mut self, id: NodeId) -> TransformResult<NodeId> {
        let out = self.lower(id)?;
        if self.out.kind(out).is_statement() {
            return Ok(out);
        }
        Ok(self.expression_statement(out))
    }

    fn statements(&mut self, ids: &[NodeId]) -> TransformResult<Vec<NodeId>> {
        ids.iter().map(|&id| self.statement(id)).collect()
    }

    /// Statements of a control-form body, flattened out of its block.
    fn body_statements(&mut self, body: NodeId) -> TransformResult<Vec<NodeId>> {
        match self.input.kind(body) {
            NodeKind::Block { body } => self.statements(body),
            NodeKind::SingleExpression { expression } => Ok(vec![self.statement(*expression)?]),
            _ => Ok(vec![self.statement(body)?]),
        }
    }

    /// Lower a body and turn it into a value-returning function.
    fn body_thunk(&mut self, body: NodeId, params: Vec<NodeId>) -> TransformResult<NodeId> {
        let block = self.lower(body)?;
        let block = self.ensure_block(block);
        Ok(self.thunk_from_block(block, params, ReturnMode::Value))
    }

    /// A function body, with an implicit return when it came from source.
    fn function_body(&mut self, body: NodeId) -> TransformResult<NodeId> {
        let out = self.lower(body)?;
        if matches!(self.input.kind(body), NodeKind::Block { .. } | NodeKind::SingleExpression { .. }) {
            self.insert_return(out, ReturnMode::Value);
        }
        Ok(out)
    }

    fn misplaced(&self, id: NodeId) -> TransformError {
        let node = &self.input[id];
        TransformError::Misplaced { kind: node.kind.type_name(), pos: node.start }
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    fn lower_node(&mut self, id: NodeId, kind: &'a NodeKind) -> TransformResult<NodeId> {
        use NodeKind::*;
        match kind {
            // Root and statement lists
            File { program } => {
                let program = self.lower(*program)?;
                Ok(self.copy(id, File { program }))
            }
            Program { body, source_type } => {
                let body = self.statements(body)?;
                Ok(self.copy(id, Program { body, source_type: *source_type }))
            }
            Block { body } | BlockStatement { body } => {
                let body = self.statements(body)?;
                Ok(self.copy(id, BlockStatement { body }))
            }
            SingleExpression { expression } => {
                let stmt = self.statement(*expression)?;
                Ok(self.copy(id, BlockStatement { body: vec![stmt] }))
            }
            ExpressionStatement { expression } => {
                let expression = self.expr(*expression)?;
                Ok(self.copy(id, ExpressionStatement { expression }))
            }

            // Control forms
            If { test, consequent, alternate, is_statement } => {
                self.lower_if(id, *test, *consequent, *alternate, *is_statement)
            }
            While { test, body, is_statement } => self.lower_loop(id, *test, *body, *is_statement, false),
            DoWhile { body, test, is_statement } => self.lower_loop(id, *test, *body, *is_statement, true),
            For { init, test, update, body, is_statement } => {
                let init = init.map(|init| self.for_head(init)).transpose()?;
                let test = test.map(|test| self.expr(test)).transpose()?;
                let update = update.map(|update| self.expr(update)).transpose()?;
                let body = self.lower(*body)?;
                let stmt = self.copy(id, ForStatement { init, test, update, body });
                Ok(if *is_statement { stmt } else { self.iife(vec![stmt]) })
            }
            ForOf { left, right, body, is_await, is_statement } => {
                let left = self.for_head(*left)?;
                let right = self.expr(*right)?;
                let body = self.lower(*body)?;
                let stmt = self.copy(id, ForOfStatement { left, right, body, is_await: *is_await });
                Ok(if *is_statement { stmt } else { self.iife(vec![stmt]) })
            }
            Switch { discriminant, cases, is_statement } => {
                if *is_statement {
                    self.lower_switch_statement(id, *discriminant, cases)
                } else {
                    self.lower_switch_expression(*discriminant, cases)
                }
            }
            Try { block, handler, finalizer, is_statement } => {
                let block = self.lower(*block)?;
                let block = self.ensure_block(block);
                let handler = handler.map(|handler| self.lower(handler)).transpose()?;
                let finalizer = finalizer.map(|finalizer| self.lower(finalizer)).transpose()?;
                let stmt = self.copy(id, TryStatement { block, handler, finalizer });
                if *is_statement {
                    return Ok(stmt);
                }
                self.insert_return(stmt, ReturnMode::Value);
                Ok(self.iife(vec![stmt]))
            }
            Return { argument } => {
                let argument = argument.map(|argument| self.expr(argument)).transpose()?;
                Ok(self.copy(id, ReturnStatement { argument }))
            }
            Throw { argument } => {
                let argument = self.expr(*argument)?;
                Ok(self.copy(id, ThrowStatement { argument }))
            }
            Break | BreakStatement => Ok(self.copy(id, BreakStatement)),
            Continue | ContinueStatement => Ok(self.copy(id, ContinueStatement)),
            Debugger | DebuggerStatement => Ok(self.copy(id, DebuggerStatement)),
            Case { .. } | SliceMember { .. } | ObjectMatcherProperty { .. } => Err(self.misplaced(id)),

            // Pattern matching
            Cond { discriminant, items } => self.lower_cond(*discriminant, items),
            CondItem { matcher, consequent } => self.lower_cond_item(*matcher, *consequent),
            VariableMatcher { .. } | CollectionMatcher { .. } | ObjectMatcher { .. } | ArrayMatcher { .. }
            | ExpressionMatcher { .. } => self.lower_matcher(id),

            // Collections
            Object { properties } | ObjectExpression { properties } => {
                let properties = self.lower_list(properties)?;
                Ok(self.copy(id, ObjectExpression { properties }))
            }
            Array { elements } | ArrayExpression { elements } => {
                let elements =
                    elements.iter().map(|element| element.map(|e| self.expr(e)).transpose()).collect::<Result<_, _>>()?;
                Ok(self.copy(id, ArrayExpression { elements }))
            }
            CollectionLiteral { constructor, collection } => {
                let constructor = self.expr(*constructor)?;
                let collection = self.expr(*collection)?;
                Ok(self.method_call(constructor, "from", vec![collection]))
            }
            CollectionPattern { .. } => Err(TransformError::CollectionPatternPosition { pos: self.input[id].start }),
            VariableDeclarator { id: target, init } => {
                if let CollectionPattern { destructurer, pattern } = self.input.kind(*target) {
                    let Some(init) = init else {
                        return Err(TransformError::CollectionPatternPosition { pos: self.input[*target].start });
                    };
                    let target = self.lower(*pattern)?;
                    let init = self.to_js(*destructurer, *init)?;
                    return Ok(self.copy(id, VariableDeclarator { id: target, init: Some(init) }));
                }
                let target = self.lower(*target)?;
                let init = init.map(|init| self.expr(init)).transpose()?;
                Ok(self.copy(id, VariableDeclarator { id: target, init }))
            }

            // Operators
            BinaryExpression { operator: BinaryOperator::Pipeline, left, right } => {
                let argument = self.expr(*left)?;
                let callee = self.expr(*right)?;
                Ok(self.call(callee, vec![argument]))
            }
            BinaryExpression { operator, left, right } => {
                let left = self.expr(*left)?;
                let right = self.expr(*right)?;
                let operator = match operator {
                    BinaryOperator::Power => BinaryOperator::Exponent,
                    operator => *operator,
                };
                Ok(self.copy(id, BinaryExpression { operator, left, right }))
            }
            AssignmentExpression { operator, left, right } => {
                if let CollectionPattern { destructurer, pattern } = self.input.kind(*left) {
                    let left = self.lower(*pattern)?;
                    let right = self.to_js(*destructurer, *right)?;
                    return Ok(self.copy(id, AssignmentExpression { operator: *operator, left, right }));
                }
                let left = self.lower(*left)?;
                let right = self.expr(*right)?;
                let operator = match operator {
                    AssignmentOperator::PowerAssign => AssignmentOperator::ExponentAssign,
                    operator => *operator,
                };
                Ok(self.copy(id, AssignmentExpression { operator, left, right }))
            }
            BindExpression { object, callee } => self.lower_bind(id, *object, *callee),

            // Members and calls
            MemberExpression { object, property, computed } => {
                if let SliceMember { beginning, finish } = self.input.kind(*property) {
                    return self.lower_slice(*object, *beginning, *finish);
                }
                let object = self.expr(*object)?;
                let property = if *computed { self.expr(*property)? } else { self.lower(*property)? };
                Ok(self.copy(id, MemberExpression { object, property, computed: *computed }))
            }
            OptionalMemberExpression { object, property, computed, .. } => {
                let object = self.expr(*object)?;
                let key = self.property_key(*property, *computed)?;
                self.use_polyfill(Polyfill::OptionalProp.name(), vec![object, key])
            }
            OptionalCallExpression { callee, arguments, .. } => self.lower_optional_call(*callee, arguments),
            CallExpression { callee, arguments, block_param } => {
                let callee = self.expr(*callee)?;
                let mut arguments = self.expr_list(arguments)?;
                if let Some(block) = block_param {
                    arguments.push(self.lower(*block)?);
                }
                Ok(self.copy(id, CallExpression { callee, arguments, block_param: None }))
            }
            BlockParam { params, body, .. } => {
                let params = self.lower_list(params)?;
                let body = self.lower(*body)?;
                Ok(self.copy(id, FunctionExpression { id: None, params, body, generator: false, is_async: false }))
            }
            ImportCall { argument } => {
                let callee = self.add(Import);
                let argument = self.expr(*argument)?;
                Ok(self.copy(id, CallExpression { callee, arguments: vec![argument], block_param: None }))
            }

            // Functions and classes
            ArrowFunction { params, body, is_async, generator, curried, thin } => {
                let params = self.lower_list(params)?;
                let body = self.function_body(*body)?;
                let arity = params.len();
                let function = if *thin {
                    self.copy(id, FunctionExpression { id: None, params, body, generator: *generator, is_async: *is_async })
                } else {
                    self.copy(id, ArrowFunctionExpression { params, body, is_async: *is_async })
                };
                if *curried {
                    return self.curry(function, arity);
                }
                Ok(function)
            }
            Function { id: name, params, body, generator, is_async, curried, declares } => {
                let name = name.map(|name| self.lower(name)).transpose()?;
                let params = self.lower_list(params)?;
                let body = self.function_body(*body)?;
                let (generator, is_async) = (*generator, *is_async);
                match (name, *declares, *curried) {
                    (Some(name), true, false) => {
                        Ok(self.copy(id, FunctionDeclaration { id: name, params, body, generator, is_async }))
                    }
                    (name, declares, true) => {
                        let arity = params.len();
                        let function =
                            self.copy(id, FunctionExpression { id: name, params, body, generator, is_async });
                        let curried = self.curry(function, arity)?;
                        match name {
                            Some(name) if declares => Ok(self.declare_var(name, curried)),
                            _ => Ok(curried),
                        }
                    }
                    (name, _, false) => {
                        Ok(self.copy(id, FunctionExpression { id: name, params, body, generator, is_async }))
                    }
                }
            }
            Class { id: name, super_class, body, declares } => {
                let name = name.map(|name| self.lower(name)).transpose()?;
                let super_class = super_class.map(|super_class| self.expr(super_class)).transpose()?;
                let body = self.lower(*body)?;
                match name {
                    Some(name) if *declares => Ok(self.copy(id, ClassDeclaration { id: name, super_class, body })),
                    name => Ok(self.copy(id, ClassExpression { id: name, super_class, body })),
                }
            }
            ObjectMethod { kind, key, params, body, computed, generator, is_async } => {
                let key = if *computed { self.expr(*key)? } else { self.lower(*key)? };
                let params = self.lower_list(params)?;
                let body = self.function_body(*body)?;
                Ok(self.copy(
                    id,
                    ObjectMethod {
                        kind: *kind,
                        key,
                        params,
                        body,
                        computed: *computed,
                        generator: *generator,
                        is_async: *is_async,
                    },
                ))
            }
            ClassMethod { kind, key, params, body, computed, is_static, generator, is_async } => {
                let key = if *computed { self.expr(*key)? } else { self.lower(*key)? };
                let params = self.lower_list(params)?;
                let body = if *kind == MethodKind::Constructor { self.lower(*body)? } else { self.function_body(*body)? };
                Ok(self.copy(
                    id,
                    ClassMethod {
                        kind: *kind,
                        key,
                        params,
                        body,
                        computed: *computed,
                        is_static: *is_static,
                        generator: *generator,
                        is_async: *is_async,
                    },
                ))
            }

            // Leaves
            Identifier { .. } | NullLiteral | BooleanLiteral { .. } | NumericLiteral { .. } | BigIntLiteral { .. }
            | StringLiteral { .. } | RegExpLiteral { .. } | TemplateElement { .. } | ThisExpression | Super
            | Import => Ok(self.copy(id, kind.clone())),

            // Modules
            ImportDeclaration { .. } | ImportSpecifier { .. } | ImportDefaultSpecifier { .. }
            | ImportNamespaceSpecifier { .. } | ExportNamedDeclaration { .. } | ExportDefaultDeclaration { .. }
            | ExportAllDeclaration { .. } | ExportSpecifier { .. } | ExportDefaultSpecifier { .. }
            | ExportNamespaceSpecifier { .. } => self.rebuild(id, kind),

            // Patterns
            ObjectPattern { .. } | ArrayPattern { .. } | AssignmentPattern { .. } | RestElement { .. } => {
                self.rebuild(id, kind)
            }

            // Remaining standard kinds
            IfStatement { .. } | WhileStatement { .. } | DoWhileStatement { .. } | ForStatement { .. }
            | ForOfStatement { .. } | SwitchStatement { .. } | SwitchCase { .. } | TryStatement { .. }
            | CatchClause { .. } | ReturnStatement { .. } | ThrowStatement { .. } | VariableDeclaration { .. }
            | FunctionDeclaration { .. } | ClassDeclaration { .. } | TemplateLiteral { .. }
            | TaggedTemplateExpression { .. } | MetaProperty { .. } | ObjectProperty { .. }
            | FunctionExpression { .. } | ArrowFunctionExpression { .. } | ClassExpression { .. } | ClassBody { .. }
            | UnaryExpression { .. } | UpdateExpression { .. } | LogicalExpression { .. }
            | ConditionalExpression { .. } | NewExpression { .. } | SequenceExpression { .. }
            | AwaitExpression { .. } | YieldExpression { .. } | SpreadElement { .. } => self.rebuild(id, kind),
        }
    }

    /// Rebuild a node with its children lowered and nothing else changed.
    fn rebuild(&mut self, id: NodeId, kind: &NodeKind) -> TransformResult<NodeId> {
        let holds_statements = kind.is_statement()
            || matches!(kind, NodeKind::SwitchCase { .. } | NodeKind::CatchClause { .. } | NodeKind::Program { .. });
        let lowered = kind.try_map_children(|child| if holds_statements { self.lower(child) } else { self.expr(child) })?;
        Ok(self.copy(id, lowered))
    }

    // ========================================================================
    // Control forms
    // ========================================================================

    fn lower_if(
        &mut self,
        id: NodeId,
        test: NodeId,
        consequent: NodeId,
        alternate: Option<NodeId>,
        is_statement: bool,
    ) -> TransformResult<NodeId> {
        let test = self.expr(test)?;
        if is_statement {
            let consequent = self.lower(consequent)?;
            let alternate = alternate.map(|alternate| self.lower(alternate)).transpose()?;
            return Ok(self.copy(id, NodeKind::IfStatement { test, consequent, alternate }));
        }
        // (test ? () => { ... } : () => { ... })()
        let consequent = self.body_thunk(consequent, Vec::new())?;
        let alternate = match alternate {
            Some(alternate) => self.body_thunk(alternate, Vec::new())?,
            None => {
                let block = self.add(NodeKind::BlockStatement { body: Vec::new() });
                self.thunk_from_block(block, Vec::new(), ReturnMode::Value)
            }
        };
        let callee = self.conditional(test, consequent, alternate);
        Ok(self.call(callee, Vec::new()))
    }

    /// `while` and `do ... while`.
    fn lower_loop(
        &mut self,
        id: NodeId,
        test: NodeId,
        body: NodeId,
        is_statement: bool,
        is_do: bool,
    ) -> TransformResult<NodeId> {
        if is_statement {
            return if is_do {
                let body = self.lower(body)?;
                let test = self.expr(test)?;
                Ok(self.copy(id, NodeKind::DoWhileStatement { body, test }))
            } else {
                let test = self.expr(test)?;
                let body = self.lower(body)?;
                Ok(self.copy(id, NodeKind::WhileStatement { test, body }))
            };
        }
        let (test, thunk) = if is_do {
            let thunk = self.body_thunk(body, Vec::new())?;
            (self.expr(test)?, thunk)
        } else {
            let test = self.expr(test)?;
            (test, self.body_thunk(body, Vec::new())?)
        };
        let polyfill = if is_do { Polyfill::DoWhile } else { Polyfill::While };
        self.use_polyfill(polyfill.name(), vec![test, thunk])
    }

    /// The head of a `for` or `for ... of`: a declaration or a target.
    fn for_head(&mut self, id: NodeId) -> TransformResult<NodeId> {
        let out = self.lower(id)?;
        if matches!(self.out.kind(out), NodeKind::VariableDeclaration { .. }) {
            return Ok(out);
        }
        self.as_value(out)
    }

    fn lower_switch_statement(&mut self, id: NodeId, discriminant: NodeId, cases: &[NodeId]) -> TransformResult<NodeId> {
        let discriminant = self.expr(discriminant)?;
        let mut lowered = Vec::with_capacity(cases.len());
        for &case in cases {
            let NodeKind::Case { test, body } = self.input.kind(case) else {
                return Err(self.misplaced(case));
            };
            let test = test.map(|test| self.expr(test)).transpose()?;
            let mut consequent = self.body_statements(*body)?;
            // A trailing `continue` falls through; anything else breaks.
            let last = consequent.last().map(|&stmt| self.out.kind(stmt));
            let falls_through = matches!(last, Some(NodeKind::ContinueStatement));
            let breaks = matches!(last, Some(NodeKind::BreakStatement));
            if falls_through {
                consequent.pop();
            } else if !breaks {
                let brk = self.add_at(case, NodeKind::BreakStatement);
                consequent.push(brk);
            }
            lowered.push(self.copy(case, NodeKind::SwitchCase { test, consequent }));
        }
        Ok(self.copy(id, NodeKind::SwitchStatement { discriminant, cases: lowered }))
    }

    /// `switch__(d, [[test | def__ault__, () => { ...; return [value, marker] }], ...])`.
    fn lower_switch_expression(&mut self, discriminant: NodeId, cases: &[NodeId]) -> TransformResult<NodeId> {
        let mut args = vec![self.expr(discriminant)?];
        for &case in cases {
            let NodeKind::Case { test, body } = self.input.kind(case) else {
                return Err(self.misplaced(case));
            };
            let test = match test {
                Some(test) => self.expr(*test)?,
                None => self.ident(DEFAULT_CASE),
            };
            let block = self.lower(*body)?;
            let block = self.ensure_block(block);
            let fallthrough = self.pop_trailing(block, |kind| matches!(kind, NodeKind::ContinueStatement));
            if !fallthrough {
                self.pop_trailing(block, |kind| matches!(kind, NodeKind::BreakStatement));
            }
            let thunk = self.thunk_from_block(block, Vec::new(), ReturnMode::SwitchCase { fallthrough });
            args.push(self.array(vec![test, thunk]));
        }
        self.use_polyfill(Polyfill::Switch.name(), args)
    }

    // ========================================================================
    // cond
    // ========================================================================

    /// `cond__(d, [[predicate, (bindings) => body], ...])`.
    fn lower_cond(&mut self, discriminant: NodeId, items: &[NodeId]) -> TransformResult<NodeId> {
        // Registered before the matcher helpers, which use its sentinel.
        self.polyfills.register(Polyfill::Cond);
        let mut args = vec![self.expr(discriminant)?];
        for &item in items {
            args.push(self.lower(item)?);
        }
        self.use_polyfill(Polyfill::Cond.name(), args)
    }

    fn lower_cond_item(&mut self, matcher: NodeId, consequent: NodeId) -> TransformResult<NodeId> {
        let enclosing = self.state.take_vars();
        let predicate = self.lower(matcher);
        let vars = std::mem::replace(&mut self.state.vars, enclosing);
        let predicate = predicate?;

        let mut params = Vec::with_capacity(vars.len());
        for var in vars {
            let param = match var {
                Some(name) => self.ident_atom(name),
                None => {
                    let name = self.state.random_var().to_string();
                    self.ident(&name)
                }
            };
            params.push(param);
        }
        let body = self.body_thunk(consequent, params)?;
        Ok(self.array(vec![predicate, body]))
    }

    /// Lower a matcher into a predicate `_m => bindings | __not__found`.
    fn lower_matcher(&mut self, id: NodeId) -> TransformResult<NodeId> {
        match self.input.kind(id) {
            NodeKind::VariableMatcher { id: name } => {
                let name = self.binding_name(*name);
                self.state.add_var(name);
                let value = self.ident(MATCH_PARAM);
                let bindings = self.array(vec![value]);
                Ok(self.predicate(bindings))
            }
            NodeKind::ExpressionMatcher { expression } => {
                let expected = self.expr(*expression)?;
                let value = self.ident(MATCH_PARAM);
                let test = self.strict_equal(expected, value);
                let bindings = self.array(Vec::new());
                let not_found = self.ident(NOT_FOUND);
                let body = self.conditional(test, bindings, not_found);
                Ok(self.predicate(body))
            }
            NodeKind::CollectionMatcher { id: constructor, collection } => {
                let ctor = self.expr(*constructor)?;
                let value = self.ident(MATCH_PARAM);
                let test = self.use_polyfill(Polyfill::Constructor.name(), vec![value, ctor])?;
                let inner = self.lower(*collection)?;
                let converted = self.to_js_value(*constructor)?;
                let bindings = self.call(inner, vec![converted]);
                let not_found = self.ident(NOT_FOUND);
                let body = self.conditional(test, bindings, not_found);
                Ok(self.predicate(body))
            }
            NodeKind::ObjectMatcher { properties } => {
                let mut args = vec![self.ident(MATCH_PARAM)];
                for &property in properties {
                    let NodeKind::ObjectMatcherProperty { key, value, computed } = self.input.kind(property) else {
                        return Err(self.misplaced(property));
                    };
                    let key_expr = self.property_key(*key, *computed)?;
                    let matcher = match value {
                        Some(value) => self.lower(*value)?,
                        None => {
                            let name = if *computed { None } else { self.binding_name(*key) };
                            self.state.add_var(name);
                            self.add_at(property, NodeKind::NullLiteral)
                        }
                    };
                    args.push(self.array(vec![key_expr, matcher]));
                }
                let body = self.use_polyfill(Polyfill::MatchObject.name(), args)?;
                Ok(self.predicate(body))
            }
            NodeKind::ArrayMatcher { elements } => {
                let mut args = vec![self.ident(MATCH_PARAM)];
                for &element in elements {
                    args.push(self.lower(element)?);
                }
                let body = self.use_polyfill(Polyfill::MatchArray.name(), args)?;
                Ok(self.predicate(body))
            }
            _ => Err(self.misplaced(id)),
        }
    }

    /// The name a matcher binds for `id`, if it has one.
    fn binding_name(&self, id: NodeId) -> Option<Atom> {
        match self.input.kind(id) {
            NodeKind::Identifier { name } => Some(*name),
            NodeKind::StringLiteral { value } => Some(self.out.interner.intern(value)),
            _ => None,
        }
    }

    // ========================================================================
    // Operators and members
    // ========================================================================

    /// `Ctor.toJS(value)` for a collection pattern target.
    fn to_js(&mut self, constructor: NodeId, value: NodeId) -> TransformResult<NodeId> {
        let value = self.expr(value)?;
        let constructor = self.expr(constructor)?;
        Ok(self.method_call(constructor, "toJS", vec![value]))
    }

    /// `Ctor.toJS(_m)` inside a collection matcher.
    fn to_js_value(&mut self, constructor: NodeId) -> TransformResult<NodeId> {
        let constructor = self.expr(constructor)?;
        let value = self.ident(MATCH_PARAM);
        Ok(self.method_call(constructor, "toJS", vec![value]))
    }

    /// A property key as a value: names become strings.
    fn property_key(&mut self, property: NodeId, computed: bool) -> TransformResult<NodeId> {
        if computed {
            return self.expr(property);
        }
        match self.input.kind(property) {
            NodeKind::Identifier { name } => {
                let value = self.input.name(*name).to_string();
                Ok(self.add_at(property, NodeKind::StringLiteral { value }))
            }
            _ => self.expr(property),
        }
    }

    /// `object.slice(beginning[, finish])`. A missing beginning is `0`.
    fn lower_slice(
        &mut self,
        object: NodeId,
        beginning: Option<NodeId>,
        finish: Option<NodeId>,
    ) -> TransformResult<NodeId> {
        let object = self.expr(object)?;
        let mut args = Vec::with_capacity(2);
        if beginning.is_some() || finish.is_some() {
            let beginning = match beginning {
                Some(beginning) => self.expr(beginning)?,
                None => self.number(0.0),
            };
            args.push(beginning);
        }
        if let Some(finish) = finish {
            args.push(self.expr(finish)?);
        }
        Ok(self.method_call(object, "slice", args))
    }

    /// `object::callee` is `callee.bind(object)`; `::object.name` is
    /// `object.name.bind(object)`.
    fn lower_bind(&mut self, id: NodeId, object: Option<NodeId>, callee: NodeId) -> TransformResult<NodeId> {
        if let Some(object) = object {
            let receiver = self.expr(object)?;
            let callee = self.expr(callee)?;
            return Ok(self.method_call(callee, "bind", vec![receiver]));
        }
        match self.input.kind(callee) {
            NodeKind::MemberExpression { object, property, .. }
                if !matches!(self.input.kind(*property), NodeKind::SliceMember { .. }) =>
            {
                let target = self.expr(callee)?;
                let receiver = self.expr(*object)?;
                Ok(self.method_call(target, "bind", vec![receiver]))
            }
            _ => Err(TransformError::MalformedBind { pos: self.input[id].start }),
        }
    }

    /// `opt__method__(o, () => key, () => [args])` when the callee is a
    /// member, so the call keeps its receiver; `opt__call__(f, () => [args])`
    /// otherwise.
    fn lower_optional_call(&mut self, callee: NodeId, arguments: &[NodeId]) -> TransformResult<NodeId> {
        match self.input.kind(callee) {
            NodeKind::MemberExpression { object, property, computed }
            | NodeKind::OptionalMemberExpression { object, property, computed, .. }
                if !matches!(self.input.kind(*property), NodeKind::SliceMember { .. }) =>
            {
                let mut args = vec![self.expr(*object)?, self.property_key(*property, *computed)?];
                args.extend(self.expr_list(arguments)?);
                self.use_polyfill(Polyfill::OptionalMethod.name(), args)
            }
            _ => {
                let mut args = vec![self.expr(callee)?];
                args.extend(self.expr_list(arguments)?);
                self.use_polyfill(Polyfill::OptionalCall.name(), args)
            }
        }
    }

    // ========================================================================
    // Functions
    // ========================================================================

    /// `_kn(function, arity)`.
    fn curry(&mut self, function: NodeId, arity: usize) -> TransformResult<NodeId> {
        let arity = self.number(arity as f64);
        self.use_polyfill(Polyfill::Curry.name(), vec![function, arity])
    }

    /// `var name = init`, binding a fresh copy of identifier `name`.
    fn declare_var(&mut self, name: NodeId, init: NodeId) -> NodeId {
        let kind = self.out.kind(name).clone();
        let binding = self.add_like(name, kind);
        let declarator = self.add(NodeKind::VariableDeclarator { id: binding, init: Some(init) });
        self.add(NodeKind::VariableDeclaration { kind: VarKind::Var, declarations: vec![declarator] })
    }
}
