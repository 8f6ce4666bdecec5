//! The closed set of node kinds.
//!
//! One enum covers both trees: the parser's output, which uses the
//! extended source kinds (`If`, `Cond`, `CollectionLiteral`, ...), and the
//! transformer's output, which must only use the standard kinds.
//! [`NodeKind::is_standard`] tells the two vocabularies apart.

use crate::node::NodeId;
use crate::operators::*;
use expressive_core::intern::Atom;

/// A node's kind together with its kind-specific fields.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    // ========================================================================
    // Root
    // ========================================================================
    File { program: NodeId },
    Program { body: Vec<NodeId>, source_type: SourceType },

    // ========================================================================
    // Source-language statements and control flow
    // ========================================================================
    /// A braced statement list.
    Block { body: Vec<NodeId> },
    /// A body written as a single expression without braces.
    SingleExpression { expression: NodeId },
    If { test: NodeId, consequent: NodeId, alternate: Option<NodeId>, is_statement: bool },
    While { test: NodeId, body: NodeId, is_statement: bool },
    DoWhile { body: NodeId, test: NodeId, is_statement: bool },
    For {
        init: Option<NodeId>,
        test: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
        is_statement: bool,
    },
    ForOf { left: NodeId, right: NodeId, body: NodeId, is_await: bool, is_statement: bool },
    Switch { discriminant: NodeId, cases: Vec<NodeId>, is_statement: bool },
    /// `case (test) body` or `default body`.
    Case { test: Option<NodeId>, body: NodeId },
    Try { block: NodeId, handler: Option<NodeId>, finalizer: Option<NodeId>, is_statement: bool },
    Return { argument: Option<NodeId> },
    Throw { argument: NodeId },
    Break,
    Continue,
    Debugger,

    // ========================================================================
    // Pattern matching
    // ========================================================================
    Cond { discriminant: NodeId, items: Vec<NodeId> },
    CondItem { matcher: NodeId, consequent: NodeId },
    VariableMatcher { id: NodeId },
    CollectionMatcher { id: NodeId, collection: NodeId },
    ObjectMatcher { properties: Vec<NodeId> },
    ObjectMatcherProperty { key: NodeId, value: Option<NodeId>, computed: bool },
    ArrayMatcher { elements: Vec<NodeId> },
    ExpressionMatcher { expression: NodeId },

    // ========================================================================
    // Source-language expressions
    // ========================================================================
    /// Object literal before lowering.
    Object { properties: Vec<NodeId> },
    /// Array literal before lowering. `None` marks a hole.
    Array { elements: Vec<Option<NodeId>> },
    /// `Name#collection`.
    CollectionLiteral { constructor: NodeId, collection: NodeId },
    /// `Name#pattern` in binding position.
    CollectionPattern { destructurer: NodeId, pattern: NodeId },
    /// `object::callee` or `::callee`.
    BindExpression { object: Option<NodeId>, callee: NodeId },
    OptionalMemberExpression { object: NodeId, property: NodeId, computed: bool, optional: bool },
    OptionalCallExpression { callee: NodeId, arguments: Vec<NodeId>, optional: bool },
    /// The `[begin:finish]` property of a slicing member expression.
    SliceMember { beginning: Option<NodeId>, finish: Option<NodeId> },
    /// The block argument of `f(args) { ... }` / `f(args) do (params) { ... }`.
    BlockParam { params: Vec<NodeId>, body: NodeId, is_do: bool },
    /// Dynamic `import(argument)`.
    ImportCall { argument: NodeId },
    ArrowFunction {
        params: Vec<NodeId>,
        body: NodeId,
        is_async: bool,
        generator: bool,
        curried: bool,
        /// `->` instead of `=>`.
        thin: bool,
    },
    Function {
        id: Option<NodeId>,
        params: Vec<NodeId>,
        body: NodeId,
        generator: bool,
        is_async: bool,
        curried: bool,
        declares: bool,
    },
    Class { id: Option<NodeId>, super_class: Option<NodeId>, body: NodeId, declares: bool },

    // ========================================================================
    // Standard statements
    // ========================================================================
    ExpressionStatement { expression: NodeId },
    BlockStatement { body: Vec<NodeId> },
    IfStatement { test: NodeId, consequent: NodeId, alternate: Option<NodeId> },
    WhileStatement { test: NodeId, body: NodeId },
    DoWhileStatement { body: NodeId, test: NodeId },
    ForStatement { init: Option<NodeId>, test: Option<NodeId>, update: Option<NodeId>, body: NodeId },
    ForOfStatement { left: NodeId, right: NodeId, body: NodeId, is_await: bool },
    SwitchStatement { discriminant: NodeId, cases: Vec<NodeId> },
    SwitchCase { test: Option<NodeId>, consequent: Vec<NodeId> },
    TryStatement { block: NodeId, handler: Option<NodeId>, finalizer: Option<NodeId> },
    CatchClause { param: Option<NodeId>, body: NodeId },
    ReturnStatement { argument: Option<NodeId> },
    ThrowStatement { argument: NodeId },
    BreakStatement,
    ContinueStatement,
    DebuggerStatement,
    VariableDeclaration { kind: VarKind, declarations: Vec<NodeId> },
    VariableDeclarator { id: NodeId, init: Option<NodeId> },
    FunctionDeclaration { id: NodeId, params: Vec<NodeId>, body: NodeId, generator: bool, is_async: bool },
    ClassDeclaration { id: NodeId, super_class: Option<NodeId>, body: NodeId },

    // ========================================================================
    // Standard expressions
    // ========================================================================
    Identifier { name: Atom },
    NullLiteral,
    BooleanLiteral { value: bool },
    NumericLiteral { value: f64 },
    BigIntLiteral { value: String },
    StringLiteral { value: String },
    RegExpLiteral { pattern: String, flags: String },
    TemplateLiteral { quasis: Vec<NodeId>, expressions: Vec<NodeId> },
    TemplateElement { raw: String, cooked: Option<String>, tail: bool },
    TaggedTemplateExpression { tag: NodeId, quasi: NodeId },
    ThisExpression,
    Super,
    Import,
    MetaProperty { meta: NodeId, property: NodeId },
    ArrayExpression { elements: Vec<Option<NodeId>> },
    ObjectExpression { properties: Vec<NodeId> },
    ObjectProperty { key: NodeId, value: NodeId, computed: bool, shorthand: bool },
    ObjectMethod {
        kind: MethodKind,
        key: NodeId,
        params: Vec<NodeId>,
        body: NodeId,
        computed: bool,
        generator: bool,
        is_async: bool,
    },
    FunctionExpression {
        id: Option<NodeId>,
        params: Vec<NodeId>,
        body: NodeId,
        generator: bool,
        is_async: bool,
    },
    ArrowFunctionExpression { params: Vec<NodeId>, body: NodeId, is_async: bool },
    ClassExpression { id: Option<NodeId>, super_class: Option<NodeId>, body: NodeId },
    ClassBody { body: Vec<NodeId> },
    ClassMethod {
        kind: MethodKind,
        key: NodeId,
        params: Vec<NodeId>,
        body: NodeId,
        computed: bool,
        is_static: bool,
        generator: bool,
        is_async: bool,
    },
    UnaryExpression { operator: UnaryOperator, argument: NodeId },
    UpdateExpression { operator: UpdateOperator, prefix: bool, argument: NodeId },
    BinaryExpression { operator: BinaryOperator, left: NodeId, right: NodeId },
    LogicalExpression { operator: LogicalOperator, left: NodeId, right: NodeId },
    AssignmentExpression { operator: AssignmentOperator, left: NodeId, right: NodeId },
    ConditionalExpression { test: NodeId, consequent: NodeId, alternate: NodeId },
    /// A call. `block_param` is only ever set by the parser.
    CallExpression { callee: NodeId, arguments: Vec<NodeId>, block_param: Option<NodeId> },
    NewExpression { callee: NodeId, arguments: Vec<NodeId> },
    MemberExpression { object: NodeId, property: NodeId, computed: bool },
    SequenceExpression { expressions: Vec<NodeId> },
    AwaitExpression { argument: NodeId },
    YieldExpression { argument: Option<NodeId>, delegate: bool },
    SpreadElement { argument: NodeId },

    // ========================================================================
    // Patterns
    // ========================================================================
    ObjectPattern { properties: Vec<NodeId> },
    ArrayPattern { elements: Vec<Option<NodeId>> },
    AssignmentPattern { left: NodeId, right: NodeId },
    RestElement { argument: NodeId },

    // ========================================================================
    // Modules
    // ========================================================================
    ImportDeclaration { specifiers: Vec<NodeId>, source: NodeId },
    ImportSpecifier { imported: NodeId, local: NodeId },
    ImportDefaultSpecifier { local: NodeId },
    ImportNamespaceSpecifier { local: NodeId },
    ExportNamedDeclaration { declaration: Option<NodeId>, specifiers: Vec<NodeId>, source: Option<NodeId> },
    ExportDefaultDeclaration { declaration: NodeId },
    ExportAllDeclaration { source: NodeId },
    ExportSpecifier { local: NodeId, exported: NodeId },
    ExportDefaultSpecifier { exported: NodeId },
    ExportNamespaceSpecifier { exported: NodeId },
}

impl NodeKind {
    /// The ESTree/Babel `type` name of this kind.
    pub fn type_name(&self) -> &'static str {
        use NodeKind::*;
        match self {
            File { .. } => "File",
            Program { .. } => "Program",
            Block { .. } => "Block",
            SingleExpression { .. } => "SingleExpression",
            If { .. } => "If",
            While { .. } => "While",
            DoWhile { .. } => "DoWhile",
            For { .. } => "For",
            ForOf { .. } => "ForOf",
            Switch { .. } => "Switch",
            Case { .. } => "Case",
            Try { .. } => "Try",
            Return { .. } => "Return",
            Throw { .. } => "Throw",
            Break => "Break",
            Continue => "Continue",
            Debugger => "Debugger",
            Cond { .. } => "Cond",
            CondItem { .. } => "CondItem",
            VariableMatcher { .. } => "VariableMatcher",
            CollectionMatcher { .. } => "CollectionMatcher",
            ObjectMatcher { .. } => "ObjectMatcher",
            ObjectMatcherProperty { .. } => "ObjectMatcherProperty",
            ArrayMatcher { .. } => "ArrayMatcher",
            ExpressionMatcher { .. } => "ExpressionMatcher",
            Object { .. } => "Object",
            Array { .. } => "Array",
            CollectionLiteral { .. } => "CollectionLiteral",
            CollectionPattern { .. } => "CollectionPattern",
            BindExpression { .. } => "BindExpression",
            OptionalMemberExpression { .. } => "OptionalMemberExpression",
            OptionalCallExpression { .. } => "OptionalCallExpression",
            SliceMember { .. } => "SliceMember",
            BlockParam { .. } => "BlockParam",
            ImportCall { .. } => "ImportCall",
            ArrowFunction { .. } => "ArrowFunction",
            Function { .. } => "Function",
            Class { .. } => "Class",
            ExpressionStatement { .. } => "ExpressionStatement",
            BlockStatement { .. } => "BlockStatement",
            IfStatement { .. } => "IfStatement",
            WhileStatement { .. } => "WhileStatement",
            DoWhileStatement { .. } => "DoWhileStatement",
            ForStatement { .. } => "ForStatement",
            ForOfStatement { .. } => "ForOfStatement",
            SwitchStatement { .. } => "SwitchStatement",
            SwitchCase { .. } => "SwitchCase",
            TryStatement { .. } => "TryStatement",
            CatchClause { .. } => "CatchClause",
            ReturnStatement { .. } => "ReturnStatement",
            ThrowStatement { .. } => "ThrowStatement",
            BreakStatement => "BreakStatement",
            ContinueStatement => "ContinueStatement",
            DebuggerStatement => "DebuggerStatement",
            VariableDeclaration { .. } => "VariableDeclaration",
            VariableDeclarator { .. } => "VariableDeclarator",
            FunctionDeclaration { .. } => "FunctionDeclaration",
            ClassDeclaration { .. } => "ClassDeclaration",
            Identifier { .. } => "Identifier",
            NullLiteral => "NullLiteral",
            BooleanLiteral { .. } => "BooleanLiteral",
            NumericLiteral { .. } => "NumericLiteral",
            BigIntLiteral { .. } => "BigIntLiteral",
            StringLiteral { .. } => "StringLiteral",
            RegExpLiteral { .. } => "RegExpLiteral",
            TemplateLiteral { .. } => "TemplateLiteral",
            TemplateElement { .. } => "TemplateElement",
            TaggedTemplateExpression { .. } => "TaggedTemplateExpression",
            ThisExpression => "ThisExpression",
            Super => "Super",
            Import => "Import",
            MetaProperty { .. } => "MetaProperty",
            ArrayExpression { .. } => "ArrayExpression",
            ObjectExpression { .. } => "ObjectExpression",
            ObjectProperty { .. } => "ObjectProperty",
            ObjectMethod { .. } => "ObjectMethod",
            FunctionExpression { .. } => "FunctionExpression",
            ArrowFunctionExpression { .. } => "ArrowFunctionExpression",
            ClassExpression { .. } => "ClassExpression",
            ClassBody { .. } => "ClassBody",
            ClassMethod { .. } => "ClassMethod",
            UnaryExpression { .. } => "UnaryExpression",
            UpdateExpression { .. } => "UpdateExpression",
            BinaryExpression { .. } => "BinaryExpression",
            LogicalExpression { .. } => "LogicalExpression",
            AssignmentExpression { .. } => "AssignmentExpression",
            ConditionalExpression { .. } => "ConditionalExpression",
            CallExpression { .. } => "CallExpression",
            NewExpression { .. } => "NewExpression",
            MemberExpression { .. } => "MemberExpression",
            SequenceExpression { .. } => "SequenceExpression",
            AwaitExpression { .. } => "AwaitExpression",
            YieldExpression { .. } => "YieldExpression",
            SpreadElement { .. } => "SpreadElement",
            ObjectPattern { .. } => "ObjectPattern",
            ArrayPattern { .. } => "ArrayPattern",
            AssignmentPattern { .. } => "AssignmentPattern",
            RestElement { .. } => "RestElement",
            ImportDeclaration { .. } => "ImportDeclaration",
            ImportSpecifier { .. } => "ImportSpecifier",
            ImportDefaultSpecifier { .. } => "ImportDefaultSpecifier",
            ImportNamespaceSpecifier { .. } => "ImportNamespaceSpecifier",
            ExportNamedDeclaration { .. } => "ExportNamedDeclaration",
            ExportDefaultDeclaration { .. } => "ExportDefaultDeclaration",
            ExportAllDeclaration { .. } => "ExportAllDeclaration",
            ExportSpecifier { .. } => "ExportSpecifier",
            ExportDefaultSpecifier { .. } => "ExportDefaultSpecifier",
            ExportNamespaceSpecifier { .. } => "ExportNamespaceSpecifier",
        }
    }

    /// Whether this node may appear in a lowered tree.
    ///
    /// Only the node itself is inspected, not its children.
    pub fn is_standard(&self) -> bool {
        use NodeKind::*;
        match self {
            Block { .. } | SingleExpression { .. } | If { .. } | While { .. } | DoWhile { .. }
            | For { .. } | ForOf { .. } | Switch { .. } | Case { .. } | Try { .. }
            | Return { .. } | Throw { .. } | Break | Continue | Debugger => false,
            Cond { .. } | CondItem { .. } | VariableMatcher { .. } | CollectionMatcher { .. }
            | ObjectMatcher { .. } | ObjectMatcherProperty { .. } | ArrayMatcher { .. }
            | ExpressionMatcher { .. } => false,
            Object { .. } | Array { .. } | CollectionLiteral { .. } | CollectionPattern { .. }
            | BindExpression { .. } | OptionalMemberExpression { .. }
            | OptionalCallExpression { .. } | SliceMember { .. } | BlockParam { .. }
            | ImportCall { .. } | ArrowFunction { .. } | Function { .. } | Class { .. } => false,
            BinaryExpression { operator, .. } => operator.is_standard(),
            AssignmentExpression { operator, .. } => operator.is_standard(),
            CallExpression { block_param, .. } => block_param.is_none(),
            _ => true,
        }
    }

    /// Whether this kind is a statement (or declaration) of the lowered tree.
    pub fn is_statement(&self) -> bool {
        use NodeKind::*;
        matches!(
            self,
            ExpressionStatement { .. }
                | BlockStatement { .. }
                | IfStatement { .. }
                | WhileStatement { .. }
                | DoWhileStatement { .. }
                | ForStatement { .. }
                | ForOfStatement { .. }
                | SwitchStatement { .. }
                | TryStatement { .. }
                | ReturnStatement { .. }
                | ThrowStatement { .. }
                | BreakStatement
                | ContinueStatement
                | DebuggerStatement
                | VariableDeclaration { .. }
                | FunctionDeclaration { .. }
                | ClassDeclaration { .. }
                | ImportDeclaration { .. }
                | ExportNamedDeclaration { .. }
                | ExportDefaultDeclaration { .. }
                | ExportAllDeclaration { .. }
        )
    }

    /// Call `f` on every child in source order.
    pub fn for_each_child(&self, mut f: impl FnMut(NodeId)) {
        use NodeKind::*;
        fn opt(f: &mut dyn FnMut(NodeId), id: &Option<NodeId>) {
            if let Some(id) = id {
                f(*id);
            }
        }
        match self {
            File { program } => f(*program),
            Program { body, .. } | Block { body } | BlockStatement { body } | ClassBody { body } => {
                body.iter().copied().for_each(f)
            }
            SingleExpression { expression } | ExpressionStatement { expression }
            | ExpressionMatcher { expression } => f(*expression),
            If { test, consequent, alternate, .. } | IfStatement { test, consequent, alternate } => {
                f(*test);
                f(*consequent);
                opt(&mut f, alternate);
            }
            While { test, body, .. } | WhileStatement { test, body } => {
                f(*test);
                f(*body);
            }
            DoWhile { body, test, .. } | DoWhileStatement { body, test } => {
                f(*body);
                f(*test);
            }
            For { init, test, update, body, .. } | ForStatement { init, test, update, body } => {
                opt(&mut f, init);
                opt(&mut f, test);
                opt(&mut f, update);
                f(*body);
            }
            ForOf { left, right, body, .. } | ForOfStatement { left, right, body, .. } => {
                f(*left);
                f(*right);
                f(*body);
            }
            Switch { discriminant, cases, .. } | SwitchStatement { discriminant, cases } => {
                f(*discriminant);
                cases.iter().copied().for_each(f);
            }
            Case { test, body } => {
                opt(&mut f, test);
                f(*body);
            }
            SwitchCase { test, consequent } => {
                opt(&mut f, test);
                consequent.iter().copied().for_each(f);
            }
            Try { block, handler, finalizer, .. } | TryStatement { block, handler, finalizer } => {
                f(*block);
                opt(&mut f, handler);
                opt(&mut f, finalizer);
            }
            CatchClause { param, body } => {
                opt(&mut f, param);
                f(*body);
            }
            Return { argument } | ReturnStatement { argument } | YieldExpression { argument, .. } => {
                opt(&mut f, argument)
            }
            Throw { argument } | ThrowStatement { argument } | AwaitExpression { argument }
            | SpreadElement { argument } | RestElement { argument } | ImportCall { argument }
            | UnaryExpression { argument, .. } | UpdateExpression { argument, .. } => f(*argument),
            Break | Continue | Debugger | BreakStatement | ContinueStatement | DebuggerStatement => {}
            Cond { discriminant, items } => {
                f(*discriminant);
                items.iter().copied().for_each(f);
            }
            CondItem { matcher, consequent } => {
                f(*matcher);
                f(*consequent);
            }
            VariableMatcher { id } => f(*id),
            CollectionMatcher { id, collection } => {
                f(*id);
                f(*collection);
            }
            ObjectMatcher { properties } | Object { properties } | ObjectExpression { properties }
            | ObjectPattern { properties } => properties.iter().copied().for_each(f),
            ObjectMatcherProperty { key, value, .. } => {
                f(*key);
                opt(&mut f, value);
            }
            ArrayMatcher { elements } => elements.iter().copied().for_each(f),
            Array { elements } | ArrayExpression { elements } | ArrayPattern { elements } => {
                elements.iter().flatten().copied().for_each(f)
            }
            CollectionLiteral { constructor, collection } => {
                f(*constructor);
                f(*collection);
            }
            CollectionPattern { destructurer, pattern } => {
                f(*destructurer);
                f(*pattern);
            }
            BindExpression { object, callee } => {
                opt(&mut f, object);
                f(*callee);
            }
            OptionalMemberExpression { object, property, .. } | MemberExpression { object, property, .. } => {
                f(*object);
                f(*property);
            }
            OptionalCallExpression { callee, arguments, .. } | NewExpression { callee, arguments } => {
                f(*callee);
                arguments.iter().copied().for_each(f);
            }
            CallExpression { callee, arguments, block_param } => {
                f(*callee);
                arguments.iter().copied().for_each(&mut f);
                opt(&mut f, block_param);
            }
            SliceMember { beginning, finish } => {
                opt(&mut f, beginning);
                opt(&mut f, finish);
            }
            BlockParam { params, body, .. } | ArrowFunction { params, body, .. }
            | ArrowFunctionExpression { params, body, .. } => {
                params.iter().copied().for_each(&mut f);
                f(*body);
            }
            Function { id, params, body, .. } | FunctionExpression { id, params, body, .. } => {
                opt(&mut f, id);
                params.iter().copied().for_each(&mut f);
                f(*body);
            }
            FunctionDeclaration { id, params, body, .. } => {
                f(*id);
                params.iter().copied().for_each(&mut f);
                f(*body);
            }
            Class { id, super_class, body, .. } | ClassExpression { id, super_class, body } => {
                opt(&mut f, id);
                opt(&mut f, super_class);
                f(*body);
            }
            ClassDeclaration { id, super_class, body } => {
                f(*id);
                opt(&mut f, super_class);
                f(*body);
            }
            VariableDeclaration { declarations, .. } => declarations.iter().copied().for_each(f),
            VariableDeclarator { id, init } => {
                f(*id);
                opt(&mut f, init);
            }
            Identifier { .. } | NullLiteral | BooleanLiteral { .. } | NumericLiteral { .. }
            | BigIntLiteral { .. } | StringLiteral { .. } | RegExpLiteral { .. }
            | TemplateElement { .. } | ThisExpression | Super | Import => {}
            TemplateLiteral { quasis, expressions } => {
                // Quasis and expressions interleave in source order.
                for (i, quasi) in quasis.iter().enumerate() {
                    f(*quasi);
                    if let Some(expr) = expressions.get(i) {
                        f(*expr);
                    }
                }
            }
            TaggedTemplateExpression { tag, quasi } => {
                f(*tag);
                f(*quasi);
            }
            MetaProperty { meta, property } => {
                f(*meta);
                f(*property);
            }
            ObjectProperty { key, value, .. } => {
                f(*key);
                f(*value);
            }
            ObjectMethod { key, params, body, .. } | ClassMethod { key, params, body, .. } => {
                f(*key);
                params.iter().copied().for_each(&mut f);
                f(*body);
            }
            BinaryExpression { left, right, .. } | LogicalExpression { left, right, .. }
            | AssignmentExpression { left, right, .. } | AssignmentPattern { left, right } => {
                f(*left);
                f(*right);
            }
            ConditionalExpression { test, consequent, alternate } => {
                f(*test);
                f(*consequent);
                f(*alternate);
            }
            SequenceExpression { expressions } => expressions.iter().copied().for_each(f),
            ImportDeclaration { specifiers, source } => {
                specifiers.iter().copied().for_each(&mut f);
                f(*source);
            }
            ImportSpecifier { imported, local } => {
                f(*imported);
                f(*local);
            }
            ImportDefaultSpecifier { local } | ImportNamespaceSpecifier { local } => f(*local),
            ExportNamedDeclaration { declaration, specifiers, source } => {
                opt(&mut f, declaration);
                specifiers.iter().copied().for_each(&mut f);
                opt(&mut f, source);
            }
            ExportDefaultDeclaration { declaration } => f(*declaration),
            ExportAllDeclaration { source } => f(*source),
            ExportSpecifier { local, exported } => {
                f(*local);
                f(*exported);
            }
            ExportDefaultSpecifier { exported } | ExportNamespaceSpecifier { exported } => f(*exported),
        }
    }
}

impl NodeKind {
    /// Rebuild this kind with every child replaced by `f(child)`.
    ///
    /// Children are visited in the same order as [`NodeKind::for_each_child`].
    /// The first error aborts the rebuild.
    pub fn try_map_children<E>(&self, mut f: impl FnMut(NodeId) -> Result<NodeId, E>) -> Result<NodeKind, E> {
        use NodeKind::*;

        fn list<E>(f: &mut dyn FnMut(NodeId) -> Result<NodeId, E>, ids: &[NodeId]) -> Result<Vec<NodeId>, E> {
            ids.iter().map(|id| f(*id)).collect()
        }
        fn opt<E>(f: &mut dyn FnMut(NodeId) -> Result<NodeId, E>, id: &Option<NodeId>) -> Result<Option<NodeId>, E> {
            id.map(|id| f(id)).transpose()
        }
        fn holes<E>(
            f: &mut dyn FnMut(NodeId) -> Result<NodeId, E>,
            ids: &[Option<NodeId>],
        ) -> Result<Vec<Option<NodeId>>, E> {
            ids.iter().map(|id| opt(f, id)).collect()
        }

        let f = &mut f as &mut dyn FnMut(NodeId) -> Result<NodeId, E>;
        Ok(match self {
            File { program } => File { program: f(*program)? },
            Program { body, source_type } => Program { body: list(f, body)?, source_type: *source_type },
            Block { body } => Block { body: list(f, body)? },
            BlockStatement { body } => BlockStatement { body: list(f, body)? },
            ClassBody { body } => ClassBody { body: list(f, body)? },
            SingleExpression { expression } => SingleExpression { expression: f(*expression)? },
            ExpressionStatement { expression } => ExpressionStatement { expression: f(*expression)? },
            ExpressionMatcher { expression } => ExpressionMatcher { expression: f(*expression)? },
            If { test, consequent, alternate, is_statement } => If {
                test: f(*test)?,
                consequent: f(*consequent)?,
                alternate: opt(f, alternate)?,
                is_statement: *is_statement,
            },
            IfStatement { test, consequent, alternate } => IfStatement {
                test: f(*test)?,
                consequent: f(*consequent)?,
                alternate: opt(f, alternate)?,
            },
            While { test, body, is_statement } => While { test: f(*test)?, body: f(*body)?, is_statement: *is_statement },
            WhileStatement { test, body } => WhileStatement { test: f(*test)?, body: f(*body)? },
            DoWhile { body, test, is_statement } => DoWhile { body: f(*body)?, test: f(*test)?, is_statement: *is_statement },
            DoWhileStatement { body, test } => DoWhileStatement { body: f(*body)?, test: f(*test)? },
            For { init, test, update, body, is_statement } => For {
                init: opt(f, init)?,
                test: opt(f, test)?,
                update: opt(f, update)?,
                body: f(*body)?,
                is_statement: *is_statement,
            },
            ForStatement { init, test, update, body } => ForStatement {
                init: opt(f, init)?,
                test: opt(f, test)?,
                update: opt(f, update)?,
                body: f(*body)?,
            },
            ForOf { left, right, body, is_await, is_statement } => ForOf {
                left: f(*left)?,
                right: f(*right)?,
                body: f(*body)?,
                is_await: *is_await,
                is_statement: *is_statement,
            },
            ForOfStatement { left, right, body, is_await } => ForOfStatement {
                left: f(*left)?,
                right: f(*right)?,
                body: f(*body)?,
                is_await: *is_await,
            },
            Switch { discriminant, cases, is_statement } => Switch {
                discriminant: f(*discriminant)?,
                cases: list(f, cases)?,
                is_statement: *is_statement,
            },
            SwitchStatement { discriminant, cases } => SwitchStatement {
                discriminant: f(*discriminant)?,
                cases: list(f, cases)?,
            },
            Case { test, body } => Case { test: opt(f, test)?, body: f(*body)? },
            SwitchCase { test, consequent } => SwitchCase { test: opt(f, test)?, consequent: list(f, consequent)? },
            Try { block, handler, finalizer, is_statement } => Try {
                block: f(*block)?,
                handler: opt(f, handler)?,
                finalizer: opt(f, finalizer)?,
                is_statement: *is_statement,
            },
            TryStatement { block, handler, finalizer } => TryStatement {
                block: f(*block)?,
                handler: opt(f, handler)?,
                finalizer: opt(f, finalizer)?,
            },
            CatchClause { param, body } => CatchClause { param: opt(f, param)?, body: f(*body)? },
            Return { argument } => Return { argument: opt(f, argument)? },
            ReturnStatement { argument } => ReturnStatement { argument: opt(f, argument)? },
            YieldExpression { argument, delegate } => YieldExpression { argument: opt(f, argument)?, delegate: *delegate },
            Throw { argument } => Throw { argument: f(*argument)? },
            ThrowStatement { argument } => ThrowStatement { argument: f(*argument)? },
            AwaitExpression { argument } => AwaitExpression { argument: f(*argument)? },
            SpreadElement { argument } => SpreadElement { argument: f(*argument)? },
            RestElement { argument } => RestElement { argument: f(*argument)? },
            ImportCall { argument } => ImportCall { argument: f(*argument)? },
            UnaryExpression { operator, argument } => UnaryExpression { operator: *operator, argument: f(*argument)? },
            UpdateExpression { operator, prefix, argument } => UpdateExpression {
                operator: *operator,
                prefix: *prefix,
                argument: f(*argument)?,
            },
            Cond { discriminant, items } => Cond { discriminant: f(*discriminant)?, items: list(f, items)? },
            CondItem { matcher, consequent } => CondItem { matcher: f(*matcher)?, consequent: f(*consequent)? },
            VariableMatcher { id } => VariableMatcher { id: f(*id)? },
            CollectionMatcher { id, collection } => CollectionMatcher { id: f(*id)?, collection: f(*collection)? },
            ObjectMatcher { properties } => ObjectMatcher { properties: list(f, properties)? },
            ObjectMatcherProperty { key, value, computed } => ObjectMatcherProperty {
                key: f(*key)?,
                value: opt(f, value)?,
                computed: *computed,
            },
            ArrayMatcher { elements } => ArrayMatcher { elements: list(f, elements)? },
            Object { properties } => Object { properties: list(f, properties)? },
            ObjectExpression { properties } => ObjectExpression { properties: list(f, properties)? },
            ObjectPattern { properties } => ObjectPattern { properties: list(f, properties)? },
            Array { elements } => Array { elements: holes(f, elements)? },
            ArrayExpression { elements } => ArrayExpression { elements: holes(f, elements)? },
            ArrayPattern { elements } => ArrayPattern { elements: holes(f, elements)? },
            CollectionLiteral { constructor, collection } => CollectionLiteral {
                constructor: f(*constructor)?,
                collection: f(*collection)?,
            },
            CollectionPattern { destructurer, pattern } => CollectionPattern {
                destructurer: f(*destructurer)?,
                pattern: f(*pattern)?,
            },
            BindExpression { object, callee } => BindExpression { object: opt(f, object)?, callee: f(*callee)? },
            OptionalMemberExpression { object, property, computed, optional } => OptionalMemberExpression {
                object: f(*object)?,
                property: f(*property)?,
                computed: *computed,
                optional: *optional,
            },
            MemberExpression { object, property, computed } => MemberExpression {
                object: f(*object)?,
                property: f(*property)?,
                computed: *computed,
            },
            OptionalCallExpression { callee, arguments, optional } => OptionalCallExpression {
                callee: f(*callee)?,
                arguments: list(f, arguments)?,
                optional: *optional,
            },
            NewExpression { callee, arguments } => NewExpression { callee: f(*callee)?, arguments: list(f, arguments)? },
            CallExpression { callee, arguments, block_param } => CallExpression {
                callee: f(*callee)?,
                arguments: list(f, arguments)?,
                block_param: opt(f, block_param)?,
            },
            SliceMember { beginning, finish } => SliceMember { beginning: opt(f, beginning)?, finish: opt(f, finish)? },
            BlockParam { params, body, is_do } => BlockParam { params: list(f, params)?, body: f(*body)?, is_do: *is_do },
            ArrowFunction { params, body, is_async, generator, curried, thin } => ArrowFunction {
                params: list(f, params)?,
                body: f(*body)?,
                is_async: *is_async,
                generator: *generator,
                curried: *curried,
                thin: *thin,
            },
            ArrowFunctionExpression { params, body, is_async } => ArrowFunctionExpression {
                params: list(f, params)?,
                body: f(*body)?,
                is_async: *is_async,
            },
            Function { id, params, body, generator, is_async, curried, declares } => Function {
                id: opt(f, id)?,
                params: list(f, params)?,
                body: f(*body)?,
                generator: *generator,
                is_async: *is_async,
                curried: *curried,
                declares: *declares,
            },
            FunctionExpression { id, params, body, generator, is_async } => FunctionExpression {
                id: opt(f, id)?,
                params: list(f, params)?,
                body: f(*body)?,
                generator: *generator,
                is_async: *is_async,
            },
            FunctionDeclaration { id, params, body, generator, is_async } => FunctionDeclaration {
                id: f(*id)?,
                params: list(f, params)?,
                body: f(*body)?,
                generator: *generator,
                is_async: *is_async,
            },
            Class { id, super_class, body, declares } => Class {
                id: opt(f, id)?,
                super_class: opt(f, super_class)?,
                body: f(*body)?,
                declares: *declares,
            },
            ClassExpression { id, super_class, body } => ClassExpression {
                id: opt(f, id)?,
                super_class: opt(f, super_class)?,
                body: f(*body)?,
            },
            ClassDeclaration { id, super_class, body } => ClassDeclaration {
                id: f(*id)?,
                super_class: opt(f, super_class)?,
                body: f(*body)?,
            },
            VariableDeclaration { kind, declarations } => VariableDeclaration {
                kind: *kind,
                declarations: list(f, declarations)?,
            },
            VariableDeclarator { id, init } => VariableDeclarator { id: f(*id)?, init: opt(f, init)? },
            TemplateLiteral { quasis, expressions } => TemplateLiteral {
                quasis: list(f, quasis)?,
                expressions: list(f, expressions)?,
            },
            TaggedTemplateExpression { tag, quasi } => TaggedTemplateExpression { tag: f(*tag)?, quasi: f(*quasi)? },
            MetaProperty { meta, property } => MetaProperty { meta: f(*meta)?, property: f(*property)? },
            ObjectProperty { key, value, computed, shorthand } => ObjectProperty {
                key: f(*key)?,
                value: f(*value)?,
                computed: *computed,
                shorthand: *shorthand,
            },
            ObjectMethod { kind, key, params, body, computed, generator, is_async } => ObjectMethod {
                kind: *kind,
                key: f(*key)?,
                params: list(f, params)?,
                body: f(*body)?,
                computed: *computed,
                generator: *generator,
                is_async: *is_async,
            },
            ClassMethod { kind, key, params, body, computed, is_static, generator, is_async } => ClassMethod {
                kind: *kind,
                key: f(*key)?,
                params: list(f, params)?,
                body: f(*body)?,
                computed: *computed,
                is_static: *is_static,
                generator: *generator,
                is_async: *is_async,
            },
            BinaryExpression { operator, left, right } => BinaryExpression {
                operator: *operator,
                left: f(*left)?,
                right: f(*right)?,
            },
            LogicalExpression { operator, left, right } => LogicalExpression {
                operator: *operator,
                left: f(*left)?,
                right: f(*right)?,
            },
            AssignmentExpression { operator, left, right } => AssignmentExpression {
                operator: *operator,
                left: f(*left)?,
                right: f(*right)?,
            },
            AssignmentPattern { left, right } => AssignmentPattern { left: f(*left)?, right: f(*right)? },
            ConditionalExpression { test, consequent, alternate } => ConditionalExpression {
                test: f(*test)?,
                consequent: f(*consequent)?,
                alternate: f(*alternate)?,
            },
            SequenceExpression { expressions } => SequenceExpression { expressions: list(f, expressions)? },
            ImportDeclaration { specifiers, source } => ImportDeclaration {
                specifiers: list(f, specifiers)?,
                source: f(*source)?,
            },
            ImportSpecifier { imported, local } => ImportSpecifier { imported: f(*imported)?, local: f(*local)? },
            ImportDefaultSpecifier { local } => ImportDefaultSpecifier { local: f(*local)? },
            ImportNamespaceSpecifier { local } => ImportNamespaceSpecifier { local: f(*local)? },
            ExportNamedDeclaration { declaration, specifiers, source } => ExportNamedDeclaration {
                declaration: opt(f, declaration)?,
                specifiers: list(f, specifiers)?,
                source: opt(f, source)?,
            },
            ExportDefaultDeclaration { declaration } => ExportDefaultDeclaration { declaration: f(*declaration)? },
            ExportAllDeclaration { source } => ExportAllDeclaration { source: f(*source)? },
            ExportSpecifier { local, exported } => ExportSpecifier { local: f(*local)?, exported: f(*exported)? },
            ExportDefaultSpecifier { exported } => ExportDefaultSpecifier { exported: f(*exported)? },
            ExportNamespaceSpecifier { exported } => ExportNamespaceSpecifier { exported: f(*exported)? },
            Break | Continue | Debugger | BreakStatement | ContinueStatement | DebuggerStatement | Identifier { .. }
            | NullLiteral | BooleanLiteral { .. } | NumericLiteral { .. } | BigIntLiteral { .. }
            | StringLiteral { .. } | RegExpLiteral { .. } | TemplateElement { .. } | ThisExpression | Super
            | Import => self.clone(),
        })
    }
}
