//! Immutable ESTree-shaped syntax tree stored in an arena.
//!
//! Nodes are addressed by [`NodeId`]. Every node records its parent as a
//! plain index, so upward queries never need shared ownership. Ranges are
//! half-open byte ranges that exclude redundant parentheses, matching the
//! ESTree convention.

use std::ops::{Index, Range};

use strum::{Display, EnumString, IntoStaticStr};

/// Index of a node inside its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the arena index of this node.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// ESTree node type names.
///
/// The string form (via `Display`) is the ESTree `type` attribute used by
/// selectors, e.g. `"CallExpression"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[expect(missing_docs, reason = "variants are the ESTree type names")]
pub enum NodeKind {
    Program,
    ExpressionStatement,
    BlockStatement,
    EmptyStatement,
    DebuggerStatement,
    ReturnStatement,
    ThrowStatement,
    IfStatement,
    WhileStatement,
    DoWhileStatement,
    ForStatement,
    ForInStatement,
    ForOfStatement,
    SwitchStatement,
    SwitchCase,
    WithStatement,
    TryStatement,
    CatchClause,
    LabeledStatement,
    BreakStatement,
    ContinueStatement,
    VariableDeclaration,
    VariableDeclarator,
    FunctionDeclaration,
    ClassDeclaration,
    ClassBody,
    MethodDefinition,
    PropertyDefinition,
    ImportDeclaration,
    ImportSpecifier,
    ImportDefaultSpecifier,
    ImportNamespaceSpecifier,
    ExportNamedDeclaration,
    ExportDefaultDeclaration,
    Identifier,
    PrivateIdentifier,
    Literal,
    TemplateLiteral,
    TemplateElement,
    TaggedTemplateExpression,
    ThisExpression,
    Super,
    ArrayExpression,
    ObjectExpression,
    Property,
    FunctionExpression,
    ArrowFunctionExpression,
    ClassExpression,
    CallExpression,
    NewExpression,
    MemberExpression,
    SpreadElement,
    SequenceExpression,
    AssignmentExpression,
    ConditionalExpression,
    LogicalExpression,
    BinaryExpression,
    UnaryExpression,
    UpdateExpression,
    AwaitExpression,
    YieldExpression,
    ImportExpression,
    MetaProperty,
    ObjectPattern,
    ArrayPattern,
    AssignmentPattern,
    RestElement,
    TSAsExpression,
    TSSatisfiesExpression,
    TSNonNullExpression,
    Unknown,
}

impl NodeKind {
    /// Returns the ESTree type name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Returns whether nodes of this kind create a function boundary.
    #[must_use]
    pub const fn is_function(self) -> bool {
        matches!(
            self,
            Self::FunctionDeclaration | Self::FunctionExpression | Self::ArrowFunctionExpression
        )
    }
}

/// Role of a child inside its parent, named after the ESTree property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "camelCase")]
#[expect(missing_docs, reason = "variants are the ESTree property names")]
pub enum Field {
    Body,
    Expression,
    Expressions,
    Callee,
    Arguments,
    Object,
    Property,
    Left,
    Right,
    Argument,
    Test,
    Consequent,
    Alternate,
    Init,
    Update,
    Params,
    Id,
    Declarations,
    Elements,
    Properties,
    Key,
    Value,
    Quasis,
    Tag,
    Quasi,
    Discriminant,
    Cases,
    Block,
    Handler,
    Param,
    Finalizer,
    Label,
    SuperClass,
    Specifiers,
    Local,
    Imported,
    Source,
    Declaration,
    Children,
}

/// Literal value categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    /// A quoted string.
    String,
    /// A numeric literal.
    Number,
    /// A `BigInt` literal (`1n`).
    BigInt,
    /// `true` or `false`.
    Boolean,
    /// `null`.
    Null,
    /// A regular expression literal.
    RegExp,
}

/// Declaration keyword of a `VariableDeclaration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum VariableKind {
    /// `var`
    Var,
    /// `let`
    Let,
    /// `const`
    Const,
}

/// Boolean attributes recorded on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeFlags(u16);

impl NodeFlags {
    /// Optional call or member access (`?.`).
    pub const OPTIONAL: Self = Self(1);
    /// Computed member access or key (`a[b]`, `{ [k]: v }`).
    pub const COMPUTED: Self = Self(1 << 1);
    /// Prefix update expression (`++a`).
    pub const PREFIX: Self = Self(1 << 2);
    /// Shorthand property (`{ a }`).
    pub const SHORTHAND: Self = Self(1 << 3);
    /// `async` function.
    pub const ASYNC: Self = Self(1 << 4);
    /// Generator function.
    pub const GENERATOR: Self = Self(1 << 5);
    /// Delegating yield (`yield*`).
    pub const DELEGATE: Self = Self(1 << 6);
    /// `static` class member.
    pub const STATIC: Self = Self(1 << 7);
    /// Arrow function with an expression body.
    pub const EXPRESSION_BODY: Self = Self(1 << 8);

    /// Returns whether every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub(crate) const fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

/// A single node in the arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) raw_kind: &'static str,
    pub(crate) range: Range<usize>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) fields: Vec<(Field, NodeId)>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) flags: NodeFlags,
    pub(crate) operator: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) literal: Option<LiteralKind>,
    pub(crate) raw: Option<String>,
    pub(crate) variable_kind: Option<VariableKind>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, raw_kind: &'static str, range: Range<usize>) -> Self {
        Self {
            kind,
            raw_kind,
            range,
            parent: None,
            fields: Vec::new(),
            children: Vec::new(),
            flags: NodeFlags::default(),
            operator: None,
            name: None,
            literal: None,
            raw: None,
            variable_kind: None,
        }
    }

    /// Returns the ESTree kind.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns the Tree-sitter kind this node was lowered from.
    #[must_use]
    pub const fn raw_kind(&self) -> &'static str {
        self.raw_kind
    }

    /// Returns the byte range, excluding redundant parentheses.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Returns the inclusive start offset.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.range.start
    }

    /// Returns the exclusive end offset.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.range.end
    }

    /// Returns the parent node, or `None` for the program root.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the role-tagged children in source order.
    #[must_use]
    pub fn fields(&self) -> &[(Field, NodeId)] {
        &self.fields
    }

    /// Returns the distinct children sorted by position.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns the operator of binary, logical, unary, update and
    /// assignment expressions.
    #[must_use]
    pub fn operator(&self) -> Option<&str> {
        self.operator.as_deref()
    }

    /// Returns the name of an `Identifier` or `PrivateIdentifier`.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the literal category of a `Literal`.
    #[must_use]
    pub const fn literal(&self) -> Option<LiteralKind> {
        self.literal
    }

    /// Returns the source text of a `Literal` or `TemplateElement`.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Returns the keyword of a `VariableDeclaration`.
    #[must_use]
    pub const fn variable_kind(&self) -> Option<VariableKind> {
        self.variable_kind
    }

    /// Returns the recorded flags.
    #[must_use]
    pub const fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// Returns whether the node is an optional call or member access.
    ///
    /// Nodes that cannot be optional report `false`.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.flags.contains(NodeFlags::OPTIONAL)
    }

    /// Returns whether the node is a computed member access or key.
    #[must_use]
    pub const fn is_computed(&self) -> bool {
        self.flags.contains(NodeFlags::COMPUTED)
    }

    /// Returns the first child in the given role.
    #[must_use]
    pub fn field(&self, field: Field) -> Option<NodeId> {
        self.fields
            .iter()
            .find(|(role, _)| *role == field)
            .map(|(_, id)| *id)
    }

    /// Returns every child in the given role, in source order.
    pub fn field_list(&self, field: Field) -> impl Iterator<Item = NodeId> + '_ {
        self.fields
            .iter()
            .filter(move |(role, _)| *role == field)
            .map(|(_, id)| *id)
    }
}

/// Arena holding every node of one parse.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl SyntaxTree {
    pub(crate) fn from_nodes(mut nodes: Vec<Node>, root: NodeId) -> Self {
        let ranges: Vec<Range<usize>> = nodes.iter().map(Node::range).collect();
        for node in &mut nodes {
            let mut children: Vec<NodeId> = node.fields.iter().map(|(_, id)| *id).collect();
            children.sort_by_key(|id| {
                ranges
                    .get(id.index())
                    .map_or((0, 0), |range| (range.start, range.end))
            });
            children.dedup();
            node.children = children;
        }
        Self { nodes, root }
    }

    /// Returns the `Program` node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node for `id`, or `None` when the id belongs to another tree.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Returns the kind of `id`.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.get(id).map_or(NodeKind::Unknown, Node::kind)
    }

    /// Returns whether `id` has the given kind.
    #[must_use]
    pub fn is(&self, id: NodeId, kind: NodeKind) -> bool {
        self.kind(id) == kind
    }

    /// Returns the parent of `id`.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    /// Returns the first child of `id` in the given role.
    #[must_use]
    pub fn field(&self, id: NodeId, field: Field) -> Option<NodeId> {
        self.get(id).and_then(|node| node.field(field))
    }

    /// Returns every child of `id` in the given role.
    #[must_use]
    pub fn field_list(&self, id: NodeId, field: Field) -> Vec<NodeId> {
        self.get(id)
            .map(|node| node.field_list(field).collect())
            .unwrap_or_default()
    }

    /// Returns the role `child` plays inside its parent.
    #[must_use]
    pub fn role(&self, child: NodeId) -> Option<Field> {
        let parent = self.parent(child)?;
        self.get(parent)?
            .fields
            .iter()
            .find(|(_, id)| *id == child)
            .map(|(role, _)| *role)
    }

    /// Returns the name of an identifier node.
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(Node::name)
    }

    /// Returns the byte range of `id`.
    #[must_use]
    pub fn range(&self, id: NodeId) -> Range<usize> {
        self.get(id).map(Node::range).unwrap_or_default()
    }

    /// Returns the text of `id` inside `source`.
    #[must_use]
    pub fn text<'s>(&self, id: NodeId, source: &'s str) -> &'s str {
        source.get(self.range(id)).unwrap_or_default()
    }

    /// Returns the ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    /// Returns `id` and all of its descendants in pre-order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(node) = self.get(current) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Returns every node of the given kind in pre-order.
    #[must_use]
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|id| self.is(*id, kind))
            .collect()
    }

    /// Returns the deepest node whose range contains `offset`.
    #[must_use]
    pub fn node_containing(&self, offset: usize) -> NodeId {
        let mut current = self.root;
        'descend: loop {
            let Some(node) = self.get(current) else {
                return current;
            };
            for child in &node.children {
                if self.range(*child).contains(&offset) {
                    current = *child;
                    continue 'descend;
                }
            }
            return current;
        }
    }
}

impl Index<NodeId> for SyntaxTree {
    type Output = Node;

    #[expect(
        clippy::indexing_slicing,
        reason = "node ids are only minted by the tree that owns them"
    )]
    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.index()]
    }
}
