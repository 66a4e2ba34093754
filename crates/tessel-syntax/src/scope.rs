//! Lexical scope analysis over a [`SyntaxTree`].
//!
//! Analysis runs in two passes. The first creates scopes and records every
//! binding, hoisting `var` and function parameters to the nearest function
//! or program scope. The second classifies the remaining identifiers as
//! references and resolves each one through the scope chain. Program-level
//! bindings are treated as module bindings, so a reference is global only
//! when nothing in the chain declares its name.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::tree::{Field, NodeId, NodeKind, SyntaxTree, VariableKind};

/// Index of a scope in a [`ScopeManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

/// Index of a variable in a [`ScopeManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(usize);

/// Index of a reference in a [`ScopeManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferenceId(usize);

/// The syntactic construct that introduced a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// The program.
    Global,
    /// A function or arrow function, including its parameters.
    Function,
    /// A block statement.
    Block,
    /// The head of a `for`, `for...in` or `for...of` loop.
    For,
    /// A `catch` clause and its parameter.
    Catch,
    /// A class body.
    Class,
    /// A `switch` statement body.
    Switch,
}

/// A lexical scope.
#[derive(Debug, Clone)]
pub struct Scope {
    kind: ScopeKind,
    block: NodeId,
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
    variables: Vec<VariableId>,
    names: HashMap<String, VariableId>,
    references: Vec<ReferenceId>,
}

impl Scope {
    /// Returns the kind of construct that introduced this scope.
    #[must_use]
    pub const fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// Returns the node that introduced this scope.
    #[must_use]
    pub const fn block(&self) -> NodeId {
        self.block
    }

    /// Returns the enclosing scope.
    #[must_use]
    pub const fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Returns the directly nested scopes.
    #[must_use]
    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }

    /// Returns the variables declared directly in this scope.
    #[must_use]
    pub fn variables(&self) -> &[VariableId] {
        &self.variables
    }

    /// Returns the references that occur directly in this scope.
    #[must_use]
    pub fn references(&self) -> &[ReferenceId] {
        &self.references
    }
}

/// A named binding.
#[derive(Debug, Clone)]
pub struct Variable {
    name: String,
    scope: ScopeId,
    identifiers: Vec<NodeId>,
    references: Vec<ReferenceId>,
}

impl Variable {
    /// Returns the bound name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the scope that owns the binding.
    #[must_use]
    pub const fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Returns the declaring identifiers.
    #[must_use]
    pub fn identifiers(&self) -> &[NodeId] {
        &self.identifiers
    }

    /// Returns every reference that resolved to this binding.
    #[must_use]
    pub fn references(&self) -> &[ReferenceId] {
        &self.references
    }
}

/// A use of a name that is not itself a declaration.
#[derive(Debug, Clone)]
pub struct Reference {
    identifier: NodeId,
    from: ScopeId,
    resolved: Option<VariableId>,
}

impl Reference {
    /// Returns the referencing identifier node.
    #[must_use]
    pub const fn identifier(&self) -> NodeId {
        self.identifier
    }

    /// Returns the scope the reference occurs in.
    #[must_use]
    pub const fn scope(&self) -> ScopeId {
        self.from
    }

    /// Returns the binding the reference resolved to, or `None` for a
    /// global reference.
    #[must_use]
    pub const fn resolved(&self) -> Option<VariableId> {
        self.resolved
    }
}

/// Scope table built once per parse.
#[derive(Debug, Clone)]
pub struct ScopeManager {
    scopes: Vec<Scope>,
    variables: Vec<Variable>,
    references: Vec<Reference>,
    acquired: HashMap<NodeId, ScopeId>,
    by_identifier: HashMap<NodeId, ReferenceId>,
    declarations: HashSet<NodeId>,
}

impl ScopeManager {
    /// Analyzes `tree` and builds its scope table.
    #[must_use]
    pub fn analyze(tree: &SyntaxTree) -> Self {
        let mut manager = Self {
            scopes: Vec::new(),
            variables: Vec::new(),
            references: Vec::new(),
            acquired: HashMap::new(),
            by_identifier: HashMap::new(),
            declarations: HashSet::new(),
        };
        manager.create_scopes(tree);
        manager.declare_bindings(tree);
        manager.resolve_references(tree);
        trace!(
            scopes = manager.scopes.len(),
            variables = manager.variables.len(),
            references = manager.references.len(),
            "analyzed scopes"
        );
        manager
    }

    /// Returns the program scope.
    #[must_use]
    pub const fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Returns the scope for `id`.
    #[must_use]
    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0)
    }

    /// Returns the variable for `id`.
    #[must_use]
    pub fn variable(&self, id: VariableId) -> Option<&Variable> {
        self.variables.get(id.0)
    }

    /// Returns the reference for `id`.
    #[must_use]
    pub fn reference(&self, id: ReferenceId) -> Option<&Reference> {
        self.references.get(id.0)
    }

    /// Returns the scope introduced by exactly `node`, if any.
    #[must_use]
    pub fn acquire(&self, node: NodeId) -> Option<ScopeId> {
        self.acquired.get(&node).copied()
    }

    /// Returns the innermost scope enclosing `node`.
    #[must_use]
    pub fn scope_of(&self, tree: &SyntaxTree, node: NodeId) -> ScopeId {
        std::iter::once(node)
            .chain(tree.ancestors(node))
            .find_map(|candidate| self.acquire(candidate))
            .unwrap_or_else(|| self.global())
    }

    /// Returns the parent of `scope`.
    #[must_use]
    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scope(scope).and_then(Scope::parent)
    }

    /// Returns the direct children of `scope`.
    #[must_use]
    pub fn children(&self, scope: ScopeId) -> &[ScopeId] {
        self.scope(scope).map(Scope::children).unwrap_or_default()
    }

    /// Returns the variables declared directly in `scope`.
    pub fn variables(&self, scope: ScopeId) -> impl Iterator<Item = &Variable> + '_ {
        self.scope(scope)
            .map(Scope::variables)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.variable(*id))
    }

    /// Returns the references that occur directly in `scope`.
    pub fn references(&self, scope: ScopeId) -> impl Iterator<Item = &Reference> + '_ {
        self.scope(scope)
            .map(Scope::references)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.reference(*id))
    }

    /// Returns `scope` followed by every nested scope, in creation order.
    #[must_use]
    pub fn descendants(&self, scope: ScopeId) -> Vec<ScopeId> {
        let mut out = Vec::new();
        let mut stack = vec![scope];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Returns the binding of `name` declared directly in `scope`.
    #[must_use]
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<VariableId> {
        self.scope(scope).and_then(|found| found.names.get(name).copied())
    }

    /// Resolves `name` from `scope` outward through the scope chain.
    #[must_use]
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<VariableId> {
        std::iter::successors(Some(scope), |current| self.parent(*current))
            .find_map(|current| self.lookup(current, name))
    }

    /// Returns the reference recorded for an identifier node.
    #[must_use]
    pub fn reference_for(&self, identifier: NodeId) -> Option<&Reference> {
        self.by_identifier
            .get(&identifier)
            .and_then(|id| self.reference(*id))
    }

    /// Returns whether `identifier` declares a binding.
    #[must_use]
    pub fn is_declaration(&self, identifier: NodeId) -> bool {
        self.declarations.contains(&identifier)
    }

    fn create_scopes(&mut self, tree: &SyntaxTree) {
        let root = tree.root();
        self.push_scope(ScopeKind::Global, root, None);
        for node in tree.descendants(root) {
            if node == root {
                continue;
            }
            let Some(kind) = scope_kind(tree, node) else {
                continue;
            };
            let parent = tree
                .ancestors(node)
                .find_map(|ancestor| self.acquire(ancestor));
            self.push_scope(kind, node, parent);
        }
    }

    fn push_scope(&mut self, kind: ScopeKind, block: NodeId, parent: Option<ScopeId>) {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            kind,
            block,
            parent,
            children: Vec::new(),
            variables: Vec::new(),
            names: HashMap::new(),
            references: Vec::new(),
        });
        if let Some(parent_scope) = parent.and_then(|parent_id| self.scopes.get_mut(parent_id.0)) {
            parent_scope.children.push(id);
        }
        self.acquired.insert(block, id);
    }

    fn declare_bindings(&mut self, tree: &SyntaxTree) {
        for node in tree.descendants(tree.root()) {
            match tree.kind(node) {
                NodeKind::VariableDeclaration => {
                    let hoisted = tree[node].variable_kind() == Some(VariableKind::Var);
                    let target = if hoisted {
                        self.function_scope_of(tree, node)
                    } else {
                        self.scope_of(tree, node)
                    };
                    for declarator in tree.field_list(node, Field::Declarations) {
                        if let Some(pattern) = tree.field(declarator, Field::Id) {
                            self.declare_pattern(tree, target, pattern);
                        }
                    }
                }
                NodeKind::FunctionDeclaration | NodeKind::ClassDeclaration => {
                    let outer = tree
                        .parent(node)
                        .map_or_else(|| self.global(), |parent| self.scope_of(tree, parent));
                    if let Some(name) = tree.field(node, Field::Id) {
                        self.declare(tree, outer, name);
                    }
                    if tree.is(node, NodeKind::FunctionDeclaration) {
                        self.declare_parameters(tree, node);
                    }
                }
                NodeKind::FunctionExpression | NodeKind::ClassExpression => {
                    let own = self.scope_of(tree, node);
                    if let Some(name) = tree.field(node, Field::Id) {
                        self.declare(tree, own, name);
                    }
                    if tree.is(node, NodeKind::FunctionExpression) {
                        self.declare_parameters(tree, node);
                    }
                }
                NodeKind::ArrowFunctionExpression => self.declare_parameters(tree, node),
                NodeKind::CatchClause => {
                    let own = self.scope_of(tree, node);
                    if let Some(param) = tree.field(node, Field::Param) {
                        self.declare_pattern(tree, own, param);
                    }
                }
                NodeKind::ImportDefaultSpecifier
                | NodeKind::ImportNamespaceSpecifier
                | NodeKind::ImportSpecifier => {
                    if let Some(local) = tree.field(node, Field::Local) {
                        self.declare(tree, self.global(), local);
                    }
                    if let Some(imported) = tree.field(node, Field::Imported) {
                        self.declarations.insert(imported);
                    }
                }
                _ => {}
            }
        }
    }

    fn declare_parameters(&mut self, tree: &SyntaxTree, function: NodeId) {
        let own = self.scope_of(tree, function);
        for param in tree.field_list(function, Field::Params) {
            self.declare_pattern(tree, own, param);
        }
    }

    fn declare_pattern(&mut self, tree: &SyntaxTree, scope: ScopeId, pattern: NodeId) {
        for identifier in pattern_identifiers(tree, pattern) {
            self.declare(tree, scope, identifier);
        }
    }

    fn declare(&mut self, tree: &SyntaxTree, scope: ScopeId, identifier: NodeId) {
        let Some(name) = tree.name(identifier) else {
            return;
        };
        self.declarations.insert(identifier);
        if let Some(existing) = self.lookup(scope, name) {
            if let Some(variable) = self.variables.get_mut(existing.0) {
                variable.identifiers.push(identifier);
            }
            return;
        }
        let id = VariableId(self.variables.len());
        self.variables.push(Variable {
            name: name.to_owned(),
            scope,
            identifiers: vec![identifier],
            references: Vec::new(),
        });
        if let Some(owner) = self.scopes.get_mut(scope.0) {
            owner.variables.push(id);
            owner.names.insert(name.to_owned(), id);
        }
    }

    fn function_scope_of(&self, tree: &SyntaxTree, node: NodeId) -> ScopeId {
        let mut current = self.scope_of(tree, node);
        while let Some(scope) = self.scope(current) {
            if matches!(scope.kind, ScopeKind::Function | ScopeKind::Global) {
                return current;
            }
            match scope.parent {
                Some(parent) => current = parent,
                None => return current,
            }
        }
        current
    }

    fn resolve_references(&mut self, tree: &SyntaxTree) {
        for node in tree.descendants(tree.root()) {
            if !tree.is(node, NodeKind::Identifier)
                || self.declarations.contains(&node)
                || !is_reference_position(tree, node)
            {
                continue;
            }
            let Some(name) = tree.name(node) else {
                continue;
            };
            let from = self.scope_of(tree, node);
            let resolved = self.resolve(from, name);
            let id = ReferenceId(self.references.len());
            self.references.push(Reference {
                identifier: node,
                from,
                resolved,
            });
            self.by_identifier.insert(node, id);
            if let Some(scope) = self.scopes.get_mut(from.0) {
                scope.references.push(id);
            }
            if let Some(variable) = resolved.and_then(|var| self.variables.get_mut(var.0)) {
                variable.references.push(id);
            }
        }
    }
}

fn scope_kind(tree: &SyntaxTree, node: NodeId) -> Option<ScopeKind> {
    match tree.kind(node) {
        kind if kind.is_function() => Some(ScopeKind::Function),
        NodeKind::BlockStatement => {
            let is_function_body = tree
                .parent(node)
                .is_some_and(|parent| tree.kind(parent).is_function());
            (!is_function_body).then_some(ScopeKind::Block)
        }
        NodeKind::ForStatement | NodeKind::ForInStatement | NodeKind::ForOfStatement => {
            Some(ScopeKind::For)
        }
        NodeKind::CatchClause => Some(ScopeKind::Catch),
        NodeKind::ClassDeclaration | NodeKind::ClassExpression => Some(ScopeKind::Class),
        NodeKind::SwitchStatement => Some(ScopeKind::Switch),
        _ => None,
    }
}

/// Collects the identifiers bound by a declaration pattern.
fn pattern_identifiers(tree: &SyntaxTree, pattern: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![pattern];
    while let Some(current) = stack.pop() {
        match tree.kind(current) {
            NodeKind::Identifier => out.push(current),
            NodeKind::ObjectPattern => {
                for property in tree.field_list(current, Field::Properties) {
                    if tree.is(property, NodeKind::Property) {
                        stack.extend(tree.field(property, Field::Value));
                    } else {
                        stack.push(property);
                    }
                }
            }
            NodeKind::ArrayPattern => stack.extend(tree.field_list(current, Field::Elements)),
            NodeKind::AssignmentPattern => stack.extend(tree.field(current, Field::Left)),
            NodeKind::RestElement => stack.extend(tree.field(current, Field::Argument)),
            _ => {}
        }
    }
    out
}

/// Returns whether an identifier in this position names a variable rather
/// than a property, key or label.
fn is_reference_position(tree: &SyntaxTree, identifier: NodeId) -> bool {
    let Some(parent) = tree.parent(identifier) else {
        return true;
    };
    let parent_node = &tree[parent];
    match (parent_node.kind(), tree.role(identifier)) {
        (NodeKind::MemberExpression, Some(Field::Property))
        | (
            NodeKind::Property | NodeKind::MethodDefinition | NodeKind::PropertyDefinition,
            Some(Field::Key),
        ) => parent_node.is_computed(),
        (
            NodeKind::LabeledStatement | NodeKind::BreakStatement | NodeKind::ContinueStatement,
            Some(Field::Label),
        ) => false,
        _ => true,
    }
}
