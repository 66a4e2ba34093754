//! Lowering from the Tree-sitter concrete tree to the ESTree-shaped arena.
//!
//! Parenthesized expressions are unwrapped so node ranges never include
//! redundant parentheses. Type-only TypeScript constructs are dropped, and
//! anything without an ESTree counterpart becomes [`NodeKind::Unknown`] with
//! its named children attached under [`Field::Children`].

use std::ops::Range;

use tracing::trace;

use crate::tree::{Field, LiteralKind, Node, NodeFlags, NodeId, NodeKind, SyntaxTree, VariableKind};

type TsNode<'t> = tree_sitter::Node<'t>;

/// Lowers a parsed Tree-sitter tree into a [`SyntaxTree`].
pub(crate) fn lower(root: TsNode<'_>, source: &str) -> SyntaxTree {
    let mut lowerer = Lowerer {
        source,
        nodes: Vec::new(),
    };
    let program = lowerer.alloc(NodeKind::Program, root.kind(), 0..source.len());
    for child in named_children(root) {
        let statement = lowerer.lower(child);
        lowerer.attach(program, Field::Body, statement);
    }
    trace!(nodes = lowerer.nodes.len(), "lowered syntax tree");
    SyntaxTree::from_nodes(lowerer.nodes, program)
}

struct Lowerer<'s> {
    source: &'s str,
    nodes: Vec<Node>,
}

impl<'s> Lowerer<'s> {
    fn alloc(&mut self, kind: NodeKind, raw_kind: &'static str, range: Range<usize>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::new(kind, raw_kind, range));
        id
    }

    fn alloc_for(&mut self, kind: NodeKind, ts: TsNode<'_>) -> NodeId {
        self.alloc(kind, ts.kind(), ts.byte_range())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    fn attach(&mut self, parent: NodeId, field: Field, child: Option<NodeId>) {
        let Some(child_id) = child else {
            return;
        };
        if let Some(node) = self.node_mut(child_id) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.fields.push((field, child_id));
        }
    }

    fn flag(&mut self, id: NodeId, flag: NodeFlags) {
        if let Some(node) = self.node_mut(id) {
            node.flags.insert(flag);
        }
    }

    fn set_operator(&mut self, id: NodeId, operator: &str) {
        if let Some(node) = self.node_mut(id) {
            node.operator = Some(operator.to_owned());
        }
    }

    fn text(&self, ts: TsNode<'_>) -> &'s str {
        self.source.get(ts.byte_range()).unwrap_or_default()
    }

    fn lower_field(&mut self, ts: TsNode<'_>, name: &str) -> Option<NodeId> {
        ts.child_by_field_name(name).and_then(|child| self.lower(child))
    }

    fn attach_field(&mut self, parent: NodeId, field: Field, ts: TsNode<'_>, name: &str) {
        let child = self.lower_field(ts, name);
        self.attach(parent, field, child);
    }

    fn attach_all(&mut self, parent: NodeId, field: Field, children: Vec<TsNode<'_>>) {
        for child in children {
            let lowered = self.lower(child);
            self.attach(parent, field, lowered);
        }
    }

    fn lower(&mut self, ts: TsNode<'_>) -> Option<NodeId> {
        let kind = ts.kind();
        if is_skipped(kind) {
            return None;
        }
        match kind {
            "parenthesized_expression" | "else_clause" => {
                first_named(ts).and_then(|inner| self.lower(inner))
            }
            "finally_clause" | "class_static_block" => self.lower_field(ts, "body"),
            "expression_statement" => Some(self.unary_node(ts, NodeKind::ExpressionStatement, Field::Expression)),
            "statement_block" => Some(self.list_node(ts, NodeKind::BlockStatement, Field::Body)),
            "empty_statement" => Some(self.alloc_for(NodeKind::EmptyStatement, ts)),
            "debugger_statement" => Some(self.alloc_for(NodeKind::DebuggerStatement, ts)),
            "return_statement" => Some(self.unary_node(ts, NodeKind::ReturnStatement, Field::Argument)),
            "throw_statement" => Some(self.unary_node(ts, NodeKind::ThrowStatement, Field::Argument)),
            "if_statement" => Some(self.fields_node(
                ts,
                NodeKind::IfStatement,
                &[
                    (Field::Test, "condition"),
                    (Field::Consequent, "consequence"),
                    (Field::Alternate, "alternative"),
                ],
            )),
            "while_statement" => Some(self.fields_node(
                ts,
                NodeKind::WhileStatement,
                &[(Field::Test, "condition"), (Field::Body, "body")],
            )),
            "do_statement" => Some(self.fields_node(
                ts,
                NodeKind::DoWhileStatement,
                &[(Field::Body, "body"), (Field::Test, "condition")],
            )),
            "with_statement" => Some(self.fields_node(
                ts,
                NodeKind::WithStatement,
                &[(Field::Object, "object"), (Field::Body, "body")],
            )),
            "labeled_statement" => Some(self.fields_node(
                ts,
                NodeKind::LabeledStatement,
                &[(Field::Label, "label"), (Field::Body, "body")],
            )),
            "break_statement" => Some(self.fields_node(ts, NodeKind::BreakStatement, &[(Field::Label, "label")])),
            "continue_statement" => {
                Some(self.fields_node(ts, NodeKind::ContinueStatement, &[(Field::Label, "label")]))
            }
            "for_statement" => Some(self.lower_for(ts)),
            "for_in_statement" => Some(self.lower_for_in(ts)),
            "switch_statement" => Some(self.lower_switch(ts)),
            "switch_case" | "switch_default" => Some(self.lower_switch_case(ts)),
            "try_statement" => Some(self.fields_node(
                ts,
                NodeKind::TryStatement,
                &[
                    (Field::Block, "body"),
                    (Field::Handler, "handler"),
                    (Field::Finalizer, "finalizer"),
                ],
            )),
            "catch_clause" => Some(self.fields_node(
                ts,
                NodeKind::CatchClause,
                &[(Field::Param, "parameter"), (Field::Body, "body")],
            )),
            "variable_declaration" | "lexical_declaration" => Some(self.lower_declaration(ts)),
            "variable_declarator" => Some(self.fields_node(
                ts,
                NodeKind::VariableDeclarator,
                &[(Field::Id, "name"), (Field::Init, "value")],
            )),
            "function_declaration" | "generator_function_declaration" => {
                Some(self.lower_function(ts, NodeKind::FunctionDeclaration))
            }
            "function_expression" | "function" | "generator_function" => {
                Some(self.lower_function(ts, NodeKind::FunctionExpression))
            }
            "arrow_function" => Some(self.lower_arrow(ts)),
            "class_declaration" | "abstract_class_declaration" => {
                Some(self.lower_class(ts, NodeKind::ClassDeclaration))
            }
            "class" => Some(self.lower_class(ts, NodeKind::ClassExpression)),
            "class_body" => Some(self.list_node(ts, NodeKind::ClassBody, Field::Body)),
            "method_definition" => Some(self.lower_method(ts)),
            "public_field_definition" | "field_definition" => Some(self.lower_field_definition(ts)),
            "pair" | "pair_pattern" | "shorthand_property_identifier" | "shorthand_property_identifier_pattern"
            | "object_assignment_pattern" => Some(self.lower_property(ts)),
            "object" => Some(self.list_node(ts, NodeKind::ObjectExpression, Field::Properties)),
            "object_pattern" => Some(self.list_node(ts, NodeKind::ObjectPattern, Field::Properties)),
            "array" => Some(self.list_node(ts, NodeKind::ArrayExpression, Field::Elements)),
            "array_pattern" => Some(self.list_node(ts, NodeKind::ArrayPattern, Field::Elements)),
            "spread_element" => Some(self.unary_node(ts, NodeKind::SpreadElement, Field::Argument)),
            "rest_pattern" => Some(self.unary_node(ts, NodeKind::RestElement, Field::Argument)),
            "assignment_pattern" => Some(self.fields_node(
                ts,
                NodeKind::AssignmentPattern,
                &[(Field::Left, "left"), (Field::Right, "right")],
            )),
            "required_parameter" | "optional_parameter" => self.lower_parameter(ts),
            "identifier" | "property_identifier" | "statement_identifier" | "undefined" => {
                Some(self.lower_identifier(ts))
            }
            "private_property_identifier" => Some(self.lower_private_identifier(ts)),
            "this" => Some(self.alloc_for(NodeKind::ThisExpression, ts)),
            "super" => Some(self.alloc_for(NodeKind::Super, ts)),
            "number" | "string" | "regex" | "true" | "false" | "null" => Some(self.lower_literal(ts)),
            "template_string" => Some(self.lower_template(ts)),
            "call_expression" => Some(self.lower_call(ts)),
            "new_expression" => Some(self.lower_new(ts)),
            "member_expression" => Some(self.lower_member(ts, "property", false)),
            "subscript_expression" => Some(self.lower_member(ts, "index", true)),
            "meta_property" => Some(self.alloc_for(NodeKind::MetaProperty, ts)),
            "sequence_expression" => Some(self.lower_sequence(ts)),
            "assignment_expression" | "augmented_assignment_expression" => Some(self.lower_assignment(ts)),
            "ternary_expression" => Some(self.fields_node(
                ts,
                NodeKind::ConditionalExpression,
                &[
                    (Field::Test, "condition"),
                    (Field::Consequent, "consequence"),
                    (Field::Alternate, "alternative"),
                ],
            )),
            "binary_expression" => Some(self.lower_binary(ts)),
            "unary_expression" => Some(self.lower_unary(ts)),
            "update_expression" => Some(self.lower_update(ts)),
            "await_expression" => Some(self.unary_node(ts, NodeKind::AwaitExpression, Field::Argument)),
            "yield_expression" => Some(self.lower_yield(ts)),
            "as_expression" => Some(self.unary_node(ts, NodeKind::TSAsExpression, Field::Expression)),
            "satisfies_expression" => {
                Some(self.unary_node(ts, NodeKind::TSSatisfiesExpression, Field::Expression))
            }
            "non_null_expression" => Some(self.unary_node(ts, NodeKind::TSNonNullExpression, Field::Expression)),
            "import_statement" => Some(self.lower_import(ts)),
            "export_statement" => Some(self.lower_export(ts)),
            _ if is_opaque(kind) => Some(self.alloc_for(NodeKind::Unknown, ts)),
            _ => Some(self.list_node(ts, NodeKind::Unknown, Field::Children)),
        }
    }

    /// A node whose first named child fills a single role.
    fn unary_node(&mut self, ts: TsNode<'_>, kind: NodeKind, field: Field) -> NodeId {
        let id = self.alloc_for(kind, ts);
        let child = first_named(ts).and_then(|inner| self.lower(inner));
        self.attach(id, field, child);
        id
    }

    /// A node whose named children all fill the same list role.
    fn list_node(&mut self, ts: TsNode<'_>, kind: NodeKind, field: Field) -> NodeId {
        let id = self.alloc_for(kind, ts);
        self.attach_all(id, field, named_children(ts));
        id
    }

    /// A node whose roles map one-to-one onto Tree-sitter fields.
    fn fields_node(&mut self, ts: TsNode<'_>, kind: NodeKind, fields: &[(Field, &str)]) -> NodeId {
        let id = self.alloc_for(kind, ts);
        for (field, name) in fields {
            self.attach_field(id, *field, ts, name);
        }
        id
    }

    fn lower_identifier(&mut self, ts: TsNode<'_>) -> NodeId {
        let id = self.alloc_for(NodeKind::Identifier, ts);
        let name = self.text(ts).to_owned();
        if let Some(node) = self.node_mut(id) {
            node.name = Some(name);
        }
        id
    }

    fn lower_private_identifier(&mut self, ts: TsNode<'_>) -> NodeId {
        let id = self.alloc_for(NodeKind::PrivateIdentifier, ts);
        let name = self.text(ts).trim_start_matches('#').to_owned();
        if let Some(node) = self.node_mut(id) {
            node.name = Some(name);
        }
        id
    }

    fn lower_literal(&mut self, ts: TsNode<'_>) -> NodeId {
        let literal = match ts.kind() {
            "number" if self.text(ts).ends_with('n') => LiteralKind::BigInt,
            "number" => LiteralKind::Number,
            "string" => LiteralKind::String,
            "regex" => LiteralKind::RegExp,
            "null" => LiteralKind::Null,
            _ => LiteralKind::Boolean,
        };
        let id = self.alloc_for(NodeKind::Literal, ts);
        let raw = self.text(ts).to_owned();
        if let Some(node) = self.node_mut(id) {
            node.literal = Some(literal);
            node.raw = Some(raw);
        }
        id
    }

    fn lower_template(&mut self, ts: TsNode<'_>) -> NodeId {
        let id = self.alloc_for(NodeKind::TemplateLiteral, ts);
        let mut chunk_start = ts.start_byte();
        let mut cursor = ts.walk();
        let substitutions: Vec<TsNode<'_>> = ts
            .children(&mut cursor)
            .filter(|child| child.kind() == "template_substitution")
            .collect();
        for substitution in substitutions {
            let element =
                self.template_element(chunk_start..substitution.start_byte().saturating_add(2));
            self.attach(id, Field::Quasis, Some(element));
            let expression = first_named(substitution).and_then(|inner| self.lower(inner));
            self.attach(id, Field::Expressions, expression);
            chunk_start = substitution.end_byte().saturating_sub(1);
        }
        let tail = self.template_element(chunk_start..ts.end_byte());
        self.attach(id, Field::Quasis, Some(tail));
        id
    }

    /// Allocates a quasi whose range includes its delimiters; `raw` excludes them.
    fn template_element(&mut self, range: Range<usize>) -> NodeId {
        let text = self.source.get(range.clone()).unwrap_or_default();
        let body = text.strip_prefix(['`', '}']).unwrap_or(text);
        let raw = body
            .strip_suffix("${")
            .or_else(|| body.strip_suffix('`'))
            .unwrap_or(body)
            .to_owned();
        let id = self.alloc(NodeKind::TemplateElement, "template_chunk", range);
        if let Some(node) = self.node_mut(id) {
            node.raw = Some(raw);
        }
        id
    }

    fn lower_declaration(&mut self, ts: TsNode<'_>) -> NodeId {
        let keyword = if ts.kind() == "variable_declaration" {
            Some(VariableKind::Var)
        } else {
            ts.child_by_field_name("kind")
                .and_then(|kind| self.text(kind).parse().ok())
        };
        let id = self.alloc_for(NodeKind::VariableDeclaration, ts);
        if let Some(node) = self.node_mut(id) {
            node.variable_kind = keyword;
        }
        let declarators = named_children(ts)
            .into_iter()
            .filter(|child| child.kind() == "variable_declarator")
            .collect();
        self.attach_all(id, Field::Declarations, declarators);
        id
    }

    fn lower_for(&mut self, ts: TsNode<'_>) -> NodeId {
        let id = self.alloc_for(NodeKind::ForStatement, ts);
        for (field, name) in [
            (Field::Init, "initializer"),
            (Field::Test, "condition"),
            (Field::Update, "increment"),
        ] {
            let child = ts.child_by_field_name(name).and_then(|child| match child.kind() {
                "empty_statement" | ";" => None,
                "expression_statement" => first_named(child).and_then(|inner| self.lower(inner)),
                _ => self.lower(child),
            });
            self.attach(id, field, child);
        }
        self.attach_field(id, Field::Body, ts, "body");
        id
    }

    fn lower_for_in(&mut self, ts: TsNode<'_>) -> NodeId {
        let is_of = ts
            .child_by_field_name("operator")
            .is_some_and(|operator| self.text(operator) == "of");
        let kind = if is_of { NodeKind::ForOfStatement } else { NodeKind::ForInStatement };
        let id = self.alloc_for(kind, ts);
        let left = match (ts.child_by_field_name("kind"), ts.child_by_field_name("left")) {
            (Some(keyword), Some(target)) => {
                let range = keyword.start_byte()..target.end_byte();
                let declaration = self.alloc(NodeKind::VariableDeclaration, ts.kind(), range.clone());
                let variable_kind = self.text(keyword).parse().ok();
                if let Some(node) = self.node_mut(declaration) {
                    node.variable_kind = variable_kind;
                }
                let declarator = self.alloc(NodeKind::VariableDeclarator, ts.kind(), target.byte_range());
                let pattern = self.lower(target);
                self.attach(declarator, Field::Id, pattern);
                self.attach(declaration, Field::Declarations, Some(declarator));
                Some(declaration)
            }
            (None, Some(target)) => self.lower(target),
            _ => None,
        };
        self.attach(id, Field::Left, left);
        self.attach_field(id, Field::Right, ts, "right");
        self.attach_field(id, Field::Body, ts, "body");
        id
    }

    fn lower_switch(&mut self, ts: TsNode<'_>) -> NodeId {
        let id = self.alloc_for(NodeKind::SwitchStatement, ts);
        self.attach_field(id, Field::Discriminant, ts, "value");
        if let Some(body) = ts.child_by_field_name("body") {
            self.attach_all(id, Field::Cases, named_children(body));
        }
        id
    }

    fn lower_switch_case(&mut self, ts: TsNode<'_>) -> NodeId {
        let id = self.alloc_for(NodeKind::SwitchCase, ts);
        self.attach_field(id, Field::Test, ts, "value");
        let mut cursor = ts.walk();
        let body: Vec<TsNode<'_>> = ts.children_by_field_name("body", &mut cursor).collect();
        self.attach_all(id, Field::Consequent, body);
        id
    }

    fn lower_function(&mut self, ts: TsNode<'_>, kind: NodeKind) -> NodeId {
        let id = self.alloc_for(kind, ts);
        self.function_flags(id, ts);
        self.attach_field(id, Field::Id, ts, "name");
        self.attach_parameters(id, ts);
        self.attach_field(id, Field::Body, ts, "body");
        id
    }

    fn lower_arrow(&mut self, ts: TsNode<'_>) -> NodeId {
        let id = self.alloc_for(NodeKind::ArrowFunctionExpression, ts);
        self.function_flags(id, ts);
        if ts.child_by_field_name("parameter").is_some() {
            self.attach_field(id, Field::Params, ts, "parameter");
        } else {
            self.attach_parameters(id, ts);
        }
        if ts
            .child_by_field_name("body")
            .is_some_and(|body| body.kind() != "statement_block")
        {
            self.flag(id, NodeFlags::EXPRESSION_BODY);
        }
        self.attach_field(id, Field::Body, ts, "body");
        id
    }

    fn function_flags(&mut self, id: NodeId, ts: TsNode<'_>) {
        let mut cursor = ts.walk();
        for child in ts.children(&mut cursor) {
            match child.kind() {
                "async" => self.flag(id, NodeFlags::ASYNC),
                "*" => self.flag(id, NodeFlags::GENERATOR),
                "static" => self.flag(id, NodeFlags::STATIC),
                _ => {}
            }
        }
    }

    fn attach_parameters(&mut self, id: NodeId, ts: TsNode<'_>) {
        if let Some(parameters) = ts.child_by_field_name("parameters") {
            self.attach_all(id, Field::Params, named_children(parameters));
        }
    }

    fn lower_parameter(&mut self, ts: TsNode<'_>) -> Option<NodeId> {
        let pattern = ts.child_by_field_name("pattern")?;
        if ts.child_by_field_name("value").is_none() {
            return self.lower(pattern);
        }
        let id = self.alloc_for(NodeKind::AssignmentPattern, ts);
        let left = self.lower(pattern);
        self.attach(id, Field::Left, left);
        self.attach_field(id, Field::Right, ts, "value");
        Some(id)
    }

    fn lower_class(&mut self, ts: TsNode<'_>, kind: NodeKind) -> NodeId {
        let id = self.alloc_for(kind, ts);
        self.attach_field(id, Field::Id, ts, "name");
        let heritage = named_children(ts)
            .into_iter()
            .find(|child| child.kind() == "class_heritage");
        if let Some(heritage) = heritage {
            let extends = named_children(heritage)
                .into_iter()
                .find(|child| child.kind() == "extends_clause")
                .or_else(|| first_named(heritage));
            let super_class = extends.and_then(|clause| {
                clause
                    .child_by_field_name("value")
                    .or_else(|| first_named(clause))
                    .and_then(|value| self.lower(value))
            });
            self.attach(id, Field::SuperClass, super_class);
        }
        self.attach_field(id, Field::Body, ts, "body");
        id
    }

    fn lower_key(&mut self, parent: NodeId, key: TsNode<'_>) {
        if key.kind() == "computed_property_name" {
            self.flag(parent, NodeFlags::COMPUTED);
            let inner = first_named(key).and_then(|inner| self.lower(inner));
            self.attach(parent, Field::Key, inner);
        } else {
            let lowered = self.lower(key);
            self.attach(parent, Field::Key, lowered);
        }
    }

    fn lower_method(&mut self, ts: TsNode<'_>) -> NodeId {
        let in_class = ts.parent().is_some_and(|parent| parent.kind() == "class_body");
        let kind = if in_class { NodeKind::MethodDefinition } else { NodeKind::Property };
        let id = self.alloc_for(kind, ts);
        self.function_flags(id, ts);
        if let Some(key) = ts.child_by_field_name("name") {
            self.lower_key(id, key);
        }
        let start = ts
            .child_by_field_name("parameters")
            .map_or(ts.start_byte(), |parameters| parameters.start_byte());
        let function = self.alloc(NodeKind::FunctionExpression, ts.kind(), start..ts.end_byte());
        self.function_flags(function, ts);
        self.attach_parameters(function, ts);
        self.attach_field(function, Field::Body, ts, "body");
        self.attach(id, Field::Value, Some(function));
        id
    }

    fn lower_field_definition(&mut self, ts: TsNode<'_>) -> NodeId {
        let id = self.alloc_for(NodeKind::PropertyDefinition, ts);
        self.function_flags(id, ts);
        if let Some(key) = ts
            .child_by_field_name("name")
            .or_else(|| ts.child_by_field_name("property"))
        {
            self.lower_key(id, key);
        }
        self.attach_field(id, Field::Value, ts, "value");
        id
    }

    fn lower_property(&mut self, ts: TsNode<'_>) -> NodeId {
        let id = self.alloc_for(NodeKind::Property, ts);
        match ts.kind() {
            "shorthand_property_identifier" | "shorthand_property_identifier_pattern" => {
                self.flag(id, NodeFlags::SHORTHAND);
                let key = self.lower_identifier(ts);
                self.attach(id, Field::Key, Some(key));
                let value = self.lower_identifier(ts);
                self.attach(id, Field::Value, Some(value));
            }
            "object_assignment_pattern" => {
                self.flag(id, NodeFlags::SHORTHAND);
                if let Some(left) = ts.child_by_field_name("left") {
                    let key = self.lower_identifier(left);
                    self.attach(id, Field::Key, Some(key));
                }
                let value = self.alloc_for(NodeKind::AssignmentPattern, ts);
                let target = ts.child_by_field_name("left").map(|left| self.lower_identifier(left));
                self.attach(value, Field::Left, target);
                self.attach_field(value, Field::Right, ts, "right");
                self.attach(id, Field::Value, Some(value));
            }
            _ => {
                if let Some(key) = ts.child_by_field_name("key") {
                    self.lower_key(id, key);
                }
                self.attach_field(id, Field::Value, ts, "value");
            }
        }
        id
    }

    fn lower_call(&mut self, ts: TsNode<'_>) -> NodeId {
        let arguments = ts.child_by_field_name("arguments");
        let function = ts.child_by_field_name("function");
        if let Some(template) = arguments.filter(|args| args.kind() == "template_string") {
            let id = self.alloc_for(NodeKind::TaggedTemplateExpression, ts);
            let tag = function.and_then(|tag| self.lower(tag));
            self.attach(id, Field::Tag, tag);
            let quasi = self.lower(template);
            self.attach(id, Field::Quasi, quasi);
            return id;
        }
        if function.is_some_and(|callee| callee.kind() == "import") {
            let id = self.alloc_for(NodeKind::ImportExpression, ts);
            let source = arguments
                .and_then(first_named)
                .and_then(|argument| self.lower(argument));
            self.attach(id, Field::Source, source);
            return id;
        }
        let id = self.alloc_for(NodeKind::CallExpression, ts);
        if has_optional_chain(ts) {
            self.flag(id, NodeFlags::OPTIONAL);
        }
        let callee = function.and_then(|callee| self.lower(callee));
        self.attach(id, Field::Callee, callee);
        if let Some(arguments) = arguments {
            self.attach_all(id, Field::Arguments, named_children(arguments));
        }
        id
    }

    fn lower_new(&mut self, ts: TsNode<'_>) -> NodeId {
        let id = self.alloc_for(NodeKind::NewExpression, ts);
        self.attach_field(id, Field::Callee, ts, "constructor");
        if let Some(arguments) = ts.child_by_field_name("arguments") {
            self.attach_all(id, Field::Arguments, named_children(arguments));
        }
        id
    }

    fn lower_member(&mut self, ts: TsNode<'_>, property: &str, computed: bool) -> NodeId {
        let id = self.alloc_for(NodeKind::MemberExpression, ts);
        if computed {
            self.flag(id, NodeFlags::COMPUTED);
        }
        if has_optional_chain(ts) {
            self.flag(id, NodeFlags::OPTIONAL);
        }
        self.attach_field(id, Field::Object, ts, "object");
        self.attach_field(id, Field::Property, ts, property);
        id
    }

    fn lower_sequence(&mut self, ts: TsNode<'_>) -> NodeId {
        let id = self.alloc_for(NodeKind::SequenceExpression, ts);
        let mut pending = named_children(ts);
        pending.reverse();
        while let Some(child) = pending.pop() {
            if child.kind() == "sequence_expression" {
                let mut nested = named_children(child);
                nested.reverse();
                pending.extend(nested);
            } else {
                let expression = self.lower(child);
                self.attach(id, Field::Expressions, expression);
            }
        }
        id
    }

    fn lower_assignment(&mut self, ts: TsNode<'_>) -> NodeId {
        let id = self.alloc_for(NodeKind::AssignmentExpression, ts);
        let operator = ts
            .child_by_field_name("operator")
            .map_or("=", |operator| self.text(operator))
            .to_owned();
        self.set_operator(id, &operator);
        self.attach_field(id, Field::Left, ts, "left");
        self.attach_field(id, Field::Right, ts, "right");
        id
    }

    fn lower_binary(&mut self, ts: TsNode<'_>) -> NodeId {
        let operator = ts
            .child_by_field_name("operator")
            .map(|operator| self.text(operator).to_owned())
            .unwrap_or_default();
        let kind = if matches!(operator.as_str(), "&&" | "||" | "??") {
            NodeKind::LogicalExpression
        } else {
            NodeKind::BinaryExpression
        };
        let id = self.alloc_for(kind, ts);
        self.set_operator(id, &operator);
        self.attach_field(id, Field::Left, ts, "left");
        self.attach_field(id, Field::Right, ts, "right");
        id
    }

    fn lower_unary(&mut self, ts: TsNode<'_>) -> NodeId {
        let id = self.alloc_for(NodeKind::UnaryExpression, ts);
        let operator = ts
            .child_by_field_name("operator")
            .map(|operator| self.text(operator).to_owned())
            .unwrap_or_default();
        self.set_operator(id, &operator);
        self.flag(id, NodeFlags::PREFIX);
        self.attach_field(id, Field::Argument, ts, "argument");
        id
    }

    fn lower_update(&mut self, ts: TsNode<'_>) -> NodeId {
        let id = self.alloc_for(NodeKind::UpdateExpression, ts);
        let operator = ts.child_by_field_name("operator");
        let argument = ts.child_by_field_name("argument");
        if let Some(operator) = operator {
            let text = self.text(operator).to_owned();
            self.set_operator(id, &text);
            if argument.is_some_and(|argument| operator.start_byte() < argument.start_byte()) {
                self.flag(id, NodeFlags::PREFIX);
            }
        }
        let lowered = argument.and_then(|argument| self.lower(argument));
        self.attach(id, Field::Argument, lowered);
        id
    }

    fn lower_yield(&mut self, ts: TsNode<'_>) -> NodeId {
        let id = self.unary_node(ts, NodeKind::YieldExpression, Field::Argument);
        let mut cursor = ts.walk();
        if ts.children(&mut cursor).any(|child| child.kind() == "*") {
            self.flag(id, NodeFlags::DELEGATE);
        }
        id
    }

    fn lower_import(&mut self, ts: TsNode<'_>) -> NodeId {
        let id = self.alloc_for(NodeKind::ImportDeclaration, ts);
        let clause = named_children(ts)
            .into_iter()
            .find(|child| child.kind() == "import_clause");
        for part in clause.map(named_children).unwrap_or_default() {
            match part.kind() {
                "identifier" => {
                    let specifier = self.alloc_for(NodeKind::ImportDefaultSpecifier, part);
                    let local = self.lower_identifier(part);
                    self.attach(specifier, Field::Local, Some(local));
                    self.attach(id, Field::Specifiers, Some(specifier));
                }
                "namespace_import" => {
                    let specifier = self.alloc_for(NodeKind::ImportNamespaceSpecifier, part);
                    let local = first_named(part).and_then(|name| self.lower(name));
                    self.attach(specifier, Field::Local, local);
                    self.attach(id, Field::Specifiers, Some(specifier));
                }
                "named_imports" => {
                    for named in named_children(part) {
                        let specifier = self.lower_import_specifier(named);
                        self.attach(id, Field::Specifiers, specifier);
                    }
                }
                _ => {}
            }
        }
        self.attach_field(id, Field::Source, ts, "source");
        id
    }

    fn lower_import_specifier(&mut self, ts: TsNode<'_>) -> Option<NodeId> {
        let name = ts.child_by_field_name("name")?;
        let id = self.alloc_for(NodeKind::ImportSpecifier, ts);
        let imported = self.lower(name);
        self.attach(id, Field::Imported, imported);
        let local_source = ts.child_by_field_name("alias").unwrap_or(name);
        let local = self.lower(local_source);
        self.attach(id, Field::Local, local);
        Some(id)
    }

    fn lower_export(&mut self, ts: TsNode<'_>) -> NodeId {
        let mut cursor = ts.walk();
        let is_default = ts.children(&mut cursor).any(|child| child.kind() == "default");
        if is_default {
            let id = self.alloc_for(NodeKind::ExportDefaultDeclaration, ts);
            let declaration = ts
                .child_by_field_name("declaration")
                .or_else(|| ts.child_by_field_name("value"))
                .and_then(|declaration| self.lower(declaration));
            self.attach(id, Field::Declaration, declaration);
            return id;
        }
        let id = self.alloc_for(NodeKind::ExportNamedDeclaration, ts);
        self.attach_field(id, Field::Declaration, ts, "declaration");
        let clause = named_children(ts)
            .into_iter()
            .find(|child| child.kind() == "export_clause");
        for specifier in clause.map(named_children).unwrap_or_default() {
            let lowered = self.alloc_for(NodeKind::Unknown, specifier);
            self.attach_field(lowered, Field::Local, specifier, "name");
            self.attach(id, Field::Specifiers, Some(lowered));
        }
        self.attach_field(id, Field::Source, ts, "source");
        id
    }
}

fn named_children(ts: TsNode<'_>) -> Vec<TsNode<'_>> {
    let mut cursor = ts.walk();
    ts.named_children(&mut cursor)
        .filter(|child| !is_skipped(child.kind()))
        .collect()
}

fn first_named(ts: TsNode<'_>) -> Option<TsNode<'_>> {
    named_children(ts).into_iter().next()
}

fn has_optional_chain(ts: TsNode<'_>) -> bool {
    if ts.child_by_field_name("optional_chain").is_some() {
        return true;
    }
    let mut cursor = ts.walk();
    ts.children(&mut cursor)
        .any(|child| child.kind() == "optional_chain")
}

/// Trivia and type-only nodes that never appear in the lowered tree.
fn is_skipped(kind: &str) -> bool {
    matches!(
        kind,
        "comment"
            | "html_comment"
            | "hash_bang_line"
            | "type_annotation"
            | "type_arguments"
            | "type_parameters"
            | "type_predicate_annotation"
            | "asserts_annotation"
            | "opting_type_annotation"
            | "omitting_type_annotation"
            | "adding_type_annotation"
            | "accessibility_modifier"
            | "override_modifier"
            | "decorator"
            | "optional_chain"
    )
}

/// Declarations kept as childless placeholders.
fn is_opaque(kind: &str) -> bool {
    matches!(
        kind,
        "interface_declaration"
            | "type_alias_declaration"
            | "enum_declaration"
            | "ambient_declaration"
            | "abstract_method_signature"
            | "index_signature"
            | "method_signature"
            | "property_signature"
            | "function_signature"
            | "module"
            | "internal_module"
            | "import_alias"
            | "type_identifier"
            | "predefined_type"
    )
}
