//! Reference evaluator with esquery semantics.
//!
//! Attribute paths walk node fields by their ESTree names. A missing
//! attribute fails `=` and numeric comparisons and satisfies `!=`.

use std::str::FromStr;

use tessel_syntax::{Field, LiteralKind, Node, NodeFlags, NodeId, NodeKind, SyntaxTree};

use super::ast::{AttributeValue, Clause, Comparison, Selector};

/// Value an attribute path resolves to.
#[derive(Debug, Clone, PartialEq)]
enum Resolved {
    Node(NodeId),
    List(Vec<NodeId>),
    Str(String),
    Num(i64),
    Bool(bool),
    Missing,
}

impl Resolved {
    fn scalar_text(&self) -> Option<String> {
        match self {
            Self::Str(value) => Some(value.clone()),
            Self::Num(value) => Some(value.to_string()),
            Self::Bool(value) => Some(value.to_string()),
            Self::Node(_) | Self::List(_) | Self::Missing => None,
        }
    }
}

fn value_text(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Str(text) => text.clone(),
        AttributeValue::Num(number) => number.to_string(),
        AttributeValue::Bool(flag) => flag.to_string(),
    }
}

impl Selector {
    /// Returns whether `node` satisfies the selector.
    #[must_use]
    pub fn matches(&self, tree: &SyntaxTree, node: NodeId) -> bool {
        let head_matches = self
            .head
            .as_deref()
            .is_none_or(|head| tree.kind(node).as_str() == head);
        head_matches && self.clauses.iter().all(|clause| clause.matches(tree, node))
    }

    /// Returns every node of `tree` the selector accepts, in pre-order.
    #[must_use]
    pub fn select(&self, tree: &SyntaxTree) -> Vec<NodeId> {
        tree.descendants(tree.root())
            .into_iter()
            .filter(|node| self.matches(tree, *node))
            .collect()
    }
}

impl Clause {
    /// Returns whether `node` satisfies this clause.
    #[must_use]
    pub fn matches(&self, tree: &SyntaxTree, node: NodeId) -> bool {
        match self {
            Self::Type(name) => tree.kind(node).as_str() == name,
            Self::Attribute { path, op, value } => {
                compare(&resolve(tree, node, path), *op, value)
            }
            Self::Matches(clauses) => clauses.iter().any(|clause| clause.matches(tree, node)),
            Self::Not(clauses) => !clauses.iter().any(|clause| clause.matches(tree, node)),
        }
    }
}

fn compare(actual: &Resolved, op: Comparison, expected: &AttributeValue) -> bool {
    match op {
        Comparison::Eq => actual
            .scalar_text()
            .is_some_and(|text| text == value_text(expected)),
        Comparison::NotEq => !compare(actual, Comparison::Eq, expected),
        Comparison::Gt | Comparison::Ge | Comparison::Lt | Comparison::Le => {
            let (Resolved::Num(left), AttributeValue::Num(right)) = (actual, expected) else {
                return false;
            };
            match op {
                Comparison::Gt => left > right,
                Comparison::Ge => left >= right,
                Comparison::Lt => left < right,
                _ => left <= right,
            }
        }
    }
}

fn resolve(tree: &SyntaxTree, node: NodeId, path: &[String]) -> Resolved {
    path.iter().fold(Resolved::Node(node), |current, segment| match current {
        Resolved::Node(id) => tree
            .get(id)
            .map_or(Resolved::Missing, |found| node_attribute(tree, found, segment)),
        Resolved::List(items) => list_attribute(&items, segment),
        Resolved::Str(_) | Resolved::Num(_) | Resolved::Bool(_) | Resolved::Missing => {
            Resolved::Missing
        }
    })
}

fn list_attribute(items: &[NodeId], segment: &str) -> Resolved {
    if segment == "length" {
        return i64::try_from(items.len()).map_or(Resolved::Missing, Resolved::Num);
    }
    segment
        .parse::<usize>()
        .ok()
        .and_then(|index| items.get(index))
        .map_or(Resolved::Missing, |id| Resolved::Node(*id))
}

fn flag(node: &Node, applies: bool, bit: NodeFlags) -> Resolved {
    if applies {
        Resolved::Bool(node.flags().contains(bit))
    } else {
        Resolved::Missing
    }
}

fn is_list_field(kind: NodeKind, field: Field) -> bool {
    match field {
        Field::Arguments
        | Field::Params
        | Field::Elements
        | Field::Properties
        | Field::Expressions
        | Field::Quasis
        | Field::Declarations
        | Field::Cases
        | Field::Specifiers => true,
        Field::Consequent => kind == NodeKind::SwitchCase,
        Field::Body => matches!(
            kind,
            NodeKind::Program | NodeKind::BlockStatement | NodeKind::ClassBody
        ),
        _ => false,
    }
}

fn node_attribute(tree: &SyntaxTree, node: &Node, segment: &str) -> Resolved {
    let kind = node.kind();
    match segment {
        "type" => Resolved::Str(kind.as_str().to_owned()),
        "name" => node
            .name()
            .map_or(Resolved::Missing, |name| Resolved::Str(name.to_owned())),
        "operator" => node
            .operator()
            .map_or(Resolved::Missing, |operator| Resolved::Str(operator.to_owned())),
        "raw" => node
            .raw()
            .map_or(Resolved::Missing, |raw| Resolved::Str(raw.to_owned())),
        "kind" => node
            .variable_kind()
            .map_or(Resolved::Missing, |keyword| Resolved::Str(keyword.to_string())),
        "optional" => flag(
            node,
            matches!(kind, NodeKind::CallExpression | NodeKind::MemberExpression),
            NodeFlags::OPTIONAL,
        ),
        "computed" => flag(
            node,
            matches!(
                kind,
                NodeKind::MemberExpression
                    | NodeKind::Property
                    | NodeKind::MethodDefinition
                    | NodeKind::PropertyDefinition
            ),
            NodeFlags::COMPUTED,
        ),
        "prefix" => flag(
            node,
            matches!(kind, NodeKind::UpdateExpression | NodeKind::UnaryExpression),
            NodeFlags::PREFIX,
        ),
        "shorthand" => flag(node, kind == NodeKind::Property, NodeFlags::SHORTHAND),
        "async" => flag(node, kind.is_function(), NodeFlags::ASYNC),
        "generator" => flag(node, kind.is_function(), NodeFlags::GENERATOR),
        "expression" if kind == NodeKind::ArrowFunctionExpression => {
            flag(node, true, NodeFlags::EXPRESSION_BODY)
        }
        "delegate" => flag(node, kind == NodeKind::YieldExpression, NodeFlags::DELEGATE),
        "static" => flag(
            node,
            matches!(kind, NodeKind::MethodDefinition | NodeKind::PropertyDefinition),
            NodeFlags::STATIC,
        ),
        "value" if kind == NodeKind::Literal => literal_value(node),
        _ => Field::from_str(segment).map_or(Resolved::Missing, |field| {
            if is_list_field(kind, field) {
                Resolved::List(node.field_list(field).collect())
            } else {
                node.field(field)
                    .filter(|id| tree.get(*id).is_some())
                    .map_or(Resolved::Missing, Resolved::Node)
            }
        }),
    }
}

fn literal_value(node: &Node) -> Resolved {
    let raw = node.raw().unwrap_or_default();
    match node.literal() {
        Some(LiteralKind::Boolean) => Resolved::Bool(raw == "true"),
        Some(LiteralKind::Number) => raw.parse::<i64>().map_or_else(
            |_| Resolved::Str(raw.to_owned()),
            Resolved::Num,
        ),
        Some(LiteralKind::String) => raw
            .get(1..raw.len().saturating_sub(1))
            .map_or(Resolved::Missing, |inner| Resolved::Str(inner.to_owned())),
        _ => Resolved::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tessel_syntax::{Document, Language};

    fn count(source: &str, selector: &str) -> usize {
        let document = Document::parse(Language::JavaScript, source).expect("parse");
        Selector::parse(selector)
            .expect("selector")
            .select(document.tree())
            .len()
    }

    #[rstest]
    #[case("foo(1, 2); bar();", "CallExpression[arguments.length=2]", 1)]
    #[case("foo(1, 2); bar();", "CallExpression[arguments.length>=0]", 2)]
    #[case("a?.b; c.d;", "MemberExpression[optional=true]", 1)]
    #[case("a?.b; c.d;", "MemberExpression[optional!=true]", 1)]
    #[case("new A(); a();", "NewExpression[optional!=true]", 1)]
    #[case("new A(); a();", "NewExpression[optional=false]", 0)]
    #[case("f(...a); f(a, ...b);", r#"CallExpression[arguments.0.type!="SpreadElement"]"#, 1)]
    #[case("f(); g();", r#"CallExpression[arguments.0.type!="SpreadElement"]"#, 2)]
    #[case("x++; ++x;", "UpdateExpression[prefix=true]", 1)]
    #[case("let a = 1; const b = 2;", r#"VariableDeclaration[kind="const"]"#, 1)]
    #[case("a[b]; a.b;", "MemberExpression:not([computed=true])", 1)]
    #[case("f('x'); f(1);", r#"CallExpression[arguments.0.value="x"]"#, 1)]
    #[case("f(1); f(2);", "CallExpression[arguments.0.value>1]", 1)]
    #[case("f(a); g(a);", r#":matches([callee.name="f"], [callee.name="g"])"#, 2)]
    #[case("f(a);", "CallExpression[callee.missing.type=\"Identifier\"]", 0)]
    fn selectors_count_matches(#[case] source: &str, #[case] selector: &str, #[case] expected: usize) {
        assert_eq!(count(source, selector), expected);
    }
}
