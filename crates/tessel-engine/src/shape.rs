//! Node-shape predicates.
//!
//! Each predicate tests one node against a normalized option record and
//! answers `false` for any unmet condition. The `*_raw` entry points accept
//! [`RawOptions`] and normalize them first, which is the only place they can
//! fail.

use tessel_syntax::{Field, LiteralKind, NodeId, NodeKind, SourceCode, SyntaxTree};

use crate::error::OptionsError;
use crate::options::{
    ArgumentBounds, CallOptions, MemberOptions, NewOptions, RawOptions,
};

const CALL: &[NodeKind] = &[NodeKind::CallExpression];
const NEW: &[NodeKind] = &[NodeKind::NewExpression];
const CALL_OR_NEW: &[NodeKind] = &[NodeKind::CallExpression, NodeKind::NewExpression];

/// Returns whether `node` is a `CallExpression` matching `options`.
#[must_use]
pub fn is_call_expression(tree: &SyntaxTree, node: NodeId, options: &CallOptions) -> bool {
    matches_call(tree, node, options, CALL)
}

/// Returns whether `node` is a `NewExpression` matching `options`.
#[must_use]
pub fn is_new_expression(tree: &SyntaxTree, node: NodeId, options: &NewOptions) -> bool {
    matches_call(tree, node, &options.as_call(), NEW)
}

/// Returns whether `node` is a `CallExpression` or `NewExpression` matching
/// `options`. `new` expressions are never optional.
#[must_use]
pub fn is_call_or_new_expression(tree: &SyntaxTree, node: NodeId, options: &CallOptions) -> bool {
    matches_call(tree, node, options, CALL_OR_NEW)
}

/// Returns whether `node` is a `MemberExpression` matching `options`.
#[must_use]
pub fn is_member_expression(tree: &SyntaxTree, node: NodeId, options: &MemberOptions) -> bool {
    let Some(member) = tree.get(node) else {
        return false;
    };
    if member.kind() != NodeKind::MemberExpression {
        return false;
    }
    if !tri_state(options.optional, member.is_optional())
        || !tri_state(options.computed, member.is_computed())
    {
        return false;
    }
    if !options.properties.is_empty()
        && !identifier_in(tree, member.field(Field::Property), &options.properties)
    {
        return false;
    }
    options.objects.is_empty() || identifier_in(tree, member.field(Field::Object), &options.objects)
}

/// Normalizes `raw` and runs [`is_call_expression`].
///
/// # Errors
///
/// Returns an error when the options are contradictory.
pub fn is_call_expression_raw(
    tree: &SyntaxTree,
    node: NodeId,
    raw: &RawOptions,
) -> Result<bool, OptionsError> {
    Ok(is_call_expression(tree, node, &CallOptions::from_raw(raw)?))
}

/// Normalizes `raw` and runs [`is_new_expression`].
///
/// # Errors
///
/// Returns an error when the options are contradictory or ask for
/// optionality.
pub fn is_new_expression_raw(
    tree: &SyntaxTree,
    node: NodeId,
    raw: &RawOptions,
) -> Result<bool, OptionsError> {
    Ok(is_new_expression(tree, node, &NewOptions::from_raw(raw)?))
}

/// Normalizes `raw` and runs [`is_call_or_new_expression`].
///
/// # Errors
///
/// Returns an error when the options are contradictory.
pub fn is_call_or_new_expression_raw(
    tree: &SyntaxTree,
    node: NodeId,
    raw: &RawOptions,
) -> Result<bool, OptionsError> {
    Ok(is_call_or_new_expression(tree, node, &CallOptions::from_raw(raw)?))
}

/// Normalizes `raw` and runs [`is_member_expression`].
///
/// # Errors
///
/// Returns an error when the options are contradictory.
pub fn is_member_expression_raw(
    tree: &SyntaxTree,
    node: NodeId,
    raw: &RawOptions,
) -> Result<bool, OptionsError> {
    Ok(is_member_expression(tree, node, &MemberOptions::from_raw(raw)?))
}

fn matches_call(tree: &SyntaxTree, node: NodeId, options: &CallOptions, kinds: &[NodeKind]) -> bool {
    let Some(call) = tree.get(node) else {
        return false;
    };
    if !kinds.contains(&call.kind()) {
        return false;
    }
    if !tri_state(options.optional, call.is_optional()) {
        return false;
    }
    let arguments: Vec<NodeId> = call.field_list(Field::Arguments).collect();
    if !options.arguments.accepts(arguments.len()) {
        return false;
    }
    if !options.allow_spread && has_spread_in_window(tree, &arguments, options.arguments) {
        return false;
    }
    options.names.is_empty() || identifier_in(tree, call.field(Field::Callee), &options.names)
}

fn has_spread_in_window(tree: &SyntaxTree, arguments: &[NodeId], bounds: ArgumentBounds) -> bool {
    bounds.spread_window().is_some_and(|window| {
        arguments
            .iter()
            .take(window)
            .any(|argument| tree.is(*argument, NodeKind::SpreadElement))
    })
}

/// `None` accepts either state.
fn tri_state(expected: Option<bool>, actual: bool) -> bool {
    expected.is_none_or(|wanted| wanted == actual)
}

fn identifier_in(
    tree: &SyntaxTree,
    node: Option<NodeId>,
    names: &std::collections::BTreeSet<String>,
) -> bool {
    node.filter(|id| tree.is(*id, NodeKind::Identifier))
        .and_then(|id| tree.name(id))
        .is_some_and(|name| names.contains(name))
}

fn is_literal_of(tree: &SyntaxTree, node: NodeId, kind: LiteralKind) -> bool {
    tree.get(node)
        .is_some_and(|found| found.kind() == NodeKind::Literal && found.literal() == Some(kind))
}

/// Returns whether `node` is a string literal.
#[must_use]
pub fn is_string_literal(tree: &SyntaxTree, node: NodeId) -> bool {
    is_literal_of(tree, node, LiteralKind::String)
}

/// Returns whether `node` is a numeric literal (not a `BigInt`).
#[must_use]
pub fn is_number_literal(tree: &SyntaxTree, node: NodeId) -> bool {
    is_literal_of(tree, node, LiteralKind::Number)
}

/// Returns whether `node` is a `BigInt` literal.
#[must_use]
pub fn is_bigint_literal(tree: &SyntaxTree, node: NodeId) -> bool {
    is_literal_of(tree, node, LiteralKind::BigInt)
}

/// Returns whether `node` is a regular expression literal.
#[must_use]
pub fn is_regex_literal(tree: &SyntaxTree, node: NodeId) -> bool {
    is_literal_of(tree, node, LiteralKind::RegExp)
}

/// Returns whether `node` is `null`.
#[must_use]
pub fn is_null_literal(tree: &SyntaxTree, node: NodeId) -> bool {
    is_literal_of(tree, node, LiteralKind::Null)
}

/// Returns whether `node` is `true` or `false`.
#[must_use]
pub fn is_boolean_literal(tree: &SyntaxTree, node: NodeId) -> bool {
    is_literal_of(tree, node, LiteralKind::Boolean)
}

/// Returns whether `node` is the identifier `undefined`.
#[must_use]
pub fn is_undefined(tree: &SyntaxTree, node: NodeId) -> bool {
    tree.is(node, NodeKind::Identifier) && tree.name(node) == Some("undefined")
}

/// Returns whether `node` is a function declaration, expression or arrow.
#[must_use]
pub fn is_function(tree: &SyntaxTree, node: NodeId) -> bool {
    tree.kind(node).is_function()
}

/// Returns whether `node` is `[]`. Holes such as `[,]` are not empty.
#[must_use]
pub fn is_empty_array_expression(tree: &SyntaxTree, source: &SourceCode, node: NodeId) -> bool {
    tree.is(node, NodeKind::ArrayExpression)
        && tree.field_list(node, Field::Elements).is_empty()
        && !source.tokens_in(tree.range(node)).iter().any(|token| token.is_comma())
}

/// Returns whether `node` is `{}`.
#[must_use]
pub fn is_empty_object_expression(tree: &SyntaxTree, node: NodeId) -> bool {
    tree.is(node, NodeKind::ObjectExpression) && tree.field_list(node, Field::Properties).is_empty()
}

/// Returns whether `node` is `require("literal")`.
#[must_use]
pub fn is_static_require(tree: &SyntaxTree, node: NodeId) -> bool {
    let options = CallOptions {
        names: std::iter::once("require".to_owned()).collect(),
        arguments: ArgumentBounds::exactly(1),
        allow_spread: false,
        optional: Some(false),
    };
    is_call_expression(tree, node, &options)
        && tree
            .field(node, Field::Arguments)
            .is_some_and(|argument| is_string_literal(tree, argument))
}

/// Returns whether `node` matches any of the dotted `paths`, such as
/// `"Math.max"` or `"this.items"`.
///
/// Every link after the first must be a non-optional, non-computed member
/// access with an identifier property.
#[must_use]
pub fn is_node_matches(tree: &SyntaxTree, node: NodeId, paths: &[&str]) -> bool {
    paths.iter().any(|path| matches_path(tree, node, path))
}

fn matches_path(tree: &SyntaxTree, node: NodeId, path: &str) -> bool {
    let segments: Vec<&str> = path.trim().split('.').collect();
    let mut current = node;
    for (index, segment) in segments.iter().enumerate().rev() {
        if segment.is_empty() {
            return false;
        }
        if index == 0 {
            return match tree.kind(current) {
                NodeKind::Identifier => tree.name(current) == Some(*segment),
                NodeKind::ThisExpression => *segment == "this",
                _ => false,
            };
        }
        let Some(member) = tree.get(current) else {
            return false;
        };
        let property_matches = member
            .field(Field::Property)
            .filter(|property| tree.is(*property, NodeKind::Identifier))
            .and_then(|property| tree.name(property))
            == Some(*segment);
        if member.kind() != NodeKind::MemberExpression
            || member.is_optional()
            || member.is_computed()
            || !property_matches
        {
            return false;
        }
        let Some(object) = member.field(Field::Object) else {
            return false;
        };
        current = object;
    }
    false
}

/// Returns whether `left` and `right` denote the same reference chain, such
/// as `a.b` and `a["b"]`.
#[must_use]
pub fn is_same_reference(tree: &SyntaxTree, left: NodeId, right: NodeId) -> bool {
    let (Some(first), Some(second)) = (tree.get(left), tree.get(right)) else {
        return false;
    };
    if first.kind() != second.kind() {
        return false;
    }
    match first.kind() {
        NodeKind::Super | NodeKind::ThisExpression => true,
        NodeKind::Identifier | NodeKind::PrivateIdentifier => first.name() == second.name(),
        NodeKind::Literal => first.literal() == second.literal() && first.raw() == second.raw(),
        NodeKind::MemberExpression => {
            let same_property = match (
                static_property_name(tree, left),
                static_property_name(tree, right),
            ) {
                (Some(a), Some(b)) => a == b,
                (None, None) => first.is_computed()
                    && second.is_computed()
                    && pair(first.field(Field::Property), second.field(Field::Property))
                        .is_some_and(|(a, b)| is_same_reference(tree, a, b)),
                _ => false,
            };
            same_property
                && pair(first.field(Field::Object), second.field(Field::Object))
                    .is_some_and(|(a, b)| is_same_reference(tree, a, b))
        }
        _ => false,
    }
}

fn pair(first: Option<NodeId>, second: Option<NodeId>) -> Option<(NodeId, NodeId)> {
    first.zip(second)
}

/// Returns the statically known property name of a member expression:
/// `a.b`, `a["b"]` and `` a[`b`] `` all yield `b`.
#[must_use]
pub fn static_property_name(tree: &SyntaxTree, member: NodeId) -> Option<String> {
    let node = tree.get(member)?;
    if node.kind() != NodeKind::MemberExpression {
        return None;
    }
    let property = node.field(Field::Property)?;
    if !node.is_computed() {
        return tree.name(property).map(str::to_owned);
    }
    match tree.kind(property) {
        NodeKind::Literal if is_string_literal(tree, property) => tree[property]
            .raw()
            .and_then(|raw| raw.get(1..raw.len().saturating_sub(1)))
            .map(str::to_owned),
        NodeKind::TemplateLiteral if tree.field_list(property, Field::Expressions).is_empty() => {
            let quasi = tree.field(property, Field::Quasis)?;
            tree[quasi].raw().map(str::to_owned)
        }
        _ => None,
    }
}

/// Returns whether `node` is written to: an assignment target, an update or
/// `delete` operand, or a destructuring slot.
#[must_use]
pub fn is_left_hand_side(tree: &SyntaxTree, node: NodeId) -> bool {
    let Some(parent) = tree.parent(node) else {
        return false;
    };
    let role = tree.role(node);
    match tree.kind(parent) {
        NodeKind::AssignmentExpression | NodeKind::AssignmentPattern => role == Some(Field::Left),
        NodeKind::UpdateExpression => true,
        NodeKind::ArrayPattern => role == Some(Field::Elements),
        NodeKind::UnaryExpression => tree[parent].operator() == Some("delete"),
        NodeKind::Property => {
            role == Some(Field::Value)
                && tree
                    .parent(parent)
                    .is_some_and(|grand| tree.is(grand, NodeKind::ObjectPattern))
        }
        _ => false,
    }
}

/// Returns whether `node` is the expression `-1`.
#[must_use]
pub fn is_negative_one(tree: &SyntaxTree, node: NodeId) -> bool {
    tree.get(node).is_some_and(|unary| {
        unary.kind() == NodeKind::UnaryExpression
            && unary.operator() == Some("-")
            && unary
                .field(Field::Argument)
                .is_some_and(|argument| is_number_literal(tree, argument) && tree[argument].raw() == Some("1"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tessel_syntax::{Document, Language};

    /// Parses `x = <code>;` and returns the right-hand side.
    fn expression(code: &str) -> (Document, NodeId) {
        let document =
            Document::parse(Language::JavaScript, &format!("x = {code};")).expect("parse");
        let assignment = document
            .first_of_kind(NodeKind::AssignmentExpression)
            .expect("assignment");
        let right = document.tree().field(assignment, Field::Right).expect("right");
        (document, right)
    }

    fn raw(json: &str) -> RawOptions {
        RawOptions::from_json(json).expect("raw options")
    }

    #[rstest]
    #[case("foo(a)", r#""foo""#, true)]
    #[case("bar(a)", r#""foo""#, false)]
    #[case("a.foo(a)", r#""foo""#, false)]
    #[case("fetch(url)", r#"{ "name": "fetch", "argumentsLength": 1 }"#, true)]
    #[case("fetch()", r#"{ "name": "fetch", "argumentsLength": 1 }"#, false)]
    #[case("f(a, b, c)", r#"{ "minimumArguments": 1, "maximumArguments": 2 }"#, false)]
    #[case("f(...xs)", r#"{ "minimumArguments": 1, "maximumArguments": 2 }"#, false)]
    #[case("f(a, b, ...xs)", r#"{ "minimumArguments": 1, "maximumArguments": 3 }"#, false)]
    #[case("f(...b, a)", r#"{ "argumentsLength": 2 }"#, false)]
    #[case("f(a, ...b)", r#"{ "argumentsLength": 2 }"#, false)]
    #[case(
        "f(a, b, ...c)",
        r#"{ "minimumArguments": 2, "maximumArguments": 3, "allowSpreadElement": false }"#,
        false
    )]
    #[case("f(a, ...xs)", r#"{ "argumentsLength": 2, "allowSpreadElement": true }"#, true)]
    #[case("f(...xs)", r#"{ "minimumArguments": 1 }"#, true)]
    #[case("f?.(a)", r#"{ "name": "f", "optional": false }"#, false)]
    #[case("f?.(a)", r#"{ "name": "f", "optional": true }"#, true)]
    #[case("f?.(a)", r#""f""#, true)]
    #[case("new f(a)", r#""f""#, false)]
    fn call_predicate(#[case] code: &str, #[case] json: &str, #[case] expected: bool) {
        let (document, node) = expression(code);
        let matched = is_call_expression_raw(document.tree(), node, &raw(json)).expect("options");
        assert_eq!(matched, expected, "{code} with {json}");
    }

    #[rstest]
    #[case("new Map()", true, true)]
    #[case("new Map", true, true)]
    #[case("Map()", false, true)]
    #[case("new Set()", false, false)]
    fn new_and_call_or_new_predicates(
        #[case] code: &str,
        #[case] new_expected: bool,
        #[case] either_expected: bool,
    ) {
        let (document, node) = expression(code);
        let options = raw(r#""Map""#);
        let tree = document.tree();
        assert_eq!(is_new_expression_raw(tree, node, &options), Ok(new_expected));
        assert_eq!(is_call_or_new_expression_raw(tree, node, &options), Ok(either_expected));
    }

    #[rstest]
    #[case("a.b", r#""b""#, true)]
    #[case("a[b]", r#""b""#, false)]
    #[case("a?.b", r#"{ "property": "b", "optional": false }"#, false)]
    #[case("items.length", r#"{ "object": "items", "property": "length" }"#, true)]
    #[case("this.items.length", r#"{ "object": "items" }"#, false)]
    #[case("a[0]", r#"{ "computed": true }"#, true)]
    fn member_predicate(#[case] code: &str, #[case] json: &str, #[case] expected: bool) {
        let (document, node) = expression(code);
        let matched = is_member_expression_raw(document.tree(), node, &raw(json)).expect("options");
        assert_eq!(matched, expected, "{code} with {json}");
    }

    #[rstest]
    #[case("'a'", is_string_literal, true)]
    #[case("1", is_string_literal, false)]
    #[case("1", is_number_literal, true)]
    #[case("1n", is_number_literal, false)]
    #[case("1n", is_bigint_literal, true)]
    #[case("/a/g", is_regex_literal, true)]
    #[case("null", is_null_literal, true)]
    #[case("false", is_boolean_literal, true)]
    #[case("'true'", is_boolean_literal, false)]
    #[case("undefined", is_undefined, true)]
    #[case("void 0", is_undefined, false)]
    #[case("() => 1", is_function, true)]
    #[case("function () {}", is_function, true)]
    #[case("class {}", is_function, false)]
    #[case("{}", is_empty_object_expression, true)]
    #[case("{ a }", is_empty_object_expression, false)]
    #[case("-1", is_negative_one, true)]
    #[case("-1.0", is_negative_one, false)]
    #[case("+1", is_negative_one, false)]
    #[case("require('fs')", is_static_require, true)]
    #[case("require(name)", is_static_require, false)]
    #[case("require('a', 'b')", is_static_require, false)]
    #[case("require?.('fs')", is_static_require, false)]
    fn node_kind_helpers(
        #[case] code: &str,
        #[case] predicate: fn(&SyntaxTree, NodeId) -> bool,
        #[case] expected: bool,
    ) {
        let (document, node) = expression(code);
        assert_eq!(predicate(document.tree(), node), expected, "{code}");
    }

    #[rstest]
    #[case("[]", true)]
    #[case("[ /* none */ ]", true)]
    #[case("[,]", false)]
    #[case("[a]", false)]
    fn empty_arrays(#[case] code: &str, #[case] expected: bool) {
        let (document, node) = expression(code);
        assert_eq!(
            is_empty_array_expression(document.tree(), document.source(), node),
            expected
        );
    }

    #[rstest]
    #[case("Math.max", &["Math.max"], true)]
    #[case("Math.min", &["Math.max", "Math.min"], true)]
    #[case("this.items", &["this.items"], true)]
    #[case("a.b.c", &["a.b.c"], true)]
    #[case("b.c", &["a.b.c"], false)]
    #[case("Math?.max", &["Math.max"], false)]
    #[case("Math['max']", &["Math.max"], false)]
    #[case("Math", &["Math"], true)]
    #[case("Math", &["Math."], false)]
    fn dotted_paths(#[case] code: &str, #[case] paths: &[&str], #[case] expected: bool) {
        let (document, node) = expression(code);
        assert_eq!(is_node_matches(document.tree(), node, paths), expected, "{code}");
    }

    #[rstest]
    #[case("a.b", "a['b']", true)]
    #[case("a.b", "a[`b`]", true)]
    #[case("a.b", "a.c", false)]
    #[case("a.b", "b.b", false)]
    #[case("this.x", "this.x", true)]
    #[case("a[0]", "a[0]", true)]
    #[case("a[i]", "a[i]", true)]
    #[case("a[i]", "a[j]", false)]
    #[case("a", "a.b", false)]
    fn same_references(#[case] left: &str, #[case] right: &str, #[case] expected: bool) {
        let (document, array) = expression(&format!("[{left}, {right}]"));
        let tree = document.tree();
        let elements = tree.field_list(array, Field::Elements);
        let (first, second) = (elements.first().expect("left"), elements.get(1).expect("right"));
        assert_eq!(is_same_reference(tree, *first, *second), expected);
        assert_eq!(is_same_reference(tree, *second, *first), expected);
    }

    #[rstest]
    #[case("target = 1;", true)]
    #[case("target += 1;", true)]
    #[case("target++;", true)]
    #[case("[target] = xs;", true)]
    #[case("({ a: target } = obj);", true)]
    #[case("delete target;", true)]
    #[case("f(target);", false)]
    #[case("y = target;", false)]
    fn left_hand_sides(#[case] code: &str, #[case] expected: bool) {
        let document = Document::parse(Language::JavaScript, code).expect("parse");
        let tree = document.tree();
        let target = tree
            .nodes_of_kind(NodeKind::Identifier)
            .into_iter()
            .find(|node| tree.name(*node) == Some("target"))
            .expect("target");
        assert_eq!(is_left_hand_side(tree, target), expected, "{code}");
    }
}
