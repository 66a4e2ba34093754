//! Node-level rewrites: parentheses, member access, `new` and templates.

use tessel_syntax::{Field, NodeId, NodeKind, TokenKind};

use super::fixer::Fixer;
use super::semicolon::needs_semicolon;
use crate::error::FixError;
use crate::parens::{is_new_with_parentheses, parentheses_info, parenthesized_range};

/// Removes every redundant pair of parentheses around `node`.
pub fn remove_parentheses(fixer: &mut Fixer<'_>, node: NodeId) {
    let info = parentheses_info(fixer.tree(), fixer.source(), node);
    for pair in info.pairs {
        fixer.remove_range(pair.open);
        fixer.remove_range(pair.close);
    }
}

/// Rewrites `object.property` and `object[property]` to `object`.
///
/// # Errors
///
/// Returns [`FixError::UnsupportedNode`] when `member` is not a member
/// expression.
pub fn remove_member_expression_property(
    fixer: &mut Fixer<'_>,
    member: NodeId,
) -> Result<(), FixError> {
    let tree = fixer.tree();
    let object = tree
        .field(member, Field::Object)
        .filter(|_| tree.is(member, NodeKind::MemberExpression))
        .ok_or(FixError::UnsupportedNode {
            primitive: "remove_member_expression_property",
            kind: tree.kind(member).as_str(),
        })?;
    truncate_after(fixer, object, member);
    Ok(())
}

/// Rewrites `object.method(arguments)` to `object`.
///
/// # Errors
///
/// Returns [`FixError::UnsupportedNode`] unless `call` is a call whose
/// callee is a member expression.
pub fn remove_method_call(fixer: &mut Fixer<'_>, call: NodeId) -> Result<(), FixError> {
    let tree = fixer.tree();
    let (callee, object) = tree
        .field(call, Field::Callee)
        .filter(|callee| {
            tree.is(call, NodeKind::CallExpression) && tree.is(*callee, NodeKind::MemberExpression)
        })
        .and_then(|callee| Some((callee, tree.field(callee, Field::Object)?)))
        .ok_or(FixError::UnsupportedNode {
            primitive: "remove_method_call",
            kind: tree.kind(call).as_str(),
        })?;
    // The property and the arguments go separately so that parentheses
    // around the callee, as in `(a.map)(f)`, stay balanced.
    truncate_after(fixer, object, callee);
    truncate_after(fixer, callee, call);
    Ok(())
}

/// Removes everything in `outer` after `kept` and its parentheses.
fn truncate_after(fixer: &mut Fixer<'_>, kept: NodeId, outer: NodeId) {
    let start = parenthesized_range(fixer.tree(), fixer.source(), kept).end;
    let removed = start..fixer.tree().range(outer).end;
    fixer.guard_comments(removed.clone(), &(start..start));
    fixer.remove_range(removed);
}

/// Rewrites `new Foo(a)` to `Foo(a)` and `new Foo` to `Foo()`.
///
/// A `;` is prefixed when the call would otherwise continue the previous
/// statement.
///
/// # Errors
///
/// Returns [`FixError::UnsupportedNode`] for other nodes and
/// [`FixError::MissingToken`] when the `new` keyword cannot be found.
pub fn switch_new_expression_to_call_expression(
    fixer: &mut Fixer<'_>,
    node: NodeId,
) -> Result<(), FixError> {
    const PRIMITIVE: &str = "switch_new_expression_to_call_expression";
    let (tree, source) = (fixer.tree(), fixer.source());
    if !tree.is(node, NodeKind::NewExpression) {
        return Err(FixError::UnsupportedNode {
            primitive: PRIMITIVE,
            kind: tree.kind(node).as_str(),
        });
    }
    let range = tree.range(node);
    let keyword = source
        .first_token(range.clone())
        .filter(|token| token.kind == TokenKind::Keyword && token.text == "new")
        .ok_or(FixError::MissingToken {
            primitive: PRIMITIVE,
            token: "new",
        })?;
    let next = source
        .token_after(keyword.range.end)
        .filter(|token| token.range.end <= range.end)
        .ok_or(FixError::MissingToken {
            primitive: PRIMITIVE,
            token: "callee",
        })?;
    let removed = keyword.range.start..next.range.start;
    fixer.guard_comments(removed.clone(), &(removed.start..removed.start));
    let remaining = source.slice(next.range.start..range.end);
    let prefix = if needs_semicolon(tree, source, source.token_before(range.start), remaining) {
        ";"
    } else {
        ""
    };
    fixer.replace_text_range(removed, prefix);
    if !is_new_with_parentheses(tree, source, node) {
        fixer.insert_text_after_range(range, "()");
    }
    Ok(())
}

/// Replaces `node` with `text`, keeping any parentheses around it.
pub fn replace_node_with_text(fixer: &mut Fixer<'_>, node: NodeId, text: &str) {
    fixer.replace_text(node, text);
}

/// Wraps `node` in a pair of parentheses.
pub fn wrap_in_parentheses(fixer: &mut Fixer<'_>, node: NodeId) {
    fixer.insert_text_before(node, "(");
    fixer.insert_text_after(node, ")");
}

/// Replaces the raw text of a template chunk, keeping its delimiters.
///
/// `raw` is written as is; pass plain text through
/// [`escape_template_element_raw`](super::escape_template_element_raw)
/// first.
///
/// # Errors
///
/// Returns [`FixError::UnsupportedNode`] when `element` is not a template
/// element.
pub fn replace_template_element(
    fixer: &mut Fixer<'_>,
    element: NodeId,
    raw: &str,
) -> Result<(), FixError> {
    let tree = fixer.tree();
    if !tree.is(element, NodeKind::TemplateElement) {
        return Err(FixError::UnsupportedNode {
            primitive: "replace_template_element",
            kind: tree.kind(element).as_str(),
        });
    }
    let range = tree.range(element);
    let closing = if fixer.source().slice(range.clone()).ends_with('`') {
        1
    } else {
        2
    };
    let inner = range.start.saturating_add(1)..range.end.saturating_sub(closing);
    fixer.replace_text_range(inner, raw);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fix::FixKind;
    use rstest::rstest;
    use tessel_syntax::{Document, Language};

    /// Runs `primitive` on the first node of `kind` and applies the result.
    fn rewrite(
        code: &str,
        kind: NodeKind,
        primitive: impl FnOnce(&mut Fixer<'_>, NodeId) -> Result<(), FixError>,
    ) -> (String, FixKind) {
        let document = Document::parse(Language::JavaScript, code).expect("parse");
        let node = document.first_of_kind(kind).expect("node");
        let mut fixer = Fixer::for_document(&document);
        primitive(&mut fixer, node).expect("rewrite");
        let descriptor = fixer.finish().expect("descriptor");
        (descriptor.apply(code).expect("apply"), descriptor.kind())
    }

    /// Like [`rewrite`], asserting the result is an auto-appliable fix.
    fn fixed(
        code: &str,
        kind: NodeKind,
        primitive: impl FnOnce(&mut Fixer<'_>, NodeId) -> Result<(), FixError>,
    ) -> String {
        let (text, fix_kind) = rewrite(code, kind, primitive);
        assert_eq!(fix_kind, FixKind::Fix);
        text
    }

    #[rstest]
    #[case("x = ((a + b));", "x = a + b;")]
    #[case("x = a + b;", "x = a + b;")]
    #[case("x = ( /* c */ (a + b));", "x =  /* c */ a + b;")]
    fn removes_redundant_parentheses(#[case] code: &str, #[case] expected: &str) {
        let result = fixed(code, NodeKind::BinaryExpression, |fixer, node| {
            remove_parentheses(fixer, node);
            Ok(())
        });
        assert_eq!(result, expected);
    }

    #[test]
    fn keeps_call_argument_parentheses() {
        let result = fixed("f((a));", NodeKind::Identifier, |fixer, _| {
            let tree = fixer.tree();
            let argument = tree
                .nodes_of_kind(NodeKind::Identifier)
                .into_iter()
                .find(|node| tree.name(*node) == Some("a"))
                .expect("argument");
            remove_parentheses(fixer, argument);
            Ok(())
        });
        assert_eq!(result, "f(a);");
    }

    #[rstest]
    #[case("x = a.b;", "x = a;")]
    #[case("x = a[b];", "x = a;")]
    #[case("x = (a).b;", "x = (a);")]
    #[case("x = a?.b;", "x = a;")]
    fn removes_member_properties(#[case] code: &str, #[case] expected: &str) {
        let result = fixed(code, NodeKind::MemberExpression, remove_member_expression_property);
        assert_eq!(result, expected);
    }

    #[test]
    fn comment_inside_removed_property_downgrades() {
        let (text, kind) = rewrite(
            "x = a /* c */ .b;",
            NodeKind::MemberExpression,
            remove_member_expression_property,
        );
        assert_eq!((text.as_str(), kind), ("x = a;", FixKind::Suggestion));
    }

    #[rstest]
    #[case("x = a.map(f);", "x = a;")]
    #[case("x = (a || b).slice();", "x = (a || b);")]
    #[case("x = (a.map)(f);", "x = (a);")]
    #[case("x = ((a).map)(f);", "x = ((a));")]
    fn removes_method_calls(#[case] code: &str, #[case] expected: &str) {
        let result = fixed(code, NodeKind::CallExpression, remove_method_call);
        assert_eq!(result, expected);
    }

    #[test]
    fn remove_method_call_rejects_plain_calls() {
        let document = Document::parse(Language::JavaScript, "f(a);").expect("parse");
        let call = document.first_of_kind(NodeKind::CallExpression).expect("call");
        let mut fixer = Fixer::for_document(&document);
        assert!(matches!(
            remove_method_call(&mut fixer, call),
            Err(FixError::UnsupportedNode { .. })
        ));
    }

    #[rstest]
    #[case("x = new Foo(a);", "x = Foo(a);")]
    #[case("x = new Foo;", "x = Foo();")]
    #[case("x = new   Foo();", "x = Foo();")]
    #[case("foo()\nnew (a || B)()", "foo()\n;(a || B)()")]
    #[case("foo();\nnew (a || B)()", "foo();\n(a || B)()")]
    fn switches_new_to_call(#[case] code: &str, #[case] expected: &str) {
        let result = fixed(
            code,
            NodeKind::NewExpression,
            switch_new_expression_to_call_expression,
        );
        assert_eq!(result, expected);
    }

    #[test]
    fn replace_and_wrap_keep_parentheses() {
        let result = fixed("x = (a) + b;", NodeKind::BinaryExpression, |fixer, node| {
            let tree = fixer.tree();
            let left = tree.field(node, Field::Left).expect("left");
            replace_node_with_text(fixer, left, "c");
            wrap_in_parentheses(fixer, node);
            Ok(())
        });
        assert_eq!(result, "x = ((c) + b);");
    }

    #[rstest]
    #[case("x = `abc`;", 0, "x = `z`;")]
    #[case("x = `a${b}c`;", 0, "x = `z${b}c`;")]
    #[case("x = `a${b}c`;", 1, "x = `a${b}z`;")]
    #[case("x = `a${b}c${d}e`;", 1, "x = `a${b}z${d}e`;")]
    fn replaces_template_elements(
        #[case] code: &str,
        #[case] index: usize,
        #[case] expected: &str,
    ) {
        let result = fixed(code, NodeKind::TemplateLiteral, |fixer, literal| {
            let element = *fixer
                .tree()
                .field_list(literal, Field::Quasis)
                .get(index)
                .expect("element");
            replace_template_element(fixer, element, "z")
        });
        assert_eq!(result, expected);
    }
}
