//! Adding and removing call arguments.

use tessel_syntax::{Field, NodeId, NodeKind};

use super::fixer::Fixer;
use crate::error::FixError;
use crate::parens::{is_new_with_parentheses, parenthesized_range};

/// Appends `text` as the last argument of a call or `new` expression.
///
/// A trailing comma is kept after the new argument.
///
/// # Errors
///
/// Returns [`FixError::UnsupportedNode`] for other nodes and
/// [`FixError::MissingToken`] for `new Foo` written without an argument
/// list.
pub fn append_argument(fixer: &mut Fixer<'_>, call: NodeId, text: &str) -> Result<(), FixError> {
    const PRIMITIVE: &str = "append_argument";
    let (tree, source) = (fixer.tree(), fixer.source());
    match tree.kind(call) {
        NodeKind::CallExpression => {}
        NodeKind::NewExpression if is_new_with_parentheses(tree, source, call) => {}
        NodeKind::NewExpression => {
            return Err(FixError::MissingToken {
                primitive: PRIMITIVE,
                token: "(",
            });
        }
        kind => {
            return Err(FixError::UnsupportedNode {
                primitive: PRIMITIVE,
                kind: kind.as_str(),
            });
        }
    }
    let close = source
        .last_token(tree.range(call))
        .filter(|token| token.is_closing_paren())
        .ok_or(FixError::MissingToken {
            primitive: PRIMITIVE,
            token: ")",
        })?;
    let has_arguments = !tree.field_list(call, Field::Arguments).is_empty();
    let trailing_comma = source
        .token_before(close.range.start)
        .is_some_and(|token| token.is_comma());
    let insertion = match (has_arguments, trailing_comma) {
        (true, true) => format!(" {text},"),
        (true, false) => format!(", {text}"),
        (false, _) => text.to_owned(),
    };
    fixer.insert_text_before_range(close.range.clone(), insertion);
    Ok(())
}

/// Removes `argument` together with the comma that separates it from its
/// neighbours.
///
/// Redundant parentheses around the argument go with it. Comments between
/// the argument and its comma mark the fix as lossy.
///
/// # Errors
///
/// Returns [`FixError::UnsupportedNode`] when `argument` is not an argument
/// of a call or `new` expression, and [`FixError::MissingToken`] when the
/// separating comma cannot be found.
pub fn remove_argument(fixer: &mut Fixer<'_>, argument: NodeId) -> Result<(), FixError> {
    const PRIMITIVE: &str = "remove_argument";
    let (tree, source) = (fixer.tree(), fixer.source());
    let call = tree
        .parent(argument)
        .filter(|parent| {
            matches!(
                tree.kind(*parent),
                NodeKind::CallExpression | NodeKind::NewExpression
            ) && tree.role(argument) == Some(Field::Arguments)
        })
        .ok_or(FixError::UnsupportedNode {
            primitive: PRIMITIVE,
            kind: tree.kind(argument).as_str(),
        })?;
    let arguments = tree.field_list(call, Field::Arguments);
    let index = arguments
        .iter()
        .position(|candidate| *candidate == argument)
        .unwrap_or_default();
    let outer = parenthesized_range(tree, source, argument);
    let missing_comma = FixError::MissingToken {
        primitive: PRIMITIVE,
        token: ",",
    };
    let removed = if index > 0 {
        let comma = source
            .token_before(outer.start)
            .filter(|token| token.is_comma())
            .ok_or(missing_comma)?;
        comma.range.start..outer.end
    } else if arguments.len() > 1 {
        let comma = source
            .token_after(outer.end)
            .filter(|token| token.is_comma())
            .ok_or(missing_comma)?;
        let end = source
            .token_after_including_comments(comma.range.end)
            .map_or(comma.range.end, |next| next.range.start);
        outer.start..end
    } else {
        let end = source
            .token_after(outer.end)
            .filter(|token| token.is_comma())
            .map_or(outer.end, |comma| comma.range.end);
        outer.start..end
    };
    fixer.guard_comments(removed.clone(), &outer);
    fixer.remove_range(removed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fix::FixKind;
    use rstest::rstest;
    use tessel_syntax::{Document, Language};

    fn append(code: &str, text: &str) -> Result<String, FixError> {
        let document = Document::parse(Language::JavaScript, code).expect("parse");
        let call = document
            .first_of_kind(NodeKind::CallExpression)
            .or_else(|| document.first_of_kind(NodeKind::NewExpression))
            .expect("call");
        let mut fixer = Fixer::for_document(&document);
        append_argument(&mut fixer, call, text)?;
        fixer.finish()?.apply(code)
    }

    /// Removes the argument at `index` of the first call.
    fn remove(code: &str, index: usize) -> (String, FixKind) {
        let document = Document::parse(Language::JavaScript, code).expect("parse");
        let call = document
            .first_of_kind(NodeKind::CallExpression)
            .or_else(|| document.first_of_kind(NodeKind::NewExpression))
            .expect("call");
        let argument = *document
            .tree()
            .field_list(call, Field::Arguments)
            .get(index)
            .expect("argument");
        let mut fixer = Fixer::for_document(&document);
        remove_argument(&mut fixer, argument).expect("remove");
        let descriptor = fixer.finish().expect("descriptor");
        (descriptor.apply(code).expect("apply"), descriptor.kind())
    }

    #[rstest]
    #[case("f()", "f(x)")]
    #[case("f(a)", "f(a, x)")]
    #[case("f(a,)", "f(a, x,)")]
    #[case("f(a, b)", "f(a, b, x)")]
    #[case("new F()", "new F(x)")]
    #[case("new F(a)", "new F(a, x)")]
    #[case("f?.(a)", "f?.(a, x)")]
    fn appends_arguments(#[case] code: &str, #[case] expected: &str) {
        assert_eq!(append(code, "x").expect("append"), expected);
    }

    #[test]
    fn append_rejects_new_without_argument_list() {
        assert_eq!(
            append("new F", "x"),
            Err(FixError::MissingToken {
                primitive: "append_argument",
                token: "(",
            })
        );
    }

    #[test]
    fn append_rejects_other_nodes() {
        let document = Document::parse(Language::JavaScript, "a.b").expect("parse");
        let member = document
            .first_of_kind(NodeKind::MemberExpression)
            .expect("member");
        let mut fixer = Fixer::for_document(&document);
        assert!(matches!(
            append_argument(&mut fixer, member, "x"),
            Err(FixError::UnsupportedNode { .. })
        ));
    }

    #[rstest]
    #[case("f(a)", 0, "f()")]
    #[case("f(a,)", 0, "f()")]
    #[case("f(a, b)", 0, "f(b)")]
    #[case("f(a, b)", 1, "f(a)")]
    #[case("f(a, b, c)", 1, "f(a, c)")]
    #[case("f(a, b,)", 1, "f(a,)")]
    #[case("f(((a)), b)", 0, "f(b)")]
    #[case("f(a, ...b)", 1, "f(a)")]
    #[case("new F(a, b)", 0, "new F(b)")]
    fn removes_arguments(#[case] code: &str, #[case] index: usize, #[case] expected: &str) {
        assert_eq!(remove(code, index), (expected.to_owned(), FixKind::Fix));
    }

    #[test]
    fn removing_a_comment_downgrades_to_a_suggestion() {
        assert_eq!(
            remove("f(a, /* keep */ b)", 1),
            ("f(a)".to_owned(), FixKind::Suggestion)
        );
    }

    #[test]
    fn comment_after_the_comma_survives() {
        assert_eq!(
            remove("f(a, /* keep */ b)", 0),
            ("f(/* keep */ b)".to_owned(), FixKind::Fix)
        );
    }
}
