//! Automatic semicolon insertion hazards.

use tessel_syntax::{Field, NodeFlags, NodeId, NodeKind, SourceCode, SyntaxTree, Token, TokenKind};

/// First characters that can continue the previous statement.
const HAZARD_STARTS: [char; 9] = ['[', '(', '/', '`', '+', '-', '*', ',', '.'];

/// Returns whether inserting `text` right after `token_before`, at the start
/// of a statement, would be read as a continuation of the previous
/// statement. Callers prefix the inserted text with `;` when it would.
#[must_use]
pub fn needs_semicolon(
    tree: &SyntaxTree,
    source: &SourceCode,
    token_before: Option<&Token>,
    text: &str,
) -> bool {
    let Some(first) = text.chars().next() else {
        return false;
    };
    if !HAZARD_STARTS.contains(&first) {
        return false;
    }
    let Some(token) = token_before else {
        return false;
    };
    let last_node = tree.node_containing(token.range.start);
    match token.kind {
        TokenKind::Punctuator => match token.text.as_str() {
            ";" | "{" => false,
            "]" => true,
            ")" => !closes_statement_head(tree, source, token),
            "++" | "--" => {
                tree.is(last_node, NodeKind::UpdateExpression)
                    && !tree[last_node].flags().contains(NodeFlags::PREFIX)
            }
            "}" => closes_expression(tree, last_node),
            ">" | "/>" => closes_jsx(tree, last_node, token),
            _ => false,
        },
        TokenKind::String
        | TokenKind::Null
        | TokenKind::Boolean
        | TokenKind::Numeric
        | TokenKind::RegularExpression => true,
        TokenKind::Template => token.text.ends_with('`'),
        TokenKind::Identifier => true,
        // `of`, `await` and friends arrive as keywords and never end a statement.
        TokenKind::Keyword => matches!(token.text.as_str(), "this" | "super"),
        TokenKind::JsxText | TokenKind::LineComment | TokenKind::BlockComment => false,
    }
}

/// `if (a)` and loop heads end in `)` without ending a statement.
fn closes_statement_head(tree: &SyntaxTree, source: &SourceCode, token: &Token) -> bool {
    let node = tree.node_containing(token.range.start);
    let body = match tree.kind(node) {
        NodeKind::IfStatement => tree.field(node, Field::Consequent),
        NodeKind::ForStatement
        | NodeKind::ForInStatement
        | NodeKind::ForOfStatement
        | NodeKind::WhileStatement
        | NodeKind::WithStatement => tree.field(node, Field::Body),
        _ => None,
    };
    body.is_some_and(|statement| {
        source
            .token_before(tree.range(statement).start)
            .is_some_and(|before| before.range == token.range)
    })
}

/// A `}` that ends an object, function or class expression.
fn closes_expression(tree: &SyntaxTree, node: NodeId) -> bool {
    match tree.kind(node) {
        NodeKind::ObjectExpression | NodeKind::ClassExpression => true,
        NodeKind::BlockStatement | NodeKind::ClassBody => tree.parent(node).is_some_and(|parent| {
            matches!(
                tree.kind(parent),
                NodeKind::FunctionExpression | NodeKind::ClassExpression
            )
        }),
        _ => false,
    }
}

/// A `>` or `/>` that ends a whole JSX element or fragment.
fn closes_jsx(tree: &SyntaxTree, node: NodeId, token: &Token) -> bool {
    let is_jsx = |id: NodeId| tree[id].raw_kind().starts_with("jsx_");
    if !is_jsx(node) {
        return false;
    }
    let mut outermost = node;
    while let Some(parent) = tree.parent(outermost).filter(|parent| is_jsx(*parent)) {
        outermost = parent;
    }
    tree.range(outermost).end == token.range.end
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tessel_syntax::{Document, Language};

    /// Checks the hazard for `text` inserted at the `|` marker in `source`.
    fn hazard(source: &str, text: &str) -> bool {
        let offset = source.find('|').expect("marker");
        let code = source.replacen('|', " ", 1);
        let document = Document::parse(Language::JavaScript, &code).expect("parse");
        let token = document.source().token_before(offset);
        needs_semicolon(document.tree(), document.source(), token, text)
    }

    #[rstest]
    #[case("foo()|", "(a)")]
    #[case("foo()|", "[a]")]
    #[case("a[0]|", "`t`")]
    #[case("x = /r/g|", "/a/")]
    #[case("x = `t`|", "+a")]
    #[case("a++|", "-a")]
    #[case("a--|", "(a)")]
    #[case("x = 'a'|", "[a]")]
    #[case("x = 1|", "(a)")]
    #[case("x = null|", "(a)")]
    #[case("x = {}|", "[a]")]
    #[case("x = function () {}|", "(a)")]
    #[case("x = class {}|", "(a)")]
    #[case("x = y|", "(a)")]
    #[case("x = this|", "[a]")]
    #[case("x = <div />|", "(a)")]
    #[case("x = <div></div>|", "[a]")]
    #[case("x = <></>|", "(a)")]
    fn hazards_need_a_semicolon(#[case] source: &str, #[case] text: &str) {
        assert!(hazard(source, text));
    }

    #[rstest]
    #[case("foo();|", "(a)")]
    #[case("{| b() }", "(a)")]
    #[case("if (a)| b();", "(b)")]
    #[case("for (const x of y)| f(x);", "[x]")]
    #[case("for (const x of| y) {}", "[x]")]
    #[case("while (a)| b();", "(b)")]
    #[case("foo()|", "a()")]
    #[case("foo()|", "")]
    #[case("| a()", "(a)")]
    #[case("function f() {}|", "(a)")]
    fn safe_insertions_need_no_semicolon(#[case] source: &str, #[case] text: &str) {
        assert!(!hazard(source, text));
    }
}
