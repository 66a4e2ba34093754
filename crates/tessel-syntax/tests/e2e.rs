//! End-to-end tests for tessel-syntax using insta for snapshot testing.
//!
//! These tests drive the public API from source text to the lowered tree,
//! the token stream and the scope table.

use std::fmt::Write as _;
use std::path::Path;

use insta::assert_snapshot;
use rstest::rstest;

use tessel_syntax::{Document, Language, NodeId, SyntaxError};

fn parse(language: Language, text: &str) -> Document {
    Document::parse(language, text).unwrap_or_else(|err| panic!("parse: {err}"))
}

/// Renders the tree as one line per node: role, kind and, for leaves, text.
fn outline(document: &Document) -> String {
    fn walk(document: &Document, node: NodeId, depth: usize, out: &mut String) {
        let tree = document.tree();
        let role = tree
            .role(node)
            .map_or_else(String::new, |field| format!("{field}: "));
        let children = tree[node].children();
        let text = if children.is_empty() {
            format!(" {}", document.node_text(node))
        } else {
            String::new()
        };
        let indent = "  ".repeat(depth);
        writeln!(out, "{indent}{role}{}{text}", tree.kind(node))
            .unwrap_or_else(|err| panic!("write: {err}"));
        for child in children {
            walk(document, *child, depth + 1, out);
        }
    }

    let mut out = String::new();
    walk(document, document.tree().root(), 0, &mut out);
    out
}

// =============================================================================
// Happy Path: Lowering
// =============================================================================

#[test]
fn snapshot_method_call_outline() {
    let document = parse(Language::JavaScript, "foo.bar(1);");
    assert_snapshot!(outline(&document), @r"
    Program
      body: ExpressionStatement
        expression: CallExpression
          callee: MemberExpression
            object: Identifier foo
            property: Identifier bar
          arguments: Literal 1
    ");
}

#[test]
fn snapshot_reduce_callback_outline() {
    let document = parse(
        Language::JavaScript,
        "foo.reduce((total, item) => total + item);",
    );
    assert_snapshot!(outline(&document), @r"
    Program
      body: ExpressionStatement
        expression: CallExpression
          callee: MemberExpression
            object: Identifier foo
            property: Identifier reduce
          arguments: ArrowFunctionExpression
            params: Identifier total
            params: Identifier item
            body: BinaryExpression
              left: Identifier total
              right: Identifier item
    ");
}

#[test]
fn snapshot_token_kinds() {
    let document = parse(Language::JavaScript, "x = `a${b}c` + /r/g; // end");
    let tokens: Vec<String> = document
        .source()
        .tokens()
        .iter()
        .chain(document.source().comments())
        .map(|token| format!("{:?} {}", token.kind, token.text))
        .collect();
    assert_snapshot!(tokens.join("\n"), @r"
    Identifier x
    Punctuator =
    Template `a${
    Identifier b
    Template }c`
    Punctuator +
    RegularExpression /r/g
    Punctuator ;
    LineComment // end
    ");
}

#[test]
fn snapshot_language_detection() {
    let paths = ["a.js", "b.mjs", "c.jsx", "d.ts", "e.tsx", "f.json"];
    let results: Vec<String> = paths
        .iter()
        .map(|path| format!("{path}: {:?}", Language::from_path(Path::new(path))))
        .collect();
    assert_snapshot!(results.join("\n"), @r"
    a.js: Some(JavaScript)
    b.mjs: Some(JavaScript)
    c.jsx: Some(JavaScript)
    d.ts: Some(TypeScript)
    e.tsx: Some(Tsx)
    f.json: None
    ");
}

#[rstest]
#[case(Language::JavaScript, "const el = <List items={items} />;")]
#[case(Language::TypeScript, "function size<T>(xs: T[]): number { return xs.length; }")]
#[case(Language::Tsx, "export default function App() { return <main />; }")]
fn documents_parse_cleanly(#[case] language: Language, #[case] text: &str) {
    let document = parse(language, text);
    assert!(document.is_valid(), "{:?}", document.errors());
    assert_eq!(document.language(), language);
}

// =============================================================================
// Unhappy Path
// =============================================================================

#[test]
fn broken_source_still_produces_a_document() {
    let document = parse(Language::JavaScript, "foo(1;\nbar();");
    assert!(!document.is_valid());
    let first = document
        .errors()
        .first()
        .unwrap_or_else(|| panic!("expected a syntax error"));
    assert!(first.line >= 1);
}

#[test]
fn unknown_language_names_are_rejected() {
    let err = "cobol"
        .parse::<Language>()
        .expect_err("cobol is not supported");
    assert_eq!(err.to_string(), "unsupported language: 'cobol'");
}

#[test]
fn paths_without_a_script_extension_are_rejected() {
    let err = Document::parse_path(Path::new("notes.txt"), "hello")
        .expect_err("text files are not scripts");
    assert!(matches!(err, SyntaxError::UnknownLanguage { .. }));
    assert_snapshot!(err.to_string(), @"could not determine language for path: notes.txt");
}

#[test]
fn paths_pick_the_grammar() {
    let document = Document::parse_path(Path::new("src/view.tsx"), "const v = <a>{x as T}</a>;")
        .unwrap_or_else(|err| panic!("parse: {err}"));
    assert_eq!(document.language(), Language::Tsx);
    assert!(document.is_valid(), "{:?}", document.errors());
}
