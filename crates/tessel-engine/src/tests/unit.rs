//! Cross-module properties: predicate/selector agreement, parenthesization
//! round trips through the parser and fix composition.

use rstest::{fixture, rstest};
use tessel_syntax::{Document, Field, Language, NodeId, NodeKind};

use crate::fix::{
    append_argument, remove_argument, switch_new_expression_to_call_expression,
    wrap_in_parentheses,
};
use crate::{
    CallOptions, FixError, FixKind, Fixer, LogicalOperator, MemberOptions, MethodCallOptions,
    NewOptions, ParenContext, RawOptions, Selector, Side, UnaryOperator, compile_call,
    compile_call_or_new, compile_member, compile_method_call, compile_new, is_call_expression,
    is_call_or_new_expression, is_member_expression, is_method_call, is_new_expression,
    needs_parens,
};

fn parse(text: &str) -> Document {
    Document::parse(Language::JavaScript, text).expect("parse")
}

// =============================================================================
// Predicate and selector agreement
// =============================================================================

const CORPUS: &str = r#"
foo(); foo(a); foo(a, b); foo(...a); foo(a, ...b); foo?.(a); foo(a)(b);
new Foo; new Foo(); new Foo(a, b); new Foo(...a); new Map([]);
a.b; a?.b; a[b]; a["b"]; this.b; (a).b; a.b.c; a?.b?.c;
items.reduce(f); items.reduce(f, 0); items?.reduce(f); items.reduce?.(f);
items["reduce"](f); items.reduce(...args); items.reduce(f, ...rest);
items.reduceRight(f, 0, extra); Array.from(a); Array?.from(a, b);
require("x"); Map();
"#;

#[fixture]
fn corpus() -> Document {
    parse(CORPUS)
}

fn raw(json: &str) -> RawOptions {
    RawOptions::from_json(json).expect("raw options")
}

fn call_records() -> Vec<RawOptions> {
    vec![
        RawOptions::from("foo"),
        RawOptions::from(&["foo", "Map", "require"][..]),
        raw("{}"),
        raw(r#"{ "argumentsLength": 0 }"#),
        raw(r#"{ "argumentsLength": 1 }"#),
        raw(r#"{ "name": "foo", "argumentsLength": 1, "allowSpreadElement": true }"#),
        raw(r#"{ "minimumArguments": 1 }"#),
        raw(r#"{ "minimumArguments": 1, "maximumArguments": 2 }"#),
        raw(r#"{ "maximumArguments": 1, "allowSpreadElement": true }"#),
        raw(r#"{ "optional": true }"#),
        raw(r#"{ "optional": false, "minimumArguments": 2 }"#),
    ]
}

fn member_records() -> Vec<RawOptions> {
    vec![
        RawOptions::from("b"),
        RawOptions::from(&["b", "reduce"][..]),
        raw("{}"),
        raw(r#"{ "computed": true }"#),
        raw(r#"{ "computed": false, "optional": true }"#),
        raw(r#"{ "object": "a" }"#),
        raw(r#"{ "objects": ["a", "items"], "property": "b" }"#),
        raw(r#"{ "optional": false }"#),
    ]
}

fn method_records() -> Vec<RawOptions> {
    vec![
        RawOptions::from("reduce"),
        RawOptions::from(&["reduce", "reduceRight", "from"][..]),
        raw(r#"{ "methods": ["reduce", "reduceRight"], "minimumArguments": 1, "maximumArguments": 2 }"#),
        raw(r#"{ "method": "reduce", "argumentsLength": 1, "optionalCall": false, "optionalMember": false }"#),
        raw(r#"{ "object": "Array", "method": "from", "allowSpreadElement": true }"#),
        raw(r#"{ "computed": true }"#),
        raw(r#"{ "optionalMember": true }"#),
        raw(r#"{ "optionalCall": true, "method": "reduce" }"#),
    ]
}

fn every_node(document: &Document) -> Vec<NodeId> {
    let tree = document.tree();
    tree.descendants(tree.root())
}

/// Asserts that `predicate` and `selector` accept the same nodes and that
/// the selector survives rendering and parsing.
fn assert_agreement(
    document: &Document,
    selector: &Selector,
    predicate: impl Fn(NodeId) -> bool,
) -> usize {
    let tree = document.tree();
    let reparsed = Selector::parse(&selector.to_string()).expect("rendered selector parses");
    assert_eq!(&reparsed, selector);
    let mut accepted = 0;
    for node in every_node(document) {
        let expected = predicate(node);
        assert_eq!(
            selector.matches(tree, node),
            expected,
            "{selector} disagrees on {:?}",
            document.node_text(node)
        );
        if expected {
            accepted += 1;
        }
    }
    accepted
}

#[rstest]
fn call_predicates_agree_with_selectors(corpus: Document) {
    let tree = corpus.tree();
    let mut accepted = 0;
    for record in call_records() {
        let options = CallOptions::from_raw(&record).expect("call options");
        accepted += assert_agreement(&corpus, &compile_call(&options), |node| {
            is_call_expression(tree, node, &options)
        });
        accepted += assert_agreement(&corpus, &compile_call_or_new(&options), |node| {
            is_call_or_new_expression(tree, node, &options)
        });
        if options.optional.is_none() {
            let new_options = NewOptions::from_raw(&record).expect("new options");
            accepted += assert_agreement(&corpus, &compile_new(&new_options), |node| {
                is_new_expression(tree, node, &new_options)
            });
        }
    }
    assert!(accepted > 0, "corpus exercises no matches");
}

#[rstest]
fn member_predicates_agree_with_selectors(corpus: Document) {
    let tree = corpus.tree();
    for record in member_records() {
        let options = MemberOptions::from_raw(&record).expect("member options");
        let accepted = assert_agreement(&corpus, &compile_member(&options), |node| {
            is_member_expression(tree, node, &options)
        });
        assert!(accepted > 0, "{record:?} matched nothing");
    }
}

#[rstest]
fn method_predicates_agree_with_selectors(corpus: Document) {
    let tree = corpus.tree();
    for record in method_records() {
        let options = MethodCallOptions::from_raw(&record).expect("method options");
        let accepted = assert_agreement(&corpus, &compile_method_call(&options), |node| {
            is_method_call(tree, node, &options)
        });
        assert!(accepted > 0, "{record:?} matched nothing");
    }
}

#[rstest]
#[case(r#"{ "method": "reduce", "argumentsLength": 1 }"#, &["items.reduce(f)", "items?.reduce(f)", "items.reduce?.(f)"])]
#[case(r#"{ "method": "reduce", "argumentsLength": 1, "optionalCall": false, "optionalMember": false }"#, &["items.reduce(f)"])]
#[case(r#"{ "object": "Array", "method": "from", "maximumArguments": 1 }"#, &["Array.from(a)"])]
fn method_records_select_expected_calls(#[case] json: &str, #[case] expected: &[&str]) {
    let document = parse(CORPUS);
    let options = MethodCallOptions::from_raw(&raw(json)).expect("options");
    let selected: Vec<&str> = compile_method_call(&options)
        .select(document.tree())
        .into_iter()
        .map(|node| document.node_text(node))
        .collect();
    assert_eq!(selected, expected);
}

// =============================================================================
// Parenthesization round trips
// =============================================================================

/// Places the expression from `x = (expression);` into `template` at `{}`,
/// wrapping it when the oracle asks for it, and checks that the reparsed
/// text holds the expression in the `role` slot of a `parent` node.
fn assert_round_trip(
    expression: &str,
    context: ParenContext,
    template: &str,
    parent: NodeKind,
    role: Field,
) -> bool {
    let original = parse(&format!("x = ({expression});"));
    let assignment = original
        .first_of_kind(NodeKind::AssignmentExpression)
        .expect("assignment");
    let node = original
        .tree()
        .field(assignment, Field::Right)
        .expect("expression");
    let wrap = needs_parens(original.tree(), original.source(), node, context);
    let inserted = if wrap {
        format!("({expression})")
    } else {
        expression.to_owned()
    };
    let placeholder = template.find("{}").expect("placeholder");
    let start = placeholder + usize::from(wrap);
    let text = template.replacen("{}", &inserted, 1);

    let document = parse(&text);
    assert!(document.is_valid(), "{text:?} does not parse");
    let tree = document.tree();
    let found = every_node(&document).into_iter().any(|candidate| {
        tree.range(candidate) == (start..start + expression.len())
            && tree.role(candidate) == Some(role)
            && tree.parent(candidate).is_some_and(|owner| tree.is(owner, parent))
    });
    assert!(found, "{text:?} changed the meaning of {expression:?}");
    wrap
}

#[rstest]
#[case("a.b", false)]
#[case("a()", false)]
#[case("new Foo()", false)]
#[case("new Foo", true)]
#[case("a || b", true)]
#[case("a ? b : c", true)]
#[case("x => x", true)]
#[case("typeof a", true)]
#[case("a++", true)]
#[case("a?.b", true)]
fn call_callee_round_trips(#[case] expression: &str, #[case] wraps: bool) {
    let wrapped = assert_round_trip(
        expression,
        ParenContext::CallCallee,
        "{}();",
        NodeKind::CallExpression,
        Field::Callee,
    );
    assert_eq!(wrapped, wraps);
}

#[rstest]
#[case("a.b", false)]
#[case("a()", true)]
#[case("a.b()", true)]
#[case("a + b", true)]
fn new_callee_round_trips(#[case] expression: &str, #[case] wraps: bool) {
    let wrapped = assert_round_trip(
        expression,
        ParenContext::NewCallee,
        "new {}();",
        NodeKind::NewExpression,
        Field::Callee,
    );
    assert_eq!(wrapped, wraps);
}

#[rstest]
#[case("a", false)]
#[case("1.5", false)]
#[case("'s'", false)]
#[case("new Foo()", false)]
#[case("1", true)]
#[case("1_000", true)]
#[case("0x1F", false)]
#[case("new Foo", true)]
#[case("-a", true)]
#[case("a = b", true)]
fn member_object_round_trips(#[case] expression: &str, #[case] wraps: bool) {
    let wrapped = assert_round_trip(
        expression,
        ParenContext::MemberObject,
        "{}.prop;",
        NodeKind::MemberExpression,
        Field::Object,
    );
    assert_eq!(wrapped, wraps);
}

#[rstest]
#[case("a || b", false)]
#[case("a = b", false)]
#[case("a, b", true)]
fn spread_argument_round_trips(#[case] expression: &str, #[case] wraps: bool) {
    let wrapped = assert_round_trip(
        expression,
        ParenContext::SpreadArgument,
        "f(...{});",
        NodeKind::SpreadElement,
        Field::Argument,
    );
    assert_eq!(wrapped, wraps);
}

#[rstest]
#[case("a || b", LogicalOperator::Or, Side::Left, "{} || z;", false)]
#[case("a || b", LogicalOperator::Or, Side::Right, "z || {};", true)]
#[case("a && b", LogicalOperator::Or, Side::Right, "z || {};", false)]
#[case("a || b", LogicalOperator::And, Side::Left, "{} && z;", true)]
#[case("a ?? b", LogicalOperator::Or, Side::Left, "{} || z;", true)]
#[case("a || b", LogicalOperator::Coalesce, Side::Right, "z ?? {};", true)]
#[case("a + b", LogicalOperator::Coalesce, Side::Left, "{} ?? z;", false)]
#[case("a ? b : c", LogicalOperator::And, Side::Left, "{} && z;", true)]
fn logical_operand_round_trips(
    #[case] expression: &str,
    #[case] operator: LogicalOperator,
    #[case] side: Side,
    #[case] template: &str,
    #[case] wraps: bool,
) {
    let wrapped = assert_round_trip(
        expression,
        ParenContext::LogicalOperand { operator, side },
        template,
        NodeKind::LogicalExpression,
        if side == Side::Left { Field::Left } else { Field::Right },
    );
    assert_eq!(wrapped, wraps);
}

#[rstest]
#[case("a.b", false)]
#[case("-a", false)]
#[case("a ? b : c", true)]
#[case("x => x", true)]
fn await_argument_round_trips(#[case] expression: &str, #[case] wraps: bool) {
    let wrapped = assert_round_trip(
        expression,
        ParenContext::AwaitArgument,
        "async function f() { await {}; }",
        NodeKind::AwaitExpression,
        Field::Argument,
    );
    assert_eq!(wrapped, wraps);
}

#[rstest]
#[case("+a", UnaryOperator::Minus, false)]
#[case("-a", UnaryOperator::Minus, true)]
#[case("--a", UnaryOperator::Minus, true)]
#[case("a * b", UnaryOperator::Not, true)]
#[case("a.b", UnaryOperator::Typeof, false)]
fn unary_argument_round_trips(
    #[case] expression: &str,
    #[case] operator: UnaryOperator,
    #[case] wraps: bool,
) {
    let separator = if operator == UnaryOperator::Typeof { " " } else { "" };
    let template = format!("{operator}{separator}{{}};");
    let wrapped = assert_round_trip(
        expression,
        ParenContext::UnaryArgument { operator },
        &template,
        NodeKind::UnaryExpression,
        Field::Argument,
    );
    assert_eq!(wrapped, wraps);
}

// =============================================================================
// Fix composition
// =============================================================================

#[test]
fn primitives_compose_into_one_fix() {
    let code = "const m = new Map;\nuse(a, b);";
    let document = parse(code);
    let tree = document.tree();
    let new_expression = document
        .first_of_kind(NodeKind::NewExpression)
        .expect("new");
    let call = document
        .first_of_kind(NodeKind::CallExpression)
        .expect("call");
    let second = *tree
        .field_list(call, Field::Arguments)
        .get(1)
        .expect("argument");

    let mut fixer = Fixer::for_document(&document);
    switch_new_expression_to_call_expression(&mut fixer, new_expression).expect("switch");
    remove_argument(&mut fixer, second).expect("remove");
    append_argument(&mut fixer, call, "c").expect("append");
    let descriptor = fixer.finish().expect("descriptor");

    assert_eq!(descriptor.kind(), FixKind::Fix);
    let ranges: Vec<_> = descriptor.edits().iter().map(|edit| edit.range.clone()).collect();
    assert!(ranges.windows(2).all(|pair| match pair {
        [first, next] => first.end <= next.start,
        _ => true,
    }));
    assert_eq!(
        descriptor.apply(code).expect("apply"),
        "const m = Map();\nuse(a, c);"
    );
}

#[test]
fn overlapping_primitives_are_rejected() {
    let document = parse("f(a);");
    let call = document
        .first_of_kind(NodeKind::CallExpression)
        .expect("call");
    let argument = *document
        .tree()
        .field_list(call, Field::Arguments)
        .first()
        .expect("argument");
    let mut fixer = Fixer::for_document(&document);
    wrap_in_parentheses(&mut fixer, argument);
    fixer.replace_text_range(1..3, "");
    assert!(matches!(
        fixer.into_fix(),
        Err(FixError::OverlappingEdits { .. })
    ));
}
