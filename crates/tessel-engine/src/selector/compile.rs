//! Compiles typed option records into selectors.
//!
//! Clause order follows the predicate checks: optional flag, argument
//! bounds, spread window, then names.

use std::collections::BTreeSet;

use tessel_syntax::NodeKind;

use super::ast::{AttributeValue, Clause, Comparison, Selector};
use crate::options::{CallOptions, MemberOptions, MethodCallOptions, NewOptions};

fn count(value: usize) -> AttributeValue {
    AttributeValue::Num(i64::try_from(value).unwrap_or(i64::MAX))
}

fn flag_clause(path: &[&str], expected: Option<bool>) -> Option<Clause> {
    expected.map(|wanted| {
        let op = if wanted { Comparison::Eq } else { Comparison::NotEq };
        Clause::attribute(path, op, AttributeValue::Bool(true))
    })
}

fn identifier_clauses(field: &str, names: &BTreeSet<String>) -> Vec<Clause> {
    if names.is_empty() {
        return Vec::new();
    }
    vec![
        Clause::equals(&[field, "type"], NodeKind::Identifier.as_str()),
        Clause::any(
            names
                .iter()
                .map(|name| Clause::equals(&[field, "name"], name.as_str()))
                .collect(),
        ),
    ]
}

fn call_clauses(options: &CallOptions) -> Vec<Clause> {
    let mut clauses: Vec<Clause> = flag_clause(&["optional"], options.optional)
        .into_iter()
        .collect();
    let bounds = options.arguments;
    if let Some(exact) = bounds.exact() {
        clauses.push(Clause::attribute(&["arguments", "length"], Comparison::Eq, count(exact)));
    }
    if bounds.min() > 0 {
        clauses.push(Clause::attribute(
            &["arguments", "length"],
            Comparison::Ge,
            count(bounds.min()),
        ));
    }
    if let Some(max) = bounds.max() {
        clauses.push(Clause::attribute(&["arguments", "length"], Comparison::Le, count(max)));
    }
    if !options.allow_spread
        && let Some(window) = bounds.spread_window()
    {
        clauses.extend((0..window).map(|index| {
            let position = index.to_string();
            Clause::attribute(
                &["arguments", position.as_str(), "type"],
                Comparison::NotEq,
                AttributeValue::Str(NodeKind::SpreadElement.as_str().to_owned()),
            )
        }));
    }
    clauses.extend(identifier_clauses("callee", &options.names));
    clauses
}

fn member_clauses(options: &MemberOptions) -> Vec<Clause> {
    let mut clauses: Vec<Clause> = flag_clause(&["optional"], options.optional)
        .into_iter()
        .chain(flag_clause(&["computed"], options.computed))
        .collect();
    clauses.extend(identifier_clauses("property", &options.properties));
    clauses.extend(identifier_clauses("object", &options.objects));
    clauses
}

/// Compiles the selector equivalent to
/// [`is_call_expression`](crate::shape::is_call_expression).
#[must_use]
pub fn compile_call(options: &CallOptions) -> Selector {
    Selector::new(Some(NodeKind::CallExpression.as_str()), call_clauses(options))
}

/// Compiles the selector equivalent to
/// [`is_new_expression`](crate::shape::is_new_expression).
#[must_use]
pub fn compile_new(options: &NewOptions) -> Selector {
    Selector::new(Some(NodeKind::NewExpression.as_str()), call_clauses(&options.as_call()))
}

/// Compiles the selector equivalent to
/// [`is_call_or_new_expression`](crate::shape::is_call_or_new_expression).
#[must_use]
pub fn compile_call_or_new(options: &CallOptions) -> Selector {
    let kinds = Clause::any(vec![
        Clause::Type(NodeKind::CallExpression.as_str().to_owned()),
        Clause::Type(NodeKind::NewExpression.as_str().to_owned()),
    ]);
    let clauses = std::iter::once(kinds).chain(call_clauses(options)).collect();
    Selector::new(None, clauses)
}

/// Compiles the selector equivalent to
/// [`is_member_expression`](crate::shape::is_member_expression).
#[must_use]
pub fn compile_member(options: &MemberOptions) -> Selector {
    Selector::new(Some(NodeKind::MemberExpression.as_str()), member_clauses(options))
}

/// Compiles the selector equivalent to
/// [`is_method_call`](crate::method::is_method_call).
#[must_use]
pub fn compile_method_call(options: &MethodCallOptions) -> Selector {
    let callee_type = Clause::equals(&["callee", "type"], NodeKind::MemberExpression.as_str());
    let clauses = std::iter::once(callee_type)
        .chain(call_clauses(&options.call))
        .chain(
            member_clauses(&options.member)
                .iter()
                .map(|clause| clause.prefixed("callee")),
        )
        .collect();
    Selector::new(Some(NodeKind::CallExpression.as_str()), clauses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RawOptions;
    use insta::assert_snapshot;

    fn method(json: &str) -> MethodCallOptions {
        let raw = RawOptions::from_json(json).expect("raw");
        MethodCallOptions::from_raw(&raw).expect("options")
    }

    #[test]
    fn reduce_method_selector() {
        let selector = compile_method_call(&method(
            r#"{ "methods": ["reduce", "reduceRight"], "minimumArguments": 1, "maximumArguments": 2, "optionalCall": false, "optionalMember": false }"#,
        ));
        assert_snapshot!(selector.to_string(), @r#"CallExpression[callee.type="MemberExpression"][optional!=true][arguments.length>=1][arguments.length<=2][arguments.0.type!="SpreadElement"][arguments.1.type!="SpreadElement"][callee.optional!=true][callee.computed!=true][callee.property.type="Identifier"]:matches([callee.property.name="reduce"], [callee.property.name="reduceRight"])"#);
    }

    #[test]
    fn single_name_does_not_use_matches() {
        let options = CallOptions::from_raw(&RawOptions::from("require")).expect("options");
        assert_snapshot!(compile_call(&options).to_string(), @r#"CallExpression[callee.type="Identifier"][callee.name="require"]"#);
    }

    #[test]
    fn call_or_new_has_no_head() {
        let raw = RawOptions::from_json(r#"{ "name": "Map", "argumentsLength": 0 }"#).expect("raw");
        let options = CallOptions::from_raw(&raw).expect("options");
        assert_snapshot!(compile_call_or_new(&options).to_string(), @r#":matches(CallExpression, NewExpression)[arguments.length=0][callee.type="Identifier"][callee.name="Map"]"#);
    }

    #[test]
    fn empty_member_options_match_every_member() {
        assert_snapshot!(compile_member(&MemberOptions::default()).to_string(), @"MemberExpression");
    }

    #[test]
    fn names_with_quotes_are_escaped() {
        let options = CallOptions::from_raw(&RawOptions::from(r#"a"b"#)).expect("options");
        assert_snapshot!(compile_call(&options).to_string(), @r#"CallExpression[callee.type="Identifier"][callee.name="a\"b"]"#);
    }
}
