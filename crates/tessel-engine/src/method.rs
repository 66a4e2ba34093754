//! Member/call composition.
//!
//! A method call is a call predicate conjoined with a member predicate on
//! the callee. Object-name filters only accept a plain identifier object, so
//! `a[b].map()` or `a().map()` never match `{ object: "a" }`.

use tessel_syntax::{Field, NodeId, SyntaxTree};
use tracing::trace;

use crate::error::OptionsError;
use crate::options::{MethodCallOptions, RawOptions};
use crate::shape::{is_call_expression, is_member_expression};

/// Returns whether `node` is a call of a member expression matching both
/// halves of `options`.
#[must_use]
pub fn is_method_call(tree: &SyntaxTree, node: NodeId, options: &MethodCallOptions) -> bool {
    if !is_call_expression(tree, node, &options.call) {
        return false;
    }
    let matched = tree
        .field(node, Field::Callee)
        .is_some_and(|callee| is_member_expression(tree, callee, &options.member));
    trace!(node = node.index(), matched, "method call check");
    matched
}

/// Normalizes `raw` and runs [`is_method_call`]. A bare string or list
/// names the methods.
///
/// # Errors
///
/// Returns an error when the options are contradictory.
pub fn is_method_call_raw(
    tree: &SyntaxTree,
    node: NodeId,
    raw: &RawOptions,
) -> Result<bool, OptionsError> {
    Ok(is_method_call(tree, node, &MethodCallOptions::from_raw(raw)?))
}

/// Returns the method name of a call such as `a.b()`, when the property is a
/// plain identifier.
#[must_use]
pub fn method_name(tree: &SyntaxTree, call: NodeId) -> Option<&str> {
    let callee = tree.field(call, Field::Callee)?;
    let member = tree.get(callee)?;
    if member.is_computed() {
        return None;
    }
    member.field(Field::Property).and_then(|property| tree.name(property))
}
