//! Text edits, fix descriptors and the safe rewrite primitives.
//!
//! Primitives never touch the source themselves. They record edits in a
//! [`Fixer`], which validates ordering and disjointness when it is turned
//! into a [`FixDescriptor`]. Applying the descriptor is left to the host;
//! [`FixDescriptor::apply`] exists for hosts and tests that want a string.

mod arguments;
mod edit;
mod escape;
mod fixer;
mod members;
mod semicolon;

pub use arguments::{append_argument, remove_argument};
pub use edit::{FixDescriptor, FixKind, TextEdit};
pub use escape::{escape_string, escape_template_element_raw};
pub use fixer::Fixer;
pub use members::{
    remove_member_expression_property, remove_method_call, remove_parentheses,
    replace_node_with_text, replace_template_element, switch_new_expression_to_call_expression,
    wrap_in_parentheses,
};
pub use semicolon::needs_semicolon;
