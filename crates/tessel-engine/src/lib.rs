//! Structural matching and safe rewriting for JavaScript lint rules.
//!
//! The engine answers the questions most rules ask before they report:
//!
//! - **Shape predicates** ([`is_call_expression`], [`is_method_call`], ...)
//!   driven by typed option records normalized once from user-facing
//!   [`RawOptions`]
//! - **Selectors** compiled from the same records, so a traversal host and
//!   the predicates agree on every node ([`compile_method_call`],
//!   [`Selector`], [`SelectorCache`])
//! - **Names**: scope-aware free-name search and singularization
//!   ([`NameResolver`], [`singular`])
//! - **Parentheses**: precedence checks and redundant-paren ranges
//!   ([`needs_parens`], [`parenthesized_range`])
//! - **Fixes**: rewrite primitives that record non-overlapping edits in a
//!   [`Fixer`] and return a [`FixDescriptor`]
//!
//! Everything works on the read-only views built by [`tessel_syntax`].
//!
//! # Example
//!
//! ```
//! use tessel_engine::{MethodCallOptions, RawOptions, compile_method_call, is_method_call};
//! use tessel_syntax::{Document, Language, NodeKind};
//!
//! let raw = RawOptions::from_json(r#"{ "method": "reduce", "minimumArguments": 1 }"#)?;
//! let options = MethodCallOptions::from_raw(&raw)?;
//! assert_eq!(
//!     compile_method_call(&options).to_string(),
//!     r#"CallExpression[callee.type="MemberExpression"][arguments.length>=1][callee.computed!=true][callee.property.type="Identifier"][callee.property.name="reduce"]"#,
//! );
//!
//! let document = Document::parse(Language::JavaScript, "items.reduce(add, 0);")?;
//! let call = document.first_of_kind(NodeKind::CallExpression).expect("call");
//! assert!(is_method_call(document.tree(), call, &options));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod error;
pub mod fix;
mod method;
mod names;
mod options;
mod parens;
pub mod selector;
mod shape;

pub use config::{EngineConfig, QuoteStyle};
pub use error::{ConfigError, EngineError, FixError, OptionsError, SelectorError};
pub use fix::{FixDescriptor, FixKind, Fixer, TextEdit};
pub use method::{is_method_call, is_method_call_raw, method_name};
pub use names::{NameResolver, is_reserved_word, is_valid_identifier, singular};
pub use options::{
    ArgumentBounds, CallOptions, MemberOptions, MethodCallOptions, NewOptions, RawOptions,
    RawRecord,
};
pub use parens::{
    LogicalOperator, ParenContext, ParenPair, ParenthesesInfo, Side, UnaryOperator,
    is_new_with_parentheses, is_parenthesized, needs_parens, parentheses_count, parentheses_info,
    parenthesized_range, parenthesized_text,
};
pub use selector::{
    Selector, SelectorCache, compile_call, compile_call_or_new, compile_member,
    compile_method_call, compile_new,
};
pub use shape::{
    is_bigint_literal, is_boolean_literal, is_call_expression, is_call_expression_raw,
    is_call_or_new_expression, is_call_or_new_expression_raw, is_empty_array_expression,
    is_empty_object_expression, is_function, is_left_hand_side, is_member_expression,
    is_member_expression_raw, is_negative_one, is_new_expression, is_new_expression_raw,
    is_node_matches, is_null_literal, is_number_literal, is_regex_literal, is_same_reference,
    is_static_require, is_string_literal, is_undefined, static_property_name,
};

#[cfg(test)]
mod tests;
