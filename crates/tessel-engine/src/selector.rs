//! Selector AST, compiler, parser, evaluator and cache.
//!
//! Selectors are derived mechanically from the typed option records that
//! drive the predicates in [`crate::shape`] and [`crate::method`], so both
//! accept the same nodes. The AST renders to the esquery-style string a
//! traversal host registers, and [`Selector::parse`] reads that string back.

mod ast;
mod cache;
mod compile;
mod eval;
mod parse;

pub use ast::{AttributeValue, Clause, Comparison, Selector};
pub use cache::SelectorCache;
pub use compile::{
    compile_call, compile_call_or_new, compile_member, compile_method_call, compile_new,
};
