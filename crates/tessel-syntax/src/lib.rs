//! Host model for the tessel rule engine.
//!
//! This crate turns JavaScript and TypeScript source text into the three
//! read-only views the engine consumes:
//!
//! - **Syntax tree** via [`SyntaxTree`]: an arena of ESTree-shaped nodes
//!   lowered from Tree-sitter, with parent indices for upward queries
//! - **Tokens** via [`SourceCode`]: the token and comment streams with
//!   before/after lookups
//! - **Scopes** via [`ScopeManager`]: lexical scopes, bindings and resolved
//!   references
//!
//! [`Document::parse`] builds all three at once.
//!
//! # Supported Languages
//!
//! - JavaScript (`.js`, `.mjs`, `.cjs`, `.jsx`), parsed with the TSX grammar
//! - TypeScript (`.ts`, `.mts`, `.cts`)
//! - TSX (`.tsx`)
//!
//! # Example
//!
//! ```
//! use tessel_syntax::{Document, Field, Language, NodeKind};
//!
//! let document = Document::parse(Language::JavaScript, "(foo).bar(1, 2);")?;
//! let tree = document.tree();
//! let call = document
//!     .first_of_kind(NodeKind::CallExpression)
//!     .expect("call expression");
//! assert_eq!(tree.field_list(call, Field::Arguments).len(), 2);
//!
//! let callee = tree.field(call, Field::Callee).expect("callee");
//! let object = tree.field(callee, Field::Object).expect("object");
//! assert_eq!(document.node_text(object), "foo");
//! # Ok::<(), tessel_syntax::SyntaxError>(())
//! ```

mod document;
mod error;
mod language;
mod lower;
mod parser;
mod position;
mod scope;
mod source;
mod tree;

pub use document::Document;
pub use error::SyntaxError;
pub use language::{Language, LanguageParseError};
pub use parser::{ParseDiagnostic, ParsedSource, Parser};
pub use scope::{
    Reference, ReferenceId, Scope, ScopeId, ScopeKind, ScopeManager, Variable, VariableId,
};
pub use source::{SourceCode, Token, TokenKind};
pub use tree::{Field, LiteralKind, Node, NodeFlags, NodeId, NodeKind, SyntaxTree, VariableKind};
