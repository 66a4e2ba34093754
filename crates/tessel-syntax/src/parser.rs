//! Tree-sitter front end.
//!
//! [`Parser`] owns one configured Tree-sitter parser and turns text into a
//! [`ParsedSource`]: the concrete tree plus the text it was built from.
//! Recovery is Tree-sitter's; every `ERROR` and `MISSING` node it leaves
//! behind becomes a [`ParseDiagnostic`].

use std::ops::Range;

use crate::document::Document;
use crate::error::SyntaxError;
use crate::language::Language;
use crate::lower::lower;
use crate::position::point_to_one_based;
use crate::scope::ScopeManager;
use crate::source::SourceCode;

/// Longest snippet kept on a diagnostic, in characters.
const SNIPPET_CHARS: usize = 40;

/// Concrete syntax tree of one text, before lowering.
#[derive(Debug)]
pub struct ParsedSource {
    language: Language,
    text: String,
    cst: tree_sitter::Tree,
}

impl ParsedSource {
    /// Returns the language the text was parsed as.
    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Returns the parsed text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the Tree-sitter tree.
    #[must_use]
    pub const fn cst(&self) -> &tree_sitter::Tree {
        &self.cst
    }

    /// Returns whether recovery was needed anywhere in the text.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.cst.root_node().has_error()
    }

    /// Returns one diagnostic per recovered node, in source order.
    #[must_use]
    pub fn errors(&self) -> Vec<ParseDiagnostic> {
        if !self.has_errors() {
            return Vec::new();
        }
        let mut diagnostics = Vec::new();
        let mut cursor = self.cst.walk();
        loop {
            let node = cursor.node();
            let recovered = node.is_error() || node.is_missing();
            if recovered {
                diagnostics.push(ParseDiagnostic::new(node, &self.text));
            }
            // Children of an ERROR node are the skipped text; one report is
            // enough.
            let descend = !recovered && node.has_error();
            if descend && cursor.goto_first_child() {
                continue;
            }
            while !cursor.goto_next_sibling() {
                if !cursor.goto_parent() {
                    return diagnostics;
                }
            }
        }
    }

    /// Lowers the tree and derives the token stream and scope table.
    #[must_use]
    pub fn into_document(self) -> Document {
        let diagnostics = self.errors();
        let root = self.cst.root_node();
        let tree = lower(root, &self.text);
        let source = SourceCode::from_tree(&self.text, root);
        let scopes = ScopeManager::analyze(&tree);
        Document::new(self.language, source, tree, scopes, diagnostics)
    }
}

/// A region Tree-sitter had to skip or invent while recovering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    /// Byte range of the recovered node. Empty for a missing token.
    pub range: Range<usize>,
    /// One-based line of the start.
    pub line: u32,
    /// One-based byte column of the start.
    pub column: u32,
    /// Skipped text, shortened to a few dozen characters.
    pub snippet: String,
    /// What went wrong, e.g. ``missing `)` ``.
    pub message: String,
}

impl ParseDiagnostic {
    fn new(node: tree_sitter::Node<'_>, text: &str) -> Self {
        let range = node.byte_range();
        let skipped = text.get(range.clone()).unwrap_or_default();
        let snippet = if skipped.chars().count() > SNIPPET_CHARS {
            let head: String = skipped
                .chars()
                .take(SNIPPET_CHARS.saturating_sub(1))
                .collect();
            format!("{head}…")
        } else {
            skipped.to_owned()
        };
        let message = if node.is_missing() {
            format!("missing `{}`", node.kind())
        } else {
            format!("unexpected `{}`", snippet.lines().next().unwrap_or_default())
        };
        let (line, column) = point_to_one_based(node.start_position());
        Self {
            range,
            line,
            column,
            snippet,
            message,
        }
    }
}

/// Tree-sitter parser configured for one [`Language`].
pub struct Parser {
    language: Language,
    inner: tree_sitter::Parser,
}

impl Parser {
    /// Creates a parser for `language`.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::GrammarRejected`] when the bundled grammar
    /// does not match the linked Tree-sitter runtime.
    pub fn new(language: Language) -> Result<Self, SyntaxError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&language.tree_sitter_language())
            .map_err(|err| SyntaxError::grammar_rejected(language, err))?;
        Ok(Self { language, inner })
    }

    /// Returns the configured language.
    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Parses `text`.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::NoTree`] if Tree-sitter gives up. Malformed
    /// text is not an error; see [`ParsedSource::errors`].
    pub fn parse(&mut self, text: &str) -> Result<ParsedSource, SyntaxError> {
        let cst = self
            .inner
            .parse(text, None)
            .ok_or_else(|| SyntaxError::no_tree(self.language))?;
        Ok(ParsedSource {
            language: self.language,
            text: text.to_owned(),
            cst,
        })
    }
}
