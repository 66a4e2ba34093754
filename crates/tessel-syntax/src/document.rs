//! A parsed file bundled with everything derived from it.

use std::path::Path;

use crate::error::SyntaxError;
use crate::language::Language;
use crate::parser::{ParseDiagnostic, Parser};
use crate::scope::ScopeManager;
use crate::source::SourceCode;
use crate::tree::{NodeId, NodeKind, SyntaxTree};

/// The syntax tree, token stream and scope table of one source text.
///
/// All three views are built once and never change.
#[derive(Debug, Clone)]
pub struct Document {
    language: Language,
    source: SourceCode,
    tree: SyntaxTree,
    scopes: ScopeManager,
    errors: Vec<ParseDiagnostic>,
}

impl Document {
    pub(crate) const fn new(
        language: Language,
        source: SourceCode,
        tree: SyntaxTree,
        scopes: ScopeManager,
        errors: Vec<ParseDiagnostic>,
    ) -> Self {
        Self {
            language,
            source,
            tree,
            scopes,
            errors,
        }
    }

    /// Parses `text` as `language`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parser cannot be initialised or produces no
    /// tree. Syntax errors in `text` are recorded, not returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use tessel_syntax::{Document, Language, NodeKind};
    ///
    /// let document = Document::parse(Language::JavaScript, "foo(1);")?;
    /// assert_eq!(document.first_of_kind(NodeKind::CallExpression).is_some(), true);
    /// # Ok::<(), tessel_syntax::SyntaxError>(())
    /// ```
    pub fn parse(language: Language, text: &str) -> Result<Self, SyntaxError> {
        let mut parser = Parser::new(language)?;
        Ok(parser.parse(text)?.into_document())
    }

    /// Parses `text`, choosing the language from the extension of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::UnknownLanguage`] when the extension is not a
    /// JavaScript or TypeScript one, and otherwise fails as
    /// [`Document::parse`] does.
    pub fn parse_path(path: &Path, text: &str) -> Result<Self, SyntaxError> {
        let language = Language::from_path(path)
            .ok_or_else(|| SyntaxError::unknown_language(path.to_path_buf()))?;
        Self::parse(language, text)
    }

    /// Returns the language the text was parsed as.
    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Returns the source text and token stream.
    #[must_use]
    pub const fn source(&self) -> &SourceCode {
        &self.source
    }

    /// Returns the full source text.
    #[must_use]
    pub fn text(&self) -> &str {
        self.source.text()
    }

    /// Returns the lowered syntax tree.
    #[must_use]
    pub const fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// Returns the scope table.
    #[must_use]
    pub const fn scopes(&self) -> &ScopeManager {
        &self.scopes
    }

    /// Returns the diagnostics Tree-sitter recovery left behind.
    #[must_use]
    pub fn errors(&self) -> &[ParseDiagnostic] {
        &self.errors
    }

    /// Returns whether the text parsed without errors.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the first node of `kind` in pre-order.
    #[must_use]
    pub fn first_of_kind(&self, kind: NodeKind) -> Option<NodeId> {
        self.tree.nodes_of_kind(kind).into_iter().next()
    }

    /// Returns the source text of `node`.
    #[must_use]
    pub fn node_text(&self, node: NodeId) -> &str {
        self.tree.text(node, self.source.text())
    }
}
