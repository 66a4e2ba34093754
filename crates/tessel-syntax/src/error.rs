//! Failures that leave no document behind.
//!
//! Malformed source is not one of them: Tree-sitter recovers, and the
//! problems are reported as [`ParseDiagnostic`](crate::ParseDiagnostic)s on
//! the resulting document.

use std::path::PathBuf;

use thiserror::Error;

use crate::language::Language;

/// Errors raised while building a [`Document`](crate::Document).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    /// The bundled grammar was built for an incompatible Tree-sitter ABI.
    #[error("{language} grammar rejected by tree-sitter")]
    GrammarRejected {
        /// Language whose grammar was loaded.
        language: Language,
        /// ABI mismatch reported by Tree-sitter.
        #[source]
        source: tree_sitter::LanguageError,
    },

    /// Tree-sitter gave up without returning a tree.
    #[error("tree-sitter returned no tree for {language} source")]
    NoTree {
        /// Language the text was parsed as.
        language: Language,
    },

    /// No language is associated with the path's extension.
    #[error("could not determine language for path: {}", path.display())]
    UnknownLanguage {
        /// Offending path.
        path: PathBuf,
    },
}

impl SyntaxError {
    /// Wraps a grammar loading failure.
    #[must_use]
    pub const fn grammar_rejected(language: Language, source: tree_sitter::LanguageError) -> Self {
        Self::GrammarRejected { language, source }
    }

    /// Reports a parse that produced no tree.
    #[must_use]
    pub const fn no_tree(language: Language) -> Self {
        Self::NoTree { language }
    }

    /// Reports a path with no known language.
    #[must_use]
    pub const fn unknown_language(path: PathBuf) -> Self {
        Self::UnknownLanguage { path }
    }
}
