//! Edit collector handed to rewrite primitives.

use std::ops::Range;

use tessel_syntax::{Document, NodeId, SourceCode, SyntaxTree};
use tracing::debug;

use super::edit::{FixDescriptor, FixKind, TextEdit};
use super::escape::escape_string;
use crate::config::{EngineConfig, QuoteStyle};
use crate::error::FixError;

/// Collects the edits of one fix against one parsed document.
///
/// Primitives that would drop comments mark the fixer as lossy;
/// [`Fixer::finish`] then yields a suggestion instead of a fix.
#[derive(Debug, Clone)]
pub struct Fixer<'a> {
    tree: &'a SyntaxTree,
    source: &'a SourceCode,
    edits: Vec<TextEdit>,
    lossy: Option<&'static str>,
    quote: QuoteStyle,
}

impl<'a> Fixer<'a> {
    /// Creates an empty fixer.
    #[must_use]
    pub const fn new(tree: &'a SyntaxTree, source: &'a SourceCode) -> Self {
        Self {
            tree,
            source,
            edits: Vec::new(),
            lossy: None,
            quote: QuoteStyle::Single,
        }
    }

    /// Creates an empty fixer for `document` that writes strings in the
    /// configured quote style.
    #[must_use]
    pub const fn with_config(document: &'a Document, config: &EngineConfig) -> Self {
        let mut fixer = Self::for_document(document);
        fixer.quote = config.preferred_quote();
        fixer
    }

    /// Creates an empty fixer for `document`.
    #[must_use]
    pub const fn for_document(document: &'a Document) -> Self {
        Self::new(document.tree(), document.source())
    }

    /// Returns the tree edits refer to.
    #[must_use]
    pub const fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }

    /// Returns the source edits refer to.
    #[must_use]
    pub const fn source(&self) -> &'a SourceCode {
        self.source
    }

    /// Returns the quote style used by [`Fixer::quote`].
    #[must_use]
    pub const fn quote_style(&self) -> QuoteStyle {
        self.quote
    }

    /// Returns `text` as a string literal in this fixer's quote style.
    #[must_use]
    pub fn quote(&self, text: &str) -> String {
        escape_string(text, self.quote)
    }

    /// Returns the edits recorded so far, in recording order.
    #[must_use]
    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    /// Records an edit.
    pub fn push(&mut self, edit: TextEdit) {
        self.edits.push(edit);
    }

    /// Replaces `range` with `text`.
    pub fn replace_text_range(&mut self, range: Range<usize>, text: impl Into<String>) {
        self.push(TextEdit::replace(range, text));
    }

    /// Replaces the bare range of `node` with `text`.
    pub fn replace_text(&mut self, node: NodeId, text: impl Into<String>) {
        self.replace_text_range(self.tree.range(node), text);
    }

    /// Inserts `text` before `range`.
    pub fn insert_text_before_range(&mut self, range: Range<usize>, text: impl Into<String>) {
        self.push(TextEdit::insert(range.start, text));
    }

    /// Inserts `text` after `range`.
    pub fn insert_text_after_range(&mut self, range: Range<usize>, text: impl Into<String>) {
        self.push(TextEdit::insert(range.end, text));
    }

    /// Inserts `text` before `node`.
    pub fn insert_text_before(&mut self, node: NodeId, text: impl Into<String>) {
        self.insert_text_before_range(self.tree.range(node), text);
    }

    /// Inserts `text` after `node`.
    pub fn insert_text_after(&mut self, node: NodeId, text: impl Into<String>) {
        self.insert_text_after_range(self.tree.range(node), text);
    }

    /// Removes `range`.
    pub fn remove_range(&mut self, range: Range<usize>) {
        self.push(TextEdit::remove(range));
    }

    /// Removes the bare range of `node`.
    pub fn remove(&mut self, node: NodeId) {
        self.remove_range(self.tree.range(node));
    }

    /// Records that the fix cannot preserve everything the user wrote.
    pub fn mark_lossy(&mut self, reason: &'static str) {
        if self.lossy.is_none() {
            self.lossy = Some(reason);
        }
    }

    /// Marks the fix lossy when `removed` deletes comments outside `kept`.
    pub(crate) fn guard_comments(&mut self, removed: Range<usize>, kept: &Range<usize>) {
        let drops_comment = self
            .source
            .comments_in(removed)
            .iter()
            .any(|comment| comment.range.start < kept.start || comment.range.end > kept.end);
        if drops_comment {
            self.mark_lossy("edit removes a comment");
        }
    }

    /// Returns why the fix was marked lossy, if it was.
    #[must_use]
    pub const fn lossy_reason(&self) -> Option<&'static str> {
        self.lossy
    }

    /// Builds an auto-appliable fix.
    ///
    /// # Errors
    ///
    /// Returns an error when edits overlap or fall outside the source.
    pub fn into_fix(self) -> Result<FixDescriptor, FixError> {
        self.build(FixKind::Fix)
    }

    /// Builds a suggestion.
    ///
    /// # Errors
    ///
    /// Returns an error when edits overlap or fall outside the source.
    pub fn into_suggestion(self) -> Result<FixDescriptor, FixError> {
        self.build(FixKind::Suggestion)
    }

    /// Builds a fix, or a suggestion when a primitive marked the fixer
    /// lossy.
    ///
    /// # Errors
    ///
    /// Returns an error when edits overlap or fall outside the source.
    pub fn finish(self) -> Result<FixDescriptor, FixError> {
        match self.lossy {
            Some(reason) => {
                debug!(reason, "downgrading fix to suggestion");
                self.build(FixKind::Suggestion)
            }
            None => self.build(FixKind::Fix),
        }
    }

    fn build(self, kind: FixKind) -> Result<FixDescriptor, FixError> {
        FixDescriptor::new(self.edits, kind, self.source.text().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tessel_syntax::{Field, Language, NodeKind};

    #[rstest]
    #[case("{}", "x = 'it\\'s';")]
    #[case(r#"{ "preferred_quote": "double" }"#, "x = \"it's\";")]
    fn new_strings_use_the_configured_quote(#[case] config: &str, #[case] expected: &str) {
        let document = Document::parse(Language::JavaScript, "x = y;").expect("parse");
        let config = EngineConfig::from_json(config).expect("config");
        let assignment = document
            .first_of_kind(NodeKind::AssignmentExpression)
            .expect("assignment");
        let value = document.tree().field(assignment, Field::Right).expect("right");
        let mut fixer = Fixer::with_config(&document, &config);
        let literal = fixer.quote("it's");
        fixer.replace_text(value, literal);
        let fix = fixer.finish().expect("fix");
        assert_eq!(fix.apply(document.text()).expect("apply"), expected);
    }

    #[test]
    fn plain_fixers_quote_with_single_quotes() {
        let document = Document::parse(Language::JavaScript, "x;").expect("parse");
        let fixer = Fixer::for_document(&document);
        assert_eq!(fixer.quote_style(), QuoteStyle::Single);
        assert_eq!(fixer.quote("a"), "'a'");
    }
}
