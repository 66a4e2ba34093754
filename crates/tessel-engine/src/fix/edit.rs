//! Text edits and the fix descriptor that groups them.

use std::ops::Range;

use crate::error::FixError;

/// Replacement of the bytes in `range` with `replacement`.
///
/// Insertions use an empty range; removals an empty replacement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextEdit {
    /// Half-open byte range in the original source.
    pub range: Range<usize>,
    /// Text written in place of the range.
    pub replacement: String,
}

impl TextEdit {
    /// Replaces `range` with `text`.
    #[must_use]
    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            replacement: text.into(),
        }
    }

    /// Inserts `text` at `offset`.
    #[must_use]
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::replace(offset..offset, text)
    }

    /// Removes `range`.
    #[must_use]
    pub fn remove(range: Range<usize>) -> Self {
        Self::replace(range, String::new())
    }
}

/// Whether a fix may be applied without review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixKind {
    /// Safe to apply automatically.
    Fix,
    /// Needs a human to confirm it.
    Suggestion,
}

/// Sorted, pairwise-disjoint edits for one reported match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixDescriptor {
    edits: Vec<TextEdit>,
    message_key: Option<String>,
    kind: FixKind,
}

impl FixDescriptor {
    /// Validates `edits` against a text of `len` bytes and builds a
    /// descriptor.
    ///
    /// Edits are sorted by range; equal ranges keep their order. Two
    /// insertions at one offset are allowed and applied in order.
    ///
    /// # Errors
    ///
    /// Returns [`FixError::InvalidRange`] for a reversed or out-of-bounds
    /// range and [`FixError::OverlappingEdits`] when two ranges overlap.
    pub fn new(mut edits: Vec<TextEdit>, kind: FixKind, len: usize) -> Result<Self, FixError> {
        if let Some(bad) = edits
            .iter()
            .find(|edit| edit.range.start > edit.range.end || edit.range.end > len)
        {
            return Err(FixError::InvalidRange {
                range: bad.range.clone(),
                len,
            });
        }
        edits.sort_by_key(|edit| (edit.range.start, edit.range.end));
        for pair in edits.windows(2) {
            if let [first, second] = pair
                && second.range.start < first.range.end
            {
                return Err(FixError::OverlappingEdits {
                    first: first.range.clone(),
                    second: second.range.clone(),
                });
            }
        }
        Ok(Self {
            edits,
            message_key: None,
            kind,
        })
    }

    /// Attaches a message key.
    #[must_use]
    pub fn with_message_key(mut self, key: impl Into<String>) -> Self {
        self.message_key = Some(key.into());
        self
    }

    /// Returns the edits in source order.
    #[must_use]
    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    /// Returns the message key, if any.
    #[must_use]
    pub fn message_key(&self) -> Option<&str> {
        self.message_key.as_deref()
    }

    /// Returns whether this is a fix or a suggestion.
    #[must_use]
    pub const fn kind(&self) -> FixKind {
        self.kind
    }

    /// Returns whether the descriptor has no edits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Splices the edits into `text`.
    ///
    /// Edits are applied from the end of the text backwards so earlier
    /// offsets stay valid.
    ///
    /// # Errors
    ///
    /// Returns [`FixError::InvalidRange`] when a range falls outside `text`
    /// or splits a UTF-8 character.
    pub fn apply(&self, text: &str) -> Result<String, FixError> {
        let mut result = text.to_owned();
        for edit in self.edits.iter().rev() {
            let range = edit.range.clone();
            if range.end > result.len()
                || !result.is_char_boundary(range.start)
                || !result.is_char_boundary(range.end)
            {
                return Err(FixError::InvalidRange {
                    range,
                    len: text.len(),
                });
            }
            result.replace_range(range, &edit.replacement);
        }
        Ok(result)
    }
}
