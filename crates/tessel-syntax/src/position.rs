//! One-based coordinates for diagnostics and test output.

use tree_sitter::Point;

/// Saturating conversion of a zero-based row or column to one-based.
fn one_based(zero_based: usize) -> u32 {
    u32::try_from(zero_based.saturating_add(1)).unwrap_or(u32::MAX)
}

/// Returns the `(line, column)` of a Tree-sitter point, counting from one.
pub(crate) fn point_to_one_based(point: Point) -> (u32, u32) {
    (one_based(point.row), one_based(point.column))
}

/// Returns the `(line, column)` of a byte offset, counting from one.
///
/// Columns count bytes. Offsets past the end clamp to the end of `text`.
pub(crate) fn offset_to_one_based(text: &str, offset: usize) -> (u32, u32) {
    let prefix = text.get(..offset.min(text.len())).unwrap_or(text);
    match prefix.rsplit_once('\n') {
        Some((before, line)) => (
            one_based(before.matches('\n').count().saturating_add(1)),
            one_based(line.len()),
        ),
        None => (1, one_based(prefix.len())),
    }
}
