//! Position conversion for diagnostics.
//!
//! Tree-sitter reports zero-based rows and columns; syntax error reports use
//! one-based coordinates so they line up with editor positions.

/// Converts a zero-based Tree-sitter point into one-based `(line, column)`.
#[must_use]
pub(crate) fn point_to_one_based(pos: tree_sitter::Point) -> (u32, u32) {
    // Saturate rather than wrap on absurdly large inputs.
    let line = u32::try_from(pos.row.saturating_add(1)).unwrap_or(u32::MAX);
    let column = u32::try_from(pos.column.saturating_add(1)).unwrap_or(u32::MAX);
    (line, column)
}
