//! Text Table Rendering
//!
//! Renders a [`ResultGrid`] as a column-aligned block:
//!
//! ```text
//! id | name
//! ---+-----------
//! 1  | Resistors
//!
//! Found records: 1
//! ```
//!
//! Widths are measured in characters, so Cyrillic values align the same way as
//! Latin ones.

use crate::engine::ResultGrid;

/// Separator between cells of the header and data rows
pub const CELL_SEPARATOR: &str = " | ";

/// Separator between dash runs of the divider line
pub const DIVIDER_SEPARATOR: &str = "-+-";

/// Display width of a cell or header
fn text_width(text: &str) -> usize {
    text.chars().count()
}

/// Width per column: the longest of the header and every cell in that column
#[must_use]
pub fn column_widths(grid: &ResultGrid) -> Vec<usize> {
    let mut widths: Vec<usize> = grid.headers.iter().map(|h| text_width(h)).collect();
    for row in &grid.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(text_width(cell));
        }
    }
    widths
}

/// Left-align `text` in a field of `width` characters
///
/// Text longer than `width` is cut to `width`. Widths come from
/// [`column_widths`], so the cut never happens for rendered grids.
#[must_use]
pub fn pad_right(text: &str, width: usize) -> String {
    if text_width(text) >= width {
        return text.chars().take(width).collect();
    }
    format!("{text:width$}")
}

fn join_cells<'a>(cells: impl Iterator<Item = &'a String>, widths: &[usize]) -> String {
    cells.zip(widths).map(|(cell, w)| pad_right(cell, *w)).collect::<Vec<_>>().join(CELL_SEPARATOR)
}

/// Header, divider and data lines, without the record summary
#[must_use]
pub fn render_rows(grid: &ResultGrid) -> String {
    let widths = column_widths(grid);
    let mut output = String::new();

    output.push_str(&join_cells(grid.headers.iter(), &widths));
    output.push('\n');

    let divider: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    output.push_str(&divider.join(DIVIDER_SEPARATOR));
    output.push('\n');

    for row in &grid.rows {
        output.push_str(&join_cells(row.iter(), &widths));
        output.push('\n');
    }

    output
}

/// `Found records: N` line printed after every grid
#[must_use]
pub fn summary_line(count: usize) -> String {
    format!("Found records: {count}")
}

/// Full rendering: aligned grid, blank line, record summary
#[must_use]
pub fn render(grid: &ResultGrid) -> String {
    let mut output = render_rows(grid);
    output.push('\n');
    output.push_str(&summary_line(grid.rows.len()));
    output.push('\n');
    output
}
