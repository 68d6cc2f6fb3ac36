//! Hex pane: offset | hex | binary | ASCII columns.
//!
//! Column widths match [`GlyphMetrics::TERMINAL`](crate::view_state::GlyphMetrics::TERMINAL),
//! so mouse hit-testing through [`RowGeometry`](crate::view_state::RowGeometry)
//! lands on the byte that was drawn.

use crate::state::{AppState, FocusPane};
use crate::view::styles::HexStyles;
use crate::view_state::{ByteCell, RowDescriptor};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Marker after the offset of a row touched by an annotation.
pub const ANNOTATED_ROW_MARKER: char = '*';

/// Build the styled line for one row.
///
/// Layout per row: `oooooooo? ` then `hh ` per byte, `bbbbbbbb ` per byte,
/// then one ASCII char per byte. Missing bytes past the end of the file
/// render as blanks of the same width.
pub fn row_line(row: &RowDescriptor, styles: &HexStyles) -> Line<'static> {
    let per_cell = row.cells.len() + row.padding;
    let mut spans = Vec::with_capacity(2 + per_cell * 3);

    spans.push(Span::styled(row.offset_label(), styles.offset));
    if row.has_annotation {
        spans.push(Span::styled(
            format!("{ANNOTATED_ROW_MARKER} "),
            styles.row_marker,
        ));
    } else {
        spans.push(Span::raw("  "));
    }

    push_column(&mut spans, row, styles, |cell| format!("{} ", cell.hex()), 3);
    push_column(&mut spans, row, styles, |cell| format!("{} ", cell.binary()), 9);
    push_column(&mut spans, row, styles, |cell| cell.ascii().to_string(), 1);

    Line::from(spans)
}

fn push_column(
    spans: &mut Vec<Span<'static>>,
    row: &RowDescriptor,
    styles: &HexStyles,
    text: impl Fn(&ByteCell) -> String,
    width: usize,
) {
    for cell in &row.cells {
        spans.push(Span::styled(text(cell), styles.for_cell(cell)));
    }
    if row.padding > 0 {
        spans.push(Span::raw(" ".repeat(row.padding * width)));
    }
}

/// Render the hex pane into `area` (borders included).
pub fn render_hex_pane(frame: &mut Frame, area: Rect, state: &AppState, styles: &HexStyles) {
    let session = state.session();
    let lines: Vec<Line> = session
        .render_visible()
        .iter()
        .map(|row| row_line(row, styles))
        .collect();

    let title = format!(
        " {} bytes · {} per row ",
        session.geometry().total_size(),
        session.bytes_per_row()
    );
    let mut block = Block::default().borders(Borders::ALL).title(title);
    if state.focus == FocusPane::HexPane {
        block = block.border_style(styles.focused_border);
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
