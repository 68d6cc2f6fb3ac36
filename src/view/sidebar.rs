//! Annotation sidebar: every annotation sorted by start offset.

use crate::model::{Annotation, ByteRange};
use crate::state::{AppState, FocusPane};
use crate::view::markdown::render_markdown;
use crate::view::styles::HexStyles;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Header line for one annotation: hex range and length.
pub fn entry_header(range: ByteRange) -> String {
    format!(
        "{:08x}-{:08x} ({} bytes)",
        range.start(),
        range.end(),
        range.len()
    )
}

/// Lines for the whole sidebar and the line index where the entry at
/// `cursor` begins.
///
/// The cursor entry gets a reversed header; the active annotation's header is
/// drawn in the active style.
pub fn sidebar_lines(
    annotations: &[Annotation<'_>],
    cursor: Option<usize>,
    active: Option<ByteRange>,
    styles: &HexStyles,
) -> (Vec<Line<'static>>, usize) {
    let mut lines = Vec::new();
    let mut cursor_line = 0;

    for (i, annotation) in annotations.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        let mut header_style = if Some(annotation.range) == active {
            styles.active
        } else {
            styles.annotated
        };
        if Some(i) == cursor {
            cursor_line = lines.len();
            header_style = header_style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::from(Span::styled(
            entry_header(annotation.range),
            header_style,
        )));
        lines.extend(render_markdown(annotation.text, Style::default()));
    }

    (lines, cursor_line)
}

/// Render the sidebar into `area`.
pub fn render_sidebar(frame: &mut Frame, area: Rect, state: &AppState, styles: &HexStyles) {
    let session = state.session();
    let annotations = session.annotations().list_sorted_by_start();
    let title = format!(" Annotations ({}) ", annotations.len());

    let mut block = Block::default().borders(Borders::ALL).title(title);
    if state.focus == FocusPane::Sidebar {
        block = block.border_style(styles.focused_border);
    }

    if annotations.is_empty() {
        let hint = if session.is_owner() {
            "Select bytes and press c to annotate"
        } else {
            "No annotations"
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(hint, styles.hint))).block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let (lines, cursor_line) = sidebar_lines(
        &annotations,
        state.sidebar_cursor(),
        session.active_annotation(),
        styles,
    );
    // Keep the cursor entry in the upper third of the pane.
    let inner_height = area.height.saturating_sub(2) as usize;
    let scroll = cursor_line.saturating_sub(inner_height / 3);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(paragraph, area);
}
