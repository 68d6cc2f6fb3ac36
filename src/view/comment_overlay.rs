//! Comment editor popup with Edit and Preview tabs.

use crate::state::{CommentEditor, EditorTab};
use crate::view::constants::{EDITOR_POPUP_HEIGHT_PERCENT, EDITOR_POPUP_WIDTH_PERCENT};
use crate::view::markdown::render_markdown;
use crate::view::sidebar::entry_header;
use crate::view::styles::HexStyles;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

/// Glyph drawn at the text cursor on the Edit tab.
pub const CURSOR_GLYPH: char = '▏';

/// Rect centered in `area` covering the given percentages of it.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_width = area.width * percent_x / 100;
    let popup_height = area.height * percent_y / 100;
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    Rect {
        x: area.x + popup_x,
        y: area.y + popup_y,
        width: popup_width,
        height: popup_height,
    }
}

/// Draft text with the cursor glyph spliced in, split into lines.
pub fn edit_lines(editor: &CommentEditor) -> Vec<Line<'static>> {
    let mut text: String = editor.text().chars().take(editor.cursor()).collect();
    text.push(CURSOR_GLYPH);
    text.extend(editor.text().chars().skip(editor.cursor()));
    text.split('\n').map(|l| Line::from(l.to_string())).collect()
}

pub fn render_comment_overlay(frame: &mut Frame, editor: &CommentEditor, styles: &HexStyles) {
    let popup_area = centered_rect(
        EDITOR_POPUP_WIDTH_PERCENT,
        EDITOR_POPUP_HEIGHT_PERCENT,
        frame.area(),
    );
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" Annotate {} ", entry_header(editor.range())))
        .borders(Borders::ALL)
        .border_style(styles.focused_border);
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let selected = match editor.tab() {
        EditorTab::Edit => 0,
        EditorTab::Preview => 1,
    };
    let tabs = Tabs::new(vec!["Edit", "Preview"])
        .select(selected)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));
    frame.render_widget(tabs, chunks[0]);

    let body = match editor.tab() {
        EditorTab::Edit => edit_lines(editor),
        EditorTab::Preview => {
            let rendered = render_markdown(editor.text(), Style::default());
            if rendered.is_empty() {
                vec![Line::from(Span::styled("Nothing to preview", styles.hint))]
            } else {
                rendered
            }
        }
    };
    frame.render_widget(Paragraph::new(body).wrap(Wrap { trim: false }), chunks[1]);

    let hint = Paragraph::new(Line::from(Span::styled(
        " Ctrl+S save · Tab edit/preview · Esc cancel ",
        styles.hint,
    )))
    .alignment(Alignment::Center);
    frame.render_widget(hint, chunks[2]);
}
