//! Screen layout: header, hex pane, annotation sidebar, info bar, status bar.
//!
//! Pure layout logic. [`calculate_areas`] is shared by drawing and by the
//! event loop, which needs the hex pane rect for mouse hit-testing and
//! viewport sizing.

use crate::state::{AppState, FocusPane};
use crate::view::constants::{
    HEADER_FILENAME_MAX_WIDTH, HEADER_HEIGHT, INFO_BAR_HEIGHT, SIDEBAR_MIN_WIDTH, SIDEBAR_WIDTH_PERCENT, STATUS_BAR_HEIGHT,
};
use crate::view::styles::HexStyles;
use crate::view::{comment_overlay, hex_pane, info_bar, sidebar};
use crate::view_state::types::ViewportDimensions;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Rects of every region for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneAreas {
    pub header: Rect,
    /// Hex pane including its border.
    pub hex: Rect,
    /// `None` when the terminal is too narrow for a sidebar.
    pub sidebar: Option<Rect>,
    pub info_bar: Rect,
    pub status: Rect,
}

impl PaneAreas {
    /// Hex pane without its border: where rows are drawn.
    pub fn hex_inner(&self) -> Rect {
        inner(self.hex)
    }

    /// Viewport size handed to the session: the hex pane's outer width (the
    /// layout engine reserves room for the border) and its row count.
    pub fn hex_viewport(&self) -> ViewportDimensions {
        ViewportDimensions::new(self.hex.width, self.hex_inner().height)
    }
}

fn inner(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

/// Split `area` into the screen regions.
pub fn calculate_areas(area: Rect) -> PaneAreas {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(INFO_BAR_HEIGHT),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);

    let content = vertical[1];
    let sidebar_width =
        (u32::from(content.width) * u32::from(SIDEBAR_WIDTH_PERCENT) / 100) as u16;
    let (hex, sidebar) = if sidebar_width >= SIDEBAR_MIN_WIDTH {
        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(sidebar_width)])
            .split(content);
        (horizontal[0], Some(horizontal[1]))
    } else {
        (content, None)
    };

    PaneAreas {
        header: vertical[0],
        hex,
        sidebar,
        info_bar: vertical[2],
        status: vertical[3],
    }
}

/// Render the whole screen.
pub fn render_layout(frame: &mut Frame, state: &AppState, styles: &HexStyles) {
    let areas = calculate_areas(frame.area());

    render_header(frame, areas.header, state, styles);
    hex_pane::render_hex_pane(frame, areas.hex, state, styles);
    if let Some(sidebar_area) = areas.sidebar {
        sidebar::render_sidebar(frame, sidebar_area, state, styles);
    }
    info_bar::render_info_bar(frame, areas.info_bar, state, styles);
    render_status_bar(frame, areas.status, state, styles);

    if let Some(editor) = &state.editor {
        comment_overlay::render_comment_overlay(frame, editor, styles);
    }
}

/// Header: file name, session id, owner and access badge.
pub fn header_line(state: &AppState, styles: &HexStyles) -> Line<'static> {
    let session = state.session();
    let record = session.record();

    let mut spans = vec![Span::styled(
        format!(
            " {} │ {} │ owner {}",
            truncate_to_width(&record.filename, HEADER_FILENAME_MAX_WIDTH),
            record.id,
            record.user_id
        ),
        styles.header,
    )];
    if let Some(parent) = &record.forked_from {
        spans.push(Span::styled(format!(" │ fork of {parent}"), styles.header));
    }
    if session.is_owner() {
        spans.push(Span::styled(" [OWNER]", styles.owner_badge));
    } else {
        spans.push(Span::styled(" [READ-ONLY]", styles.read_only_badge));
    }
    Line::from(spans)
}

/// Cut `text` to at most `max` display columns, ending in `…` when cut.
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState, styles: &HexStyles) {
    frame.render_widget(Paragraph::new(header_line(state, styles)), area);
}

/// Key hints for the current focus and access level.
pub fn keyboard_hints(focus: FocusPane, is_owner: bool) -> &'static str {
    match (focus, is_owner) {
        (FocusPane::HexPane, true) => {
            "q quit · drag/h/l select · c annotate · e/s endian/sign · Tab sidebar"
        }
        (FocusPane::HexPane, false) => {
            "q quit · drag/h/l select · e/s endian/sign · F fork · Tab sidebar"
        }
        (FocusPane::Sidebar, true) => "q quit · j/k move · Enter jump · c edit · d delete · y link",
        (FocusPane::Sidebar, false) => "q quit · j/k move · Enter jump · y link · F fork",
    }
}

/// Status bar: the latest notice, or key hints when there is none.
pub fn status_line(state: &AppState, styles: &HexStyles) -> Line<'static> {
    match &state.status {
        Some(notice) => {
            let style = if notice.is_error() {
                styles.error
            } else {
                styles.info
            };
            Line::from(Span::styled(format!(" {}", notice.text()), style))
        }
        None => Line::from(Span::styled(
            format!(" {}", keyboard_hints(state.focus, state.session().is_owner())),
            styles.hint,
        )),
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, styles: &HexStyles) {
    frame.render_widget(Paragraph::new(status_line(state, styles)), area);
}

// ===== Tests =====

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
