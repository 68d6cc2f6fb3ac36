//! Mouse event handler.
//!
//! Pure functions that transform AppState in response to mouse events:
//! left press begins a selection (or activates an annotation), drag
//! extends it, release freezes it, and the wheel scrolls.

use crate::state::selection::PressOutcome;
use crate::state::{AppState, FocusPane};
use crate::view_state::RowGeometry;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::time::Instant;

/// Rows scrolled per wheel notch.
pub const WHEEL_ROWS: i64 = 3;

/// Result of hit-testing a position against the hex pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteHit {
    /// Position is over the byte at this file offset (in any column).
    Byte(u64),
    /// Inside the pane but not over a byte (offset column, padding, or
    /// past the end of the file).
    Gap,
    /// Outside the pane.
    Outside,
}

/// Map a screen position to the byte drawn there.
///
/// # Arguments
/// * `x`, `y` - Mouse position (0-based columns/rows)
/// * `pane` - Inner area of the hex pane, first row at `pane.y`
/// * `geometry` - Column layout used to draw each row
/// * `first_row` - File row drawn at `pane.y`
/// * `total_size` - File length in bytes
pub fn detect_byte_hit(
    x: u16,
    y: u16,
    pane: Rect,
    geometry: &RowGeometry,
    first_row: u64,
    total_size: u64,
) -> ByteHit {
    if x < pane.x || x >= pane.x + pane.width || y < pane.y || y >= pane.y + pane.height {
        return ByteHit::Outside;
    }
    let Some((index, _)) = geometry.byte_at(u32::from(x - pane.x)) else {
        return ByteHit::Gap;
    };
    let row = first_row + u64::from(y - pane.y);
    let offset = row * geometry.bytes_per_row() as u64 + index as u64;
    if offset < total_size {
        ByteHit::Byte(offset)
    } else {
        ByteHit::Gap
    }
}

/// Handle a mouse event over the hex pane.
///
/// Drags that leave the pane keep the last selected byte; a release
/// anywhere ends the selection.
pub fn handle_mouse_event(
    mut state: AppState,
    event: MouseEvent,
    pane: Rect,
    now: Instant,
) -> AppState {
    let session = state.session();
    let hit = detect_byte_hit(
        event.column,
        event.row,
        pane,
        &session.layout().row_geometry(),
        session.viewport().first_visible_row(),
        session.geometry().total_size(),
    );

    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let ByteHit::Byte(offset) = hit {
                state.focus = FocusPane::HexPane;
                if let PressOutcome::Annotation(range) = state.session_mut().press(offset) {
                    state.select_in_sidebar(range);
                }
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if let ByteHit::Byte(offset) = hit {
                state.session_mut().drag(offset);
            }
        }
        MouseEventKind::Up(MouseButton::Left) => state.session_mut().release(),
        MouseEventKind::ScrollUp if hit != ByteHit::Outside => {
            state.session_mut().scroll_rows(-WHEEL_ROWS, now);
        }
        MouseEventKind::ScrollDown if hit != ByteHit::Outside => {
            state.session_mut().scroll_rows(WHEEL_ROWS, now);
        }
        _ => {}
    }
    state
}

// ===== Tests =====

#[cfg(test)]
#[path = "mouse_handler_tests.rs"]
mod tests;
