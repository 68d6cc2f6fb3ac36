//! Vertical scrolling keyboard action handler.
//!
//! Pure functions that transform AppState in response to scroll actions.
//! Focus-aware: in the hex pane the viewport scrolls; in the sidebar the
//! annotation cursor moves instead.

use crate::model::KeyAction;
use crate::state::{AppState, FocusPane};
use std::time::Instant;

/// Handle a scroll keyboard action.
///
/// # Arguments
/// * `state` - Current application state to transform
/// * `action` - The scroll action to handle
/// * `now` - Time of the key press; drives the scroll settle delay
///
/// Returns a new AppState. Page fetches for the new position are issued
/// later, once the scroll settles (see [`crate::state::FileSession::tick`]).
pub fn handle_scroll_action(mut state: AppState, action: KeyAction, now: Instant) -> AppState {
    if state.focus == FocusPane::Sidebar {
        match action {
            KeyAction::ScrollUp => state.move_sidebar_cursor(-1),
            KeyAction::ScrollDown => state.move_sidebar_cursor(1),
            _ => {}
        }
        return state;
    }

    let session = state.session_mut();
    match action {
        KeyAction::ScrollUp => session.scroll_rows(-1, now),
        KeyAction::ScrollDown => session.scroll_rows(1, now),
        KeyAction::PageUp => session.scroll_pages(-1, now),
        KeyAction::PageDown => session.scroll_pages(1, now),
        KeyAction::ScrollToTop => session.scroll_to_top(now),
        KeyAction::ScrollToBottom => session.scroll_to_bottom(now),
        _ => {}
    }
    state
}

// ===== Tests =====

#[cfg(test)]
#[path = "scroll_handler_tests.rs"]
mod tests;
