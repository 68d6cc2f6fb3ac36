//! Keyboard selection and numeric-setting handler.
//!
//! Pure functions that transform AppState in response to cursor, extend,
//! clear and endianness/signedness actions.

use crate::model::KeyAction;
use crate::state::AppState;
use std::time::Instant;

/// Handle a selection or numeric-setting action.
///
/// Cursor moves collapse the selection to one byte and move it; extend
/// moves stretch the current selection's focus end. Both scroll to keep
/// the moving end visible.
pub fn handle_selection_action(mut state: AppState, action: KeyAction, now: Instant) -> AppState {
    match action {
        KeyAction::CursorLeft => state.session_mut().move_cursor(-1, false, now),
        KeyAction::CursorRight => state.session_mut().move_cursor(1, false, now),
        KeyAction::ExtendLeft => state.session_mut().move_cursor(-1, true, now),
        KeyAction::ExtendRight => state.session_mut().move_cursor(1, true, now),
        KeyAction::ClearSelection => {
            state.session_mut().clear();
            state.status = None;
        }
        KeyAction::ToggleEndianness => state.endianness = state.endianness.toggle(),
        KeyAction::ToggleSignedness => state.signedness = state.signedness.toggle(),
        _ => {}
    }
    state
}
