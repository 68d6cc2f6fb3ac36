//! Annotation actions and comment editor input (pure state transitions).
//!
//! Covers opening the editor, saving, deleting, stepping through the
//! sidebar, jumping to annotations and producing deep links. Persistence
//! happens inside [`FileSession`](crate::state::FileSession) through its
//! comment writer; nothing here blocks.

use crate::model::{AnnotationError, ByteRange, KeyAction};
use crate::state::comment_editor::CommentEditor;
use crate::state::{AppState, FocusPane};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

/// Handle an annotation keyboard action.
///
/// # Arguments
/// * `state` - Current application state to transform
/// * `action` - One of AddComment, DeleteComment, NextAnnotation,
///   PrevAnnotation, JumpToAnnotation or CopyLink; others are ignored
pub fn handle_annotation_action(mut state: AppState, action: KeyAction) -> AppState {
    match action {
        KeyAction::AddComment => open_editor(&mut state),
        KeyAction::DeleteComment => delete_target(&mut state),
        KeyAction::NextAnnotation => step(&mut state, 1),
        KeyAction::PrevAnnotation => step(&mut state, -1),
        KeyAction::JumpToAnnotation => {
            if let Some(range) = focused_annotation(&state) {
                jump(&mut state, range);
            }
        }
        KeyAction::CopyLink => match link_target(&state) {
            Some(range) => {
                let link = state.session().deep_link(range);
                state.info(format!("Link: {link}"));
            }
            None => state.error("Select bytes or an annotation to link to"),
        },
        _ => {}
    }
    state
}

/// Annotation the sidebar or the hex pane is pointing at.
fn focused_annotation(state: &AppState) -> Option<ByteRange> {
    match state.focus {
        FocusPane::Sidebar => state.sidebar_range(),
        FocusPane::HexPane => state.session().active_annotation(),
    }
}

fn link_target(state: &AppState) -> Option<ByteRange> {
    let session = state.session();
    session
        .selection()
        .range()
        .or_else(|| focused_annotation(state))
        .or_else(|| session.highlight())
}

fn jump(state: &mut AppState, range: ByteRange) {
    state.select_in_sidebar(range);
    let pages = state.session_mut().jump_to_annotation(range);
    debug!(%range, ?pages, "Jumped to annotation");
}

fn step(state: &mut AppState, delta: isize) {
    state.move_sidebar_cursor(delta);
    if let Some(range) = state.sidebar_range() {
        jump(state, range);
    }
}

fn open_editor(state: &mut AppState) {
    if !state.session().is_owner() {
        state.error(AnnotationError::ReadOnly.to_string());
        return;
    }
    let target = state
        .session()
        .selection()
        .range()
        .or_else(|| focused_annotation(state));
    match target {
        Some(range) => {
            let existing = state.session().annotations().get(&range).map(str::to_owned);
            state.editor = Some(CommentEditor::open(range, existing.as_deref()));
        }
        None => state.error(AnnotationError::NoSelection.to_string()),
    }
}

fn delete_target(state: &mut AppState) {
    let Some(range) = focused_annotation(state) else {
        state.error("No annotation selected");
        return;
    };
    match state.session_mut().delete_annotation(range) {
        Ok(()) => state.info(format!("Deleted annotation {range}")),
        Err(e) => state.error(e.to_string()),
    }
}

/// Handle a key while the comment editor is open.
///
/// - Ctrl+S saves and closes
/// - Esc cancels
/// - Tab switches between Edit and Preview
/// - Enter inserts a newline
pub fn handle_editor_key(mut state: AppState, key: KeyEvent) -> AppState {
    let Some(editor) = state.editor.take() else {
        return state;
    };
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let editor = match key.code {
        KeyCode::Char('s') if ctrl => return save(state, editor),
        KeyCode::Esc => return state,
        KeyCode::Tab => editor.toggle_tab(),
        KeyCode::Enter => editor.insert_char('\n'),
        KeyCode::Backspace => editor.backspace(),
        KeyCode::Left => editor.cursor_left(),
        KeyCode::Right => editor.cursor_right(),
        KeyCode::Char(ch) if !ctrl => editor.insert_char(ch),
        _ => editor,
    };
    state.editor = Some(editor);
    state
}

fn save(mut state: AppState, editor: CommentEditor) -> AppState {
    match state.session_mut().annotate(editor.range(), editor.text()) {
        Ok(range) => {
            state.select_in_sidebar(range);
            state.info(format!("Annotated {range}"));
        }
        Err(e) => {
            state.error(e.to_string());
            if e == AnnotationError::EmptyText {
                state.editor = Some(editor);
            }
        }
    }
    state
}

#[cfg(test)]
#[path = "annotation_handler_tests.rs"]
mod tests;
