//! Tests for annotation actions and editor input.

use super::*;
use crate::state::comment_editor::EditorTab;
use crate::state::session::Notice;
use crate::state::test_support::app_state;

fn range(start: u64, end: u64) -> ByteRange {
    ByteRange::new(start, end).unwrap()
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn type_text(mut state: AppState, text: &str) -> AppState {
    for ch in text.chars() {
        state = handle_editor_key(state, key(KeyCode::Char(ch)));
    }
    state
}

fn ctrl_s() -> KeyEvent {
    KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)
}

fn select(state: &mut AppState, start: u64, end: u64) {
    let session = state.session_mut();
    session.press(start);
    session.drag(end);
    session.release();
}

// ===== Editor lifecycle =====

#[test]
fn owner_annotates_selection_through_editor() {
    let (mut state, _, writer) = app_state(4096, Some("ada"), &[]);
    select(&mut state, 16, 19);

    let state = handle_annotation_action(state, KeyAction::AddComment);
    assert_eq!(state.editor.as_ref().map(|e| e.range()), Some(range(16, 19)));

    let state = type_text(state, "len");
    let state = handle_editor_key(state, ctrl_s());

    assert!(state.editor.is_none());
    assert_eq!(state.session().annotations().get(&range(16, 19)), Some("len"));
    assert_eq!(state.sidebar_cursor(), Some(0));
    assert_eq!(writer.writes().len(), 1);
    assert_eq!(state.status, Some(Notice::Info("Annotated 16-19".into())));
}

#[test]
fn non_owner_cannot_open_editor() {
    let (mut state, _, _) = app_state(4096, Some("bob"), &[]);
    select(&mut state, 0, 1);

    let state = handle_annotation_action(state, KeyAction::AddComment);

    assert!(state.editor.is_none());
    assert!(state.status.as_ref().is_some_and(Notice::is_error));
}

#[test]
fn add_comment_without_target_reports_no_selection() {
    let (state, _, _) = app_state(4096, Some("ada"), &[]);

    let state = handle_annotation_action(state, KeyAction::AddComment);

    assert!(state.editor.is_none());
    assert_eq!(
        state.status,
        Some(Notice::Error(AnnotationError::NoSelection.to_string()))
    );
}

#[test]
fn editing_active_annotation_prefills_text() {
    let (mut state, _, _) = app_state(4096, Some("ada"), &[("8-9", "crc")]);
    state.session_mut().press(8);

    let state = handle_annotation_action(state, KeyAction::AddComment);

    assert_eq!(state.editor.as_ref().map(|e| e.text()), Some("crc"));
}

#[test]
fn saving_blank_text_keeps_editor_open() {
    let (mut state, _, writer) = app_state(4096, Some("ada"), &[]);
    select(&mut state, 0, 0);
    let state = handle_annotation_action(state, KeyAction::AddComment);
    let state = type_text(state, "  ");

    let state = handle_editor_key(state, ctrl_s());

    assert!(state.editor.is_some());
    assert!(writer.writes().is_empty());
    assert!(state.status.as_ref().is_some_and(Notice::is_error));
}

#[test]
fn esc_cancels_without_writing() {
    let (mut state, _, writer) = app_state(4096, Some("ada"), &[]);
    select(&mut state, 0, 0);
    let state = handle_annotation_action(state, KeyAction::AddComment);
    let state = type_text(state, "draft");

    let state = handle_editor_key(state, key(KeyCode::Esc));

    assert!(state.editor.is_none());
    assert!(writer.writes().is_empty());
    assert!(state.session().annotations().is_empty());
}

#[test]
fn editor_keys_edit_and_switch_tabs() {
    let (mut state, _, _) = app_state(4096, Some("ada"), &[]);
    select(&mut state, 0, 0);
    let state = handle_annotation_action(state, KeyAction::AddComment);
    let state = type_text(state, "ab");
    let state = handle_editor_key(state, key(KeyCode::Enter));
    let state = handle_editor_key(state, key(KeyCode::Backspace));
    let state = handle_editor_key(state, key(KeyCode::Left));
    let state = handle_editor_key(state, key(KeyCode::Char('x')));
    let state = handle_editor_key(state, key(KeyCode::Tab));

    let editor = state.editor.as_ref().unwrap();
    assert_eq!(editor.text(), "axb");
    assert_eq!(editor.tab(), EditorTab::Preview);
}

#[test]
fn editor_key_without_editor_is_noop() {
    let (state, _, _) = app_state(4096, Some("ada"), &[]);
    let state = handle_editor_key(state, key(KeyCode::Char('x')));
    assert!(state.editor.is_none());
    assert_eq!(state.status, None);
}

// ===== Delete =====

#[test]
fn delete_removes_active_annotation() {
    let (mut state, _, writer) = app_state(4096, Some("ada"), &[("8-9", "crc")]);
    state.session_mut().press(9);

    let state = handle_annotation_action(state, KeyAction::DeleteComment);

    assert!(state.session().annotations().is_empty());
    assert_eq!(writer.last().map(|c| c.len()), Some(0));
    assert_eq!(state.status, Some(Notice::Info("Deleted annotation 8-9".into())));
}

#[test]
fn delete_by_non_owner_is_refused() {
    let (mut state, _, writer) = app_state(4096, Some("bob"), &[("8-9", "crc")]);
    state.session_mut().press(9);

    let state = handle_annotation_action(state, KeyAction::DeleteComment);

    assert_eq!(state.session().annotations().len(), 1);
    assert!(writer.writes().is_empty());
    assert_eq!(
        state.status,
        Some(Notice::Error(AnnotationError::ReadOnly.to_string()))
    );
}

// ===== Navigation =====

#[test]
fn next_and_prev_step_through_sorted_annotations() {
    let (state, _, _) = app_state(
        100_000,
        None,
        &[("50000-50003", "far"), ("0-3", "magic"), ("20-21", "ver")],
    );

    let state = handle_annotation_action(state, KeyAction::NextAnnotation);
    assert_eq!(state.session().active_annotation(), Some(range(0, 3)));

    let state = handle_annotation_action(state, KeyAction::NextAnnotation);
    let state = handle_annotation_action(state, KeyAction::NextAnnotation);
    assert_eq!(state.session().active_annotation(), Some(range(50000, 50003)));
    assert_eq!(state.session().highlight(), Some(range(50000, 50003)));
    assert!(state.session().viewport().is_offset_visible(50000));

    let state = handle_annotation_action(state, KeyAction::PrevAnnotation);
    assert_eq!(state.session().active_annotation(), Some(range(20, 21)));
}

#[test]
fn jump_from_sidebar_scrolls_and_requests_pages_immediately() {
    let (mut state, loader, _) = app_state(100_000, None, &[("50000-50003", "far")]);
    state.cycle_focus();

    let state = handle_annotation_action(state, KeyAction::JumpToAnnotation);

    assert!(state.session().viewport().is_offset_visible(50000));
    assert_eq!(loader.requested_pages(), vec![3, 4, 5]);
}

// ===== Links =====

#[test]
fn copy_link_uses_selection_first() {
    let (mut state, _, _) = app_state(4096, None, &[]);
    select(&mut state, 100, 104);

    let state = handle_annotation_action(state, KeyAction::CopyLink);

    assert_eq!(
        state.status,
        Some(Notice::Info("Link: test-session#comment-100-104".into()))
    );
}

#[test]
fn copy_link_without_target_is_an_error() {
    let (state, _, _) = app_state(4096, None, &[]);
    let state = handle_annotation_action(state, KeyAction::CopyLink);
    assert!(state.status.as_ref().is_some_and(Notice::is_error));
}
