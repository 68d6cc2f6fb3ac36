//! UI state machine.
//!
//! [`FileSession`] owns one open session's bytes, annotations, selection
//! and viewport. [`AppState`] wraps it with presentation state. Handlers
//! are pure transitions `AppState -> AppState`, testable without a TUI.

pub mod annotation_handler;
pub mod app_state;
pub mod comment_editor;
pub mod mouse_handler;
pub mod scroll_handler;
pub mod selection;
pub mod selection_handler;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use annotation_handler::{handle_annotation_action, handle_editor_key};
pub use app_state::{AppState, FocusPane};
pub use comment_editor::{CommentEditor, EditorTab};
pub use mouse_handler::{detect_byte_hit, handle_mouse_event, ByteHit};
pub use scroll_handler::handle_scroll_action;
pub use selection::{PressOutcome, Selection, SelectionModel};
pub use selection_handler::handle_selection_action;
pub use session::{FileSession, Notice, SessionSettings};
