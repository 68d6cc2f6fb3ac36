//! Application state and transitions.
//!
//! AppState is the root state type containing all UI state. Session data
//! lives in [`FileSession`]; everything else here is presentation state.

use crate::model::{ByteRange, Endianness, NumericValue, Signedness};
use crate::state::comment_editor::CommentEditor;
use crate::state::session::{FileSession, Notice};

// ===== AppState =====

/// Application state.
///
/// # State Machine
///
/// - **Focus**: HexPane ⇄ Sidebar (via `cycle_focus`)
/// - **Editor**: closed → open (AddComment, owner only) → closed (save/cancel)
/// - **Status**: the latest notice, replaced by the next one and cleared by Esc
///
/// # Invariants
///
/// `sidebar_cursor`, when set, is a valid index into the session's
/// annotations sorted by start.
#[derive(Debug)]
pub struct AppState {
    session: FileSession,

    /// Which pane currently has keyboard focus.
    pub focus: FocusPane,

    /// Byte order for the selection info bar.
    pub endianness: Endianness,

    /// Signedness for the selection info bar.
    pub signedness: Signedness,

    /// Highlighted row of the annotation sidebar.
    sidebar_cursor: Option<usize>,

    /// Open comment editor, if any.
    pub editor: Option<CommentEditor>,

    /// Latest notice for the status bar.
    pub status: Option<Notice>,
}

impl AppState {
    pub fn new(session: FileSession) -> Self {
        Self {
            session,
            focus: FocusPane::HexPane,
            endianness: Endianness::default(),
            signedness: Signedness::default(),
            sidebar_cursor: None,
            editor: None,
            status: None,
        }
    }

    pub fn session(&self) -> &FileSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut FileSession {
        &mut self.session
    }

    /// Swap in a different session (e.g. a fresh fork), discarding the old
    /// one along with its store, annotations and selection.
    pub fn replace_session(&mut self, session: FileSession) -> FileSession {
        self.sidebar_cursor = None;
        self.editor = None;
        std::mem::replace(&mut self.session, session)
    }

    /// Cycle focus between the hex pane and the annotation sidebar.
    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            FocusPane::HexPane => FocusPane::Sidebar,
            FocusPane::Sidebar => FocusPane::HexPane,
        };
        if self.focus == FocusPane::Sidebar && self.sidebar_cursor.is_none() {
            self.sidebar_cursor = self.active_position().or_else(|| {
                (!self.session.annotations().is_empty()).then_some(0)
            });
        }
    }

    fn active_position(&self) -> Option<usize> {
        let active = self.session.active_annotation()?;
        self.session.annotations().position(&active)
    }

    /// Sidebar row to highlight: the cursor, clamped to the current list.
    ///
    /// Annotations can disappear under the cursor when the change feed
    /// pushes a new map, so this never trusts the stored index blindly.
    pub fn sidebar_cursor(&self) -> Option<usize> {
        let len = self.session.annotations().len();
        if len == 0 {
            return None;
        }
        self.sidebar_cursor
            .or_else(|| self.active_position())
            .map(|i| i.min(len - 1))
    }

    /// Range of the annotation under the sidebar cursor.
    pub fn sidebar_range(&self) -> Option<ByteRange> {
        let index = self.sidebar_cursor()?;
        self.session
            .annotations()
            .list_sorted_by_start()
            .get(index)
            .map(|a| a.range)
    }

    /// Move the sidebar cursor by `delta`, wrapping at both ends, and make
    /// the annotation under it active.
    pub fn move_sidebar_cursor(&mut self, delta: isize) {
        let len = self.session.annotations().len();
        if len == 0 {
            self.sidebar_cursor = None;
            return;
        }
        let next = match self.sidebar_cursor() {
            None if delta < 0 => len - 1,
            None => 0,
            Some(current) => (current as isize + delta).rem_euclid(len as isize) as usize,
        };
        self.sidebar_cursor = Some(next);
        let range = self.sidebar_range();
        self.session.set_active(range);
    }

    /// Point the sidebar cursor at `range` if it is annotated.
    pub fn select_in_sidebar(&mut self, range: ByteRange) {
        if let Some(position) = self.session.annotations().position(&range) {
            self.sidebar_cursor = Some(position);
        }
    }

    /// Decoded value of the current selection with the current settings.
    pub fn numeric_value(&self) -> NumericValue {
        self.session.numeric_value(self.endianness, self.signedness)
    }

    pub fn notify(&mut self, notice: Notice) {
        self.status = Some(notice);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.notify(Notice::Info(text.into()));
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.notify(Notice::Error(text.into()));
    }
}

// ===== FocusPane =====

/// Which pane has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusPane {
    /// Hex pane: scrolling and byte selection.
    #[default]
    HexPane,
    /// Annotation sidebar: browsing and jumping to annotations.
    Sidebar,
}
