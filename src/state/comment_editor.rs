//! Comment editor overlay state (pure state transitions).
//!
//! The editor holds a draft for one byte range. Text is Markdown; the
//! Preview tab renders it the same way the sidebar does.

use crate::model::ByteRange;

/// Which tab of the editor is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorTab {
    #[default]
    Edit,
    Preview,
}

impl EditorTab {
    pub fn toggle(self) -> Self {
        match self {
            Self::Edit => Self::Preview,
            Self::Preview => Self::Edit,
        }
    }
}

/// Draft annotation being written.
///
/// # Invariants
///
/// `cursor` counts chars, not bytes, and is always `<= text.chars().count()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentEditor {
    range: ByteRange,
    text: String,
    cursor: usize,
    tab: EditorTab,
}

impl CommentEditor {
    /// Open an editor for `range`, prefilled with `existing` text if the
    /// range is already annotated.
    pub fn open(range: ByteRange, existing: Option<&str>) -> Self {
        let text = existing.unwrap_or_default().to_string();
        let cursor = text.chars().count();
        Self {
            range,
            text,
            cursor,
            tab: EditorTab::Edit,
        }
    }

    pub fn range(&self) -> ByteRange {
        self.range
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn tab(&self) -> EditorTab {
        self.tab
    }

    fn byte_index(&self) -> usize {
        self.text
            .char_indices()
            .nth(self.cursor)
            .map_or(self.text.len(), |(i, _)| i)
    }

    /// Insert `ch` at the cursor. No-op on the Preview tab.
    pub fn insert_char(mut self, ch: char) -> Self {
        if self.tab == EditorTab::Preview {
            return self;
        }
        let at = self.byte_index();
        self.text.insert(at, ch);
        self.cursor += 1;
        self
    }

    /// Delete the char before the cursor.
    pub fn backspace(mut self) -> Self {
        if self.tab == EditorTab::Preview || self.cursor == 0 {
            return self;
        }
        self.cursor -= 1;
        let at = self.byte_index();
        self.text.remove(at);
        self
    }

    pub fn cursor_left(mut self) -> Self {
        self.cursor = self.cursor.saturating_sub(1);
        self
    }

    pub fn cursor_right(mut self) -> Self {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
        self
    }

    pub fn toggle_tab(mut self) -> Self {
        self.tab = self.tab.toggle();
        self
    }
}
