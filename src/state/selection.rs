//! Anchor/focus byte selection state machine.

use crate::model::{AnnotationIndex, ByteRange};

/// Selection lifecycle.
///
/// ```text
/// Idle --begin--> Selecting --end--> Selected
///  ^                 |  ^                |
///  +-----clear-------+  +-----begin------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Idle,
    /// Pointer held down; `focus` follows drags.
    Selecting { anchor: u64, focus: u64 },
    /// Pointer released; frozen until the next `begin` or `clear`.
    Selected { anchor: u64, focus: u64 },
}

/// What a press on a byte did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// Started a new selection at the pressed offset.
    Selecting,
    /// The byte belongs to this annotation; selection was cleared instead.
    Annotation(ByteRange),
}

/// Tracks the current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    state: Selection,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Selection {
        self.state
    }

    /// Start selecting at `offset` (from any state).
    pub fn begin(&mut self, offset: u64) {
        self.state = Selection::Selecting {
            anchor: offset,
            focus: offset,
        };
    }

    /// Move the focus while selecting. Ignored in other states.
    pub fn extend(&mut self, offset: u64) {
        if let Selection::Selecting { focus, .. } = &mut self.state {
            *focus = offset;
        }
    }

    /// Freeze an in-progress selection.
    pub fn end(&mut self) {
        if let Selection::Selecting { anchor, focus } = self.state {
            self.state = Selection::Selected { anchor, focus };
        }
    }

    pub fn clear(&mut self) {
        self.state = Selection::Idle;
    }

    /// Move the focus of a finished selection (keyboard extension).
    pub fn adjust_focus(&mut self, offset: u64) {
        match &mut self.state {
            Selection::Selecting { focus, .. } | Selection::Selected { focus, .. } => {
                *focus = offset;
            }
            Selection::Idle => {}
        }
    }

    /// Press on `offset`: activates the annotation containing it, otherwise
    /// begins a selection.
    pub fn press(&mut self, offset: u64, annotations: &AnnotationIndex) -> PressOutcome {
        match annotations.find_containing(offset) {
            Some(annotation) => {
                self.clear();
                PressOutcome::Annotation(annotation.range)
            }
            None => {
                self.begin(offset);
                PressOutcome::Selecting
            }
        }
    }

    /// Normalized inclusive range `[min(anchor, focus), max(anchor, focus)]`.
    pub fn range(&self) -> Option<ByteRange> {
        match self.state {
            Selection::Idle => None,
            Selection::Selecting { anchor, focus } | Selection::Selected { anchor, focus } => {
                Some(ByteRange::normalized(anchor, focus))
            }
        }
    }

    /// The end that moves when extending.
    pub fn focus(&self) -> Option<u64> {
        match self.state {
            Selection::Idle => None,
            Selection::Selecting { focus, .. } | Selection::Selected { focus, .. } => Some(focus),
        }
    }

    pub fn is_selecting(&self) -> bool {
        matches!(self.state, Selection::Selecting { .. })
    }

    pub fn is_empty(&self) -> bool {
        self.state == Selection::Idle
    }
}
