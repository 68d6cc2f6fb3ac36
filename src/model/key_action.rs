//! Domain-level keyboard actions independent of key bindings.

/// Domain-level actions that can be mapped to configurable key bindings.
///
/// These represent user intent, not specific keys. The mapping from
/// crossterm::event::KeyEvent to KeyAction is handled by KeyBindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    // Scrolling
    /// Scroll the hex pane up by one row. Default: k/↑
    ScrollUp,
    /// Scroll the hex pane down by one row. Default: j/↓
    ScrollDown,
    /// Scroll up by one page height. Default: Ctrl+u/Page Up
    PageUp,
    /// Scroll down by one page height. Default: Ctrl+d/Page Down
    PageDown,
    /// Jump to offset 0. Default: g/Home
    ScrollToTop,
    /// Jump to the last row. Default: G/End
    ScrollToBottom,

    // Selection
    /// Move the selection cursor one byte left (Shift extends). Default: h/←
    CursorLeft,
    /// Move the selection cursor one byte right. Default: l/→
    CursorRight,
    /// Extend the selection one byte left. Default: H/Shift+←
    ExtendLeft,
    /// Extend the selection one byte right. Default: L/Shift+→
    ExtendRight,
    /// Clear selection and highlight, close overlays. Default: Esc
    ClearSelection,

    // Numeric interpretation
    /// Toggle little/big endian decoding. Default: e
    ToggleEndianness,
    /// Toggle unsigned/signed decoding. Default: s
    ToggleSignedness,

    // Annotations
    /// Open the comment editor for the current selection. Default: c
    AddComment,
    /// Delete the active annotation (owner only). Default: d
    DeleteComment,
    /// Move focus between hex pane and annotation sidebar. Default: Tab
    CycleFocus,
    /// Activate the next annotation in the sidebar. Default: ]
    NextAnnotation,
    /// Activate the previous annotation in the sidebar. Default: [
    PrevAnnotation,
    /// Jump to the annotation under the sidebar cursor. Default: Enter
    JumpToAnnotation,
    /// Show the deep link for the active annotation. Default: y
    CopyLink,

    // Session
    /// Fork the current session into one owned by the viewer. Default: F
    Fork,

    // Application
    /// Exit the application. Default: q/Ctrl+c
    Quit,
}
