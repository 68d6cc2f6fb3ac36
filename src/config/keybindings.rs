//! Keyboard bindings configuration.

use crate::model::key_action::KeyAction;
use crossterm::event::KeyEvent;
use std::collections::HashMap;

/// Maps keyboard events to domain actions.
///
/// Provides default vim-style bindings with option to override via configuration.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyEvent, KeyAction>,
}

impl KeyBindings {
    /// Look up the action for a key event.
    ///
    /// Only code and modifiers take part in the lookup; event kind and
    /// keyboard state (from enhanced terminals) are ignored.
    pub fn get(&self, key: KeyEvent) -> Option<KeyAction> {
        self.bindings
            .get(&KeyEvent::new(key.code, key.modifiers))
            .copied()
    }

    /// Bind `key` to `action`, replacing any previous binding for that key.
    pub fn bind(&mut self, key: KeyEvent, action: KeyAction) {
        self.bindings.insert(key, action);
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        use crossterm::event::{KeyCode, KeyModifiers};

        let mut bindings = HashMap::new();

        // Vim-style scrolling
        bindings.insert(
            KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE),
            KeyAction::ScrollDown,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::Char('k'), KeyModifiers::NONE),
            KeyAction::ScrollUp,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::Char('g'), KeyModifiers::NONE),
            KeyAction::ScrollToTop,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT),
            KeyAction::ScrollToBottom,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::Home, KeyModifiers::NONE),
            KeyAction::ScrollToTop,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::End, KeyModifiers::NONE),
            KeyAction::ScrollToBottom,
        );

        // Arrow key scrolling
        bindings.insert(
            KeyEvent::new(KeyCode::Up, KeyModifiers::NONE),
            KeyAction::ScrollUp,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::Down, KeyModifiers::NONE),
            KeyAction::ScrollDown,
        );

        // Page navigation
        bindings.insert(
            KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL),
            KeyAction::PageDown,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL),
            KeyAction::PageUp,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::PageDown, KeyModifiers::NONE),
            KeyAction::PageDown,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::PageUp, KeyModifiers::NONE),
            KeyAction::PageUp,
        );

        // Keyboard selection
        bindings.insert(
            KeyEvent::new(KeyCode::Char('h'), KeyModifiers::NONE),
            KeyAction::CursorLeft,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::Char('l'), KeyModifiers::NONE),
            KeyAction::CursorRight,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::Left, KeyModifiers::NONE),
            KeyAction::CursorLeft,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::Right, KeyModifiers::NONE),
            KeyAction::CursorRight,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::Char('H'), KeyModifiers::SHIFT),
            KeyAction::ExtendLeft,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::Char('L'), KeyModifiers::SHIFT),
            KeyAction::ExtendRight,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT),
            KeyAction::ExtendLeft,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT),
            KeyAction::ExtendRight,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE),
            KeyAction::ClearSelection,
        );

        // Numeric interpretation
        bindings.insert(
            KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE),
            KeyAction::ToggleEndianness,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE),
            KeyAction::ToggleSignedness,
        );

        // Annotations
        bindings.insert(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE),
            KeyAction::AddComment,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::Char('d'), KeyModifiers::NONE),
            KeyAction::DeleteComment,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE),
            KeyAction::CycleFocus,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::Char(']'), KeyModifiers::NONE),
            KeyAction::NextAnnotation,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::Char('['), KeyModifiers::NONE),
            KeyAction::PrevAnnotation,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
            KeyAction::JumpToAnnotation,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE),
            KeyAction::CopyLink,
        );

        // Session
        bindings.insert(
            KeyEvent::new(KeyCode::Char('F'), KeyModifiers::SHIFT),
            KeyAction::Fork,
        );

        // Application controls
        bindings.insert(
            KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE),
            KeyAction::Quit,
        );
        bindings.insert(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            KeyAction::Quit,
        );

        Self { bindings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventKind, KeyEventState, KeyModifiers};

    #[test]
    fn default_bindings_map_e_and_s_to_numeric_toggles() {
        let bindings = KeyBindings::default();

        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE)),
            Some(KeyAction::ToggleEndianness)
        );
        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE)),
            Some(KeyAction::ToggleSignedness)
        );
    }

    #[test]
    fn lowercase_c_comments_but_ctrl_c_quits() {
        let bindings = KeyBindings::default();

        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)),
            Some(KeyAction::AddComment)
        );
        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(KeyAction::Quit)
        );
    }

    #[test]
    fn uppercase_f_forks() {
        let bindings = KeyBindings::default();
        let key_event = KeyEvent::new(KeyCode::Char('F'), KeyModifiers::SHIFT);

        assert_eq!(bindings.get(key_event), Some(KeyAction::Fork));
    }

    #[test]
    fn lookup_ignores_event_kind_and_state() {
        let bindings = KeyBindings::default();
        let key_event = KeyEvent {
            code: KeyCode::Char('j'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Repeat,
            state: KeyEventState::NUM_LOCK,
        };

        assert_eq!(bindings.get(key_event), Some(KeyAction::ScrollDown));
    }

    #[test]
    fn bind_overrides_default() {
        let mut bindings = KeyBindings::default();
        let key_event = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
        bindings.bind(key_event, KeyAction::PageDown);

        assert_eq!(bindings.get(key_event), Some(KeyAction::PageDown));
    }
}
