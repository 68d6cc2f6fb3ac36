//! Hex pane and chrome styling.
//!
//! Every style collapses to plain text when colours are disabled; selection
//! and highlight then fall back to reverse video and underline so they stay
//! visible.

use crate::view_state::ByteCell;
use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Determines whether colors should be enabled or disabled based on:
/// - `--no-color` CLI flag
/// - `NO_COLOR` environment variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Create a ColorConfig from CLI args and environment.
    ///
    /// Priority (first match wins):
    /// 1. `--no-color` flag (disables colors)
    /// 2. `NO_COLOR` env var (any value disables colors)
    /// 3. Default: colors enabled
    pub fn from_env_and_args(no_color_flag: bool) -> Self {
        let enabled = !no_color_flag && std::env::var("NO_COLOR").is_err();
        Self { enabled }
    }

    pub fn enabled() -> Self {
        Self { enabled: true }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== HexStyles =====

/// Styles used across the hex viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexStyles {
    pub offset: Style,
    pub placeholder: Style,
    pub selected: Style,
    pub highlighted: Style,
    pub annotated: Style,
    pub active: Style,
    pub row_marker: Style,
    pub header: Style,
    pub owner_badge: Style,
    pub read_only_badge: Style,
    pub focused_border: Style,
    pub info: Style,
    pub error: Style,
    pub hint: Style,
}

impl HexStyles {
    pub fn with_color_config(config: ColorConfig) -> Self {
        if config.colors_enabled() {
            Self {
                offset: Style::default().fg(Color::DarkGray),
                placeholder: Style::default().fg(Color::DarkGray),
                selected: Style::default().bg(Color::Blue).fg(Color::White),
                highlighted: Style::default().bg(Color::Yellow).fg(Color::Black),
                annotated: Style::default().fg(Color::Green),
                active: Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                row_marker: Style::default().fg(Color::Green),
                header: Style::default().fg(Color::Cyan),
                owner_badge: Style::default().fg(Color::Green),
                read_only_badge: Style::default().fg(Color::Yellow),
                focused_border: Style::default().fg(Color::Cyan),
                info: Style::default().fg(Color::Gray),
                error: Style::default().fg(Color::Red),
                hint: Style::default().fg(Color::DarkGray),
            }
        } else {
            Self {
                offset: Style::default(),
                placeholder: Style::default(),
                selected: Style::default().add_modifier(Modifier::REVERSED),
                highlighted: Style::default().add_modifier(Modifier::REVERSED),
                annotated: Style::default(),
                active: Style::default().add_modifier(Modifier::UNDERLINED),
                row_marker: Style::default(),
                header: Style::default(),
                owner_badge: Style::default(),
                read_only_badge: Style::default(),
                focused_border: Style::default().add_modifier(Modifier::BOLD),
                info: Style::default(),
                error: Style::default().add_modifier(Modifier::BOLD),
                hint: Style::default(),
            }
        }
    }

    /// Style for one byte cell. Selection wins over highlight, highlight over
    /// the active annotation, and that over plain annotation membership.
    pub fn for_cell(&self, cell: &ByteCell) -> Style {
        if !cell.is_loaded() {
            self.placeholder
        } else if cell.selected {
            self.selected
        } else if cell.highlighted {
            self.highlighted
        } else if cell.active {
            self.active
        } else if cell.annotated {
            self.annotated
        } else {
            Style::default()
        }
    }
}

impl Default for HexStyles {
    fn default() -> Self {
        Self::with_color_config(ColorConfig::from_env_and_args(false))
    }
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;

    fn cell() -> ByteCell {
        ByteCell {
            offset: 0,
            value: Some(0x41),
            selected: false,
            highlighted: false,
            annotated: false,
            active: false,
        }
    }

    #[test]
    fn no_color_flag_disables_colors() {
        assert!(!ColorConfig::from_env_and_args(true).colors_enabled());
    }

    #[test]
    fn selection_beats_highlight_and_annotation() {
        let styles = HexStyles::with_color_config(ColorConfig::enabled());
        let c = ByteCell {
            selected: true,
            highlighted: true,
            annotated: true,
            ..cell()
        };
        assert_eq!(styles.for_cell(&c), styles.selected);
    }

    #[test]
    fn unloaded_cells_use_placeholder_style() {
        let styles = HexStyles::with_color_config(ColorConfig::enabled());
        let c = ByteCell {
            value: None,
            selected: true,
            ..cell()
        };
        assert_eq!(styles.for_cell(&c), styles.placeholder);
    }

    #[test]
    fn disabled_colors_keep_selection_visible() {
        let styles = HexStyles::with_color_config(ColorConfig::disabled());
        let c = ByteCell {
            selected: true,
            ..cell()
        };
        assert_eq!(styles.for_cell(&c), Style::default().add_modifier(Modifier::REVERSED));
        assert_eq!(styles.for_cell(&cell()), Style::default());
    }
}
