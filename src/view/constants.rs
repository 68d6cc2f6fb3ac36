//! Layout dimension constants for TUI rendering.
//!
//! Centralized location for all layout-related numeric values to enable
//! consistent tuning across the application.

use std::time::Duration;

/// Height of the header bar in lines.
pub const HEADER_HEIGHT: u16 = 1;

/// Height of the selection info bar in lines.
pub const INFO_BAR_HEIGHT: u16 = 1;

/// Height of the status bar in lines.
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Width percentage of the annotation sidebar.
pub const SIDEBAR_WIDTH_PERCENT: u16 = 30;

/// Narrowest the sidebar gets before it is hidden.
pub const SIDEBAR_MIN_WIDTH: u16 = 24;

/// Width percentage for the comment editor popup.
pub const EDITOR_POPUP_WIDTH_PERCENT: u16 = 60;

/// Height percentage for the comment editor popup.
pub const EDITOR_POPUP_HEIGHT_PERCENT: u16 = 50;

/// Event loop tick. Debounced scrolls and resizes are evaluated and backend
/// completions drained at this interval.
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Display columns the file name may take in the header.
pub const HEADER_FILENAME_MAX_WIDTH: usize = 48;
