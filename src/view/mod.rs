//! TUI rendering and terminal management (impure shell)

pub mod comment_overlay;
pub mod constants;
pub mod hex_pane;
pub mod info_bar;
pub mod layout;
pub mod markdown;
pub mod sidebar;
pub mod styles;

pub use layout::{calculate_areas, PaneAreas};
pub use styles::{ColorConfig, HexStyles};

use crate::config::keybindings::KeyBindings;
use crate::model::{AppError, KeyAction, SessionRecord, UserId};
use crate::source::{Backend as Storage, BackendEvent};
use crate::state::{
    handle_annotation_action, handle_editor_key, handle_mouse_event, handle_scroll_action,
    handle_selection_action, AppState, FileSession, SessionSettings,
};
use crate::store::InvalidGeometry;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io::{self, Stdout};
use std::ops::ControlFlow;
use std::sync::mpsc::Receiver;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

use constants::TICK_INTERVAL;

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations or worker startup
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),

    /// Session could not be laid out (e.g. zero page size)
    #[error("Invalid session geometry: {0}")]
    Geometry(#[from] InvalidGeometry),

    /// Application error
    #[error("Application error: {0}")]
    App(#[from] AppError),
}

/// What to open when the TUI starts.
#[derive(Debug, Clone)]
pub struct Launch {
    pub record: SessionRecord,
    pub viewer: Option<UserId>,
    /// Deep-link fragment (`comment-{start}-{end}`) applied after opening.
    pub fragment: Option<String>,
    pub settings: SessionSettings,
    pub colors: ColorConfig,
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend. The
/// [`AppState`] is threaded through the loop by value so the pure
/// handlers can consume and return it.
pub struct TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    terminal: Terminal<B>,
    key_bindings: KeyBindings,
    storage: Storage,
    events: Receiver<BackendEvent>,
    settings: SessionSettings,
    styles: HexStyles,
    /// Areas of the last layout (hex pane rect for mouse hit-testing)
    areas: PaneAreas,
}

impl<B> TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    /// Wrap an already initialized terminal.
    pub fn with_terminal(
        terminal: Terminal<B>,
        storage: Storage,
        events: Receiver<BackendEvent>,
        settings: SessionSettings,
        styles: HexStyles,
    ) -> Result<Self, TuiError> {
        let size = terminal.size()?;
        let areas = calculate_areas(Rect::new(0, 0, size.width.max(1), size.height));
        Ok(Self {
            terminal,
            key_bindings: KeyBindings::default(),
            storage,
            events,
            settings,
            styles,
            areas,
        })
    }

    /// Start workers for `record` and build a session sized to the hex pane.
    ///
    /// # Errors
    ///
    /// `Io` if a worker thread cannot be spawned, `Geometry` for an invalid
    /// page size.
    pub fn open_session(
        &self,
        record: SessionRecord,
        viewer: Option<UserId>,
    ) -> Result<FileSession, TuiError> {
        let loader = self.storage.loader_for(&record)?;
        let writer = self.storage.writer_for(&record, viewer.as_ref())?;
        let id = record.id.clone();
        let session = FileSession::new(
            record,
            viewer,
            loader,
            writer,
            &self.settings,
            self.areas.hex_viewport(),
        )?;
        self.storage.subscribe(&id);
        Ok(session)
    }

    /// Run the event loop until the user quits.
    ///
    /// Every tick drains backend completions, applies settled scrolls and
    /// resizes, and redraws.
    pub fn run(&mut self, mut state: AppState) -> Result<(), TuiError> {
        self.draw(&state)?;

        loop {
            if event::poll(TICK_INTERVAL)? {
                let now = Instant::now();
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        match self.handle_key(state, key, now) {
                            ControlFlow::Break(()) => return Ok(()),
                            ControlFlow::Continue(next) => state = next,
                        }
                    }
                    Event::Mouse(mouse) => {
                        state = handle_mouse_event(state, mouse, self.areas.hex_inner(), now);
                    }
                    Event::Resize(width, height) => self.handle_resize(&mut state, width, height, now),
                    _ => {}
                }
            }

            self.drain_events(&mut state);
            state.session_mut().tick(Instant::now());
            self.draw(&state)?;
        }
    }

    /// Handle a single keyboard event
    ///
    /// Breaks when the app should quit.
    fn handle_key(&mut self, state: AppState, key: KeyEvent, now: Instant) -> ControlFlow<(), AppState> {
        // Ctrl+C always quits, even while editing
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return ControlFlow::Break(());
        }

        if state.editor.is_some() {
            return ControlFlow::Continue(handle_editor_key(state, key));
        }

        let Some(action) = self.key_bindings.get(key) else {
            return ControlFlow::Continue(state);
        };
        debug!(?action, "Key action");

        let next = match action {
            KeyAction::Quit => return ControlFlow::Break(()),
            KeyAction::Fork => self.fork(state),
            KeyAction::CycleFocus => {
                let mut state = state;
                state.cycle_focus();
                state
            }
            KeyAction::ScrollUp
            | KeyAction::ScrollDown
            | KeyAction::PageUp
            | KeyAction::PageDown
            | KeyAction::ScrollToTop
            | KeyAction::ScrollToBottom => handle_scroll_action(state, action, now),
            KeyAction::CursorLeft
            | KeyAction::CursorRight
            | KeyAction::ExtendLeft
            | KeyAction::ExtendRight
            | KeyAction::ClearSelection
            | KeyAction::ToggleEndianness
            | KeyAction::ToggleSignedness => handle_selection_action(state, action, now),
            KeyAction::AddComment
            | KeyAction::DeleteComment
            | KeyAction::NextAnnotation
            | KeyAction::PrevAnnotation
            | KeyAction::JumpToAnnotation
            | KeyAction::CopyLink => handle_annotation_action(state, action),
        };
        ControlFlow::Continue(next)
    }

    /// Fork the open session into one owned by the viewer and switch to it.
    ///
    /// The fork starts from the current annotation set. On failure the
    /// current session stays open.
    fn fork(&mut self, mut state: AppState) -> AppState {
        let Some(owner) = state.session().viewer().cloned() else {
            state.error("Set a user (--user or HEXPLORE_USER) to fork");
            return state;
        };

        let source = state.session().record().clone();
        let comments = state.session().comments();
        let forked = self
            .storage
            .fork(&source, comments, &owner)
            .map_err(|e| TuiError::App(e.into()))
            .and_then(|record| self.open_session(record, Some(owner)));

        match forked {
            Ok(session) => {
                let id = session.id().clone();
                let previous = state.replace_session(session);
                self.storage.unsubscribe(previous.id());
                state.session_mut().load_visible();
                info!(source = %previous.id(), fork = %id, "Switched to fork");
                state.info(format!("Forked into {id}; you own this copy"));
            }
            Err(e) => {
                warn!(error = %e, "Fork failed");
                state.error(format!("Fork failed: {e}"));
            }
        }
        state
    }

    fn handle_resize(&mut self, state: &mut AppState, width: u16, height: u16, now: Instant) {
        debug!("Handling resize to {}x{}", width, height);
        self.areas = calculate_areas(Rect::new(0, 0, width.max(1), height));
        state.session_mut().resize(self.areas.hex_viewport(), now);
    }

    /// Apply every completion the workers have reported so far.
    fn drain_events(&mut self, state: &mut AppState) {
        while let Ok(event) = self.events.try_recv() {
            if let Some(notice) = state.session_mut().handle_event(event) {
                state.notify(notice);
            }
        }
    }

    /// Render the current frame
    fn draw(&mut self, state: &AppState) -> Result<(), TuiError> {
        let size = self.terminal.size()?;
        self.areas = calculate_areas(Rect::new(0, 0, size.width.max(1), size.height));

        self.terminal.draw(|frame| {
            layout::render_layout(frame, state, &self.styles);
        })?;
        Ok(())
    }
}

/// Set up the terminal, open `launch.record` and run until the user quits.
///
/// Logging must be initialized by the caller. The terminal is restored even
/// when the loop fails.
pub fn run_with_storage(
    storage: Storage,
    events: Receiver<BackendEvent>,
    launch: Launch,
) -> Result<(), TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(crossterm::event::EnableMouseCapture)?;
    let terminal: Terminal<CrosstermBackend<Stdout>> = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = start(terminal, storage, events, launch);

    // Always restore terminal state
    restore_terminal()?;

    result
}

fn start<B: ratatui::backend::Backend>(
    terminal: Terminal<B>,
    storage: Storage,
    events: Receiver<BackendEvent>,
    launch: Launch,
) -> Result<(), TuiError> {
    let styles = HexStyles::with_color_config(launch.colors);
    let mut app = TuiApp::with_terminal(terminal, storage, events, launch.settings, styles)?;
    let session = app.open_session(launch.record, launch.viewer)?;
    let mut state = AppState::new(session);
    open_at(&mut state, launch.fragment.as_deref());
    app.run(state)
}

/// Apply the launch fragment, or load the first screen when there is none.
///
/// A bad fragment is reported in the status bar and the view opens at the
/// top of the file.
pub fn open_at(state: &mut AppState, fragment: Option<&str>) {
    let Some(fragment) = fragment else {
        state.session_mut().load_visible();
        return;
    };
    match state.session_mut().apply_fragment(fragment) {
        Ok(range) => {
            state.select_in_sidebar(range);
            info!(%range, "Opened at deep link");
        }
        Err(e) => {
            warn!(fragment, error = %e, "Ignoring deep link");
            state.session_mut().load_visible();
            state.error(format!("Invalid link: {e}"));
        }
    }
}

/// Restore terminal to normal state
///
/// Disables raw mode, mouse capture, and leaves alternate screen
pub fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(crossterm::event::DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
#[path = "tui_tests.rs"]
mod tests;
