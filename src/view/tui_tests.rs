//! Tests for the TUI shell: key dispatch, forking, resize and drawing.

use super::*;
use crate::model::ByteRange;
use crate::state::Notice;
use ratatui::backend::TestBackend;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;

// ===== Test Helpers =====

struct Fixture {
    dir: PathBuf,
    app: TuiApp<TestBackend>,
    record: SessionRecord,
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

fn fixture(name: &str) -> Fixture {
    let dir = std::env::temp_dir().join(format!("hexplore_tui_{name}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    let file = dir.join("firmware.bin");
    fs::write(&file, (0u8..=255).cycle().take(4096).collect::<Vec<u8>>()).unwrap();

    let (tx, rx) = mpsc::channel();
    let storage = Storage::local(&dir.join("store"), tx);
    let record = storage
        .share_file(&file, &UserId::new("ada").unwrap())
        .unwrap();

    let terminal = Terminal::new(TestBackend::new(240, 30)).unwrap();
    let app = TuiApp::with_terminal(
        terminal,
        storage,
        rx,
        SessionSettings::default(),
        HexStyles::with_color_config(ColorConfig::disabled()),
    )
    .unwrap();

    Fixture { dir, app, record }
}

fn open(fixture: &Fixture, viewer: &str) -> AppState {
    let session = fixture
        .app
        .open_session(fixture.record.clone(), Some(UserId::new(viewer).unwrap()))
        .unwrap();
    AppState::new(session)
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn press(app: &mut TuiApp<TestBackend>, state: AppState, event: KeyEvent) -> AppState {
    match app.handle_key(state, event, Instant::now()) {
        ControlFlow::Continue(state) => state,
        ControlFlow::Break(()) => panic!("unexpected quit"),
    }
}

// ===== Tests =====

#[test]
fn tui_error_from_io_error() {
    let io_err = io::Error::other("test error");
    let tui_err: TuiError = io_err.into();
    assert!(matches!(tui_err, TuiError::Io(_)));
}

#[test]
fn handle_key_q_quits() {
    let mut f = fixture("quit");
    let state = open(&f, "ada");

    let flow = f.app.handle_key(state, key(KeyCode::Char('q')), Instant::now());

    assert!(matches!(flow, ControlFlow::Break(())));
}

#[test]
fn ctrl_c_quits_even_while_editing() {
    let mut f = fixture("ctrl_c");
    let mut state = open(&f, "ada");
    state.session_mut().press(0);
    state.session_mut().release();
    let state = press(&mut f.app, state, key(KeyCode::Char('c')));
    assert!(state.editor.is_some());

    let flow = f.app.handle_key(
        state,
        KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        Instant::now(),
    );

    assert!(matches!(flow, ControlFlow::Break(())));
}

#[test]
fn editor_captures_bound_keys() {
    let mut f = fixture("editor");
    let mut state = open(&f, "ada");
    state.session_mut().press(4);
    state.session_mut().release();

    let state = press(&mut f.app, state, key(KeyCode::Char('c')));
    // 'q' is bound to Quit but must be typed into the draft
    let state = press(&mut f.app, state, key(KeyCode::Char('q')));
    let state = press(&mut f.app, state, key(KeyCode::Char('j')));

    assert_eq!(state.editor.as_ref().map(|e| e.text()), Some("qj"));

    let state = press(&mut f.app, state, key(KeyCode::Esc));
    assert!(state.editor.is_none());
}

#[test]
fn tab_cycles_focus() {
    let mut f = fixture("focus");
    let state = open(&f, "ada");

    let state = press(&mut f.app, state, key(KeyCode::Tab));

    assert_eq!(state.focus, crate::state::FocusPane::Sidebar);
}

#[test]
fn fork_switches_to_owned_copy_with_annotations() {
    let mut f = fixture("fork");
    let original = f.record.id.clone();

    // Bob opens ada's annotated session read-only and forks it.
    let mut record = f.record.clone();
    record.comments = [("0-3".to_string(), "magic".to_string())].into();
    let session = f
        .app
        .open_session(record, Some(UserId::new("bob").unwrap()))
        .unwrap();
    let state = AppState::new(session);
    assert!(!state.session().is_owner());

    let state = press(
        &mut f.app,
        state,
        KeyEvent::new(KeyCode::Char('F'), KeyModifiers::SHIFT),
    );

    let session = state.session();
    assert!(session.is_owner());
    assert_ne!(session.id(), &original);
    assert_eq!(session.record().forked_from.as_ref(), Some(&original));
    assert_eq!(session.record().user_id.as_str(), "bob");
    assert_eq!(
        session.annotations().get(&ByteRange::new(0, 3).unwrap()),
        Some("magic")
    );
    assert!(matches!(state.status, Some(Notice::Info(_))));
}

#[test]
fn fork_stops_change_feed_of_previous_session() {
    let mut f = fixture("fork_feed");
    let original = f.record.id.clone();
    let state = open(&f, "bob");

    let state = press(
        &mut f.app,
        state,
        KeyEvent::new(KeyCode::Char('F'), KeyModifiers::SHIFT),
    );
    assert_ne!(state.session().id(), &original);

    let comments: crate::model::CommentsMap =
        [("8-9".to_string(), "late edit".to_string())].into();
    f.app
        .storage
        .metadata()
        .update_comments(&original, &comments, &UserId::new("ada").unwrap())
        .unwrap();

    let feed_for_original = f.app.events.try_iter().any(|event| {
        matches!(event, BackendEvent::CommentsChanged { ref session, .. } if *session == original)
    });
    assert!(!feed_for_original);
}

#[test]
fn fork_without_user_reports_error() {
    let mut f = fixture("fork_anon");
    let session = f.app.open_session(f.record.clone(), None).unwrap();
    let state = AppState::new(session);

    let state = press(
        &mut f.app,
        state,
        KeyEvent::new(KeyCode::Char('F'), KeyModifiers::SHIFT),
    );

    assert!(state.status.as_ref().is_some_and(Notice::is_error));
    assert_eq!(state.session().id(), &f.record.id);
}

#[test]
fn resize_updates_hex_pane_area() {
    let mut f = fixture("resize");
    let mut state = open(&f, "ada");

    f.app.handle_resize(&mut state, 80, 20, Instant::now());

    assert!(f.app.areas.sidebar.is_some());
    assert_eq!(f.app.areas.status.y, 19);
}

#[test]
fn drain_events_loads_pages_from_worker() {
    let mut f = fixture("drain");
    let mut state = open(&f, "ada");
    state.session_mut().load_visible();

    // The worker reads the blob asynchronously.
    let deadline = Instant::now() + std::time::Duration::from_secs(5);
    while state.session().store().get_byte(0).is_none() && Instant::now() < deadline {
        std::thread::sleep(std::time::Duration::from_millis(10));
        f.app.drain_events(&mut state);
    }

    assert_eq!(state.session().store().get_byte(0x41), Some(0x41));
}

#[test]
fn open_at_applies_deep_link() {
    let f = fixture("deep_link");
    let mut state = open(&f, "ada");

    open_at(&mut state, Some("comment-100-104"));

    assert_eq!(state.session().highlight(), Some(ByteRange::new(100, 104).unwrap()));
}

#[test]
fn open_at_reports_bad_link() {
    let f = fixture("bad_link");
    let mut state = open(&f, "ada");

    open_at(&mut state, Some("comment-9999-10000"));

    assert!(state.status.as_ref().is_some_and(Notice::is_error));
    assert_eq!(state.session().highlight(), None);
}

#[test]
fn draw_renders_without_error() {
    let mut f = fixture("draw");
    let state = open(&f, "ada");

    assert!(f.app.draw(&state).is_ok());
}
