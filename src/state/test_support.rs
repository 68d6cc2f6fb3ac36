//! Shared builders for state-layer tests.

use crate::model::{SessionId, SessionRecord, UserId};
use crate::source::RecordingWriter;
use crate::state::session::{FileSession, SessionSettings};
use crate::state::AppState;
use crate::store::RecordingLoader;
use crate::view_state::types::ViewportDimensions;
use chrono::Utc;

/// Pane width giving sixteen bytes per row with terminal metrics.
pub const PANE_WIDTH: u16 = 221;
pub const PANE_HEIGHT: u16 = 10;

pub fn record(file_size: u64, owner: &str, comments: &[(&str, &str)]) -> SessionRecord {
    SessionRecord {
        id: SessionId::new("test-session").unwrap(),
        filename: "test.bin".into(),
        file_size,
        comments: comments
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        user_id: UserId::new(owner).unwrap(),
        forked_from: None,
        created_at: Utc::now(),
    }
}

/// AppState over a session owned by `ada`, viewed by `viewer`.
pub fn app_state(
    file_size: u64,
    viewer: Option<&str>,
    comments: &[(&str, &str)],
) -> (AppState, RecordingLoader, RecordingWriter) {
    let loader = RecordingLoader::new();
    let writer = RecordingWriter::new();
    let session = FileSession::new(
        record(file_size, "ada", comments),
        viewer.map(|v| UserId::new(v).unwrap()),
        Box::new(loader.clone()),
        Box::new(writer.clone()),
        &SessionSettings::default(),
        ViewportDimensions::new(PANE_WIDTH, PANE_HEIGHT),
    )
    .unwrap();
    (AppState::new(session), loader, writer)
}
