//! Background annotation writer.

use super::{BackendEvent, CommentWriter, MetadataStore};
use crate::model::{CommentsMap, SessionId, UserId};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

/// [`CommentWriter`] that persists annotation maps on a worker thread.
///
/// Writes are full-map replacements, so when several are queued for the
/// same session only the newest is persisted.
pub struct ThreadedCommentWriter {
    requests: Sender<(SessionId, CommentsMap)>,
}

impl ThreadedCommentWriter {
    pub fn spawn(
        metadata: Arc<dyn MetadataStore>,
        user: UserId,
        events: Sender<BackendEvent>,
    ) -> std::io::Result<Self> {
        let (requests, rx) = mpsc::channel::<(SessionId, CommentsMap)>();
        thread::Builder::new()
            .name("hexplore-comments".to_string())
            .spawn(move || {
                while let Ok(first) = rx.recv() {
                    let mut latest = first;
                    // Coalesce: keep only the newest queued map per session.
                    while let Ok(next) = rx.try_recv() {
                        if next.0 != latest.0
                            && !persist(metadata.as_ref(), &user, &events, latest)
                        {
                            return;
                        }
                        latest = next;
                    }
                    if !persist(metadata.as_ref(), &user, &events, latest) {
                        return;
                    }
                }
                debug!("Comment writer stopped");
            })?;
        Ok(Self { requests })
    }
}

/// Write one map and report the outcome. Returns `false` once nobody is
/// listening for events.
fn persist(
    metadata: &dyn MetadataStore,
    user: &UserId,
    events: &Sender<BackendEvent>,
    (session, comments): (SessionId, CommentsMap),
) -> bool {
    let event = match metadata.update_comments(&session, &comments, user) {
        Ok(()) => BackendEvent::CommentsSaved { session },
        Err(e) => {
            warn!(session = %session, error = %e, "Saving annotations failed");
            BackendEvent::CommentsSaveFailed {
                session,
                error: e.to_string(),
            }
        }
    };
    events.send(event).is_ok()
}

impl CommentWriter for ThreadedCommentWriter {
    fn write(&self, session: &SessionId, comments: CommentsMap) {
        if self.requests.send((session.clone(), comments)).is_err() {
            warn!(session = %session, "Comment writer has stopped; annotation not saved");
        }
    }
}
