//! Storage backends and the events they report.
//!
//! This module provides the external collaborators of a viewing session:
//! - [`BlobStore`]: whole-object upload plus byte-range reads
//! - [`MetadataStore`]: session records, annotation maps and a change feed
//! - [`CommentWriter`]: fire-and-forget propagation of annotation edits
//!
//! Local, directory-backed implementations live in [`blob`] and [`metadata`];
//! worker-thread adapters turn blocking calls into [`BackendEvent`]s delivered
//! to the TUI event loop over an `mpsc` channel.

use crate::model::{
    AppError, BlobError, CommentsMap, MetadataError, SessionId, SessionRecord, UserId,
};
use crate::store::{PageIndex, RangeLoader};
use chrono::Utc;
use std::path::Path;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use tracing::info;

pub mod blob;
pub mod metadata;
pub mod writer;

pub use blob::{LocalBlobStore, ThreadedRangeLoader};
pub use metadata::LocalMetadataStore;
pub use writer::ThreadedCommentWriter;

/// Completion reported by a backend worker.
///
/// Every event names the session it belongs to; the event loop drops
/// events for sessions that are no longer open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// A page read finished.
    PageLoaded {
        session: SessionId,
        page: PageIndex,
        bytes: Vec<u8>,
    },
    /// A page read failed; the page may be requested again later.
    PageFailed {
        session: SessionId,
        page: PageIndex,
        error: String,
    },
    /// The annotation map was persisted.
    CommentsSaved { session: SessionId },
    /// Persisting the annotation map failed.
    CommentsSaveFailed { session: SessionId, error: String },
    /// Change feed push: the full current annotation map.
    CommentsChanged {
        session: SessionId,
        comments: CommentsMap,
    },
}

impl BackendEvent {
    pub fn session(&self) -> &SessionId {
        match self {
            Self::PageLoaded { session, .. }
            | Self::PageFailed { session, .. }
            | Self::CommentsSaved { session }
            | Self::CommentsSaveFailed { session, .. }
            | Self::CommentsChanged { session, .. } => session,
        }
    }
}

/// Object store addressed by blob id.
pub trait BlobStore: Send + Sync {
    /// Read the inclusive range `[start, end]`. `end` is clamped to the blob.
    fn read_range(&self, blob: &SessionId, start: u64, end: u64) -> Result<Vec<u8>, BlobError>;

    /// Store the contents of `source` as `blob`. Returns the size in bytes.
    fn upload(&self, blob: &SessionId, source: &Path) -> Result<u64, BlobError>;
}

/// Record store for session metadata.
pub trait MetadataStore: Send + Sync {
    fn get(&self, id: &SessionId) -> Result<SessionRecord, MetadataError>;

    /// Insert a new record; fails if the id is taken.
    fn insert(&self, record: &SessionRecord) -> Result<(), MetadataError>;

    /// Replace the whole annotation map. Owner only. Notifies subscribers.
    fn update_comments(
        &self,
        id: &SessionId,
        comments: &CommentsMap,
        user: &UserId,
    ) -> Result<(), MetadataError>;

    /// Change the display filename. Owner only.
    fn rename(
        &self,
        id: &SessionId,
        filename: &str,
        user: &UserId,
    ) -> Result<SessionRecord, MetadataError>;

    /// Records owned by `user`, newest first.
    fn list_by_owner(&self, user: &UserId) -> Result<Vec<SessionRecord>, MetadataError>;

    /// Deliver a [`BackendEvent::CommentsChanged`] to `events` on every
    /// annotation update of `id`.
    fn subscribe(&self, id: &SessionId, events: Sender<BackendEvent>);

    /// Drop every change-feed subscription to `id`.
    fn unsubscribe(&self, id: &SessionId);
}

/// Propagates a session's full annotation map; never blocks the caller.
pub trait CommentWriter: Send {
    fn write(&self, session: &SessionId, comments: CommentsMap);
}

/// Writer for sessions the viewer may not modify.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOnlyWriter;

impl CommentWriter for ReadOnlyWriter {
    fn write(&self, session: &SessionId, _comments: CommentsMap) {
        tracing::warn!(session = %session, "Dropping annotation write for read-only session");
    }
}

/// Writer that only records what it was given.
///
/// Stands in for a real backend when completions are driven by hand.
#[derive(Debug, Clone, Default)]
pub struct RecordingWriter {
    writes: Arc<Mutex<Vec<(SessionId, CommentsMap)>>>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write so far, oldest first.
    pub fn writes(&self) -> Vec<(SessionId, CommentsMap)> {
        self.writes
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// The most recently written map.
    pub fn last(&self) -> Option<CommentsMap> {
        self.writes().pop().map(|(_, comments)| comments)
    }
}

impl CommentWriter for RecordingWriter {
    fn write(&self, session: &SessionId, comments: CommentsMap) {
        if let Ok(mut guard) = self.writes.lock() {
            guard.push((session.clone(), comments));
        }
    }
}

/// Both stores plus the channel their workers report on.
#[derive(Clone)]
pub struct Backend {
    blobs: Arc<dyn BlobStore>,
    metadata: Arc<dyn MetadataStore>,
    events: Sender<BackendEvent>,
}

impl Backend {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        metadata: Arc<dyn MetadataStore>,
        events: Sender<BackendEvent>,
    ) -> Self {
        Self {
            blobs,
            metadata,
            events,
        }
    }

    /// Directory-backed backend rooted at `store_dir`.
    pub fn local(store_dir: &Path, events: Sender<BackendEvent>) -> Self {
        Self::new(
            Arc::new(LocalBlobStore::new(store_dir)),
            Arc::new(LocalMetadataStore::new(store_dir)),
            events,
        )
    }

    pub fn metadata(&self) -> &dyn MetadataStore {
        self.metadata.as_ref()
    }

    /// Upload a local file and create a session owned by `owner`.
    pub fn share_file(&self, path: &Path, owner: &UserId) -> Result<SessionRecord, AppError> {
        let id = SessionId::generate();
        let file_size = self.blobs.upload(&id, path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let record = SessionRecord {
            id,
            filename,
            file_size,
            comments: CommentsMap::new(),
            user_id: owner.clone(),
            forked_from: None,
            created_at: Utc::now(),
        };
        self.metadata.insert(&record)?;
        info!(session = %record.id, file_size, "Shared file");
        Ok(record)
    }

    pub fn open(&self, id: &SessionId) -> Result<SessionRecord, MetadataError> {
        let record = self.metadata.get(id)?;
        info!(session = %id, file_size = record.file_size, "Opened session");
        Ok(record)
    }

    /// Create a session owned by `owner` that shares `source`'s bytes and
    /// starts from `comments`.
    pub fn fork(
        &self,
        source: &SessionRecord,
        comments: CommentsMap,
        owner: &UserId,
    ) -> Result<SessionRecord, MetadataError> {
        let record = SessionRecord {
            id: SessionId::generate(),
            filename: source.filename.clone(),
            file_size: source.file_size,
            comments,
            user_id: owner.clone(),
            forked_from: Some(source.blob_id().clone()),
            created_at: Utc::now(),
        };
        self.metadata.insert(&record)?;
        info!(session = %record.id, source = %source.id, "Forked session");
        Ok(record)
    }

    pub fn rename(
        &self,
        id: &SessionId,
        filename: &str,
        user: &UserId,
    ) -> Result<SessionRecord, MetadataError> {
        self.metadata.rename(id, filename, user)
    }

    pub fn list(&self, owner: &UserId) -> Result<Vec<SessionRecord>, MetadataError> {
        self.metadata.list_by_owner(owner)
    }

    /// Start a range-loading worker for `record`'s blob.
    pub fn loader_for(&self, record: &SessionRecord) -> std::io::Result<Box<dyn RangeLoader>> {
        let loader = ThreadedRangeLoader::spawn(
            Arc::clone(&self.blobs),
            record.blob_id().clone(),
            record.id.clone(),
            self.events.clone(),
        )?;
        Ok(Box::new(loader))
    }

    /// Start an annotation writer acting as `user`, or a read-only writer
    /// when the viewer doesn't own `record`.
    pub fn writer_for(
        &self,
        record: &SessionRecord,
        user: Option<&UserId>,
    ) -> std::io::Result<Box<dyn CommentWriter>> {
        match user {
            Some(user) if record.is_owned_by(Some(user)) => {
                let writer = ThreadedCommentWriter::spawn(
                    Arc::clone(&self.metadata),
                    user.clone(),
                    self.events.clone(),
                )?;
                Ok(Box::new(writer))
            }
            _ => Ok(Box::new(ReadOnlyWriter)),
        }
    }

    /// Subscribe the event channel to `id`'s change feed.
    pub fn subscribe(&self, id: &SessionId) {
        self.metadata.subscribe(id, self.events.clone());
    }

    /// Stop delivering `id`'s change feed, e.g. once its session is closed.
    pub fn unsubscribe(&self, id: &SessionId) {
        self.metadata.unsubscribe(id);
    }
}
