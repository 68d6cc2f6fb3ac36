//! Directory-backed metadata store with an in-process change feed.
//!
//! Each record is `<root>/<session id>/meta.json`. Writes go through a
//! temporary file and a rename so readers never see a half-written record.

use super::{BackendEvent, MetadataStore};
use crate::model::{CommentsMap, MetadataError, SessionId, SessionRecord, UserId};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

const RECORD_FILE: &str = "meta.json";

/// Metadata store keeping one JSON record per session directory.
#[derive(Debug)]
pub struct LocalMetadataStore {
    root: PathBuf,
    subscribers: Mutex<HashMap<SessionId, Vec<Sender<BackendEvent>>>>,
}

impl LocalMetadataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            subscribers: Mutex::new(HashMap::new()),
        }
    }

    fn record_path(&self, id: &SessionId) -> PathBuf {
        self.root.join(id.as_str()).join(RECORD_FILE)
    }

    fn write_record(&self, record: &SessionRecord) -> Result<(), MetadataError> {
        let path = self.record_path(&record.id);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(record)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn owned_record(&self, id: &SessionId, user: &UserId) -> Result<SessionRecord, MetadataError> {
        let record = self.get(id)?;
        if !record.is_owned_by(Some(user)) {
            return Err(MetadataError::PermissionDenied {
                session: id.clone(),
                user: user.clone(),
            });
        }
        Ok(record)
    }

    fn notify(&self, id: &SessionId, comments: &CommentsMap) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(senders) = subscribers.get_mut(id) {
            senders.retain(|tx| {
                tx.send(BackendEvent::CommentsChanged {
                    session: id.clone(),
                    comments: comments.clone(),
                })
                .is_ok()
            });
            debug!(session = %id, subscribers = senders.len(), "Notified change feed");
        }
    }
}

impl MetadataStore for LocalMetadataStore {
    fn get(&self, id: &SessionId) -> Result<SessionRecord, MetadataError> {
        let raw = match fs::read(self.record_path(id)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MetadataError::NotFound(id.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&raw)?)
    }

    fn insert(&self, record: &SessionRecord) -> Result<(), MetadataError> {
        if self.record_path(&record.id).exists() {
            return Err(MetadataError::AlreadyExists(record.id.clone()));
        }
        self.write_record(record)
    }

    fn update_comments(
        &self,
        id: &SessionId,
        comments: &CommentsMap,
        user: &UserId,
    ) -> Result<(), MetadataError> {
        let mut record = self.owned_record(id, user)?;
        record.comments = comments.clone();
        self.write_record(&record)?;
        self.notify(id, comments);
        Ok(())
    }

    fn rename(
        &self,
        id: &SessionId,
        filename: &str,
        user: &UserId,
    ) -> Result<SessionRecord, MetadataError> {
        let mut record = self.owned_record(id, user)?;
        record.filename = filename.to_string();
        self.write_record(&record)?;
        Ok(record)
    }

    fn list_by_owner(&self, user: &UserId) -> Result<Vec<SessionRecord>, MetadataError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for entry in entries {
            let path = entry?.path().join(RECORD_FILE);
            if !path.is_file() {
                continue;
            }
            let parsed = fs::read(&path)
                .map_err(MetadataError::from)
                .and_then(|raw| Ok(serde_json::from_slice::<SessionRecord>(&raw)?));
            match parsed {
                Ok(record) if record.user_id == *user => records.push(record),
                Ok(_) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable record"),
            }
        }
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    fn subscribe(&self, id: &SessionId, events: Sender<BackendEvent>) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id.clone())
            .or_default()
            .push(events);
    }

    fn unsubscribe(&self, id: &SessionId) {
        let removed = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        if let Some(senders) = removed {
            debug!(session = %id, dropped = senders.len(), "Unsubscribed change feed");
        }
    }
}
