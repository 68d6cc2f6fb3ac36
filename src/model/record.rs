//! Metadata record for a shared session.

use super::annotation::CommentsMap;
use super::identifiers::{SessionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-session metadata as kept by the metadata store.
///
/// `file_size` never changes after upload. `comments` is replaced wholesale
/// on every write. A fork shares the blob of `forked_from` but owns an
/// independent `comments` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub filename: String,
    pub file_size: u64,
    #[serde(default)]
    pub comments: CommentsMap,
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forked_from: Option<SessionId>,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Id of the session whose blob holds this session's bytes.
    pub fn blob_id(&self) -> &SessionId {
        self.forked_from.as_ref().unwrap_or(&self.id)
    }

    /// Check whether `viewer` may mutate this session.
    pub fn is_owned_by(&self, viewer: Option<&UserId>) -> bool {
        viewer.is_some_and(|viewer| *viewer == self.user_id)
    }
}
