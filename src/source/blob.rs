//! Directory-backed blob store and the worker that reads pages from it.
//!
//! Blobs live at `<root>/<blob id>/data.bin`. Uploads copy the whole source
//! file; reads seek to the requested offset and read exactly the range.

use super::{BackendEvent, BlobStore};
use crate::model::{BlobError, SessionId};
use crate::store::{PageRequest, RangeLoader};
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

const BLOB_FILE: &str = "data.bin";

/// Blob store keeping each blob in its own directory under `root`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn blob_path(&self, blob: &SessionId) -> PathBuf {
        self.root.join(blob.as_str()).join(BLOB_FILE)
    }
}

impl BlobStore for LocalBlobStore {
    fn read_range(&self, blob: &SessionId, start: u64, end: u64) -> Result<Vec<u8>, BlobError> {
        let path = self.blob_path(blob);
        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BlobError::NotFound { blob: blob.clone() })
            }
            Err(e) => return Err(e.into()),
        };
        let size = file.metadata()?.len();
        if start > end || start >= size {
            return Err(BlobError::OutOfRange { start, end, size });
        }
        let end = end.min(size - 1);
        let mut bytes = vec![0u8; (end - start + 1) as usize];
        file.seek(SeekFrom::Start(start))?;
        file.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    fn upload(&self, blob: &SessionId, source: &Path) -> Result<u64, BlobError> {
        if !source.is_file() {
            return Err(BlobError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }
        let target = self.blob_path(blob);
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir)?;
        }
        let size = fs::copy(source, &target)?;
        debug!(blob = %blob, size, "Uploaded blob");
        Ok(size)
    }
}

/// [`RangeLoader`] that serves page requests on a dedicated worker thread.
///
/// Completions are sent as [`BackendEvent::PageLoaded`] /
/// [`BackendEvent::PageFailed`] tagged with the viewing session's id. The
/// worker exits when the loader is dropped or the event receiver goes away.
pub struct ThreadedRangeLoader {
    session: SessionId,
    requests: Sender<PageRequest>,
    events: Sender<BackendEvent>,
}

impl ThreadedRangeLoader {
    /// Spawn the worker.
    ///
    /// `blob` is the blob holding the bytes (differs from `session` for
    /// forks).
    pub fn spawn(
        blobs: Arc<dyn BlobStore>,
        blob: SessionId,
        session: SessionId,
        events: Sender<BackendEvent>,
    ) -> std::io::Result<Self> {
        let (requests, rx) = mpsc::channel::<PageRequest>();
        let worker_events = events.clone();
        let worker_session = session.clone();
        thread::Builder::new()
            .name(format!("hexplore-pages-{session}"))
            .spawn(move || {
                for request in rx {
                    let event = match blobs.read_range(&blob, request.start, request.end) {
                        Ok(bytes) => BackendEvent::PageLoaded {
                            session: worker_session.clone(),
                            page: request.page,
                            bytes,
                        },
                        Err(e) => {
                            warn!(page = request.page.get(), error = %e, "Page fetch failed");
                            BackendEvent::PageFailed {
                                session: worker_session.clone(),
                                page: request.page,
                                error: e.to_string(),
                            }
                        }
                    };
                    if worker_events.send(event).is_err() {
                        break;
                    }
                }
                debug!(session = %worker_session, "Range loader stopped");
            })?;
        Ok(Self {
            session,
            requests,
            events,
        })
    }
}

impl RangeLoader for ThreadedRangeLoader {
    fn fetch(&self, request: PageRequest) {
        if self.requests.send(request).is_err() {
            // Worker gone: fail the page so it doesn't stay in flight.
            let _ = self.events.send(BackendEvent::PageFailed {
                session: self.session.clone(),
                page: request.page,
                error: "range loader stopped".to_string(),
            });
        }
    }
}
