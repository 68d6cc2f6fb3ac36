//! Error types for hexplore.
//!
//! This module defines a hierarchical error taxonomy using `thiserror` for structured error
//! handling. Errors compose via `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level application error wrapping all domain-specific failures
//!   - [`MetadataError`] - Session record lookup/update failures (not found, not owner, IO)
//!   - [`BlobError`] - Blob store upload and range-read failures
//!   - [`LinkError`] - Deep-link fragments that cannot be resolved
//!   - `std::io::Error` - Terminal/TUI rendering failures
//! - [`StoreError`] - Page payloads the byte store refuses to accept
//! - [`AnnotationError`] - Local annotation edits that are not allowed
//!
//! # Error Recovery Strategy
//!
//! Nothing in the paged byte store or the viewport is fatal. Page fetch failures return the
//! page to the "not loaded" state and are retried on the next viewport event; annotation
//! write failures are shown in the status bar while the optimistic local edit stays applied.
//! Only a missing session (or a broken terminal) stops the application, and that happens
//! before the first frame is drawn.

use super::identifiers::{InvalidByteRange, SessionId, UserId};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error encompassing all failure modes.
///
/// Returned from `main`-level orchestration. Domain errors convert via `From`.
///
/// # Recovery Behavior
///
/// - **Metadata/Blob**: Fatal at startup (nothing to show), recoverable afterwards
///   (e.g. a failed fork leaves the current session open)
/// - **Terminal**: Fatal - restore the terminal and exit
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to read or write a session's metadata record.
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// Failed to upload or read the session's bytes.
    #[error("Blob store error: {0}")]
    Blob(#[from] BlobError),

    /// A deep-link fragment could not be resolved against the session.
    #[error("Invalid link: {0}")]
    Link(#[from] LinkError),

    /// Command line arguments that parse but make no sense together.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Terminal or TUI rendering error.
    ///
    /// This indicates failures in the crossterm/ratatui layer. Without a working terminal
    /// the TUI cannot function.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Errors from the metadata record store.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// No record exists for the requested session id.
    ///
    /// Surfaced as a blocking error: the viewer never renders a degraded view of a
    /// nonexistent session.
    ///
    /// # Examples
    ///
    /// ```
    /// use hexplore::model::{MetadataError, SessionId};
    ///
    /// let err = MetadataError::NotFound(SessionId::new("abc").unwrap());
    /// assert_eq!(err.to_string(), "Session not found: abc");
    /// ```
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    /// The requester is not the owner of the session.
    #[error("User {user} may not modify session {session}")]
    PermissionDenied {
        /// Session the mutation targeted.
        session: SessionId,
        /// User who attempted the mutation.
        user: UserId,
    },

    /// A session with this id already exists.
    #[error("Session already exists: {0}")]
    AlreadyExists(SessionId),

    /// Reading or writing the record file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored record is not valid JSON for a session record.
    #[error("Corrupt metadata record: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors from the blob store.
#[derive(Debug, Error)]
pub enum BlobError {
    /// The blob has never been uploaded.
    #[error("Blob not found: {blob}")]
    NotFound {
        /// Id of the missing blob.
        blob: SessionId,
    },

    /// The source file for an upload does not exist.
    #[error("File not found: {path}")]
    SourceNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// The requested range starts past the end of the blob.
    #[error("Range {start}-{end} is outside blob of {size} bytes")]
    OutOfRange {
        /// Requested first byte.
        start: u64,
        /// Requested last byte (inclusive).
        end: u64,
        /// Blob size in bytes.
        size: u64,
    },

    /// Generic I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A page payload rejected by the byte store.
///
/// Rejected payloads are treated exactly like fetch failures: the page leaves the in-flight
/// set and stays unloaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Page index beyond the session's page count.
    #[error("Page {page} is outside the file ({page_count} pages)")]
    PageOutOfRange { page: u64, page_count: u64 },

    /// Payload length differs from the page span.
    #[error("Page {page} payload has {actual} bytes, expected {expected}")]
    LengthMismatch {
        page: u64,
        expected: u64,
        actual: u64,
    },
}

/// Local annotation edits that are refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    /// Only the owner may add, change or delete annotations.
    #[error("This session is read-only (owned by someone else)")]
    ReadOnly,

    /// Adding an annotation needs an active selection.
    #[error("Select some bytes first")]
    NoSelection,

    /// Blank annotations are not stored.
    #[error("Annotation text is empty")]
    EmptyText,

    /// Deleting an annotation that isn't there.
    #[error("No annotation at {0}")]
    Missing(String),
}

/// Deep-link fragments that cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// Fragment isn't `comment-{start}-{end}`.
    #[error(transparent)]
    Malformed(#[from] InvalidByteRange),

    /// Fragment points past the end of the file.
    #[error("Offset {offset} is beyond the end of the file ({total_size} bytes)")]
    OutOfRange { offset: u64, total_size: u64 },
}
