//! Core identifier newtypes with smart constructors.
//!
//! Raw constructors are never exported - use smart constructors only.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier of a shared session (one uploaded blob plus its metadata record).
///
/// Session ids double as directory names in the local store, so path
/// separators, `#` (fragment delimiter) and `..` are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Smart constructor: validates a non-empty, path-safe id.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidSessionId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidSessionId::Empty);
        }
        if raw == "." || raw == ".." || raw.contains(['/', '\\', '#']) {
            return Err(InvalidSessionId::Unsafe(raw));
        }
        Ok(Self(raw))
    }

    /// Fresh id from the current time, process id and a process-wide counter.
    ///
    /// Only lowercase hex digits, so always path-safe.
    pub fn generate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let micros = Utc::now().timestamp_micros().unsigned_abs();
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("{micros:x}{:x}{seq:x}", std::process::id()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SessionId {
    type Error = InvalidSessionId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

/// Identity of the person viewing or owning a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Smart constructor: validates non-empty user ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidUserId> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            Err(InvalidUserId::Empty)
        } else {
            Ok(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = InvalidUserId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// Prefix of deep-link fragments addressing an annotation range.
pub const FRAGMENT_PREFIX: &str = "comment-";

/// Inclusive byte range `[start, end]`.
///
/// Doubles as the annotation key: its `Display` form `"{start}-{end}"` is the
/// key used in the metadata record's comments map. Ordering is by `start`,
/// then `end`.
///
/// # Invariants
/// - `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ByteRange {
    start: u64,
    end: u64,
}

impl ByteRange {
    /// Smart constructor: rejects `start > end`.
    pub fn new(start: u64, end: u64) -> Result<Self, InvalidByteRange> {
        if start > end {
            Err(InvalidByteRange::Reversed { start, end })
        } else {
            Ok(Self { start, end })
        }
    }

    /// Build a range from two endpoints in either order.
    pub fn normalized(a: u64, b: u64) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Single-byte range.
    pub fn single(offset: u64) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of bytes covered (always >= 1). Saturates for `0-u64::MAX`.
    pub fn len(&self) -> u64 {
        (self.end - self.start).saturating_add(1)
    }

    /// Check whether `offset` lies inside the range (inclusive).
    pub fn contains(&self, offset: u64) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Check whether the range intersects `[start, end]`.
    pub fn intersects(&self, start: u64, end: u64) -> bool {
        self.start <= end && self.end >= start
    }

    /// Deep-link fragment: `comment-{start}-{end}`.
    pub fn to_fragment(&self) -> String {
        format!("{FRAGMENT_PREFIX}{self}")
    }

    /// Parse a deep-link fragment, with or without a leading `#`.
    pub fn from_fragment(fragment: &str) -> Result<Self, InvalidByteRange> {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        let key = fragment
            .strip_prefix(FRAGMENT_PREFIX)
            .ok_or_else(|| InvalidByteRange::Malformed(fragment.to_string()))?;
        key.parse()
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for ByteRange {
    type Err = InvalidByteRange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InvalidByteRange::Malformed(s.to_string());
        let (start, end) = s.split_once('-').ok_or_else(malformed)?;
        let start = start.parse::<u64>().map_err(|_| malformed())?;
        let end = end.parse::<u64>().map_err(|_| malformed())?;
        Self::new(start, end)
    }
}

// ===== Error Types =====

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSessionId {
    #[error("Session ID cannot be empty")]
    Empty,
    #[error("Session ID {0:?} is not path-safe")]
    Unsafe(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidUserId {
    #[error("User ID cannot be empty")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidByteRange {
    #[error("Byte range start {start} is after end {end}")]
    Reversed { start: u64, end: u64 },
    #[error("Malformed byte range {0:?}, expected \"start-end\"")]
    Malformed(String),
}

// ===== Tests =====
