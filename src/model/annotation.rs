//! Range-addressed annotation index.
//!
//! Annotations are free text (Markdown source, opaque here) attached to an
//! inclusive [`ByteRange`]. The index is an ordered map keyed by the range,
//! so listing is naturally sorted by `start` and point queries only visit
//! annotations that start at or before the queried offset.

use super::identifiers::ByteRange;
use std::collections::BTreeMap;
use tracing::warn;

/// Wire representation of the annotation set: `"{start}-{end}" -> text`.
///
/// This is the shape stored in the metadata record's `comments` field and
/// delivered by the change feed.
pub type CommentsMap = BTreeMap<String, String>;

/// One annotation as listed in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annotation<'a> {
    pub range: ByteRange,
    pub text: &'a str,
}

/// Mapping from inclusive byte ranges to annotation text.
///
/// # Overlaps
/// Overlapping ranges are allowed. When several annotations contain the same
/// offset, [`AnnotationIndex::find_containing`] returns the first one in
/// ascending `(start, end)` order, which is stable for a given set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationIndex {
    entries: BTreeMap<ByteRange, String>,
}

impl AnnotationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from the wire map, skipping keys that don't parse.
    pub fn from_comments(comments: &CommentsMap) -> Self {
        let mut index = Self::new();
        for (key, text) in comments {
            match key.parse::<ByteRange>() {
                Ok(range) => index.put(range, text.clone()),
                Err(e) => warn!(key = %key, error = %e, "Skipping malformed annotation key"),
            }
        }
        index
    }

    /// Convert back to the wire map.
    pub fn to_comments(&self) -> CommentsMap {
        self.entries
            .iter()
            .map(|(range, text)| (range.to_string(), text.clone()))
            .collect()
    }

    /// Insert or overwrite the annotation for exactly this range.
    pub fn put(&mut self, range: ByteRange, text: impl Into<String>) {
        self.entries.insert(range, text.into());
    }

    /// Remove the annotation with this key; returns its text if present.
    pub fn remove(&mut self, key: &ByteRange) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &ByteRange) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Annotation containing `offset`, first in ascending `(start, end)` order.
    pub fn find_containing(&self, offset: u64) -> Option<Annotation<'_>> {
        self.starting_at_or_before(offset)
            .find(|(range, _)| range.end() >= offset)
            .map(|(range, text)| Annotation {
                range: *range,
                text: text.as_str(),
            })
    }

    /// Check whether any annotation intersects `[row_start, row_end]`.
    pub fn row_has_annotation(&self, row_start: u64, row_end: u64) -> bool {
        self.starting_at_or_before(row_end)
            .any(|(range, _)| range.intersects(row_start, row_end))
    }

    /// Check whether `offset` is covered by any annotation.
    pub fn is_annotated(&self, offset: u64) -> bool {
        self.find_containing(offset).is_some()
    }

    /// All annotations sorted by `start` (then `end`).
    pub fn list_sorted_by_start(&self) -> Vec<Annotation<'_>> {
        self.iter().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = Annotation<'_>> {
        self.entries.iter().map(|(range, text)| Annotation {
            range: *range,
            text: text.as_str(),
        })
    }

    /// Position of `key` in the sorted listing.
    pub fn position(&self, key: &ByteRange) -> Option<usize> {
        self.entries.keys().position(|range| range == key)
    }

    /// Replace the whole set (change-feed snapshot).
    pub fn replace_with(&mut self, other: AnnotationIndex) {
        *self = other;
    }

    fn starting_at_or_before(&self, offset: u64) -> impl Iterator<Item = (&ByteRange, &String)> {
        let upper = ByteRange::normalized(offset, u64::MAX);
        self.entries.range(..=upper)
    }
}
