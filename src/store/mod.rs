//! Paged byte access over a file that is never fully in memory.
//!
//! [`PagedByteStore`] tracks which fixed-size pages are resident or in
//! flight and answers reads against the partially populated address space.
//! Fetching is delegated to a [`RangeLoader`]; completions are fed back by
//! the caller.

pub mod geometry;
pub mod loader;
pub mod paged;

pub use geometry::{FileGeometry, InvalidGeometry, PageIndex, DEFAULT_PAGE_SIZE};
pub use loader::{PageRequest, RangeLoader, RecordingLoader};
pub use paged::PagedByteStore;
