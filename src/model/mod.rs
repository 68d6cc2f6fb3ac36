//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod annotation;
pub mod error;
pub mod identifiers;
pub mod key_action;
pub mod numeric;
pub mod record;

// Re-export for convenience
pub use annotation::{Annotation, AnnotationIndex, CommentsMap};
pub use error::{AnnotationError, AppError, BlobError, LinkError, MetadataError, StoreError};
pub use identifiers::{
    ByteRange, InvalidByteRange, InvalidSessionId, InvalidUserId, SessionId, UserId,
    FRAGMENT_PREFIX,
};
pub use key_action::KeyAction;
pub use numeric::{interpret, Endianness, NumericValue, Signedness};
pub use record::SessionRecord;
