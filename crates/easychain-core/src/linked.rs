//! The capability shared by every chained entity.
//!
//! Messages, blocks and chains each derive a content hash and may carry a
//! back-reference to a predecessor's hash. They implement [`HashLinked`]
//! independently; no level is a subtype of another.

use crate::encoder::Encoder;
use crate::types::ContentHash;

/// Something with a derivable content hash and an optional previous link.
pub trait HashLinked {
    /// Recompute the content hash from current field values.
    fn content_hash(&self, encoder: &dyn Encoder) -> Option<ContentHash>;

    /// The predecessor hash captured at link time.
    fn previous_hash(&self) -> Option<ContentHash>;

    /// Whether this entity's back-reference matches `prev`'s current hash.
    fn links_to(&self, prev: &Self, encoder: &dyn Encoder) -> bool {
        self.previous_hash() == prev.content_hash(encoder)
    }
}
