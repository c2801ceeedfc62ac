//! Dirty flags recording why a tree needs an update.
//!
//! A tree accumulates [`TreeChange`] bits between update passes. The update
//! engine reads them to decide which structural caches to rebuild, then
//! clears the whole set once the pass has consumed every consequence of the
//! recorded changes.

pub use enumset::EnumSet;
use enumset::EnumSetType;

/// One reason a tree is considered dirty.
///
/// Stored as an `EnumSet<TreeChange>` on the tree. The tag API in
/// [`crate::update`] is the only intended writer.
#[derive(EnumSetType, Debug, Hash)]
pub enum TreeChange {
    /// The tree's externally visible input/output signature changed.
    Interface,
    /// Links were added, removed, or muted.
    Link,
    /// One or more nodes changed in an unspecified way.
    Node,
    /// A socket changed.
    Socket,
    /// A node was removed from the tree.
    RemovedNode,
    /// Runtime-only data is missing and must be rebuilt.
    MissingRuntimeData,
    /// Anything might have changed; forces every node to update.
    Any,
}
