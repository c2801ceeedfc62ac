//! Caller-supplied notification hooks for an update pass.

use crate::graph::{NodeTree, ObjectId, TreeId};

/// Notification about one updated tree.
pub type TreeCallback<'a> = Box<dyn FnMut(TreeId, &NodeTree) + 'a>;

/// Notification that a modifier's evaluated tree changed its interface.
/// Receives the object handle and the modifier's index in its stack.
pub type ModifierCallback<'a> = Box<dyn FnMut(ObjectId, usize) + 'a>;

/// Optional hooks fired at the end of an update pass, once per updated tree.
///
/// All hooks default to absent. They run while the pass still holds the
/// project, so they observe the updated trees but cannot re-enter the update
/// entry points; a host that routes them into another update call gets a
/// silent no-op from the re-entrancy guard, not a nested pass.
#[derive(Default)]
pub struct UpdateCallbacks<'a> {
    /// Fired for every tree the pass updated.
    pub tree_changed: Option<TreeCallback<'a>>,
    /// Fired when the updated tree's interface changed.
    pub tree_interface_changed: Option<TreeCallback<'a>>,
    /// Fired when the updated tree's output changed.
    pub tree_output_changed: Option<TreeCallback<'a>>,
    /// Fired once per (object, modifier) pair whose evaluated tree changed
    /// its interface this pass.
    pub modifier_interface_changed: Option<ModifierCallback<'a>>,
}

impl<'a> UpdateCallbacks<'a> {
    /// No hooks at all.
    pub fn none() -> Self {
        Self::default()
    }
}
