//! Incremental Update Engine
//!
//! This module re-evaluates the derived state of a [`Project`]'s node trees
//! after the host tagged changes. One pass:
//!
//! 1. Collects the dirty trees (or starts from one explicit root).
//! 2. Orders the reachable closure so group contents update before the
//!    trees embedding them.
//! 3. Rebuilds each dirty tree's structural caches and runs its behavior
//!    hooks, propagating change tags upward through group nodes.
//! 4. Clears the dirty flags and fires the caller's notification hooks,
//!    including the modifier-interface hook for trees evaluated by node
//!    modifiers.
//!
//! # Execution Model
//!
//! A pass is single-threaded and synchronous: it runs to completion on the
//! calling thread, with no suspension points and no cancellation. The only
//! concurrency control is the per-project re-entrancy flag: while a pass is
//! running, another invocation on the same project is silently dropped, not
//! queued. Callbacks must be written with that in mind — routing one into
//! [`update_project`] does nothing.
//!
//! A failed or partial pass needs no recovery protocol: dirty flags are
//! cleared only at the end, so whatever was not consumed is attempted again
//! by the next call.

mod params;
mod relations;
mod tags;
mod updater;

pub use params::{ModifierCallback, TreeCallback, UpdateCallbacks};

use crate::graph::{KindRegistry, Project, TreeId};

use updater::ProjectUpdater;

/// Restores the project's re-entrancy flag when the pass ends, including by
/// panic unwind out of a callback.
struct UpdateScope<'a> {
    project: &'a mut Project,
}

impl<'a> UpdateScope<'a> {
    fn enter(project: &'a mut Project) -> Self {
        project.update_in_progress = true;
        Self { project }
    }

    fn project(&mut self) -> &mut Project {
        self.project
    }
}

impl Drop for UpdateScope<'_> {
    fn drop(&mut self) {
        self.project.update_in_progress = false;
    }
}

/// Update every tree in the project with pending changes.
///
/// A no-op while another pass on this project is already in progress.
pub fn update_project(
    project: &mut Project,
    kinds: &KindRegistry,
    callbacks: &mut UpdateCallbacks<'_>,
) {
    if project.update_in_progress {
        return;
    }
    let mut scope = UpdateScope::enter(project);
    ProjectUpdater::new(scope.project(), kinds, callbacks).update();
}

/// Update starting from one explicit root tree, or from every dirty tree
/// when `root` is `None`.
///
/// A no-op while another pass on this project is already in progress.
pub fn update_project_rooted(
    project: &mut Project,
    root: Option<TreeId>,
    kinds: &KindRegistry,
    callbacks: &mut UpdateCallbacks<'_>,
) {
    let Some(root) = root else {
        update_project(project, kinds, callbacks);
        return;
    };

    if project.update_in_progress {
        return;
    }
    let mut scope = UpdateScope::enter(project);
    ProjectUpdater::new(scope.project(), kinds, callbacks).update_rooted(&[root]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeTree;

    #[test]
    fn nested_invocation_is_a_no_op() {
        let mut project = Project::new();
        let tree = project.add_tree(NodeTree::new("test", "t"));
        project.tree_mut(tree).tag_link_changed();

        // Simulate a pass already running on this project.
        project.update_in_progress = true;
        update_project(&mut project, &KindRegistry::new(), &mut UpdateCallbacks::none());
        assert!(
            !project.tree(tree).changed().is_empty(),
            "nested invocation must not consume change flags"
        );

        project.update_in_progress = false;
        update_project(&mut project, &KindRegistry::new(), &mut UpdateCallbacks::none());
        assert!(project.tree(tree).changed().is_empty());
    }

    #[test]
    fn flag_is_restored_after_a_pass() {
        let mut project = Project::new();
        let tree = project.add_tree(NodeTree::new("test", "t"));
        project.tree_mut(tree).tag_changed();

        update_project(&mut project, &KindRegistry::new(), &mut UpdateCallbacks::none());
        assert!(!project.update_in_progress());
    }

    #[test]
    fn rooted_with_no_root_updates_all_dirty_trees() {
        let mut project = Project::new();
        let a = project.add_tree(NodeTree::new("test", "a"));
        let b = project.add_tree(NodeTree::new("test", "b"));
        project.tree_mut(a).tag_link_changed();
        project.tree_mut(b).tag_link_changed();

        update_project_rooted(
            &mut project,
            None,
            &KindRegistry::new(),
            &mut UpdateCallbacks::none(),
        );

        assert!(project.tree(a).changed().is_empty());
        assert!(project.tree(b).changed().is_empty());
    }
}
