//! The update pass itself.
//!
//! [`ProjectUpdater`] drives one pass over a [`Project`]: it picks the dirty
//! root trees, orders the reachable closure so group contents update before
//! the trees embedding them, rebuilds each dirty tree's structural caches,
//! propagates change tags upward through group nodes, and finally clears
//! flags and fires the caller's notification hooks.
//!
//! # Ordering
//!
//! A tree's interface is visible to every tree that embeds it as a group, so
//! interface and output changes must be computed before the embedding tree
//! updates. The order is a depth-first topological sort over the "used as a
//! group inside" relation with a three-state mark per tree. Dependency
//! cycles between groups are a host data bug: the sort tolerates them
//! (terminates, emits each tree exactly once, skips the cycle-closing edge)
//! and reports them with a warning instead of failing.
//!
//! # Conservatism
//!
//! Every processed tree reports `interface_changed` and `output_changed`
//! unconditionally. Fine-grained output diffing does not exist in this
//! design; removing the conservatism would require cheap output-equality
//! detection first. The single-root fast path below is therefore currently
//! unreachable and documents intended future behavior.

use enumset::EnumSet;
use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::graph::{InternalLink, KindRegistry, NodeId, NodeTree, Project, TreeChange, TreeId};

use super::params::UpdateCallbacks;
use super::relations::{GroupNodeUser, TreeRelations};

/// What one per-tree update changed, as far as the rest of the pass is
/// concerned. Ephemeral; never outlives the pass.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TreeUpdateResult {
    pub interface_changed: bool,
    pub output_changed: bool,
}

/// Mark state for the dependency-order sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToposortMark {
    None,
    Temporary,
    Permanent,
}

/// Drives one update pass. Constructed fresh per pass by the entry points in
/// [`crate::update`]; the relation indexes it builds die with it.
pub(crate) struct ProjectUpdater<'a, 'cb> {
    project: &'a mut Project,
    kinds: &'a KindRegistry,
    callbacks: &'a mut UpdateCallbacks<'cb>,
    results: IndexMap<TreeId, TreeUpdateResult>,
    relations: TreeRelations,
}

impl<'a, 'cb> ProjectUpdater<'a, 'cb> {
    pub fn new(
        project: &'a mut Project,
        kinds: &'a KindRegistry,
        callbacks: &'a mut UpdateCallbacks<'cb>,
    ) -> Self {
        Self {
            project,
            kinds,
            callbacks,
            results: IndexMap::new(),
            relations: TreeRelations::new(),
        }
    }

    /// Update every tree with pending changes.
    pub fn update(&mut self) {
        let roots: Vec<TreeId> = self
            .project
            .trees()
            .filter(|(_, tree)| !tree.changed.is_empty())
            .map(|(id, _)| id)
            .collect();
        self.update_rooted(&roots);
    }

    /// Update starting from an explicit root set.
    pub fn update_rooted(&mut self, roots: &[TreeId]) {
        if roots.is_empty() {
            return;
        }
        debug!(roots = roots.len(), "node tree update pass");

        let mut single_tree_update = false;

        if let &[root] = roots {
            let result = self.update_tree(root);
            self.results.insert(root, result);
            if !result.interface_changed && !result.output_changed {
                // Nothing externally visible changed, so nothing can have
                // rippled into other trees.
                single_tree_update = true;
            }
        }

        if !single_tree_update {
            let order = self.tree_update_order(roots);
            trace!(trees = order.len(), "propagating in dependency order");
            for tree_id in order {
                if self.project.tree(tree_id).changed.is_empty() {
                    continue;
                }
                if !self.results.contains_key(&tree_id) {
                    let result = self.update_tree(tree_id);
                    self.results.insert(tree_id, result);
                }
                let result = self.results[&tree_id];
                if result.output_changed || result.interface_changed {
                    // Ripple upward: every group node embedding this tree
                    // now needs a node-level update of its own.
                    let users: SmallVec<[GroupNodeUser; 4]> =
                        SmallVec::from_slice(self.relations.group_node_users(tree_id));
                    for (user_tree, user_node) in users {
                        self.project.tree_mut(user_tree).tag_node_changed(user_node);
                    }
                }
            }
        }

        self.finish_pass();
    }

    /// Clear flags and notify, for every tree this pass updated.
    fn finish_pass(&mut self) {
        let items: Vec<(TreeId, TreeUpdateResult)> = self
            .results
            .iter()
            .map(|(&tree_id, &result)| (tree_id, result))
            .collect();

        for (tree_id, result) in items {
            // The pass has consumed every consequence of the recorded
            // changes; only now may the flags go away.
            self.project.tree_mut(tree_id).changed = EnumSet::empty();

            if result.interface_changed {
                self.relations.ensure_modifier_users(self.project);
                for &(object, modifier) in self.relations.modifier_users(tree_id) {
                    if let Some(hook) = self.callbacks.modifier_interface_changed.as_mut() {
                        hook(object, modifier);
                    }
                }
            }

            if let Some(hook) = self.callbacks.tree_changed.as_mut() {
                hook(tree_id, self.project.tree(tree_id));
            }
            if result.interface_changed {
                if let Some(hook) = self.callbacks.tree_interface_changed.as_mut() {
                    hook(tree_id, self.project.tree(tree_id));
                }
            }
            if result.output_changed {
                if let Some(hook) = self.callbacks.tree_output_changed.as_mut() {
                    hook(tree_id, self.project.tree(tree_id));
                }
            }
        }
    }

    // --- ordering ---

    /// All trees whose state can be affected by a change in any root:
    /// breadth-first closure over the "used as a group inside" relation.
    fn trees_to_update(&mut self, roots: &[TreeId]) -> IndexSet<TreeId> {
        self.relations.ensure_group_node_users(self.project);

        let mut reachable = IndexSet::new();
        let mut to_check: Vec<TreeId> = roots.to_vec();
        while let Some(tree) = to_check.pop() {
            if reachable.insert(tree) {
                for &(user_tree, _) in self.relations.group_node_users(tree) {
                    to_check.push(user_tree);
                }
            }
        }
        reachable
    }

    /// The reachable closure of `roots` in dependency order: every tree
    /// appears after the trees it embeds as groups.
    fn tree_update_order(&mut self, roots: &[TreeId]) -> Vec<TreeId> {
        self.relations.ensure_all_trees(self.project);
        self.relations.ensure_group_node_users(self.project);

        let trees_to_update = self.trees_to_update(roots);

        let mut marks: IndexMap<TreeId, ToposortMark> = trees_to_update
            .iter()
            .map(|&tree| (tree, ToposortMark::None))
            .collect();
        let mut order = Vec::with_capacity(marks.len());

        for &tree in &trees_to_update {
            if marks[&tree] == ToposortMark::None {
                let acyclic = Self::visit_users(&self.relations, tree, &mut marks, &mut order);
                if !acyclic {
                    // Host data bug, tolerated: the order stays a
                    // permutation of the closure with the cycle-closing
                    // edge dropped.
                    warn!(
                        tree = tree.raw(),
                        "dependency cycle between node tree groups; update order is best-effort"
                    );
                }
            }
        }

        // The visit emits each tree after its users, which is reverse
        // dependency order.
        order.reverse();
        order
    }

    /// Depth-first visit emitting `tree` after everything that embeds it;
    /// the caller reverses the sequence into dependency order. Returns false
    /// if a cycle was found; the cycle-closing edge is skipped and the order
    /// stays a permutation of the closure.
    fn visit_users(
        relations: &TreeRelations,
        tree: TreeId,
        marks: &mut IndexMap<TreeId, ToposortMark>,
        order: &mut Vec<TreeId>,
    ) -> bool {
        match marks[&tree] {
            ToposortMark::Permanent => return true,
            ToposortMark::Temporary => return false,
            ToposortMark::None => {}
        }
        marks[&tree] = ToposortMark::Temporary;

        let mut acyclic = true;
        for &(user_tree, _) in relations.group_node_users(tree) {
            // The closure is closed under this relation, so the user is
            // always present in `marks`.
            acyclic &= Self::visit_users(relations, user_tree, marks, order);
        }
        order.push(tree);

        marks[&tree] = ToposortMark::Permanent;
        acyclic
    }

    // --- per-tree update ---

    /// Rebuild one tree's structural caches and run its behavior hooks.
    fn update_tree(&mut self, tree_id: TreeId) -> TreeUpdateResult {
        trace!(tree = tree_id.raw(), "updating tree");
        let mut result = TreeUpdateResult::default();

        let kinds = self.kinds;
        let tree = self.project.tree_mut(tree_id);

        if tree.changed.contains(TreeChange::Interface) {
            result.interface_changed = true;
        }

        if tree.changed.contains(TreeChange::Link) {
            Self::update_input_socket_link_pointers(tree);
        }
        Self::update_individual_nodes(kinds, tree);

        if let Some(behavior) = kinds.tree_behavior(tree.kind()) {
            behavior.update(tree);
        }

        // Conservative by design: without output-equality detection every
        // processed tree counts as fully changed.
        result.interface_changed = true;
        result.output_changed = true;

        if result.interface_changed {
            if let Some(behavior) = kinds.tree_behavior(tree.kind()) {
                behavior.interface_update(tree);
            }
        }

        result
    }

    /// Recompute every input socket's back-reference to its incoming link
    /// from the current link list, then the "in use" flags. Sockets are
    /// single-input in this data model; if the host left several links on
    /// one input, the last one in link order wins.
    fn update_input_socket_link_pointers(tree: &mut NodeTree) {
        for node in tree.nodes.iter_mut().flatten() {
            for socket in &mut node.inputs {
                socket.incoming = None;
            }
        }

        let targets: Vec<_> = tree.links().map(|(link_id, link)| (link_id, link.to())).collect();
        for (link_id, to) in targets {
            tree.socket_mut(to).incoming = Some(link_id);
        }

        Self::update_socket_used_tags(tree);
    }

    /// Recompute every socket's "in use" flag: the source of every link is
    /// in use, the target only when the link is not muted.
    fn update_socket_used_tags(tree: &mut NodeTree) {
        for node in tree.nodes.iter_mut().flatten() {
            for socket in node.inputs.iter_mut().chain(node.outputs.iter_mut()) {
                socket.in_use = false;
            }
        }

        let mut used = Vec::new();
        for (_, link) in tree.links() {
            used.push(link.from());
            if !link.muted() {
                used.push(link.to());
            }
        }
        for socket in used {
            tree.socket_mut(socket).in_use = true;
        }
    }

    /// Run the node-level hooks for every changed node, or for every node
    /// when the whole tree is tagged [`TreeChange::Any`].
    fn update_individual_nodes(kinds: &KindRegistry, tree: &mut NodeTree) {
        let tree_wide = tree.changed.contains(TreeChange::Any);
        let to_update: Vec<NodeId> = tree
            .nodes()
            .filter(|(_, node)| tree_wide || node.changed)
            .map(|(node_id, _)| node_id)
            .collect();
        for node_id in to_update {
            Self::update_individual_node(kinds, tree, node_id);
        }
    }

    /// Run one node's kind hook, then rebuild its internal links.
    fn update_individual_node(kinds: &KindRegistry, tree: &mut NodeTree, node_id: NodeId) {
        let kind = tree.node(node_id).kind();
        match kinds.node_behavior(kind) {
            Some(behavior) => {
                behavior.update(tree, node_id);
                let links: SmallVec<[InternalLink; 2]> = behavior.internal_links(tree, node_id);
                tree.node_mut(node_id).internal_links = links;
            }
            None => tree.node_mut(node_id).internal_links.clear(),
        }
    }
}
