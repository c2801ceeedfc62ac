//! Per-kind behavior hooks.
//!
//! Trees and nodes carry a `&'static str` kind key; the host registers a
//! behavior per key in a [`KindRegistry`] and hands the registry to the
//! update entry points. The engine consults behaviors at fixed points of a
//! per-tree update: node-level update and internal-link generation, then the
//! tree-level update and interface hooks.
//!
//! Every method has an empty default, and an unregistered kind is treated
//! the same way: "nothing to do" is the normal case, not a fault.

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::error::GraphError;
use super::id::NodeId;
use super::tree::{InternalLink, NodeTree};

/// Kind-specific reactions to a node changing.
pub trait NodeBehavior {
    /// Called for every changed node during a tree's update pass, before
    /// internal links are rebuilt. May restructure the node's sockets.
    fn update(&self, tree: &mut NodeTree, node: NodeId) {
        let _ = (tree, node);
    }

    /// Produce the node's pass-through links, used while the node is muted
    /// or disabled. The previous list has already been discarded when this
    /// runs.
    fn internal_links(&self, tree: &NodeTree, node: NodeId) -> SmallVec<[InternalLink; 2]> {
        let _ = (tree, node);
        SmallVec::new()
    }
}

/// Kind-specific reactions to a tree changing.
pub trait TreeBehavior {
    /// Called once per updated tree, after all node-level updates. The hook
    /// for tree-kind-specific invariants.
    fn update(&self, tree: &mut NodeTree) {
        let _ = tree;
    }

    /// Called when the tree's interface changed; rebuilds any caches
    /// derived from the interface signature.
    fn interface_update(&self, tree: &mut NodeTree) {
        let _ = tree;
    }
}

/// Maps kind keys to their behaviors.
#[derive(Default)]
pub struct KindRegistry {
    node_behaviors: IndexMap<&'static str, Box<dyn NodeBehavior>>,
    tree_behaviors: IndexMap<&'static str, Box<dyn TreeBehavior>>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the behavior for a node kind. Registering a key twice is a
    /// host misconfiguration and is reported rather than silently shadowed.
    pub fn register_node_kind(
        &mut self,
        kind: &'static str,
        behavior: Box<dyn NodeBehavior>,
    ) -> Result<(), GraphError> {
        if self.node_behaviors.contains_key(kind) {
            return Err(GraphError::KindAlreadyRegistered(kind));
        }
        self.node_behaviors.insert(kind, behavior);
        Ok(())
    }

    /// Register the behavior for a tree kind.
    pub fn register_tree_kind(
        &mut self,
        kind: &'static str,
        behavior: Box<dyn TreeBehavior>,
    ) -> Result<(), GraphError> {
        if self.tree_behaviors.contains_key(kind) {
            return Err(GraphError::KindAlreadyRegistered(kind));
        }
        self.tree_behaviors.insert(kind, behavior);
        Ok(())
    }

    /// The behavior for a node kind, if one is registered.
    pub fn node_behavior(&self, kind: &str) -> Option<&dyn NodeBehavior> {
        self.node_behaviors.get(kind).map(Box::as_ref)
    }

    /// The behavior for a tree kind, if one is registered.
    pub fn tree_behavior(&self, kind: &str) -> Option<&dyn TreeBehavior> {
        self.tree_behaviors.get(kind).map(Box::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;
    impl NodeBehavior for Noop {}
    impl TreeBehavior for Noop {}

    #[test]
    fn unregistered_kinds_have_no_behavior() {
        let registry = KindRegistry::new();
        assert!(registry.node_behavior("math").is_none());
        assert!(registry.tree_behavior("geometry").is_none());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = KindRegistry::new();
        registry.register_node_kind("math", Box::new(Noop)).unwrap();
        assert_eq!(
            registry.register_node_kind("math", Box::new(Noop)),
            Err(GraphError::KindAlreadyRegistered("math"))
        );
        assert!(registry.node_behavior("math").is_some());
    }

    #[test]
    fn node_and_tree_kinds_are_separate_namespaces() {
        let mut registry = KindRegistry::new();
        registry.register_node_kind("group", Box::new(Noop)).unwrap();
        registry.register_tree_kind("group", Box::new(Noop)).unwrap();
        assert!(registry.node_behavior("group").is_some());
        assert!(registry.tree_behavior("group").is_some());
    }
}
