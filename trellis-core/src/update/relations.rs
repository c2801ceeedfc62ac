//! Derived relation indexes over the project.
//!
//! The orchestrator needs three reverse lookups the data model does not
//! store: the flat list of trees, "who embeds tree X as a group", and
//! "which (object, modifier) pairs evaluate tree X". [`TreeRelations`]
//! computes each on demand and memoizes it for the duration of one update
//! pass; a fresh instance is built per pass, so the indexes never outlive
//! the pass that made them.
//!
//! Lookups require the matching `ensure_*` to have run first. That is a
//! deliberate contract, not a convenience API: callers must establish index
//! availability explicitly, and a lookup without it panics.

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::graph::{ModifierKind, NodeId, ObjectId, Project, TreeId};

/// A (tree, node) pair embedding some other tree as a group.
pub(crate) type GroupNodeUser = (TreeId, NodeId);

/// An (object, modifier-index) pair evaluating some tree.
pub(crate) type ModifierUser = (ObjectId, usize);

/// Lazily built, per-pass reverse indexes over a [`Project`].
#[derive(Default)]
pub(crate) struct TreeRelations {
    all_trees: Option<Vec<TreeId>>,
    group_node_users: Option<IndexMap<TreeId, SmallVec<[GroupNodeUser; 4]>>>,
    modifier_users: Option<IndexMap<TreeId, SmallVec<[ModifierUser; 2]>>>,
}

impl TreeRelations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the flat list of every live tree. Idempotent.
    pub fn ensure_all_trees(&mut self, project: &Project) {
        if self.all_trees.is_some() {
            return;
        }
        self.all_trees = Some(project.trees().map(|(id, _)| id).collect());
    }

    /// Build the group-embedding reverse index. Idempotent.
    pub fn ensure_group_node_users(&mut self, project: &Project) {
        if self.group_node_users.is_some() {
            return;
        }
        self.ensure_all_trees(project);

        let mut index: IndexMap<TreeId, SmallVec<[GroupNodeUser; 4]>> = IndexMap::new();
        for &tree_id in self.all_trees.as_ref().expect("ensured above") {
            for (node_id, node) in project.tree(tree_id).nodes() {
                if let Some(group) = node.group_tree() {
                    index.entry(group).or_default().push((tree_id, node_id));
                }
            }
        }
        self.group_node_users = Some(index);
    }

    /// Build the modifier-user reverse index over node-based modifiers.
    /// Idempotent.
    pub fn ensure_modifier_users(&mut self, project: &Project) {
        if self.modifier_users.is_some() {
            return;
        }

        let mut index: IndexMap<TreeId, SmallVec<[ModifierUser; 2]>> = IndexMap::new();
        for (object_id, object) in project.objects() {
            for (modifier_index, modifier) in object.modifiers().iter().enumerate() {
                if modifier.kind() != ModifierKind::Nodes {
                    continue;
                }
                if let Some(tree) = modifier.tree() {
                    index.entry(tree).or_default().push((object_id, modifier_index));
                }
            }
        }
        self.modifier_users = Some(index);
    }

    /// Every live tree. Panics unless [`Self::ensure_all_trees`] ran.
    pub fn all_trees(&self) -> &[TreeId] {
        self.all_trees
            .as_deref()
            .expect("ensure_all_trees() must run before all_trees()")
    }

    /// The (tree, node) pairs embedding `tree` as a group. Panics unless
    /// [`Self::ensure_group_node_users`] ran.
    pub fn group_node_users(&self, tree: TreeId) -> &[GroupNodeUser] {
        let index = self
            .group_node_users
            .as_ref()
            .expect("ensure_group_node_users() must run before group_node_users()");
        index.get(&tree).map_or(&[][..], SmallVec::as_slice)
    }

    /// The (object, modifier) pairs evaluating `tree`. Panics unless
    /// [`Self::ensure_modifier_users`] ran.
    pub fn modifier_users(&self, tree: TreeId) -> &[ModifierUser] {
        let index = self
            .modifier_users
            .as_ref()
            .expect("ensure_modifier_users() must run before modifier_users()");
        index.get(&tree).map_or(&[][..], SmallVec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Modifier, Node, NodeTree, Object};

    #[test]
    fn empty_project_yields_empty_indexes() {
        let project = Project::new();
        let mut relations = TreeRelations::new();
        relations.ensure_all_trees(&project);
        relations.ensure_group_node_users(&project);
        relations.ensure_modifier_users(&project);

        assert!(relations.all_trees().is_empty());
    }

    #[test]
    fn group_node_users_maps_group_to_embedding_pairs() {
        let mut project = Project::new();
        let group = project.add_tree(NodeTree::new("geometry", "group"));
        let outer = project.add_tree(NodeTree::new("geometry", "outer"));
        let group_node = project
            .tree_mut(outer)
            .add_node(Node::group("group", "embed", group));
        project.tree_mut(outer).add_node(Node::new("math", "plain"));

        let mut relations = TreeRelations::new();
        relations.ensure_group_node_users(&project);

        assert_eq!(relations.group_node_users(group), &[(outer, group_node)]);
        assert!(relations.group_node_users(outer).is_empty());
    }

    #[test]
    fn modifier_users_skip_non_node_modifiers() {
        let mut project = Project::new();
        let tree = project.add_tree(NodeTree::new("geometry", "g"));

        let mut object = Object::new("cube");
        object.add_modifier(Modifier::other("subdivide"));
        let index = object.add_modifier(Modifier::nodes("scatter", Some(tree)));
        object.add_modifier(Modifier::nodes("unassigned", None));
        let object_id = project.add_object(object);

        let mut relations = TreeRelations::new();
        relations.ensure_modifier_users(&project);

        assert_eq!(relations.modifier_users(tree), &[(object_id, index)]);
    }

    #[test]
    fn ensure_calls_are_idempotent() {
        let mut project = Project::new();
        project.add_tree(NodeTree::new("k", "a"));

        let mut relations = TreeRelations::new();
        relations.ensure_all_trees(&project);
        // A tree added after the first ensure is not picked up; the index is
        // memoized for the pass.
        project.add_tree(NodeTree::new("k", "b"));
        relations.ensure_all_trees(&project);

        assert_eq!(relations.all_trees().len(), 1);
    }

    #[test]
    #[should_panic(expected = "ensure_group_node_users() must run before")]
    fn lookup_before_ensure_panics() {
        let relations = TreeRelations::new();
        relations.group_node_users(TreeId::from_index(0));
    }
}
