//! The project-wide collection the update engine runs over.
//!
//! A [`Project`] owns every node tree plus the objects whose modifiers
//! evaluate trees. It is the unit the orchestrator operates on: an update
//! pass scans all trees for pending changes, and the relation index in
//! [`crate::update`] is rebuilt from this collection on every pass.

use super::id::{ObjectId, TreeId};
use super::tree::NodeTree;

/// What kind of modifier an object carries.
///
/// Only [`ModifierKind::Nodes`] modifiers evaluate a node tree and take part
/// in interface-change notification; everything else is opaque to this
/// crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKind {
    /// A node-based modifier evaluating a tree from the project.
    Nodes,
    /// Any other modifier kind.
    Other,
}

/// One entry in an object's modifier stack.
#[derive(Debug, Clone)]
pub struct Modifier {
    name: String,
    kind: ModifierKind,
    tree: Option<TreeId>,
}

impl Modifier {
    /// Create a node-based modifier evaluating the given tree.
    pub fn nodes(name: impl Into<String>, tree: Option<TreeId>) -> Self {
        Self {
            name: name.into(),
            kind: ModifierKind::Nodes,
            tree,
        }
    }

    /// Create a modifier of a kind this crate does not interpret.
    pub fn other(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ModifierKind::Other,
            tree: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ModifierKind {
        self.kind
    }

    /// The tree a node-based modifier evaluates. `None` for other kinds or
    /// for a node modifier with no tree assigned yet.
    pub fn tree(&self) -> Option<TreeId> {
        self.tree
    }

    /// Point a node-based modifier at a different tree.
    pub fn set_tree(&mut self, tree: Option<TreeId>) {
        self.tree = tree;
    }
}

/// An object carrying a modifier stack.
#[derive(Debug, Clone)]
pub struct Object {
    name: String,
    modifiers: Vec<Modifier>,
}

impl Object {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a modifier, returning its index in the stack.
    pub fn add_modifier(&mut self, modifier: Modifier) -> usize {
        self.modifiers.push(modifier);
        self.modifiers.len() - 1
    }

    /// The modifier stack, in evaluation order.
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub fn modifier_mut(&mut self, index: usize) -> &mut Modifier {
        &mut self.modifiers[index]
    }
}

/// Every node tree and object in the application, plus the per-collection
/// re-entrancy flag guarding update passes.
#[derive(Debug, Default)]
pub struct Project {
    trees: Vec<Option<NodeTree>>,
    objects: Vec<Object>,
    /// True only for the duration of one top-level update pass. Entry
    /// points check it and turn nested invocations into no-ops.
    pub(crate) update_in_progress: bool,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tree, returning its handle.
    pub fn add_tree(&mut self, tree: NodeTree) -> TreeId {
        let id = TreeId::from_index(self.trees.len());
        self.trees.push(Some(tree));
        id
    }

    /// Remove a tree. Its slot is tombstoned; the handle must not be used
    /// again. Group nodes and modifiers still referencing it simply stop
    /// contributing relations.
    pub fn remove_tree(&mut self, tree: TreeId) {
        debug_assert!(
            self.trees.get(tree.index()).is_some_and(Option::is_some),
            "remove_tree on a stale TreeId"
        );
        self.trees[tree.index()] = None;
    }

    /// Look up a tree. Panics on a stale handle.
    pub fn tree(&self, tree: TreeId) -> &NodeTree {
        self.trees[tree.index()].as_ref().expect("stale TreeId")
    }

    /// Look up a tree mutably. Panics on a stale handle.
    pub fn tree_mut(&mut self, tree: TreeId) -> &mut NodeTree {
        self.trees[tree.index()].as_mut().expect("stale TreeId")
    }

    /// Whether the handle still names a live tree.
    pub fn contains_tree(&self, tree: TreeId) -> bool {
        self.trees.get(tree.index()).is_some_and(Option::is_some)
    }

    /// Iterate the live trees, in insertion order.
    pub fn trees(&self) -> impl Iterator<Item = (TreeId, &NodeTree)> {
        self.trees
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| Some((TreeId::from_index(index), slot.as_ref()?)))
    }

    /// Number of live trees.
    pub fn tree_count(&self) -> usize {
        self.trees.iter().flatten().count()
    }

    /// Insert an object, returning its handle.
    pub fn add_object(&mut self, object: Object) -> ObjectId {
        let id = ObjectId::from_index(self.objects.len());
        self.objects.push(object);
        id
    }

    /// Look up an object.
    pub fn object(&self, object: ObjectId) -> &Object {
        &self.objects[object.index()]
    }

    pub fn object_mut(&mut self, object: ObjectId) -> &mut Object {
        &mut self.objects[object.index()]
    }

    /// Iterate all objects.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(index, object)| (ObjectId::from_index(index), object))
    }

    /// Whether a top-level update pass is currently running.
    pub fn update_in_progress(&self) -> bool {
        self.update_in_progress
    }
}
