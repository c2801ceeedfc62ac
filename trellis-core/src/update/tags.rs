//! The change-tag API.
//!
//! Hosts record what changed through these methods; nothing in the data
//! model tags implicitly. Each tag sets the matching [`TreeChange`] bits and
//! the coarse `update_pending` bit, and nothing else — consequences are
//! deferred to the next update pass.

use enumset::EnumSet;

use crate::graph::{NodeId, NodeTree, SocketRef, TreeChange};

impl NodeTree {
    /// Tag the whole tree: anything might have changed.
    pub fn tag_changed(&mut self) {
        self.changed = EnumSet::all();
        self.update_pending = true;
    }

    /// Tag one node as changed.
    pub fn tag_node_changed(&mut self, node: NodeId) {
        self.changed |= TreeChange::Node;
        self.node_mut(node).changed = true;
        self.update_pending = true;
    }

    /// Tag a newly added node.
    pub fn tag_node_added(&mut self, node: NodeId) {
        self.tag_node_changed(node);
    }

    /// Tag the removal of a node.
    pub fn tag_node_removed(&mut self) {
        self.changed |= TreeChange::RemovedNode;
        self.update_pending = true;
    }

    /// Tag one socket as changed.
    pub fn tag_socket_changed(&mut self, socket: SocketRef) {
        debug_assert!(self.has_socket(socket), "tag_socket_changed on a stale socket");
        self.changed |= TreeChange::Socket;
        self.socket_mut(socket).changed = true;
        self.update_pending = true;
    }

    /// Tag the link structure as changed. The next pass rebuilds socket
    /// back-references and "in use" flags for the whole tree.
    pub fn tag_link_changed(&mut self) {
        self.changed |= TreeChange::Link;
        self.update_pending = true;
    }

    /// Tag a newly added link.
    pub fn tag_link_added(&mut self) {
        self.tag_link_changed();
    }

    /// Tag the removal of a link.
    pub fn tag_link_removed(&mut self) {
        self.tag_link_changed();
    }

    /// Tag a link mute toggle.
    pub fn tag_link_mute_changed(&mut self) {
        self.tag_link_changed();
    }

    /// Tag that runtime-only data is missing and must be rebuilt.
    pub fn tag_missing_runtime_data(&mut self) {
        self.changed |= TreeChange::MissingRuntimeData;
        self.update_pending = true;
    }

    /// Tag the tree's externally visible interface as changed.
    pub fn tag_interface_changed(&mut self) {
        self.changed |= TreeChange::Interface;
        self.update_pending = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;

    #[test]
    fn tags_set_their_bits_and_the_pending_flag() {
        let mut tree = NodeTree::new("test", "tree");
        assert!(!tree.update_pending());

        tree.tag_link_changed();
        assert_eq!(tree.changed(), EnumSet::only(TreeChange::Link));
        assert!(tree.update_pending());

        tree.tag_interface_changed();
        assert_eq!(tree.changed(), TreeChange::Link | TreeChange::Interface);

        tree.tag_missing_runtime_data();
        assert!(tree.changed().contains(TreeChange::MissingRuntimeData));

        tree.tag_node_removed();
        assert!(tree.changed().contains(TreeChange::RemovedNode));
    }

    #[test]
    fn tag_changed_sets_every_bit() {
        let mut tree = NodeTree::new("test", "tree");
        tree.tag_changed();
        assert_eq!(tree.changed(), EnumSet::all());
        assert!(tree.changed().contains(TreeChange::Any));
    }

    #[test]
    fn tag_node_changed_marks_the_node() {
        let mut tree = NodeTree::new("test", "tree");
        let a = tree.add_node(Node::new("k", "a"));
        let b = tree.add_node(Node::new("k", "b"));

        tree.tag_node_changed(a);

        assert!(tree.node(a).changed());
        assert!(!tree.node(b).changed());
        assert_eq!(tree.changed(), EnumSet::only(TreeChange::Node));
    }

    #[test]
    fn tag_socket_changed_marks_the_socket() {
        let mut tree = NodeTree::new("test", "tree");
        let node = tree.add_node(Node::new("k", "n"));
        let inp = tree.add_input(node, "a");
        let out = tree.add_output(node, "b");

        tree.tag_socket_changed(inp);

        assert!(tree.socket(inp).changed());
        assert!(!tree.socket(out).changed());
        assert_eq!(tree.changed(), EnumSet::only(TreeChange::Socket));
        assert!(tree.update_pending());
    }

    #[test]
    fn link_tag_aliases_share_the_link_bit() {
        let mut tree = NodeTree::new("test", "tree");
        tree.tag_link_added();
        assert_eq!(tree.changed(), EnumSet::only(TreeChange::Link));

        let mut tree = NodeTree::new("test", "tree");
        tree.tag_link_removed();
        assert_eq!(tree.changed(), EnumSet::only(TreeChange::Link));

        let mut tree = NodeTree::new("test", "tree");
        tree.tag_link_mute_changed();
        assert_eq!(tree.changed(), EnumSet::only(TreeChange::Link));
    }
}
