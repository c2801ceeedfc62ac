//! Node trees: nodes, sockets, and links.
//!
//! A [`NodeTree`] is a mutable directed graph. Nodes hold ordered input and
//! output socket lists; links connect one output socket to one input socket.
//! Nodes and links live in slot arenas owned by the tree, addressed by
//! [`NodeId`] / [`LinkId`] handles that stay stable across removals.
//!
//! Two pieces of state on sockets are derived, not authored: the "in use"
//! flag and (for inputs) the back-reference to the incoming link. Both are
//! rebuilt by the update engine from the current link list; mutating links
//! leaves them stale until the owner tags the tree and runs an update pass.
//!
//! Mutators never tag. Recording what changed is the caller's job, through
//! the explicit tag API in [`crate::update`].

use enumset::EnumSet;
use smallvec::SmallVec;

use super::error::GraphError;
use super::flags::TreeChange;
use super::id::{LinkId, NodeId, SocketDirection, SocketRef, TreeId};

/// One socket on a node.
#[derive(Debug, Clone)]
pub struct Socket {
    name: String,
    /// Set by the tag API when this socket changed. Host-consumable, like
    /// the node-level flag; the update engine does not clear it.
    pub(crate) changed: bool,
    /// Derived: set when a link touches this socket. Rebuilt by the update
    /// engine, meaningless between a link mutation and the next pass.
    pub(crate) in_use: bool,
    /// Derived, inputs only: the single incoming link, if any.
    pub(crate) incoming: Option<LinkId>,
}

impl Socket {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            changed: false,
            in_use: false,
            incoming: None,
        }
    }

    /// The socket's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this socket carries a pending socket-level change tag.
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Whether any link touches this socket, as of the last update pass.
    pub fn in_use(&self) -> bool {
        self.in_use
    }

    /// The incoming link, as of the last update pass. Always `None` for
    /// output sockets.
    pub fn incoming(&self) -> Option<LinkId> {
        self.incoming
    }
}

/// A link from one output socket to one input socket.
#[derive(Debug, Clone)]
pub struct Link {
    pub(crate) from: SocketRef,
    pub(crate) to: SocketRef,
    pub(crate) muted: bool,
}

impl Link {
    /// The source (output) socket.
    pub fn from(&self) -> SocketRef {
        self.from
    }

    /// The target (input) socket.
    pub fn to(&self) -> SocketRef {
        self.to
    }

    /// Muted links stay in the graph but carry no data.
    pub fn muted(&self) -> bool {
        self.muted
    }
}

/// An implicit pass-through inside a node, from one of its inputs to one of
/// its outputs. Used in place of the node's own behavior while the node is
/// muted or disabled. Derived per node kind, rebuilt on node update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InternalLink {
    /// The node input being passed through.
    pub input: SocketRef,
    /// The node output it feeds.
    pub output: SocketRef,
}

/// A processing node inside a tree.
#[derive(Debug)]
pub struct Node {
    kind: &'static str,
    name: String,
    group: Option<TreeId>,
    /// Set by the tag API when this node changed; read by the update engine.
    pub(crate) changed: bool,
    pub(crate) inputs: Vec<Socket>,
    pub(crate) outputs: Vec<Socket>,
    pub(crate) internal_links: SmallVec<[InternalLink; 2]>,
}

impl Node {
    /// Create a node of the given kind. The kind key selects the
    /// [`NodeBehavior`](super::NodeBehavior) the update engine consults.
    pub fn new(kind: &'static str, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            group: None,
            changed: false,
            inputs: Vec::new(),
            outputs: Vec::new(),
            internal_links: SmallVec::new(),
        }
    }

    /// Create a group node embedding another tree as a sub-graph.
    pub fn group(kind: &'static str, name: impl Into<String>, tree: TreeId) -> Self {
        let mut node = Self::new(kind, name);
        node.group = Some(tree);
        node
    }

    /// The node's kind key.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The node's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The tree this node embeds as a group, if any.
    pub fn group_tree(&self) -> Option<TreeId> {
        self.group
    }

    /// Point this node at a different group tree (or none).
    pub fn set_group_tree(&mut self, tree: Option<TreeId>) {
        self.group = tree;
    }

    /// Whether this node carries a pending node-level change tag.
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Input sockets, in order.
    pub fn inputs(&self) -> &[Socket] {
        &self.inputs
    }

    /// Output sockets, in order.
    pub fn outputs(&self) -> &[Socket] {
        &self.outputs
    }

    /// The derived pass-through links, as of the last update pass.
    pub fn internal_links(&self) -> &[InternalLink] {
        &self.internal_links
    }
}

/// A directed graph of nodes and links, plus the dirty flags the update
/// engine consumes.
#[derive(Debug)]
pub struct NodeTree {
    kind: &'static str,
    name: String,
    pub(crate) nodes: Vec<Option<Node>>,
    pub(crate) links: Vec<Option<Link>>,
    /// Why this tree needs an update. Cleared by the update pass.
    pub(crate) changed: EnumSet<TreeChange>,
    /// The coarse "something here needs attention" bit consumed by the host
    /// application. Set by every tag; never cleared by the engine.
    pub(crate) update_pending: bool,
}

impl NodeTree {
    /// Create an empty tree of the given kind. The kind key selects the
    /// [`TreeBehavior`](super::TreeBehavior) the update engine consults.
    pub fn new(kind: &'static str, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            nodes: Vec::new(),
            links: Vec::new(),
            changed: EnumSet::empty(),
            update_pending: false,
        }
    }

    /// The tree's kind key.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The tree's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pending dirty flags.
    pub fn changed(&self) -> EnumSet<TreeChange> {
        self.changed
    }

    /// Whether any tag has been recorded since the host last cleared it.
    pub fn update_pending(&self) -> bool {
        self.update_pending
    }

    /// Consume the coarse dirty bit. Host-side; the update engine leaves it
    /// alone.
    pub fn clear_update_pending(&mut self) {
        self.update_pending = false;
    }

    // --- nodes ---

    /// Insert a node, returning its handle.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Some(node));
        id
    }

    /// Remove a node and every link touching it. The node's slot is
    /// tombstoned; its handle must not be used again.
    pub fn remove_node(&mut self, node: NodeId) {
        debug_assert!(
            self.nodes.get(node.index()).is_some_and(Option::is_some),
            "remove_node on a stale NodeId"
        );
        for slot in &mut self.links {
            if slot
                .as_ref()
                .is_some_and(|link| link.from.node == node || link.to.node == node)
            {
                *slot = None;
            }
        }
        self.nodes[node.index()] = None;
    }

    /// Look up a node. Panics on a stale handle.
    pub fn node(&self, node: NodeId) -> &Node {
        self.nodes[node.index()].as_ref().expect("stale NodeId")
    }

    /// Look up a node mutably. Panics on a stale handle.
    pub fn node_mut(&mut self, node: NodeId) -> &mut Node {
        self.nodes[node.index()].as_mut().expect("stale NodeId")
    }

    /// Iterate the live nodes, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| Some((NodeId::from_index(index), slot.as_ref()?)))
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    // --- sockets ---

    /// Append an input socket to a node, returning its address.
    pub fn add_input(&mut self, node: NodeId, name: impl Into<String>) -> SocketRef {
        let inputs = &mut self.node_mut(node).inputs;
        inputs.push(Socket::new(name));
        SocketRef::input(node, (inputs.len() - 1) as u32)
    }

    /// Append an output socket to a node, returning its address.
    pub fn add_output(&mut self, node: NodeId, name: impl Into<String>) -> SocketRef {
        let outputs = &mut self.node_mut(node).outputs;
        outputs.push(Socket::new(name));
        SocketRef::output(node, (outputs.len() - 1) as u32)
    }

    pub(crate) fn has_socket(&self, socket: SocketRef) -> bool {
        let Some(Some(node)) = self.nodes.get(socket.node.index()) else {
            return false;
        };
        let list = match socket.direction {
            SocketDirection::Input => &node.inputs,
            SocketDirection::Output => &node.outputs,
        };
        (socket.index as usize) < list.len()
    }

    /// Look up a socket. Panics on a stale address.
    pub fn socket(&self, socket: SocketRef) -> &Socket {
        let node = self.node(socket.node);
        let list = match socket.direction {
            SocketDirection::Input => &node.inputs,
            SocketDirection::Output => &node.outputs,
        };
        &list[socket.index as usize]
    }

    pub(crate) fn socket_mut(&mut self, socket: SocketRef) -> &mut Socket {
        let node = self.node_mut(socket.node);
        let list = match socket.direction {
            SocketDirection::Input => &mut node.inputs,
            SocketDirection::Output => &mut node.outputs,
        };
        &mut list[socket.index as usize]
    }

    // --- links ---

    /// Connect an output socket to an input socket.
    ///
    /// Validates that both sockets are live and on the right sides. Sockets
    /// are single-input in this data model; linking into an already
    /// connected input is accepted, and the update pass resolves the
    /// conflict last-writer-wins.
    pub fn add_link(&mut self, from: SocketRef, to: SocketRef) -> Result<LinkId, GraphError> {
        if !self.has_socket(from) {
            return Err(GraphError::StaleSocket(from));
        }
        if !self.has_socket(to) {
            return Err(GraphError::StaleSocket(to));
        }
        if from.direction != SocketDirection::Output {
            return Err(GraphError::LinkSourceNotOutput(from));
        }
        if to.direction != SocketDirection::Input {
            return Err(GraphError::LinkTargetNotInput(to));
        }
        let id = LinkId::from_index(self.links.len());
        self.links.push(Some(Link {
            from,
            to,
            muted: false,
        }));
        Ok(id)
    }

    /// Remove a link. Socket back-references into it stay stale until the
    /// next update pass over this tree.
    pub fn remove_link(&mut self, link: LinkId) {
        debug_assert!(
            self.links.get(link.index()).is_some_and(Option::is_some),
            "remove_link on a stale LinkId"
        );
        self.links[link.index()] = None;
    }

    /// Mute or unmute a link. Panics on a stale handle.
    pub fn set_link_muted(&mut self, link: LinkId, muted: bool) {
        self.links[link.index()].as_mut().expect("stale LinkId").muted = muted;
    }

    /// Look up a link. Panics on a stale handle.
    pub fn link(&self, link: LinkId) -> &Link {
        self.links[link.index()].as_ref().expect("stale LinkId")
    }

    /// Iterate the live links, in insertion order.
    pub fn links(&self) -> impl Iterator<Item = (LinkId, &Link)> {
        self.links
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| Some((LinkId::from_index(index), slot.as_ref()?)))
    }

    /// Number of live links.
    pub fn link_count(&self) -> usize {
        self.links.iter().flatten().count()
    }
}
