//! Handle types for the node-tree data model.
//!
//! All cross-references in the data model are stable arena handles rather
//! than pointers. A handle stays valid for the lifetime of the slot it names:
//! removing an element tombstones its slot instead of shifting its neighbors,
//! so handles held by the host never silently re-point at other data. Looking
//! up a tombstoned handle is a host bug and panics.

/// Stable handle to a node tree inside a [`Project`](super::Project).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(u32);

/// Stable handle to a node within one [`NodeTree`](super::NodeTree).
///
/// Node ids are scoped to their owning tree; two trees may both contain a
/// node id with the same raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

/// Stable handle to a link within one [`NodeTree`](super::NodeTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkId(u32);

/// Stable handle to an object inside a [`Project`](super::Project).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(u32);

macro_rules! arena_id {
    ($name:ident) => {
        impl $name {
            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }

            /// Get the raw id value.
            pub fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

arena_id!(TreeId);
arena_id!(NodeId);
arena_id!(LinkId);
arena_id!(ObjectId);

/// Which side of a node a socket sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketDirection {
    Input,
    Output,
}

/// Address of one socket within one tree.
///
/// Sockets live inline in their node's input/output lists, so they are
/// addressed by node, side, and position rather than by their own arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketRef {
    /// The node owning the socket.
    pub node: NodeId,
    /// Whether the socket is on the input or output side.
    pub direction: SocketDirection,
    /// Position within the node's input or output list.
    pub index: u32,
}

impl SocketRef {
    /// Address the `index`-th input socket of `node`.
    pub fn input(node: NodeId, index: u32) -> Self {
        Self {
            node,
            direction: SocketDirection::Input,
            index,
        }
    }

    /// Address the `index`-th output socket of `node`.
    pub fn output(node: NodeId, index: u32) -> Self {
        Self {
            node,
            direction: SocketDirection::Output,
            index,
        }
    }
}
