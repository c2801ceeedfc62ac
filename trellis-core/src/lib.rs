//! Trellis Core
//!
//! This crate provides the incremental update engine for the Trellis
//! node-graph framework. It implements:
//!
//! - A node-tree data model: trees of nodes and links, group nodes embedding
//!   other trees, objects whose modifiers evaluate trees
//! - An explicit change-tag API recording what the host mutated
//! - An update pass that re-derives structural caches, propagates changes
//!   through nested groups in dependency order, and notifies the host
//!
//! # Architecture
//!
//! The crate is organized into two modules:
//!
//! - `graph`: the data model — trees, nodes, sockets, links, the project
//!   collection, and per-kind behavior hooks
//! - `update`: the engine — change tags, relation indexes, dependency
//!   ordering, and the update entry points
//!
//! # Example
//!
//! ```rust
//! use trellis_core::graph::{KindRegistry, Node, NodeTree, Project};
//! use trellis_core::update::{update_project, UpdateCallbacks};
//!
//! let mut project = Project::new();
//!
//! // Build a small tree: one link from a source node into a sink node.
//! let mut tree = NodeTree::new("geometry", "Scatter");
//! let source = tree.add_node(Node::new("math", "Add"));
//! let sink = tree.add_node(Node::new("math", "Multiply"));
//! let out = tree.add_output(source, "Value");
//! let inp = tree.add_input(sink, "Value");
//! let link = tree.add_link(out, inp).unwrap();
//!
//! // Mutating never tags; record the change explicitly.
//! tree.tag_link_changed();
//! let tree_id = project.add_tree(tree);
//!
//! update_project(&mut project, &KindRegistry::new(), &mut UpdateCallbacks::none());
//!
//! // The pass rebuilt the derived socket state and consumed the flags.
//! let tree = project.tree(tree_id);
//! assert!(tree.changed().is_empty());
//! assert_eq!(tree.socket(inp).incoming(), Some(link));
//! assert!(tree.socket(out).in_use());
//! ```

pub mod graph;
pub mod update;
