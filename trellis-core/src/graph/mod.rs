//! Node-Tree Data Model
//!
//! This module defines the graph the update engine operates on:
//!
//! - [`NodeTree`]: a directed graph of [`Node`]s connected by [`Link`]s,
//!   carrying the dirty flags ([`TreeChange`]) an update pass consumes
//! - [`Project`]: the collection of every tree plus the objects whose
//!   modifiers evaluate trees
//! - [`KindRegistry`]: per-kind behavior hooks for trees and nodes
//!
//! # Design Decisions
//!
//! 1. Everything is addressed by arena handles ([`TreeId`], [`NodeId`],
//!    [`LinkId`], [`SocketRef`]) rather than references. Handles are cheap
//!    to copy into the relation indexes and stay stable while the update
//!    engine mutates trees.
//!
//! 2. Slots tombstone on removal and are never reused, so a stale handle
//!    can be detected (lookup panics) instead of aliasing unrelated data.
//!
//! 3. Mutating the graph does not tag it dirty. Tagging is an explicit,
//!    separate API (see [`crate::update`]); the host records what changed,
//!    the engine decides what that implies.

mod error;
mod flags;
mod id;
mod kinds;
mod project;
mod tree;

pub use error::GraphError;
pub use flags::{EnumSet, TreeChange};
pub use id::{LinkId, NodeId, ObjectId, SocketDirection, SocketRef, TreeId};
pub use kinds::{KindRegistry, NodeBehavior, TreeBehavior};
pub use project::{Modifier, ModifierKind, Object, Project};
pub use tree::{InternalLink, Link, Node, NodeTree, Socket};
