//! Errors raised by graph construction.
//!
//! The update engine itself has no recoverable errors: it runs over already
//! validated in-memory state, and invariant violations there are host bugs
//! caught by assertions. The fallible surface is the construction API, where
//! the host wires sockets and registers kinds.

use thiserror::Error;

use super::id::SocketRef;

/// Error building or mutating the node-tree data model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// The socket reference does not name a live socket in this tree.
    #[error("socket {0:?} does not refer to a live socket in this tree")]
    StaleSocket(SocketRef),

    /// Links must originate at an output socket.
    #[error("link source {0:?} must be an output socket")]
    LinkSourceNotOutput(SocketRef),

    /// Links must terminate at an input socket.
    #[error("link target {0:?} must be an input socket")]
    LinkTargetNotInput(SocketRef),

    /// A behavior was already registered for this kind key.
    #[error("a behavior is already registered for kind `{0}`")]
    KindAlreadyRegistered(&'static str),
}
