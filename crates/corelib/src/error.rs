//! Error types for the core library.

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
///
/// All of these are local and recoverable. A failed topology change leaves
/// the ring exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A key lookup was attempted while no node is present.
    #[error("ring is empty: no node can own the key")]
    EmptyRing,

    /// `remove_node` was given a name that is not on the ring.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// `add_node` was given a name that is already on the ring.
    #[error("node already present: {0}")]
    DuplicateNode(String),

    /// A placement digest of the new node is already held by another
    /// virtual node.
    #[error("ring position for {node}-{replica} is already taken")]
    PositionTaken {
        /// Name of the node being added.
        node: String,
        /// Replica index whose digest collided.
        replica: usize,
    },

    /// Invalid construction parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An internal invariant does not hold.
    #[error("ring state corrupted: {0}")]
    Corrupted(String),
}
