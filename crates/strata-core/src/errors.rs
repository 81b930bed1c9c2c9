//! Error types for routing and adapter failures.

use thiserror::Error;

/// Errors raised when a call names an invalid partition.
///
/// Out-of-range indices are always fatal to the call; they are never
/// clamped into range.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingError {
    /// Shard index is not in `[0, num_shards)`.
    #[error("shard {index} out of range (store has {num_shards} shards)")]
    ShardOutOfRange {
        /// The offending shard index.
        index: u16,
        /// The store's shard count.
        num_shards: u16,
    },
    /// Replica index is not in `[0, replication_factor)`.
    #[error("replica {index} out of range (replication factor {replication_factor})")]
    ReplicaOutOfRange {
        /// The offending replica index.
        index: u16,
        /// The store's replication factor.
        replication_factor: u16,
    },
    /// A batch contained events whose keys route to different shards.
    #[error("batch routes to multiple shards ({first} and {other})")]
    MixedBatch {
        /// Shard of the first event in the batch.
        first: u16,
        /// Conflicting shard of a later event.
        other: u16,
    },
}

/// Errors raised by an [`EventDomain`](crate::EventDomain) adapter.
#[derive(Error, Debug)]
pub enum DomainError {
    /// A stored payload could not be deserialized back into an event.
    #[error("malformed event payload: {0}")]
    Malformed(String),
    /// A change value other than +1 or -1 was supplied.
    #[error("invalid change value {0}: must be +1 or -1")]
    InvalidChange(i64),
}
