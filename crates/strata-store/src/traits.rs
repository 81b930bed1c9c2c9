//! Partition durability trait.

use crate::ops::LogOp;
use thiserror::Error;

/// Errors surfaced by a partition backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The underlying journal failed.
    #[error("journal error: {0}")]
    Journal(#[from] strata_journal::JournalError),
    /// An op could not be encoded or decoded.
    #[error("op codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Durability boundary for one partition.
///
/// The journal file is the reference implementation; an in-memory
/// implementation serves tests and embedded callers, and the trait leaves
/// room for other media. A backend is exclusively owned by its partition
/// and never shared.
///
/// Contract: `append` makes one op durable atomically (a crashed append
/// must be invisible to a later `replay`); `replay` returns every durable
/// op in append order; `rewrite` atomically replaces the whole history
/// with the given ops, used by maintenance compaction.
pub trait PartitionBackend: Send {
    /// Appends one op durably.
    fn append(&mut self, op: &LogOp) -> Result<(), BackendError>;

    /// Returns all durable ops in append order.
    fn replay(&mut self) -> Result<Vec<LogOp>, BackendError>;

    /// Atomically replaces the history with `ops`.
    fn rewrite(&mut self, ops: &[LogOp]) -> Result<(), BackendError>;
}
