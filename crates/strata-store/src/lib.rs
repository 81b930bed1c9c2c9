//! Sharded, replicated event store with a pluggable event representation.
//!
//! This crate provides:
//! - The `EventStore` facade: store/get/get_related/more/scan_keys,
//!   associate/get_association, maintenance, prune_type
//! - The `PartitionBackend` trait with journal-backed and in-memory
//!   implementations
//! - The continuation codec for resumable, unbounded paging
//! - The per-partition association index and the cancelling-pair
//!   maintenance engine
//! - A ready-made JSON event domain
//!
//! Core invariants:
//! - A batch is visible entirely or not at all
//! - Replicas of a shard are independent logs; the store never fans a
//!   write out to other replicas
//! - Maintenance removes only matched assert/retract pairs, atomically
//! - A malformed continuation is an error, never an empty page

#![deny(missing_docs)]

/// Cursor protocol: continuations and pages.
pub mod cursor;
/// Error types for store operations.
pub mod error;
/// JSON event domain adapter.
pub mod json;
/// Journal-backed partition backend.
pub mod journal;
/// Cancelling-pair planning.
mod maintenance;
/// In-memory partition backend.
pub mod memory;
/// Persisted partition mutation records.
pub mod ops;
/// In-memory partition state.
mod state;
/// The event store facade.
pub mod store;
/// Partition durability trait.
pub mod traits;

pub use cursor::{Continuation, ContinuationError, Page, QueryKind, PAGE_SIZE};
pub use error::StoreError;
pub use json::JsonEventDomain;
pub use journal::JournalBackend;
pub use memory::MemoryBackend;
pub use ops::{AssociateOp, BatchOp, CancelOp, LogOp, PruneOp, WatermarkOp};
pub use store::{EventStore, StoreConfig};
pub use traits::{BackendError, PartitionBackend};

pub use strata_core::{
    expand_event, shard_of, Change, DomainError, EventDomain, PartitionId, Position, RecordRole,
    RoutingError, StoredRecord,
};
