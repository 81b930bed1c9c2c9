//! Core types for the Strata sharded event log.
//!
//! This crate provides:
//! - The `EventDomain` adapter trait over opaque application events
//! - The stored record model shared by every backend
//! - Deterministic key-to-shard routing
//! - Routing and domain error types
//!
//! Core invariants:
//! - The store reads events only through the adapter functions
//! - A key's shard never changes for a fixed shard count
//! - `change` is exactly +1 (assert) or -1 (retract)
//! - A record with a `removed` payload represents two paired events
//!
#![deny(missing_docs)]

/// Error types for routing and adapter failures.
pub mod errors;
/// The event-representation adapter trait.
pub mod domain;
/// Stored record model and positions.
pub mod record;
/// Deterministic key-to-shard routing.
pub mod routing;

pub use domain::{expand_event, EventDomain};
pub use errors::{DomainError, RoutingError};
pub use record::{Change, Position, RecordRole, StoredRecord};
pub use routing::{shard_of, PartitionId};
