//! Error types for store operations.

use crate::cursor::ContinuationError;
use crate::traits::BackendError;
use strata_core::{DomainError, RoutingError};
use thiserror::Error;

/// Errors that can occur during store operations.
///
/// The variants follow the contract's taxonomy. `WriteUncertain` means a
/// mutation may or may not have applied; the caller reconciles (events
/// carry caller-assigned unique ids, so duplicate detection on retry is a
/// caller concern). `Query` failures are safe to retry from scratch or
/// from the last good continuation. `Continuation` is reported distinctly
/// from an empty page so "no more data" is never confused with "your
/// cursor broke".
#[derive(Error, Debug)]
pub enum StoreError {
    /// A call named an invalid shard or replica, or a batch routed to
    /// more than one shard.
    #[error("routing error: {0}")]
    Routing(#[from] RoutingError),
    /// The store configuration is unusable.
    #[error("invalid store configuration: {0}")]
    Config(String),
    /// The store could not be opened from its backends.
    #[error("failed to open store: {0}")]
    Open(#[source] BackendError),
    /// A mutation's durability could not be confirmed; it may or may not
    /// have applied.
    #[error("write outcome uncertain: {0}")]
    WriteUncertain(#[source] BackendError),
    /// A read failed; no continuation was issued.
    #[error("query failed: {0}")]
    Query(#[source] BackendError),
    /// Continuation bytes do not describe a resumable position.
    #[error("continuation rejected: {0}")]
    Continuation(#[from] ContinuationError),
    /// A maintenance pass failed. No cancelling pair is ever left
    /// half-removed; pairs already removed stay removed.
    #[error("maintenance failed: {0}")]
    Maintenance(#[source] BackendError),
    /// The event domain adapter rejected a payload.
    #[error("event domain error: {0}")]
    Domain(#[from] DomainError),
}
