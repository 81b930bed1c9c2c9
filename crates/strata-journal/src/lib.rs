//! Framed, append-only journal files for Strata partitions.
//!
//! Each `(shard, replica)` partition persists its mutation log in one
//! journal file. This crate provides:
//! - The file format: a 16-byte header and typed record frames
//! - Writer API with optional fsync-per-append
//! - Reader API with strict and permissive truncation handling
//! - Atomic whole-file rewrite for compaction
//!
//! Frame payloads are opaque bytes here; `strata-store` defines the
//! mutation records they carry. A torn trailing frame is invisible to a
//! permissive reader, which is what makes a multi-event batch frame the
//! unit of write atomicity.

#![deny(missing_docs)]

/// Error types for journal operations.
pub mod errors;
/// Header and frame structures.
pub mod frame;
/// Journal reader implementation.
pub mod reader;
/// Atomic whole-file rewrite.
pub mod rewrite;
/// Journal writer implementation.
pub mod writer;

pub use errors::JournalError;
pub use frame::{FrameKind, JournalHeader, RecordFrame};
pub use reader::{JournalReader, ReadMode};
pub use rewrite::rewrite_atomic;
pub use writer::{JournalWriter, WriteOptions};
