//! Persisted partition mutation records.
//!
//! A partition's state is the left-fold of its ops; replaying a journal's
//! ops on an empty state reproduces the partition exactly. Each op
//! serializes as one JSON frame payload, with the frame kind carrying the
//! discriminant.

use serde::{Deserialize, Serialize};
use strata_core::record::b64;
use strata_core::{Position, StoredRecord};
use strata_journal::FrameKind;

/// An atomic batch of stored rows.
///
/// Rows take positions `(timestamp, first_seq)`, `(timestamp,
/// first_seq + 1)`, … in order. The whole batch lives in one journal
/// frame, so it becomes durable entirely or not at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOp {
    /// Caller-supplied store timestamp shared by the batch.
    pub timestamp: i64,
    /// Sequence number of the first row.
    pub first_seq: u64,
    /// The rows, in insertion order.
    pub records: Vec<StoredRecord>,
}

/// An undirected association edge between two type names.
///
/// Endpoints are stored in lexicographic order; `{A, B}` and `{B, A}` are
/// the same edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociateOp {
    /// Lexicographically smaller endpoint.
    pub type1: String,
    /// Lexicographically larger endpoint.
    pub type2: String,
}

impl AssociateOp {
    /// Builds the normalized edge for two endpoints in either order.
    pub fn normalized(a: &str, b: &str) -> Self {
        if a <= b {
            AssociateOp {
                type1: a.to_string(),
                type2: b.to_string(),
            }
        } else {
            AssociateOp {
                type1: b.to_string(),
                type2: a.to_string(),
            }
        }
    }
}

/// Atomic removal of one cancelling pair.
///
/// `plus` is the position of the assert row, `minus` the retract row;
/// both rows carry the same type, key, and payload. One op per pair keeps
/// pair removal all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOp {
    /// Key whose timeline holds both rows.
    #[serde(with = "b64")]
    pub key: Vec<u8>,
    /// Position of the +1 row.
    pub plus: Position,
    /// Position of the -1 row.
    pub minus: Position,
}

/// Bulk removal of one type's events and association edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneOp {
    /// The type being pruned.
    pub event_type: String,
}

/// Sequence watermark.
///
/// Emitted first when a journal is rewritten, so replaying the compacted
/// journal cannot regress the insertion counter and reuse positions that
/// older continuations may still reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatermarkOp {
    /// The partition's next unused sequence number.
    pub next_seq: u64,
}

/// One persisted partition mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOp {
    /// An atomic batch of stored rows.
    Batch(BatchOp),
    /// An association edge.
    Associate(AssociateOp),
    /// Removal of one cancelling pair.
    Cancel(CancelOp),
    /// Removal of one type.
    Prune(PruneOp),
    /// Sequence watermark.
    Watermark(WatermarkOp),
}

impl LogOp {
    /// The journal frame kind carrying this op.
    pub fn frame_kind(&self) -> FrameKind {
        match self {
            LogOp::Batch(_) => FrameKind::Batch,
            LogOp::Associate(_) => FrameKind::Associate,
            LogOp::Cancel(_) => FrameKind::Cancel,
            LogOp::Prune(_) => FrameKind::Prune,
            LogOp::Watermark(_) => FrameKind::Watermark,
        }
    }

    /// Serializes the op into a frame payload.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            LogOp::Batch(op) => serde_json::to_vec(op),
            LogOp::Associate(op) => serde_json::to_vec(op),
            LogOp::Cancel(op) => serde_json::to_vec(op),
            LogOp::Prune(op) => serde_json::to_vec(op),
            LogOp::Watermark(op) => serde_json::to_vec(op),
        }
    }

    /// Decodes a frame back into an op.
    ///
    /// Returns `Ok(None)` for unknown frame kinds, which replay skips.
    pub fn decode(kind: FrameKind, payload: &[u8]) -> Result<Option<LogOp>, serde_json::Error> {
        let op = match kind {
            FrameKind::Batch => Some(LogOp::Batch(serde_json::from_slice(payload)?)),
            FrameKind::Associate => Some(LogOp::Associate(serde_json::from_slice(payload)?)),
            FrameKind::Cancel => Some(LogOp::Cancel(serde_json::from_slice(payload)?)),
            FrameKind::Prune => Some(LogOp::Prune(serde_json::from_slice(payload)?)),
            FrameKind::Watermark => Some(LogOp::Watermark(serde_json::from_slice(payload)?)),
            FrameKind::Unknown(_) => None,
        };
        Ok(op)
    }
}
