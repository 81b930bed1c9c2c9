//! In-memory partition state: the left-fold of a partition's ops.

use crate::ops::{AssociateOp, BatchOp, CancelOp, LogOp, PruneOp, WatermarkOp};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use strata_core::{Position, StoredRecord};

/// Live state of one partition.
///
/// Rows are indexed by key, then by position, so a `(type, key, since)`
/// query is a single ordered range scan. The association edge set is
/// normalized to lexicographic endpoint order.
#[derive(Debug, Default)]
pub(crate) struct PartitionState {
    keys: BTreeMap<Vec<u8>, BTreeMap<Position, StoredRecord>>,
    associations: BTreeSet<(String, String)>,
    next_seq: u64,
}

impl PartitionState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Rebuilds state by folding ops in order.
    pub(crate) fn replay(ops: &[LogOp]) -> Self {
        let mut state = Self::new();
        for op in ops {
            state.apply(op);
        }
        state
    }

    pub(crate) fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub(crate) fn apply(&mut self, op: &LogOp) {
        match op {
            LogOp::Batch(batch) => self.apply_batch(batch),
            LogOp::Associate(edge) => self.apply_associate(edge),
            LogOp::Cancel(cancel) => self.apply_cancel(cancel),
            LogOp::Prune(prune) => self.apply_prune(prune),
            LogOp::Watermark(mark) => self.apply_watermark(mark),
        }
    }

    fn apply_batch(&mut self, batch: &BatchOp) {
        for (offset, record) in batch.records.iter().enumerate() {
            let position = Position {
                timestamp: batch.timestamp,
                seq: batch.first_seq + offset as u64,
            };
            self.keys
                .entry(record.key.clone())
                .or_default()
                .insert(position, record.clone());
        }
        let end = batch.first_seq + batch.records.len() as u64;
        self.next_seq = self.next_seq.max(end);
    }

    fn apply_associate(&mut self, edge: &AssociateOp) {
        self.associations
            .insert((edge.type1.clone(), edge.type2.clone()));
    }

    fn apply_cancel(&mut self, cancel: &CancelOp) {
        if let Some(timeline) = self.keys.get_mut(&cancel.key) {
            timeline.remove(&cancel.plus);
            timeline.remove(&cancel.minus);
            if timeline.is_empty() {
                self.keys.remove(&cancel.key);
            }
        }
    }

    fn apply_prune(&mut self, prune: &PruneOp) {
        self.keys.retain(|_, timeline| {
            timeline.retain(|_, record| record.event_type != prune.event_type);
            !timeline.is_empty()
        });
        self.associations
            .retain(|(a, b)| *a != prune.event_type && *b != prune.event_type);
    }

    fn apply_watermark(&mut self, mark: &WatermarkOp) {
        self.next_seq = self.next_seq.max(mark.next_seq);
    }

    pub(crate) fn has_association(&self, a: &str, b: &str) -> bool {
        let edge = AssociateOp::normalized(a, b);
        self.associations.contains(&(edge.type1, edge.type2))
    }

    /// Every type paired with `event_type` in either position, sorted.
    pub(crate) fn associated(&self, event_type: &str) -> Vec<String> {
        let mut related = BTreeSet::new();
        for (a, b) in &self.associations {
            if a == event_type {
                related.insert(b.clone());
            } else if b == event_type {
                related.insert(a.clone());
            }
        }
        related.remove(event_type);
        related.into_iter().collect()
    }

    /// Ordered scan of one key's timeline.
    ///
    /// Yields up to `limit` visible rows whose type is in `types`,
    /// starting at `since` or strictly after `after` when resuming. The
    /// second return value says whether more matching rows remain.
    pub(crate) fn scan(
        &self,
        key: &[u8],
        types: &BTreeSet<String>,
        since: i64,
        after: Option<Position>,
        limit: usize,
    ) -> (Vec<(Position, &StoredRecord)>, bool) {
        let timeline = match self.keys.get(key) {
            Some(timeline) => timeline,
            None => return (Vec::new(), false),
        };

        let lower = match after {
            Some(position) => Bound::Excluded(position),
            None => Bound::Included(Position::floor(since)),
        };

        let mut rows = Vec::new();
        let mut more = false;
        for (position, record) in timeline.range((lower, Bound::Unbounded)) {
            if !record.visible() || !types.contains(record.event_type.as_str()) {
                continue;
            }
            if rows.len() == limit {
                more = true;
                break;
            }
            rows.push((*position, record));
        }
        (rows, more)
    }

    /// Distinct keys holding at least one row, byte-sorted.
    pub(crate) fn scan_keys(&self) -> Vec<Vec<u8>> {
        self.keys.keys().cloned().collect()
    }

    /// Iterates every key's timeline, for maintenance planning.
    pub(crate) fn timelines(
        &self,
    ) -> impl Iterator<Item = (&Vec<u8>, &BTreeMap<Position, StoredRecord>)> {
        self.keys.iter()
    }

    /// Emits ops that reproduce this state when replayed on an empty
    /// partition. The leading watermark keeps the insertion counter from
    /// regressing past positions that were compacted away.
    pub(crate) fn snapshot_ops(&self) -> Vec<LogOp> {
        let mut ops = vec![LogOp::Watermark(WatermarkOp {
            next_seq: self.next_seq,
        })];
        for (type1, type2) in &self.associations {
            ops.push(LogOp::Associate(AssociateOp {
                type1: type1.clone(),
                type2: type2.clone(),
            }));
        }
        for timeline in self.keys.values() {
            for (position, record) in timeline {
                ops.push(LogOp::Batch(BatchOp {
                    timestamp: position.timestamp,
                    first_seq: position.seq,
                    records: vec![record.clone()],
                }));
            }
        }
        ops
    }
}
