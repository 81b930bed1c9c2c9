//! Cancelling-pair planning.

use crate::ops::CancelOp;
use crate::state::PartitionState;
use std::collections::BTreeMap;
use strata_core::{Change, Position};

/// Finds every cancelling pair currently live in a partition.
///
/// Within each key's timeline, rows are bucketed by `(type, payload)`;
/// each bucket's asserts and retracts are paired oldest-first. A row can
/// appear in at most one pair, and a row without an opposite-signed,
/// byte-equal counterpart is never planned for removal. The secondary
/// half of a paired record participates like any other row: its payload
/// is the removed bytes and its sign is the inverse of its event's.
pub(crate) fn plan_cancellations(state: &PartitionState) -> Vec<CancelOp> {
    let mut plan = Vec::new();
    for (key, timeline) in state.timelines() {
        let mut buckets: BTreeMap<(&str, &[u8]), (Vec<Position>, Vec<Position>)> = BTreeMap::new();
        for (position, record) in timeline {
            let bucket = buckets
                .entry((record.event_type.as_str(), record.data.as_slice()))
                .or_default();
            match record.change {
                Change::Assert => bucket.0.push(*position),
                Change::Retract => bucket.1.push(*position),
            }
        }
        for (asserts, retracts) in buckets.into_values() {
            for (plus, minus) in asserts.into_iter().zip(retracts) {
                plan.push(CancelOp {
                    key: key.clone(),
                    plus,
                    minus,
                });
            }
        }
    }
    plan
}
