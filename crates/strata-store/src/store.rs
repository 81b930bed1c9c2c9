//! The event store facade.

use crate::cursor::{Continuation, ContinuationError, Page, QueryKind, PAGE_SIZE};
use crate::error::StoreError;
use crate::journal::JournalBackend;
use crate::maintenance::plan_cancellations;
use crate::memory::MemoryBackend;
use crate::ops::{AssociateOp, BatchOp, LogOp, PruneOp};
use crate::state::PartitionState;
use crate::traits::PartitionBackend;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use strata_core::{expand_event, shard_of, EventDomain, PartitionId, Position};

/// Store shape: shard count and replication factor.
///
/// Both are fixed for the lifetime of the stored data; the router's
/// key-to-shard mapping depends on `num_shards`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Number of shards the key space is partitioned into.
    pub num_shards: u16,
    /// Number of independent replicas each shard has.
    pub replication_factor: u16,
}

struct Partition {
    state: PartitionState,
    backend: Box<dyn PartitionBackend>,
}

/// A sharded, replicated event store over an application event
/// representation.
///
/// Every partition (`shard`, `replica`) is an independent log behind its
/// own lock: operations on different partitions run fully in parallel,
/// while within one partition writes serialize and reads observe a
/// consistent snapshot. Replicas are not synchronized by the store: the
/// caller issues equivalent calls against every replica it wants to keep
/// converged, which is why every operation takes an explicit replica
/// index.
pub struct EventStore<D: EventDomain> {
    domain: D,
    config: StoreConfig,
    partitions: Vec<Mutex<Partition>>,
}

impl<D: EventDomain> EventStore<D> {
    /// Builds a store from one backend per partition.
    ///
    /// Backends are given shard-major: all replicas of shard 0, then all
    /// replicas of shard 1, and so on. Each backend is replayed to
    /// rebuild its partition's state.
    pub fn with_backends(
        domain: D,
        config: StoreConfig,
        backends: Vec<Box<dyn PartitionBackend>>,
    ) -> Result<Self, StoreError> {
        if config.num_shards == 0 {
            return Err(StoreError::Config("num_shards must be at least 1".into()));
        }
        if config.replication_factor == 0 {
            return Err(StoreError::Config(
                "replication_factor must be at least 1".into(),
            ));
        }
        let expected = usize::from(config.num_shards) * usize::from(config.replication_factor);
        if backends.len() != expected {
            return Err(StoreError::Config(format!(
                "expected {} backends for {}x{}, got {}",
                expected,
                config.num_shards,
                config.replication_factor,
                backends.len()
            )));
        }

        let mut partitions = Vec::with_capacity(expected);
        for mut backend in backends {
            let ops = backend.replay().map_err(StoreError::Open)?;
            partitions.push(Mutex::new(Partition {
                state: PartitionState::replay(&ops),
                backend,
            }));
        }

        Ok(Self {
            domain,
            config,
            partitions,
        })
    }

    /// Builds a store with in-memory partitions.
    pub fn in_memory(domain: D, config: StoreConfig) -> Result<Self, StoreError> {
        let count = usize::from(config.num_shards) * usize::from(config.replication_factor);
        let backends = (0..count)
            .map(|_| Box::new(MemoryBackend::new()) as Box<dyn PartitionBackend>)
            .collect();
        Self::with_backends(domain, config, backends)
    }

    /// Opens a store persisted under `dir`, one journal file per
    /// partition (`shard-<s>.replica-<r>.slj`). Journals are created
    /// lazily on first write.
    pub fn persistent(
        domain: D,
        config: StoreConfig,
        dir: impl AsRef<Path>,
    ) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .map_err(|e| StoreError::Open(strata_journal::JournalError::Io(e).into()))?;
        let mut backends: Vec<Box<dyn PartitionBackend>> = Vec::new();
        for shard in 0..config.num_shards {
            for replica in 0..config.replication_factor {
                let path = dir.join(format!("shard-{shard:03}.replica-{replica}.slj"));
                backends.push(Box::new(JournalBackend::new(path)));
            }
        }
        Self::with_backends(domain, config, backends)
    }

    /// Number of shards.
    pub fn num_shards(&self) -> u16 {
        self.config.num_shards
    }

    /// Number of replicas per shard.
    pub fn replication_factor(&self) -> u16 {
        self.config.replication_factor
    }

    /// The store's configuration.
    pub fn config(&self) -> StoreConfig {
        self.config
    }

    fn lock(&self, shard: u16, replica: u16) -> Result<MutexGuard<'_, Partition>, StoreError> {
        let id = PartitionId::checked(
            shard,
            replica,
            self.config.num_shards,
            self.config.replication_factor,
        )?;
        let partition = &self.partitions[id.flat_index(self.config.replication_factor)];
        // A poisoned lock means a panic elsewhere; the state itself is
        // still consistent (mutations apply only after a durable append).
        Ok(match partition.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        })
    }

    /// Stores a batch of events atomically into one replica.
    ///
    /// The shard is derived from the events' keys; every event in the
    /// batch must route to the same shard. Either the whole batch becomes
    /// visible to subsequent queries or none of it does. On
    /// [`StoreError::WriteUncertain`] the batch may or may not have
    /// applied; retries and reconciliation (keyed on event ids) are the
    /// caller's responsibility.
    pub fn store(
        &self,
        events: &[D::Event],
        replica: u16,
        timestamp: i64,
    ) -> Result<(), StoreError> {
        let first = match events.first() {
            Some(first) => first,
            None => return Ok(()),
        };
        let shard = shard_of(&self.domain.key(first), self.config.num_shards);

        let mut records = Vec::with_capacity(events.len());
        for event in events {
            let event_shard = shard_of(&self.domain.key(event), self.config.num_shards);
            if event_shard != shard {
                return Err(strata_core::RoutingError::MixedBatch {
                    first: shard,
                    other: event_shard,
                }
                .into());
            }
            records.extend(expand_event(&self.domain, event));
        }

        let mut guard = self.lock(shard, replica)?;
        let partition = &mut *guard;
        let op = LogOp::Batch(BatchOp {
            timestamp,
            first_seq: partition.state.next_seq(),
            records,
        });
        partition
            .backend
            .append(&op)
            .map_err(StoreError::WriteUncertain)?;
        partition.state.apply(&op);
        tracing::debug!(shard, replica, events = events.len(), "stored batch");
        Ok(())
    }

    /// Returns events of one `(type, key)` with timestamp at or after
    /// `since`, ordered by `(timestamp, seq)`.
    ///
    /// At most [`PAGE_SIZE`] events are returned; when more remain, the
    /// page carries a continuation for [`EventStore::more`].
    pub fn get(
        &self,
        event_type: &str,
        key: &[u8],
        replica: u16,
        since: i64,
    ) -> Result<Page<D::Event>, StoreError> {
        let shard = shard_of(key, self.config.num_shards);
        let guard = self.lock(shard, replica)?;
        let types = BTreeSet::from([event_type.to_string()]);
        self.page(
            &guard.state,
            QueryKind::ByKey,
            shard,
            replica,
            key,
            types,
            since,
            None,
        )
    }

    /// Returns events sharing `event`'s key whose type is associated
    /// with `event`'s type (or is that type itself), ordered and paged
    /// like [`EventStore::get`].
    ///
    /// The type set is resolved once, when the traversal begins; every
    /// page of one traversal sees the same set.
    pub fn get_related(
        &self,
        event: &D::Event,
        replica: u16,
        since: i64,
    ) -> Result<Page<D::Event>, StoreError> {
        let event_type = self.domain.event_type(event);
        let key = self.domain.key(event);
        let shard = shard_of(&key, self.config.num_shards);
        let guard = self.lock(shard, replica)?;
        let mut types: BTreeSet<String> = guard.state.associated(&event_type).into_iter().collect();
        types.insert(event_type);
        self.page(
            &guard.state,
            QueryKind::Related,
            shard,
            replica,
            &key,
            types,
            since,
            None,
        )
    }

    /// Resumes a traversal from continuation bytes.
    ///
    /// Concatenating the pages of one traversal yields the same sequence
    /// as an unpaged query against an unchanging partition. There is no
    /// snapshot isolation across pages: events stored or compacted
    /// between page fetches may appear or be skipped.
    pub fn more(&self, continuation: &[u8]) -> Result<Page<D::Event>, StoreError> {
        let token = Continuation::deserialize(continuation)?;
        if token.shard >= self.config.num_shards || token.replica >= self.config.replication_factor
        {
            return Err(ContinuationError::PartitionOutOfRange {
                shard: token.shard,
                replica: token.replica,
                num_shards: self.config.num_shards,
                replication_factor: self.config.replication_factor,
            }
            .into());
        }
        let guard = self.lock(token.shard, token.replica)?;
        let types: BTreeSet<String> = token.types.iter().cloned().collect();
        self.page(
            &guard.state,
            token.kind,
            token.shard,
            token.replica,
            &token.key,
            types,
            token.since,
            Some(token.after),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn page(
        &self,
        state: &PartitionState,
        kind: QueryKind,
        shard: u16,
        replica: u16,
        key: &[u8],
        types: BTreeSet<String>,
        since: i64,
        after: Option<Position>,
    ) -> Result<Page<D::Event>, StoreError> {
        let (rows, more) = state.scan(key, &types, since, after, PAGE_SIZE);
        let mut events = Vec::with_capacity(rows.len());
        let mut last = after;
        for (position, record) in rows {
            events.push(self.domain.deserialize(&record.payload)?);
            last = Some(position);
        }
        let continuation = match (more, last) {
            (true, Some(after)) => Some(Continuation {
                kind,
                shard,
                replica,
                since,
                after,
                key: key.to_vec(),
                types: types.into_iter().collect(),
            }),
            _ => None,
        };
        Ok(Page {
            events,
            continuation,
        })
    }

    /// Enumerates the distinct keys present in one partition,
    /// byte-sorted. The returned values are accepted by
    /// [`EventStore::get`] as-is.
    pub fn scan_keys(&self, shard: u16, replica: u16) -> Result<Vec<Vec<u8>>, StoreError> {
        let guard = self.lock(shard, replica)?;
        Ok(guard.state.scan_keys())
    }

    /// Records the undirected association `{type1, type2}` in one
    /// partition. Idempotent: an existing edge is not re-appended.
    pub fn associate(
        &self,
        type1: &str,
        type2: &str,
        shard: u16,
        replica: u16,
    ) -> Result<(), StoreError> {
        let mut guard = self.lock(shard, replica)?;
        if guard.state.has_association(type1, type2) {
            return Ok(());
        }
        let partition = &mut *guard;
        let op = LogOp::Associate(AssociateOp::normalized(type1, type2));
        partition
            .backend
            .append(&op)
            .map_err(StoreError::WriteUncertain)?;
        partition.state.apply(&op);
        tracing::debug!(shard, replica, type1, type2, "associated types");
        Ok(())
    }

    /// Returns every type associated with `event_type` in one partition,
    /// regardless of which position it was given in.
    pub fn get_association(
        &self,
        event_type: &str,
        shard: u16,
        replica: u16,
    ) -> Result<Vec<String>, StoreError> {
        let guard = self.lock(shard, replica)?;
        Ok(guard.state.associated(event_type))
    }

    /// Runs a housekeeping pass on one partition.
    ///
    /// Every cancelling pair live at the start of the pass (an assert
    /// and a retract with the same type, key, and byte-equal payload)
    /// is removed. Each pair is removed atomically (one durable op, one
    /// state transition); unmatched events are never touched. After
    /// removals the partition's journal is compacted. Safe to invoke
    /// repeatedly; a pass that finds nothing changes nothing.
    pub fn maintenance(&self, shard: u16, replica: u16) -> Result<(), StoreError> {
        let mut guard = self.lock(shard, replica)?;
        let partition = &mut *guard;
        let plan = plan_cancellations(&partition.state);
        for cancel in &plan {
            let op = LogOp::Cancel(cancel.clone());
            partition
                .backend
                .append(&op)
                .map_err(StoreError::Maintenance)?;
            partition.state.apply(&op);
        }
        if !plan.is_empty() {
            let snapshot = partition.state.snapshot_ops();
            partition
                .backend
                .rewrite(&snapshot)
                .map_err(StoreError::Maintenance)?;
            tracing::info!(shard, replica, pairs = plan.len(), "maintenance removed pairs");
        }
        Ok(())
    }

    /// Deletes every event of `event_type` and every association edge
    /// touching it, in one partition only. Irreversible. Applied as a
    /// single state transition: queries see the partition before or
    /// after the prune, never in between. Other types are unaffected.
    pub fn prune_type(
        &self,
        event_type: &str,
        shard: u16,
        replica: u16,
    ) -> Result<(), StoreError> {
        let mut guard = self.lock(shard, replica)?;
        let partition = &mut *guard;
        let op = LogOp::Prune(PruneOp {
            event_type: event_type.to_string(),
        });
        partition
            .backend
            .append(&op)
            .map_err(StoreError::WriteUncertain)?;
        partition.state.apply(&op);
        tracing::info!(shard, replica, event_type, "pruned type");
        Ok(())
    }
}
