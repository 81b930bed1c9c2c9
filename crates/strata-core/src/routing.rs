//! Deterministic key-to-shard routing.

use crate::errors::RoutingError;
use sha2::{Digest, Sha256};

/// Maps a key to its owning shard.
///
/// The shard is the little-endian u64 taken from the first 8 bytes of
/// `SHA-256(key)`, reduced modulo `num_shards`. The mapping is pure and
/// stable for the lifetime of a store configuration: equal key bytes
/// always land on the same shard. Collisions across distinct keys are
/// expected; no load-skew mitigation is attempted here.
///
/// `num_shards` must be at least 1.
pub fn shard_of(key: &[u8], num_shards: u16) -> u16 {
    debug_assert!(num_shards >= 1);
    let digest = Sha256::digest(key);
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    (u64::from_le_bytes(prefix) % u64::from(num_shards)) as u16
}

/// A `(shard, replica)` pair naming one partition of the store.
///
/// Replicas of the same shard are independent logs; the store never
/// propagates a write from one replica to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartitionId {
    /// Shard index in `[0, num_shards)`.
    pub shard: u16,
    /// Replica index in `[0, replication_factor)`.
    pub replica: u16,
}

impl PartitionId {
    /// Validates indices against the store configuration.
    ///
    /// Out-of-range indices are routing errors, never clamped.
    pub fn checked(
        shard: u16,
        replica: u16,
        num_shards: u16,
        replication_factor: u16,
    ) -> Result<Self, RoutingError> {
        if shard >= num_shards {
            return Err(RoutingError::ShardOutOfRange {
                index: shard,
                num_shards,
            });
        }
        if replica >= replication_factor {
            return Err(RoutingError::ReplicaOutOfRange {
                index: replica,
                replication_factor,
            });
        }
        Ok(PartitionId { shard, replica })
    }

    /// Flat index into a dense partition table laid out shard-major.
    pub fn flat_index(&self, replication_factor: u16) -> usize {
        usize::from(self.shard) * usize::from(replication_factor) + usize::from(self.replica)
    }
}
