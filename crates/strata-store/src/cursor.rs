//! Cursor protocol: continuations and pages.
//!
//! A continuation is a self-describing, versioned byte token: it names the
//! query kind, the partition, the `since` bound, the resolved type set,
//! the key, and the exact position consumption stopped at. Resuming needs
//! nothing beyond the bytes. The layout follows the journal's framing
//! discipline: fixed magic and version up front, little-endian integers,
//! length-prefixed variable fields, every structural defect a distinct
//! error.

use strata_core::Position;
use thiserror::Error;

/// Maximum events returned per page. Chains of continuations make the
/// limit invisible to callers that keep paging.
pub const PAGE_SIZE: usize = 256;

/// Continuation token magic bytes: `b"SLC1"`.
const MAGIC: &[u8; 4] = b"SLC1";

/// Current continuation encoding version.
const VERSION: u16 = 0x0001;

const KIND_BY_KEY: u8 = 1;
const KIND_RELATED: u8 = 2;

/// Which query a continuation resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// A `get(type, key, since)` traversal; one type.
    ByKey,
    /// A `get_related(event, since)` traversal; the type set was resolved
    /// when the traversal began and stays fixed across its pages.
    Related,
}

/// An opaque, resumable position in an unbounded query result.
///
/// Serialize with [`Continuation::serialize`]; resume by handing the bytes
/// to `EventStore::more`. A continuation stays valid as long as its
/// partition exists; positions compacted away in the meantime simply
/// yield fewer events, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation {
    pub(crate) kind: QueryKind,
    pub(crate) shard: u16,
    pub(crate) replica: u16,
    pub(crate) since: i64,
    pub(crate) after: Position,
    pub(crate) key: Vec<u8>,
    pub(crate) types: Vec<String>,
}

/// Errors decoding continuation bytes.
///
/// Reported distinctly from an empty page: a caller must never mistake
/// "no more data" for "your cursor broke".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContinuationError {
    /// The bytes do not start with the continuation magic.
    #[error("bad continuation magic")]
    BadMagic,
    /// The encoding version is not supported.
    #[error("unsupported continuation version 0x{0:04x}")]
    UnsupportedVersion(u16),
    /// The query kind byte is unknown.
    #[error("unknown query kind {0}")]
    UnknownKind(u8),
    /// The token ends before a field does.
    #[error("truncated continuation at byte {0}")]
    Truncated(usize),
    /// A type name is not valid UTF-8.
    #[error("continuation type name is not valid UTF-8")]
    InvalidUtf8,
    /// The token names no types.
    #[error("continuation names no types")]
    EmptyTypeSet,
    /// Bytes remain after the last field.
    #[error("{0} trailing bytes after continuation")]
    TrailingBytes(usize),
    /// The token targets a partition outside the store's configuration.
    #[error("continuation targets shard {shard} replica {replica}, outside {num_shards}x{replication_factor}")]
    PartitionOutOfRange {
        /// Shard named by the token.
        shard: u16,
        /// Replica named by the token.
        replica: u16,
        /// The store's shard count.
        num_shards: u16,
        /// The store's replication factor.
        replication_factor: u16,
    },
}

impl Continuation {
    /// The partition this continuation targets.
    pub fn shard(&self) -> u16 {
        self.shard
    }

    /// The replica this continuation targets.
    pub fn replica(&self) -> u16 {
        self.replica
    }

    /// Serializes the continuation into its binary token.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(64 + self.key.len());
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&VERSION.to_le_bytes());
        bytes.push(match self.kind {
            QueryKind::ByKey => KIND_BY_KEY,
            QueryKind::Related => KIND_RELATED,
        });
        bytes.extend_from_slice(&self.shard.to_le_bytes());
        bytes.extend_from_slice(&self.replica.to_le_bytes());
        bytes.extend_from_slice(&self.since.to_le_bytes());
        bytes.extend_from_slice(&self.after.timestamp.to_le_bytes());
        bytes.extend_from_slice(&self.after.seq.to_le_bytes());
        bytes.extend_from_slice(&(self.key.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&self.key);
        bytes.extend_from_slice(&(self.types.len() as u16).to_le_bytes());
        for name in &self.types {
            bytes.extend_from_slice(&(name.len() as u16).to_le_bytes());
            bytes.extend_from_slice(name.as_bytes());
        }
        bytes
    }

    /// Decodes a binary token back into a continuation.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, ContinuationError> {
        let mut take = Take { bytes, offset: 0 };

        if take.read(4)? != MAGIC {
            return Err(ContinuationError::BadMagic);
        }
        let version = take.read_u16()?;
        if version != VERSION {
            return Err(ContinuationError::UnsupportedVersion(version));
        }
        let kind = match take.read_u8()? {
            KIND_BY_KEY => QueryKind::ByKey,
            KIND_RELATED => QueryKind::Related,
            other => return Err(ContinuationError::UnknownKind(other)),
        };
        let shard = take.read_u16()?;
        let replica = take.read_u16()?;
        let since = take.read_i64()?;
        let after = Position {
            timestamp: take.read_i64()?,
            seq: take.read_u64()?,
        };
        let key_len = take.read_u32()? as usize;
        let key = take.read(key_len)?.to_vec();
        let type_count = take.read_u16()?;
        if type_count == 0 {
            return Err(ContinuationError::EmptyTypeSet);
        }
        let mut types = Vec::with_capacity(type_count as usize);
        for _ in 0..type_count {
            let len = take.read_u16()? as usize;
            let name = std::str::from_utf8(take.read(len)?)
                .map_err(|_| ContinuationError::InvalidUtf8)?;
            types.push(name.to_string());
        }
        if take.offset != bytes.len() {
            return Err(ContinuationError::TrailingBytes(bytes.len() - take.offset));
        }

        Ok(Continuation {
            kind,
            shard,
            replica,
            since,
            after,
            key,
            types,
        })
    }
}

struct Take<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Take<'a> {
    fn read(&mut self, len: usize) -> Result<&'a [u8], ContinuationError> {
        if self.bytes.len() - self.offset < len {
            return Err(ContinuationError::Truncated(self.offset));
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, ContinuationError> {
        Ok(self.read(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16, ContinuationError> {
        let bytes = self.read(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32(&mut self) -> Result<u32, ContinuationError> {
        let bytes = self.read(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_u64(&mut self) -> Result<u64, ContinuationError> {
        let bytes = self.read(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(raw))
    }

    fn read_i64(&mut self) -> Result<i64, ContinuationError> {
        let bytes = self.read(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(i64::from_le_bytes(raw))
    }
}

/// One page of an unbounded query result.
///
/// When `continuation` is present, more matching events existed at call
/// time; hand its serialized bytes to `EventStore::more` for the next
/// page. `None` means the traversal is complete.
#[derive(Debug)]
pub struct Page<E> {
    /// The events of this page, in traversal order.
    pub events: Vec<E>,
    /// Present when more matching events remained at call time.
    pub continuation: Option<Continuation>,
}

impl<E> Page<E> {
    /// True when no more matching events remained at call time.
    pub fn is_terminal(&self) -> bool {
        self.continuation.is_none()
    }
}
