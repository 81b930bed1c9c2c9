//! Journal-backed partition backend.

use crate::ops::LogOp;
use crate::traits::{BackendError, PartitionBackend};
use std::path::PathBuf;
use strata_journal::{
    rewrite_atomic, FrameKind, JournalReader, JournalWriter, ReadMode, WriteOptions,
};

/// Partition backend persisting ops to one journal file.
///
/// The file is created lazily on the first append, so a partition that
/// never receives a write leaves nothing on disk. Replay uses permissive
/// reading: a torn trailing frame is a crashed append whose op never
/// became durable.
pub struct JournalBackend {
    path: PathBuf,
    options: WriteOptions,
    writer: Option<JournalWriter>,
}

impl JournalBackend {
    /// Creates a backend for the journal file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_options(path, WriteOptions::default())
    }

    /// Creates a backend with explicit write options.
    pub fn with_options(path: impl Into<PathBuf>, options: WriteOptions) -> Self {
        Self {
            path: path.into(),
            options,
            writer: None,
        }
    }

    fn writer(&mut self) -> Result<&mut JournalWriter, BackendError> {
        match self.writer {
            Some(ref mut writer) => Ok(writer),
            None => {
                let writer = JournalWriter::open(&self.path, self.options.clone())?;
                Ok(self.writer.insert(writer))
            }
        }
    }
}

impl PartitionBackend for JournalBackend {
    fn append(&mut self, op: &LogOp) -> Result<(), BackendError> {
        let payload = op.encode()?;
        let kind = op.frame_kind();
        self.writer()?.append(kind, &payload)?;
        Ok(())
    }

    fn replay(&mut self) -> Result<Vec<LogOp>, BackendError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = JournalReader::open(&self.path, ReadMode::Permissive)?;
        let mut ops = Vec::new();
        while let Some((kind, payload)) = reader.read_frame()? {
            if matches!(kind, FrameKind::Unknown(_)) {
                continue;
            }
            if let Some(op) = LogOp::decode(kind, &payload)? {
                ops.push(op);
            }
        }
        Ok(ops)
    }

    fn rewrite(&mut self, ops: &[LogOp]) -> Result<(), BackendError> {
        let mut frames = Vec::with_capacity(ops.len());
        for op in ops {
            frames.push((op.frame_kind(), op.encode()?));
        }
        // Close our handle first: after the rename it would point at the
        // unlinked old file and appends would vanish.
        self.writer = None;
        rewrite_atomic(&self.path, &frames)?;
        Ok(())
    }
}
