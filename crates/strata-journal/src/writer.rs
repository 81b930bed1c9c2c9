use crate::errors::JournalError;
use crate::frame::{FrameKind, JournalHeader, RecordFrame};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, Write};
use std::path::Path;

/// Options for journal writing.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Whether to fsync after each append (default: true).
    ///
    /// Partition journals default to syncing because an unsynced append
    /// cannot honor the store's durability contract; tests and bulk
    /// rebuilds may turn it off.
    pub sync: bool,
    /// Whether to create the file if it doesn't exist (default: true).
    pub create: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            sync: true,
            create: true,
        }
    }
}

/// Appends typed frames to a partition journal file.
///
/// Opening an existing file validates its header and positions the writer
/// at the end. Each append writes one frame header plus payload; with
/// `sync` enabled the file is fsynced before the append returns, so a
/// completed append is durable and a crashed one leaves at most a torn
/// trailing frame that a permissive reader ignores.
pub struct JournalWriter {
    file: File,
    sync: bool,
}

impl JournalWriter {
    /// Opens or creates a journal file for appending.
    ///
    /// A new or empty file gets a fresh header. An existing file must
    /// carry a valid header for the current format version.
    pub fn open<P: AsRef<Path>>(path: P, options: WriteOptions) -> Result<Self, JournalError> {
        let file = OpenOptions::new()
            .create(options.create)
            .read(true)
            .write(true)
            .open(path)?;

        let mut writer = Self {
            file,
            sync: options.sync,
        };

        let len = writer.file.metadata()?.len();
        if len == 0 {
            writer.write_header()?;
        } else if len < JournalHeader::HEADER_SIZE as u64 {
            return Err(JournalError::FileNotEmpty);
        } else {
            let mut header_bytes = [0u8; JournalHeader::HEADER_SIZE];
            writer.file.seek(io::SeekFrom::Start(0))?;
            writer.file.read_exact(&mut header_bytes)?;
            JournalHeader::from_bytes(&header_bytes)?;
            writer.file.seek(io::SeekFrom::End(0))?;
        }

        Ok(writer)
    }

    fn write_header(&mut self) -> Result<(), JournalError> {
        let header = JournalHeader::new();
        self.file.write_all(&header.to_bytes())?;
        self.file.flush()?;
        if self.sync {
            self.file.sync_all()?;
        }
        Ok(())
    }

    /// Appends one frame.
    pub fn append(&mut self, kind: FrameKind, payload: &[u8]) -> Result<(), JournalError> {
        let frame = RecordFrame::new(kind, payload.len() as u32)?;
        self.file.write_all(&frame.to_bytes())?;
        self.file.write_all(payload)?;
        self.file.flush()?;
        if self.sync {
            self.file.sync_all()?;
        }
        Ok(())
    }

    /// Flushes and closes the file.
    pub fn finish(mut self) -> Result<(), JournalError> {
        self.file.flush()?;
        if self.sync {
            self.file.sync_all()?;
        }
        Ok(())
    }
}

impl Drop for JournalWriter {
    fn drop(&mut self) {
        let _ = self.file.flush();
        if self.sync {
            let _ = self.file.sync_all();
        }
    }
}
