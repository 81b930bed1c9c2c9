use crate::errors::JournalError;
use crate::frame::{FrameKind, JournalHeader, RecordFrame};
use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::Path;

/// Read mode for handling truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Truncated frames are errors.
    Strict,
    /// Truncation is treated as end-of-file.
    ///
    /// This is what partition replay uses: a torn trailing frame is a
    /// crashed append whose batch never became visible.
    Permissive,
}

/// Sequential reader over a partition journal file.
pub struct JournalReader {
    file: File,
    mode: ReadMode,
    position: u64,
}

impl JournalReader {
    /// Opens a journal file, validating its header.
    pub fn open<P: AsRef<Path>>(path: P, mode: ReadMode) -> Result<Self, JournalError> {
        let mut file = File::open(path)?;
        file.seek(io::SeekFrom::Start(0))?;
        let mut header_bytes = [0u8; JournalHeader::HEADER_SIZE];
        file.read_exact(&mut header_bytes)?;
        JournalHeader::from_bytes(&header_bytes)?;

        Ok(Self {
            file,
            mode,
            position: JournalHeader::HEADER_SIZE as u64,
        })
    }

    /// The current read offset in the file.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reads the next frame.
    ///
    /// Returns `Ok(None)` at end-of-file, or at a truncated frame in
    /// permissive mode. Unknown frame kinds are returned as-is; callers
    /// decide whether to skip them.
    pub fn read_frame(&mut self) -> Result<Option<(FrameKind, Vec<u8>)>, JournalError> {
        self.file.seek(io::SeekFrom::Start(self.position))?;

        let file_size = self.file.metadata()?.len();
        if self.position >= file_size {
            return Ok(None);
        }

        let mut frame_header_bytes = [0u8; RecordFrame::FRAME_HEADER_SIZE];
        match self.file.read_exact(&mut frame_header_bytes) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return self.truncated();
            }
            Err(e) => return Err(e.into()),
        }

        let frame = RecordFrame::from_bytes(&frame_header_bytes).map_err(|e| match e {
            JournalError::InvalidFrame { offset: _, reason } => JournalError::InvalidFrame {
                offset: self.position,
                reason,
            },
            other => other,
        })?;

        let mut payload = vec![0u8; frame.len as usize];
        match self.file.read_exact(&mut payload) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return self.truncated();
            }
            Err(e) => return Err(e.into()),
        }

        self.position += (RecordFrame::FRAME_HEADER_SIZE + frame.len as usize) as u64;
        Ok(Some((frame.kind, payload)))
    }

    fn truncated(&self) -> Result<Option<(FrameKind, Vec<u8>)>, JournalError> {
        if self.mode == ReadMode::Permissive {
            Ok(None)
        } else {
            Err(JournalError::TruncatedFrame {
                offset: self.position,
            })
        }
    }

    /// Reads all remaining frames.
    pub fn read_to_end(&mut self) -> Result<Vec<(FrameKind, Vec<u8>)>, JournalError> {
        let mut frames = Vec::new();
        while let Some(frame) = self.read_frame()? {
            frames.push(frame);
        }
        Ok(frames)
    }
}
