use crate::errors::JournalError;
use crate::frame::FrameKind;
use crate::writer::{JournalWriter, WriteOptions};
use std::fs;
use std::path::Path;

/// Replaces a journal file with a new one holding the given frames.
///
/// The replacement is written to a sibling temp path, synced, and renamed
/// over the original, so a crash mid-rewrite leaves the original journal
/// intact. Used by maintenance compaction to shrink a journal that the
/// append-only format cannot shrink in place.
pub fn rewrite_atomic<P: AsRef<Path>>(
    path: P,
    frames: &[(FrameKind, Vec<u8>)],
) -> Result<(), JournalError> {
    let path = path.as_ref();
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".rewrite");
    let tmp = std::path::PathBuf::from(tmp);

    // Leftover temp file from an earlier crashed rewrite is stale.
    if tmp.exists() {
        fs::remove_file(&tmp)?;
    }

    {
        let mut writer = JournalWriter::open(
            &tmp,
            WriteOptions {
                // One sync at the end is enough for a file that is only
                // visible after the rename.
                sync: false,
                create: true,
            },
        )?;
        for (kind, payload) in frames {
            writer.append(*kind, payload)?;
        }
        writer.finish()?;
    }

    let tmp_file = fs::OpenOptions::new().read(true).open(&tmp)?;
    tmp_file.sync_all()?;
    drop(tmp_file);

    fs::rename(&tmp, path)?;
    Ok(())
}
