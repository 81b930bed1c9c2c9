use strata_journal::{
    rewrite_atomic, FrameKind, JournalError, JournalReader, JournalWriter, ReadMode, WriteOptions,
};
use std::fs;
use std::io::{Seek, Write};
use tempfile::TempDir;

fn no_sync() -> WriteOptions {
    WriteOptions {
        sync: false,
        create: true,
    }
}

#[test]
fn test_write_read_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("partition.slj");

    {
        let mut writer = JournalWriter::open(&path, no_sync()).unwrap();
        writer.append(FrameKind::Batch, b"batch-1").unwrap();
        writer.append(FrameKind::Associate, b"edge-1").unwrap();
        writer.finish().unwrap();
    }

    let mut reader = JournalReader::open(&path, ReadMode::Strict).unwrap();
    let (kind1, payload1) = reader.read_frame().unwrap().unwrap();
    let (kind2, payload2) = reader.read_frame().unwrap().unwrap();
    assert_eq!(kind1, FrameKind::Batch);
    assert_eq!(payload1, b"batch-1");
    assert_eq!(kind2, FrameKind::Associate);
    assert_eq!(payload2, b"edge-1");
    assert!(reader.read_frame().unwrap().is_none());
}

#[test]
fn test_append_to_existing() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("partition.slj");

    {
        let mut writer = JournalWriter::open(&path, no_sync()).unwrap();
        writer.append(FrameKind::Batch, b"first").unwrap();
        writer.finish().unwrap();
    }
    {
        let mut writer = JournalWriter::open(&path, no_sync()).unwrap();
        writer.append(FrameKind::Batch, b"second").unwrap();
        writer.finish().unwrap();
    }

    let mut reader = JournalReader::open(&path, ReadMode::Strict).unwrap();
    let frames = reader.read_to_end().unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].1, b"first");
    assert_eq!(frames[1].1, b"second");
}

#[test]
fn test_truncated_frame_permissive_vs_strict() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("partition.slj");

    {
        let mut writer = JournalWriter::open(&path, no_sync()).unwrap();
        writer.append(FrameKind::Batch, b"complete").unwrap();
        writer.append(FrameKind::Batch, b"will-be-torn").unwrap();
        writer.finish().unwrap();
    }

    // Chop the tail off the last frame to simulate a crashed append.
    let len = fs::metadata(&path).unwrap().len();
    let file = fs::OpenOptions::new().write(true).open(&path).unwrap();
    file.set_len(len - 4).unwrap();
    drop(file);

    // Permissive: the torn frame is end-of-file.
    let mut reader = JournalReader::open(&path, ReadMode::Permissive).unwrap();
    let frames = reader.read_to_end().unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].1, b"complete");

    // Strict: the torn frame is an error.
    let mut reader = JournalReader::open(&path, ReadMode::Strict).unwrap();
    assert!(reader.read_frame().unwrap().is_some());
    assert!(matches!(
        reader.read_frame(),
        Err(JournalError::TruncatedFrame { .. })
    ));
}

#[test]
fn test_unknown_kind_is_returned_not_dropped() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("partition.slj");

    {
        let mut writer = JournalWriter::open(&path, no_sync()).unwrap();
        writer.append(FrameKind::Unknown(0x42), b"future").unwrap();
        writer.append(FrameKind::Batch, b"present").unwrap();
        writer.finish().unwrap();
    }

    let mut reader = JournalReader::open(&path, ReadMode::Strict).unwrap();
    let frames = reader.read_to_end().unwrap();
    assert_eq!(frames[0].0, FrameKind::Unknown(0x42));
    assert_eq!(frames[1].0, FrameKind::Batch);
}

#[test]
fn test_open_rejects_foreign_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("not-a-journal");
    fs::write(&path, b"some other file format entirely").unwrap();

    assert!(matches!(
        JournalReader::open(&path, ReadMode::Strict),
        Err(JournalError::InvalidHeader(_))
    ));
    assert!(matches!(
        JournalWriter::open(&path, no_sync()),
        Err(JournalError::InvalidHeader(_))
    ));
}

#[test]
fn test_open_rejects_short_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("short");
    fs::write(&path, b"SLJ").unwrap();

    assert!(matches!(
        JournalWriter::open(&path, no_sync()),
        Err(JournalError::FileNotEmpty)
    ));
}

#[test]
fn test_corrupted_reserved_bytes_error_at_offset() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("partition.slj");

    {
        let mut writer = JournalWriter::open(&path, no_sync()).unwrap();
        writer.append(FrameKind::Batch, b"ok").unwrap();
        writer.finish().unwrap();
    }

    // Flip a reserved byte in the frame header (offset 16 = header size,
    // +1 = first reserved byte).
    let mut file = fs::OpenOptions::new().write(true).open(&path).unwrap();
    file.seek(std::io::SeekFrom::Start(17)).unwrap();
    file.write_all(&[0xFF]).unwrap();
    drop(file);

    let mut reader = JournalReader::open(&path, ReadMode::Strict).unwrap();
    match reader.read_frame() {
        Err(JournalError::InvalidFrame { offset, .. }) => assert_eq!(offset, 16),
        other => panic!("expected InvalidFrame, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_rewrite_replaces_contents_atomically() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("partition.slj");

    {
        let mut writer = JournalWriter::open(&path, no_sync()).unwrap();
        writer.append(FrameKind::Batch, b"old-1").unwrap();
        writer.append(FrameKind::Batch, b"old-2").unwrap();
        writer.append(FrameKind::Cancel, b"cancel").unwrap();
        writer.finish().unwrap();
    }

    rewrite_atomic(
        &path,
        &[(FrameKind::Batch, b"survivor".to_vec())],
    )
    .unwrap();

    let mut reader = JournalReader::open(&path, ReadMode::Strict).unwrap();
    let frames = reader.read_to_end().unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].1, b"survivor");

    // No temp file left behind.
    assert!(!temp_dir.path().join("partition.slj.rewrite").exists());
}

#[test]
fn test_rewrite_discards_stale_temp_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("partition.slj");
    fs::write(temp_dir.path().join("partition.slj.rewrite"), b"stale").unwrap();

    {
        let mut writer = JournalWriter::open(&path, no_sync()).unwrap();
        writer.append(FrameKind::Batch, b"live").unwrap();
        writer.finish().unwrap();
    }

    rewrite_atomic(&path, &[(FrameKind::Batch, b"live".to_vec())]).unwrap();

    let mut reader = JournalReader::open(&path, ReadMode::Strict).unwrap();
    let frames = reader.read_to_end().unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].1, b"live");
}
