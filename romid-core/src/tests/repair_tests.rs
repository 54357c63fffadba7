use super::*;
use crate::checksum::crc32_bytes;

const MAGIC: &[u8] = b"NES\x1A";

fn layout() -> HeaderLayout<'static> {
    HeaderLayout {
        header_len: 16,
        magic: MAGIC,
        size_limit: 1024 * 1024,
    }
}

fn header(flags7: u8) -> Vec<u8> {
    let mut h = vec![0u8; 16];
    h[..4].copy_from_slice(MAGIC);
    h[4] = 1;
    h[7] = flags7;
    h
}

fn body() -> Vec<u8> {
    (0..4096u32).map(|i| (i * 7 % 256) as u8).collect()
}

fn write_rom(dir: &Path, name: &str, hdr: &[u8]) -> PathBuf {
    let path = dir.join(name);
    let mut data = hdr.to_vec();
    data.extend_from_slice(&body());
    fs::write(&path, data).unwrap();
    path
}

fn good_crc() -> String {
    let mut data = header(0x08);
    data.extend_from_slice(&body());
    crc32_bytes(&data)
}

#[test]
fn test_backup_extension() {
    assert_eq!(
        backup_path(Path::new("/roms/game.nes")),
        PathBuf::from("/roms/game.nes.bak")
    );
    assert_eq!(
        backup_path(Path::new("/roms/game.zip")),
        PathBuf::from("/roms/game.zip.bak")
    );
    assert_eq!(backup_path(Path::new("/roms/game")), PathBuf::from("/roms/game.bak"));
}

#[test]
fn stage_finds_matching_candidate() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rom(dir.path(), "game.nes", &header(0x00));
    let expected = good_crc();
    let candidates = vec![header(0x04), header(0x08)];

    let staged = stage_header_repair(&path, &layout(), &candidates, &|crc| crc == expected)
        .unwrap()
        .expect("candidate should match");

    assert_eq!(staged.matched_crc32, expected);
    assert_eq!(staged.replacement, header(0x08));
    assert_eq!(staged.original_header, header(0x00));
    assert!(staged.needs_write());
    // staging is read-only
    assert_eq!(&fs::read(&path).unwrap()[..16], &header(0x00)[..]);
}

#[test]
fn stage_without_match_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rom(dir.path(), "game.nes", &header(0x00));
    let candidates = vec![header(0x04)];
    let staged = stage_header_repair(&path, &layout(), &candidates, &|_| false).unwrap();
    assert!(staged.is_none());
}

#[test]
fn stage_requires_magic_and_size() {
    let dir = tempfile::tempdir().unwrap();
    let mut bad = header(0x00);
    bad[0] = b'X';
    let path = write_rom(dir.path(), "bad.nes", &bad);
    let candidates = vec![header(0x08)];
    assert!(
        stage_header_repair(&path, &layout(), &candidates, &|_| true)
            .unwrap()
            .is_none()
    );

    let tiny = dir.path().join("tiny.nes");
    fs::write(&tiny, b"NES\x1A").unwrap();
    assert!(
        stage_header_repair(&tiny, &layout(), &candidates, &|_| true)
            .unwrap()
            .is_none()
    );

    let small_limit = HeaderLayout {
        size_limit: 100,
        ..layout()
    };
    let big = write_rom(dir.path(), "big.nes", &header(0x00));
    assert!(
        stage_header_repair(&big, &small_limit, &candidates, &|_| true)
            .unwrap()
            .is_none()
    );
}

#[test]
fn stage_with_empty_pool_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rom(dir.path(), "game.nes", &header(0x00));
    assert!(
        stage_header_repair(&path, &layout(), &[], &|_| true)
            .unwrap()
            .is_none()
    );
}

#[test]
fn stage_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = stage_header_repair(
        &dir.path().join("missing.nes"),
        &layout(),
        &[header(0x08)],
        &|_| true,
    )
    .unwrap_err();
    assert!(matches!(err, AnalysisError::Io(_)));
}

#[test]
fn commit_writes_header_and_backup() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rom(dir.path(), "game.nes", &header(0x00));
    let original = fs::read(&path).unwrap();
    let expected = good_crc();

    let staged = stage_header_repair(&path, &layout(), &[header(0x08)], &|crc| crc == expected)
        .unwrap()
        .unwrap();
    let outcome = staged.commit(BackupPolicy::Backup).unwrap();

    assert!(outcome.written);
    assert_eq!(outcome.backup, Some(dir.path().join("game.nes.bak")));
    assert_eq!(fs::read(dir.path().join("game.nes.bak")).unwrap(), original);

    let repaired = fs::read(&path).unwrap();
    assert_eq!(crc32_bytes(&repaired), expected);
    assert_eq!(&repaired[16..], &original[16..]);
    assert!(!dir.path().join("game.nes.repair_tmp").exists());
}

#[test]
fn commit_keeps_existing_backup() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rom(dir.path(), "game.nes", &header(0x00));
    let bak = dir.path().join("game.nes.bak");
    fs::write(&bak, b"older backup").unwrap();
    let expected = good_crc();

    let staged = stage_header_repair(&path, &layout(), &[header(0x08)], &|crc| crc == expected)
        .unwrap()
        .unwrap();
    let outcome = staged.commit(BackupPolicy::Backup).unwrap();

    assert!(outcome.written);
    assert_eq!(outcome.backup, None);
    assert_eq!(fs::read(&bak).unwrap(), b"older backup");
}

#[test]
fn commit_scratch_copy_skips_backup() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rom(dir.path(), "scratch.nes", &header(0x00));
    let expected = good_crc();

    let staged = stage_header_repair(&path, &layout(), &[header(0x08)], &|crc| crc == expected)
        .unwrap()
        .unwrap();
    let outcome = staged.commit(BackupPolicy::ScratchCopy).unwrap();

    assert!(outcome.written);
    assert!(!dir.path().join("scratch.nes.bak").exists());
    assert_eq!(crc32_bytes(&fs::read(&path).unwrap()), expected);
}

#[test]
fn identical_header_needs_no_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rom(dir.path(), "game.nes", &header(0x08));
    let expected = good_crc();

    let staged = stage_header_repair(&path, &layout(), &[header(0x08)], &|crc| crc == expected)
        .unwrap()
        .unwrap();
    assert!(!staged.needs_write());
    assert_eq!(staged.commit(BackupPolicy::Backup).unwrap(), RepairOutcome::default());
    assert!(!dir.path().join("game.nes.bak").exists());
}

#[test]
fn commit_detects_concurrent_change() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rom(dir.path(), "game.nes", &header(0x00));
    let expected = good_crc();

    let staged = stage_header_repair(&path, &layout(), &[header(0x08)], &|crc| crc == expected)
        .unwrap()
        .unwrap();
    write_rom(dir.path(), "game.nes", &header(0x04));

    let err = staged.commit(BackupPolicy::Backup).unwrap_err();
    assert!(matches!(err, AnalysisError::RepairConflict(_)));
    assert!(!dir.path().join("game.nes.bak").exists());
    assert_eq!(&fs::read(&path).unwrap()[..16], &header(0x04)[..]);
}
